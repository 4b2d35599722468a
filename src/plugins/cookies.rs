//! Cookie header and cookie jar plugins.

use super::base::{Next, Phase, Plugin};
use crate::context::Context;
use crate::Result;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A request cookie: only name and value travel in the `Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Cookie {
    fn from((name, value): (N, V)) -> Self {
        Cookie::new(name, value)
    }
}

/// Renders the `name=value` pair, sanitized for a request header.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            sanitize_name(&self.name),
            sanitize_value(&self.value)
        )
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_graphic() { c } else { '-' })
        .collect()
}

// RFC 6265 cookie-octet, plus space and comma which force quoting.
fn valid_value_char(c: char) -> bool {
    matches!(c, ' '..='~') && c != '"' && c != ';' && c != '\\'
}

fn sanitize_value(value: &str) -> String {
    let cleaned: String = value.chars().filter(|&c| valid_value_char(c)).collect();
    if cleaned.contains(' ') || cleaned.contains(',') {
        format!("\"{cleaned}\"")
    } else {
        cleaned
    }
}

fn set_header(headers: &mut HeaderMap, raw: &str) {
    match HeaderValue::from_str(raw) {
        Ok(v) => {
            headers.insert(COOKIE, v);
        }
        Err(e) => warn!(error = %e, "skipping invalid cookie header"),
    }
}

fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie) {
    let pair = cookie.to_string();
    let mut raw: Vec<u8> = Vec::new();
    for existing in headers.get_all(COOKIE).iter().filter(|v| !v.is_empty()) {
        raw.extend_from_slice(existing.as_bytes());
        raw.extend_from_slice(b"; ");
    }
    raw.extend_from_slice(pair.as_bytes());
    match HeaderValue::from_bytes(&raw) {
        Ok(v) => {
            headers.insert(COOKIE, v);
        }
        Err(e) => warn!(error = %e, cookie = %cookie.name, "skipping invalid cookie"),
    }
}

/// Replaces the `Cookie` header with a single `name=value` pair.
#[derive(Debug, Clone)]
pub struct Set {
    cookie: Cookie,
}

pub fn set(name: impl Into<String>, value: impl Into<String>) -> Set {
    Set {
        cookie: Cookie::new(name, value),
    }
}

impl Plugin for Set {
    fn name(&self) -> &str {
        "cookies.set"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        set_header(&mut ctx.request.headers, &self.cookie.to_string());
        debug!(cookie = %self.cookie.name, "cookie header set");
        next(ctx)
    }
}

/// Appends cookies to the `Cookie` header, keeping those already present.
#[derive(Debug, Clone)]
pub struct Add {
    cookies: Vec<Cookie>,
}

pub fn add(cookie: impl Into<Cookie>) -> Add {
    Add {
        cookies: vec![cookie.into()],
    }
}

pub fn add_multiple<I>(cookies: I) -> Add
where
    I: IntoIterator,
    I::Item: Into<Cookie>,
{
    Add {
        cookies: cookies.into_iter().map(Into::into).collect(),
    }
}

impl Plugin for Add {
    fn name(&self) -> &str {
        "cookies.add"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        for cookie in &self.cookies {
            append_cookie(&mut ctx.request.headers, cookie);
        }
        debug!(count = self.cookies.len(), "cookies added");
        next(ctx)
    }
}

/// Removes the `Cookie` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelAll;

pub fn del_all() -> DelAll {
    DelAll
}

impl Plugin for DelAll {
    fn name(&self) -> &str {
        "cookies.del_all"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        ctx.request.headers.remove(COOKIE);
        debug!("cookie header removed");
        next(ctx)
    }
}

/// Replaces the `Cookie` header with every entry of a map, sorted by name.
#[derive(Debug, Clone)]
pub struct SetMap {
    header: String,
    count: usize,
}

pub fn set_map<K, V>(cookies: HashMap<K, V>) -> SetMap
where
    K: Into<String>,
    V: Into<String>,
{
    let mut cookies: Vec<Cookie> = cookies.into_iter().map(Cookie::from).collect();
    cookies.sort_by(|a, b| a.name.cmp(&b.name));
    let header = cookies
        .iter()
        .map(Cookie::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    SetMap {
        header,
        count: cookies.len(),
    }
}

impl Plugin for SetMap {
    fn name(&self) -> &str {
        "cookies.set_map"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        if self.header.is_empty() {
            ctx.request.headers.remove(COOKIE);
        } else {
            set_header(&mut ctx.request.headers, &self.header);
        }
        debug!(count = self.count, "cookie map set");
        next(ctx)
    }
}

/// Gives the call a fresh, empty cookie jar right before dialing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewJar;

pub fn jar() -> NewJar {
    NewJar
}

impl Plugin for NewJar {
    fn name(&self) -> &str {
        "cookies.jar"
    }

    fn phase(&self) -> Phase {
        Phase::BeforeDial
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        ctx.client.jar = Some(Arc::new(Jar::default()));
        debug!("cookie jar replaced");
        next(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_control_chars_are_replaced() {
        let c = Cookie::new("se\r\nss ion", "v");
        assert_eq!(c.to_string(), "se--ss-ion=v");
    }

    #[test]
    fn value_invalid_bytes_dropped() {
        let c = Cookie::new("k", "a\"b;c\\dé");
        assert_eq!(c.to_string(), "k=abcd");
    }

    #[test]
    fn value_with_space_or_comma_is_quoted() {
        assert_eq!(Cookie::new("k", "a b").to_string(), "k=\"a b\"");
        assert_eq!(Cookie::new("k", "a,b").to_string(), "k=\"a,b\"");
    }

    #[test]
    fn append_joins_with_semicolon() {
        let mut headers = HeaderMap::new();
        append_cookie(&mut headers, &Cookie::new("a", "1"));
        append_cookie(&mut headers, &Cookie::new("b", "2"));
        assert_eq!(headers[COOKIE], "a=1; b=2");
        assert_eq!(headers.get_all(COOKIE).iter().count(), 1);
    }

    #[test]
    fn append_folds_every_cookie_field() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        append_cookie(&mut headers, &Cookie::new("c", "3"));
        let fields: Vec<_> = headers.get_all(COOKIE).iter().collect();
        assert_eq!(fields, vec!["a=1; b=2; c=3"]);
    }

    #[test]
    fn set_map_sorts_by_name() {
        let map: HashMap<&str, &str> = [("zeta", "1"), ("alpha", "2"), ("mid", "3")]
            .into_iter()
            .collect();
        let plugin = set_map(map);
        assert_eq!(plugin.header, "alpha=2; mid=3; zeta=1");
    }

    #[test]
    fn jar_runs_before_dial() {
        assert_eq!(jar().phase(), Phase::BeforeDial);
        assert_eq!(del_all().phase(), Phase::Request);
    }
}
