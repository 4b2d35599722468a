//! Request body plugins.
//!
//! The input kind is fixed by the constructor: raw text and raw bytes are
//! written verbatim, structured values go through `serde_json` or `quick_xml`.
//!
//! ```rust,no_run
//! use http_plugins::plugins::{body, Chain};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { name: String }
//!
//! let chain = Chain::new().with(body::json(User { name: "ada".into() }));
//! ```

use super::base::{Next, Plugin};
use crate::context::{BodyReader, BoxBody, Context};
use crate::Result;
use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, warn};

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_XML: &str = "application/xml";

#[derive(Debug, Clone)]
enum Payload<T> {
    Text(String),
    Bytes(Bytes),
    Value(T),
}

impl<T> Payload<T> {
    fn encode<F>(&self, serialize: F) -> Result<Bytes>
    where
        F: FnOnce(&T) -> Result<Vec<u8>>,
    {
        match self {
            Payload::Text(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            Payload::Bytes(b) => Ok(b.clone()),
            Payload::Value(v) => serialize(v).map(Bytes::from),
        }
    }
}

/// Sets the body to a fixed string.
#[derive(Debug, Clone)]
pub struct Text {
    data: Bytes,
}

pub fn string(data: impl Into<String>) -> Text {
    Text {
        data: Bytes::from(data.into()),
    }
}

impl Plugin for Text {
    fn name(&self) -> &str {
        "body.string"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        ctx.request.set_bytes(self.data.clone());
        debug!(len = self.data.len(), "string body set");
        next(ctx)
    }
}

/// Sets a JSON body and `Content-Type: application/json`.
#[derive(Debug, Clone)]
pub struct Json<T = ()> {
    payload: Payload<T>,
}

/// Serializes `value` with `serde_json` on every request.
pub fn json<T>(value: T) -> Json<T>
where
    T: Serialize + Send + Sync,
{
    Json {
        payload: Payload::Value(value),
    }
}

/// Uses already-encoded JSON text as is. The text is not validated.
pub fn json_text(text: impl Into<String>) -> Json {
    Json {
        payload: Payload::Text(text.into()),
    }
}

/// Uses already-encoded JSON bytes as is. The bytes are not validated.
pub fn json_bytes(data: impl Into<Bytes>) -> Json {
    Json {
        payload: Payload::Bytes(data.into()),
    }
}

impl<T> Plugin for Json<T>
where
    T: Serialize + Send + Sync,
{
    fn name(&self) -> &str {
        "body.json"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        let buf = self
            .payload
            .encode(|v| serde_json::to_vec(v).map_err(Into::into))?;
        set_encoded(ctx, buf, APPLICATION_JSON);
        next(ctx)
    }
}

/// Sets an XML body and `Content-Type: application/xml`.
#[derive(Debug, Clone)]
pub struct Xml<T = ()> {
    payload: Payload<T>,
}

/// Serializes `value` with `quick_xml` on every request.
pub fn xml<T>(value: T) -> Xml<T>
where
    T: Serialize + Send + Sync,
{
    Xml {
        payload: Payload::Value(value),
    }
}

pub fn xml_text(text: impl Into<String>) -> Xml {
    Xml {
        payload: Payload::Text(text.into()),
    }
}

pub fn xml_bytes(data: impl Into<Bytes>) -> Xml {
    Xml {
        payload: Payload::Bytes(data.into()),
    }
}

impl<T> Plugin for Xml<T>
where
    T: Serialize + Send + Sync,
{
    fn name(&self) -> &str {
        "body.xml"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        let buf = self.payload.encode(|v| {
            quick_xml::se::to_string(v)
                .map(String::into_bytes)
                .map_err(Into::into)
        })?;
        set_encoded(ctx, buf, APPLICATION_XML);
        next(ctx)
    }
}

fn set_encoded(ctx: &mut Context, buf: Bytes, content_type: &'static str) {
    debug!(len = buf.len(), content_type, "encoded body set");
    ctx.request.set_bytes(buf);
    ctx.request
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
}

type BodyFactory = Box<dyn Fn() -> BoxBody + Send + Sync>;

enum Source {
    Once(Mutex<Option<BoxBody>>),
    Factory(BodyFactory),
    Empty,
}

/// Sets an arbitrary stream as the body.
///
/// The content length is taken from [`BodyReader::remaining_len`] and left
/// unset when the stream cannot report it. No `Content-Type` is set; declare
/// it separately.
pub struct Reader {
    source: Source,
}

/// Hands `body` to the first request that runs this plugin. A stream can only
/// be consumed once, so later requests go out without a body; use
/// [`reader_fn`] for a plugin that is reused across calls.
pub fn reader<R: BodyReader + 'static>(body: R) -> Reader {
    Reader {
        source: Source::Once(Mutex::new(Some(Box::new(body)))),
    }
}

/// Builds a fresh stream for every request.
pub fn reader_fn<R, F>(factory: F) -> Reader
where
    R: BodyReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
{
    Reader {
        source: Source::Factory(Box::new(move || Box::new(factory()) as BoxBody)),
    }
}

/// Removes any body previously set on the request.
pub fn clear() -> Reader {
    Reader {
        source: Source::Empty,
    }
}

impl Reader {
    fn next_body(&self) -> Option<BoxBody> {
        match &self.source {
            Source::Once(slot) => {
                let body = slot
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .take();
                if body.is_none() {
                    warn!("reader body plugin reused after its stream was consumed");
                }
                body
            }
            Source::Factory(factory) => Some(factory()),
            Source::Empty => None,
        }
    }
}

impl Plugin for Reader {
    fn name(&self) -> &str {
        "body.reader"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        match self.next_body() {
            Some(body) => {
                ctx.request.set_boxed_body(body);
                debug!(len = ?ctx.request.content_length, "stream body set");
            }
            None => ctx.request.clear_body(),
        }
        next(ctx)
    }
}
