use super::body::{BodyReader, BoxBody};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::fmt;
use std::io::Cursor;
use url::Url;

/// Outgoing request as mutated by the plugin chain.
pub struct Request {
    pub method: Method,
    pub url: Option<Url>,
    pub headers: HeaderMap,
    pub body: Option<BoxBody>,
    /// Exact byte count of `body`, or `None` when it cannot be known ahead of time.
    pub content_length: Option<u64>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url: Some(url),
            ..Self::default()
        }
    }

    pub fn parse(method: Method, url: &str) -> crate::Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| crate::Error::configuration(format!("invalid request url {url:?}: {e}")))?;
        Ok(Self::new(method, url))
    }

    /// Replaces the body and derives the content length from the stream's
    /// remaining-length capability.
    pub fn set_body<B: BodyReader + 'static>(&mut self, body: B) {
        self.set_boxed_body(Box::new(body));
    }

    pub fn set_boxed_body(&mut self, body: BoxBody) {
        self.content_length = body.remaining_len();
        self.body = Some(body);
    }

    /// Replaces the body with an in-memory buffer of known length.
    pub fn set_bytes(&mut self, data: impl Into<Bytes>) {
        self.set_body(Cursor::new(data.into()));
    }

    /// Drops the current body, if any.
    pub fn clear_body(&mut self) {
        self.body = None;
        self.content_length = None;
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Detaches the body and its length, leaving the request bodiless.
    pub fn take_body(&mut self) -> Option<(BoxBody, Option<u64>)> {
        let len = self.content_length.take();
        self.body.take().map(|body| (body, len))
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: None,
            headers: HeaderMap::new(),
            body: None,
            content_length: None,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("content_length", &self.content_length)
            .finish()
    }
}
