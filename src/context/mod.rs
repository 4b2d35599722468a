//! Per-call context shared by every plugin of a chain.

mod body;
mod request;
mod response;

pub use body::{BodyReader, BoxBody, Opaque};
pub use request::Request;
pub use response::Response;

use reqwest::cookie::Jar;
use std::sync::Arc;

/// Client-level state a plugin may swap for a single call.
#[derive(Debug, Clone, Default)]
pub struct Client {
    /// Cookie store used by the transport; `None` disables cookie persistence.
    pub jar: Option<Arc<Jar>>,
}

/// Carrier for one outgoing call: the request being built, the client state,
/// the response once received, and the message of the error that aborted the
/// call, if any.
#[derive(Debug, Default)]
pub struct Context {
    pub request: Request,
    pub client: Client,
    pub response: Option<Response>,
    pub error: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(request: Request) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn set_error(&mut self, e: impl Into<String>) {
        self.error = Some(e.into());
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
