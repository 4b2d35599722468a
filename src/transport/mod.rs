//! Wire transport for finished request contexts.

mod http;

pub use http::{HttpTransport, TransportError};
