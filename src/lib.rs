//! # http-plugins
//!
//! Request-body and cookie middleware for an HTTP client built around a
//! per-call [`Context`] and a chain of [`Plugin`]s.
//!
//! Each plugin mutates the outgoing request and then either continues to the
//! next handler or aborts the chain with an [`Error`]. Plugins are immutable
//! once built and can be shared by any number of concurrent calls; every
//! call gets its own context.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http_plugins::plugins::{body, cookies, Chain};
//! use http_plugins::{Context, Dispatcher, Request, TransportConfig};
//! use reqwest::Method;
//!
//! fn main() -> http_plugins::Result<()> {
//!     let chain = Chain::new()
//!         .with(body::json(serde_json::json!({ "name": "ada" })))
//!         .with(cookies::set("session", "abc123"));
//!     let dispatcher = Dispatcher::with_chain(chain, TransportConfig::from_env())?;
//!
//!     let mut ctx = Context::with_request(Request::parse(Method::POST, "https://example.com/users")?);
//!     dispatcher.send(&mut ctx)?;
//!     println!("{:?}", ctx.response.map(|r| r.status));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | Per-call context, request, response, body streams |
//! | [`plugins`] | Plugin trait, chain, body and cookie plugins |
//! | [`transport`] | Blocking `reqwest` transport |
//! | [`dispatch`] | Phase driver tying chain and transport together |
//! | [`config`] | Transport configuration from env or YAML |

pub mod config;
pub mod context;
pub mod dispatch;
pub mod plugins;
pub mod transport;

pub use config::TransportConfig;
pub use context::{BodyReader, Client, Context, Opaque, Request, Response};
pub use dispatch::Dispatcher;
pub use plugins::{Chain, Phase, Plugin};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

pub mod error;
pub use error::Error;
