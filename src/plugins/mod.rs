//! Plugin system and the built-in request plugins.

mod base;
mod hooks;
mod middleware;

pub mod body;
pub mod cookies;

pub use base::{Next, Phase, Plugin};
pub use hooks::{on_error, on_request, on_response, FnPlugin};
pub use middleware::Chain;
