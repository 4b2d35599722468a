//! Base plugin types.

use crate::context::Context;
use crate::Result;

/// Point of the call at which a plugin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Building the outgoing request.
    Request,
    /// Right before the transport opens the connection.
    BeforeDial,
    /// After a response has been received.
    Response,
    /// After any phase or the transport failed.
    Error,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Request
    }
}

/// Continuation handed to a plugin: calling it runs the rest of the chain.
pub type Next<'a> = &'a mut dyn FnMut(&mut Context) -> Result<()>;

/// A middleware unit.
///
/// `handle` mutates the context and then does exactly one of:
/// - returns `next(ctx)` to continue,
/// - returns `Err(..)` without calling `next` to abort the chain,
/// - returns `Ok(())` without calling `next` to stop the chain quietly.
///
/// Plugins are shared across calls, so they must not keep per-call state.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn phase(&self) -> Phase {
        Phase::Request
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()>;
}
