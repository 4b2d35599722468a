//! Closure-backed plugins.

use super::base::{Next, Phase, Plugin};
use crate::context::Context;
use crate::Result;

pub struct FnPlugin<F> {
    name: String,
    phase: Phase,
    func: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, phase: Phase, func: F) -> Self {
        Self {
            name: name.into(),
            phase,
            func,
        }
    }
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        (self.func)(ctx, next)
    }
}

/// Plugin running `func` while the request is being built.
pub fn on_request<F>(name: impl Into<String>, func: F) -> FnPlugin<F>
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync,
{
    FnPlugin::new(name, Phase::Request, func)
}

/// Plugin running `func` once a response is available.
pub fn on_response<F>(name: impl Into<String>, func: F) -> FnPlugin<F>
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync,
{
    FnPlugin::new(name, Phase::Response, func)
}

/// Plugin running `func` after the call failed; `ctx.error` holds the message.
pub fn on_error<F>(name: impl Into<String>, func: F) -> FnPlugin<F>
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync,
{
    FnPlugin::new(name, Phase::Error, func)
}
