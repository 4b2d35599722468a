//! Ordered plugin chain.

use super::base::{Phase, Plugin};
use crate::context::Context;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

struct Entry {
    plugin: Arc<dyn Plugin>,
    enabled: bool,
}

/// Plugins in registration order, run phase by phase.
#[derive(Default)]
pub struct Chain {
    entries: Vec<Entry>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.push(Arc::new(plugin));
        self
    }

    pub fn push(&mut self, plugin: Arc<dyn Plugin>) {
        self.entries.push(Entry {
            plugin,
            enabled: true,
        });
    }

    /// Removes every plugin registered under `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.entries.len();
        self.entries.retain(|e| e.plugin.name() != name);
        self.entries.len() < len
    }

    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for e in self.entries.iter_mut().filter(|e| e.plugin.name() == name) {
            e.enabled = enabled;
            found = true;
        }
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the enabled plugins of `phase` in order, then `terminal`.
    ///
    /// `terminal` only runs if every plugin continued. An error returned by a
    /// plugin is recorded in `ctx.error` and returned unchanged.
    pub fn run<F>(&self, phase: Phase, ctx: &mut Context, mut terminal: F) -> Result<()>
    where
        F: FnMut(&mut Context) -> Result<()>,
    {
        let plugins: Vec<Arc<dyn Plugin>> = self
            .entries
            .iter()
            .filter(|e| e.enabled && e.plugin.phase() == phase)
            .map(|e| e.plugin.clone())
            .collect();
        debug!(?phase, plugins = plugins.len(), "running plugin chain");

        let res = run_from(&plugins, ctx, &mut terminal);
        if let Err(ref e) = res {
            if !ctx.has_error() {
                ctx.set_error(e.to_string());
            }
        }
        res
    }
}

fn run_from(
    plugins: &[Arc<dyn Plugin>],
    ctx: &mut Context,
    terminal: &mut dyn FnMut(&mut Context) -> Result<()>,
) -> Result<()> {
    match plugins.split_first() {
        None => terminal(ctx),
        Some((head, rest)) => {
            debug!(plugin = head.name(), "invoking plugin");
            head.handle(ctx, &mut |c: &mut Context| run_from(rest, c, &mut *terminal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::hooks::{on_request, FnPlugin};
    use crate::Error;
    use reqwest::header::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tag(name: &'static str) -> impl Plugin {
        on_request(name, move |ctx, next| {
            ctx.request
                .headers
                .append("x-order", HeaderValue::from_static(name));
            next(ctx)
        })
    }

    fn order(ctx: &Context) -> Vec<String> {
        ctx.request
            .headers
            .get_all("x-order")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn runs_in_registration_order_then_terminal() {
        let chain = Chain::new().with(tag("a")).with(tag("b")).with(tag("c"));
        let mut ctx = Context::new();
        let mut called = false;

        chain
            .run(Phase::Request, &mut ctx, |_| {
                called = true;
                Ok(())
            })
            .unwrap();

        assert!(called);
        assert_eq!(order(&ctx), vec!["a", "b", "c"]);
    }

    #[test]
    fn error_aborts_and_is_recorded() {
        let failing = on_request("fail", |_ctx, _next| Err(Error::runtime("boom")));
        let chain = Chain::new().with(tag("a")).with(failing).with(tag("c"));
        let mut ctx = Context::new();
        let mut called = false;

        let res = chain.run(Phase::Request, &mut ctx, |_| {
            called = true;
            Ok(())
        });

        assert!(res.is_err());
        assert!(!called);
        assert_eq!(order(&ctx), vec!["a"]);
        assert_eq!(ctx.error.as_deref(), Some("Runtime error: boom"));
    }

    #[test]
    fn stop_skips_rest_without_error() {
        let stop = on_request("stop", |_ctx, _next| Ok(()));
        let chain = Chain::new().with(stop).with(tag("after"));
        let mut ctx = Context::new();
        let mut called = false;

        chain
            .run(Phase::Request, &mut ctx, |_| {
                called = true;
                Ok(())
            })
            .unwrap();

        assert!(!called);
        assert!(order(&ctx).is_empty());
        assert!(!ctx.has_error());
    }

    #[test]
    fn filters_by_phase_and_enabled_flag() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let response_only = FnPlugin::new("resp", Phase::Response, move |ctx, next| {
            counter.fetch_add(1, Ordering::SeqCst);
            next(ctx)
        });
        let mut chain = Chain::new().with(response_only).with(tag("a"));

        let mut ctx = Context::new();
        chain.run(Phase::Request, &mut ctx, |_| Ok(())).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        chain.run(Phase::Response, &mut ctx, |_| Ok(())).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(chain.disable("resp"));
        chain.run(Phase::Response, &mut ctx, |_| Ok(())).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(chain.enable("resp"));
        chain.run(Phase::Response, &mut ctx, |_| Ok(())).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remove_by_name() {
        let mut chain = Chain::new().with(tag("a")).with(tag("b"));
        assert!(chain.remove("a"));
        assert!(!chain.remove("a"));
        assert_eq!(chain.len(), 1);
        assert!(!chain.disable("missing"));
    }
}
