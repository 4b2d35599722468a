//! Phase driver: request plugins, before-dial plugins, transport, response
//! plugins, and error plugins when any of those fail.

use crate::config::TransportConfig;
use crate::context::Context;
use crate::plugins::{Chain, Phase};
use crate::transport::HttpTransport;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

struct Inner {
    chain: Chain,
    transport: HttpTransport,
}

/// Runs a [`Chain`] around an [`HttpTransport`]. Cheap to clone.
///
/// The transport is blocking: build the dispatcher and call [`send`](Self::send)
/// outside async tasks, or use [`send_async`](Self::send_async) from async code.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(config: TransportConfig) -> Result<Self> {
        Self::with_chain(Chain::new(), config)
    }

    pub fn with_chain(chain: Chain, config: TransportConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            inner: Arc::new(Inner { chain, transport }),
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.inner.chain
    }

    /// Runs one call. The response, when one was received, is left in
    /// `ctx.response`. A plugin that stops the chain ends the call with
    /// `Ok(())` and no response.
    pub fn send(&self, ctx: &mut Context) -> Result<()> {
        let started = Instant::now();
        match self.run(ctx) {
            Ok(()) => {
                match &ctx.response {
                    Some(resp) => info!(
                        status = resp.status.as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "request completed"
                    ),
                    None => debug!("request stopped before dispatch"),
                }
                Ok(())
            }
            Err(e) => {
                if !ctx.has_error() {
                    ctx.set_error(e.to_string());
                }
                warn!(error = %e, "request failed");
                if let Err(hook_err) = self.inner.chain.run(Phase::Error, ctx, |_| Ok(())) {
                    warn!(error = %hook_err, "error plugin failed");
                }
                Err(e)
            }
        }
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let Inner { chain, transport } = &*self.inner;
        chain.run(Phase::Request, ctx, |ctx| {
            chain.run(Phase::BeforeDial, ctx, |ctx| {
                let response = transport.execute(ctx)?;
                ctx.response = Some(response);
                chain.run(Phase::Response, ctx, |_| Ok(()))
            })
        })
    }

    /// Runs [`send`](Self::send) on tokio's blocking pool and hands the
    /// context back on success.
    pub async fn send_async(&self, ctx: Context) -> Result<Context> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut ctx = ctx;
            this.send(&mut ctx).map(|()| ctx)
        })
        .await
        .map_err(|e| Error::runtime(format!("dispatch task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{body, on_error, on_request};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn missing_url_fails_and_runs_error_phase() {
        let seen = Arc::new(AtomicBool::new(false));
        let flag = seen.clone();
        let chain = Chain::new()
            .with(body::string("payload"))
            .with(on_error("record", move |ctx, next| {
                flag.store(ctx.has_error(), Ordering::SeqCst);
                next(ctx)
            }));
        let dispatcher = Dispatcher::with_chain(chain, TransportConfig::default()).unwrap();

        let mut ctx = Context::new();
        let err = dispatcher.send(&mut ctx).unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert!(seen.load(Ordering::SeqCst));
        assert_eq!(
            ctx.error.as_deref(),
            Some("Configuration error: request url is not set")
        );
    }

    #[test]
    fn stopped_chain_skips_transport() {
        let chain = Chain::new().with(on_request("halt", |_ctx, _next| Ok(())));
        let dispatcher = Dispatcher::with_chain(chain, TransportConfig::default()).unwrap();

        let mut ctx = Context::new();
        dispatcher.send(&mut ctx).unwrap();
        assert!(ctx.response.is_none());
        assert!(!ctx.has_error());
    }
}
