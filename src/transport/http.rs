use crate::config::TransportConfig;
use crate::context::{Context, Response};
use crate::{Error, Result};
use reqwest::blocking::{Body, Client, ClientBuilder};
use reqwest::cookie::Jar;
use reqwest::Proxy;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking HTTP transport turning a finished [`Context`] into a wire request.
///
/// reqwest binds a cookie store when a client is built, so a call carrying its
/// own jar needs a client of its own. The client built for the last jar seen is
/// kept and reused for as long as calls keep handing over that same jar. A
/// fresh jar per call (the `cookies::jar` plugin) still costs one client build,
/// including a new connection pool.
pub struct HttpTransport {
    client: Client,
    jar_client: Mutex<Option<(Arc<Jar>, Client)>>,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = builder(&config).build().map_err(TransportError::from)?;
        Ok(Self {
            client,
            jar_client: Mutex::new(None),
            config,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn client_for(&self, ctx: &Context) -> Result<Client> {
        let Some(jar) = &ctx.client.jar else {
            return Ok(self.client.clone());
        };

        let mut slot = self.jar_client.lock().unwrap_or_else(|p| p.into_inner());
        if let Some((cached, client)) = slot.as_ref() {
            if Arc::ptr_eq(cached, jar) {
                return Ok(client.clone());
            }
        }

        debug!("building client for cookie jar");
        let client = builder(&self.config)
            .cookie_provider(jar.clone())
            .build()
            .map_err(TransportError::from)?;
        *slot = Some((jar.clone(), client.clone()));
        Ok(client)
    }

    /// Sends the request held by `ctx`, consuming its body.
    pub fn execute(&self, ctx: &mut Context) -> Result<Response> {
        let url = ctx
            .request
            .url
            .clone()
            .ok_or_else(|| Error::configuration("request url is not set"))?;
        let client = self.client_for(ctx)?;

        let mut builder = client
            .request(ctx.request.method.clone(), url)
            .headers(ctx.request.headers.clone());
        match ctx.request.take_body() {
            Some((body, Some(len))) => builder = builder.body(Body::sized(body, len)),
            Some((body, None)) => builder = builder.body(Body::new(body)),
            None => {}
        }
        let request = builder.build().map_err(TransportError::from)?;
        debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let response = client.execute(request).map_err(TransportError::from)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(TransportError::from)?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn builder(config: &TransportConfig) -> ClientBuilder {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs));

    if let Some(proxy_url) = &config.proxy_url {
        match Proxy::all(proxy_url) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => warn!(error = %e, "ignoring invalid proxy url"),
        }
    }
    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
