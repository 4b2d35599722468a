//! Posts a JSON body with a session cookie and prints the response.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example post_json -- https://httpbin.org/post

use http_plugins::plugins::{body, cookies, Chain};
use http_plugins::{Context, Dispatcher, Request, TransportConfig};
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
struct Greeting<'a> {
    from: &'a str,
    message: &'a str,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/post".to_string());

    let chain = Chain::new()
        .with(body::json(Greeting {
            from: "http-plugins",
            message: "hello",
        }))
        .with(cookies::set("session", "demo"))
        .with(cookies::jar());
    let dispatcher = Dispatcher::with_chain(chain, TransportConfig::from_env())?;

    let mut ctx = Context::with_request(Request::parse(Method::POST, &url)?);
    dispatcher.send(&mut ctx)?;

    if let Some(resp) = ctx.response {
        println!("Status: {}", resp.status);
        println!("{}", resp.text());
    }
    Ok(())
}
