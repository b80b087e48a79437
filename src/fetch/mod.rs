//! HTTP plumbing for provider adapters.

mod basic;
mod client;
mod headers;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use headers::WithHeader;

use anyhow::{Context, Result};

/// GETs `url` and decodes the body as JSON. Non-2xx statuses are errors.
pub async fn fetch_json<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<serde_json::Value> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid url '{url}'"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.json().await?)
}
