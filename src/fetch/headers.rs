use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};

/// An [`HttpClient`] wrapper that sets one header on every request.
///
/// The header is parsed once at construction, so a bad name or value is
/// reported before any request is sent.
pub struct WithHeader<C> {
    inner: C,
    name: HeaderName,
    value: HeaderValue,
}

impl<C> WithHeader<C> {
    /// Identifies the oracle to the upstream API. Some providers (SEC EDGAR)
    /// reject requests without a descriptive user agent.
    pub fn user_agent(inner: C, agent: &str) -> Result<Self> {
        let value = HeaderValue::from_str(agent)
            .with_context(|| format!("invalid user agent '{agent}'"))?;
        Ok(Self {
            inner,
            name: USER_AGENT,
            value,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for WithHeader<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
