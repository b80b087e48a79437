//! Provider adapters: the plumbing between public APIs and the scoring core.
//!
//! A provider never fails outright. Every metric it declares comes back as a
//! [`Reading`], either live or carrying the catalog fallback value with the
//! reason the live value was unavailable.

mod extract;
mod fixed;
mod json;

pub use extract::{ExtractError, extract_value};
pub use fixed::StaticProvider;
pub use json::JsonProvider;

use crate::catalog::Catalog;
use crate::fetch::{BasicClient, WithHeader};
use crate::scoring::Category;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Where a raw value came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    Live,
    Fallback { reason: String },
}

impl Origin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Origin::Fallback { .. })
    }
}

/// One raw measurement reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub category: Category,
    pub metric: String,
    pub value: f64,
    pub origin: Origin,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderReport {
    pub provider: String,
    pub readings: Vec<Reading>,
}

impl ProviderReport {
    pub fn fallback_count(&self) -> usize {
        self.readings.iter().filter(|r| r.origin.is_fallback()).count()
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Reads every metric this provider is responsible for.
    async fn fetch(&self) -> ProviderReport;
}

/// Builds one HTTP-backed provider per catalog entry.
pub fn build_providers(catalog: &Catalog, timeout: Duration) -> Result<Vec<Arc<dyn Provider>>> {
    catalog
        .providers()
        .iter()
        .map(|spec| -> Result<Arc<dyn Provider>> {
            let client =
                WithHeader::user_agent(BasicClient::with_timeout(timeout)?, &spec.user_agent)?;
            Ok(Arc::new(JsonProvider::new(spec.clone(), client)))
        })
        .collect()
}

/// Offline stand-ins that report every catalog fallback.
pub fn offline_providers(catalog: &Catalog) -> Vec<Arc<dyn Provider>> {
    catalog
        .providers()
        .iter()
        .map(|spec| Arc::new(StaticProvider::fallbacks(spec)) as Arc<dyn Provider>)
        .collect()
}
