use crate::catalog::{MetricSpec, ProviderSpec};
use crate::fetch::{HttpClient, fetch_json};
use crate::providers::{Origin, Provider, ProviderReport, Reading, extract_value};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// A provider that reads each of its metrics from a JSON endpoint.
pub struct JsonProvider<C> {
    spec: ProviderSpec,
    client: C,
}

impl<C: HttpClient> JsonProvider<C> {
    pub fn new(spec: ProviderSpec, client: C) -> Self {
        Self { spec, client }
    }

    async fn read_live(&self, metric: &MetricSpec) -> Result<f64> {
        let doc = fetch_json(&self.client, &metric.url).await?;
        Ok(extract_value(&doc, &metric.pointer, metric.field.as_deref())?)
    }
}

#[async_trait]
impl<C: HttpClient> Provider for JsonProvider<C> {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn fetch(&self) -> ProviderReport {
        let mut readings = Vec::with_capacity(self.spec.metrics.len());

        for metric in &self.spec.metrics {
            let (value, origin) = match self.read_live(metric).await {
                Ok(value) => {
                    debug!(metric = %metric.name, raw = value, "Live reading");
                    (value, Origin::Live)
                }
                Err(e) => {
                    warn!(
                        metric = %metric.name,
                        fallback = metric.fallback,
                        error = %e,
                        "Reading unavailable, using fallback"
                    );
                    (
                        metric.fallback,
                        Origin::Fallback {
                            reason: e.to_string(),
                        },
                    )
                }
            };

            readings.push(Reading {
                category: metric.category,
                metric: metric.name.clone(),
                value,
                origin,
            });
        }

        ProviderReport {
            provider: self.spec.name.clone(),
            readings,
        }
    }
}
