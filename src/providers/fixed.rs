use crate::catalog::ProviderSpec;
use crate::providers::{Origin, Provider, ProviderReport, Reading};
use async_trait::async_trait;

/// A provider that always reports the same readings.
pub struct StaticProvider {
    name: String,
    readings: Vec<Reading>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            name: name.into(),
            readings,
        }
    }

    /// Reports every catalog fallback for `spec` without touching the
    /// network.
    pub fn fallbacks(spec: &ProviderSpec) -> Self {
        let readings = spec
            .metrics
            .iter()
            .map(|m| Reading {
                category: m.category,
                metric: m.name.clone(),
                value: m.fallback,
                origin: Origin::Fallback {
                    reason: "offline".into(),
                },
            })
            .collect();
        Self::new(spec.name.clone(), readings)
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> ProviderReport {
        ProviderReport {
            provider: self.name.clone(),
            readings: self.readings.clone(),
        }
    }
}
