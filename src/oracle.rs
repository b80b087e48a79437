//! One oracle run: collect raw readings, normalize, aggregate, derive the fee.

use crate::catalog::Catalog;
use crate::error::ScoreError;
use crate::providers::{Origin, Provider};
use crate::scoring::{
    ByCategory, EsgComposites, EsgMetrics, EsgScores, NormalizedScore, RangeTable, WeightTable,
    aggregate_esg, average_score, calculate_esg_fee,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, warn};

/// A raw value and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReading {
    pub value: f64,
    pub origin: Origin,
}

/// Raw readings for all categories, keyed by metric name.
pub type RawMetrics = ByCategory<BTreeMap<String, RawReading>>;

/// Everything produced by a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct EsgReport {
    pub timestamp: DateTime<Utc>,
    pub scores: EsgScores,
    pub composites: EsgComposites,
    pub average: u8,
    pub fee: f64,
    pub degraded: bool,
    pub raw_metrics: RawMetrics,
    pub normalized: EsgMetrics,
}

pub struct Oracle {
    providers: Vec<Arc<dyn Provider>>,
    ranges: RangeTable,
    weights: WeightTable,
}

impl Oracle {
    /// Validates the catalog ranges and the weights once, up front.
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        catalog: &Catalog,
        weights: WeightTable,
    ) -> Result<Self, ScoreError> {
        catalog.validate()?;
        weights.validate()?;
        Ok(Self {
            providers,
            ranges: catalog.ranges(),
            weights,
        })
    }

    /// Fetches and scores.
    #[tracing::instrument(skip(self), fields(providers = self.providers.len()))]
    pub async fn run_once(&self) -> Result<EsgReport, ScoreError> {
        info!("Oracle run started");
        let raw = self.collect().await;
        let report = self.score(raw)?;
        info!(
            environmental = report.scores.environmental,
            social = report.scores.social,
            governance = report.scores.governance,
            fee = report.fee,
            degraded = report.degraded,
            "Oracle run complete"
        );
        Ok(report)
    }

    /// Runs all providers concurrently and merges their readings.
    ///
    /// A later provider's reading for the same metric replaces an earlier
    /// one. A provider task that panics contributes nothing.
    pub async fn collect(&self) -> RawMetrics {
        let mut tasks = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let provider = provider.clone();
            let span = tracing::info_span!("provider", name = %provider.name());
            tasks.push(tokio::spawn(
                async move { provider.fetch().await }.instrument(span),
            ));
        }

        let mut raw = RawMetrics::default();
        for task in tasks {
            let report = match task.await {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, "Provider task failed");
                    continue;
                }
            };

            if report.fallback_count() > 0 {
                warn!(
                    provider = %report.provider,
                    fallbacks = report.fallback_count(),
                    "Provider returned degraded data"
                );
            }

            for reading in report.readings {
                let previous = raw.get_mut(reading.category).insert(
                    reading.metric.clone(),
                    RawReading {
                        value: reading.value,
                        origin: reading.origin,
                    },
                );
                if previous.is_some() {
                    debug!(
                        provider = %report.provider,
                        category = %reading.category,
                        metric = %reading.metric,
                        "Reading replaced an earlier value"
                    );
                }
            }
        }

        raw
    }

    /// Normalizes `raw` against the catalog ranges and aggregates it.
    ///
    /// Readings with no declared range are skipped.
    pub fn score(&self, raw: RawMetrics) -> Result<EsgReport, ScoreError> {
        let normalized: EsgMetrics = raw.try_map(|category, readings| -> Result<_, ScoreError> {
            let ranges = self.ranges.get(category);
            let mut metrics = BTreeMap::new();
            for (name, reading) in readings {
                let Some(range) = ranges.get(name) else {
                    debug!(%category, metric = %name, "No range declared, skipping");
                    continue;
                };
                let score = range.normalize(reading.value)?;
                debug!(%category, metric = %name, raw = reading.value, score, "Normalized");
                metrics.insert(
                    name.clone(),
                    NormalizedScore {
                        score,
                        degraded: reading.origin.is_fallback(),
                    },
                );
            }
            Ok(metrics)
        })?;

        let composites = aggregate_esg(&normalized, &self.weights)?;
        for (category, composite) in composites.iter() {
            if !composite.contributed {
                warn!(%category, "No weighted metrics contributed, composite is 0");
            }
        }

        let scores = composites.scores();
        Ok(EsgReport {
            timestamp: Utc::now(),
            average: average_score(&scores),
            fee: calculate_esg_fee(&scores),
            degraded: composites.any_degraded(),
            scores,
            composites,
            raw_metrics: raw,
            normalized,
        })
    }
}
