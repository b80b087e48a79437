//! Periodic oracle runs and what happens with their results.

use crate::history::HistoryEntry;
use crate::oracle::{EsgReport, Oracle};
use crate::output::{append_record, print_report};
use crate::publish::publish;
use crate::server::SharedState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Where successful runs are written besides the in-memory state.
#[derive(Default)]
pub struct Sinks {
    pub csv_path: Option<PathBuf>,
    pub s3: Option<S3Target>,
}

pub struct S3Target {
    pub client: aws_sdk_s3::Client,
    pub bucket: String,
}

impl Sinks {
    /// Sink failures are logged and never fail the run.
    async fn write(&self, report: &EsgReport, entry: &HistoryEntry, history: &[HistoryEntry]) {
        if let Some(path) = &self.csv_path {
            if let Err(e) = append_record(path, entry) {
                error!(path = %path.display(), error = %e, "Failed to append history CSV");
            }
        }

        if let Some(target) = &self.s3 {
            if let Err(e) = publish(&target.client, &target.bucket, report, history).await {
                error!(bucket = %target.bucket, error = %e, "Failed to publish to S3");
            }
        }
    }
}

/// Runs the oracle once and records the outcome in `state`.
///
/// Returns `true` if the run succeeded.
pub async fn run_and_record(oracle: &Oracle, state: &SharedState, sinks: &Sinks) -> bool {
    match oracle.run_once().await {
        Ok(report) => {
            print_report(&report);
            let (entry, history) = {
                let mut guard = state.write().await;
                let entry = guard.record_success(report.clone());
                (entry, guard.history().to_vec())
            };
            sinks.write(&report, &entry, &history).await;
            true
        }
        Err(e) => {
            error!(error = %e, configuration = e.is_configuration(), "Oracle run failed");
            state.write().await.record_failure(e.to_string());
            false
        }
    }
}

/// Runs immediately, then every `every`, forever.
pub async fn run_schedule(oracle: Arc<Oracle>, state: SharedState, sinks: Sinks, every: Duration) {
    info!(every_minutes = every.as_secs() / 60, "Oracle schedule set");

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        run_and_record(&oracle, &state, &sinks).await;
    }
}
