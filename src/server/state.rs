//! State shared between the scheduler and the HTTP handlers.

use crate::history::{History, HistoryEntry};
use crate::oracle::EsgReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Latest run outcome as served by `/api/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Initializing {
        timestamp: DateTime<Utc>,
        message: String,
    },
    Success {
        timestamp: DateTime<Utc>,
        #[serde(rename = "lastUpdate")]
        last_update: String,
        data: Arc<EsgReport>,
    },
    /// The last run failed. `previous` is the most recent good report.
    Error {
        timestamp: DateTime<Utc>,
        #[serde(rename = "lastUpdate")]
        last_update: String,
        error: String,
        previous: Option<Arc<EsgReport>>,
    },
}

impl Status {
    pub fn last_good(&self) -> Option<&Arc<EsgReport>> {
        match self {
            Status::Initializing { .. } => None,
            Status::Success { data, .. } => Some(data),
            Status::Error { previous, .. } => previous.as_ref(),
        }
    }
}

fn display_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[derive(Debug)]
pub struct OracleState {
    status: Status,
    history: History,
    started: Instant,
}

impl OracleState {
    pub fn new(history_size: usize) -> Self {
        Self {
            status: Status::Initializing {
                timestamp: Utc::now(),
                message: "ESG Oracle is starting up...".into(),
            },
            history: History::new(history_size),
            started: Instant::now(),
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Publishes a report and appends it to the history.
    pub fn record_success(&mut self, report: EsgReport) -> HistoryEntry {
        let entry = HistoryEntry::from(&report);
        self.history.push(entry.clone());
        self.status = Status::Success {
            timestamp: report.timestamp,
            last_update: display_time(report.timestamp),
            data: Arc::new(report),
        };
        entry
    }

    /// Marks the latest run as failed, keeping the last good report.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        let now = Utc::now();
        let previous = self.status.last_good().cloned();
        self.status = Status::Error {
            timestamp: now,
            last_update: display_time(now),
            error: error.into(),
            previous,
        };
    }
}

/// Handle passed to the scheduler and the HTTP layer.
pub type SharedState = Arc<RwLock<OracleState>>;

pub fn shared(history_size: usize) -> SharedState {
    Arc::new(RwLock::new(OracleState::new(history_size)))
}
