//! Bounded history of run summaries for charts.

use crate::oracle::EsgReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One successful run, flattened for plotting and the CSV log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub environmental: u8,
    pub social: u8,
    pub governance: u8,
    pub avg_score: u8,
    pub fee: f64,
    pub degraded: bool,
}

impl From<&EsgReport> for HistoryEntry {
    fn from(report: &EsgReport) -> Self {
        Self {
            timestamp: report.timestamp,
            environmental: report.scores.environmental,
            social: report.scores.social,
            governance: report.scores.governance,
            avg_score: report.average,
            fee: report.fee,
            degraded: report.degraded,
        }
    }
}

/// Fixed-capacity ring buffer; pushing onto a full buffer drops the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub const DEFAULT_CAPACITY: usize = 24;

    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(minute: u32, environmental: u8) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, minute, 0).unwrap(),
            environmental,
            social: 0,
            governance: 0,
            avg_score: environmental / 3,
            fee: 0.5,
            degraded: false,
        }
    }

    #[test]
    fn test_push_within_capacity() {
        let mut history = History::new(3);
        history.push(entry(0, 10));
        history.push(entry(1, 20));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().environmental, 20);
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut history = History::default();
        for minute in 0..30 {
            history.push(entry(minute, minute as u8));
        }

        assert_eq!(history.len(), 24);
        let kept: Vec<u8> = history.iter().map(|e| e.environmental).collect();
        assert_eq!(kept.first(), Some(&6));
        assert_eq!(kept.last(), Some(&29));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut history = History::new(0);
        history.push(entry(0, 1));
        history.push(entry(1, 2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.to_vec(), vec![entry(1, 2)]);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry(0, 40)).unwrap();
        assert_eq!(json["avgScore"], 13);
        assert_eq!(json["environmental"], 40);
    }
}
