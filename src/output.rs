//! Run reports and the CSV history log.

use anyhow::Result;
use tracing::{debug, info};

use crate::history::HistoryEntry;
use crate::oracle::EsgReport;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a human-readable summary of a run.
pub fn print_report(report: &EsgReport) {
    info!("ESG ORACLE REPORT ({})", report.timestamp.to_rfc3339());
    for (category, composite) in report.composites.iter() {
        let note = if !composite.contributed {
            " (no data)"
        } else if composite.degraded {
            " (includes fallback data)"
        } else {
            ""
        };
        info!("  {:<14} {:>3}{}", category.as_str(), composite.score, note);
    }
    info!("  Average score: {}", report.average);
    info!("  ESG fee:       {:.2}%", report.fee * 100.0);
}

/// Logs the full report as pretty-printed JSON.
pub fn print_json(report: &EsgReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Appends a [`HistoryEntry`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, entry: &HistoryEntry) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(entry)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::fixtures::report;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_print_report_does_not_panic() {
        print_report(&report(40));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report(40)).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("esg_oracle_test_create.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &HistoryEntry::from(&report(40))).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,environmental,social,governance,avgScore,fee"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("esg_oracle_test_header.csv");
        let _ = fs::remove_file(&path);

        let entry = HistoryEntry::from(&report(40));
        append_record(&path, &entry).unwrap();
        append_record(&path, &entry).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_round_trips_through_csv() {
        let path = temp_path("esg_oracle_test_read_back.csv");
        let _ = fs::remove_file(&path);

        let entry = HistoryEntry::from(&report(75));
        append_record(&path, &entry).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<HistoryEntry> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].environmental, 75);
        assert_eq!(rows[0].fee, entry.fee);

        fs::remove_file(&path).unwrap();
    }
}
