//! Optional upload of results to S3 for static hosting.

use crate::history::HistoryEntry;
use crate::oracle::EsgReport;
use serde::Serialize;
use tracing::info;

pub const LATEST_KEY: &str = "esg/latest.json";
pub const HISTORY_KEY: &str = "esg/history.json";

/// Dashboards poll these objects, so caches must not hold them past a poll.
const CACHE_CONTROL: &str = "max-age=30";

async fn put_json(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> anyhow::Result<usize> {
    let body = serde_json::to_vec(value)?;
    let size = body.len();

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .cache_control(CACHE_CONTROL)
        .send()
        .await?;

    Ok(size)
}

/// Uploads the latest report and the current history.
#[tracing::instrument(skip(client, report, history))]
pub async fn publish(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    report: &EsgReport,
    history: &[HistoryEntry],
) -> anyhow::Result<()> {
    let latest_bytes = put_json(client, bucket, LATEST_KEY, report).await?;
    let history_bytes = put_json(client, bucket, HISTORY_KEY, &history).await?;
    info!(
        entries = history.len(),
        latest_bytes, history_bytes, "Published results to S3"
    );
    Ok(())
}
