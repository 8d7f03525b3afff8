//! Initial load of the job collection from the fetch endpoint.

use jobboard_config::DashboardConfig;
use jobboard_core::LoadReport;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::AppContext;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to fetch jobs: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetch the raw job list.
///
/// Sends `GET fetch_url`, adding `?sort=` when a sort key is configured.
/// The body must be a JSON array; its entries are validated later by
/// [`jobboard_core::JobCollection::load`].
pub async fn fetch_jobs(config: &DashboardConfig) -> Result<Vec<Value>, BootstrapError> {
    let client = reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .build()?;

    let mut request = client.get(config.fetch_url.clone());
    if let Some(sort) = &config.fetch_sort {
        request = request.query(&[("sort", sort)]);
    }

    let entries = request
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Value>>()
        .await?;

    Ok(entries)
}

/// Fetch jobs and load them into the shared collection.
///
/// Malformed entries are logged and skipped; the rest load.
pub async fn bootstrap(ctx: &AppContext) -> Result<LoadReport, BootstrapError> {
    info!(url = %ctx.config.fetch_url, "Fetching jobs");
    let entries = fetch_jobs(&ctx.config).await?;
    let fetched = entries.len();

    let report = ctx.jobs.write().await.load(entries);

    for rejected in &report.rejected {
        warn!(error = %rejected, "Skipping job entry");
    }
    info!(
        fetched,
        loaded = report.loaded,
        skipped = report.rejected.len(),
        merged_duplicates = report.merged_duplicates,
        "Jobs loaded"
    );

    Ok(report)
}
