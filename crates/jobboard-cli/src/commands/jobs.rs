//! Job commands.

use anyhow::{Context, Result, anyhow, bail};
use jobboard_core::JobRecord;
use reqwest::{StatusCode, Url};
use serde_json::Value;

pub async fn list(api_url: &str) -> Result<()> {
    let jobs = fetch_all(api_url).await?;
    if jobs.is_empty() {
        println!("No jobs");
        return Ok(());
    }
    for job in &jobs {
        println!("{}", summary_line(job));
    }
    println!("{} job(s)", jobs.len());
    Ok(())
}

pub async fn show(api_url: &str, id: &str) -> Result<()> {
    let url = job_url(api_url, id)?;
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to reach dashboard at {}", api_url))?;

    if response.status() == StatusCode::NOT_FOUND {
        bail!("Job {} not found", id);
    }
    let job: Value = response.error_for_status()?.json().await?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

/// `{api_url}/api/jobs/{id}`, with the id percent-encoded as one path segment.
fn job_url(api_url: &str, id: &str) -> Result<Url> {
    let mut url = Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("API URL cannot carry a path: {}", api_url))?
        .pop_if_empty()
        .extend(["api", "jobs", id]);
    Ok(url)
}

async fn fetch_all(api_url: &str) -> Result<Vec<JobRecord>> {
    let url = format!("{}/api/jobs", api_url.trim_end_matches('/'));
    let entries: Vec<Value> = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach dashboard at {}", api_url))?
        .error_for_status()?
        .json()
        .await?;

    entries
        .into_iter()
        .map(|entry| JobRecord::from_value(entry).map_err(|reason| anyhow!(reason)))
        .collect()
}

/// One line per job: the id, then every field as `key=value`.
fn summary_line(job: &JobRecord) -> String {
    let fields: Vec<String> = job
        .fields
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect();
    format!("{:<12} {}", job.id.as_str(), fields.join(" "))
}
