//! CLI command implementations.

pub mod jobs;

use anyhow::{Context, Result, bail};
use jobboard_config::{JobTemplate, load_config};
use jobboard_core::JobRecord;
use serde_json::Value;

/// Push one job payload through the dashboard's legacy relay.
pub async fn relay(api_url: &str, payload: &str) -> Result<()> {
    let payload = parse_payload(payload)?;
    post_relay(api_url, &payload).await?;
    println!("Relayed update for job {}", payload["id"]);
    Ok(())
}

async fn post_relay(api_url: &str, payload: &Value) -> Result<()> {
    let url = format!("{}/legacy/jobupdate", api_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(payload)
        .send()
        .await
        .with_context(|| format!("Failed to reach dashboard at {}", api_url))?;

    if !response.status().is_success() {
        bail!(
            "Dashboard rejected update: {} {}",
            response.status(),
            response.text().await.unwrap_or_default()
        );
    }
    Ok(())
}

fn parse_payload(payload: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(payload).context("Payload is not valid JSON")?;
    if !value.is_object() {
        bail!("Payload must be a JSON object");
    }
    if value.get("id").is_none() {
        bail!("Payload must carry an id");
    }
    Ok(value)
}

/// Expand a template file for a job given as JSON.
pub fn render_template(template_path: &str, job: &str) -> Result<()> {
    let source = std::fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read template: {}", template_path))?;
    let template = JobTemplate::compile(&source)
        .with_context(|| format!("Failed to compile template: {}", template_path))?;

    let job: Value = serde_json::from_str(job).context("Job is not valid JSON")?;
    let record = JobRecord::from_value(job).map_err(|reason| anyhow::anyhow!(reason))?;

    println!("{}", template.render(&record));
    Ok(())
}

pub fn validate(path: &str) -> Result<()> {
    match load_config(path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  dashboard:   {}", config.name);
            println!("  fetch url:   {}", config.fetch_url);
            println!("  channel url: {}", config.channel_url);
            println!("  event:       {}", config.event);
            println!("  listen:      {}", config.listen);
            if let Some(template) = &config.template {
                let template = template.display().to_string();
                match std::fs::read_to_string(&template)
                    .map_err(anyhow::Error::from)
                    .and_then(|s| JobTemplate::compile(&s).map_err(anyhow::Error::from))
                {
                    Ok(compiled) => println!(
                        "  template:    {} ({} placeholders)",
                        template,
                        compiled.placeholders().len()
                    ),
                    Err(e) => println!("  template:    {} (unusable, will render empty: {})", template, e),
                }
            }
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
