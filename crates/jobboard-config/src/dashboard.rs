//! Dashboard configuration parsing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobboard_core::UnknownJobPolicy;
use kdl::{KdlDocument, KdlNode};
use url::Url;

use crate::{ConfigError, ConfigResult};

/// Event name the server uses for job updates.
pub const DEFAULT_EVENT: &str = "jobupdate";

/// Everything the dashboard needs to start.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Display name, taken from the `dashboard` node's argument.
    pub name: String,
    /// Endpoint returning the initial list of jobs.
    pub fetch_url: Url,
    /// Optional `sort` query parameter for the bootstrap fetch.
    pub fetch_sort: Option<String>,
    /// Timeout for the bootstrap fetch.
    pub fetch_timeout: Duration,
    /// WebSocket endpoint of the push channel.
    pub channel_url: Url,
    /// Channel event carrying job updates.
    pub event: String,
    /// Job template file. `None` renders nothing.
    pub template: Option<PathBuf>,
    /// What to do with updates for unknown jobs.
    pub unknown_jobs: UnknownJobPolicy,
    /// Address the dashboard HTTP server binds to.
    pub listen: SocketAddr,
    /// Capacity of the inbound message queue.
    pub inbox_capacity: usize,
    /// Push channel reconnect backoff.
    pub reconnect: ReconnectSettings,
}

/// Exponential backoff parameters for the push channel.
#[derive(Debug, Clone)]
pub struct ReconnectSettings {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectSettings {
    /// The delay following `current`, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }
}

/// Read and parse a dashboard configuration file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<DashboardConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_dashboard_config(&content)
}

/// Parse a dashboard configuration from KDL text.
pub fn parse_dashboard_config(kdl: &str) -> ConfigResult<DashboardConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let node = doc
        .nodes()
        .iter()
        .find(|n| n.name().value() == "dashboard")
        .ok_or_else(|| ConfigError::MissingField("dashboard".to_string()))?;

    let name = get_first_string_arg(node).unwrap_or_else(|| "jobboard".to_string());

    let mut fetch_url = None;
    let mut fetch_sort = None;
    let mut fetch_timeout = Duration::from_secs(30);
    let mut channel_url = None;
    let mut event = DEFAULT_EVENT.to_string();
    let mut template = None;
    let mut unknown_jobs = UnknownJobPolicy::default();
    let mut listen: SocketAddr = ([0, 0, 0, 0], 3000).into();
    let mut inbox_capacity = 256;
    let mut reconnect = ReconnectSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value();
            match key {
                "fetch-url" => {
                    fetch_url = Some(parse_url(key, &required_string(child)?, &["http", "https"])?);
                }
                "fetch-sort" => {
                    fetch_sort = Some(required_string(child)?);
                }
                "fetch-timeout-secs" => {
                    fetch_timeout = Duration::from_secs(required_u64(child)?);
                }
                "channel-url" => {
                    channel_url = Some(parse_url(key, &required_string(child)?, &["ws", "wss"])?);
                }
                "event" => {
                    event = required_string(child)?;
                    if event.is_empty() {
                        return Err(invalid(key, "event name must not be empty"));
                    }
                }
                "template" => {
                    template = Some(PathBuf::from(required_string(child)?));
                }
                "unknown-jobs" => {
                    unknown_jobs = required_string(child)?
                        .parse()
                        .map_err(|message: String| invalid(key, &message))?;
                }
                "listen" => {
                    listen = required_string(child)?
                        .parse()
                        .map_err(|e| invalid(key, &format!("{e}")))?;
                }
                "inbox-capacity" => {
                    inbox_capacity = required_u64(child)? as usize;
                    if inbox_capacity == 0 {
                        return Err(invalid(key, "capacity must be at least 1"));
                    }
                }
                "reconnect" => {
                    reconnect = parse_reconnect(child)?;
                }
                _ => {} // Ignore unknown nodes
            }
        }
    }

    Ok(DashboardConfig {
        name,
        fetch_url: fetch_url.ok_or_else(|| ConfigError::MissingField("fetch-url".to_string()))?,
        fetch_sort,
        fetch_timeout,
        channel_url: channel_url
            .ok_or_else(|| ConfigError::MissingField("channel-url".to_string()))?,
        event,
        template,
        unknown_jobs,
        listen,
        inbox_capacity,
        reconnect,
    })
}

fn parse_reconnect(node: &KdlNode) -> ConfigResult<ReconnectSettings> {
    let mut settings = ReconnectSettings::default();

    if let Some(ms) = get_u64_prop(node, "initial-ms")? {
        // The delay only ever grows by multiplication, so it must start above zero.
        if ms == 0 {
            return Err(invalid("initial-ms", "must be at least 1"));
        }
        settings.initial_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = get_u64_prop(node, "max-ms")? {
        settings.max_delay = Duration::from_millis(ms);
    }
    if let Some(value) = node.get("multiplier") {
        let multiplier = value
            .as_float()
            .or_else(|| value.as_integer().map(|i| i as f64))
            .ok_or_else(|| invalid("reconnect multiplier", "expected a number"))?;
        if multiplier < 1.0 {
            return Err(invalid("reconnect multiplier", "must be at least 1.0"));
        }
        settings.multiplier = multiplier;
    }

    if settings.initial_delay > settings.max_delay {
        return Err(invalid("reconnect", "initial-ms exceeds max-ms"));
    }

    Ok(settings)
}

fn parse_url(field: &str, raw: &str, schemes: &[&str]) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|e| invalid(field, &e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(
            field,
            &format!("scheme '{}' not one of {:?}", url.scheme(), schemes),
        ));
    }
    Ok(url)
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn required_string(node: &KdlNode) -> ConfigResult<String> {
    get_first_string_arg(node).ok_or_else(|| {
        invalid(node.name().value(), "expected a string argument")
    })
}

fn required_u64(node: &KdlNode) -> ConfigResult<u64> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| invalid(node.name().value(), "expected a non-negative integer"))
}

fn get_u64_prop(node: &KdlNode, name: &str) -> ConfigResult<Option<u64>> {
    match node.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| invalid(name, "expected a non-negative integer")),
    }
}
