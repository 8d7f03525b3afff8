//! Application context.

use std::sync::Arc;

use jobboard_channel::{ChannelHandle, LegacyRelay};
use jobboard_config::{DashboardConfig, JobTemplate};
use jobboard_core::{JobCollection, Synchronizer};
use tokio::sync::RwLock;

/// The job collection shared between the sync loop (sole writer) and the
/// HTTP handlers (readers).
pub type SharedJobs = Arc<RwLock<JobCollection>>;

/// Everything the dashboard's components share, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DashboardConfig>,
    pub jobs: SharedJobs,
    pub template: Arc<JobTemplate>,
    pub synchronizer: Synchronizer,
    /// Sending side of the push channel inbox.
    pub channel: ChannelHandle,
    pub relay: LegacyRelay,
}

impl AppContext {
    pub fn new(config: DashboardConfig, template: JobTemplate, channel: ChannelHandle) -> Self {
        let relay = LegacyRelay::new(channel.clone(), config.event.clone());
        let synchronizer = Synchronizer::new(config.unknown_jobs);

        Self {
            config: Arc::new(config),
            jobs: Arc::new(RwLock::new(JobCollection::new())),
            template: Arc::new(template),
            synchronizer,
            channel,
            relay,
        }
    }
}
