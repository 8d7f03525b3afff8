//! KDL configuration and job templates for jobboard.
//!
//! This crate handles:
//! - Dashboard configuration (jobboard.kdl)
//! - Job template compilation and rendering

pub mod dashboard;
pub mod error;
pub mod template;

pub use dashboard::{DashboardConfig, ReconnectSettings, load_config, parse_dashboard_config};
pub use error::{ConfigError, ConfigResult};
pub use template::{JobTemplate, load_template};
