//! Live job dashboard for jobboard.
//!
//! Bootstraps the job collection over HTTP, keeps it in sync with the push
//! channel, and serves the result over a small HTTP API.

pub mod bootstrap;
pub mod error;
pub mod listener;
pub mod routes;
pub mod state;

pub use state::{AppContext, SharedJobs};
