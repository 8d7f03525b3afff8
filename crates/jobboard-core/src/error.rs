//! Error types for jobboard.

use serde_json::Value;
use thiserror::Error;

use crate::JobId;

#[derive(Debug, Error)]
pub enum Error {
    /// A bootstrap entry could not be turned into a job record.
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A channel payload could not be decoded into an update event.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// An update event names a job the collection does not hold.
    #[error("unknown job with id: {id}")]
    UnknownReference { id: JobId, payload: Value },
}

pub type Result<T> = std::result::Result<T, Error>;
