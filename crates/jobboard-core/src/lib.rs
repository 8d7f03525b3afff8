//! Core domain types for the jobboard dashboard.
//!
//! This crate contains:
//! - Job identifiers and job records
//! - The identifier-indexed job collection
//! - Update events decoded from the push channel
//! - The synchronizer that merges updates into the collection

pub mod collection;
pub mod error;
pub mod event;
pub mod id;
pub mod job;
pub mod sync;

pub use collection::{JobCollection, LoadReport};
pub use error::{Error, Result};
pub use event::UpdateEvent;
pub use id::JobId;
pub use job::JobRecord;
pub use sync::{SyncOutcome, Synchronizer, UnknownJobPolicy};
