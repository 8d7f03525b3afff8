//! Synchronizer: applies update events to the job collection.

use crate::{Error, JobCollection, JobId, JobRecord, Result, UpdateEvent};

/// What to do with an update for a job the collection has never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownJobPolicy {
    /// Leave the collection untouched and report `UnknownReference`.
    #[default]
    Ignore,
    /// Treat the event as a job created after the bootstrap fetch.
    Insert,
}

impl std::str::FromStr for UnknownJobPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "insert" => Ok(Self::Insert),
            other => Err(format!("unknown policy '{other}', expected 'ignore' or 'insert'")),
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fields were merged into an existing record. `changed` lists the keys
    /// whose value differed; it is empty for a redelivered event.
    Merged { id: JobId, changed: Vec<String> },
    /// A new record was created under [`UnknownJobPolicy::Insert`].
    Inserted { id: JobId },
}

/// Merges update events into a [`JobCollection`].
///
/// The caller owns serialization: `apply` takes the collection by `&mut`,
/// so a merge is never visible half-done to readers sharing the
/// collection behind a lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synchronizer {
    policy: UnknownJobPolicy,
}

impl Synchronizer {
    pub fn new(policy: UnknownJobPolicy) -> Self {
        Self { policy }
    }

    /// Apply one event.
    ///
    /// Known id: shallow merge. Unknown id: `UnknownReference` with the
    /// payload attached, or an insert when the policy says so.
    pub fn apply(&self, jobs: &mut JobCollection, event: UpdateEvent) -> Result<SyncOutcome> {
        if let Some(record) = jobs.find_mut(&event.id) {
            let changed = record.merge(event.fields);
            return Ok(SyncOutcome::Merged {
                id: event.id,
                changed,
            });
        }

        match self.policy {
            UnknownJobPolicy::Ignore => Err(Error::UnknownReference {
                payload: event.to_payload(),
                id: event.id,
            }),
            UnknownJobPolicy::Insert => {
                let id = event.id.clone();
                let record = JobRecord::new(event.id, event.fields);
                jobs.insert(record)
                    .map_err(|r| Error::InvalidEvent(format!("job {} appeared twice", r.id)))?;
                Ok(SyncOutcome::Inserted { id })
            }
        }
    }

    /// Decode a raw channel payload and apply it.
    pub fn apply_payload(
        &self,
        jobs: &mut JobCollection,
        payload: serde_json::Value,
    ) -> Result<SyncOutcome> {
        let event = UpdateEvent::from_payload(payload)?;
        self.apply(jobs, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn jobs() -> JobCollection {
        let mut jobs = JobCollection::new();
        jobs.load(vec![
            json!({"id": "X", "a": 0, "b": 2}),
            json!({"id": "Y", "status": "queued"}),
        ]);
        jobs
    }

    fn fields_of(jobs: &JobCollection, id: &str) -> Value {
        jobs.find(&id.into()).unwrap().to_value()
    }

    #[test]
    fn test_partial_merge_keeps_untouched_fields() {
        let mut jobs = jobs();
        let outcome = Synchronizer::default()
            .apply_payload(&mut jobs, json!({"id": "X", "a": 1}))
            .unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Merged {
                id: "X".into(),
                changed: vec!["a".to_string()],
            }
        );
        assert_eq!(fields_of(&jobs, "X"), json!({"id": "X", "a": 1, "b": 2}));
    }

    #[test]
    fn test_unknown_reference_leaves_collection_unchanged() {
        let mut jobs = jobs();
        let before: Vec<Value> = jobs.iter().map(JobRecord::to_value).collect();

        let err = Synchronizer::default()
            .apply_payload(&mut jobs, json!({"id": "Z", "status": "done"}))
            .unwrap_err();

        match err {
            Error::UnknownReference { id, payload } => {
                assert_eq!(id, JobId::from("Z"));
                assert_eq!(payload, json!({"id": "Z", "status": "done"}));
            }
            other => panic!("Expected UnknownReference, got {other:?}"),
        }
        let after: Vec<Value> = jobs.iter().map(JobRecord::to_value).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_insert_policy_creates_record() {
        let mut jobs = jobs();
        let sync = Synchronizer::new(UnknownJobPolicy::Insert);
        let outcome = sync
            .apply_payload(&mut jobs, json!({"id": 7, "status": "new"}))
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Inserted { id: JobId::from(7) });
        assert_eq!(jobs.len(), 3);
        assert_eq!(fields_of(&jobs, "7"), json!({"id": "7", "status": "new"}));
    }

    #[test]
    fn test_last_write_wins_in_delivery_order() {
        let sync = Synchronizer::default();

        let mut forward = jobs();
        sync.apply_payload(&mut forward, json!({"id": "X", "a": 1})).unwrap();
        sync.apply_payload(&mut forward, json!({"id": "X", "a": 2})).unwrap();
        assert_eq!(forward.find(&"X".into()).unwrap().fields["a"], 2);

        let mut reverse = jobs();
        sync.apply_payload(&mut reverse, json!({"id": "X", "a": 2})).unwrap();
        sync.apply_payload(&mut reverse, json!({"id": "X", "a": 1})).unwrap();
        assert_eq!(reverse.find(&"X".into()).unwrap().fields["a"], 1);
    }

    #[test]
    fn test_redelivery_is_idempotent() {
        let mut jobs = jobs();
        let sync = Synchronizer::default();
        let event = json!({"id": "Y", "status": "done"});

        sync.apply_payload(&mut jobs, event.clone()).unwrap();
        let first = fields_of(&jobs, "Y");
        let outcome = sync.apply_payload(&mut jobs, event).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Merged {
                id: "Y".into(),
                changed: vec![],
            }
        );
        assert_eq!(fields_of(&jobs, "Y"), first);
    }

    #[test]
    fn test_event_without_id_is_invalid() {
        let mut jobs = jobs();
        let err = Synchronizer::default()
            .apply_payload(&mut jobs, json!({"status": "done"}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("insert".parse::<UnknownJobPolicy>(), Ok(UnknownJobPolicy::Insert));
        assert!("drop".parse::<UnknownJobPolicy>().is_err());
    }
}
