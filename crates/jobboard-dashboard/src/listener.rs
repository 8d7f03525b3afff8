//! Resolves `jobupdate` channel events to the synchronizer.

use async_trait::async_trait;
use jobboard_channel::{Dispatcher, EventHandler};
use jobboard_core::{Error, SyncOutcome, Synchronizer, UpdateEvent};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{AppContext, SharedJobs};

/// Applies each job update payload to the shared collection.
///
/// Every failure is logged and swallowed so the next event still runs.
pub struct JobUpdateHandler {
    jobs: SharedJobs,
    synchronizer: Synchronizer,
}

impl JobUpdateHandler {
    pub fn new(jobs: SharedJobs, synchronizer: Synchronizer) -> Self {
        Self { jobs, synchronizer }
    }
}

#[async_trait]
impl EventHandler for JobUpdateHandler {
    async fn handle(&mut self, payload: Value) {
        let event = match UpdateEvent::from_payload(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Discarding job update");
                return;
            }
        };

        // The write lock spans the whole merge; readers see all of it or none.
        let mut jobs = self.jobs.write().await;
        match self.synchronizer.apply(&mut jobs, event) {
            Ok(SyncOutcome::Merged { id, changed }) => {
                debug!(job_id = %id, ?changed, "Job updated");
            }
            Ok(SyncOutcome::Inserted { id }) => {
                info!(job_id = %id, "Job added from update");
            }
            Err(Error::UnknownReference { id, payload }) => {
                warn!(job_id = %id, %payload, "Unknown job with id: {id}");
            }
            Err(e) => {
                warn!(error = %e, "Job update not applied");
            }
        }
    }
}

/// Build the dispatcher with the job update handler subscribed to the
/// configured event name.
pub fn dispatcher(ctx: &AppContext) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.subscribe(
        ctx.config.event.clone(),
        JobUpdateHandler::new(ctx.jobs.clone(), ctx.synchronizer),
    );
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_channel::{Inbox, inbox};
    use jobboard_config::{JobTemplate, parse_dashboard_config};
    use jobboard_core::{JobId, JobRecord};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn context(policy: &str) -> (AppContext, Inbox) {
        let config = parse_dashboard_config(&format!(
            r#"
            dashboard {{
                fetch-url "http://127.0.0.1:9/suite/jobs"
                channel-url "ws://127.0.0.1:9/socket"
                unknown-jobs "{policy}"
            }}
            "#
        ))
        .unwrap();
        let (handle, inbox) = inbox(16);
        (AppContext::new(config, JobTemplate::Noop, handle), inbox)
    }

    async fn seed(ctx: &AppContext) {
        ctx.jobs.write().await.load(vec![
            json!({"id": "X", "a": 0, "b": 2}),
            json!({"id": "Y", "status": "queued"}),
        ]);
    }

    /// Close the context's senders and drain the inbox through the dispatcher.
    async fn drain(ctx: AppContext, inbox: Inbox) -> SharedJobs {
        let jobs = ctx.jobs.clone();
        let dispatcher = dispatcher(&ctx);
        drop(ctx);
        dispatcher.run(inbox, CancellationToken::new()).await;
        jobs
    }

    async fn record(jobs: &SharedJobs, id: &str) -> Option<JobRecord> {
        jobs.read().await.find(&JobId::from(id)).cloned()
    }

    #[tokio::test]
    async fn test_channel_frames_merge_in_order() {
        let (ctx, inbox) = context("ignore");
        seed(&ctx).await;

        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"id":"X","a":1}}"#)
            .await
            .unwrap();
        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"id":"X","a":2,"c":true}}"#)
            .await
            .unwrap();

        let jobs = drain(ctx, inbox).await;
        let x = record(&jobs, "X").await.unwrap();
        assert_eq!(x.to_value(), json!({"id": "X", "a": 2, "b": 2, "c": true}));
    }

    #[tokio::test]
    async fn test_bad_events_do_not_block_later_ones() {
        let (ctx, inbox) = context("ignore");
        seed(&ctx).await;

        ctx.channel.push_frame("garbage").await.unwrap();
        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"status":"no id"}}"#)
            .await
            .unwrap();
        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"id":"Z","status":"new"}}"#)
            .await
            .unwrap();
        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"id":"Y","status":"done"}}"#)
            .await
            .unwrap();

        let jobs = drain(ctx, inbox).await;
        assert_eq!(jobs.read().await.len(), 2);
        assert!(record(&jobs, "Z").await.is_none());
        assert_eq!(record(&jobs, "Y").await.unwrap().fields["status"], "done");
    }

    #[tokio::test]
    async fn test_insert_policy_adds_unknown_jobs() {
        let (ctx, inbox) = context("insert");
        seed(&ctx).await;

        ctx.channel
            .push_frame(r#"{"event":"jobupdate","data":{"id":"Z","status":"new"}}"#)
            .await
            .unwrap();

        let jobs = drain(ctx, inbox).await;
        assert_eq!(jobs.read().await.len(), 3);
        assert_eq!(record(&jobs, "Z").await.unwrap().fields["status"], "new");
    }

    #[tokio::test]
    async fn test_relay_matches_native_channel_event() {
        let payload = json!({"id": "X", "status": "done"});

        let (native, native_inbox) = context("ignore");
        seed(&native).await;
        native
            .channel
            .push_frame(json!({"event": "jobupdate", "data": payload}).to_string())
            .await
            .unwrap();
        let native_jobs = drain(native, native_inbox).await;

        let (relayed, relayed_inbox) = context("ignore");
        seed(&relayed).await;
        relayed.relay.jobupdate(payload.clone()).await.unwrap();
        let relayed_jobs = drain(relayed, relayed_inbox).await;

        let native_x = record(&native_jobs, "X").await.unwrap();
        let relayed_x = record(&relayed_jobs, "X").await.unwrap();
        assert_eq!(native_x.to_value(), relayed_x.to_value());
        assert_eq!(native_x.revision, relayed_x.revision);
        assert_eq!(
            relayed_x.to_value(),
            json!({"id": "X", "a": 0, "b": 2, "status": "done"})
        );
    }
}
