//! Health check endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn ready(State(ctx): State<AppContext>) -> Json<Value> {
    let jobs = ctx.jobs.read().await.len();
    let status = if ctx.channel.is_closed() {
        "degraded"
    } else {
        "ready"
    };
    Json(json!({
        "status": status,
        "jobs": jobs,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{context, get, json};
    use axum::http::StatusCode;
    use jobboard_config::JobTemplate;
    use serde_json::json;

    #[tokio::test]
    async fn test_ready_reports_job_count() {
        let (ctx, _inbox) = context(JobTemplate::Noop);
        ctx.jobs.write().await.load(vec![json!({"id": 1}), json!({"id": 2})]);

        let (status, body) = get(&ctx, "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({"status": "ready", "jobs": 2}));
    }

    #[tokio::test]
    async fn test_ready_degrades_without_dispatcher() {
        let (ctx, inbox) = context(JobTemplate::Noop);
        drop(inbox);

        let (_, body) = get(&ctx, "/health/ready").await;
        assert_eq!(json(&body)["status"], "degraded");
    }
}
