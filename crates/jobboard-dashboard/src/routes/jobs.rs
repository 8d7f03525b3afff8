//! Read access to the job collection.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use jobboard_core::{JobId, JobRecord};

use crate::AppContext;
use crate::error::ApiError;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_jobs))
        .route("/{id}", get(get_job))
}

async fn list_jobs(State(ctx): State<AppContext>) -> Json<Vec<JobRecord>> {
    let jobs = ctx.jobs.read().await;
    Json(jobs.iter().cloned().collect())
}

async fn get_job(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    let jobs = ctx.jobs.read().await;
    jobs.find(&JobId::from(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{context, get, json};
    use axum::http::StatusCode;
    use jobboard_config::JobTemplate;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_returns_jobs_in_order() {
        let (ctx, _inbox) = context(JobTemplate::Noop);
        ctx.jobs
            .write()
            .await
            .load(vec![json!({"id": 2, "s": "b"}), json!({"id": 1, "s": "a"})]);

        let (status, body) = get(&ctx, "/api/jobs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json(&body),
            json!([{"id": "2", "s": "b"}, {"id": "1", "s": "a"}])
        );
    }

    #[tokio::test]
    async fn test_get_single_job() {
        let (ctx, _inbox) = context(JobTemplate::Noop);
        ctx.jobs.write().await.load(vec![json!({"id": 7, "s": "x"})]);

        let (status, body) = get(&ctx, "/api/jobs/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({"id": "7", "s": "x"}));

        let (status, body) = get(&ctx, "/api/jobs/8").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body), json!({"error": "job 8"}));
    }
}
