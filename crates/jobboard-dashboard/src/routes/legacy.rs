//! Legacy relay endpoint for callers that push job updates over HTTP
//! instead of the push channel.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::AppContext;
use crate::error::ApiError;

pub fn router() -> Router<AppContext> {
    Router::new().route("/jobupdate", post(jobupdate))
}

async fn jobupdate(
    State(ctx): State<AppContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if !payload.is_object() {
        return Err(ApiError::BadRequest(
            "job update must be a JSON object".to_string(),
        ));
    }
    ctx.relay.jobupdate(payload).await?;
    Ok(StatusCode::ACCEPTED)
}
