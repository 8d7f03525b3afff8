//! HTTP routes.

pub mod health;
pub mod jobs;
pub mod legacy;
pub mod ui;

use crate::AppContext;
use axum::Router;

/// Build the dashboard router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .merge(ui::router())
        .nest("/api", api_router())
        .nest("/legacy", legacy::router())
        .merge(health::router())
        .with_state(ctx)
}

fn api_router() -> Router<AppContext> {
    Router::new().nest("/jobs", jobs::router())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use jobboard_channel::{Inbox, inbox};
    use jobboard_config::{JobTemplate, parse_dashboard_config};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::AppContext;

    pub fn context(template: JobTemplate) -> (AppContext, Inbox) {
        let config = parse_dashboard_config(
            r#"
            dashboard "test" {
                fetch-url "http://127.0.0.1:9/suite/jobs"
                channel-url "ws://127.0.0.1:9/socket"
            }
            "#,
        )
        .unwrap();
        let (handle, inbox) = inbox(8);
        (AppContext::new(config, template, handle), inbox)
    }

    pub async fn send(ctx: &AppContext, request: Request<Body>) -> (StatusCode, String) {
        let response = super::router(ctx.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(ctx: &AppContext, uri: &str) -> (StatusCode, String) {
        send(ctx, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }
}
