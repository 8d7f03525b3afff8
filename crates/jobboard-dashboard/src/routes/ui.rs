//! Job list page.
//!
//! Each job is expanded through the configured job template. The list
//! element carries the push channel URL in `data-url`, the attribute the
//! dashboard's front end reads to open its own channel.

use askama::Template;
use askama_web::WebTemplate;
use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::AppContext;

#[derive(Template, WebTemplate)]
#[template(path = "pages/jobs.html")]
struct JobsTemplate {
    channel_url: String,
    /// Rows already rendered (and escaped) by the job template.
    rows: Vec<String>,
}

pub fn router() -> Router<AppContext> {
    Router::new().route("/", get(jobs_page))
}

async fn jobs_page(State(ctx): State<AppContext>) -> JobsTemplate {
    let jobs = ctx.jobs.read().await;
    let rows = jobs.iter().map(|job| ctx.template.render(job)).collect();

    JobsTemplate {
        channel_url: ctx.config.channel_url.to_string(),
        rows,
    }
}
