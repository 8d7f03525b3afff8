//! Jobboard dashboard server

use anyhow::Context;
use jobboard_channel::{PushClient, inbox, maintain_connection};
use jobboard_config::{load_config, load_template};
use jobboard_dashboard::bootstrap::bootstrap;
use jobboard_dashboard::{AppContext, listener, routes};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Get config path from environment
    let config_path =
        std::env::var("JOBBOARD_CONFIG").unwrap_or_else(|_| "jobboard.kdl".to_string());

    info!("Loading configuration from {}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path))?;

    let template = load_template(config.template.as_deref());
    let (handle, inbox) = inbox(config.inbox_capacity);
    let ctx = AppContext::new(config, template, handle);
    let cancel = CancellationToken::new();

    // Connect before bootstrapping; frames queue in the inbox until the
    // dispatcher starts.
    let push_client = PushClient::new(ctx.config.channel_url.clone());
    let push_task = tokio::spawn(maintain_connection(
        push_client,
        ctx.channel.clone(),
        ctx.config.reconnect.clone(),
        cancel.child_token(),
    ));

    if let Err(e) = bootstrap(&ctx).await {
        error!(error = %e, "Bootstrap failed, starting with an empty job list");
    }

    let dispatcher = listener::dispatcher(&ctx);
    let sync_task = tokio::spawn(dispatcher.run(inbox, cancel.child_token()));

    // Build router
    let app = routes::router(ctx.clone())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = ctx.config.listen;
    info!(dashboard = %ctx.config.name, "Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    let _ = push_task.await;
    let stats = sync_task.await?;
    info!(
        dispatched = stats.dispatched,
        dropped = stats.dropped,
        unhandled = stats.unhandled,
        "Dashboard stopped"
    );

    Ok(())
}
