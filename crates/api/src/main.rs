use anyhow::{Context, Result};
use safari_api::{build_router, build_state, spawn_session_janitor, ApiConfig};
use safari_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("safari_api");

    let config = ApiConfig::from_env();
    let bind = config.bind.clone();
    let reply_delay_ms = config.chat_reply_delay.as_millis() as u64;

    let state = build_state(config);
    spawn_session_janitor(state.agent.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed binding {bind}"))?;
    tracing::info!(bind = %bind, reply_delay_ms, "safari booking api started");

    axum::serve(listener, app).await?;
    Ok(())
}
