use std::net::SocketAddr;

use crate::{handlers::SharedState, router::create_router};

/// Run the API server
pub async fn run_server(state: SharedState, host: &str, port: u16) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "backend_api=debug,rates_client=info,tower_http=debug".into()
            }),
        )
        .init();

    let session_ttl_secs = state.sessions.ttl().as_secs();
    let app = create_router(state);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    tracing::info!(session_ttl_secs, "Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
