use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{self, SharedState};

/// Create the main application router with all API endpoints
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Dropdown contents
        .route("/api/options", get(handlers::get_options))
        // Per-session dashboard
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/:id/selection", put(handlers::stage_selection))
        .route("/api/sessions/:id/submit", post(handlers::submit))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
