use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session management
        .route(
            "/sessions",
            get(handlers::list_sessions)
                .post(handlers::create_session)
                .delete(handlers::clear_sessions),
        )
        .route("/sessions/:name", delete(handlers::delete_session))
        .route("/sessions/:name/select", post(handlers::select_session))
        .route("/sessions/:name/transcript", get(handlers::get_transcript))
        // Recording control
        .route("/record/start", post(handlers::start_recording))
        .route("/record/stop", post(handlers::stop_recording))
        // Analysis
        .route("/analyze", post(handlers::analyze))
        // Status
        .route("/status", get(handlers::get_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
