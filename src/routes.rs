// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{leaderboard, submission},
    state::AppState,
};

/// Assembles the main application router.
///
/// * `POST /api/submit` scores a submitted answer-key link.
/// * `GET /api/leaderboard` and `GET /api/stats` read the record table.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/submit", post(submission::submit_answer_key))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/stats", get(leaderboard::get_stats));

    Router::new()
        .nest("/api", api_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
