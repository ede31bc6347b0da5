use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Player endpoints
        .route("/players", get(handlers::list_players))
        .route("/players/:id", get(handlers::get_player))
        .route("/players/:id/detail", get(handlers::get_player_detail))
        .route("/players/:id/card", get(handlers::get_player_card))
        // League endpoints
        .route("/league/percentiles", get(handlers::get_league_percentiles))
        .route("/teams", get(handlers::get_teams))
        .route("/standings", get(handlers::get_standings))
        // Health endpoints
        .route("/health", get(handlers::health_handler))
        .route("/healthz", get(handlers::liveness_handler))
        // Add state, CORS and request tracing
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
