use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/organization/", post(handler::create_organization))
        .route("/person/", post(handler::create_person))
        .route("/share/", post(handler::create_share))
        .route("/:orgnr/owners", get(handler::owners))
        .route("/:orgnr/holding", get(handler::holding))
        .route("/:orgnr/summary", get(handler::summary));

    Router::new()
        .route("/v1/health", get(handler::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
