pub mod auth;
pub mod cities;
pub mod posts;
pub mod users;
pub mod washing;

use axum::{middleware, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use configs::UploadsConfig;

use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router: public health/docs/auth, bearer-guarded
/// resources under `/api`, and uploaded files under the public prefix.
pub fn build_router(state: auth::ServerState, cors: CorsLayer, uploads: &UploadsConfig) -> Router {
    let protected = Router::new()
        .nest("/cities", cities::router())
        .nest("/washing", washing::router())
        .nest("/posts", posts::router())
        .nest("/users", users::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    let api = Router::new()
        .nest("/auth", auth::router())
        .merge(protected);

    let prefix = uploads.public_prefix.trim_end_matches('/');

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .nest_service(prefix, ServeDir::new(&uploads.dir))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
