//! storefront-api: the REST core of the storefront backend.
//!
//! Routes are nested per domain under `/api/v1`; every handler raises
//! [`error::ApiError`] and returns an explicit response DTO.

use axum::{Json, Router, http::Uri, routing::get};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analytics;
pub mod cache;
pub mod coupons;
pub mod entity;
pub mod error;
pub mod images;
pub mod middleware;
mod routes;
pub mod state;

pub use axum as http;
pub use sea_orm;
pub use stripe;

use error::ApiError;
use state::AppState;

pub fn construct_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(welcome))
        .nest("/user", routes::user::routes(&state))
        .nest("/product", routes::product::routes(&state))
        .nest("/order", routes::order::routes(&state))
        .nest("/payment", routes::payment::routes(&state))
        .nest("/admin", routes::admin::routes(&state))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/", get(welcome))
        .nest("/api/v1", api)
        .fallback(not_found)
}

#[derive(Debug, Serialize)]
struct WelcomeResponse {
    success: bool,
    message: String,
}

#[tracing::instrument(name = "GET /")]
async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        success: true,
        message: "Welcome to the E-commerce API".to_string(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Can't find {uri} on this server!"))
}
