//! Admin analytics reports. All four are admin-gated, independently cached,
//! and rebuilt in full on a cache miss; there is no incremental update.

use axum::{Router, middleware::from_fn_with_state, routing::get};
use serde::{Deserialize, Serialize};

use crate::{middleware::admin::admin_only, state::AppState};

pub mod charts;
pub mod stats;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::dashboard_stats))
        .route("/bar", get(charts::bar_chart))
        .route("/pie", get(charts::pie_chart))
        .route("/line", get(charts::line_chart))
        .route_layer(from_fn_with_state(state.clone(), admin_only))
}

/// One month bucket of a revenue series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    pub year: i32,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCountPoint {
    pub month: String,
    pub year: i32,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCountPoint {
    pub month: String,
    pub year: i32,
    pub product_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCountPoint {
    pub month: String,
    pub year: i32,
    pub user_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountPoint {
    pub month: String,
    pub year: i32,
    pub discount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: i64,
}
