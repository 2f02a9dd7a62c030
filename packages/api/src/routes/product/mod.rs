//! Catalog routes: admin CRUD, cached public listings, search, reviews.

use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    entity::product::{self, ProductImage},
    middleware::admin::admin_only,
    state::AppState,
};

pub mod crud;
pub mod listings;
pub mod reviews;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_gate = || from_fn_with_state(state.clone(), admin_only);

    Router::new()
        .route("/create", post(crud::create_product.layer(admin_gate())))
        .route("/latest", get(listings::latest_products))
        .route("/category", get(listings::categories))
        .route("/products", get(listings::all_products))
        .route("/all", get(listings::search_products))
        .route(
            "/admin-product",
            get(listings::admin_products.layer(admin_gate())),
        )
        .route("/review/new", post(reviews::write_review))
        .route("/review/{id}", delete(reviews::delete_review))
        .route("/reviews", get(reviews::product_reviews))
        .route("/top-reviews", get(reviews::top_reviews))
        .route(
            "/{id}",
            get(crud::get_product)
                .put(crud::update_product.layer(admin_gate()))
                .delete(crud::delete_product.layer(admin_gate())),
        )
}

/// Wire shape of a catalog product. Also the cached snapshot format for the
/// product listings, so it round-trips through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub images: Vec<ProductImage>,
    pub stock: i32,
    pub category: String,
    pub ratings: f64,
    pub num_of_reviews: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl From<product::Model> for ProductDto {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            description: model.description,
            images: model.images.0,
            stock: model.stock,
            category: model.category,
            ratings: model.ratings,
            num_of_reviews: model.num_of_reviews,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<ProductDto>,
}
