//! Order routes: placement, cached reads, admin fulfillment management.

use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    entity::{
        order::{self, OrderItem, ShippingAddress},
        sea_orm_active_enums::OrderStatus,
    },
    middleware::admin::admin_only,
    state::AppState,
};

pub mod create;
pub mod manage;
pub mod read;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_gate = || from_fn_with_state(state.clone(), admin_only);

    Router::new()
        .route("/create", post(create::create_order))
        .route("/my-orders", get(read::my_orders))
        .route("/all", get(read::all_orders.layer(admin_gate())))
        .route(
            "/{id}",
            get(read::single_order)
                .put(manage::advance_order.layer(admin_gate()))
                .delete(manage::delete_order.layer(admin_gate())),
        )
}

/// Wire shape of an order. Also the cached snapshot format for the order
/// views; the optional username is populated on admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub sub_total: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub discount: f64,
    pub total_price: f64,
    pub delivery: bool,
    pub status: OrderStatus,
    pub is_delivered: bool,
    pub delivered_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<order::Model> for OrderDto {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: None,
            order_items: model.order_items.0,
            shipping_address: model.shipping_address,
            sub_total: model.sub_total,
            shipping_price: model.shipping_price,
            tax_price: model.tax_price,
            discount: model.discount,
            total_price: model.total_price,
            delivery: model.delivery,
            status: model.status,
            is_delivered: model.is_delivered,
            delivered_at: model.delivered_at,
            created_at: model.created_at,
        }
    }
}

impl OrderDto {
    pub fn with_username(model: order::Model, username: Option<String>) -> Self {
        let mut dto: OrderDto = model.into();
        dto.username = username;
        dto
    }
}
