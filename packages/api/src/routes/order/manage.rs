//! Admin fulfillment management: advancing the status machine and removal.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, ModelTrait};
use serde::Serialize;

use crate::{
    cache::EntityMutation,
    entity::{order, sea_orm_active_enums::OrderStatus},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AdvanceOrderResponse {
    pub success: bool,
    pub message: String,
    pub status: OrderStatus,
}

/// PUT /order/{id} - advance the order one step along the fulfillment
/// sequence. Terminal orders are rejected and left untouched.
#[tracing::instrument(name = "PUT /order/{id}", skip(state))]
pub async fn advance_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdvanceOrderResponse>, ApiError> {
    let order = order::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    let Some(next) = order.status.next() else {
        return Err(ApiError::bad_request(format!(
            "Order is already completed and cannot be updated further, {}",
            order.status
        )));
    };

    let user_id = order.user_id.clone();
    let mut active: order::ActiveModel = order.into();
    active.status = Set(next);
    if next == OrderStatus::Delivered {
        active.is_delivered = Set(true);
        active.delivered_at = Set(Some(Utc::now().naive_utc()));
    }
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    state
        .invalidate(EntityMutation::OrderAdvanced {
            user_id,
            order_id: id.clone(),
        })
        .await?;

    tracing::info!(order_id = %id, status = %next, "Order status advanced");

    Ok(Json(AdvanceOrderResponse {
        success: true,
        message: format!("Order status updated to {next}"),
        status: next,
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /order/{id} - admin removal
#[tracing::instrument(name = "DELETE /order/{id}", skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order = order::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    let user_id = order.user_id.clone();
    order.delete(&state.db).await?;

    state
        .invalidate(EntityMutation::OrderDeleted {
            user_id,
            order_id: id,
        })
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "order deleted successfully".to_string(),
    }))
}
