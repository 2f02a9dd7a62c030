//! Cached order reads: per-user history, the admin listing, single lookup.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{
    cache::{cached, keys},
    entity::{order, user},
    error::ApiError,
    state::AppState,
};

use super::OrderDto;

#[derive(Debug, Deserialize)]
pub struct MyOrdersQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderDto>,
    pub count: usize,
}

/// GET /order/my-orders?id=...
#[tracing::instrument(name = "GET /order/my-orders", skip(state))]
pub async fn my_orders(
    State(state): State<AppState>,
    Query(query): Query<MyOrdersQuery>,
) -> Result<Json<MyOrdersResponse>, ApiError> {
    let Some(user_id) = query.id else {
        return Err(ApiError::bad_request("invalid user id"));
    };

    user::Entity::find_by_id(&user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("invalid user id"))?;

    let key = keys::my_orders(&user_id);
    let orders: Vec<OrderDto> = cached(&state.cache, &key, None, || async {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(&user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&state.db)
            .await?;
        Ok(orders.into_iter().map(Into::into).collect())
    })
    .await?;

    let count = orders.len();
    Ok(Json(MyOrdersResponse {
        success: true,
        orders,
        count,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllOrdersResponse {
    pub success: bool,
    pub all_orders: Vec<OrderDto>,
    pub total_orders: usize,
}

/// GET /order/all - admin listing with usernames, cached
#[tracing::instrument(name = "GET /order/all", skip(state))]
pub async fn all_orders(
    State(state): State<AppState>,
) -> Result<Json<AllOrdersResponse>, ApiError> {
    let all_orders: Vec<OrderDto> = cached(&state.cache, keys::ALL_ORDERS, None, || async {
        let orders = order::Entity::find()
            .find_also_related(user::Entity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&state.db)
            .await?;
        Ok(orders
            .into_iter()
            .map(|(order, user)| OrderDto::with_username(order, user.map(|u| u.username)))
            .collect())
    })
    .await?;

    let total_orders = all_orders.len();
    Ok(Json(AllOrdersResponse {
        success: true,
        all_orders,
        total_orders,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleOrderResponse {
    pub success: bool,
    pub single_order: OrderDto,
}

/// GET /order/{id} - cached single lookup
#[tracing::instrument(name = "GET /order/{id}", skip(state))]
pub async fn single_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleOrderResponse>, ApiError> {
    let key = keys::single_order(&id);
    let single_order: OrderDto = cached(&state.cache, &key, None, || async {
        let (order, user) = order::Entity::find_by_id(&id)
            .find_also_related(user::Entity)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::not_found("order not found"))?;
        Ok(OrderDto::with_username(order, user.map(|u| u.username)))
    })
    .await?;

    Ok(Json(SingleOrderResponse {
        success: true,
        single_order,
    }))
}
