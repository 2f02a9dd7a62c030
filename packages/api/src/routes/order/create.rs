//! Order placement. Line items are snapshotted into the order document, and
//! each referenced product's stock is decremented afterwards. The insert and
//! the decrements are separate statements, not a transaction: concurrent
//! orders against a low-stock product can oversell.

use axum::{Json, extract::State};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use serde::{Deserialize, Serialize};
use storefront_types::create_id;

use crate::{
    cache::EntityMutation,
    entity::{
        order::{self, OrderItem, OrderItems, ShippingAddress},
        product,
        sea_orm_active_enums::OrderStatus,
        user,
    },
    error::ApiError,
    state::AppState,
};

use super::OrderDto;

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Product reference (the storefront client sends the catalog document id)
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pin_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user: Option<String>,
    pub order_items: Option<Vec<OrderItemRequest>>,
    pub shipping_address: Option<ShippingAddressRequest>,
    pub sub_total: Option<f64>,
    pub shipping_price: Option<f64>,
    pub tax_price: Option<f64>,
    pub discount: Option<f64>,
    pub total_price: Option<f64>,
    pub delivery: Option<bool>,
}

/// Names every absent field so the caller gets one complete report instead
/// of a fix-resubmit loop.
fn missing_fields(body: &CreateOrderRequest) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if body.order_items.is_none() {
        missing.push("orderItems");
    }
    if body.shipping_address.is_none() {
        missing.push("shippingAddress");
    }
    if body.user.is_none() {
        missing.push("user");
    }
    if body.sub_total.is_none() {
        missing.push("subTotal");
    }
    if body.shipping_price.is_none() {
        missing.push("shippingPrice");
    }
    if body.tax_price.is_none() {
        missing.push("taxPrice");
    }
    if body.total_price.is_none() {
        missing.push("totalPrice");
    }
    if body.delivery.is_none() {
        missing.push("delivery");
    }
    if body.discount.is_none() {
        missing.push("discount");
    }

    if let Some(address) = &body.shipping_address {
        if address.address.is_none() {
            missing.push("shippingAddress.address");
        }
        if address.city.is_none() {
            missing.push("shippingAddress.city");
        }
        if address.state.is_none() {
            missing.push("shippingAddress.state");
        }
        if address.country.is_none() {
            missing.push("shippingAddress.country");
        }
        if address.pin_code.is_none() {
            missing.push("shippingAddress.pinCode");
        }
    }

    missing
}

fn snapshot_items(items: &[OrderItemRequest]) -> Result<Vec<OrderItem>, ApiError> {
    let mut snapshots = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let (Some(id), Some(name), Some(price), Some(image), Some(quantity)) = (
            item.id.clone(),
            item.name.clone(),
            item.price,
            item.image.clone(),
            item.quantity,
        ) else {
            return Err(ApiError::bad_request(format!(
                "Invalid order item at index {index}"
            )));
        };

        if quantity <= 0 {
            return Err(ApiError::bad_request(format!(
                "Invalid order item at index {index}"
            )));
        }

        snapshots.push(OrderItem {
            product: id,
            name,
            price,
            image,
            quantity,
        });
    }

    Ok(snapshots)
}

async fn decrease_stock(state: &AppState, items: &[OrderItem]) -> Result<(), ApiError> {
    for item in items {
        let result: Result<(), ApiError> = async {
            let product = product::Entity::find_by_id(&item.product)
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::not_found("Product not found"))?;

            let new_stock = product.stock - item.quantity;
            let mut active: product::ActiveModel = product.into();
            active.stock = Set(new_stock);
            active.updated_at = Set(Utc::now().naive_utc());
            active.update(&state.db).await?;
            Ok(())
        }
        .await;

        if let Err(err) = result {
            tracing::error!(product_id = %item.product, "stock update failed: {}", err);
            return Err(ApiError::internal("Error updating stock"));
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderDto,
    pub message: String,
}

/// POST /order/create
#[tracing::instrument(name = "POST /order/create", skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    }

    // The missing-field check above guarantees these are present.
    let (Some(user_id), Some(items), Some(a)) =
        (body.user, body.order_items, body.shipping_address)
    else {
        return Err(ApiError::bad_request("Missing fields"));
    };
    let address = ShippingAddress {
        address: a.address.unwrap_or_default(),
        city: a.city.unwrap_or_default(),
        state: a.state.unwrap_or_default(),
        country: a.country.unwrap_or_default(),
        pin_code: a.pin_code.unwrap_or_default(),
    };

    user::Entity::find_by_id(&user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid user"))?;

    if items.is_empty() {
        return Err(ApiError::bad_request("No order items found"));
    }
    let snapshots = snapshot_items(&items)?;

    let now = Utc::now().naive_utc();
    let created = order::ActiveModel {
        id: Set(create_id()),
        user_id: Set(user_id.clone()),
        order_items: Set(OrderItems(snapshots.clone())),
        shipping_address: Set(address),
        sub_total: Set(body.sub_total.unwrap_or_default()),
        shipping_price: Set(body.shipping_price.unwrap_or_default()),
        tax_price: Set(body.tax_price.unwrap_or_default()),
        discount: Set(body.discount.unwrap_or_default()),
        total_price: Set(body.total_price.unwrap_or_default()),
        delivery: Set(body.delivery.unwrap_or_default()),
        status: Set(OrderStatus::Pending),
        is_delivered: Set(false),
        delivered_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    decrease_stock(&state, &snapshots).await?;

    state
        .invalidate(EntityMutation::OrderPlaced { user_id })
        .await?;

    tracing::info!(order_id = %created.id, "Order placed");

    Ok(Json(CreateOrderResponse {
        success: true,
        order: created.into(),
        message: "Order placed successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> CreateOrderRequest {
        CreateOrderRequest {
            user: Some("u1".into()),
            order_items: Some(vec![OrderItemRequest {
                id: Some("p1".into()),
                name: Some("Pen".into()),
                price: Some(10.0),
                image: Some("https://img.example.com/pen.png".into()),
                quantity: Some(2),
            }]),
            shipping_address: Some(ShippingAddressRequest {
                address: Some("1 Main St".into()),
                city: Some("Pune".into()),
                state: Some("MH".into()),
                country: Some("India".into()),
                pin_code: Some("411001".into()),
            }),
            sub_total: Some(20.0),
            shipping_price: Some(5.0),
            tax_price: Some(3.6),
            discount: Some(0.0),
            total_price: Some(28.6),
            delivery: Some(false),
        }
    }

    #[test]
    fn complete_request_has_no_missing_fields() {
        assert!(missing_fields(&complete_request()).is_empty());
    }

    #[test]
    fn every_absent_field_is_reported_by_name() {
        let mut request = complete_request();
        request.user = None;
        request.total_price = None;

        let missing = missing_fields(&request);
        assert_eq!(missing, vec!["user", "totalPrice"]);
    }

    #[test]
    fn incomplete_shipping_address_reports_the_subfield() {
        let mut request = complete_request();
        if let Some(address) = &mut request.shipping_address {
            address.pin_code = None;
        }

        let missing = missing_fields(&request);
        assert_eq!(missing, vec!["shippingAddress.pinCode"]);
    }

    #[test]
    fn snapshot_copies_every_item_field() {
        let request = complete_request();
        let snapshots = snapshot_items(request.order_items.as_deref().unwrap()).unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].product, "p1");
        assert_eq!(snapshots[0].name, "Pen");
        assert_eq!(snapshots[0].quantity, 2);
    }

    #[test]
    fn item_missing_a_field_is_rejected_with_its_index() {
        let items = vec![
            OrderItemRequest {
                id: Some("p1".into()),
                name: Some("Pen".into()),
                price: Some(10.0),
                image: Some("x".into()),
                quantity: Some(1),
            },
            OrderItemRequest {
                id: Some("p2".into()),
                name: None,
                price: Some(4.0),
                image: Some("y".into()),
                quantity: Some(1),
            },
        ];

        let err = snapshot_items(&items).unwrap_err();
        assert!(err.message().contains("index 1"), "{}", err.message());
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let items = vec![OrderItemRequest {
            id: Some("p1".into()),
            name: Some("Pen".into()),
            price: Some(10.0),
            image: Some("x".into()),
            quantity: Some(0),
        }];

        assert!(snapshot_items(&items).is_err());
    }
}
