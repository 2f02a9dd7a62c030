//! Payment-intent creation and the coupon lifecycle.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use storefront_types::create_id;
use stripe::{CreatePaymentIntent, PaymentIntent};

use crate::{
    coupons,
    entity::coupon::{self, AppliedUsers},
    error::ApiError,
    middleware::admin::admin_only,
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_gate = || from_fn_with_state(state.clone(), admin_only);

    Router::new()
        .route("/create", post(create_payment))
        .route("/coupon/new", post(create_coupon.layer(admin_gate())))
        .route("/coupon/apply", post(apply_coupon))
        .route("/coupon/all", get(all_coupons.layer(admin_gate())))
        .route("/coupon/{id}", delete(delete_coupon.layer(admin_gate())))
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Amount in major currency units
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub client_secret: Option<String>,
}

/// POST /payment/create - card payment intent; amount is converted to the
/// provider's minor units
#[tracing::instrument(name = "POST /payment/create", skip(state, body))]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let Some(amount) = body.amount else {
        return Err(ApiError::bad_request("Amount is required"));
    };
    if amount <= 0.0 {
        return Err(ApiError::bad_request("Amount must be positive"));
    }

    let stripe_client = state
        .stripe_client
        .as_ref()
        .ok_or_else(|| ApiError::internal("Payment provider not configured"))?;

    let minor_units = (amount * 100.0).round() as i64;
    let mut params = CreatePaymentIntent::new(minor_units, state.settings.currency);
    params.payment_method_types = Some(vec!["card".to_string()]);

    let intent = PaymentIntent::create(stripe_client, params).await?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        client_secret: intent.client_secret,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDto {
    pub id: String,
    pub code: String,
    pub discount: f64,
    pub validity: String,
    pub is_active: bool,
    pub count: i32,
    pub applied: Vec<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<coupon::Model> for CouponDto {
    fn from(model: coupon::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            discount: model.discount,
            validity: model.validity,
            is_active: model.is_active,
            count: model.count,
            applied: model.applied.0,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: Option<String>,
    pub discount: Option<f64>,
    pub validity: Option<String>,
    pub count: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponResponse {
    pub success: bool,
    pub message: String,
    pub coupon: CouponDto,
    pub expires_at: chrono::NaiveDateTime,
}

/// POST /payment/coupon/new - admin
#[tracing::instrument(name = "POST /payment/coupon/new", skip(state, body))]
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(body): Json<CreateCouponRequest>,
) -> Result<Json<CreateCouponResponse>, ApiError> {
    let (Some(code), Some(discount), Some(validity)) = (body.code, body.discount, body.validity)
    else {
        return Err(ApiError::bad_request(
            "All fields (code, discount, validity) are required",
        ));
    };

    let code = code.to_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::bad_request(
            "Coupon code must be alphanumeric",
        ));
    }
    if discount <= 0.0 {
        return Err(ApiError::bad_request("Discount must be positive"));
    }
    // Creation-time validation: a malformed validity never reaches the
    // redemption path.
    coupons::parse_validity(&validity)?;

    let existing = coupon::Entity::find()
        .filter(coupon::Column::Code.eq(&code))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::bad_request("Coupon code already exists"));
    }

    let now = Utc::now().naive_utc();
    let created = coupon::ActiveModel {
        id: Set(create_id()),
        code: Set(code),
        discount: Set(discount),
        validity: Set(validity.clone()),
        is_active: Set(true),
        count: Set(body.count.unwrap_or(1)),
        applied: Set(AppliedUsers::default()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    let expires_at = coupons::expires_at(created.created_at, &validity)?;

    tracing::info!(coupon_id = %created.id, code = %created.code, "Coupon created");

    Ok(Json(CreateCouponResponse {
        success: true,
        message: "Coupon created successfully".to_string(),
        coupon: created.into(),
        expires_at,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub code: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponResponse {
    pub success: bool,
    pub message: String,
    pub discount_amount: f64,
}

/// POST /payment/coupon/apply
///
/// Validation order, each a distinct failure: unknown code, inactive or
/// expired, already redeemed by this user, exhausted counter.
#[tracing::instrument(name = "POST /payment/coupon/apply", skip(state, body))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Json(body): Json<ApplyCouponRequest>,
) -> Result<Json<ApplyCouponResponse>, ApiError> {
    let (Some(code), Some(user_id)) = (body.code, body.user_id) else {
        return Err(ApiError::bad_request("code and userId are required"));
    };

    let coupon = coupon::Entity::find()
        .filter(coupon::Column::Code.eq(code.to_uppercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))?;

    let now = Utc::now().naive_utc();
    coupons::check_redemption(&coupon, &user_id, now)?;

    let discount = coupon.discount;
    let remaining = coupon.count - 1;
    let mut applied = coupon.applied.0.clone();
    applied.push(user_id);

    let mut active: coupon::ActiveModel = coupon.into();
    active.applied = Set(AppliedUsers(applied));
    active.count = Set(remaining);
    if remaining == 0 {
        active.is_active = Set(false);
    }
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    Ok(Json(ApplyCouponResponse {
        success: true,
        message: "Coupon applied successfully".to_string(),
        discount_amount: discount,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AllCouponsQuery {
    /// `true`/`false` filter on the active flag
    pub active: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CouponsResponse {
    pub success: bool,
    pub coupons: Vec<CouponDto>,
    pub message: String,
}

/// GET /payment/coupon/all - admin
#[tracing::instrument(name = "GET /payment/coupon/all", skip(state))]
pub async fn all_coupons(
    State(state): State<AppState>,
    Query(query): Query<AllCouponsQuery>,
) -> Result<Json<CouponsResponse>, ApiError> {
    let mut select = coupon::Entity::find();
    if let Some(active) = &query.active {
        select = select.filter(coupon::Column::IsActive.eq(active == "true"));
    }

    let coupons = select.all(&state.db).await?;
    let message = if coupons.is_empty() {
        "No coupons found"
    } else {
        "ACTIVE AND INACTIVE COUPONS"
    };

    Ok(Json(CouponsResponse {
        success: true,
        coupons: coupons.into_iter().map(Into::into).collect(),
        message: message.to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /payment/coupon/{id} - admin
#[tracing::instrument(name = "DELETE /payment/coupon/{id}", skip(state))]
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let coupon = coupon::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))?;

    coupon.delete(&state.db).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Coupon deleted successfully".to_string(),
    }))
}
