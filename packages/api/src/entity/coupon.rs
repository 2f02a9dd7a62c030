//! `SeaORM` Entity for discount coupons.
//!
//! Expiry is always derived from `created_at` plus the parsed validity
//! string; it is never stored denormalized.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// User ids that already redeemed the coupon, each at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, Default)]
pub struct AppliedUsers(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Coupon")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    /// Uppercase alphanumeric, unique
    #[sea_orm(column_type = "Text", unique)]
    pub code: String,
    pub discount: f64,
    /// `<positive int><d|h|m>`, validated at creation time
    #[sea_orm(column_type = "Text")]
    pub validity: String,
    #[sea_orm(column_name = "isActive")]
    pub is_active: bool,
    /// Remaining uses; reaching zero flips `is_active` off
    pub count: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub applied: AppliedUsers,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
