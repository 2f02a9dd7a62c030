//! `SeaORM` Entity for placed orders.
//!
//! Line items are owned snapshots of the product at order time, so a later
//! product edit or deletion never rewrites order history.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::OrderStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItem {
    /// The product the snapshot was taken from
    pub product: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItems(pub Vec<OrderItem>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_name = "userId", column_type = "Text")]
    pub user_id: String,
    #[sea_orm(column_name = "orderItems", column_type = "JsonBinary")]
    pub order_items: OrderItems,
    #[sea_orm(column_name = "shippingAddress", column_type = "JsonBinary")]
    pub shipping_address: ShippingAddress,
    #[sea_orm(column_name = "subTotal")]
    pub sub_total: f64,
    #[sea_orm(column_name = "shippingPrice")]
    pub shipping_price: f64,
    #[sea_orm(column_name = "taxPrice")]
    pub tax_price: f64,
    pub discount: f64,
    #[sea_orm(column_name = "totalPrice")]
    pub total_price: f64,
    pub delivery: bool,
    pub status: OrderStatus,
    #[sea_orm(column_name = "isDelivered")]
    pub is_delivered: bool,
    #[sea_orm(column_name = "deliveredAt", nullable)]
    pub delivered_at: Option<DateTime>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
