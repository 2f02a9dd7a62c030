//! `SeaORM` Entity for catalog products.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Hosted image reference: public delivery URL plus the host-side id needed
/// to release the asset later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ProductImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, Default)]
pub struct ProductImages(pub Vec<ProductImage>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub price: f64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// One or more hosted images (whole-document JSON)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: ProductImages,
    /// Units on hand. Decremented by order placement; the decrement is not
    /// transactionally tied to the order insert (known oversell gap).
    pub stock: i32,
    /// Stored lower-cased
    #[sea_orm(column_type = "Text")]
    pub category: String,
    /// Running average over all reviews, recomputed on every review mutation
    pub ratings: f64,
    #[sea_orm(column_name = "numOfReviews")]
    pub num_of_reviews: i32,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
