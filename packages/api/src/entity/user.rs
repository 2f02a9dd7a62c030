//! `SeaORM` Entity for customer accounts.
//!
//! Ids are issued by the external identity provider, never generated here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{Gender, UserRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "User")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub username: String,
    #[sea_orm(column_type = "Text", unique)]
    pub email: String,
    /// Avatar URL supplied by the identity provider
    #[sea_orm(column_type = "Text")]
    pub photo: String,
    pub gender: Gender,
    pub dob: Date,
    pub role: UserRole,
    #[sea_orm(column_name = "isActive")]
    pub is_active: bool,
    #[sea_orm(column_name = "lastLogin", nullable)]
    pub last_login: Option<DateTime>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Age in whole years derived from `dob` at the given date.
    pub fn age_at(&self, today: Date) -> i32 {
        use chrono::Datelike;
        let mut age = today.year() - self.dob.year();
        if (today.month(), today.day()) < (self.dob.month(), self.dob.day()) {
            age -= 1;
        }
        age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user_born(dob: Date) -> Model {
        Model {
            id: "u1".into(),
            username: "tester".into(),
            email: "tester@example.com".into(),
            photo: "https://img.example.com/a.png".into(),
            gender: Gender::Female,
            dob,
            role: UserRole::User,
            is_active: true,
            last_login: None,
            created_at: Default::default(),
            updated_at: Default::default(),
        }
    }

    #[test]
    fn age_counts_completed_years_only() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let user = user_born(dob);

        let before_birthday = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        assert_eq!(user.age_at(before_birthday), 25);

        let on_birthday = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(user.age_at(on_birthday), 26);

        let after_birthday = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(user.age_at(after_birthday), 26);
    }
}
