pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod sea_orm_active_enums;
pub mod user;

pub mod prelude {
    pub use super::coupon::Entity as Coupon;
    pub use super::order::Entity as Order;
    pub use super::product::Entity as Product;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
}
