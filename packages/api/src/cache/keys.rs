//! Deterministic cache-key registry.
//!
//! Every cached read, cache populate, and invalidation site goes through
//! these constants and builders, so a key can never be spelled three
//! different ways across the three sites.

pub const LATEST_PRODUCTS: &str = "latest-products";
pub const ALL_PRODUCTS: &str = "all-products";
pub const ALL_CATEGORIES: &str = "all-categories";
pub const ADMIN_PRODUCTS: &str = "admin-products";

pub const ALL_ORDERS: &str = "all-orders";

pub const ADMIN_STATS: &str = "admin-stats";
pub const ADMIN_BAR_CHART: &str = "admin-bar-chart";
pub const ADMIN_PIE_CHART: &str = "admin-pie-chart";
pub const ADMIN_LINE_CHART: &str = "admin-line-chart";

pub fn my_orders(user_id: &str) -> String {
    format!("my-orders-{user_id}")
}

pub fn single_order(order_id: &str) -> String {
    format!("single-order-{order_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameterized_keys_embed_their_id() {
        assert_eq!(my_orders("u42"), "my-orders-u42");
        assert_eq!(single_order("o7"), "single-order-o7");
    }
}
