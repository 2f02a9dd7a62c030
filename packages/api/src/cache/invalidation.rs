//! Mutation-to-cache-key registry.
//!
//! Each mutating operation names its `EntityMutation` variant, and the
//! exhaustive table below decides which cached reads become stale. Adding a
//! cached read means adding its key to the relevant arms here; a mutation
//! cannot "forget a flag" because the compiler forces every variant through
//! the table.

use super::keys;
use super::store::{CacheError, DynCacheStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityMutation {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    /// A review insert/overwrite changed a product's rating aggregate.
    ReviewWritten,
    ReviewDeleted,
    /// Order creation also decrements product stock, so it staleness-affects
    /// the product listings as well as the order views.
    OrderPlaced { user_id: String },
    OrderAdvanced { user_id: String, order_id: String },
    OrderDeleted { user_id: String, order_id: String },
    UserCreated,
    UserRemoved,
}

fn product_family() -> Vec<String> {
    vec![
        keys::LATEST_PRODUCTS.to_string(),
        keys::ALL_PRODUCTS.to_string(),
        keys::ALL_CATEGORIES.to_string(),
        keys::ADMIN_PRODUCTS.to_string(),
    ]
}

fn order_family(user_id: &str, order_id: Option<&str>) -> Vec<String> {
    let mut family = vec![keys::ALL_ORDERS.to_string(), keys::my_orders(user_id)];
    if let Some(order_id) = order_id {
        family.push(keys::single_order(order_id));
    }
    family
}

fn admin_family() -> Vec<String> {
    vec![
        keys::ADMIN_STATS.to_string(),
        keys::ADMIN_BAR_CHART.to_string(),
        keys::ADMIN_PIE_CHART.to_string(),
        keys::ADMIN_LINE_CHART.to_string(),
    ]
}

impl EntityMutation {
    /// The cache keys made stale by this mutation.
    pub fn invalidated_keys(&self) -> Vec<String> {
        let mut stale = match self {
            EntityMutation::ProductCreated
            | EntityMutation::ProductUpdated
            | EntityMutation::ProductDeleted
            | EntityMutation::ReviewWritten
            | EntityMutation::ReviewDeleted => product_family(),
            EntityMutation::OrderPlaced { user_id } => {
                let mut stale = product_family();
                stale.extend(order_family(user_id, None));
                stale
            }
            EntityMutation::OrderAdvanced { user_id, order_id }
            | EntityMutation::OrderDeleted { user_id, order_id } => {
                order_family(user_id, Some(order_id))
            }
            EntityMutation::UserCreated | EntityMutation::UserRemoved => Vec::new(),
        };
        // Every mutation above shifts at least one admin dashboard figure.
        stale.extend(admin_family());
        stale
    }
}

/// Deletes every key the mutation staleness-affects. Missing keys are
/// no-ops at the store level.
pub async fn invalidate(
    store: &DynCacheStore,
    mutation: &EntityMutation,
) -> Result<(), CacheError> {
    for key in mutation.invalidated_keys() {
        store.delete(&key).await?;
        tracing::debug!(key, ?mutation, "cache invalidated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contains(keys: &[String], expected: &str) {
        assert!(
            keys.iter().any(|k| k == expected),
            "expected {expected} in {keys:?}"
        );
    }

    fn assert_absent(keys: &[String], unexpected: &str) {
        assert!(
            keys.iter().all(|k| k != unexpected),
            "did not expect {unexpected} in {keys:?}"
        );
    }

    #[test]
    fn product_mutations_drop_every_product_listing() {
        for mutation in [
            EntityMutation::ProductCreated,
            EntityMutation::ProductUpdated,
            EntityMutation::ProductDeleted,
        ] {
            let stale = mutation.invalidated_keys();
            assert_contains(&stale, keys::LATEST_PRODUCTS);
            assert_contains(&stale, keys::ALL_PRODUCTS);
            assert_contains(&stale, keys::ALL_CATEGORIES);
            assert_contains(&stale, keys::ADMIN_PRODUCTS);
            assert_contains(&stale, keys::ADMIN_STATS);
        }
    }

    #[test]
    fn order_placement_touches_product_order_and_admin_views() {
        let stale = EntityMutation::OrderPlaced {
            user_id: "u1".into(),
        }
        .invalidated_keys();

        assert_contains(&stale, keys::LATEST_PRODUCTS);
        assert_contains(&stale, keys::ALL_ORDERS);
        assert_contains(&stale, "my-orders-u1");
        assert_contains(&stale, keys::ADMIN_LINE_CHART);
    }

    #[test]
    fn order_advance_never_touches_the_product_family() {
        let stale = EntityMutation::OrderAdvanced {
            user_id: "u1".into(),
            order_id: "o9".into(),
        }
        .invalidated_keys();

        assert_contains(&stale, keys::ALL_ORDERS);
        assert_contains(&stale, "my-orders-u1");
        assert_contains(&stale, "single-order-o9");
        assert_contains(&stale, keys::ADMIN_STATS);
        assert_contains(&stale, keys::ADMIN_BAR_CHART);
        assert_contains(&stale, keys::ADMIN_PIE_CHART);
        assert_contains(&stale, keys::ADMIN_LINE_CHART);

        assert_absent(&stale, keys::LATEST_PRODUCTS);
        assert_absent(&stale, keys::ALL_PRODUCTS);
        assert_absent(&stale, keys::ALL_CATEGORIES);
        assert_absent(&stale, keys::ADMIN_PRODUCTS);
    }

    #[test]
    fn user_mutations_only_refresh_admin_reports() {
        let stale = EntityMutation::UserRemoved.invalidated_keys();
        assert_eq!(stale.len(), 4);
        assert_contains(&stale, keys::ADMIN_STATS);
        assert_absent(&stale, keys::ALL_ORDERS);
        assert_absent(&stale, keys::ALL_PRODUCTS);
    }

    #[tokio::test]
    async fn invalidate_deletes_the_stale_keys_from_the_store() {
        use crate::cache::{CacheStore, MemoryCacheStore};
        use std::sync::Arc;

        let store: DynCacheStore = Arc::new(MemoryCacheStore::new());
        store
            .set(keys::LATEST_PRODUCTS, "[]".to_string(), None)
            .await
            .unwrap();
        store
            .set(keys::ALL_ORDERS, "[]".to_string(), None)
            .await
            .unwrap();

        invalidate(&store, &EntityMutation::ProductUpdated)
            .await
            .unwrap();

        assert_eq!(store.get(keys::LATEST_PRODUCTS).await.unwrap(), None);
        // Order views are untouched by a product edit
        assert!(store.get(keys::ALL_ORDERS).await.unwrap().is_some());
    }
}
