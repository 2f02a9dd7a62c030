use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::cache::invalidation::{self, EntityMutation};
use crate::cache::store::{CacheError, DynCacheStore};
use crate::images::DynImageHost;

pub type AppState = Arc<State>;

#[derive(Debug, Clone)]
pub struct Settings {
    /// ISO currency for payment intents
    pub currency: stripe::Currency,
    /// TTL for the dashboard-stats cache entry; the other admin reports
    /// live until invalidated.
    pub admin_stats_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: stripe::Currency::INR,
            admin_stats_ttl: Duration::from_secs(4 * 60 * 60),
        }
    }
}

/// Shared service handles, constructed once at startup and injected into the
/// router. Store connections are established before the listener binds.
pub struct State {
    pub db: DatabaseConnection,
    pub cache: DynCacheStore,
    pub stripe_client: Option<stripe::Client>,
    pub image_host: DynImageHost,
    pub settings: Settings,
}

impl State {
    pub fn new(
        db: DatabaseConnection,
        cache: DynCacheStore,
        stripe_client: Option<stripe::Client>,
        image_host: DynImageHost,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            cache,
            stripe_client,
            image_host,
            settings,
        }
    }

    /// Drops every cache key the mutation staleness-affects. Called after
    /// each successful write, before the response is returned.
    pub async fn invalidate(&self, mutation: EntityMutation) -> Result<(), CacheError> {
        invalidation::invalidate(&self.cache, &mutation).await
    }
}
