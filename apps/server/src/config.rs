//! Environment-driven configuration, loaded once at startup.

use std::time::Duration;

use storefront_types::{Result, anyhow};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// When unset the cache runs in-process.
    pub redis_url: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub image_host_url: String,
    pub image_host_api_key: String,
    pub image_host_folder: String,
    pub currency: String,
    pub admin_stats_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))?;
        let image_host_url =
            std::env::var("IMAGE_HOST_URL").map_err(|_| anyhow!("IMAGE_HOST_URL must be set"))?;
        let image_host_api_key = std::env::var("IMAGE_HOST_API_KEY")
            .map_err(|_| anyhow!("IMAGE_HOST_API_KEY must be set"))?;

        let port = std::env::var("PORT")
            .ok()
            .map(|raw| raw.parse().map_err(|_| anyhow!("invalid PORT: {raw}")))
            .transpose()?
            .unwrap_or(3000);

        let admin_stats_ttl_secs = std::env::var("ADMIN_STATS_TTL_SECS")
            .ok()
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| anyhow!("invalid ADMIN_STATS_TTL_SECS: {raw}"))
            })
            .transpose()?
            .unwrap_or(14_400);

        Ok(Self {
            port,
            database_url,
            redis_url: std::env::var("REDIS_URL").ok(),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
            image_host_url,
            image_host_api_key,
            image_host_folder: std::env::var("IMAGE_HOST_FOLDER")
                .unwrap_or_else(|_| "ecommerce".to_string()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "inr".to_string()),
            admin_stats_ttl: Duration::from_secs(admin_stats_ttl_secs),
        })
    }
}
