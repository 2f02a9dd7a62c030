#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;
use std::time::Duration;

use storefront_api::{
    cache::{DynCacheStore, MemoryCacheStore, RedisCacheStore},
    construct_router,
    http as axum,
    images::{DynImageHost, HttpImageHost, ImageHostSettings},
    sea_orm::{ConnectOptions, Database},
    state::{Settings, State},
    stripe,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting storefront API service");

    let config = config::Config::from_env()?;

    // Stores connect before the listener binds.
    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8));
    let db = Database::connect(opt).await?;
    tracing::info!("Connected to database");

    let cache: DynCacheStore = match &config.redis_url {
        Some(url) => {
            let store = RedisCacheStore::connect(url).await?;
            tracing::info!("Connected to Redis cache");
            Arc::new(store)
        }
        None => {
            tracing::info!("Using in-process cache");
            Arc::new(MemoryCacheStore::new())
        }
    };

    let stripe_client = config.stripe_secret_key.as_ref().map(|key| {
        tracing::info!("Stripe client configured");
        stripe::Client::new(key.clone())
    });
    if stripe_client.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set; payment-intent creation is disabled");
    }

    let image_host: DynImageHost = Arc::new(HttpImageHost::new(ImageHostSettings {
        base_url: config.image_host_url.clone(),
        api_key: config.image_host_api_key.clone(),
        folder: config.image_host_folder.clone(),
    }));

    let currency: stripe::Currency = serde_json::from_value(serde_json::Value::String(
        config.currency.to_lowercase(),
    ))
    .map_err(|_| format!("invalid CURRENCY: {}", config.currency))?;

    let state = Arc::new(State::new(
        db,
        cache,
        stripe_client,
        image_host,
        Settings {
            currency,
            admin_stats_ttl: config.admin_stats_ttl,
        },
    ));

    let app = construct_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
