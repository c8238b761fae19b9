use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use stargaze_backend::config::BackendConfig;
use stargaze_backend::module::catalog::{CatalogManager, FastTier, JsonCatalogStore, RedisTier};
use stargaze_backend::module::wiki::{ContentCache, WikiScraper};
use stargaze_backend::service::{router, SkyService};
use stargaze_backend::logging;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration, falling back to defaults when no file exists
    let (config, config_from_file) = match BackendConfig::from_file(CONFIG_PATH) {
        Ok(config) => (config, true),
        Err(_) => (BackendConfig::default(), false),
    };

    // Initialize logging
    let _logging_guard =
        logging::init_logging(&config.log_dir, "stargaze-backend", &config.log_level);

    tracing::info!("Stargaze backend starting...");
    if !config_from_file {
        tracing::info!("No {} found, using default configuration", CONFIG_PATH);
    }

    // Durable catalog store - the source of truth
    let store = JsonCatalogStore::load(&config.catalog_path)
        .await
        .context("Failed to load the catalog collection")?;

    // Fast tier - an unreachable tier is a degraded start, not a failure
    let tier: Arc<dyn FastTier> = Arc::new(RedisTier::connect(&config.fast_tier_url).await);
    if tier.is_available() {
        tracing::info!("Fast tier ready, cache TTL {}s", config.cache_ttl_secs);
    }

    let catalog = CatalogManager::new(Arc::new(store), tier.clone(), config.cache_ttl_secs);
    let content = ContentCache::new(
        tier,
        Arc::new(WikiScraper::new(config.scrape_timeout_secs)),
        config.cache_ttl_secs,
    );
    let service = Arc::new(SkyService::new(catalog, content));

    let app = router(service);
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .context("Invalid server address")?;

    tracing::info!("HTTP server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
