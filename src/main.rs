//! Storefront Configurator - variant resolution and pricing service

use anyhow::{Context, Result};
use storefront_configurator::{http, AppConfig, Catalog, CategoryTable, Engine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let table = match &config.category_table_path {
        Some(path) => CategoryTable::load(path).with_context(|| format!("loading category table from {}", path.display()))?,
        None => CategoryTable::default(),
    };
    let catalog = Catalog::load(&config.catalog_path, &table).with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?;
    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, cart events will not be published"); None }
        },
        None => None,
    };

    let state = http::AppState::new(catalog, Engine::new(&config.currency), nats);
    let app = http::router(state);

    tracing::info!("🚀 Storefront Configurator listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
