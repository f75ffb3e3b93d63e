//! H&B Storefront - storefront service over a local JSON store

use anyhow::Result;
use hb_storefront::{config::Config, http::{router, AppState}, Store, Storefront};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env();
    let store = Store::open(&config.data_dir)?;
    let shop = Storefront::open(store)?.with_default_whatsapp(config.default_whatsapp.clone());
    let app = router(AppState { shop: Arc::new(shop) });

    tracing::info!(data_dir = %config.data_dir.display(), "🚀 H&B Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
