use std::sync::Arc;

use anyhow::{Context, Result};
use domain::services::DeviceBroker;
use persistence::{PostgrestStore, RecordStore};
use tracing::{info, warn};

use syncora_api::{app, config, middleware, services::BlynkClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    middleware::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    info!("Starting Syncora API v{}", env!("CARGO_PKG_VERSION"));

    let broker: Arc<dyn DeviceBroker> =
        Arc::new(BlynkClient::new(&config.blynk).context("Failed to build Blynk client")?);

    let store: Option<Arc<dyn RecordStore>> = match config.supabase.credentials() {
        Some(creds) => Some(Arc::new(
            PostgrestStore::new(&creds).context("Failed to build Supabase client")?,
        )),
        None => {
            warn!("Supabase not configured; store-backed endpoints will return 500");
            None
        }
    };

    let listener = app::bind_listener(&config.server.host, config.server.port).await?;
    info!("Server listening on {}", listener.local_addr()?);

    let app = app::create_app(config, broker, store);
    axum::serve(listener, app).await?;

    Ok(())
}
