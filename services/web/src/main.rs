//! pawscue web service
//!
//! Accepts animal reports, lets owners look up and close lost cases by case
//! ID, collects community stories, and serves the admin panel API.

use std::sync::Arc;

use anyhow::{Context, Result};
use pawscue_web::{
    api,
    config::{Config, StoreBackend},
    db::{Database, MemoryReportStore, MemoryStoryStore, ReportStore, StoryStore},
    geocode::{Geocoder, MapboxGeocoder},
    state::{AdminAuth, AppState},
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn open_stores(config: &Config) -> Result<(Arc<dyn ReportStore>, Arc<dyn StoryStore>)> {
    match config.store {
        StoreBackend::Memory => {
            warn!("Using in-memory stores; reports and stories are lost on restart");
            Ok((
                Arc::new(MemoryReportStore::new()),
                Arc::new(MemoryStoryStore::new()),
            ))
        }
        StoreBackend::Postgres => {
            let db = match Database::connect(&config.database).await {
                Ok(db) => {
                    info!("Database connection established");
                    db
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect to database");
                    return Err(e.into());
                }
            };

            // Run migrations in dev mode
            if config.dev_mode {
                info!("Running database migrations (dev mode)");
                if let Err(e) = db.run_migrations().await {
                    error!(error = %e, "Failed to run migrations");
                    return Err(e.into());
                }
            }

            Ok((Arc::new(db.report_store()), Arc::new(db.story_store())))
        }
    }
}

fn geocoder(config: &Config) -> Result<Option<Arc<dyn Geocoder>>> {
    let Some(token) = &config.mapbox_access_token else {
        info!("No Mapbox token configured; reports will not be geocoded");
        return Ok(None);
    };
    let geocoder = MapboxGeocoder::new(token.clone()).context("failed to build geocoding client")?;
    Ok(Some(Arc::new(geocoder)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to PAWSCUE_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting pawscue web service");
    info!(
        listen_addr = %config.listen_addr,
        store = ?config.store,
        production = config.production,
        "Configuration loaded"
    );

    let (store, stories) = open_stores(&config).await?;
    let admin = AdminAuth::new(&config.cookie_secret, &config.admin_password, config.production)
        .context("invalid admin session configuration")?;
    let state = AppState::new(store, stories, admin, geocoder(&config)?);

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    info!("Web service shutdown complete");
    Ok(())
}
