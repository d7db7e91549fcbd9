//! Pointage server.
//!
//! Serves the geofenced check-in API over HTTP. Attendance is kept in memory
//! or forwarded to the REST attendance backend, depending on `settings.yaml`.

use std::sync::Arc;

use clap::Parser;
use pointage_engine::api::{AppState, create_router};
use pointage_engine::backend::{HttpBackend, InMemoryAttendanceStore};
use pointage_engine::config::{BackendSettings, ConfigLoader};
use pointage_engine::ports::{AttendancePersistence, StoreDirectory};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Geofenced attendance check-in server
#[derive(Parser, Debug)]
#[command(name = "pointage-server", version, about)]
struct Args {
    /// Path to the configuration directory
    #[arg(short, long, default_value = "./config/default")]
    config: String,

    /// Overrides `server.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = ConfigLoader::load(&args.config)?;

    let (persistence, directory): (Arc<dyn AttendancePersistence>, Arc<dyn StoreDirectory>) =
        match config.backend() {
            BackendSettings::Memory => {
                let store: Arc<dyn AttendancePersistence> =
                    Arc::new(InMemoryAttendanceStore::new(config.local_offset()));
                let directory: Arc<dyn StoreDirectory> = Arc::new(config.store_directory());
                (store, directory)
            }
            BackendSettings::Http(settings) => {
                let backend = Arc::new(HttpBackend::new(settings.clone(), config.local_offset())?);
                let store: Arc<dyn AttendancePersistence> = backend.clone();
                (store, backend)
            }
        };

    let bind_address = args
        .bind
        .clone()
        .unwrap_or_else(|| config.bind_address().to_string());

    info!(
        config_dir = %args.config,
        bind_address = %bind_address,
        radius_m = config.geofence().radius_meters(),
        utc_offset = %config.local_offset(),
        stores = config.stores().len(),
        backend = match config.backend() {
            BackendSettings::Memory => "memory",
            BackendSettings::Http(_) => "http",
        },
        "config_loaded"
    );

    let router = create_router(AppState::new(&config, persistence, directory));
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %listener.local_addr()?, "pointage-server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
