use std::sync::Arc;

use housing_portal::config::Config;
use housing_portal::listing::{CatalogStore, MemoryStore, PgPropertyStore, PropertyStore};
use housing_portal::server::{self, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Housing Portal - listing service");

    let config = Config::from_env()?;

    let (store, catalogs): (Arc<dyn PropertyStore>, Arc<dyn CatalogStore>) =
        match &config.database_url {
            Some(url) => {
                let pg = Arc::new(PgPropertyStore::connect(url, config.max_connections).await?);
                if config.run_migrations {
                    pg.migrate().await?;
                }
                (pg.clone() as Arc<dyn PropertyStore>, pg as Arc<dyn CatalogStore>)
            }
            None => {
                warn!("DATABASE_URL not set, serving demo listings from memory");
                let memory = Arc::new(MemoryStore::with_demo_listings());
                (memory.clone() as Arc<dyn PropertyStore>, memory as Arc<dyn CatalogStore>)
            }
        };

    info!("Using {} property store", store.source_name());
    info!("Hidden publication states: {:?}", config.excluded_states);

    let state = AppState::new(store, catalogs, &config);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;

    server::serve(listener, state).await
}
