use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pokedex::browser::Browser;
use pokedex::error::{PokedexError, Result};
use pokedex::persist::SqliteCache;
use pokedex::remote::HttpRemote;
use pokedex::server;
use pokedex::settings::{DEFAULT_CONFIG_FILE, Settings};
use pokedex::view::ViewRecorder;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_file = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned());
    let settings = Settings::load(&config_file)?;
    info!(base_url = %settings.base_url, page_size = settings.page_size, "settings loaded");

    let cache = Arc::new(SqliteCache::new(
        settings.cache.persistence_mode(),
        settings.cache.quota_bytes,
    )?);
    let remote = Arc::new(HttpRemote::new(settings.base_url.clone()));
    let view = Arc::new(ViewRecorder::new());
    let browser = Arc::new(Browser::new(remote, cache, view.clone(), &settings)?);

    // the first page is loaded eagerly, a failure only means starting empty
    if let Err(e) = browser.load_more().await {
        error!(error = %e, "initial page failed to load");
    }

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .map_err(|e| PokedexError::Config(format!("cannot bind {}: {e}", settings.server.address)))?;
    info!(address = %settings.server.address, "serving");
    axum::serve(listener, server::router(browser, view))
        .await
        .map_err(|e| PokedexError::Config(format!("server stopped: {e}")))?;
    Ok(())
}
