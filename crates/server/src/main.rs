use std::sync::Arc;

use anyhow::Context;
use medialog_discovery::service::{Catalogs, DiscoveryService};
use medialog_metadata::google_books::GoogleBooksClient;
use medialog_metadata::jikan::JikanClient;
use medialog_metadata::rawg::RawgClient;
use medialog_metadata::tmdb::TmdbClient;
use medialog_server::config::Config;
use medialog_server::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    if config.tmdb_key.is_none() {
        warn!("MEDIALOG_TMDB_KEY not set; movie and series discovery will return errors");
    }
    if config.rawg_key.is_none() {
        warn!("MEDIALOG_RAWG_KEY not set; game discovery will return errors");
    }

    let catalogs = Catalogs {
        tmdb: Arc::new(TmdbClient::new(
            config.tmdb_key.clone(),
            config.language.clone(),
        )),
        jikan: Arc::new(JikanClient::new()),
        rawg: Arc::new(RawgClient::new(config.rawg_key.clone())),
        books: Arc::new(GoogleBooksClient::new(config.google_books_key.clone())),
    };
    let discovery = DiscoveryService::new(catalogs, config.discovery_settings());
    info!(
        language = %config.language,
        genre_ttl_secs = config.genre_ttl.as_secs(),
        "discovery service ready"
    );

    let app = medialog_server::routes::build_router(AppState::new(discovery));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
