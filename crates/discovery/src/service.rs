use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use medialog_core::types::{Genre, MediaCategory, Provider};
use medialog_metadata::MetadataError;
use medialog_metadata::google_books::GoogleVolume;
use medialog_metadata::jikan::JikanItem;
use medialog_metadata::provider::CatalogProvider;
use medialog_metadata::rawg::RawgGame;
use medialog_metadata::tmdb::TmdbItem;
use tracing::debug;

use crate::genre_cache::{GenreCache, GenreTable};
use crate::normalize::placeholder_description;
use crate::{DiscoveryRequest, DiscoveryResultSet};

/// The four catalog adapters, one per provider.
#[derive(Clone)]
pub struct Catalogs {
    pub tmdb: Arc<dyn CatalogProvider<Item = TmdbItem>>,
    pub jikan: Arc<dyn CatalogProvider<Item = JikanItem>>,
    pub rawg: Arc<dyn CatalogProvider<Item = RawgGame>>,
    pub books: Arc<dyn CatalogProvider<Item = GoogleVolume>>,
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub genre_ttl: Duration,
    pub language: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            genre_ttl: Duration::from_secs(24 * 60 * 60),
            language: "en-US".to_string(),
        }
    }
}

/// Routes discovery requests to the right catalog and owns the genre cache.
pub struct DiscoveryService {
    pub(crate) catalogs: Catalogs,
    pub(crate) genres: GenreCache,
    pub(crate) placeholder: &'static str,
    duplicates_dropped: AtomicU64,
}

impl DiscoveryService {
    pub fn new(catalogs: Catalogs, settings: DiscoverySettings) -> Self {
        Self {
            catalogs,
            genres: GenreCache::new(settings.genre_ttl),
            placeholder: placeholder_description(&settings.language),
            duplicates_dropped: AtomicU64::new(0),
        }
    }

    /// Dispatch to exactly one category function. Provider failures come
    /// back as a degraded result set, never as an error.
    pub async fn discover(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        debug!(
            category = %req.category,
            sort = %req.sort,
            page = req.page(),
            search = req.query().is_some(),
            "discover"
        );
        match req.category {
            MediaCategory::Movie => self.discover_movies(req).await,
            MediaCategory::Series => self.discover_series(req).await,
            MediaCategory::Anime => self.discover_anime(req).await,
            MediaCategory::Manga => self.discover_manga(req).await,
            MediaCategory::Game => self.discover_games(req).await,
            MediaCategory::Book => self.discover_books(req).await,
        }
    }

    /// Genre list for a category's filter, served from the cache.
    pub async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError> {
        self.category_genres(category, false).await
    }

    /// Drop and reload the genre list for a category.
    pub async fn refresh_genres(
        &self,
        category: MediaCategory,
    ) -> Result<Vec<Genre>, MetadataError> {
        self.category_genres(category, true).await
    }

    async fn category_genres(
        &self,
        category: MediaCategory,
        force: bool,
    ) -> Result<Vec<Genre>, MetadataError> {
        let table = match category.provider() {
            Provider::Tmdb => self.genre_table(&*self.catalogs.tmdb, category, force).await?,
            Provider::Jikan => self.genre_table(&*self.catalogs.jikan, category, force).await?,
            Provider::Rawg => self.genre_table(&*self.catalogs.rawg, category, force).await?,
            Provider::GoogleBooks => {
                self.genre_table(&*self.catalogs.books, category, force).await?
            }
        };
        Ok(table.genres().to_vec())
    }

    async fn genre_table<P>(
        &self,
        provider: &P,
        category: MediaCategory,
        force: bool,
    ) -> Result<Arc<GenreTable>, MetadataError>
    where
        P: CatalogProvider + ?Sized,
    {
        let load = || load_genres(provider, category);
        if force {
            self.genres.refresh(provider.provider(), category, load).await
        } else {
            self.genres.table(provider.provider(), category, load).await
        }
    }

    /// Duplicate entries dropped across all anime/manga pages served.
    pub fn duplicates_dropped(&self) -> u64 {
        self.duplicates_dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn record_duplicates(&self, count: usize) {
        if count > 0 {
            self.duplicates_dropped
                .fetch_add(count as u64, Ordering::Relaxed);
        }
    }
}

/// Gated genre fetch.
pub(crate) async fn load_genres<P>(
    provider: &P,
    category: MediaCategory,
) -> Result<Vec<Genre>, MetadataError>
where
    P: CatalogProvider + ?Sized,
{
    provider.rate_gate().acquire().await;
    provider.genres(category).await
}
