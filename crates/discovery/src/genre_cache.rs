//! Genre ID -> name cache keyed by `(provider, category)`.
//!
//! Each table is loaded once and served from memory until its TTL runs out
//! or it is refreshed explicitly. Loads are serialized per key so a cold
//! batch of concurrent lookups triggers a single fetch, while a slow load for
//! one key never holds up another.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use medialog_core::types::{Genre, MediaCategory, Provider};
use medialog_metadata::MetadataError;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

type CacheKey = (Provider, MediaCategory);

/// Loaded genre list with an id index.
#[derive(Debug)]
pub struct GenreTable {
    genres: Vec<Genre>,
    by_id: HashMap<String, String>,
}

impl GenreTable {
    pub fn new(genres: Vec<Genre>) -> Self {
        let by_id = genres
            .iter()
            .map(|g| (g.id.clone(), g.name.clone()))
            .collect();
        Self { genres, by_id }
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// Unknown ids resolve to the id itself.
    pub fn name(&self, id: &str) -> String {
        self.by_id
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn resolve(&self, ids: &[u64]) -> Vec<Genre> {
        ids.iter()
            .map(|id| {
                let id = id.to_string();
                let name = self.name(&id);
                Genre { id, name }
            })
            .collect()
    }
}

struct CachedTable {
    table: Arc<GenreTable>,
    loaded_at: Instant,
}

pub struct GenreCache {
    ttl: Duration,
    tables: RwLock<HashMap<CacheKey, CachedTable>>,
    load_locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl GenreCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tables: RwLock::new(HashMap::new()),
            load_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn load_lock(&self, key: CacheKey) -> Arc<Mutex<()>> {
        self.load_locks.lock().await.entry(key).or_default().clone()
    }

    async fn fresh(&self, key: &CacheKey) -> Option<Arc<GenreTable>> {
        let tables = self.tables.read().await;
        tables
            .get(key)
            .filter(|cached| cached.loaded_at.elapsed() < self.ttl)
            .map(|cached| cached.table.clone())
    }

    /// Return the table for `(provider, category)`, calling `load` only when
    /// it is missing or expired.
    pub async fn table<F, Fut>(
        &self,
        provider: Provider,
        category: MediaCategory,
        load: F,
    ) -> Result<Arc<GenreTable>, MetadataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Genre>, MetadataError>>,
    {
        let key = (provider, category);
        if let Some(table) = self.fresh(&key).await {
            return Ok(table);
        }

        let lock = self.load_lock(key).await;
        let _guard = lock.lock().await;
        // Another task may have loaded it while we waited.
        if let Some(table) = self.fresh(&key).await {
            return Ok(table);
        }

        let genres = load().await?;
        debug!(provider = %provider, category = %category, count = genres.len(), "genre table loaded");

        let table = Arc::new(GenreTable::new(genres));
        self.tables.write().await.insert(
            key,
            CachedTable {
                table: table.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(table)
    }

    /// Resolve numeric ids to `{id, name}` pairs.
    pub async fn resolve<F, Fut>(
        &self,
        provider: Provider,
        category: MediaCategory,
        ids: &[u64],
        load: F,
    ) -> Result<Vec<Genre>, MetadataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Genre>, MetadataError>>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.table(provider, category, load).await?;
        Ok(table.resolve(ids))
    }

    /// Drop the cached table so the next lookup reloads it.
    pub async fn invalidate(&self, provider: Provider, category: MediaCategory) {
        if self.tables.write().await.remove(&(provider, category)).is_some() {
            info!(provider = %provider, category = %category, "genre table invalidated");
        }
    }

    /// Force a reload now.
    pub async fn refresh<F, Fut>(
        &self,
        provider: Provider,
        category: MediaCategory,
        load: F,
    ) -> Result<Arc<GenreTable>, MetadataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Genre>, MetadataError>>,
    {
        self.invalidate(provider, category).await;
        self.table(provider, category, load).await
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tmdb_genres() -> Vec<Genre> {
        vec![Genre::new("28", "Action"), Genre::new("35", "Comedy")]
    }

    #[tokio::test]
    async fn second_lookup_does_not_load() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tmdb_genres())
        };

        let first = cache
            .resolve(Provider::Tmdb, MediaCategory::Movie, &[28], load)
            .await
            .unwrap();
        let second = cache
            .resolve(Provider::Tmdb, MediaCategory::Movie, &[28], load)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].name, "Action");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_id_degrades_to_id() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let genres = cache
            .resolve(Provider::Tmdb, MediaCategory::Movie, &[28, 9999], || async {
                Ok(tmdb_genres())
            })
            .await
            .unwrap();
        assert_eq!(genres[1], Genre::new("9999", "9999"));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tmdb_genres())
        };
        cache.table(Provider::Tmdb, MediaCategory::Movie, load).await.unwrap();
        cache.table(Provider::Tmdb, MediaCategory::Series, load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_table_reloads() {
        let cache = GenreCache::new(Duration::from_secs(10));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tmdb_genres())
        };
        cache.table(Provider::Tmdb, MediaCategory::Movie, load).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.table(Provider::Tmdb, MediaCategory::Movie, load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        cache.table(Provider::Tmdb, MediaCategory::Movie, load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_forces_reload() {
        let cache = GenreCache::new(Duration::from_secs(3600));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tmdb_genres())
        };
        cache.table(Provider::Jikan, MediaCategory::Anime, load).await.unwrap();
        cache.refresh(Provider::Jikan, MediaCategory::Anime, load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let err = cache
            .table(Provider::Rawg, MediaCategory::Game, || async {
                Err(MetadataError::Network("down".into()))
            })
            .await;
        assert!(err.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_cold_lookups_load_once() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(tmdb_genres())
        };
        let lookups = (0..8).map(|_| cache.resolve(Provider::Tmdb, MediaCategory::Movie, &[35], load));
        let results = futures::future::join_all(lookups).await;
        assert!(results.iter().all(|r| r.as_ref().unwrap()[0].name == "Comedy"));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_load_does_not_block_other_keys() {
        let cache = GenreCache::new(Duration::from_secs(60));
        let (release, held) = tokio::sync::oneshot::channel::<()>();

        let slow = cache.table(Provider::Jikan, MediaCategory::Anime, || async move {
            let _ = held.await;
            Ok(vec![Genre::new("1", "Action")])
        });
        let fast = async {
            let table = cache
                .table(Provider::Tmdb, MediaCategory::Movie, || async { Ok(tmdb_genres()) })
                .await;
            let _ = release.send(());
            table
        };

        let (slow, fast) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(slow, fast)
        })
        .await
        .expect("a pending load on one key stalled another key");

        assert_eq!(fast.unwrap().name("28"), "Action");
        assert_eq!(slow.unwrap().name("1"), "Action");
    }
}
