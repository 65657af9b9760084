//! Per-category discover functions.
//!
//! Each function picks search or browse mode, runs the pagination
//! corrector, maps items and turns provider failures into a degraded
//! result set.

use chrono::NaiveDate;
use futures::future::join_all;
use medialog_core::types::{Genre, MediaCategory, SortKey};
use medialog_metadata::provider::CatalogProvider;
use medialog_metadata::{DiscoverParams, MetadataError, SearchParams};
use tracing::warn;

use crate::dedup::dedup_by_id;
use crate::normalize;
use crate::pagination::{CorrectedPage, fetch_corrected};
use crate::service::{DiscoveryService, load_genres};
use crate::{DiscoveryItem, DiscoveryRequest, DiscoveryResultSet};

/// TMDB serves 500 pages of 20.
const TMDB_CEILING: u64 = 10_000;
/// Jikan reports exact totals and a last page; no extra clamp.
const JIKAN_CEILING: u64 = u64::MAX;
const RAWG_CEILING: u64 = 10_000;
/// Google Books match counts for ranked free-text search are unreliable.
const BOOKS_SEARCH_CEILING: u64 = 20;
/// Google Books stops paging near `startIndex` 1000.
const BOOKS_DISCOVER_CEILING: u64 = 1_000;

const TMDB_MIN_VOTES_FOR_RATING: u32 = 100;

enum Mode {
    Search(SearchParams),
    Discover(DiscoverParams),
}

impl Mode {
    fn for_request(req: &DiscoveryRequest, ordering: Vec<(&'static str, String)>) -> Self {
        match req.query() {
            Some(query) => Self::search(req, query),
            None => Self::discover(req, ordering),
        }
    }

    fn search(req: &DiscoveryRequest, query: &str) -> Self {
        Self::Search(SearchParams {
            query: query.to_string(),
            page: req.page(),
            page_size: req.page_size(),
        })
    }

    fn discover(req: &DiscoveryRequest, ordering: Vec<(&'static str, String)>) -> Self {
        Self::Discover(DiscoverParams {
            genre: req.genre.clone(),
            ordering,
            page: req.page(),
            page_size: req.page_size(),
        })
    }
}

/// TMDB `field.direction` tokens plus the filters that keep each order sane.
pub fn tmdb_ordering(
    category: MediaCategory,
    sort: SortKey,
    today: NaiveDate,
) -> Vec<(&'static str, String)> {
    let (date_sort, date_upper_bound) = match category {
        MediaCategory::Series => ("first_air_date.desc", "first_air_date.lte"),
        _ => ("primary_release_date.desc", "primary_release_date.lte"),
    };
    match sort {
        SortKey::Popularity => vec![("sort_by", "popularity.desc".to_string())],
        SortKey::Newest => vec![
            ("sort_by", date_sort.to_string()),
            (date_upper_bound, today.format("%Y-%m-%d").to_string()),
        ],
        SortKey::Rating => vec![
            ("sort_by", "vote_average.desc".to_string()),
            ("vote_count.gte", TMDB_MIN_VOTES_FOR_RATING.to_string()),
        ],
        SortKey::MostRated => vec![("sort_by", "vote_count.desc".to_string())],
    }
}

/// Jikan separate `order_by` / `sort` tokens.
pub fn jikan_ordering(sort: SortKey) -> Vec<(&'static str, String)> {
    let order_by = match sort {
        SortKey::Popularity => "members",
        SortKey::Newest => "start_date",
        SortKey::Rating => "score",
        SortKey::MostRated => "scored_by",
    };
    vec![
        ("order_by", order_by.to_string()),
        ("sort", "desc".to_string()),
    ]
}

/// RAWG signed-prefix ordering.
pub fn rawg_ordering(sort: SortKey) -> Vec<(&'static str, String)> {
    let ordering = match sort {
        SortKey::Popularity => "-added",
        SortKey::Newest => "-released",
        SortKey::Rating => "-rating",
        SortKey::MostRated => "-ratings_count",
    };
    vec![("ordering", ordering.to_string())]
}

/// Google Books only knows relevance and newest.
pub fn google_books_ordering(sort: SortKey) -> Vec<(&'static str, String)> {
    let order = match sort {
        SortKey::Newest => "newest",
        _ => "relevance",
    };
    vec![("orderBy", order.to_string())]
}

/// Gated fetch with pagination correction.
async fn fetch_page<P>(
    provider: &P,
    category: MediaCategory,
    mode: &Mode,
    requested_page: u32,
    page_size: u32,
    ceiling: u64,
) -> Result<CorrectedPage<P::Item>, MetadataError>
where
    P: CatalogProvider + ?Sized,
{
    fetch_corrected(requested_page, page_size, ceiling, move |page| async move {
        provider.rate_gate().acquire().await;
        match mode {
            Mode::Search(params) => provider.search(category, &params.at_page(page)).await,
            Mode::Discover(params) => provider.discover(category, &params.at_page(page)).await,
        }
    })
    .await
}

fn finish<T>(
    corrected: CorrectedPage<T>,
    page_size: u32,
    map: impl FnMut(T) -> DiscoveryItem,
) -> DiscoveryResultSet {
    let mut results: Vec<DiscoveryItem> = corrected.page.items.into_iter().map(map).collect();
    results.truncate(page_size as usize);
    DiscoveryResultSet {
        results,
        total: corrected.total,
        total_pages: corrected.total_pages,
        current_page: corrected.current_page,
        items_per_page: page_size,
        error: None,
        search_degraded: false,
    }
}

impl DiscoveryService {
    pub(crate) async fn discover_movies(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        self.discover_screen(MediaCategory::Movie, req).await
    }

    pub(crate) async fn discover_series(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        self.discover_screen(MediaCategory::Series, req).await
    }

    pub(crate) async fn discover_anime(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        self.discover_japanese(MediaCategory::Anime, req).await
    }

    pub(crate) async fn discover_manga(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        self.discover_japanese(MediaCategory::Manga, req).await
    }

    pub(crate) async fn discover_games(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        let mode = Mode::for_request(req, rawg_ordering(req.sort));
        let provider = &*self.catalogs.rawg;
        let placeholder = self.placeholder;

        let result = fetch_page(
            provider,
            MediaCategory::Game,
            &mode,
            req.page(),
            req.page_size(),
            RAWG_CEILING,
        )
        .await
        .map(|corrected| {
            finish(corrected, req.page_size(), |game| {
                normalize::rawg_game(game, placeholder)
            })
        });

        result.unwrap_or_else(|e| self.degrade(MediaCategory::Game, req, e))
    }

    pub(crate) async fn discover_books(&self, req: &DiscoveryRequest) -> DiscoveryResultSet {
        let (mode, ceiling) = match req.query() {
            Some(query) => (Mode::search(req, query), BOOKS_SEARCH_CEILING),
            None => (
                Mode::discover(req, google_books_ordering(req.sort)),
                BOOKS_DISCOVER_CEILING,
            ),
        };
        let provider = &*self.catalogs.books;
        let placeholder = self.placeholder;

        let result = fetch_page(
            provider,
            MediaCategory::Book,
            &mode,
            req.page(),
            req.page_size(),
            ceiling,
        )
        .await
        .map(|corrected| {
            finish(corrected, req.page_size(), |volume| {
                normalize::google_book(volume, placeholder)
            })
        });

        result.unwrap_or_else(|e| self.degrade(MediaCategory::Book, req, e))
    }

    /// Movies and series: a failed search silently falls back to browse
    /// mode and flags the result.
    async fn discover_screen(
        &self,
        category: MediaCategory,
        req: &DiscoveryRequest,
    ) -> DiscoveryResultSet {
        let today = chrono::Utc::now().date_naive();
        let browse = Mode::discover(req, tmdb_ordering(category, req.sort, today));

        let Some(query) = req.query() else {
            return self
                .tmdb_page(category, &browse, req)
                .await
                .unwrap_or_else(|e| self.degrade(category, req, e));
        };

        match self.tmdb_page(category, &Mode::search(req, query), req).await {
            Ok(set) => set,
            Err(e) => {
                warn!(
                    category = %category,
                    query,
                    error = %e,
                    "search failed, serving discover results instead"
                );
                let mut set = self
                    .tmdb_page(category, &browse, req)
                    .await
                    .unwrap_or_else(|e| self.degrade(category, req, e));
                set.search_degraded = true;
                set
            }
        }
    }

    async fn tmdb_page(
        &self,
        category: MediaCategory,
        mode: &Mode,
        req: &DiscoveryRequest,
    ) -> Result<DiscoveryResultSet, MetadataError> {
        let provider = &*self.catalogs.tmdb;
        let corrected = fetch_page(
            provider,
            category,
            mode,
            req.page(),
            req.page_size(),
            TMDB_CEILING,
        )
        .await?;

        let lookups = corrected.page.items.iter().map(|item| {
            self.genres.resolve(
                provider.provider(),
                category,
                item.genre_ids(),
                || load_genres(provider, category),
            )
        });
        let genre_lists = join_all(lookups)
            .await
            .into_iter()
            .collect::<Result<Vec<Vec<Genre>>, MetadataError>>()?;

        let mut genre_lists = genre_lists.into_iter();
        let placeholder = self.placeholder;
        Ok(finish(corrected, req.page_size(), |item| {
            normalize::tmdb_item(item, genre_lists.next().unwrap_or_default(), placeholder)
        }))
    }

    /// Anime and manga: Jikan occasionally repeats an entry within a page.
    async fn discover_japanese(
        &self,
        category: MediaCategory,
        req: &DiscoveryRequest,
    ) -> DiscoveryResultSet {
        let mode = Mode::for_request(req, jikan_ordering(req.sort));
        let provider = &*self.catalogs.jikan;
        let placeholder = self.placeholder;

        let result = fetch_page(
            provider,
            category,
            &mode,
            req.page(),
            req.page_size(),
            JIKAN_CEILING,
        )
        .await
        .map(|corrected| {
            finish(corrected, req.page_size(), |item| {
                normalize::jikan_item(item, placeholder)
            })
        });

        match result {
            Ok(mut set) => {
                let (results, dropped) = dedup_by_id(set.results);
                self.record_duplicates(dropped);
                set.results = results;
                set
            }
            Err(e) => self.degrade(category, req, e),
        }
    }

    fn degrade(
        &self,
        category: MediaCategory,
        req: &DiscoveryRequest,
        error: MetadataError,
    ) -> DiscoveryResultSet {
        warn!(
            category = %category,
            page = req.page(),
            error = %error,
            "catalog request failed, serving empty page"
        );
        DiscoveryResultSet::degraded(req.page(), req.page_size(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn tmdb_tokens_per_sort() {
        assert_eq!(
            tmdb_ordering(MediaCategory::Movie, SortKey::Popularity, day()),
            vec![("sort_by", "popularity.desc".to_string())]
        );
        assert_eq!(
            tmdb_ordering(MediaCategory::Movie, SortKey::Newest, day()),
            vec![
                ("sort_by", "primary_release_date.desc".to_string()),
                ("primary_release_date.lte", "2026-10-18".to_string()),
            ]
        );
        assert_eq!(
            tmdb_ordering(MediaCategory::Series, SortKey::Newest, day())[0],
            ("sort_by", "first_air_date.desc".to_string())
        );
        assert_eq!(
            tmdb_ordering(MediaCategory::Series, SortKey::MostRated, day()),
            vec![("sort_by", "vote_count.desc".to_string())]
        );
        assert!(
            tmdb_ordering(MediaCategory::Movie, SortKey::Rating, day())
                .contains(&("vote_count.gte", "100".to_string()))
        );
    }

    #[test]
    fn jikan_tokens_are_split() {
        assert_eq!(
            jikan_ordering(SortKey::Rating),
            vec![("order_by", "score".to_string()), ("sort", "desc".to_string())]
        );
        assert_eq!(jikan_ordering(SortKey::Popularity)[0].1, "members");
    }

    #[test]
    fn rawg_tokens_are_signed() {
        assert_eq!(rawg_ordering(SortKey::Popularity)[0].1, "-added");
        assert_eq!(rawg_ordering(SortKey::Newest)[0].1, "-released");
        assert_eq!(rawg_ordering(SortKey::MostRated)[0].1, "-ratings_count");
    }

    #[test]
    fn google_books_only_distinguishes_newest() {
        assert_eq!(google_books_ordering(SortKey::Newest)[0].1, "newest");
        assert_eq!(google_books_ordering(SortKey::Rating)[0].1, "relevance");
    }
}
