//! Discovery aggregation: one paginated result contract over four catalogs.

pub mod categories;
pub mod dedup;
pub mod genre_cache;
pub mod normalize;
pub mod pagination;
pub mod service;

use medialog_core::error::ApiError;
use medialog_core::types::{Genre, MediaCategory, SortKey};
use serde::Serialize;
use thiserror::Error;

/// Items per page for every category.
pub const PAGE_SIZE: u32 = 20;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid media type")]
    InvalidCategory(String),

    /// The discovery task itself died (panic or cancellation).
    #[error("Failed to fetch discovery data")]
    Task(String),
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::InvalidCategory(_) => ApiError::BadRequest(e.to_string()),
            DiscoveryError::Task(_) => ApiError::Internal(e.to_string()),
        }
    }
}

/// One inbound discovery call.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    pub category: MediaCategory,
    pub genre: Option<String>,
    pub sort: SortKey,
    page: u32,
    query: Option<String>,
}

impl DiscoveryRequest {
    pub fn new(category: MediaCategory) -> Self {
        Self {
            category,
            genre: None,
            sort: SortKey::default(),
            page: 1,
            query: None,
        }
    }

    /// Build a request from raw route/query values.
    ///
    /// Unknown categories are rejected; an unparseable or non-positive page
    /// becomes 1 and an unknown sort becomes popularity.
    pub fn parse(
        category: &str,
        genre: Option<String>,
        sort: Option<&str>,
        page: Option<&str>,
        query: Option<String>,
    ) -> Result<Self, DiscoveryError> {
        let category = MediaCategory::from_route(category)
            .ok_or_else(|| DiscoveryError::InvalidCategory(category.to_string()))?;

        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);

        Ok(Self::new(category)
            .with_genre(genre)
            .with_sort(SortKey::parse_lenient(sort))
            .with_page(page)
            .with_query(query))
    }

    pub fn with_genre(mut self, genre: Option<String>) -> Self {
        self.genre = genre.and_then(|g| {
            let g = g.trim();
            (!g.is_empty()).then(|| g.to_string())
        });
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.and_then(|q| {
            let q = q.trim();
            (!q.is_empty()).then(|| q.to_string())
        });
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Free-text query; `None` means discover mode.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn page_size(&self) -> u32 {
        PAGE_SIZE
    }
}

/// Canonical catalog entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryItem {
    pub id: String,
    pub media_type: MediaCategory,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<String>,
    /// Provider-native scale.
    pub rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub genres: Vec<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metacritic: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
}

impl DiscoveryItem {
    pub fn new(
        id: impl Into<String>,
        media_type: MediaCategory,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            media_type,
            title: title.into(),
            description: description.into(),
            image_url: None,
            release_year: None,
            release_date: None,
            rating: None,
            ratings_count: None,
            genres: Vec::new(),
            episodes: None,
            volumes: None,
            chapters: None,
            authors: None,
            platforms: None,
            metacritic: None,
            playtime: None,
            members: None,
            popularity: None,
            rank: None,
        }
    }
}

/// Caller-visible page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResultSet {
    pub results: Vec<DiscoveryItem>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub items_per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when a free-text search failed and browse results were served instead.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub search_degraded: bool,
}

impl DiscoveryResultSet {
    /// Empty result carrying a provider failure message.
    pub fn degraded(requested_page: u32, items_per_page: u32, error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            total_pages: 0,
            current_page: requested_page,
            items_per_page,
            error: Some(error.into()),
            search_degraded: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
