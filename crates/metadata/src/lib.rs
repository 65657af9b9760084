pub mod google_books;
mod http;
pub mod jikan;
pub mod provider;
pub mod rate_gate;
pub mod rawg;
pub mod tmdb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    /// The provider rejected a page past its last one instead of serving it empty.
    #[error("page {0} is past the last page")]
    PageOutOfRange(u32),
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("{provider} does not serve {category}")]
    UnsupportedCategory {
        provider: &'static str,
        category: &'static str,
    },
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// One page of provider-native items.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage<T> {
    pub items: Vec<T>,
    /// Result count as reported by the provider. May be approximate.
    pub total_results: u64,
    /// Last page the provider will serve, when it reports one.
    pub last_page: Option<u32>,
}

/// Free-text search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

/// Browse parameters. `ordering` holds the provider-specific query pairs
/// the caller translated from its abstract sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverParams {
    pub genre: Option<String>,
    pub ordering: Vec<(&'static str, String)>,
    pub page: u32,
    pub page_size: u32,
}

impl DiscoverParams {
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

impl SearchParams {
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// `"2010-07-16"` -> `Some(2010)`.
pub fn year_from_date(date: &str) -> Option<i32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

/// Treat empty or whitespace-only provider strings as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
