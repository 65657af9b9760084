//! Google Books catalog client.
//!
//! Uses the Books API v1: https://developers.google.com/books/docs/v1/using
//!
//! The API has no genre browse primitive; genre filters become
//! `subject:"<name>"` volume searches.

use medialog_core::types::{Genre, MediaCategory, Provider};
use serde::Deserialize;

use crate::provider::{CatalogProvider, unsupported};
use crate::rate_gate::RateGate;
use crate::{DiscoverParams, MetadataError, RawPage, SearchParams};

const BASE_URL: &str = "https://www.googleapis.com/books/v1";
const REQUESTS_PER_SECOND: u32 = 10;

/// `maxResults` ceiling accepted by the volumes endpoint.
const MAX_RESULTS: u32 = 40;

pub const DEFAULT_SUBJECT: &str = "fiction";

/// Subjects offered as genre filters.
const SUBJECTS: &[&str] = &[
    "Fiction",
    "Fantasy",
    "Science Fiction",
    "Mystery",
    "Thriller",
    "Romance",
    "Horror",
    "Historical Fiction",
    "Biography & Autobiography",
    "History",
    "Science",
    "Philosophy",
    "Poetry",
    "Comics & Graphic Novels",
    "Young Adult Fiction",
    "Juvenile Fiction",
    "Business & Economics",
    "Self-Help",
    "Travel",
    "Cooking",
];

/// Build the volume query for a genre browse.
pub fn subject_query(genre: Option<&str>) -> String {
    let subject = genre
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_SUBJECT)
        .replace('"', "");
    format!("subject:\"{subject}\"")
}

/// Google serves `http://` thumbnails; browsers block them as mixed content.
pub fn secure_image_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleVolume {
    pub id: String,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VolumesPage {
    total_items: u64,
    items: Vec<GoogleVolume>,
}

pub struct GoogleBooksClient {
    api_key: Option<String>,
    client: reqwest::Client,
    gate: RateGate,
}

impl GoogleBooksClient {
    /// The API key is optional; anonymous access gets a lower daily quota.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: crate::http::build_client(),
            gate: RateGate::per_second(REQUESTS_PER_SECOND),
        }
    }

    async fn volumes(
        &self,
        q: String,
        page: u32,
        page_size: u32,
        extra: &[(&'static str, String)],
    ) -> Result<RawPage<GoogleVolume>, MetadataError> {
        let page_size = page_size.clamp(1, MAX_RESULTS);

        let mut params = vec![
            ("q", q),
            ("startIndex", start_index(page, page_size).to_string()),
            ("maxResults", page_size.to_string()),
            ("printType", "books".to_string()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("key", key.clone()));
        }
        params.extend_from_slice(extra);

        let url = format!("{BASE_URL}/volumes");
        let data =
            crate::http::get_json(&self.client, Provider::GoogleBooks, &url, &params).await?;
        parse_page(data)
    }
}

/// Zero-based offset of `page`. Computed in u64 so any requested page is
/// representable.
fn start_index(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

fn ensure_books(category: MediaCategory) -> Result<(), MetadataError> {
    if category == MediaCategory::Book {
        Ok(())
    } else {
        Err(unsupported(Provider::GoogleBooks, category))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for GoogleBooksClient {
    type Item = GoogleVolume;

    fn provider(&self) -> Provider {
        Provider::GoogleBooks
    }

    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn search(
        &self,
        category: MediaCategory,
        params: &SearchParams,
    ) -> Result<RawPage<GoogleVolume>, MetadataError> {
        ensure_books(category)?;
        self.volumes(params.query.clone(), params.page, params.page_size, &[])
            .await
    }

    async fn discover(
        &self,
        category: MediaCategory,
        params: &DiscoverParams,
    ) -> Result<RawPage<GoogleVolume>, MetadataError> {
        ensure_books(category)?;
        let q = subject_query(params.genre.as_deref());
        self.volumes(q, params.page, params.page_size, &params.ordering)
            .await
    }

    async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError> {
        ensure_books(category)?;
        Ok(SUBJECTS.iter().map(|s| Genre::new(*s, *s)).collect())
    }
}

fn parse_page(data: serde_json::Value) -> Result<RawPage<GoogleVolume>, MetadataError> {
    let page: VolumesPage = serde_json::from_value(data)?;
    Ok(RawPage {
        items: page.items,
        total_results: page.total_items,
        last_page: None,
    })
}
