//! Jikan (unofficial MyAnimeList) catalog client for anime and manga.
//!
//! Uses Jikan API v4: https://docs.api.jikan.moe

use medialog_core::types::{Genre, MediaCategory, Provider};
use serde::Deserialize;

use crate::provider::{CatalogProvider, unsupported};
use crate::rate_gate::RateGate;
use crate::{DiscoverParams, MetadataError, RawPage, SearchParams};

const BASE_URL: &str = "https://api.jikan.moe/v4";

/// Jikan enforces 3 requests per second per client.
const REQUESTS_PER_SECOND: u32 = 3;

/// Jikan rejects `limit` above 25.
const MAX_LIMIT: u32 = 25;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanEntry {
    pub mal_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanImages {
    pub jpg: Option<JikanImageSet>,
}

impl JikanImages {
    /// Large JPG when present, else the regular one.
    pub fn best_url(&self) -> Option<String> {
        let jpg = self.jpg.as_ref()?;
        jpg.large_image_url.clone().or_else(|| jpg.image_url.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanDateRange {
    pub from: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanAnime {
    pub mal_id: u64,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub synopsis: Option<String>,
    pub images: JikanImages,
    pub aired: Option<JikanDateRange>,
    pub year: Option<i32>,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub episodes: Option<u32>,
    pub members: Option<u64>,
    pub popularity: Option<u64>,
    pub rank: Option<u64>,
    pub genres: Vec<JikanEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JikanManga {
    pub mal_id: u64,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub synopsis: Option<String>,
    pub images: JikanImages,
    pub published: Option<JikanDateRange>,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub members: Option<u64>,
    pub popularity: Option<u64>,
    pub rank: Option<u64>,
    pub genres: Vec<JikanEntry>,
    pub authors: Vec<JikanEntry>,
}

/// Raw Jikan list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum JikanItem {
    Anime(JikanAnime),
    Manga(JikanManga),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JikanPaginationItems {
    total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JikanPagination {
    last_visible_page: u32,
    items: Option<JikanPaginationItems>,
}

#[derive(Debug, Deserialize)]
struct JikanPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    pagination: JikanPagination,
}

#[derive(Debug, Deserialize)]
struct JikanGenreList {
    #[serde(default)]
    data: Vec<JikanEntry>,
}

pub struct JikanClient {
    client: reqwest::Client,
    gate: RateGate,
}

impl JikanClient {
    pub fn new() -> Self {
        Self {
            client: crate::http::build_client(),
            gate: RateGate::per_second(REQUESTS_PER_SECOND),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, MetadataError> {
        let url = format!("{BASE_URL}{path}");
        crate::http::get_json(&self.client, Provider::Jikan, &url, params).await
    }
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

fn media_path(category: MediaCategory) -> Result<&'static str, MetadataError> {
    match category {
        MediaCategory::Anime => Ok("anime"),
        MediaCategory::Manga => Ok("manga"),
        other => Err(unsupported(Provider::Jikan, other)),
    }
}

#[async_trait::async_trait]
impl CatalogProvider for JikanClient {
    type Item = JikanItem;

    fn provider(&self) -> Provider {
        Provider::Jikan
    }

    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn search(
        &self,
        category: MediaCategory,
        params: &SearchParams,
    ) -> Result<RawPage<JikanItem>, MetadataError> {
        let path = media_path(category)?;
        let data = self
            .get_json(
                &format!("/{path}"),
                &[
                    ("q", params.query.clone()),
                    ("page", params.page.to_string()),
                    ("limit", params.page_size.min(MAX_LIMIT).to_string()),
                    ("sfw", "true".to_string()),
                ],
            )
            .await?;

        parse_page(category, data)
    }

    async fn discover(
        &self,
        category: MediaCategory,
        params: &DiscoverParams,
    ) -> Result<RawPage<JikanItem>, MetadataError> {
        let path = media_path(category)?;
        let mut query = vec![
            ("page", params.page.to_string()),
            ("limit", params.page_size.min(MAX_LIMIT).to_string()),
            ("sfw", "true".to_string()),
        ];
        if let Some(ref genre) = params.genre {
            query.push(("genres", genre.clone()));
        }
        query.extend(params.ordering.iter().cloned());

        let data = self.get_json(&format!("/{path}"), &query).await?;
        parse_page(category, data)
    }

    async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError> {
        let path = media_path(category)?;
        let data = self.get_json(&format!("/genres/{path}"), &[]).await?;
        let list: JikanGenreList = serde_json::from_value(data)?;
        Ok(list
            .data
            .into_iter()
            .map(|g| Genre::new(g.mal_id.to_string(), g.name))
            .collect())
    }
}

fn parse_page(
    category: MediaCategory,
    data: serde_json::Value,
) -> Result<RawPage<JikanItem>, MetadataError> {
    match category {
        MediaCategory::Anime => {
            let page: JikanPage<JikanAnime> = serde_json::from_value(data)?;
            Ok(into_raw_page(page, JikanItem::Anime))
        }
        MediaCategory::Manga => {
            let page: JikanPage<JikanManga> = serde_json::from_value(data)?;
            Ok(into_raw_page(page, JikanItem::Manga))
        }
        other => Err(unsupported(Provider::Jikan, other)),
    }
}

fn into_raw_page<T>(page: JikanPage<T>, wrap: fn(T) -> JikanItem) -> RawPage<JikanItem> {
    let total = page
        .pagination
        .items
        .as_ref()
        .map(|i| i.total)
        .unwrap_or(page.data.len() as u64);
    RawPage {
        items: page.data.into_iter().map(wrap).collect(),
        total_results: total,
        last_page: Some(page.pagination.last_visible_page.max(1)),
    }
}
