//! RAWG video game catalog client.
//!
//! Uses the RAWG API: https://api.rawg.io/docs

use medialog_core::types::{Genre, MediaCategory, Provider};
use serde::Deserialize;

use crate::provider::{CatalogProvider, unsupported};
use crate::rate_gate::RateGate;
use crate::{DiscoverParams, MetadataError, RawPage, SearchParams};

const BASE_URL: &str = "https://api.rawg.io/api";
const REQUESTS_PER_SECOND: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawgNamed {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawgPlatformEntry {
    pub platform: RawgNamed,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawgGame {
    pub id: u64,
    pub name: Option<String>,
    pub description_raw: Option<String>,
    pub released: Option<String>,
    pub background_image: Option<String>,
    pub rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub metacritic: Option<u32>,
    pub playtime: Option<u32>,
    pub genres: Option<Vec<RawgNamed>>,
    pub platforms: Option<Vec<RawgPlatformEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawgPage<T> {
    #[serde(default)]
    count: u64,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

pub struct RawgClient {
    api_key: Option<String>,
    client: reqwest::Client,
    gate: RateGate,
}

impl RawgClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: crate::http::build_client(),
            gate: RateGate::per_second(REQUESTS_PER_SECOND),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, MetadataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(MetadataError::NotConfigured("RAWG API key"))?;

        let mut all_params = vec![("key", api_key.to_string())];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        crate::http::get_json(&self.client, Provider::Rawg, &url, &all_params).await
    }
}

fn ensure_games(category: MediaCategory) -> Result<(), MetadataError> {
    if category == MediaCategory::Game {
        Ok(())
    } else {
        Err(unsupported(Provider::Rawg, category))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for RawgClient {
    type Item = RawgGame;

    fn provider(&self) -> Provider {
        Provider::Rawg
    }

    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn search(
        &self,
        category: MediaCategory,
        params: &SearchParams,
    ) -> Result<RawPage<RawgGame>, MetadataError> {
        ensure_games(category)?;
        let data = self
            .get_json(
                "/games",
                &[
                    ("search", params.query.clone()),
                    ("search_precise", "true".to_string()),
                    ("page", params.page.to_string()),
                    ("page_size", params.page_size.to_string()),
                ],
            )
            .await
            .map_err(|e| page_error(e, params.page))?;

        parse_page(data)
    }

    async fn discover(
        &self,
        category: MediaCategory,
        params: &DiscoverParams,
    ) -> Result<RawPage<RawgGame>, MetadataError> {
        ensure_games(category)?;
        let mut query = vec![
            ("page", params.page.to_string()),
            ("page_size", params.page_size.to_string()),
        ];
        if let Some(ref genre) = params.genre {
            query.push(("genres", genre.clone()));
        }
        query.extend(params.ordering.iter().cloned());

        let data = self
            .get_json("/games", &query)
            .await
            .map_err(|e| page_error(e, params.page))?;
        parse_page(data)
    }

    async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError> {
        ensure_games(category)?;
        let data = self
            .get_json("/genres", &[("page_size", "40".to_string())])
            .await?;
        let page: RawgPage<RawgNamed> = serde_json::from_value(data)?;
        Ok(page
            .results
            .into_iter()
            .map(|g| Genre::new(g.id.to_string(), g.name))
            .collect())
    }
}

/// RAWG answers a page past the end with 404 `{"detail": "Invalid page."}`.
fn page_error(err: MetadataError, page: u32) -> MetadataError {
    match err {
        MetadataError::NotFound if page > 1 => MetadataError::PageOutOfRange(page),
        other => other,
    }
}

fn parse_page(data: serde_json::Value) -> Result<RawPage<RawgGame>, MetadataError> {
    let page: RawgPage<RawgGame> = serde_json::from_value(data)?;
    Ok(RawPage {
        items: page.results,
        total_results: page.count,
        last_page: None,
    })
}
