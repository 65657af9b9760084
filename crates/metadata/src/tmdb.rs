//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use medialog_core::types::{Genre, MediaCategory, Provider};
use serde::Deserialize;

use crate::provider::{CatalogProvider, unsupported};
use crate::rate_gate::RateGate;
use crate::{DiscoverParams, MetadataError, RawPage, SearchParams};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// TMDB refuses pages past 500.
pub const MAX_PAGE: u32 = 500;

/// TMDB allows roughly 50 requests per second; stay under it.
const REQUESTS_PER_SECOND: u32 = 40;

pub fn poster_url(path: &str) -> String {
    format!("{IMAGE_BASE}/w500{path}")
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TmdbShow {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub genre_ids: Vec<u64>,
}

/// Raw TMDB list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TmdbItem {
    Movie(TmdbMovie),
    Show(TmdbShow),
}

impl TmdbItem {
    pub fn genre_ids(&self) -> &[u64] {
        match self {
            Self::Movie(m) => &m.genre_ids,
            Self::Show(s) => &s.genre_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: u64,
    name: String,
}

pub struct TmdbClient {
    api_key: Option<String>,
    language: String,
    client: reqwest::Client,
    gate: RateGate,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>, language: String) -> Self {
        Self {
            api_key,
            language,
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
            .ok_or(MetadataError::NotConfigured("TMDB API key"))?;

        let mut all_params = vec![
            ("api_key", api_key.to_string()),
            ("language", self.language.clone()),
        ];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        crate::http::get_json(&self.client, Provider::Tmdb, &url, &all_params).await
    }
}

fn media_path(category: MediaCategory) -> Result<&'static str, MetadataError> {
    match category {
        MediaCategory::Movie => Ok("movie"),
        MediaCategory::Series => Ok("tv"),
        other => Err(unsupported(Provider::Tmdb, other)),
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    type Item = TmdbItem;

    fn provider(&self) -> Provider {
        Provider::Tmdb
    }

    fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn search(
        &self,
        category: MediaCategory,
        params: &SearchParams,
    ) -> Result<RawPage<TmdbItem>, MetadataError> {
        let path = media_path(category)?;
        let data = self
            .get_json(
                &format!("/search/{path}"),
                &[
                    ("query", params.query.clone()),
                    ("page", params.page.min(MAX_PAGE).to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        parse_page(category, data)
    }

    async fn discover(
        &self,
        category: MediaCategory,
        params: &DiscoverParams,
    ) -> Result<RawPage<TmdbItem>, MetadataError> {
        let path = media_path(category)?;
        let mut query = vec![
            ("page", params.page.min(MAX_PAGE).to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(ref genre) = params.genre {
            query.push(("with_genres", genre.clone()));
        }
        query.extend(params.ordering.iter().cloned());

        let data = self.get_json(&format!("/discover/{path}"), &query).await?;
        parse_page(category, data)
    }

    async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError> {
        let path = media_path(category)?;
        let data = self.get_json(&format!("/genre/{path}/list"), &[]).await?;
        parse_genres(data)
    }
}

fn parse_page(
    category: MediaCategory,
    data: serde_json::Value,
) -> Result<RawPage<TmdbItem>, MetadataError> {
    match category {
        MediaCategory::Movie => {
            let page: TmdbPage<TmdbMovie> = serde_json::from_value(data)?;
            Ok(RawPage {
                items: page.results.into_iter().map(TmdbItem::Movie).collect(),
                total_results: page.total_results,
                last_page: Some(page.total_pages.min(MAX_PAGE)),
            })
        }
        MediaCategory::Series => {
            let page: TmdbPage<TmdbShow> = serde_json::from_value(data)?;
            Ok(RawPage {
                items: page.results.into_iter().map(TmdbItem::Show).collect(),
                total_results: page.total_results,
                last_page: Some(page.total_pages.min(MAX_PAGE)),
            })
        }
        other => Err(unsupported(Provider::Tmdb, other)),
    }
}

fn parse_genres(data: serde_json::Value) -> Result<Vec<Genre>, MetadataError> {
    let list: TmdbGenreList = serde_json::from_value(data)?;
    Ok(list
        .genres
        .into_iter()
        .map(|g| Genre::new(g.id.to_string(), g.name))
        .collect())
}
