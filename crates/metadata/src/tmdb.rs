//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::time::Duration;

use poster_finder_core::types::MediaType;
use tracing::debug;

use crate::provider::CatalogProvider;
use crate::{CatalogPage, CatalogRecord, DiscoverFilter, MetadataError};

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Connection settings for [`TmdbClient`].
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_base: String,
    pub image_base: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: BASE_URL.to_string(),
            image_base: IMAGE_BASE.to_string(),
            timeout: None,
        }
    }
}

pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            config: TmdbConfig {
                api_key,
                ..Default::default()
            },
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: TmdbConfig) -> Result<Self, MetadataError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MetadataError::Network(format!("build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, MetadataError> {
        let mut all_params = vec![("api_key", self.config.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.config.api_base);
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MetadataError::Status(resp.status().as_u16()));
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    fn image_url(&self, poster_path: &str) -> String {
        format!("{}{poster_path}", self.config.image_base)
    }

    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
    ) -> Result<CatalogPage, MetadataError> {
        let data = self
            .get_json(
                &format!("/search/{media_type}"),
                &[("query", query), ("page", "1")],
            )
            .await?;
        Ok(parse_page(&data))
    }

    async fn trending(&self, media_type: MediaType) -> Result<CatalogPage, MetadataError> {
        let data = self
            .get_json(&format!("/trending/{media_type}/day"), &[])
            .await?;
        Ok(parse_page(&data))
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> Result<CatalogPage, MetadataError> {
        let min_average = format!("{:.1}", filter.min_vote_average);
        let min_count = filter.min_vote_count.to_string();
        let page = page.to_string();

        let data = self
            .get_json(
                &format!("/discover/{media_type}"),
                &[
                    ("sort_by", filter.sort_by.as_str()),
                    ("vote_average.gte", min_average.as_str()),
                    ("vote_count.gte", min_count.as_str()),
                    ("page", page.as_str()),
                ],
            )
            .await?;
        Ok(parse_page(&data))
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MetadataError> {
        debug!(url = %url, "poster download");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MetadataError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Read one list page. Entries that are not objects become `None`.
pub(crate) fn parse_page(data: &serde_json::Value) -> CatalogPage {
    let results = data["results"]
        .as_array()
        .map(|rs| {
            rs.iter()
                .map(|r| r.is_object().then(|| parse_record(r)))
                .collect()
        })
        .unwrap_or_default();

    CatalogPage {
        results,
        total_pages: data["total_pages"]
            .as_u64()
            .map(|p| p.min(u32::MAX as u64) as u32),
    }
}

fn parse_record(r: &serde_json::Value) -> CatalogRecord {
    CatalogRecord {
        id: r["id"].as_i64().unwrap_or(0),
        title: r["title"].as_str().map(|s| s.to_string()),
        name: r["name"].as_str().map(|s| s.to_string()),
        release_date: r["release_date"].as_str().map(|s| s.to_string()),
        first_air_date: r["first_air_date"].as_str().map(|s| s.to_string()),
        poster_path: r["poster_path"].as_str().map(|s| s.to_string()),
        // Occasionally serialized as a string.
        vote_average: r["vote_average"]
            .as_f64()
            .or_else(|| r["vote_average"].as_str().and_then(|s| s.trim().parse().ok())),
    }
}
