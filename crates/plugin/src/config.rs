use std::time::Duration;

use poster_finder_metadata::DiscoverFilter;
use poster_finder_metadata::tmdb::TmdbConfig;
use tracing::warn;

/// How a random pick hands its poster over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomDelivery {
    /// Ask the UI to download the image and send it back with `insert-poster`.
    #[default]
    HandOff,
    /// Download and insert the image without a UI round trip.
    Direct,
}

impl RandomDelivery {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hand-off" | "handoff" | "ui" => Some(Self::HandOff),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomPickConfig {
    pub max_attempts: u32,
    /// Upper bound on the sampled page number.
    pub max_pages: u32,
    pub filter: DiscoverFilter,
    pub delivery: RandomDelivery,
}

impl Default for RandomPickConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_pages: 500,
            filter: DiscoverFilter::default(),
            delivery: RandomDelivery::default(),
        }
    }
}

/// Global plugin configuration.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub tmdb: TmdbConfig,
    pub search_limit: usize,
    pub trending_limit: usize,
    pub random: RandomPickConfig,
    /// Size of the rectangle created when nothing is selected.
    pub placeholder_width: f64,
    pub placeholder_height: f64,
    /// Insert into a substitute rectangle when the target rejects fills.
    pub fill_fallback: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            tmdb: TmdbConfig::default(),
            search_limit: 9,
            trending_limit: 12,
            random: RandomPickConfig::default(),
            placeholder_width: 200.0,
            placeholder_height: 300.0,
            fill_fallback: true,
        }
    }
}

impl PluginConfig {
    /// Build from the process environment, after loading `.env` if present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        config.tmdb.api_key = get("TMDB_API_KEY")
            .or_else(|| option_env!("TMDB_API_KEY").map(|s| s.to_string()))
            .unwrap_or_default();
        if config.tmdb.api_key.is_empty() {
            warn!("TMDB_API_KEY is not set; catalog requests will be rejected");
        }

        if let Some(base) = get("POSTER_FINDER_API_BASE") {
            config.tmdb.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = get("POSTER_FINDER_IMAGE_BASE") {
            config.tmdb.image_base = base.trim_end_matches('/').to_string();
        }
        config.tmdb.timeout = get("POSTER_FINDER_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        if let Some(attempts) = get("POSTER_FINDER_RANDOM_ATTEMPTS").and_then(|v| v.parse().ok()) {
            config.random.max_attempts = attempts;
        }
        if let Some(pages) = get("POSTER_FINDER_RANDOM_MAX_PAGES")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|p| *p > 0)
        {
            config.random.max_pages = pages;
        }
        if let Some(raw) = get("POSTER_FINDER_RANDOM_DELIVERY") {
            match RandomDelivery::parse(&raw) {
                Some(delivery) => config.random.delivery = delivery,
                None => warn!(value = %raw, "unknown POSTER_FINDER_RANDOM_DELIVERY; using default"),
            }
        }
        if let Some(fallback) = get("POSTER_FINDER_FILL_FALLBACK").and_then(|v| v.parse().ok()) {
            config.fill_fallback = fallback;
        }

        config
    }
}
