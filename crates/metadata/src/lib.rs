pub mod provider;
pub mod tmdb;

use poster_finder_core::error::PosterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("network error: {0}")]
    Network(String),
    #[error("TMDB returned HTTP {0}")]
    Status(u16),
    #[error("parse JSON: {0}")]
    Parse(String),
}

impl From<MetadataError> for PosterError {
    fn from(e: MetadataError) -> Self {
        PosterError::Network(e.to_string())
    }
}

/// One raw title record from a list endpoint (search, trending, discover).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRecord {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

impl CatalogRecord {
    /// Movies carry `title`, series carry `name`.
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or("")
    }

    /// First four characters of the release (or first air) date.
    pub fn year(&self) -> String {
        non_empty(self.release_date.as_deref())
            .or_else(|| non_empty(self.first_air_date.as_deref()))
            .map(|d| d.chars().take(4).collect())
            .unwrap_or_default()
    }

    /// Poster path, treating an empty string as absent.
    pub fn poster(&self) -> Option<&str> {
        non_empty(self.poster_path.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// One page of a list endpoint. `null` entries in `results` stay as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub results: Vec<Option<CatalogRecord>>,
    pub total_pages: Option<u32>,
}

/// Filters applied to the discover endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverFilter {
    pub sort_by: String,
    pub min_vote_average: f64,
    pub min_vote_count: u32,
}

impl Default for DiscoverFilter {
    fn default() -> Self {
        Self {
            sort_by: "popularity.desc".to_string(),
            min_vote_average: 7.0,
            min_vote_count: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prefers_title_then_name() {
        let movie = CatalogRecord {
            title: Some("Heat".into()),
            name: Some("ignored".into()),
            ..Default::default()
        };
        let series = CatalogRecord {
            title: Some(String::new()),
            name: Some("Lost".into()),
            ..Default::default()
        };
        assert_eq!(movie.display_title(), "Heat");
        assert_eq!(series.display_title(), "Lost");
        assert_eq!(CatalogRecord::default().display_title(), "");
    }

    #[test]
    fn year_is_first_four_characters_of_date() {
        let rec = CatalogRecord {
            release_date: Some("1999-03-31".into()),
            ..Default::default()
        };
        assert_eq!(rec.year(), "1999");

        let series = CatalogRecord {
            first_air_date: Some("2004-09-22".into()),
            ..Default::default()
        };
        assert_eq!(series.year(), "2004");

        assert_eq!(CatalogRecord::default().year(), "");

        let short = CatalogRecord {
            release_date: Some("20".into()),
            ..Default::default()
        };
        assert_eq!(short.year(), "20");
    }

    #[test]
    fn empty_poster_path_is_absent() {
        let rec = CatalogRecord {
            poster_path: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(rec.poster(), None);
    }

    #[test]
    fn metadata_errors_become_network_errors() {
        let err: PosterError = MetadataError::Status(503).into();
        assert_eq!(err.code(), "network_error");
        assert!(err.to_string().contains("503"));
    }
}
