//! Keyword search and trending lists.

use std::sync::atomic::Ordering;

use poster_finder_core::messages::{NETWORK_ERROR, OutboundMessage};
use poster_finder_core::types::{MediaType, SearchResultItem, TrendingResultItem};
use poster_finder_metadata::{CatalogPage, CatalogRecord};
use tracing::{debug, warn};

use crate::handler::CommandHandler;

impl CommandHandler {
    /// Search triggered while typing. Only the newest live search may reach the UI.
    pub async fn live_search(&self, media_type: MediaType, query: &str) {
        self.perform_search(media_type, query, true).await;
    }

    /// Explicit search; always answers.
    pub async fn search(&self, media_type: MediaType, query: &str) {
        self.perform_search(media_type, query, false).await;
    }

    pub fn latest_search_serial(&self) -> u64 {
        self.latest_search_serial.load(Ordering::SeqCst)
    }

    async fn perform_search(&self, media_type: MediaType, query: &str, live: bool) {
        if query.trim().is_empty() {
            self.post(OutboundMessage::SearchResults {
                results: Vec::new(),
                query: query.to_string(),
            });
            return;
        }

        let serial = self.latest_search_serial.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.catalog.search(media_type, query).await;
        let superseded = live && serial != self.latest_search_serial();

        match outcome {
            Ok(page) => {
                if superseded {
                    debug!(serial, query = %query, "dropping stale live search");
                    return;
                }
                let results = shape_search_results(&page, self.config.search_limit, |p| {
                    self.catalog.image_url(p)
                });
                self.post(OutboundMessage::SearchResults {
                    results,
                    query: query.to_string(),
                });
            }
            Err(e) => {
                if superseded {
                    debug!(serial, query = %query, error = %e, "dropping stale live search error");
                    return;
                }
                warn!(query = %query, media_type = %media_type, error = %e, "search error");
                self.post(OutboundMessage::SearchResults {
                    results: Vec::new(),
                    query: query.to_string(),
                });
                self.snack(NETWORK_ERROR);
            }
        }
    }

    pub async fn fetch_trending(&self, media_type: MediaType) {
        match self.catalog.trending(media_type).await {
            Ok(page) => {
                let results = shape_trending_results(&page, self.config.trending_limit, |p| {
                    self.catalog.image_url(p)
                });
                self.post(OutboundMessage::TrendingResults { results });
            }
            Err(e) => {
                warn!(media_type = %media_type, error = %e, "trending fetch error");
                self.snack(NETWORK_ERROR);
                self.post(OutboundMessage::TrendingResults {
                    results: Vec::new(),
                });
            }
        }
    }
}

pub(crate) fn to_result_item(
    record: &CatalogRecord,
    image_url: impl Fn(&str) -> String,
) -> SearchResultItem {
    let poster = record.poster();
    SearchResultItem {
        id: record.id,
        title: record.display_title().to_string(),
        year: record.year(),
        poster_path: poster.map(|p| p.to_string()),
        poster_full_url: poster.map(image_url),
    }
}

/// The first `limit` raw entries, minus nulls.
pub(crate) fn shape_search_results(
    page: &CatalogPage,
    limit: usize,
    image_url: impl Fn(&str) -> String,
) -> Vec<SearchResultItem> {
    page.results
        .iter()
        .take(limit)
        .flatten()
        .map(|r| to_result_item(r, &image_url))
        .collect()
}

/// The first `limit` entries that have a poster.
pub(crate) fn shape_trending_results(
    page: &CatalogPage,
    limit: usize,
    image_url: impl Fn(&str) -> String,
) -> Vec<TrendingResultItem> {
    page.results
        .iter()
        .flatten()
        .filter(|r| r.poster().is_some())
        .take(limit)
        .map(|r| to_result_item(r, &image_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(path: &str) -> String {
        format!("https://img.example/w500{path}")
    }

    fn record(id: i64, poster: Option<&str>) -> Option<CatalogRecord> {
        Some(CatalogRecord {
            id,
            title: Some(format!("Title {id}")),
            release_date: Some("2001-05-04".into()),
            poster_path: poster.map(|p| p.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn search_takes_nine_raw_entries_then_drops_nulls() {
        let mut results: Vec<Option<CatalogRecord>> = (1..=12).map(|i| record(i, None)).collect();
        results[2] = None;
        let page = CatalogPage {
            results,
            total_pages: Some(1),
        };

        let items = shape_search_results(&page, 9, img);
        assert_eq!(items.len(), 8);
        assert_eq!(items.last().map(|i| i.id), Some(9));
    }

    #[test]
    fn search_item_without_poster_has_no_urls() {
        let page = CatalogPage {
            results: vec![record(1, None), record(2, Some("/two.jpg"))],
            total_pages: None,
        };
        let items = shape_search_results(&page, 9, img);
        assert_eq!(items[0].poster_path, None);
        assert_eq!(items[0].poster_full_url, None);
        assert_eq!(items[1].poster_path.as_deref(), Some("/two.jpg"));
        assert_eq!(
            items[1].poster_full_url.as_deref(),
            Some("https://img.example/w500/two.jpg")
        );
        assert_eq!(items[1].year, "2001");
    }

    #[test]
    fn trending_filters_before_capping() {
        let mut results = vec![record(0, None), None, record(100, Some(""))];
        results.extend((1..=20).map(|i| record(i, Some("/p.jpg"))));
        let page = CatalogPage {
            results,
            total_pages: None,
        };

        let items = shape_trending_results(&page, 12, img);
        assert_eq!(items.len(), 12);
        assert!(items.iter().all(|i| i.poster_path.is_some()));
        assert_eq!(items[0].id, 1);
        assert_eq!(items[11].id, 12);
    }
}
