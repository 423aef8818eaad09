use poster_finder_core::types::MediaType;

use crate::{CatalogPage, DiscoverFilter, MetadataError};

/// A catalog backend that can list titles and serve poster images.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Full URL for a relative poster path.
    fn image_url(&self, poster_path: &str) -> String;

    /// First page of a keyword search.
    async fn search(&self, media_type: MediaType, query: &str)
    -> Result<CatalogPage, MetadataError>;

    /// Titles trending over the daily window.
    async fn trending(&self, media_type: MediaType) -> Result<CatalogPage, MetadataError>;

    /// One page of a filtered, sorted catalog listing.
    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> Result<CatalogPage, MetadataError>;

    /// Download raw image bytes.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MetadataError>;
}
