//! Random poster pick over the highly rated part of the catalog.

use poster_finder_core::error::PosterError;
use poster_finder_core::messages::{NETWORK_ERROR, NO_SUITABLE_POSTER, OutboundMessage};
use poster_finder_core::types::{MediaType, RandomPickCandidate};
use poster_finder_metadata::CatalogPage;
use tracing::{debug, error, info};

use crate::config::RandomDelivery;
use crate::handler::CommandHandler;
use crate::host::NodeId;
use crate::insert::ImageSource;

impl CommandHandler {
    pub async fn random_pick(&self, media_type: MediaType) -> Result<(), PosterError> {
        let Some(target) = self.resolve_target_node()? else {
            return Ok(());
        };

        match self.find_random_candidate(media_type).await {
            Ok(candidate) => self.deliver_random(target, candidate).await,
            Err(PosterError::NoCandidate) => {
                info!(media_type = %media_type, "random pick found nothing");
                self.snack(NO_SUITABLE_POSTER);
            }
            Err(e) => {
                error!(media_type = %media_type, error = %e, "random pick error");
                self.snack(NETWORK_ERROR);
            }
        }
        Ok(())
    }

    /// Sample discover pages until one yields a qualifying poster.
    ///
    /// A failed page fetch only burns an attempt; a failure of the first
    /// (page count) request aborts the pick.
    pub async fn find_random_candidate(
        &self,
        media_type: MediaType,
    ) -> Result<RandomPickCandidate, PosterError> {
        let settings = &self.config.random;
        let first = self
            .catalog
            .discover(media_type, &settings.filter, 1)
            .await?;
        let total_pages = first
            .total_pages
            .unwrap_or(1)
            .clamp(1, settings.max_pages.max(1));

        for attempt in 1..=settings.max_attempts {
            let page = self.random_in(1..=total_pages);
            let listing = match self.catalog.discover(media_type, &settings.filter, page).await {
                Ok(listing) => listing,
                Err(e) => {
                    debug!(attempt, page, error = %e, "discover page failed");
                    continue;
                }
            };

            let mut candidates = qualifying_candidates(listing, settings.filter.min_vote_average);
            if candidates.is_empty() {
                debug!(attempt, page, "no qualifying posters on page");
                continue;
            }

            let index = self.random_index(candidates.len());
            return Ok(candidates.swap_remove(index));
        }

        Err(PosterError::NoCandidate)
    }

    async fn deliver_random(&self, target: NodeId, candidate: RandomPickCandidate) {
        match self.config.random.delivery {
            RandomDelivery::HandOff => self.post(OutboundMessage::FetchForRandom {
                poster_path: candidate.poster_path,
                title: candidate.title,
            }),
            RandomDelivery::Direct => {
                let url = self.catalog.image_url(&candidate.poster_path);
                if self.insert_poster(target, ImageSource::Url(url)).await {
                    self.post(OutboundMessage::inserted(&candidate.title));
                }
            }
        }
    }
}

/// Records with a poster whose rating still meets the threshold.
fn qualifying_candidates(page: CatalogPage, min_vote_average: f64) -> Vec<RandomPickCandidate> {
    page.results
        .into_iter()
        .flatten()
        .filter(|r| r.vote_average.is_some_and(|v| v >= min_vote_average))
        .filter_map(|r| {
            r.poster().map(|p| RandomPickCandidate {
                poster_path: p.to_string(),
                title: r.display_title().to_string(),
            })
        })
        .collect()
}
