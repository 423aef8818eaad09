//! Command handler: routes UI messages to plugin operations.

use std::ops::RangeInclusive;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

use poster_finder_core::error::PosterError;
use poster_finder_core::messages::{ACTION_FAILED, InboundMessage, OutboundMessage};
use poster_finder_metadata::provider::CatalogProvider;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error};

use crate::config::PluginConfig;
use crate::host::DocumentHost;
use crate::insert::InsertRequest;
use crate::ui::UiChannel;

/// What the message loop should do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Close,
}

/// Owns the collaborators and the search serial shared by all operations.
pub struct CommandHandler {
    pub(crate) config: PluginConfig,
    pub(crate) catalog: Arc<dyn CatalogProvider>,
    pub(crate) host: Arc<dyn DocumentHost>,
    ui: Arc<dyn UiChannel>,
    /// Serial of the most recently issued search.
    pub(crate) latest_search_serial: AtomicU64,
    rng: Mutex<StdRng>,
}

impl CommandHandler {
    pub fn new(
        config: PluginConfig,
        catalog: Arc<dyn CatalogProvider>,
        host: Arc<dyn DocumentHost>,
        ui: Arc<dyn UiChannel>,
    ) -> Self {
        Self {
            config,
            catalog,
            host,
            ui,
            latest_search_serial: AtomicU64::new(0),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the random source with a seeded one.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Handle one inbound message. Errors never escape; they become an
    /// "Action failed" notification.
    pub async fn dispatch(&self, message: InboundMessage) -> Control {
        let kind = message.kind();
        debug!(kind, "handling UI message");

        match self.route(message).await {
            Ok(control) => control,
            Err(e) => {
                error!(kind, code = e.code(), error = %e, "plugin message error");
                self.snack(ACTION_FAILED);
                Control::Continue
            }
        }
    }

    async fn route(&self, message: InboundMessage) -> Result<Control, PosterError> {
        match message {
            InboundMessage::LiveSearch { media_type, query } => {
                self.live_search(media_type, &query).await
            }
            InboundMessage::Search { media_type, query } => self.search(media_type, &query).await,
            InboundMessage::GetTrending { media_type } => self.fetch_trending(media_type).await,
            InboundMessage::RandomPick { media_type } => self.random_pick(media_type).await?,
            InboundMessage::InsertPoster {
                data,
                image_url,
                poster_path,
                title,
            } => {
                self.handle_insert_request(InsertRequest {
                    data,
                    image_url,
                    poster_path,
                    title,
                })
                .await?
            }
            InboundMessage::Close => {
                self.host.close();
                return Ok(Control::Close);
            }
        }
        Ok(Control::Continue)
    }

    pub(crate) fn post(&self, message: OutboundMessage) {
        self.ui.post(message);
    }

    pub(crate) fn snack(&self, message: &str) {
        self.ui.post(OutboundMessage::snackbar(message));
    }

    pub(crate) fn random_in(&self, range: RangeInclusive<u32>) -> u32 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(range)
    }

    pub(crate) fn random_index(&self, len: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(0..len)
    }
}
