//! Poster insertion into a host node.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use poster_finder_core::error::PosterError;
use poster_finder_core::messages::{INSERT_ERROR, OutboundMessage, POSTER_NOT_AVAILABLE};
use tracing::{debug, error, info, warn};

use crate::handler::CommandHandler;
use crate::host::{Bounds, HostError, NodeId, Paint, Parent};
use crate::target::PLACEHOLDER_NAME;

/// Where poster bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    /// Absolute URL or `data:` URI.
    Url(String),
}

/// Payload of an `insert-poster` message.
#[derive(Debug, Clone, Default)]
pub struct InsertRequest {
    pub data: Option<Vec<u8>>,
    pub image_url: Option<String>,
    pub poster_path: Option<String>,
    pub title: Option<String>,
}

impl CommandHandler {
    pub(crate) async fn handle_insert_request(
        &self,
        request: InsertRequest,
    ) -> Result<(), PosterError> {
        let Some(target) = self.resolve_target_node()? else {
            return Ok(());
        };

        let source = if let Some(data) = request.data {
            ImageSource::Bytes(data)
        } else if let Some(url) = request.image_url.filter(|u| !u.is_empty()) {
            ImageSource::Url(url)
        } else if let Some(path) = request.poster_path.filter(|p| !p.is_empty()) {
            ImageSource::Url(self.catalog.image_url(&path))
        } else {
            self.snack(POSTER_NOT_AVAILABLE);
            return Ok(());
        };

        if self.insert_poster(target, source).await {
            self.post(OutboundMessage::inserted(
                request.title.as_deref().unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Replace `target`'s fills with the poster image.
    ///
    /// Failures are reported to the UI and logged; the return value tells
    /// whether the poster landed.
    pub async fn insert_poster(&self, target: NodeId, source: ImageSource) -> bool {
        match self.try_insert_poster(target, source).await {
            Ok(()) => true,
            Err(e) => {
                error!(node = %target, code = e.code(), error = %e, "insert poster error");
                self.snack(INSERT_ERROR);
                false
            }
        }
    }

    async fn try_insert_poster(
        &self,
        target: NodeId,
        source: ImageSource,
    ) -> Result<(), PosterError> {
        let bytes = self.load_image(source).await?;
        if bytes.is_empty() {
            return Err(PosterError::EmptyPayload);
        }

        let image_hash = self.host.create_image(&bytes)?;
        let paint = Paint::image_fill(image_hash);

        match self.host.set_fills(target, vec![paint.clone()]) {
            Ok(()) => {
                info!(node = %target, bytes = bytes.len(), "poster inserted");
                Ok(())
            }
            Err(e) if self.config.fill_fallback => {
                warn!(node = %target, error = %e, "target rejected fills; using substitute");
                self.insert_substitute(target, paint)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load_image(&self, source: ImageSource) -> Result<Vec<u8>, PosterError> {
        match source {
            ImageSource::Bytes(bytes) => Ok(bytes),
            ImageSource::Url(url) if url.starts_with("data:") => decode_data_uri(&url),
            ImageSource::Url(url) => {
                debug!(url = %url, "fetching poster bytes");
                Ok(self.catalog.fetch_image(&url).await?)
            }
        }
    }

    /// Put the paint on a new rectangle matching the target's size, inside
    /// the target when it can hold children, otherwise next to it in the
    /// target's own parent. The rectangle is removed again if it cannot be
    /// filled and attached.
    fn insert_substitute(&self, target: NodeId, paint: Paint) -> Result<(), PosterError> {
        let info = self
            .host
            .node(target)
            .ok_or(HostError::NodeNotFound(target))?;

        let (parent, x, y) = if info.can_have_children {
            (Parent::Node(target), 0.0, 0.0)
        } else {
            let parent = info.parent.unwrap_or(Parent::Page);
            (parent, info.bounds.x, info.bounds.y)
        };

        let substitute = self.host.create_rectangle(
            PLACEHOLDER_NAME,
            Bounds {
                x,
                y,
                width: info.bounds.width,
                height: info.bounds.height,
            },
        )?;
        let placed = self
            .host
            .set_fills(substitute, vec![paint])
            .and_then(|()| self.host.append_child(parent, substitute));
        if let Err(e) = placed {
            if let Err(cleanup) = self.host.remove_node(substitute) {
                warn!(node = %substitute, error = %cleanup, "failed to remove substitute");
            }
            return Err(e.into());
        }

        info!(node = %target, substitute = %substitute, "poster inserted into substitute");
        Ok(())
    }
}

/// Decode a base64 `data:` URI into raw bytes.
pub(crate) fn decode_data_uri(uri: &str) -> Result<Vec<u8>, PosterError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PosterError::InvalidImageData("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PosterError::InvalidImageData("data URI has no payload".to_string()))?;

    if !header
        .rsplit(';')
        .next()
        .is_some_and(|p| p.eq_ignore_ascii_case("base64"))
    {
        return Err(PosterError::InvalidImageData(
            "data URI is not base64 encoded".to_string(),
        ));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| PosterError::InvalidImageData(e.to_string()))
}
