use poster_finder_core::error::PosterError;
use poster_finder_core::messages::{CANNOT_HAVE_FILLS, OutboundMessage, SELECT_ONLY_ONE};
use tracing::{debug, info};

use crate::handler::CommandHandler;
use crate::host::{Bounds, NodeId, Parent};

pub const PLACEHOLDER_NAME: &str = "Movie Poster";

impl CommandHandler {
    /// Pick the node a poster should go into.
    ///
    /// With nothing selected a placeholder rectangle is created in the middle
    /// of the viewport and selected. `Ok(None)` means the selection cannot be
    /// used; the UI has already been told why.
    pub fn resolve_target_node(&self) -> Result<Option<NodeId>, PosterError> {
        match self.select_target() {
            Ok(node) => Ok(Some(node)),
            Err(PosterError::UnsupportedTarget(reason)) => {
                debug!(reason = %reason, "selection cannot take a poster");
                self.post(OutboundMessage::no_selection(reason));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn select_target(&self) -> Result<NodeId, PosterError> {
        match self.host.selection().as_slice() {
            [] => self.create_placeholder(),
            [id] => match self.host.node(*id) {
                Some(node) if node.accepts_fills() => Ok(*id),
                _ => Err(PosterError::UnsupportedTarget(CANNOT_HAVE_FILLS.to_string())),
            },
            _ => Err(PosterError::UnsupportedTarget(SELECT_ONLY_ONE.to_string())),
        }
    }

    fn create_placeholder(&self) -> Result<NodeId, PosterError> {
        let width = self.config.placeholder_width;
        let height = self.config.placeholder_height;
        let center = self.host.viewport_center();

        let node = self.host.create_rectangle(
            PLACEHOLDER_NAME,
            Bounds {
                x: center.x - width / 2.0,
                y: center.y - height / 2.0,
                width,
                height,
            },
        )?;
        self.host.append_child(Parent::Page, node)?;
        self.host.set_selection(&[node]);

        info!(node = %node, "created placeholder poster node");
        Ok(node)
    }
}
