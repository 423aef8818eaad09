//! Line-oriented message loop between the UI and the command handler.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use poster_finder_core::messages::{ACTION_FAILED, InboundMessage, OutboundMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::handler::{CommandHandler, Control};
use crate::ui::UiChannel;

/// Read one JSON message per line from `input` until it ends or the UI
/// closes the plugin.
///
/// Lines that are not UTF-8 or not a known message are logged and skipped.
/// Every operation runs on its own task; a panicking one is reported as
/// "Action failed". Only a read error on `input` is returned, after the
/// operations already in flight have answered.
pub async fn serve<R>(
    mut input: R,
    handler: Arc<CommandHandler>,
    ui: Arc<dyn UiChannel>,
) -> std::io::Result<Control>
where
    R: AsyncBufRead + Unpin,
{
    let mut tasks = JoinSet::new();
    let mut buf = Vec::new();
    let mut control = Control::Continue;
    let mut read_error = None;

    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "failed to read UI input");
                read_error = Some(e);
                break;
            }
        }
        while tasks.try_join_next().is_some() {}

        let Some(message) = decode_line(&buf) else {
            continue;
        };

        if message == InboundMessage::Close {
            if handler.dispatch(message).await == Control::Close {
                control = Control::Close;
                break;
            }
            continue;
        }

        let handler = handler.clone();
        let ui = ui.clone();
        tasks.spawn(async move {
            let kind = message.kind();
            if AssertUnwindSafe(handler.dispatch(message))
                .catch_unwind()
                .await
                .is_err()
            {
                error!(kind, "operation panicked");
                ui.post(OutboundMessage::snackbar(ACTION_FAILED));
            }
        });
    }

    if control == Control::Close {
        tasks.shutdown().await;
    } else {
        // input ended: let in-flight operations answer
        while tasks.join_next().await.is_some() {}
    }

    match read_error {
        Some(e) => Err(e),
        None => Ok(control),
    }
}

fn decode_line(raw: &[u8]) -> Option<InboundMessage> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => {
            warn!(error = %e, "ignoring UI message that is not UTF-8");
            return None;
        }
    };
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!(error = %e, "ignoring unrecognised UI message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::memory_host::InMemoryDocument;
    use crate::ui::ChannelUi;
    use poster_finder_core::types::MediaType;
    use poster_finder_metadata::provider::CatalogProvider;
    use poster_finder_metadata::{CatalogPage, DiscoverFilter, MetadataError};
    use tokio::sync::mpsc;

    /// Catalog for sessions that never reach the network.
    struct OfflineCatalog;

    #[async_trait::async_trait]
    impl CatalogProvider for OfflineCatalog {
        fn name(&self) -> &str {
            "offline"
        }

        fn image_url(&self, poster_path: &str) -> String {
            format!("http://img.test{poster_path}")
        }

        async fn search(&self, _: MediaType, _: &str) -> Result<CatalogPage, MetadataError> {
            Err(MetadataError::Network("offline".into()))
        }

        async fn trending(&self, _: MediaType) -> Result<CatalogPage, MetadataError> {
            Err(MetadataError::Network("offline".into()))
        }

        async fn discover(
            &self,
            _: MediaType,
            _: &DiscoverFilter,
            _: u32,
        ) -> Result<CatalogPage, MetadataError> {
            Err(MetadataError::Network("offline".into()))
        }

        async fn fetch_image(&self, _: &str) -> Result<Vec<u8>, MetadataError> {
            Err(MetadataError::Network("offline".into()))
        }
    }

    struct Session {
        handler: Arc<CommandHandler>,
        ui: Arc<dyn UiChannel>,
        doc: Arc<InMemoryDocument>,
        outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    }

    fn session() -> Session {
        let doc = Arc::new(InMemoryDocument::new());
        let (ui, outbound) = ChannelUi::new();
        let ui: Arc<dyn UiChannel> = Arc::new(ui);
        let handler = Arc::new(CommandHandler::new(
            PluginConfig::default(),
            Arc::new(OfflineCatalog),
            doc.clone(),
            ui.clone(),
        ));
        Session {
            handler,
            ui,
            doc,
            outbound,
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    fn answered_queries(messages: &[OutboundMessage]) -> Vec<String> {
        let mut queries: Vec<String> = messages
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::SearchResults { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect();
        queries.sort();
        queries
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let mut s = session();
        let input: &[u8] = b"{\"type\":\"search\",\"query\":\"  \"}\n\
            \xff\xfe garbage\n\
            {\"type\":\"search\",\"query\":\"\"}\n";

        let control = serve(input, s.handler.clone(), s.ui.clone()).await.unwrap();

        assert_eq!(control, Control::Continue);
        let messages = drain(&mut s.outbound);
        assert_eq!(answered_queries(&messages), vec!["".to_string(), "  ".to_string()]);
    }

    #[tokio::test]
    async fn unknown_and_blank_lines_are_skipped() {
        let mut s = session();
        let input: &[u8] = b"\n{\"type\":\"teleport\"}\nnot json\n\
            {\"type\":\"search\",\"query\":\"\"}";

        serve(input, s.handler.clone(), s.ui.clone()).await.unwrap();

        let messages = drain(&mut s.outbound);
        assert_eq!(answered_queries(&messages), vec!["".to_string()]);
    }

    #[tokio::test]
    async fn close_stops_reading() {
        let mut s = session();
        let input: &[u8] = b"{\"type\":\"close\"}\n{\"type\":\"search\",\"query\":\"\"}\n";

        let control = serve(input, s.handler.clone(), s.ui.clone()).await.unwrap();

        assert_eq!(control, Control::Close);
        assert!(s.doc.is_closed());
        assert!(drain(&mut s.outbound).is_empty());
    }

    #[tokio::test]
    async fn in_flight_operations_answer_before_input_ends() {
        let mut s = session();
        let input: &[u8] = b"{\"type\":\"get-trending\",\"mediaType\":\"tv\"}\n";

        serve(input, s.handler.clone(), s.ui.clone()).await.unwrap();

        let messages = drain(&mut s.outbound);
        assert!(messages.contains(&OutboundMessage::TrendingResults {
            results: Vec::new()
        }));
    }
}
