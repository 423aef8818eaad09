use poster_finder_core::messages::OutboundMessage;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound half of the UI message channel.
pub trait UiChannel: Send + Sync {
    fn post(&self, message: OutboundMessage);
}

/// Forwards outbound messages to a tokio channel drained by a writer task.
#[derive(Clone)]
pub struct ChannelUi {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelUi {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UiChannel for ChannelUi {
    fn post(&self, message: OutboundMessage) {
        // The receiver only goes away once the session is closing.
        if self.tx.send(message).is_err() {
            debug!("UI channel closed; dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn posts_reach_the_receiver_in_order() {
        let (ui, mut rx) = ChannelUi::new();
        ui.post(OutboundMessage::snackbar("one"));
        ui.post(OutboundMessage::snackbar("two"));
        assert_eq!(rx.recv().await, Some(OutboundMessage::snackbar("one")));
        assert_eq!(rx.recv().await, Some(OutboundMessage::snackbar("two")));
    }

    #[test]
    fn post_after_receiver_dropped_is_silent() {
        let (ui, rx) = ChannelUi::new();
        drop(rx);
        ui.post(OutboundMessage::snackbar("late"));
    }
}
