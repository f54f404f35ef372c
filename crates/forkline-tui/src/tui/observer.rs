//! Bridges `ConversationObserver` callbacks onto the viewer's event loop.

use forkline_core::{ConversationObserver, MessageId};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    LeafChanged(MessageId),
    LoadMoreRequested,
}

/// Forwards navigation intents as `ViewEvent`s. Sends never block; events
/// sent after the loop stopped are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ViewEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<ViewEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ViewEvent) {
        if self.tx.send(event).is_err() {
            debug!(target: "tui.observer", "View event receiver dropped");
        }
    }
}

impl ConversationObserver for ChannelObserver {
    fn on_active_leaf_change(&self, leaf_id: &str) {
        self.send(ViewEvent::LeafChanged(leaf_id.to_string()));
    }

    fn on_load_more_requested(&self) {
        self.send(ViewEvent::LoadMoreRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_core::tree::Direction;
    use forkline_core::{ConversationView, Message};
    use std::sync::Arc;

    #[test]
    fn navigation_reaches_the_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut view = ConversationView::new(vec![
            Message::user("a", "root").with_children(["b", "c"]),
            Message::assistant("b", "one").with_parent("a"),
            Message::assistant("c", "two").with_parent("a"),
        ])
        .with_observer(Arc::new(ChannelObserver::new(tx)));

        assert_eq!(view.switch_branch("c", Direction::Prev).as_deref(), Some("b"));
        view.request_load_more();

        assert_eq!(rx.try_recv().unwrap(), ViewEvent::LeafChanged("b".into()));
        assert_eq!(rx.try_recv().unwrap(), ViewEvent::LoadMoreRequested);
        assert!(rx.try_recv().is_err());
    }
}
