//! Re-stream the last assistant reply of the displayed path.
//!
//! The reply is taken out of the collection, then fed back in small chunks
//! as a streaming message so the viewer's growth handling can be watched on
//! a static export.

use std::time::Duration;

use forkline_core::tree::{add_message, update_message};
use forkline_core::{ConversationView, Message, MessageStatus, Role};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Words per streamed chunk
const WORDS_PER_CHUNK: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    Started,
    Chunk(String),
    Finished,
}

/// The withheld reply and where it streams back in
#[derive(Debug, Clone)]
pub struct Replay {
    message: Message,
}

impl Replay {
    /// Remove the displayed path's final assistant reply and point the view
    /// at its parent. Only a reply that is its parent's last child qualifies,
    /// so re-adding it restores the original sibling order.
    pub fn withhold(view: &mut ConversationView) -> Option<Self> {
        let message = {
            let path = view.displayed_path();
            let last = path.last()?;
            let parent_id = last.parent_id()?;
            let parent = view.index().get(parent_id)?;
            if last.role != Role::Assistant
                || parent.children_ids.last().map(String::as_str) != Some(last.id())
            {
                debug!(target: "tui.replay", id = %last.id, "Last message is not replayable");
                return None;
            }
            (*last).clone()
        };
        let parent_id = message.parent_id.clone()?;

        view.update_messages(|messages| {
            messages.retain(|m| m.id != message.id);
            update_message(messages, &parent_id, |parent| {
                parent.children_ids.retain(|id| *id != message.id);
            });
        });
        view.set_active_leaf(&parent_id);
        info!(target: "tui.replay", id = %message.id, "Withheld reply for replay");

        Some(Self { message })
    }

    pub fn message_id(&self) -> &str {
        &self.message.id
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }

    /// Put the reply back as an empty streaming message and select it
    pub fn start(&self, view: &mut ConversationView) -> bool {
        let placeholder = Message {
            content: String::new(),
            error: None,
            ..self.message.clone()
        }
        .with_status(MessageStatus::Streaming);

        let mut added = false;
        view.update_messages(|messages| added = add_message(messages, placeholder));
        added && view.set_active_leaf(&self.message.id)
    }

    pub fn append(&self, view: &mut ConversationView, chunk: &str) -> bool {
        let mut found = false;
        view.update_messages(|messages| {
            found = update_message(messages, &self.message.id, |m| m.content.push_str(chunk));
        });
        found
    }

    /// Restore the reply exactly as it was recorded
    pub fn finish(&self, view: &mut ConversationView) -> bool {
        let mut found = false;
        view.update_messages(|messages| {
            found = update_message(messages, &self.message.id, |m| {
                m.content.clone_from(&self.message.content);
                m.status = self.message.status.or(Some(MessageStatus::Completed));
                m.error.clone_from(&self.message.error);
            });
        });
        found
    }
}

/// Split `content` into word-sized chunks that concatenate back to it
pub fn chunks(content: &str) -> Vec<String> {
    let words: Vec<&str> = content.split_inclusive(char::is_whitespace).collect();
    words
        .chunks(WORDS_PER_CHUNK)
        .map(|group| group.concat())
        .collect()
}

/// Feed `content` to the loop: `Started`, the chunks at `interval`, then
/// `Finished`. Stops early when the receiver goes away.
pub fn spawn_feed(
    content: String,
    delay: Duration,
    interval: Duration,
    tx: mpsc::UnboundedSender<ReplayEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(ReplayEvent::Started).is_err() {
            return;
        }
        for chunk in chunks(&content) {
            tokio::time::sleep(interval).await;
            if tx.send(ReplayEvent::Chunk(chunk)).is_err() {
                return;
            }
        }
        let _ = tx.send(ReplayEvent::Finished);
    })
}
