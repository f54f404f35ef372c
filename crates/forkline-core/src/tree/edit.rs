//! Maintenance helpers for the flat message collection.
//!
//! These keep parent/child links consistent when the mutation layer (or a
//! replay) appends and updates nodes. The presentation core itself never
//! calls them on the collaborator's data.

use tracing::{debug, warn};

use crate::message::Message;

/// Append `message`, registering it in its parent's `children_ids`.
///
/// Returns `false` and leaves the collection untouched when the id already
/// exists. A parent that is not present is tolerated: the node is appended as
/// is and will surface as a truncated path.
pub fn add_message(messages: &mut Vec<Message>, message: Message) -> bool {
    if messages.iter().any(|m| m.id == message.id) {
        warn!(target: "forkline::tree", id = %message.id, "Message already exists, skipping add");
        return false;
    }

    if let Some(parent_id) = message.parent_id() {
        match messages.iter_mut().find(|m| m.id == parent_id) {
            Some(parent) => {
                if !parent.children_ids.iter().any(|id| *id == message.id) {
                    parent.children_ids.push(message.id.clone());
                }
            }
            None => {
                debug!(target: "forkline::tree", id = %message.id, parent = %parent_id, "Parent not in collection");
            }
        }
    }

    messages.push(message);
    true
}

/// Apply `update` to the message with `id`. Returns whether it was found.
pub fn update_message<F>(messages: &mut [Message], id: &str, update: F) -> bool
where
    F: FnOnce(&mut Message),
{
    match messages.iter_mut().find(|m| m.id == id) {
        Some(message) => {
            update(message);
            true
        }
        None => false,
    }
}

/// Most recently created leaf in the collection.
///
/// Equal timestamps keep the earlier leaf; an undated candidate is replaced
/// by the next leaf seen. Falls back to the last message when no leaf exists (only possible with
/// cyclic input) and to `None` for an empty collection.
pub fn latest_leaf(messages: &[Message]) -> Option<&str> {
    let mut latest: Option<&Message> = None;

    for message in messages.iter().filter(|m| m.is_leaf()) {
        let replace = match latest {
            None => true,
            Some(current) => match (current.created_at, message.created_at) {
                (None, _) => true,
                (Some(current_ts), Some(ts)) => ts > current_ts,
                (Some(_), None) => false,
            },
        };
        if replace {
            latest = Some(message);
        }
    }

    latest
        .or_else(|| messages.last())
        .map(Message::id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn add_registers_child_once() {
        let mut messages = vec![Message::user("root", "hi")];

        assert!(add_message(
            &mut messages,
            Message::assistant("a", "hello").with_parent("root")
        ));
        assert!(add_message(
            &mut messages,
            Message::assistant("b", "hey").with_parent("root")
        ));
        assert!(!add_message(
            &mut messages,
            Message::assistant("a", "again").with_parent("root")
        ));

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].children_ids, vec!["a", "b"]);
    }

    #[test]
    fn add_with_missing_parent_still_appends() {
        let mut messages = Vec::new();
        assert!(add_message(
            &mut messages,
            Message::assistant("late", "x").with_parent("unknown")
        ));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn update_replaces_fields_in_place() {
        let mut messages = vec![Message::assistant("a", "partial")];

        assert!(update_message(&mut messages, "a", |m| {
            m.content.push_str(" and complete");
        }));
        assert!(!update_message(&mut messages, "zz", |_| {}));
        assert_eq!(messages[0].content, "partial and complete");
    }

    #[test]
    fn latest_leaf_prefers_newest_timestamp() {
        let t = |secs| Utc.timestamp_opt(secs, 0).single().expect("valid timestamp");
        let messages = vec![
            Message::user("q", "q")
                .with_children(["old", "new"])
                .with_created_at(t(1)),
            Message::assistant("old", "old")
                .with_parent("q")
                .with_created_at(t(5)),
            Message::assistant("new", "new")
                .with_parent("q")
                .with_created_at(t(9)),
            Message::user("undated", "no timestamp"),
        ];

        assert_eq!(latest_leaf(&messages), Some("new"));
    }

    #[test]
    fn latest_leaf_without_timestamps_takes_last_leaf() {
        let messages = vec![Message::user("a", "a"), Message::user("b", "b")];
        assert_eq!(latest_leaf(&messages), Some("b"));
        assert_eq!(latest_leaf(&[]), None);
    }
}
