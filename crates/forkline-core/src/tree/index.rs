use std::collections::HashMap;

use tracing::warn;

use crate::message::{Message, MessageId};

/// Id lookup and root list derived from a flat message collection.
///
/// The index borrows the collection, so rebuilding it after every change
/// costs a single linear pass and no clones of message content.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex<'a> {
    by_id: HashMap<&'a str, &'a Message>,
    root_ids: Vec<MessageId>,
}

impl<'a> TreeIndex<'a> {
    /// Build the index. Input order is irrelevant except for the root list,
    /// which keeps collection order. Duplicate ids keep the last occurrence.
    pub fn build(messages: &'a [Message]) -> Self {
        let mut by_id = HashMap::with_capacity(messages.len());
        let mut root_ids = Vec::new();

        for message in messages {
            if by_id.insert(message.id(), message).is_some() {
                warn!(target: "forkline::tree", id = %message.id(), "Duplicate message id in collection");
            }
            if message.is_root() {
                root_ids.push(message.id.clone());
            }
        }

        Self { by_id, root_ids }
    }

    pub fn get(&self, id: &str) -> Option<&'a Message> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn root_ids(&self) -> &[MessageId] {
        &self.root_ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &'a Message> + '_ {
        self.by_id.values().copied()
    }
}
