//! Conversation view: the message collection plus the active leaf pointer.
//!
//! The collection is owned by the mutation layer and handed in wholesale on
//! every change; the only state this type writes is the active pointer.
//! Lookup maps and the displayed path are derived on demand.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::message::{Message, MessageId};
use crate::tree::{
    self, BranchPosition, DEFAULT_MAX_DEPTH, Direction, TreeIndex, resolve_leaf_with_limit,
};

/// Receives navigation intents produced by the view.
pub trait ConversationObserver: Send + Sync {
    /// The active leaf moved; the mutation layer should persist or act on it.
    fn on_active_leaf_change(&self, leaf_id: &str);

    /// The user reached the top of the rendered history.
    fn on_load_more_requested(&self);
}

#[derive(Clone)]
pub struct ConversationView {
    messages: Vec<Message>,
    active_leaf_id: Option<MessageId>,
    max_depth: usize,
    revision: u64,
    observer: Option<Arc<dyn ConversationObserver>>,
}

impl fmt::Debug for ConversationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationView")
            .field("messages", &self.messages.len())
            .field("active_leaf_id", &self.active_leaf_id)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Default for ConversationView {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ConversationView {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            active_leaf_id: None,
            max_depth: DEFAULT_MAX_DEPTH,
            revision: 0,
            observer: None,
        }
    }

    pub fn with_active_leaf(mut self, leaf_id: Option<MessageId>) -> Self {
        self.active_leaf_id = leaf_id;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ConversationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Bumped whenever the collection or the pointer changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The pointer as committed, before leaf resolution
    pub fn active_leaf_id(&self) -> Option<&str> {
        self.active_leaf_id.as_deref()
    }

    pub fn index(&self) -> TreeIndex<'_> {
        TreeIndex::build(&self.messages)
    }

    /// Leaf actually displayed: the pointer resolved downward, or the last
    /// root's leaf when the pointer is missing or stale.
    pub fn resolved_leaf(&self) -> Option<&str> {
        let index = self.index();
        self.resolve_in(&index)
    }

    fn resolve_in<'a>(&self, index: &TreeIndex<'a>) -> Option<&'a str> {
        if let Some(requested) = self.active_leaf_id.as_deref() {
            if let Ok(leaf) = resolve_leaf_with_limit(index, requested, self.max_depth) {
                return Some(leaf);
            }
            debug!(target: "forkline::conversation", %requested, "Active leaf not in collection; using fallback");
        }
        let last_root = index.root_ids().last()?;
        resolve_leaf_with_limit(index, last_root, self.max_depth).ok()
    }

    /// The root-to-leaf sequence that gets rendered
    pub fn displayed_path(&self) -> Vec<&Message> {
        let index = self.index();
        let leaf = self.resolve_in(&index);
        tree::resolve_path(&index, leaf)
    }

    pub fn branch_position(&self, node_id: &str) -> Option<BranchPosition> {
        tree::branch_position(&self.index(), node_id)
    }

    /// Replace the collection after an external mutation. The pointer is
    /// kept; if it no longer resolves the fallback applies on next read.
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.revision += 1;
    }

    /// Mutate the collection in place (replays and tests stand in for the
    /// mutation layer this way).
    pub fn update_messages<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Vec<Message>),
    {
        update(&mut self.messages);
        self.revision += 1;
    }

    /// Point the view at `id`. Unknown ids are rejected and leave the
    /// pointer unchanged.
    pub fn set_active_leaf(&mut self, id: &str) -> bool {
        let resolved = {
            let index = self.index();
            match tree::resolve_leaf_with_limit(&index, id, self.max_depth) {
                Ok(leaf) => leaf.to_string(),
                Err(_) => return false,
            }
        };
        self.commit(id.to_string(), &resolved);
        true
    }

    /// Move to the previous/next sibling of `node_id`. Returns the new leaf,
    /// or `None` at the sibling boundary (the pointer is left alone).
    pub fn switch_branch(&mut self, node_id: &str, direction: Direction) -> Option<MessageId> {
        let leaf = {
            let index = self.index();
            tree::switch_branch(&index, node_id, direction)?.to_string()
        };
        self.commit(leaf.clone(), &leaf);
        Some(leaf)
    }

    /// Forward a load-more request to the observer
    pub fn request_load_more(&self) {
        debug!(target: "forkline::conversation", "Load more requested");
        if let Some(observer) = &self.observer {
            observer.on_load_more_requested();
        }
    }

    fn commit(&mut self, pointer: MessageId, resolved: &str) {
        let previous = self.resolved_leaf().map(str::to_string);
        self.active_leaf_id = Some(pointer);
        self.revision += 1;

        if previous.as_deref() != Some(resolved) {
            info!(target: "forkline::conversation", leaf = %resolved, "Active leaf changed");
            if let Some(observer) = &self.observer {
                observer.on_active_leaf_change(resolved);
            }
        }
    }
}
