//! Message node types for the conversation tree.
//!
//! A `Message` is one turn of a conversation. Nodes reference each other by id
//! (`parent_id` upward, `children_ids` downward) so the collection can stay a
//! flat list while still describing any number of forks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub type MessageId = String;

/// Author class of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Data,
}

/// Lifecycle of a message as reported by the mutation layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Streaming,
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MessageId>,
    #[serde(default)]
    pub children_ids: Vec<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            parent_id: None,
            children_ids: Vec::new(),
            created_at: None,
            status: None,
            model: None,
            error: None,
        }
    }

    pub fn user(id: impl Into<MessageId>, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    pub fn assistant(id: impl Into<MessageId>, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content)
    }

    pub fn with_parent(mut self, parent_id: impl Into<MessageId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MessageId>,
    {
        self.children_ids = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// True while the mutation layer is still producing content for this node
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self.status,
            Some(MessageStatus::Pending | MessageStatus::Streaming)
        )
    }

    /// Content length in characters, used for proportional summaries
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Single-line preview of the first `max_chars` characters
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview = String::new();
        let mut last_was_space = false;
        for ch in self.content.trim().chars().take(max_chars) {
            if ch.is_whitespace() {
                if !last_was_space {
                    preview.push(' ');
                }
                last_was_space = true;
            } else {
                preview.push(ch);
                last_was_space = false;
            }
        }
        preview
    }
}
