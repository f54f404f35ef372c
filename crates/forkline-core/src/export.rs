//! Conversation files on disk.
//!
//! Two shapes are accepted: a bare JSON array of messages, or an object with
//! `messages` and an optional `activeLeafId`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::message::{Message, MessageId};
use crate::tree;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationFile {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_leaf_id: Option<MessageId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileShape {
    Bare(Vec<Message>),
    Wrapped(ConversationFile),
}

impl ConversationFile {
    pub fn parse(contents: &str) -> Result<Self> {
        let file = match serde_json::from_str::<FileShape>(contents) {
            Ok(FileShape::Bare(messages)) => Self {
                messages,
                active_leaf_id: None,
            },
            Ok(FileShape::Wrapped(file)) => file,
            // Re-parse as the wrapped form for a precise error location
            Err(_) => serde_json::from_str::<Self>(contents)?,
        };

        for issue in tree::validate(&file.messages) {
            warn!(target: "forkline::export", %issue, "Conversation file is inconsistent");
        }
        debug!(
            target: "forkline::export",
            messages = file.messages.len(),
            active_leaf = ?file.active_leaf_id,
            "Parsed conversation file"
        );
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::parse(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The stored pointer, or the most recently created leaf when none was saved
    pub fn initial_leaf(&self) -> Option<MessageId> {
        self.active_leaf_id
            .clone()
            .or_else(|| tree::latest_leaf(&self.messages).map(str::to_string))
    }
}
