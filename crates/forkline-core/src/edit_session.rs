//! Single in-place edit of a displayed message.
//!
//! At most one message is in edit at a time. Saving produces an
//! [`EditRequest`] for the mutation layer only when the text actually
//! changed; the fork itself is created externally.

use tracing::debug;

use crate::message::MessageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub message_id: MessageId,
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveEdit {
    message_id: MessageId,
    original: String,
    draft: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    active: Option<ActiveEdit>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin editing `message_id`, replacing any edit already in progress
    pub fn start(&mut self, message_id: impl Into<MessageId>, content: impl Into<String>) {
        let content = content.into();
        let message_id = message_id.into();
        debug!(target: "forkline::edit", %message_id, "Edit started");
        self.active = Some(ActiveEdit {
            message_id,
            original: content.clone(),
            draft: content,
        });
    }

    pub fn cancel(&mut self) {
        if let Some(edit) = self.active.take() {
            debug!(target: "forkline::edit", message_id = %edit.message_id, "Edit cancelled");
        }
    }

    pub fn is_editing(&self, message_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|edit| edit.message_id == message_id)
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.active.as_ref().map(|edit| edit.message_id.as_str())
    }

    pub fn draft(&self) -> Option<&str> {
        self.active.as_ref().map(|edit| edit.draft.as_str())
    }

    pub fn update(&mut self, draft: impl Into<String>) {
        if let Some(edit) = &mut self.active {
            edit.draft = draft.into();
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(edit) = &mut self.active {
            edit.draft.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(edit) = &mut self.active {
            edit.draft.pop();
        }
    }

    /// Finish the edit with the current draft.
    ///
    /// The session always ends. A request is produced only for a non-blank
    /// draft that differs from the original content.
    pub fn save(&mut self) -> Option<EditRequest> {
        let edit = self.active.take()?;
        if edit.draft.trim().is_empty() || edit.draft == edit.original {
            debug!(target: "forkline::edit", message_id = %edit.message_id, "Edit saved without changes");
            return None;
        }

        debug!(target: "forkline::edit", message_id = %edit.message_id, "Edit saved");
        Some(EditRequest {
            message_id: edit.message_id,
            new_content: edit.draft,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_emits_request_for_changed_text() {
        let mut session = EditSession::new();
        session.start("u1", "What is Rust?");
        session.update("What is Go?");

        assert!(session.is_editing("u1"));
        assert_eq!(
            session.save(),
            Some(EditRequest {
                message_id: "u1".into(),
                new_content: "What is Go?".into(),
            })
        );
        assert_eq!(session.editing_id(), None);
    }

    #[test]
    fn unchanged_or_blank_drafts_produce_nothing() {
        let mut session = EditSession::new();
        session.start("u1", "same");
        assert_eq!(session.save(), None);

        session.start("u1", "text");
        session.update("   ");
        assert_eq!(session.save(), None);
        assert_eq!(session.draft(), None);
    }

    #[test]
    fn starting_another_edit_replaces_the_first() {
        let mut session = EditSession::new();
        session.start("a", "one");
        session.start("b", "two");
        session.push_char('!');

        assert!(!session.is_editing("a"));
        assert_eq!(session.draft(), Some("two!"));
        session.pop_char();
        session.cancel();
        assert_eq!(session.editing_id(), None);
    }
}
