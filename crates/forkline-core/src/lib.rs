pub mod conversation;
pub mod edit_session;
pub mod error;
pub mod export;
pub mod message;
pub mod preferences;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use conversation::{ConversationObserver, ConversationView};
pub use edit_session::{EditRequest, EditSession};
pub use error::{Error, Result};
pub use export::ConversationFile;
pub use message::{Message, MessageId, MessageStatus, Role};
pub use preferences::Preferences;
