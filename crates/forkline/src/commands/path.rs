use super::Command;
use crate::error::Error;
use async_trait::async_trait;
use eyre::Result;
use forkline_core::export::ConversationFile;
use forkline_core::tree::{self, TreeIndex};
use forkline_core::{ConversationView, Preferences};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Characters of content shown per line in text output
const PREVIEW_CHARS: usize = 72;

/// Print the root-to-leaf path that the viewer would display
pub struct PathCommand {
    pub file: PathBuf,
    pub leaf: Option<String>,
    pub json: bool,
    pub preferences: Preferences,
}

#[async_trait]
impl Command for PathCommand {
    async fn execute(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        self.write_to(&mut stdout)?;
        Ok(())
    }
}

impl PathCommand {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::result::Result<(), Error> {
        let file = ConversationFile::load(&self.file)?;
        for issue in tree::validate(&file.messages) {
            warn!(target: "forkline::path", "{}: {}", self.file.display(), issue);
        }

        let leaf = self.leaf.clone().or_else(|| file.initial_leaf());
        let view = ConversationView::new(file.messages)
            .with_active_leaf(leaf)
            .with_max_depth(self.preferences.tree.max_depth);
        if let Some(requested) = self.leaf.as_deref() {
            if !view.index().contains(requested) {
                return Err(Error::Core(forkline_core::Error::NotFound(format!(
                    "Message {requested}"
                ))));
            }
        }

        let path = view.displayed_path();
        if self.json {
            serde_json::to_writer_pretty(&mut *out, &path)?;
            writeln!(out)?;
            return Ok(());
        }

        let index = view.index();
        for message in path {
            writeln!(out, "{}", Self::format_line(&index, message))?;
        }
        Ok(())
    }

    fn format_line(index: &TreeIndex<'_>, message: &forkline_core::Message) -> String {
        let position = tree::branch_position(index, message.id())
            .map_or_else(|| "-".to_string(), |p| format!("{}/{}", p.position, p.total));
        let mut preview = message.preview(PREVIEW_CHARS);
        if message.content_chars() > PREVIEW_CHARS {
            preview.push('…');
        }
        format!("[{position}] {}: {preview}", message.role)
    }
}
