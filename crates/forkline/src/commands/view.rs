use super::Command;
use async_trait::async_trait;
use eyre::Result;
use forkline_core::Preferences;
use forkline_tui::ViewerOptions;
use std::path::PathBuf;

/// Open a conversation file in the terminal viewer
pub struct ViewCommand {
    pub file: PathBuf,
    pub leaf: Option<String>,
    pub replay: bool,
    pub preferences: Preferences,
}

#[async_trait]
impl Command for ViewCommand {
    async fn execute(&self) -> Result<()> {
        forkline_tui::run_viewer(ViewerOptions {
            file: self.file.clone(),
            leaf: self.leaf.clone(),
            replay: self.replay,
            preferences: self.preferences.clone(),
        })
        .await?;
        Ok(())
    }
}
