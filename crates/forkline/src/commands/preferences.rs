use super::Command;
use crate::error::Error;
use async_trait::async_trait;
use eyre::Result;
use forkline_core::Preferences;
use std::io::Write;
use std::path::PathBuf;

pub struct PreferencesCommand {
    pub action: PreferencesAction,
    /// The preferences file this command operates on
    pub path: PathBuf,
}

pub enum PreferencesAction {
    Show,
    Path,
    Reset,
}

#[async_trait]
impl Command for PreferencesCommand {
    async fn execute(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        self.write_to(&mut stdout)?;
        Ok(())
    }
}

impl PreferencesCommand {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::result::Result<(), Error> {
        match self.action {
            PreferencesAction::Show => self.show(out),
            PreferencesAction::Path => {
                writeln!(out, "{}", self.path.display())?;
                Ok(())
            }
            PreferencesAction::Reset => self.reset(out),
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> std::result::Result<(), Error> {
        let prefs = Preferences::load_from(&self.path)?;
        let origin = if self.path.exists() {
            ""
        } else {
            " (not created yet, showing defaults)"
        };

        writeln!(out, "Preferences file: {}{origin}", self.path.display())?;
        writeln!(out, "\n{}", toml::to_string_pretty(&prefs)?)?;
        Ok(())
    }

    fn reset<W: Write>(&self, out: &mut W) -> std::result::Result<(), Error> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            writeln!(out, "Preferences reset to defaults")?;
        } else {
            writeln!(out, "No preferences file found")?;
        }
        Ok(())
    }
}
