use async_trait::async_trait;
use eyre::Result;
use forkline_core::Preferences;
use forkline_core::preferences::ThemeName;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub mod path;
pub mod preferences;
#[cfg(feature = "ui")]
pub mod view;

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Where preferences are read from: an explicit file or the default location
pub fn preferences_path(explicit: Option<&Path>) -> std::result::Result<PathBuf, Error> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Preferences::config_path()?),
    }
}

/// Load preferences and apply command-line overrides
pub fn load_preferences(
    explicit: Option<&Path>,
    theme: Option<ThemeName>,
) -> std::result::Result<Preferences, Error> {
    let mut preferences = Preferences::load_from(&preferences_path(explicit)?)?;
    if let Some(theme) = theme {
        preferences.ui.theme = theme;
    }
    Ok(preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "[ui]\ntheme = \"plain\"\n").unwrap();

        let from_file = load_preferences(Some(&path), None).unwrap();
        assert_eq!(from_file.ui.theme, ThemeName::Plain);

        let overridden = load_preferences(Some(&path), Some(ThemeName::Light)).unwrap();
        assert_eq!(overridden.ui.theme, ThemeName::Light);
    }
}
