use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

use crate::tree::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub scroll: ScrollPreferences,

    #[serde(default)]
    pub minimap: MinimapPreferences,

    #[serde(default)]
    pub tree: TreePreferences,

    #[serde(default)]
    pub ui: UiPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScrollPreferences {
    /// Upward movement (rows) during streaming that counts as a user scroll
    pub noise_threshold: u16,
    /// Distance from the end (rows) still treated as "at bottom"
    pub at_bottom_threshold: u16,
    pub wheel_step: u16,
}

impl Default for ScrollPreferences {
    fn default() -> Self {
        Self {
            noise_threshold: 2,
            at_bottom_threshold: 3,
            wheel_step: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MinimapPreferences {
    pub visible: bool,
    pub min_marker: u16,
    pub max_marker: u16,
    /// Marker length contributed by each content character
    pub per_char: f64,
    pub preview_chars: usize,
}

impl Default for MinimapPreferences {
    fn default() -> Self {
        Self {
            visible: true,
            min_marker: 12,
            max_marker: 32,
            per_char: 0.2,
            preview_chars: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreePreferences {
    pub max_depth: usize,
}

impl Default for TreePreferences {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiPreferences {
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default)]
    pub show_timestamps: bool,
}

impl Preferences {
    /// Get the path to the preferences file
    pub fn config_path() -> Result<PathBuf, crate::error::Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::Error::Configuration("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("forkline").join("preferences.toml"))
    }

    /// Load preferences from disk, or return defaults if not found
    pub fn load() -> Result<Self, crate::error::Error> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, crate::error::Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        match toml::from_str(&contents) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                tracing::warn!(
                    target: "forkline::preferences",
                    "Failed to parse preferences file at {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save preferences to disk
    pub fn save(&self) -> Result<(), crate::error::Error> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), crate::error::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::Error::Configuration(format!("Failed to serialize preferences: {e}"))
        })?;

        std::fs::write(path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let prefs = Preferences::default();
        assert_eq!(prefs.scroll.noise_threshold, 2);
        assert_eq!(prefs.scroll.at_bottom_threshold, 3);
        assert_eq!(prefs.minimap.min_marker, 12);
        assert_eq!(prefs.minimap.max_marker, 32);
        assert_eq!(prefs.minimap.preview_chars, 50);
        assert_eq!(prefs.tree.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(prefs.ui.theme, ThemeName::Dark);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "[scroll]\nwheel_step = 5\n\n[ui]\ntheme = \"light\"\n").unwrap();

        let prefs = Preferences::load_from(&path).unwrap();
        assert_eq!(prefs.scroll.wheel_step, 5);
        assert_eq!(prefs.scroll.noise_threshold, 2);
        assert_eq!(prefs.ui.theme, ThemeName::Light);
        assert!(prefs.minimap.visible);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert_eq!(Preferences::load_from(&path).unwrap(), Preferences::default());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut prefs = Preferences::default();
        prefs.minimap.visible = false;
        prefs.save_to(&path).unwrap();

        assert_eq!(Preferences::load_from(&path).unwrap(), prefs);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }
}
