use clap::{Parser, Subcommand};
use forkline_core::preferences::ThemeName;
use std::path::PathBuf;

/// Browse branching conversation exports: follow the active path, switch
/// between forks and fork edited messages.
#[derive(Parser)]
#[command(version, about, long_about = None, author)]
pub struct Cli {
    /// Preferences file to use instead of the one in the config directory
    #[arg(long, env = "FORKLINE_PREFERENCES", global = true)]
    pub preferences_file: Option<PathBuf>,

    /// Theme for the viewer (overrides preferences)
    #[arg(long, global = true)]
    pub theme: Option<ThemeName>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Open a conversation file in the interactive viewer
    View {
        /// JSON export: an array of messages or {"messages": [...]}
        file: PathBuf,
        /// Leaf to show instead of the stored or most recent one
        #[arg(long)]
        leaf: Option<String>,
        /// Re-stream the final assistant reply after opening
        #[arg(long)]
        replay: bool,
    },
    /// Print the displayed path of a conversation file
    Path {
        /// JSON export: an array of messages or {"messages": [...]}
        file: PathBuf,
        /// Leaf to resolve instead of the stored or most recent one
        #[arg(long)]
        leaf: Option<String>,
        /// Print the path as a JSON array of messages
        #[arg(long)]
        json: bool,
    },
    /// Manage user preferences
    Preferences {
        #[command(subcommand)]
        action: PreferencesCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum PreferencesCommands {
    /// Show current preferences
    Show,
    /// Print the preferences file location
    Path,
    /// Reset preferences to defaults
    Reset,
}
