use clap::Parser;
use eyre::Result;

use forkline::cli::{Cli, Commands, PreferencesCommands};
use forkline::commands::{
    Command, load_preferences,
    path::PathCommand,
    preferences::{PreferencesAction, PreferencesCommand},
    preferences_path,
};
use forkline::logging;
use forkline::preferences::ThemeName;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::View { .. } => {
            logging::init_file_tracing()?;
        }
        Commands::Path { .. } | Commands::Preferences { .. } => logging::init_stderr_tracing()?,
    }

    let explicit = cli.preferences_file.as_deref();
    match cli.command {
        Commands::View { file, leaf, replay } => run_view(file, leaf, replay, explicit, cli.theme).await,
        Commands::Path { file, leaf, json } => {
            let preferences = load_preferences(explicit, cli.theme)?;
            PathCommand {
                file,
                leaf,
                json,
                preferences,
            }
            .execute()
            .await
        }
        Commands::Preferences { action } => {
            let action = match action {
                PreferencesCommands::Show => PreferencesAction::Show,
                PreferencesCommands::Path => PreferencesAction::Path,
                PreferencesCommands::Reset => PreferencesAction::Reset,
            };
            PreferencesCommand {
                action,
                path: preferences_path(explicit)?,
            }
            .execute()
            .await
        }
    }
}

#[cfg(feature = "ui")]
async fn run_view(
    file: std::path::PathBuf,
    leaf: Option<String>,
    replay: bool,
    explicit: Option<&std::path::Path>,
    theme: Option<ThemeName>,
) -> Result<()> {
    use forkline::commands::view::ViewCommand;

    let preferences = load_preferences(explicit, theme)?;
    debug!(target: "forkline::main", file = %file.display(), ?leaf, replay, "Opening viewer");
    ViewCommand {
        file,
        leaf,
        replay,
        preferences,
    }
    .execute()
    .await
}

#[cfg(not(feature = "ui"))]
async fn run_view(
    _file: std::path::PathBuf,
    _leaf: Option<String>,
    _replay: bool,
    _explicit: Option<&std::path::Path>,
    _theme: Option<ThemeName>,
) -> Result<()> {
    debug!(target: "forkline::main", "Viewer requested without the ui feature");
    eyre::bail!("forkline was built without the `ui` feature; use `forkline path` instead")
}
