//! Terminal viewer for a branching conversation
//!
//! This module wires the viewer state to a real terminal using ratatui.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use forkline_core::export::ConversationFile;
use forkline_core::{ConversationView, Preferences};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::tui::app::App;
use crate::tui::observer::{ChannelObserver, ViewEvent};
use crate::tui::replay::ReplayEvent;

pub mod app;
pub mod chat_viewport;
pub mod follow;
pub mod observer;
pub mod replay;
pub mod terminal;
pub mod theme;
pub mod ui_layout;
pub mod widgets;

/// Animation and spinner cadence
const TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Pause before a replay starts streaming
const REPLAY_DELAY: Duration = Duration::from_millis(600);
const REPLAY_CHUNK_INTERVAL: Duration = Duration::from_millis(80);

/// How `run_viewer` should open a conversation
#[derive(Debug, Clone, Default)]
pub struct ViewerOptions {
    pub file: PathBuf,
    /// Leaf to show instead of the stored or latest one
    pub leaf: Option<String>,
    /// Re-stream the final assistant reply after opening
    pub replay: bool,
    pub preferences: Preferences,
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    app: App,
}

impl Tui {
    pub fn new(app: App) -> Result<Self> {
        let mut guard = terminal::SetupGuard::new();
        let mut stdout = io::stdout();
        terminal::setup(&mut stdout)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        guard.disarm();

        Ok(Self { terminal, app })
    }

    pub fn cleanup_terminal(&mut self) -> Result<()> {
        terminal::cleanup_with_writer(self.terminal.backend_mut());
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let app = &mut self.app;
        self.terminal.draw(|f| app.render(f))?;
        Ok(())
    }

    pub async fn run(
        &mut self,
        mut view_rx: mpsc::UnboundedReceiver<ViewEvent>,
        mut replay_rx: mpsc::UnboundedReceiver<ReplayEvent>,
    ) -> Result<()> {
        info!(
            target: "tui.run",
            messages = self.app.conversation().messages().len(),
            "Starting viewer"
        );

        let (term_event_tx, mut term_event_rx) = mpsc::channel::<Result<Event>>(1);
        let input_handle: JoinHandle<()> = tokio::spawn(async move {
            loop {
                if event::poll(Duration::ZERO).unwrap_or(false) {
                    match event::read() {
                        Ok(evt) => {
                            if term_event_tx.send(Ok(evt)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                            debug!(target: "tui.input", "Ignoring interrupted syscall");
                        }
                        Err(e) => {
                            warn!(target: "tui.input", "Input error: {}", e);
                            let _ = term_event_tx.send(Err(Error::from(e))).await;
                            break;
                        }
                    }
                } else {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        });

        let mut needs_redraw = true;
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !self.app.should_quit() {
            if needs_redraw {
                self.draw()?;
                needs_redraw = false;
            }

            tokio::select! {
                Some(event_res) = term_event_rx.recv() => {
                    match event_res {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            needs_redraw = self.app.handle_key(key);
                        }
                        Ok(Event::Mouse(mouse)) => {
                            needs_redraw = self.app.handle_mouse(mouse);
                        }
                        Ok(Event::Paste(data)) => {
                            needs_redraw = self.app.handle_paste(&data);
                        }
                        Ok(Event::Resize(width, height)) => {
                            debug!(target: "tui.run", width, height, "Terminal resized");
                            needs_redraw = true;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(target: "tui.run", "Fatal input error: {}. Exiting.", e);
                            break;
                        }
                    }
                }
                Some(view_event) = view_rx.recv() => {
                    needs_redraw |= self.app.handle_view_event(view_event);
                }
                Some(replay_event) = replay_rx.recv() => {
                    needs_redraw |= self.app.handle_replay_event(replay_event);
                }
                _ = tick.tick() => {
                    needs_redraw |= self.app.tick();
                }
            }
        }

        self.cleanup_terminal()?;
        input_handle.abort();
        Ok(())
    }
}

/// Free function for best-effort terminal cleanup (raw mode, alt screen, mouse, etc.)
pub fn cleanup_terminal() {
    terminal::cleanup();
}

/// Restore the terminal before the default panic output is printed
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        default_hook(panic_info);
    }));
}

/// Open `options.file` and run the viewer until the user quits
pub async fn run_viewer(options: ViewerOptions) -> Result<()> {
    let file = ConversationFile::load(&options.file)?;
    let leaf = options.leaf.clone().or_else(|| file.initial_leaf());
    info!(
        target: "tui.run",
        file = %options.file.display(),
        messages = file.messages.len(),
        leaf = ?leaf,
        "Loaded conversation"
    );

    let (view_tx, view_rx) = mpsc::unbounded_channel();
    let conversation = ConversationView::new(file.messages)
        .with_active_leaf(leaf)
        .with_max_depth(options.preferences.tree.max_depth)
        .with_observer(Arc::new(ChannelObserver::new(view_tx)));

    let mut app = App::new(conversation, options.preferences);

    let (replay_tx, replay_rx) = mpsc::unbounded_channel();
    let replay_handle = if options.replay {
        match app.prepare_replay() {
            Some(content) => Some(replay::spawn_feed(
                content,
                REPLAY_DELAY,
                REPLAY_CHUNK_INTERVAL,
                replay_tx,
            )),
            None => {
                warn!(target: "tui.run", "Nothing to replay: the path does not end in an assistant reply");
                None
            }
        }
    } else {
        None
    };

    setup_panic_hook();
    let mut tui = Tui::new(app)?;
    let result = tui.run(view_rx, replay_rx).await;
    if let Some(handle) = replay_handle {
        handle.abort();
    }
    if result.is_err() {
        cleanup_terminal();
    }
    result
}
