//! Scroll-follow engine.
//!
//! Keeps the scrollback glued to the bottom while output streams in, and
//! backs off as soon as the user scrolls up. The engine is an explicit state
//! object plus a reducer: the viewport reports what it observed, the reducer
//! answers with commands for the viewport to carry out.

use forkline_core::Role;
use forkline_core::preferences::ScrollPreferences;
use strum::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum FollowMode {
    /// Pinned to the newest output
    #[default]
    Following,
    /// The user took over; growth no longer moves the viewport
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowConfig {
    /// Upward movement during loading below this is treated as layout noise
    pub noise_threshold: usize,
    /// Distance from the end still treated as "at bottom"
    pub at_bottom_threshold: usize,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self::from(&ScrollPreferences::default())
    }
}

impl From<&ScrollPreferences> for FollowConfig {
    fn from(prefs: &ScrollPreferences) -> Self {
        Self {
            noise_threshold: usize::from(prefs.noise_threshold),
            at_bottom_threshold: usize::from(prefs.at_bottom_threshold),
        }
    }
}

/// Observations and intents fed into the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    /// The viewport settled at `offset` (rows from the top of the content)
    Scrolled { offset: usize },
    Resized {
        content_height: usize,
        viewport_height: usize,
    },
    LoadingChanged(bool),
    /// A message was appended to the displayed path, which now has `len` items
    ItemAppended { role: Role, len: usize },
    /// The displayed path was swapped out (branch switch, reload)
    ItemsReset { len: usize },
    /// The last item got taller; `content_height` is the new total
    LastItemGrew { content_height: usize },
    StartReached,
    JumpToItem(usize),
    JumpToBottom,
}

/// What the viewport should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    ScrollToItem { index: usize, smooth: bool },
    ScrollToBottom { smooth: bool },
    LoadMore,
}

#[derive(Debug, Clone)]
pub struct FollowState {
    mode: FollowMode,
    loading: bool,
    last_offset: Option<usize>,
    content_height: usize,
    viewport_height: usize,
    item_count: usize,
    at_bottom: bool,
    /// A bottom command is outstanding and the viewport has not reported back
    reanchor_pending: bool,
    config: FollowConfig,
}

impl Default for FollowState {
    fn default() -> Self {
        Self::new(FollowConfig::default())
    }
}

impl FollowState {
    pub fn new(config: FollowConfig) -> Self {
        Self {
            mode: FollowMode::Following,
            loading: false,
            last_offset: None,
            content_height: 0,
            viewport_height: 0,
            item_count: 0,
            at_bottom: true,
            reanchor_pending: false,
            config,
        }
    }

    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    pub fn is_following(&self) -> bool {
        self.mode == FollowMode::Following
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Drives the scroll-to-bottom affordance
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn content_height(&self) -> usize {
        self.content_height
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn distance_from_bottom(&self) -> usize {
        let offset = self.last_offset.unwrap_or(0);
        self.content_height
            .saturating_sub(self.viewport_height)
            .saturating_sub(offset)
    }

    fn compute_at_bottom(&self) -> bool {
        self.distance_from_bottom() < self.config.at_bottom_threshold.max(1)
    }

    fn set_mode(&mut self, mode: FollowMode, reason: &str) {
        if self.mode != mode {
            debug!(target: "tui.follow", from = %self.mode, to = %mode, reason, "Follow mode changed");
            self.mode = mode;
        }
    }

    /// Emit a single instant bottom command until the viewport reports back
    fn reanchor(&mut self) -> Vec<ScrollCommand> {
        self.at_bottom = true;
        if self.reanchor_pending {
            return Vec::new();
        }
        self.reanchor_pending = true;
        vec![ScrollCommand::ScrollToBottom { smooth: false }]
    }
}

pub fn reduce(state: &mut FollowState, event: ScrollEvent) -> Vec<ScrollCommand> {
    match event {
        ScrollEvent::Scrolled { offset } => handle_scrolled(state, offset),
        ScrollEvent::Resized {
            content_height,
            viewport_height,
        } => handle_resized(state, content_height, viewport_height),
        ScrollEvent::LoadingChanged(loading) => handle_loading_changed(state, loading),
        ScrollEvent::ItemAppended { role, len } => handle_item_appended(state, role, len),
        ScrollEvent::ItemsReset { len } => handle_items_reset(state, len),
        ScrollEvent::LastItemGrew { content_height } => {
            handle_last_item_grew(state, content_height)
        }
        ScrollEvent::StartReached => vec![ScrollCommand::LoadMore],
        ScrollEvent::JumpToItem(index) => handle_jump_to_item(state, index),
        ScrollEvent::JumpToBottom => handle_jump_to_bottom(state),
    }
}

fn handle_scrolled(state: &mut FollowState, offset: usize) -> Vec<ScrollCommand> {
    let delta = state
        .last_offset
        .map_or(0, |last| offset as i64 - last as i64);
    state.last_offset = Some(offset);
    state.reanchor_pending = false;

    if state.loading && delta < -(state.config.noise_threshold as i64) {
        state.set_mode(FollowMode::Detached, "scrolled up while loading");
    }

    state.at_bottom = state.compute_at_bottom();
    if state.at_bottom && state.mode == FollowMode::Detached {
        state.set_mode(FollowMode::Following, "returned to bottom");
    }

    Vec::new()
}

fn handle_resized(
    state: &mut FollowState,
    content_height: usize,
    viewport_height: usize,
) -> Vec<ScrollCommand> {
    let was_at_bottom = state.at_bottom;
    state.content_height = content_height;
    state.viewport_height = viewport_height;

    if state.is_following() && was_at_bottom {
        return state.reanchor();
    }
    state.at_bottom = state.compute_at_bottom();
    Vec::new()
}

fn handle_last_item_grew(state: &mut FollowState, content_height: usize) -> Vec<ScrollCommand> {
    let was_at_bottom = state.at_bottom;
    state.content_height = content_height;

    if state.is_following() && was_at_bottom {
        return state.reanchor();
    }
    state.at_bottom = state.compute_at_bottom();
    Vec::new()
}

fn handle_loading_changed(state: &mut FollowState, loading: bool) -> Vec<ScrollCommand> {
    state.loading = loading;
    if !loading {
        state.set_mode(FollowMode::Following, "loading finished");
    }
    Vec::new()
}

fn handle_item_appended(state: &mut FollowState, role: Role, len: usize) -> Vec<ScrollCommand> {
    state.item_count = len;

    if role == Role::User {
        state.set_mode(FollowMode::Following, "user message sent");
    } else if !(state.is_following() && state.loading && state.at_bottom) {
        return Vec::new();
    }

    // The smooth scroll covers any growth reported before the next frame
    state.reanchor_pending = true;
    vec![ScrollCommand::ScrollToBottom { smooth: true }]
}

/// A new path has nothing to do with the old offset; land on its last row
fn handle_items_reset(state: &mut FollowState, len: usize) -> Vec<ScrollCommand> {
    state.item_count = len;
    state.last_offset = None;
    state.reanchor_pending = false;
    state.set_mode(FollowMode::Following, "path replaced");
    if len == 0 {
        state.at_bottom = true;
        return Vec::new();
    }
    state.reanchor()
}

fn handle_jump_to_item(state: &mut FollowState, index: usize) -> Vec<ScrollCommand> {
    if index >= state.item_count {
        debug!(target: "tui.follow", index, items = state.item_count, "Jump target out of range");
        return Vec::new();
    }

    if index + 1 == state.item_count {
        state.set_mode(FollowMode::Following, "jumped to last item");
    } else if state.loading {
        state.set_mode(FollowMode::Detached, "jumped to earlier item while loading");
    }
    vec![ScrollCommand::ScrollToItem {
        index,
        smooth: true,
    }]
}

fn handle_jump_to_bottom(state: &mut FollowState) -> Vec<ScrollCommand> {
    state.set_mode(FollowMode::Following, "jumped to bottom");
    if state.item_count == 0 {
        return Vec::new();
    }
    vec![ScrollCommand::ScrollToBottom { smooth: true }]
}
