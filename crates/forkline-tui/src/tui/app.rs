//! Viewer state and the per-frame pipeline.
//!
//! `App` owns the conversation view, the follow engine and the chat
//! viewport. Input handlers mutate state and report whether a redraw is
//! needed; `render` lays out the path, feeds what it measured into the
//! follow engine and carries out the commands it answers with.

use chrono::Utc;
use forkline_core::tree::{self, Direction, add_message};
use forkline_core::{
    ConversationView, EditRequest, EditSession, Message, MessageId, Preferences, Role,
};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    layout::{Position, Rect},
    widgets::Clear,
};
use tracing::{debug, info};

use crate::tui::chat_viewport::ChatViewport;
use crate::tui::follow::{FollowConfig, FollowState, ScrollCommand, ScrollEvent, reduce};
use crate::tui::observer::ViewEvent;
use crate::tui::replay::{Replay, ReplayEvent};
use crate::tui::theme::Theme;
use crate::tui::ui_layout::UiLayout;
use crate::tui::widgets::minimap::{self, MINIMAP_WIDTH, hit_test};
use crate::tui::widgets::{
    MessageView, Minimap, MinimapConfig, MinimapHit, MinimapLayout, MinimapTooltip, Notice,
    StatusBar,
};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// What the previous frame measured
#[derive(Debug, Default)]
struct FrameMetrics {
    path_ids: Vec<MessageId>,
    chat_width: u16,
    viewport_height: usize,
    content_height: usize,
    last_item_height: Option<usize>,
    offset: usize,
}

pub struct App {
    conversation: ConversationView,
    follow: FollowState,
    viewport: ChatViewport,
    edit: EditSession,
    preferences: Preferences,
    theme: Theme,
    minimap_config: MinimapConfig,
    /// Index into the displayed path
    selected: Option<usize>,
    hovered_marker: Option<usize>,
    notice: Option<Notice>,
    /// Role of a message this app just appended to the path
    pending_append: Option<Role>,
    replay: Option<Replay>,
    spinner_state: usize,
    frame: FrameMetrics,
    layout: Option<UiLayout>,
    minimap_layout: Option<MinimapLayout>,
    should_quit: bool,
}

impl App {
    pub fn new(conversation: ConversationView, preferences: Preferences) -> Self {
        Self {
            conversation,
            follow: FollowState::new(FollowConfig::from(&preferences.scroll)),
            viewport: ChatViewport::new(),
            edit: EditSession::new(),
            theme: Theme::for_name(preferences.ui.theme),
            minimap_config: MinimapConfig::from(&preferences.minimap),
            preferences,
            selected: None,
            hovered_marker: None,
            notice: None,
            pending_append: None,
            replay: None,
            spinner_state: 0,
            frame: FrameMetrics::default(),
            layout: None,
            minimap_layout: None,
            should_quit: false,
        }
    }

    pub fn conversation(&self) -> &ConversationView {
        &self.conversation
    }

    pub fn follow(&self) -> &FollowState {
        &self.follow
    }

    pub fn viewport(&self) -> &ChatViewport {
        &self.viewport
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.edit.editing_id().is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn path_len(&self) -> usize {
        self.conversation.displayed_path().len()
    }

    fn dispatch(&mut self, event: ScrollEvent) {
        let commands = reduce(&mut self.follow, event);
        self.apply_commands(commands);
    }

    fn apply_commands(&mut self, commands: Vec<ScrollCommand>) {
        for command in commands {
            debug!(target: "tui.app", ?command, "Applying scroll command");
            if !self.viewport.state_mut().apply(command) {
                self.conversation.request_load_more();
            }
        }
    }

    // ----- input -----

    /// Returns whether the frame needs to be redrawn
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return true;
        }
        self.notice = None;

        if self.is_editing() {
            return self.handle_edit_key(key);
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => {
                self.viewport.state_mut().scroll_up(1);
            }
            KeyCode::Down => {
                self.viewport.state_mut().scroll_down(1);
            }
            KeyCode::PageUp => {
                let page = self.page_size();
                self.viewport.state_mut().scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                self.viewport.state_mut().scroll_down(page);
            }
            KeyCode::Char('g') | KeyCode::Home => self.viewport.state_mut().scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => self.dispatch(ScrollEvent::JumpToBottom),
            KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => {
                if let Some(index) = self.selected {
                    self.dispatch(ScrollEvent::JumpToItem(index));
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.switch_branch(Direction::Prev),
            KeyCode::Char('l') | KeyCode::Right => self.switch_branch(Direction::Next),
            KeyCode::Char('e') => self.start_edit(),
            KeyCode::Esc => self.selected = None,
            _ => return false,
        }
        true
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.edit.cancel(),
            KeyCode::Enter => {
                if let Some(request) = self.edit.save() {
                    self.fork_edit(request);
                } else {
                    self.notice = Some(Notice::info("No changes"));
                }
            }
            KeyCode::Backspace => self.edit.pop_char(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit.push_char(ch);
            }
            _ => return false,
        }
        true
    }

    /// Bracketed paste goes into the edit draft
    pub fn handle_paste(&mut self, text: &str) -> bool {
        let Some(draft) = self.edit.draft() else {
            return false;
        };
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let updated = format!("{draft}{normalized}");
        self.edit.update(updated);
        true
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        let position = Position::new(event.column, event.row);
        match event.kind {
            MouseEventKind::ScrollUp => {
                let step = usize::from(self.preferences.scroll.wheel_step);
                self.viewport.state_mut().scroll_up(step)
            }
            MouseEventKind::ScrollDown => {
                let step = usize::from(self.preferences.scroll.wheel_step);
                self.viewport.state_mut().scroll_down(step)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                match self.minimap_hit(position) {
                    Some(MinimapHit::Marker(index)) => {
                        self.dispatch(ScrollEvent::JumpToItem(index));
                        return true;
                    }
                    Some(MinimapHit::Bottom) => {
                        self.dispatch(ScrollEvent::JumpToBottom);
                        return true;
                    }
                    None => {}
                }
                let Some(layout) = self.layout else {
                    return false;
                };
                match self.viewport.item_at(layout.chat, position) {
                    Some(index) if self.selected != Some(index) => {
                        self.selected = Some(index);
                        true
                    }
                    _ => false,
                }
            }
            MouseEventKind::Moved => {
                let hovered = match self.minimap_hit(position) {
                    Some(MinimapHit::Marker(index)) => Some(index),
                    _ => None,
                };
                let changed = hovered != self.hovered_marker;
                self.hovered_marker = hovered;
                changed
            }
            _ => false,
        }
    }

    fn minimap_hit(&self, position: Position) -> Option<MinimapHit> {
        let area = self.layout?.minimap;
        let layout = self.minimap_layout?;
        hit_test(area, layout, self.follow.is_at_bottom(), position)
    }

    fn page_size(&self) -> usize {
        self.layout
            .map_or(1, |l| usize::from(l.chat.height.saturating_sub(1)).max(1))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.path_len();
        if len == 0 {
            return;
        }
        let visible = self.viewport.state().visible_range;
        let next = match self.selected {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None if delta < 0 => visible.map_or(len - 1, |v| v.last_index),
            None => visible.map_or(0, |v| v.first_index),
        };
        self.selected = Some(next);

        if !visible.is_some_and(|v| v.contains(next)) {
            self.dispatch(ScrollEvent::JumpToItem(next));
        }
    }

    /// The selected message, or the deepest forked message on the path
    fn branch_target(&self) -> Option<MessageId> {
        let path = self.conversation.displayed_path();
        if let Some(index) = self.selected {
            return path.get(index).map(|m| m.id.clone());
        }
        let index = self.conversation.index();
        path.iter()
            .rev()
            .find(|m| tree::branch_position(&index, m.id()).is_some_and(|p| p.is_visible()))
            .map(|m| m.id.clone())
    }

    fn switch_branch(&mut self, direction: Direction) {
        let Some(node_id) = self.branch_target() else {
            self.notice = Some(Notice::warn("No branches on this path"));
            return;
        };
        match self.conversation.switch_branch(&node_id, direction) {
            Some(leaf) => {
                debug!(target: "tui.app", %node_id, %leaf, %direction, "Branch switched");
            }
            None => {
                let text = match direction {
                    Direction::Prev => "No previous branch",
                    Direction::Next => "No next branch",
                };
                self.notice = Some(Notice::warn(text));
            }
        }
    }

    fn start_edit(&mut self) {
        let target = {
            let path = self.conversation.displayed_path();
            self.selected
                .and_then(|i| path.get(i).copied())
                .map(|m| (m.id.clone(), m.content.clone(), m.is_user()))
        };
        match target {
            Some((id, content, true)) => self.edit.start(id, content),
            Some(_) => self.notice = Some(Notice::warn("Only user messages can be edited")),
            None => self.notice = Some(Notice::warn("Select a message to edit (j/k)")),
        }
    }

    /// Fork the edited message: a new sibling carrying the new content,
    /// made the active leaf.
    fn fork_edit(&mut self, request: EditRequest) {
        let Some(original) = self
            .conversation
            .index()
            .get(&request.message_id)
            .cloned()
        else {
            self.notice = Some(Notice::warn("Edited message no longer exists"));
            return;
        };

        let new_id = self.fork_id(&original.id);
        let mut message = Message::new(new_id.clone(), original.role, request.new_content)
            .with_created_at(Utc::now());
        if let Some(parent) = original.parent_id {
            message = message.with_parent(parent);
        }

        let mut added = false;
        self.conversation
            .update_messages(|messages| added = add_message(messages, message));
        if added && self.conversation.set_active_leaf(&new_id) {
            info!(target: "tui.app", from = %original.id, to = %new_id, "Forked edited message");
            self.pending_append = Some(original.role);
            self.selected = None;
        }
    }

    fn fork_id(&self, base: &str) -> MessageId {
        let index = self.conversation.index();
        (1..)
            .map(|n| format!("{base}-edit{n}"))
            .find(|id| !index.contains(id))
            .unwrap_or_else(|| format!("{base}-edit"))
    }

    // ----- background events -----

    pub fn handle_view_event(&mut self, event: ViewEvent) -> bool {
        self.notice = Some(match event {
            ViewEvent::LeafChanged(leaf) => Notice::info(format!("leaf → {leaf}")),
            ViewEvent::LoadMoreRequested => Notice::info("Start of conversation"),
        });
        true
    }

    /// Withhold the final reply so it can be streamed back. Returns the
    /// content to feed.
    pub fn prepare_replay(&mut self) -> Option<String> {
        let replay = Replay::withhold(&mut self.conversation)?;
        let content = replay.content().to_string();
        self.replay = Some(replay);
        Some(content)
    }

    pub fn handle_replay_event(&mut self, event: ReplayEvent) -> bool {
        let Some(replay) = self.replay.as_ref() else {
            return false;
        };
        match event {
            ReplayEvent::Started => {
                let commands = reduce(&mut self.follow, ScrollEvent::LoadingChanged(true));
                if replay.start(&mut self.conversation) {
                    self.pending_append = Some(Role::Assistant);
                }
                self.apply_commands(commands);
            }
            ReplayEvent::Chunk(chunk) => {
                replay.append(&mut self.conversation, &chunk);
            }
            ReplayEvent::Finished => {
                replay.finish(&mut self.conversation);
                self.replay = None;
                self.dispatch(ScrollEvent::LoadingChanged(false));
            }
        }
        true
    }

    /// Advance animations. Returns whether anything visible changed.
    pub fn tick(&mut self) -> bool {
        let spinning = self.follow.is_loading()
            || self
                .conversation
                .displayed_path()
                .iter()
                .any(|m| m.is_in_progress());
        if spinning {
            self.spinner_state = self.spinner_state.wrapping_add(1);
        }
        spinning || self.viewport.state().is_animating()
    }

    // ----- rendering -----

    pub fn render(&mut self, f: &mut Frame) {
        let size = f.area();
        let spinner = SPINNER_CHARS[self.spinner_state % SPINNER_CHARS.len()];
        let show_timestamp = self.preferences.ui.show_timestamps;

        let (layout, markers, path_ids) = {
            let path = self.conversation.displayed_path();
            let index = self.conversation.index();

            let markers = if self.preferences.minimap.visible {
                minimap::markers(&path, &self.minimap_config)
            } else {
                Vec::new()
            };
            let minimap_width = if markers.is_empty() { 0 } else { MINIMAP_WIDTH };
            let layout = UiLayout::compute(size, minimap_width);

            let views: Vec<MessageView<'_>> = path
                .iter()
                .copied()
                .enumerate()
                .map(|(i, message)| MessageView {
                    message,
                    branch: tree::branch_position(&index, message.id()),
                    selected: self.selected == Some(i),
                    draft: if self.edit.is_editing(message.id()) {
                        self.edit.draft()
                    } else {
                        None
                    },
                    spinner: message.is_in_progress().then_some(spinner),
                    show_timestamp,
                })
                .collect();
            self.viewport.rebuild(&views, layout.chat.width, &self.theme);

            let path_ids: Vec<MessageId> = path.iter().map(|m| m.id.clone()).collect();
            (layout, markers, path_ids)
        };

        let len = path_ids.len();
        self.selected = self.selected.filter(|i| *i < len);
        self.report_layout(&layout, &path_ids);

        layout.prepare_background(f, &self.theme);
        self.viewport
            .render(layout.chat, f.buffer_mut(), &self.theme);

        let offset = self.viewport.state().offset;
        self.dispatch(ScrollEvent::Scrolled { offset });
        if offset == 0
            && self.frame.offset > 0
            && self.viewport.total_content_height() > usize::from(layout.chat.height)
        {
            self.dispatch(ScrollEvent::StartReached);
        }

        self.render_minimap(f, &layout, &markers);

        let leaf = self.conversation.resolved_leaf();
        let status = StatusBar::new(self.follow.mode(), len, &self.theme)
            .with_loading(self.follow.is_loading())
            .with_active_leaf(leaf)
            .with_notice(self.notice.as_ref());
        f.render_widget(status, layout.status);

        self.frame = FrameMetrics {
            path_ids,
            chat_width: layout.chat.width,
            viewport_height: usize::from(layout.chat.height),
            content_height: self.viewport.total_content_height(),
            last_item_height: self.viewport.last_item_height(),
            offset,
        };
        self.layout = Some(layout);
    }

    /// Tell the follow engine how the path and its layout changed since the
    /// previous frame.
    fn report_layout(&mut self, layout: &UiLayout, path_ids: &[MessageId]) {
        let len = path_ids.len();
        let content_height = self.viewport.total_content_height();
        let viewport_height = usize::from(layout.chat.height);
        let path_changed = path_ids != self.frame.path_ids.as_slice();
        let appended = self.pending_append.take();

        if path_changed {
            let event = match appended {
                Some(role) => ScrollEvent::ItemAppended { role, len },
                None => ScrollEvent::ItemsReset { len },
            };
            self.dispatch(event);
        }

        let same_frame = layout.chat.width == self.frame.chat_width
            && viewport_height == self.frame.viewport_height;
        if !path_changed
            && same_frame
            && self.viewport.last_item_height() != self.frame.last_item_height
        {
            self.dispatch(ScrollEvent::LastItemGrew { content_height });
        } else if content_height != self.frame.content_height
            || viewport_height != self.frame.viewport_height
        {
            self.dispatch(ScrollEvent::Resized {
                content_height,
                viewport_height,
            });
        }
    }

    fn render_minimap(
        &mut self,
        f: &mut Frame,
        layout: &UiLayout,
        markers: &[minimap::MinimapMarker],
    ) {
        if layout.minimap.width == 0 {
            self.minimap_layout = None;
            return;
        }

        let visible = self.viewport.state().visible_range;
        let minimap_layout = MinimapLayout::compute(layout.minimap, markers.len(), visible);
        self.minimap_layout = Some(minimap_layout);

        let widget = Minimap::new(markers, &self.minimap_config, &self.theme)
            .with_visible_range(visible)
            .with_at_bottom(self.follow.is_at_bottom())
            .with_hovered(self.hovered_marker);
        f.render_widget(widget, layout.minimap);

        let Some(index) = self.hovered_marker else {
            return;
        };
        let (Some(marker), Some(row)) = (markers.get(index), minimap_layout.row_of(index)) else {
            return;
        };
        let tooltip = MinimapTooltip::new(marker, &self.theme);
        let width = tooltip.width().min(layout.chat.width);
        let area = Rect::new(
            layout.minimap.x.saturating_sub(width),
            layout.minimap.y + row as u16,
            width,
            1,
        );
        f.render_widget(Clear, area);
        f.render_widget(tooltip, area);
    }
}
