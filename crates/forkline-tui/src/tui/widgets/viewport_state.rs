//! Scroll position of the chat viewport

use crate::tui::follow::ScrollCommand;

/// State for the chat viewport
#[derive(Debug, Default)]
pub struct ViewportState {
    /// Current scroll offset (row-based)
    pub offset: usize,
    /// Pending jump, resolved during layout once heights are known
    pending: Option<PendingScroll>,
    /// Cached visible range, updated on every render
    pub visible_range: Option<VisibleRange>,
    /// Total content height (cached during render)
    pub total_content_height: usize,
    /// Viewport height (cached during render)
    pub last_viewport_height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub first_index: usize,
    pub last_index: usize,
    pub first_y: u16,
    pub last_y: u16,
}

impl VisibleRange {
    pub fn contains(&self, index: usize) -> bool {
        (self.first_index..=self.last_index).contains(&index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Bottom,
    Item(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingScroll {
    target: ScrollTarget,
    smooth: bool,
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a jump. A newer request replaces any pending one.
    pub fn request(&mut self, target: ScrollTarget, smooth: bool) {
        self.pending = Some(PendingScroll { target, smooth });
    }

    /// Carry out a follow-engine command. Returns `false` for commands that
    /// are not about the viewport.
    pub fn apply(&mut self, command: ScrollCommand) -> bool {
        match command {
            ScrollCommand::ScrollToBottom { smooth } => {
                self.request(ScrollTarget::Bottom, smooth);
                true
            }
            ScrollCommand::ScrollToItem { index, smooth } => {
                self.request(ScrollTarget::Item(index), smooth);
                true
            }
            ScrollCommand::LoadMore => false,
        }
    }

    pub fn pending_target(&self) -> Option<ScrollTarget> {
        self.pending.map(|p| p.target)
    }

    /// A smooth jump is still in flight
    pub fn is_animating(&self) -> bool {
        self.pending.is_some_and(|p| p.smooth)
    }

    pub fn scroll_up(&mut self, amount: usize) -> bool {
        self.pending = None;
        let previous = self.offset;
        self.offset = self.offset.saturating_sub(amount).min(self.max_offset());
        self.offset != previous
    }

    pub fn scroll_down(&mut self, amount: usize) -> bool {
        self.pending = None;
        let previous = self.offset;
        self.offset = self.offset.saturating_add(amount).min(self.max_offset());
        self.offset != previous
    }

    pub fn scroll_to_top(&mut self) {
        self.pending = None;
        self.offset = 0;
    }

    pub fn max_offset(&self) -> usize {
        self.total_content_height
            .saturating_sub(usize::from(self.last_viewport_height))
    }

    /// Record the latest heights and advance any pending jump.
    ///
    /// Instant jumps land in one step; smooth ones cover a third of the
    /// remaining distance per call and stay pending until they arrive.
    /// Item targets are start-aligned; an index past the end is dropped.
    pub fn resolve(&mut self, total_content_height: usize, viewport_height: u16, item_start_y: &[usize]) {
        self.total_content_height = total_content_height;
        self.last_viewport_height = viewport_height;
        let max_offset = self.max_offset();

        if let Some(pending) = self.pending {
            let target_offset = match pending.target {
                ScrollTarget::Bottom => Some(max_offset),
                ScrollTarget::Item(index) => item_start_y.get(index).copied(),
            };

            match target_offset.map(|t| t.min(max_offset)) {
                None => self.pending = None,
                Some(target) if !pending.smooth || target == self.offset => {
                    self.offset = target;
                    self.pending = None;
                }
                Some(target) => {
                    let distance = target.abs_diff(self.offset);
                    let step = distance.div_ceil(3).max(1);
                    self.offset = if target > self.offset {
                        self.offset + step
                    } else {
                        self.offset - step
                    };
                    if self.offset == target {
                        self.pending = None;
                    }
                }
            }
        }

        self.offset = self.offset.min(max_offset);
    }
}
