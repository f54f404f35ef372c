//! Virtualized rendering of the displayed path.
//!
//! Every message is laid out once per width and cached; a segment index of
//! item and gap rows lets each frame jump straight to the first visible row
//! instead of walking the whole conversation.

use std::collections::HashMap;

use forkline_core::MessageId;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::{Line, Span},
};

use crate::tui::theme::{Component, Theme};
use crate::tui::widgets::message_block::{self, MessageView};
use crate::tui::widgets::{ViewportState, VisibleRange};

/// Blank rows between consecutive messages
const MESSAGE_SPACING: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Item { idx: usize },
    Gap,
}

/// Metrics for a single row to be rendered
#[derive(Debug, Clone)]
struct RowMetrics {
    kind: RowKind,
    render_h: usize,           // actual height to render in viewport
    first_visible_line: usize, // line offset for partial rendering
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    kind: RowKind,
    start_y: usize,
    height: usize,
}

/// Laid-out lines of one message, valid for `key` at `width`
struct ViewItem {
    id: MessageId,
    key: u64,
    width: u16,
    lines: Vec<Line<'static>>,
}

impl ViewItem {
    fn height(&self) -> usize {
        self.lines.len()
    }
}

#[derive(Default)]
pub struct ChatViewport {
    items: Vec<ViewItem>,
    segments: Vec<Segment>,
    item_start_y: Vec<usize>,
    total_content_height: usize,
    state: ViewportState,
}

impl ChatViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_mut(&mut self) -> &mut ViewportState {
        &mut self.state
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_content_height(&self) -> usize {
        self.total_content_height
    }

    pub fn last_item_height(&self) -> Option<usize> {
        self.items.last().map(ViewItem::height)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    /// Lay out `views` for `width`, reusing cached lines for unchanged items
    pub fn rebuild(&mut self, views: &[MessageView<'_>], width: u16, theme: &Theme) {
        let mut previous: HashMap<MessageId, ViewItem> = self
            .items
            .drain(..)
            .map(|item| (item.id.clone(), item))
            .collect();

        self.items.reserve(views.len());
        for view in views {
            let key = view.cache_key();
            let item = match previous.remove(view.message.id()) {
                Some(item) if item.key == key && item.width == width => item,
                _ => ViewItem {
                    id: view.message.id.clone(),
                    key,
                    width,
                    lines: message_block::render_lines(view, width, theme),
                },
            };
            self.items.push(item);
        }

        self.rebuild_segment_index();
    }

    fn rebuild_segment_index(&mut self) {
        self.segments.clear();
        self.item_start_y.clear();

        self.item_start_y.reserve(self.items.len());
        self.segments.reserve(self.items.len().saturating_mul(2));

        let mut cursor = 0usize;
        let items_len = self.items.len();

        for (idx, item) in self.items.iter().enumerate() {
            let height = item.height();
            self.item_start_y.push(cursor);
            self.segments.push(Segment {
                kind: RowKind::Item { idx },
                start_y: cursor,
                height,
            });
            cursor = cursor.saturating_add(height);

            if idx + 1 < items_len && MESSAGE_SPACING > 0 {
                self.segments.push(Segment {
                    kind: RowKind::Gap,
                    start_y: cursor,
                    height: MESSAGE_SPACING,
                });
                cursor = cursor.saturating_add(MESSAGE_SPACING);
            }
        }

        self.total_content_height = cursor;
    }

    fn first_visible_segment_index(&self, offset: usize) -> usize {
        self.segments
            .partition_point(|segment| segment.start_y.saturating_add(segment.height) <= offset)
    }

    /// Index of the message drawn at `position`, if any
    pub fn item_at(&self, area: Rect, position: Position) -> Option<usize> {
        if !area.contains(position) {
            return None;
        }
        let y = self.state.offset + usize::from(position.y - area.y);
        let segment = self.segments.get(self.first_visible_segment_index(y))?;
        match segment.kind {
            RowKind::Item { idx } if segment.start_y <= y => Some(idx),
            _ => None,
        }
    }

    /// Resolve pending scroll targets and measure visible rows
    fn measure_visible_rows(&mut self, area: Rect) -> Vec<RowMetrics> {
        self.state
            .resolve(self.total_content_height, area.height, &self.item_start_y);

        if self.segments.is_empty() {
            self.state.visible_range = None;
            return Vec::new();
        }

        let viewport_height = usize::from(area.height);
        let offset = self.state.offset;
        let viewport_bottom = offset.saturating_add(viewport_height);
        if viewport_height == 0 {
            self.state.visible_range = None;
            return Vec::new();
        }

        let first_segment_idx = self.first_visible_segment_index(offset);
        let mut rows = Vec::new();
        let mut first_item: Option<(usize, u16)> = None;
        let mut last_item: Option<(usize, u16)> = None;

        let clamp_to_u16 = |value: usize| value.min(usize::from(u16::MAX)) as u16;

        for segment in self.segments.iter().skip(first_segment_idx).copied() {
            if segment.start_y >= viewport_bottom {
                break;
            }

            let segment_bottom = segment.start_y.saturating_add(segment.height);
            let first_visible_line = offset.saturating_sub(segment.start_y);
            let render_end = segment_bottom.min(viewport_bottom);
            let render_h = render_end.saturating_sub(segment.start_y + first_visible_line);
            if render_h == 0 {
                continue;
            }

            if let RowKind::Item { idx } = segment.kind {
                let top = segment.start_y.max(offset) - offset;
                if first_item.is_none() {
                    first_item = Some((idx, clamp_to_u16(top)));
                }
                last_item = Some((idx, clamp_to_u16(top + render_h - 1)));
            }

            rows.push(RowMetrics {
                kind: segment.kind,
                render_h,
                first_visible_line,
            });
        }

        self.state.visible_range = match (first_item, last_item) {
            (Some((first_index, first_y)), Some((last_index, last_y))) => Some(VisibleRange {
                first_index,
                last_index,
                first_y,
                last_y,
            }),
            _ => None,
        };

        rows
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let rows = self.measure_visible_rows(area);
        if rows.is_empty() {
            return;
        }

        let mut y = area.y;
        let bottom = area.bottom();

        for row in &rows {
            if y >= bottom {
                break;
            }

            let row_height = (row.render_h as u16).min(bottom - y);
            match row.kind {
                RowKind::Item { idx } => {
                    let Some(item) = self.items.get(idx) else {
                        continue;
                    };
                    let lines = item
                        .lines
                        .iter()
                        .skip(row.first_visible_line)
                        .take(usize::from(row_height));
                    for (row_idx, line) in lines.enumerate() {
                        buf.set_line(area.x, y + row_idx as u16, line, area.width);
                    }
                }
                RowKind::Gap => {
                    let gap_style = theme.style(Component::ChatListBackground);
                    let gap_line =
                        Line::from(Span::styled(" ".repeat(usize::from(area.width)), gap_style));
                    for dy in 0..row_height {
                        buf.set_line(area.x, y + dy, &gap_line, area.width);
                    }
                }
            }

            y = y.saturating_add(row_height);
        }
    }
}
