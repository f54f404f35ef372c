//! Position minimap for the displayed path.
//!
//! One marker per message, sized by content length, so long answers stand
//! out at a glance. Markers double as jump targets, and the last row holds
//! the scroll-to-bottom affordance whenever the view is not at the bottom.

use forkline_core::preferences::MinimapPreferences;
use forkline_core::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use super::viewport_state::VisibleRange;
use crate::tui::theme::{Component, Theme};

/// Column width of the minimap including one cell of padding on each side
pub const MINIMAP_WIDTH: u16 = 10;
const MAX_BAR_CELLS: u16 = MINIMAP_WIDTH - 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapConfig {
    pub min_marker: f64,
    pub max_marker: f64,
    pub per_char: f64,
    pub preview_chars: usize,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self::from(&MinimapPreferences::default())
    }
}

impl From<&MinimapPreferences> for MinimapConfig {
    fn from(prefs: &MinimapPreferences) -> Self {
        let min_marker = f64::from(prefs.min_marker);
        Self {
            min_marker,
            max_marker: f64::from(prefs.max_marker).max(min_marker),
            per_char: prefs.per_char,
            preview_chars: prefs.preview_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimapMarker {
    pub index: usize,
    pub role: Role,
    /// Marker length in the same units as the config bounds
    pub length: f64,
    pub preview: String,
}

impl MinimapMarker {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Bar length in terminal cells, scaled so `max_marker` fills the column
    pub fn cells(&self, config: &MinimapConfig) -> u16 {
        if config.max_marker <= 0.0 {
            return 1;
        }
        let scaled = (self.length / config.max_marker) * f64::from(MAX_BAR_CELLS);
        (scaled.round() as u16).clamp(1, MAX_BAR_CELLS)
    }
}

pub fn markers(path: &[&Message], config: &MinimapConfig) -> Vec<MinimapMarker> {
    path.iter()
        .enumerate()
        .map(|(index, message)| {
            let length = (message.content_chars() as f64 * config.per_char)
                .clamp(config.min_marker, config.max_marker);
            let preview = if message.content.trim().is_empty() {
                "Empty message".to_string()
            } else {
                message.preview(config.preview_chars)
            };
            MinimapMarker {
                index,
                role: message.role,
                length,
                preview,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimapHit {
    Marker(usize),
    Bottom,
}

/// Rows of the minimap: a window of markers plus the affordance row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimapLayout {
    /// Index of the marker drawn on the first row
    pub first: usize,
    /// Number of marker rows drawn
    pub rows: usize,
}

impl MinimapLayout {
    /// Window the markers so the visible range stays in view
    pub fn compute(area: Rect, marker_count: usize, visible: Option<VisibleRange>) -> Self {
        let capacity = usize::from(area.height.saturating_sub(1));
        if marker_count <= capacity {
            return Self {
                first: 0,
                rows: marker_count,
            };
        }

        let center = visible.map_or(marker_count - 1, |v| (v.first_index + v.last_index) / 2);
        let first = center
            .saturating_sub(capacity / 2)
            .min(marker_count - capacity);
        Self {
            first,
            rows: capacity,
        }
    }

    pub fn row_of(&self, index: usize) -> Option<usize> {
        (self.first..self.first + self.rows)
            .contains(&index)
            .then(|| index - self.first)
    }
}

/// Map a click inside the minimap to what it should do
pub fn hit_test(
    area: Rect,
    layout: MinimapLayout,
    at_bottom: bool,
    position: Position,
) -> Option<MinimapHit> {
    if !area.contains(position) {
        return None;
    }
    let row = usize::from(position.y - area.y);
    if row < layout.rows {
        return Some(MinimapHit::Marker(layout.first + row));
    }
    let bottom_row = usize::from(area.height.saturating_sub(1));
    (!at_bottom && row == bottom_row).then_some(MinimapHit::Bottom)
}

pub struct Minimap<'a> {
    markers: &'a [MinimapMarker],
    config: &'a MinimapConfig,
    visible: Option<VisibleRange>,
    at_bottom: bool,
    hovered: Option<usize>,
    theme: &'a Theme,
}

impl<'a> Minimap<'a> {
    pub fn new(markers: &'a [MinimapMarker], config: &'a MinimapConfig, theme: &'a Theme) -> Self {
        Self {
            markers,
            config,
            visible: None,
            at_bottom: true,
            hovered: None,
            theme,
        }
    }

    pub fn with_visible_range(mut self, visible: Option<VisibleRange>) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_at_bottom(mut self, at_bottom: bool) -> Self {
        self.at_bottom = at_bottom;
        self
    }

    pub fn with_hovered(mut self, hovered: Option<usize>) -> Self {
        self.hovered = hovered;
        self
    }

    fn marker_style(&self, marker: &MinimapMarker) -> Style {
        let mut style = if marker.is_user() {
            self.theme.style(Component::MinimapUser)
        } else {
            self.theme.style(Component::MinimapAssistant)
        };
        if self.visible.is_some_and(|v| v.contains(marker.index)) {
            let visible = self.theme.style(Component::MinimapVisible);
            // keep the role color, take the emphasis
            style = style.add_modifier(visible.add_modifier);
        }
        if self.hovered == Some(marker.index) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }
}

impl Widget for Minimap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.markers.is_empty() || area.height == 0 || area.width < 3 {
            return;
        }

        let layout = MinimapLayout::compute(area, self.markers.len(), self.visible);
        let bar_x = area.x + 1;
        let bar_width = area.width.saturating_sub(2);

        for (row, marker) in self.markers[layout.first..layout.first + layout.rows]
            .iter()
            .enumerate()
        {
            let visible = self.visible.is_some_and(|v| v.contains(marker.index));
            let glyph = if visible { "━" } else { "─" };
            let cells = marker.cells(self.config).min(bar_width);
            let line = Line::from(Span::styled(
                glyph.repeat(usize::from(cells)),
                self.marker_style(marker),
            ));
            buf.set_line(bar_x, area.y + row as u16, &line, bar_width);
        }

        if !self.at_bottom {
            let label = " ↓ ";
            let x = area.x + area.width.saturating_sub(label.width() as u16) / 2;
            let line = Line::from(Span::styled(label, self.theme.style(Component::MinimapBottom)));
            buf.set_line(x, area.bottom() - 1, &line, area.width);
        }
    }
}

/// One-line preview drawn next to a hovered marker
pub struct MinimapTooltip<'a> {
    marker: &'a MinimapMarker,
    theme: &'a Theme,
}

impl<'a> MinimapTooltip<'a> {
    pub fn new(marker: &'a MinimapMarker, theme: &'a Theme) -> Self {
        Self { marker, theme }
    }

    pub fn text(&self) -> String {
        format!(" {}: {} ", self.marker.role, self.marker.preview)
    }

    pub fn width(&self) -> u16 {
        self.text().width().min(usize::from(u16::MAX)) as u16
    }
}

impl Widget for MinimapTooltip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(self.text(), self.theme.style(Component::Tooltip)));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_core::test_utils;
    use rstest::rstest;

    fn path_markers(lengths: &[usize]) -> Vec<MinimapMarker> {
        let messages = test_utils::with_lengths(lengths);
        let path: Vec<&Message> = messages.iter().collect();
        markers(&path, &MinimapConfig::default())
    }

    #[rstest]
    #[case::short_is_floored(10, 12.0)]
    #[case::proportional(100, 20.0)]
    #[case::long_is_capped(5000, 32.0)]
    fn marker_length_is_clamped(#[case] chars: usize, #[case] expected: f64) {
        let markers = path_markers(&[chars]);
        assert!((markers[0].length - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn previews_use_first_fifty_chars() {
        let mut messages = test_utils::linear(2);
        messages[0].content = "a".repeat(80);
        messages[1].content = "   ".to_string();
        let path: Vec<&Message> = messages.iter().collect();

        let markers = markers(&path, &MinimapConfig::default());
        assert_eq!(markers[0].preview.chars().count(), 50);
        assert_eq!(markers[1].preview, "Empty message");
        assert!(markers[0].is_user());
        assert!(!markers[1].is_user());
    }

    #[test]
    fn cells_scale_to_column() {
        let config = MinimapConfig::default();
        let markers = path_markers(&[0, 5000]);
        assert_eq!(markers[0].cells(&config), 3);
        assert_eq!(markers[1].cells(&config), MAX_BAR_CELLS);
    }

    #[test]
    fn window_follows_visible_range() {
        let area = Rect::new(0, 0, MINIMAP_WIDTH, 11);
        assert_eq!(
            MinimapLayout::compute(area, 4, None),
            MinimapLayout { first: 0, rows: 4 }
        );

        let at_end = MinimapLayout::compute(area, 40, None);
        assert_eq!(at_end, MinimapLayout { first: 30, rows: 10 });

        let visible = VisibleRange {
            first_index: 12,
            last_index: 14,
            first_y: 0,
            last_y: 0,
        };
        let middle = MinimapLayout::compute(area, 40, Some(visible));
        assert_eq!(middle.first, 8);
        assert_eq!(middle.row_of(13), Some(5));
        assert_eq!(middle.row_of(2), None);
    }

    #[test]
    fn clicks_map_to_markers_and_bottom() {
        let area = Rect::new(70, 0, MINIMAP_WIDTH, 6);
        let layout = MinimapLayout::compute(area, 3, None);

        assert_eq!(
            hit_test(area, layout, false, Position::new(72, 1)),
            Some(MinimapHit::Marker(1))
        );
        assert_eq!(
            hit_test(area, layout, false, Position::new(72, 5)),
            Some(MinimapHit::Bottom)
        );
        assert_eq!(hit_test(area, layout, true, Position::new(72, 5)), None);
        assert_eq!(hit_test(area, layout, false, Position::new(72, 4)), None);
        assert_eq!(hit_test(area, layout, false, Position::new(10, 1)), None);
    }

    #[test]
    fn bottom_affordance_only_when_scrolled_up() {
        let theme = Theme::default();
        let config = MinimapConfig::default();
        let markers = path_markers(&[10, 400]);
        let area = Rect::new(0, 0, MINIMAP_WIDTH, 5);

        let render = |at_bottom: bool| {
            let mut buf = Buffer::empty(area);
            Minimap::new(&markers, &config, &theme)
                .with_at_bottom(at_bottom)
                .render(area, &mut buf);
            buf
        };

        let scrolled = render(false);
        assert_eq!(scrolled[(4, 4)].symbol(), "↓");
        assert_eq!(scrolled[(1, 0)].symbol(), "─");
        assert_eq!(scrolled[(3, 0)].symbol(), "─");
        assert_eq!(scrolled[(4, 0)].symbol(), " ");
        assert_eq!(scrolled[(8, 1)].symbol(), "─");

        let pinned = render(true);
        assert_eq!(pinned[(4, 4)].symbol(), " ");
    }

    #[test]
    fn tooltip_shows_role_and_preview() {
        let theme = Theme::default();
        let markers = path_markers(&[3]);
        let tooltip = MinimapTooltip::new(&markers[0], &theme);
        assert_eq!(tooltip.text(), " user: xxx ");
        assert_eq!(tooltip.width(), 11);
    }
}
