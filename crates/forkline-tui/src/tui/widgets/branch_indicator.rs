//! "‹ k / n ›" switcher shown on messages that have alternatives

use forkline_core::tree::{BranchPosition, Direction};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::{Component, Theme};

pub struct BranchIndicator<'a> {
    position: BranchPosition,
    theme: &'a Theme,
}

impl<'a> BranchIndicator<'a> {
    /// `None` where the conversation does not fork at this message
    pub fn new(position: Option<BranchPosition>, theme: &'a Theme) -> Option<Self> {
        position
            .filter(BranchPosition::is_visible)
            .map(|position| Self { position, theme })
    }

    fn arrow(&self, glyph: &'static str, direction: Direction) -> Span<'static> {
        let component = if self.position.can_move(direction) {
            Component::BranchIndicator
        } else {
            Component::BranchArrowDisabled
        };
        Span::styled(glyph, self.theme.style(component))
    }

    pub fn spans(&self) -> Vec<Span<'static>> {
        vec![
            self.arrow("‹", Direction::Prev),
            Span::styled(
                format!(" {} ", self.position),
                self.theme.style(Component::BranchIndicator),
            ),
            self.arrow("›", Direction::Next),
        ]
    }

    pub fn width(&self) -> usize {
        self.spans().iter().map(|s| s.content.width()).sum()
    }
}

impl Widget for BranchIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(self.spans());
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rendered(position: BranchPosition, theme: &Theme) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 1));
        if let Some(indicator) = BranchIndicator::new(Some(position), theme) {
            indicator.render(buf.area, &mut buf);
        }
        buf
    }

    #[rstest]
    #[case(1, 1, None)]
    #[case(1, 3, Some("‹ 1 / 3 ›   "))]
    #[case(3, 3, Some("‹ 3 / 3 ›   "))]
    fn shows_position_only_when_forked(
        #[case] position: usize,
        #[case] total: usize,
        #[case] expected: Option<&str>,
    ) {
        let theme = Theme::default();
        let position = BranchPosition { position, total };
        assert_eq!(
            BranchIndicator::new(Some(position), &theme).is_some(),
            expected.is_some()
        );

        if let Some(expected) = expected {
            let buf = rendered(position, &theme);
            let text: String = buf.content.iter().map(|c| c.symbol()).collect();
            assert_eq!(text, expected);
        }
    }

    #[test]
    fn arrows_dim_at_the_ends() {
        let theme = Theme::default();
        let enabled = theme.style(Component::BranchIndicator);
        let disabled = theme.style(Component::BranchArrowDisabled);

        let first = rendered(BranchPosition { position: 1, total: 2 }, &theme);
        assert_eq!(first[(0, 0)].fg, disabled.fg.unwrap_or_default());
        assert_eq!(first[(8, 0)].fg, enabled.fg.unwrap_or_default());

        let last = rendered(BranchPosition { position: 2, total: 2 }, &theme);
        assert_eq!(last[(0, 0)].fg, enabled.fg.unwrap_or_default());
        assert_eq!(last[(8, 0)].fg, disabled.fg.unwrap_or_default());
    }

    #[test]
    fn width_counts_display_columns() {
        let theme = Theme::default();
        let indicator =
            BranchIndicator::new(Some(BranchPosition { position: 2, total: 10 }), &theme);
        assert_eq!(indicator.map(|i| i.width()), Some(10));
    }
}
