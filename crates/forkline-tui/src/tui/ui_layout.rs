//! Layout computation for the viewer frame

use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Clear},
};

/// Computed layout areas for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    /// The conversation path
    pub chat: Rect,
    /// The position minimap on the right edge (zero width when hidden)
    pub minimap: Rect,
    /// The status bar area
    pub status: Rect,
    /// The full terminal area
    pub terminal: Rect,
}

impl UiLayout {
    pub fn compute(size: Rect, minimap_width: u16) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Chat and minimap
                Constraint::Length(1), // Status bar
            ])
            .split(size);

        // Keep at least some room for text on very narrow terminals
        let minimap_width = if rows[0].width > minimap_width.saturating_mul(2) {
            minimap_width
        } else {
            0
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(minimap_width)])
            .split(rows[0]);

        Self {
            chat: columns[0],
            minimap: columns[1],
            status: rows[1],
            terminal: size,
        }
    }

    /// Clear and prepare the background
    pub fn prepare_background(&self, f: &mut Frame, theme: &Theme) {
        f.render_widget(Clear, self.terminal);

        if let Some(bg_color) = theme.get_background_color() {
            let background_block = Block::default().style(Style::default().bg(bg_color));
            f.render_widget(background_block, self.terminal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimap_sits_right_of_the_chat() {
        let layout = UiLayout::compute(Rect::new(0, 0, 80, 24), 10);
        assert_eq!(layout.chat, Rect::new(0, 0, 70, 23));
        assert_eq!(layout.minimap, Rect::new(70, 0, 10, 23));
        assert_eq!(layout.status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn narrow_terminals_drop_the_minimap() {
        let layout = UiLayout::compute(Rect::new(0, 0, 18, 10), 10);
        assert_eq!(layout.minimap.width, 0);
        assert_eq!(layout.chat.width, 18);
    }
}
