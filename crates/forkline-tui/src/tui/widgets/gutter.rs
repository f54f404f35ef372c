//! Gutter span for the message header: role glyph, spinner, selection mark

use crate::tui::theme::{Component, Theme};
use forkline_core::Role;
use ratatui::{style::Modifier, text::Span};
use std::fmt;

/// Role glyph types for different message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGlyph {
    User,      // ▶
    Assistant, // ◀
    Meta,      // •
}

impl fmt::Display for RoleGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = match self {
            RoleGlyph::User => "▶",
            RoleGlyph::Assistant => "◀",
            RoleGlyph::Meta => "•",
        };
        write!(f, "{glyph}")
    }
}

impl From<Role> for RoleGlyph {
    fn from(role: Role) -> Self {
        match role {
            Role::User => RoleGlyph::User,
            Role::Assistant => RoleGlyph::Assistant,
            Role::System | Role::Data => RoleGlyph::Meta,
        }
    }
}

impl RoleGlyph {
    /// Get the theme component for this role
    pub fn theme_component(&self) -> Component {
        match self {
            RoleGlyph::User => Component::UserMessageRole,
            RoleGlyph::Assistant => Component::AssistantMessageRole,
            RoleGlyph::Meta => Component::SystemMessageRole,
        }
    }
}

pub const GUTTER_WIDTH: u16 = 3;

pub struct Gutter {
    role: RoleGlyph,
    spinner: Option<char>,
    selected: bool,
}

impl Gutter {
    pub fn new(role: impl Into<RoleGlyph>) -> Self {
        Self {
            role: role.into(),
            spinner: None,
            selected: false,
        }
    }

    pub fn with_spinner(mut self, spinner: Option<char>) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn span(&self, theme: &Theme) -> Span<'static> {
        let mut style = theme.style(self.role.theme_component());
        if self.spinner.is_some() {
            style = style.add_modifier(Modifier::BOLD);
        }

        let glyph = match self.spinner {
            Some(spinner) => spinner.to_string(),
            None => self.role.to_string(),
        };
        let marker = if self.selected { '▌' } else { ' ' };

        Span::styled(format!("{marker}{glyph} "), style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn role_glyph_display() {
        assert_eq!(RoleGlyph::User.to_string(), "▶");
        assert_eq!(RoleGlyph::Assistant.to_string(), "◀");
        assert_eq!(RoleGlyph::from(Role::System).to_string(), "•");
    }

    #[test]
    fn span_fills_gutter_width() {
        let theme = Theme::default();
        for gutter in [
            Gutter::new(Role::User),
            Gutter::new(Role::Assistant).with_spinner(Some('⠋')),
            Gutter::new(Role::Data).with_selected(true),
        ] {
            let span = gutter.span(&theme);
            assert_eq!(span.content.width(), usize::from(GUTTER_WIDTH));
        }
    }
}
