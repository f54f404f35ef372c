//! Built-in color themes
//!
//! Styles are looked up per component so widgets never hardcode colors.

use std::collections::HashMap;

use forkline_core::preferences::ThemeName;
use ratatui::style::{Color, Modifier, Style};
use strum::Display;

/// All themeable components in the TUI
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Display)]
pub enum Component {
    StatusBar,
    StatusFollowing,
    StatusDetached,

    // Chat list
    ChatListBackground,
    UserMessageRole,
    AssistantMessageRole,
    SystemMessageRole,
    MessageText,
    EditDraft,
    SelectionHighlight,

    // Branch indicator
    BranchIndicator,
    BranchArrowDisabled,

    // Minimap
    MinimapUser,
    MinimapAssistant,
    MinimapVisible,
    MinimapBottom,
    Tooltip,

    // General
    DimText,
    ErrorText,
    NoticeInfo,
    NoticeWarn,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    styles: HashMap<Component, Style>,
    background_color: Option<Color>,
}

impl Theme {
    pub fn for_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => create_dark_theme(),
            ThemeName::Light => create_light_theme(),
            ThemeName::Plain => Self {
                name,
                styles: HashMap::new(),
                background_color: None,
            },
        }
    }

    /// Get a style for a component, falling back to default if not found
    pub fn style(&self, component: Component) -> Style {
        self.styles.get(&component).copied().unwrap_or_default()
    }

    pub fn get_background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn dim_text(&self) -> Style {
        self.style(Component::DimText)
    }
}

impl Default for Theme {
    fn default() -> Self {
        create_dark_theme()
    }
}

fn create_dark_theme() -> Theme {
    let bold = Modifier::BOLD;
    let styles = HashMap::from([
        (Component::StatusBar, Style::default().fg(Color::LightCyan)),
        (
            Component::StatusFollowing,
            Style::default().fg(Color::Green).add_modifier(bold),
        ),
        (
            Component::StatusDetached,
            Style::default().fg(Color::Yellow).add_modifier(bold),
        ),
        (Component::ChatListBackground, Style::default()),
        (
            Component::UserMessageRole,
            Style::default().fg(Color::Blue).add_modifier(bold),
        ),
        (
            Component::AssistantMessageRole,
            Style::default().fg(Color::Green).add_modifier(bold),
        ),
        (
            Component::SystemMessageRole,
            Style::default().fg(Color::Magenta),
        ),
        (Component::MessageText, Style::default()),
        (
            Component::EditDraft,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ),
        (
            Component::SelectionHighlight,
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        (Component::BranchIndicator, Style::default().fg(Color::Cyan)),
        (
            Component::BranchArrowDisabled,
            Style::default().fg(Color::DarkGray),
        ),
        (Component::MinimapUser, Style::default().fg(Color::Blue)),
        (Component::MinimapAssistant, Style::default().fg(Color::Gray)),
        (
            Component::MinimapVisible,
            Style::default().fg(Color::White).add_modifier(bold),
        ),
        (
            Component::MinimapBottom,
            Style::default().fg(Color::Black).bg(Color::LightCyan),
        ),
        (
            Component::Tooltip,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        (Component::DimText, Style::default().fg(Color::DarkGray)),
        (Component::ErrorText, Style::default().fg(Color::Red)),
        (Component::NoticeInfo, Style::default().fg(Color::Cyan)),
        (Component::NoticeWarn, Style::default().fg(Color::Yellow)),
    ]);

    Theme {
        name: ThemeName::Dark,
        styles,
        background_color: None,
    }
}

fn create_light_theme() -> Theme {
    let mut theme = create_dark_theme();
    theme.name = ThemeName::Light;
    theme.background_color = Some(Color::White);

    let overrides = [
        (Component::StatusBar, Style::default().fg(Color::Blue)),
        (Component::MessageText, Style::default().fg(Color::Black)),
        (Component::MinimapAssistant, Style::default().fg(Color::DarkGray)),
        (
            Component::MinimapVisible,
            Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
        ),
        (Component::DimText, Style::default().fg(Color::Gray)),
        (
            Component::Tooltip,
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
    ];
    theme.styles.extend(overrides);
    theme
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_has_no_styling() {
        let theme = Theme::for_name(ThemeName::Plain);
        assert_eq!(theme.style(Component::UserMessageRole), Style::default());
        assert_eq!(theme.get_background_color(), None);
    }

    #[test]
    fn light_theme_overrides_on_top_of_dark() {
        let light = Theme::for_name(ThemeName::Light);
        let dark = Theme::for_name(ThemeName::Dark);
        assert_eq!(
            light.style(Component::UserMessageRole),
            dark.style(Component::UserMessageRole)
        );
        assert_ne!(light.style(Component::DimText), dark.style(Component::DimText));
        assert_eq!(light.get_background_color(), Some(Color::White));
    }
}
