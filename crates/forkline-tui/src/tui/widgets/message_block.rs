//! Line layout for a single message in the chat viewport
//!
//! A block is a header line (gutter, role, branch switcher) followed by the
//! wrapped content. Content is shown as plain text.

use std::hash::{DefaultHasher, Hash, Hasher};

use forkline_core::tree::BranchPosition;
use forkline_core::{Message, MessageStatus};
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use super::branch_indicator::BranchIndicator;
use super::gutter::{GUTTER_WIDTH, Gutter, RoleGlyph};
use crate::tui::theme::{Component, Theme};

/// Everything that affects how one message is drawn
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub branch: Option<BranchPosition>,
    pub selected: bool,
    /// Draft text when this message is being edited
    pub draft: Option<&'a str>,
    pub spinner: Option<char>,
    pub show_timestamp: bool,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            message,
            branch: None,
            selected: false,
            draft: None,
            spinner: None,
            show_timestamp: false,
        }
    }

    /// Stable key over every input that changes the rendered lines
    pub fn cache_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        let message = self.message;
        message.id.hash(&mut hasher);
        message.role.hash(&mut hasher);
        message.content.hash(&mut hasher);
        message.status.hash(&mut hasher);
        message.model.hash(&mut hasher);
        message.error.hash(&mut hasher);
        message.created_at.hash(&mut hasher);
        self.branch.map(|b| (b.position, b.total)).hash(&mut hasher);
        self.selected.hash(&mut hasher);
        self.draft.hash(&mut hasher);
        self.spinner.hash(&mut hasher);
        self.show_timestamp.hash(&mut hasher);
        hasher.finish()
    }
}

pub fn render_lines(view: &MessageView<'_>, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![header_line(view, width, theme)];
    let body_width = usize::from(width.saturating_sub(GUTTER_WIDTH)).max(1);
    let indent = " ".repeat(usize::from(GUTTER_WIDTH));

    let (text, style) = match view.draft {
        Some(draft) => (format!("{draft}▏"), theme.style(Component::EditDraft)),
        None => (
            view.message.content.clone(),
            theme.style(Component::MessageText),
        ),
    };

    if text.trim().is_empty() && view.draft.is_none() {
        let placeholder = if view.message.is_in_progress() {
            "…"
        } else {
            "(empty)"
        };
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(placeholder, theme.dim_text()),
        ]));
    } else {
        for source_line in text.lines() {
            if source_line.is_empty() {
                lines.push(Line::from(indent.clone()));
                continue;
            }
            for wrapped in textwrap::wrap(source_line, body_width) {
                lines.push(Line::from(vec![
                    Span::raw(indent.clone()),
                    Span::styled(wrapped.into_owned(), style),
                ]));
            }
        }
    }

    if let Some(error) = &view.message.error {
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(format!("error: {error}"), theme.style(Component::ErrorText)),
        ]));
    }

    lines
}

fn header_line(view: &MessageView<'_>, width: u16, theme: &Theme) -> Line<'static> {
    let message = view.message;
    let glyph = RoleGlyph::from(message.role);
    let mut role_style = theme.style(glyph.theme_component());
    if view.selected {
        role_style = role_style.patch(theme.style(Component::SelectionHighlight));
    }

    let mut left = vec![
        Gutter::new(glyph)
            .with_spinner(view.spinner)
            .with_selected(view.selected)
            .span(theme),
        Span::styled(message.role.to_string(), role_style),
    ];
    if let Some(model) = &message.model {
        left.push(Span::styled(format!(" · {model}"), theme.dim_text()));
    }
    if view.show_timestamp {
        if let Some(created_at) = message.created_at {
            left.push(Span::styled(
                format!(" · {}", created_at.format("%Y-%m-%d %H:%M")),
                theme.dim_text(),
            ));
        }
    }
    match message.status {
        Some(MessageStatus::Error) => {
            left.push(Span::styled(" · failed", theme.style(Component::ErrorText)));
        }
        Some(MessageStatus::Pending | MessageStatus::Streaming) => {
            left.push(Span::styled(" · streaming", theme.dim_text()));
        }
        _ => {}
    }
    if view.draft.is_some() {
        left.push(Span::styled(
            " · editing (enter to fork, esc to cancel)",
            theme.style(Component::EditDraft),
        ));
    }

    let Some(indicator) = BranchIndicator::new(view.branch, theme) else {
        return Line::from(left);
    };

    let left_width: usize = left.iter().map(|s| s.content.width()).sum();
    let padding = usize::from(width)
        .saturating_sub(left_width)
        .saturating_sub(indicator.width())
        .max(1);
    left.push(Span::styled(" ".repeat(padding), Style::default()));
    left.extend(indicator.spans());
    Line::from(left)
}
