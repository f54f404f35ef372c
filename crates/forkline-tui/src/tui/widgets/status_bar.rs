//! Status bar widget for follow state, notices and the active leaf

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::follow::FollowMode;
use crate::tui::theme::{Component, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            text: text.into(),
        }
    }
}

pub struct StatusBar<'a> {
    mode: FollowMode,
    loading: bool,
    message_count: usize,
    active_leaf: Option<&'a str>,
    notice: Option<&'a Notice>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: FollowMode, message_count: usize, theme: &'a Theme) -> Self {
        Self {
            mode,
            loading: false,
            message_count,
            active_leaf: None,
            notice: None,
            theme,
        }
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_active_leaf(mut self, active_leaf: Option<&'a str>) -> Self {
        self.active_leaf = active_leaf;
        self
    }

    pub fn with_notice(mut self, notice: Option<&'a Notice>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = self.theme.style(Component::StatusBar);

        let (label, component) = match self.mode {
            FollowMode::Following => (" FOLLOW ", Component::StatusFollowing),
            FollowMode::Detached => (" DETACHED ", Component::StatusDetached),
        };
        let mut left_spans = vec![Span::styled(label, self.theme.style(component))];
        if self.loading {
            left_spans.push(Span::styled("streaming… ", self.theme.dim_text()));
        }
        if let Some(notice) = self.notice {
            let component = match notice.level {
                NoticeLevel::Info => Component::NoticeInfo,
                NoticeLevel::Warn => Component::NoticeWarn,
            };
            left_spans.push(Span::styled(
                notice.text.clone(),
                self.theme.style(component),
            ));
        }
        Paragraph::new(Line::from(left_spans))
            .style(style)
            .alignment(Alignment::Left)
            .render(area, buf);

        let mut right_spans = vec![Span::raw(format!("{} messages", self.message_count))];
        if let Some(leaf) = self.active_leaf {
            right_spans.push(Span::styled(" │ ", self.theme.dim_text()));
            right_spans.push(Span::raw(format!("leaf {leaf} ")));
        } else {
            right_spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(right_spans))
            .style(style)
            .alignment(Alignment::Right)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn shows_mode_notice_and_leaf() {
        let theme = Theme::default();
        let notice = Notice::warn("no next branch");
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new(FollowMode::Detached, 4, &theme)
            .with_notice(Some(&notice))
            .with_active_leaf(Some("m3"))
            .render(area, &mut buf);

        let text = row(&buf);
        assert!(text.starts_with(" DETACHED no next branch"));
        assert!(text.ends_with("4 messages │ leaf m3 "));
    }

    #[test]
    fn streaming_marker_only_while_loading() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 1);

        let mut idle = Buffer::empty(area);
        StatusBar::new(FollowMode::Following, 0, &theme).render(area, &mut idle);
        assert!(!row(&idle).contains("streaming"));

        let mut busy = Buffer::empty(area);
        StatusBar::new(FollowMode::Following, 0, &theme)
            .with_loading(true)
            .render(area, &mut busy);
        assert!(row(&busy).starts_with(" FOLLOW streaming…"));
    }
}
