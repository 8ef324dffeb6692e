//! Scrollable pane of rendered markdown.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::warn;

use crate::Theme;
use crate::command::Command;
use crate::markdown;
use crate::message::Message;
use crate::ui::Component;

pub struct DocViewer {
    width: u16,
    height: u16,
    theme: Theme,
    /// Raw markdown of the current content, kept so a width change can
    /// re-render with fresh wrapping.
    raw: Option<String>,
    content: Text<'static>,
    scroll: usize,
    focused: bool,
    render_error: Option<String>,
}

impl DocViewer {
    pub fn new(width: u16, height: u16, theme: Theme) -> Self {
        Self {
            width,
            height,
            theme,
            raw: None,
            content: Text::default(),
            scroll: 0,
            focused: false,
            render_error: None,
        }
    }

    /// Columns available for text once the left border is accounted for.
    const fn text_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }

    fn visible_height(&self) -> usize {
        self.height as usize
    }

    fn max_scroll(&self) -> usize {
        self.content
            .lines
            .len()
            .saturating_sub(self.visible_height())
    }

    fn set_content(&mut self, raw: &str) {
        match markdown::render(raw, self.text_width(), &self.theme) {
            Ok(text) => {
                self.content = text;
                self.raw = Some(raw.to_string());
                self.render_error = None;
                // Offset only resets on explicit top/bottom jumps; clamp in
                // case the new document is shorter.
                self.scroll = self.scroll.min(self.max_scroll());
            }
            Err(error) => {
                // Prior content stays; the failure is surfaced, not fatal.
                warn!(%error, "markdown rendering failed");
                self.render_error = Some(error.to_string());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j') | KeyCode::Down, _) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            (KeyCode::Char('k') | KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.scroll = (self.scroll + self.visible_height() / 2).min(self.max_scroll());
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.scroll = self.scroll.saturating_sub(self.visible_height() / 2);
            }
            (KeyCode::Char('g'), _) => self.scroll = 0,
            (KeyCode::Char('G'), _) => self.scroll = self.max_scroll(),
            _ => {}
        }
    }
}

impl Component for DocViewer {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Key(key) => self.handle_key(*key),
            Message::SetContent(raw) => self.set_content(raw),
            Message::SetSize { width, height } => {
                let width_changed = width.is_some_and(|w| w != self.width);
                if let Some(width) = width {
                    self.width = *width;
                }
                if let Some(height) = height {
                    self.height = *height;
                }
                if width_changed {
                    if let Some(raw) = self.raw.take() {
                        let scroll = self.scroll;
                        self.set_content(&raw);
                        self.scroll = scroll.min(self.max_scroll());
                    }
                }
            }
            Message::Focus(_) => self.focused = true,
            Message::Blur(_) => self.focused = false,
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.focused {
            Style::default().fg(theme.lavender)
        } else {
            Style::default().fg(theme.overlay0)
        };
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_type(theme.border_type)
            .border_style(border_style);

        let mut content = self.content.clone();
        if let Some(error) = &self.render_error {
            let notice = Line::styled(
                format!("content could not be rendered: {error}"),
                Style::default().fg(theme.red),
            );
            content.lines.insert(0, notice);
        }

        let scroll = u16::try_from(self.scroll.min(self.max_scroll())).unwrap_or(u16::MAX);
        let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer_with_lines(n: usize, height: u16) -> DocViewer {
        let mut viewer = DocViewer::new(40, height, Theme::mocha());
        let doc: String = (0..n).map(|i| format!("line {i}\n\n")).collect();
        viewer.update(&Message::SetContent(doc));
        viewer
    }

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::from(code))
    }

    #[test]
    fn scrolling_is_clamped_to_the_document() {
        let mut viewer = viewer_with_lines(10, 5);
        for _ in 0..100 {
            viewer.update(&key(KeyCode::Char('j')));
        }
        assert_eq!(viewer.scroll, viewer.max_scroll());
        for _ in 0..100 {
            viewer.update(&key(KeyCode::Char('k')));
        }
        assert_eq!(viewer.scroll, 0);
    }

    #[test]
    fn top_and_bottom_jumps_are_explicit() {
        let mut viewer = viewer_with_lines(20, 5);
        viewer.update(&key(KeyCode::Char('G')));
        assert_eq!(viewer.scroll, viewer.max_scroll());
        viewer.update(&key(KeyCode::Char('g')));
        assert_eq!(viewer.scroll, 0);
    }

    #[test]
    fn resize_preserves_the_scroll_offset() {
        let mut viewer = viewer_with_lines(30, 5);
        viewer.update(&key(KeyCode::Char('j')));
        viewer.update(&key(KeyCode::Char('j')));
        let before = viewer.scroll;
        viewer.update(&Message::SetSize {
            width: Some(60),
            height: None,
        });
        assert_eq!(viewer.scroll, before);
    }

    #[test]
    fn oversized_content_keeps_the_previous_document() {
        let mut viewer = DocViewer::new(40, 5, Theme::mocha());
        viewer.update(&Message::SetContent("hello".to_string()));
        let before = viewer.content.clone();

        let oversized = "x".repeat(markdown::MAX_INPUT_BYTES + 1);
        viewer.update(&Message::SetContent(oversized));

        assert_eq!(viewer.content, before);
        assert!(viewer.render_error.is_some());
    }

    #[test]
    fn new_content_replaces_wholesale() {
        let mut viewer = viewer_with_lines(4, 10);
        viewer.update(&Message::SetContent("short".to_string()));
        assert!(viewer.render_error.is_none());
        assert!(viewer.content.lines.len() < 8);
    }
}
