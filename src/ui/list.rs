//! Cursor-addressable, viewport-windowed issue list.
//!
//! The viewport is a fixed-height window into the items; navigation moves
//! the cursor and the window follows by the minimum amount needed to keep
//! the cursor visible. Invariants, for `n` items and height `h` (`n > 0`):
//! `0 <= viewport_start <= max(0, n - h)` and
//! `viewport_start <= cursor < viewport_start + h`.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::command::Command;
use crate::github::Issue;
use crate::message::Message;
use crate::ui::Component;

pub struct IssueList {
    width: u16,
    height: u16,
    issues: Vec<Issue>,
    cursor: usize,
    viewport_start: usize,
    focused: bool,
}

impl IssueList {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            issues: Vec::new(),
            cursor: 0,
            viewport_start: 0,
            focused: false,
        }
    }

    /// The item under the cursor. Callers must guard for emptiness before
    /// acting on a selection.
    pub fn selected(&self) -> Option<&Issue> {
        self.issues.get(self.cursor)
    }

    const fn viewport_height(&self) -> usize {
        self.height as usize
    }

    fn max_start(&self) -> usize {
        self.issues.len().saturating_sub(self.viewport_height())
    }

    fn move_down(&mut self) {
        if self.issues.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1).min(self.issues.len() - 1);
        if self.cursor >= self.viewport_start + self.viewport_height() {
            self.viewport_start = (self.viewport_start + 1).min(self.max_start());
        }
    }

    fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        if self.cursor < self.viewport_start {
            self.viewport_start = self.cursor;
        }
    }

    fn jump_window_top(&mut self) {
        self.cursor = self.viewport_start;
    }

    fn jump_window_bottom(&mut self) {
        if self.issues.is_empty() {
            return;
        }
        let bottom = self.viewport_start + self.viewport_height().saturating_sub(1);
        self.cursor = bottom.min(self.issues.len() - 1);
    }

    fn jump_document_top(&mut self) {
        self.cursor = 0;
        self.viewport_start = 0;
    }

    fn jump_document_bottom(&mut self) {
        if self.issues.is_empty() {
            return;
        }
        self.cursor = self.issues.len() - 1;
        self.viewport_start = self.max_start();
    }

    /// Re-establish the invariants after items or geometry changed out from
    /// under the cursor.
    fn clamp(&mut self) {
        if self.issues.is_empty() {
            self.cursor = 0;
            self.viewport_start = 0;
            return;
        }
        self.cursor = self.cursor.min(self.issues.len() - 1);
        self.viewport_start = self.viewport_start.min(self.max_start());
        if self.cursor < self.viewport_start {
            self.viewport_start = self.cursor;
        } else if self.cursor >= self.viewport_start + self.viewport_height() {
            self.viewport_start = self.cursor + 1 - self.viewport_height();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('H') => self.jump_window_top(),
            KeyCode::Char('L') => self.jump_window_bottom(),
            KeyCode::Char('g') => self.jump_document_top(),
            KeyCode::Char('G') => self.jump_document_bottom(),
            KeyCode::Enter => {
                if let Some(issue) = self.selected() {
                    return Some(Command::Emit(Message::ItemSelected(issue.clone())));
                }
            }
            _ => {}
        }
        None
    }
}

impl Component for IssueList {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Key(key) => return self.handle_key(*key),
            Message::SetItems(issues) => {
                // Content changes leave cursor and viewport where they are;
                // callers send ResetViewport when semantics require it.
                self.issues = issues.clone();
                self.clamp();
            }
            Message::ResetViewport => {
                self.cursor = 0;
                self.viewport_start = 0;
            }
            Message::SetSize { width, height } => {
                if let Some(width) = width {
                    self.width = *width;
                }
                if let Some(height) = height {
                    self.height = *height;
                }
                self.clamp();
            }
            Message::Focus(_) => self.focused = true,
            Message::Blur(_) => self.focused = false,
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = area.width.min(self.width) as usize;
        let end = (self.viewport_start + self.viewport_height()).min(self.issues.len());

        let lines: Vec<Line> = self.issues[self.viewport_start..end]
            .iter()
            .enumerate()
            .map(|(offset, issue)| {
                let mut row = format!("#{} {}", issue.number, issue.title);
                if row.chars().count() > width {
                    row = row.chars().take(width.saturating_sub(1)).collect();
                }
                let style = if self.viewport_start + offset == self.cursor {
                    Style::default()
                        .bg(theme.surface1)
                        .fg(theme.lavender)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                Line::from(Span::styled(row, style))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }
}
