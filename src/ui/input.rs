//! Single-line search input with a blinking cursor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::command::Command;
use crate::message::Message;
use crate::ui::Component;

pub struct SearchInput {
    label: String,
    width: u16,
    value: String,
    focused: bool,
    blink_on: bool,
}

impl SearchInput {
    pub fn new(label: impl Into<String>, width: u16) -> Self {
        Self {
            label: label.into(),
            width,
            value: String::new(),
            focused: false,
            blink_on: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Remove the trailing run of non-space characters plus the separating
    /// space, so repeated invocations eat the line word by word.
    fn delete_word(&mut self) {
        while self.value.ends_with(|c: char| c != ' ') {
            self.value.pop();
        }
        if self.value.ends_with(' ') {
            self.value.pop();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => {
                // Submit carries the value; it is not cleared here.
                return Some(Command::Emit(Message::Submit(self.value.clone())));
            }
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => self.delete_word(),
            (KeyCode::Backspace, _) => {
                self.value.pop();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.value.push(c),
            _ => {}
        }
        None
    }
}

impl Component for SearchInput {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Key(key) => return self.handle_key(*key),
            Message::ClearInput => self.value.clear(),
            Message::SetSize { width, .. } => {
                if let Some(width) = width {
                    self.width = *width;
                }
            }
            Message::Focus(_) => {
                self.focused = true;
                self.blink_on = true;
            }
            Message::Blur(_) => {
                self.focused = false;
                self.blink_on = false;
            }
            Message::Tick => {
                // Blink only animates while focused; the value is untouched.
                if self.focused {
                    self.blink_on = !self.blink_on;
                }
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let label_style = Style::default()
            .fg(theme.mauve)
            .add_modifier(Modifier::BOLD);
        let cursor_style = Style::default().fg(theme.base).bg(theme.text);

        let mut spans = vec![
            Span::styled(format!("{}: ", self.label), label_style),
            Span::styled(self.value.clone(), Style::default().fg(theme.text)),
        ];
        if self.blink_on {
            spans.push(Span::styled(" ", cursor_style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(value: &str) -> SearchInput {
        let mut input = SearchInput::new("Search", 40);
        for c in value.chars() {
            input.update(&Message::Key(KeyEvent::from(KeyCode::Char(c))));
        }
        input
    }

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::from(code))
    }

    fn ctrl_w() -> Message {
        Message::Key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL))
    }

    #[test]
    fn printable_characters_append() {
        let input = input_with("bug report");
        assert_eq!(input.value(), "bug report");
    }

    #[test]
    fn backspace_removes_the_last_character() {
        let mut input = input_with("bug");
        input.update(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "bu");
        let mut empty = input_with("");
        empty.update(&key(KeyCode::Backspace));
        assert_eq!(empty.value(), "");
    }

    #[test]
    fn delete_word_eats_the_trailing_word_and_separator() {
        let mut input = input_with("fix the bug");
        input.update(&ctrl_w());
        assert_eq!(input.value(), "fix the");
        input.update(&ctrl_w());
        assert_eq!(input.value(), "fix");
        input.update(&ctrl_w());
        assert_eq!(input.value(), "");
        input.update(&ctrl_w());
        assert_eq!(input.value(), "");
    }

    #[test]
    fn delete_word_after_a_trailing_space() {
        let mut input = input_with("fix ");
        input.update(&ctrl_w());
        assert_eq!(input.value(), "fix");
    }

    #[test]
    fn submit_carries_the_value_without_clearing_it() {
        let mut input = input_with("bug");
        let command = input.update(&key(KeyCode::Enter));
        match command {
            Some(Command::Emit(Message::Submit(value))) => assert_eq!(value, "bug"),
            _ => panic!("expected a Submit emission"),
        }
        assert_eq!(input.value(), "bug");
    }

    #[test]
    fn clear_message_empties_the_value() {
        let mut input = input_with("bug");
        input.update(&Message::ClearInput);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn blink_advances_only_while_focused() {
        let mut input = input_with("a");
        assert!(!input.blink_on);
        input.update(&Message::Tick);
        assert!(!input.blink_on);

        input.update(&Message::Focus(crate::ui::ComponentId::new(0)));
        assert!(input.blink_on);
        input.update(&Message::Tick);
        assert!(!input.blink_on);
        input.update(&Message::Tick);
        assert!(input.blink_on);

        input.update(&Message::Blur(crate::ui::ComponentId::new(0)));
        input.update(&Message::Tick);
        assert!(!input.blink_on);
    }

    #[test]
    fn focus_and_blur_leave_the_value_alone() {
        let mut input = input_with("bug");
        input.update(&Message::Focus(crate::ui::ComponentId::new(0)));
        input.update(&Message::Blur(crate::ui::ComponentId::new(0)));
        assert_eq!(input.value(), "bug");
    }
}
