//! Loading spinner that animates only while focused.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::command::Command;
use crate::message::Message;
use crate::ui::Component;

pub struct Spinner {
    throbber_state: ThrobberState,
    label: String,
    focused: bool,
}

impl Spinner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            label: label.into(),
            focused: false,
        }
    }
}

impl Component for Spinner {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Focus(_) => self.focused = true,
            Message::Blur(_) => self.focused = false,
            Message::Tick => {
                if self.focused {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .label(self.label.clone())
            .throbber_style(Style::default().fg(theme.lavender))
            .style(Style::default().fg(theme.subtext1));

        // Throbber glyph plus a space plus the label.
        let width = u16::try_from(self.label.len()).unwrap_or(u16::MAX).saturating_add(2);
        let area = area.centered(Constraint::Length(width), Constraint::Length(1));

        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
