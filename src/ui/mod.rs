//! UI building blocks.
//!
//! - [`Component`] - a self-contained unit of UI state and behavior
//! - [`ComponentGroup`] - ordered components with single-focus routing
//! - concrete components: issue list, document viewer, search input, spinner

mod group;
pub mod input;
pub mod list;
pub mod spinner;
pub mod viewer;

use ratatui::Frame;
use ratatui::layout::Rect;

pub use group::ComponentGroup;

use crate::Theme;
use crate::command::Command;
use crate::message::Message;

/// Opaque component identity, issued by the owning [`ComponentGroup`] at
/// insertion. Unique within that group's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u32);

impl ComponentId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// A stateful, identifiable unit of UI.
///
/// Updates mutate only the component's own state and may describe deferred
/// work as a [`Command`]; they never touch other components directly. Focus
/// arrives exclusively as [`Message::Focus`] / [`Message::Blur`] from the
/// owning group - no other lifecycle signal implies focus.
pub trait Component {
    /// Startup command, issued once when the owning group initializes.
    fn init(&mut self) -> Option<Command> {
        None
    }

    /// Handle one message.
    fn update(&mut self, msg: &Message) -> Option<Command>;

    /// Draw into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
