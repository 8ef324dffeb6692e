//! The closed message set that flows through the dispatch loop.
//!
//! Every state change in the UI happens by handling one of these, on the
//! single event loop. Asynchronous work re-enters the loop as a message.

use crossterm::event::KeyEvent;

use crate::github::{Issue, IssueBatch};
use crate::ui::ComponentId;

#[derive(Debug, Clone)]
pub enum Message {
    /// A key event forwarded from the terminal.
    Key(KeyEvent),
    /// Periodic animation tick.
    Tick,

    /// Delivered by a `ComponentGroup` to the member gaining focus.
    /// `focus_on` is the only producer of this pair.
    Focus(ComponentId),
    /// Delivered by a `ComponentGroup` to every member losing focus.
    Blur(ComponentId),

    /// New page geometry from the shell.
    Resize { width: u16, height: u16 },
    /// Component geometry change; `None` leaves that dimension untouched.
    SetSize {
        width: Option<u16>,
        height: Option<u16>,
    },

    /// Replace the list contents. Does not touch cursor or viewport.
    SetItems(Vec<Issue>),
    /// Snap the list cursor and viewport back to the top.
    ResetViewport,
    /// The list activated the item under its cursor.
    ItemSelected(Issue),

    /// Replace the viewer content with freshly rendered markdown.
    SetContent(String),

    /// Empty the text input.
    ClearInput,
    /// The text input submitted its current value.
    Submit(String),

    /// An issues fetch was started; the page shows its loading state.
    IssuesLoading,
    /// An issues fetch finished. `seq` identifies the request so stale
    /// results can be discarded.
    IssuesFetched {
        seq: u64,
        result: Result<IssueBatch, String>,
    },

    /// A README fetch was started.
    ReadmeLoading,
    /// A README fetch finished.
    ReadmeFetched {
        seq: u64,
        result: Result<String, String>,
    },
}
