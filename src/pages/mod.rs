//! Top-level pages.
//!
//! A page is a [`Component`](crate::ui::Component) that wraps its own
//! [`ComponentGroup`](crate::ui::ComponentGroup) and a Loading/Ready state
//! machine. Gaining focus triggers a fresh fetch; the result re-enters the
//! event loop as a message and moves the page to Ready.

pub mod issues;
pub mod repo;

/// Fetch lifecycle of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Ready,
}
