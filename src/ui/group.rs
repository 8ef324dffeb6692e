//! Single-focus component routing.
//!
//! A [`ComponentGroup`] owns an ordered set of components (insertion order is
//! the tab order) and tracks which one, if any, is focused. All message
//! dispatch and every focus transfer go through the group, so the Blur/Focus
//! pair is always emitted together and at most one member believes it is
//! focused.

use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::trace;

use crate::Theme;
use crate::command::{self, Command};
use crate::message::Message;
use crate::ui::{Component, ComponentId};

struct Slot {
    id: ComponentId,
    component: Box<dyn Component>,
}

#[derive(Default)]
pub struct ComponentGroup {
    slots: Vec<Slot>,
    focus: Option<usize>,
    next_id: u32,
}

impl ComponentGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component at the end of the tab order and issue its id.
    pub fn insert(&mut self, component: Box<dyn Component>) -> ComponentId {
        let id = ComponentId::new(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, component });
        id
    }

    /// Initialize every member; init commands are batched, not sequenced.
    pub fn init(&mut self) -> Option<Command> {
        let commands: Vec<_> = self
            .slots
            .iter_mut()
            .map(|slot| slot.component.init())
            .collect();
        command::batch(commands)
    }

    /// Dispatch to the member with the given id. Unknown ids are a silent
    /// no-op: a stale child id must not take the application down.
    pub fn dispatch_to_id(&mut self, id: ComponentId, msg: &Message) -> Option<Command> {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => slot.component.update(msg),
            None => {
                trace!(?id, "dispatch to unknown component id ignored");
                None
            }
        }
    }

    /// Dispatch to every member, batching all resulting commands.
    pub fn dispatch_to_all(&mut self, msg: &Message) -> Option<Command> {
        let commands: Vec<_> = self
            .slots
            .iter_mut()
            .map(|slot| slot.component.update(msg))
            .collect();
        command::batch(commands)
    }

    /// Dispatch to the focused member; no-op when nothing is focused.
    pub fn dispatch_to_focused(&mut self, msg: &Message) -> Option<Command> {
        let index = self.focus?;
        self.slots[index].component.update(msg)
    }

    /// Transfer focus to the member with the given id.
    ///
    /// Every other member receives `Blur`, the target receives `Focus`; this
    /// is the only place either message is produced. An unknown id leaves
    /// focus unchanged and delivers nothing.
    pub fn focus_on(&mut self, id: ComponentId) -> Option<Command> {
        let target = self.slots.iter().position(|slot| slot.id == id)?;
        self.focus = Some(target);

        let commands: Vec<_> = self
            .slots
            .iter_mut()
            .enumerate()
            .map(|(index, slot)| {
                let msg = if index == target {
                    Message::Focus(slot.id)
                } else {
                    Message::Blur(slot.id)
                };
                slot.component.update(&msg)
            })
            .collect();
        command::batch(commands)
    }

    /// Focus the next member in tab order, wrapping at the end.
    pub fn focus_next(&mut self) -> Option<Command> {
        if self.slots.is_empty() {
            return None;
        }
        let index = self.focus.map_or(0, |i| (i + 1) % self.slots.len());
        self.focus_on(self.slots[index].id)
    }

    /// Focus the previous member in tab order, wrapping at the start.
    pub fn focus_previous(&mut self) -> Option<Command> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        let index = self.focus.map_or(last, |i| if i == 0 { last } else { i - 1 });
        self.focus_on(self.slots[index].id)
    }

    pub fn focused_id(&self) -> Option<ComponentId> {
        self.focus.map(|index| self.slots[index].id)
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focused_id() == Some(id)
    }

    pub fn focused_mut(&mut self) -> Option<&mut dyn Component> {
        let index = self.focus?;
        Some(self.slots[index].component.as_mut())
    }

    /// Render the member with the given id; unknown ids draw nothing.
    pub fn render_id(&mut self, id: ComponentId, frame: &mut Frame, area: Rect, theme: &Theme) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
            slot.component.render(frame, area, theme);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
