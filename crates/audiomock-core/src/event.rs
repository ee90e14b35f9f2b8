//! Lifecycle events and their synchronous dispatcher.
//!
//! Events are delivered on the caller's stack. For each `(target, type)` pair
//! the `on<type>` handler slot runs first, then listeners in registration
//! order. Listeners receive a shared reference to the event and cannot reach
//! back into the context, so the graph is never mutated mid-dispatch.

use std::collections::BTreeMap;
use std::fmt;

use crate::graph::NodeId;

/// Object an event is raised on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTarget {
    /// The context itself (`statechange`).
    Context,
    /// A node (`ended`).
    Node(NodeId),
}

/// Event type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventType {
    /// A scheduled source finished playback.
    Ended,
    /// The context lifecycle state changed.
    StateChange,
}

impl EventType {
    /// DOM-style name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ended => "ended",
            Self::StateChange => "statechange",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivered event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    /// Type tag.
    pub event_type: EventType,
    /// Object the event was raised on.
    pub target: EventTarget,
    /// Virtual time at which the event was raised.
    pub time: f64,
}

/// Callback registered for an event.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Handle returned by [`Dispatcher::add_listener()`], used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Slot {
    handler: Option<Listener>,
    listeners: Vec<(ListenerId, Listener)>,
}

/// Registry of handlers and listeners keyed by target and event type.
#[derive(Default)]
pub struct Dispatcher {
    slots: BTreeMap<(EventTarget, EventType), Slot>,
    next_id: u64,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("slots", &self.slots.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the `on<type>` handler; `None` clears it.
    pub fn set_handler(&mut self, target: EventTarget, event_type: EventType, handler: Option<Listener>) {
        self.slots.entry((target, event_type)).or_default().handler = handler;
    }

    /// Whether a handler slot is populated.
    pub fn has_handler(&self, target: EventTarget, event_type: EventType) -> bool {
        self.slots
            .get(&(target, event_type))
            .is_some_and(|slot| slot.handler.is_some())
    }

    /// Appends a listener and returns its removal handle.
    pub fn add_listener(&mut self, target: EventTarget, event_type: EventType, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.slots
            .entry((target, event_type))
            .or_default()
            .listeners
            .push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if the handle was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        for slot in self.slots.values_mut() {
            if let Some(pos) = slot.listeners.iter().position(|(lid, _)| *lid == id) {
                drop(slot.listeners.remove(pos));
                return true;
            }
        }
        false
    }

    /// Number of listeners (excluding the handler slot) for a key.
    pub fn listener_count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.slots
            .get(&(target, event_type))
            .map_or(0, |slot| slot.listeners.len())
    }

    /// Delivers `event` to its handler, then to its listeners in order.
    pub fn dispatch(&mut self, event: &Event) {
        #[cfg(feature = "tracing")]
        tracing::debug!(event = %event.event_type, target = ?event.target, time = event.time, "dispatch");
        let Some(slot) = self.slots.get_mut(&(event.target, event.event_type)) else {
            return;
        };
        if let Some(handler) = slot.handler.as_mut() {
            handler(event);
        }
        for (_, listener) in &mut slot.listeners {
            listener(event);
        }
    }
}
