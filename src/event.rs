//! Change notifications: typed events and the listener bus.
//!
//! Interested observers — a tree panel, a thumbnail strip, a dirty-state
//! indicator — register a callback on the collection and receive every
//! structural and payload change as a [`CollectionEvent`]. Delivery is
//! synchronous, on the controller thread, in registration order.
//!
//! ## Two event families, one channel
//!
//! Structural events (`NodesInserted`, `NodesRemoved`, `StructureChanged`)
//! describe the shape of the tree changing. Payload events describe a field
//! inside one node changing; each carries the [`PayloadChange`] naming the
//! field. A payload change is always followed by a `NodeChanged` for the
//! owning node so shape-oriented views can repaint one row without caring
//! which field moved.
//!
//! ## Re-entrancy
//!
//! The bus is mutably borrowed for the whole of a dispatch, so a handler
//! cannot register or unregister listeners — or mutate the collection —
//! from inside its own notification. Handlers that need to react
//! structurally should queue the work and perform it after the current
//! operation returns.
//!
//! ## Suppression
//!
//! During bulk loads the collection silences the bus wholesale (see
//! [`Collection::set_suppress_notifications`]); an import of ten thousand
//! pictures produces zero insert events and one final `StructureChanged`.
//!
//! [`Collection::set_suppress_notifications`]: crate::collection::Collection::set_suppress_notifications

use crate::collection::NodeId;
use crate::payload::Payload;

/// Which payload field changed. Selection notices piggy-back on the same
/// channel: they are node-level, not field-level, but every consumer that
/// watches payload events also wants them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadChange {
    GroupName,
    Description,
    ImageLocation,
    Checksum,
    Rotation,
    GeoTag,
    CategoryAssignments,
    Comment,
    Photographer,
    CopyrightHolder,
    CreationTime,
    FilmReference,
    WasSelected,
    WasUnselected,
}

/// A change notification delivered to collection listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    /// Children appeared under `parent` at the given indices.
    NodesInserted { parent: NodeId, indices: Vec<usize> },
    /// Children were detached from `parent`. The removed nodes' payloads
    /// travel with the event because the handles may already be gone by the
    /// time a listener looks.
    NodesRemoved {
        parent: NodeId,
        indices: Vec<usize>,
        removed: Vec<Payload>,
    },
    /// One node's display state changed (payload edit, rename).
    NodeChanged { node: NodeId },
    /// The subtree under `node` was rearranged wholesale; listeners should
    /// re-read it rather than apply a delta.
    StructureChanged { node: NodeId },
    /// A field inside `node`'s payload changed.
    PayloadChanged { node: NodeId, change: PayloadChange },
}

/// Handle returned by [`EventBus::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CollectionEvent) + Send>;

/// Listener registry with registration-order delivery.
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers a listener and returns its handle.
    pub fn register(&mut self, listener: impl FnMut(&CollectionEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregisters a listener. Returns `false` if the handle was unknown.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `event` to every listener in registration order.
    pub fn emit(&mut self, event: &CollectionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn node_changed(raw: u64) -> CollectionEvent {
        CollectionEvent::NodeChanged {
            node: NodeId::from_raw(raw),
        }
    }

    #[test]
    fn delivery_follows_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.register(move |_| seen.lock().unwrap().push(tag));
        }
        bus.emit(&node_changed(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unregister_stops_delivery() {
        let seen = Arc::new(Mutex::new(0u32));
        let mut bus = EventBus::new();
        let counter = seen.clone();
        let id = bus.register(move |_| *counter.lock().unwrap() += 1);
        bus.emit(&node_changed(1));
        assert!(bus.unregister(id));
        assert!(!bus.unregister(id));
        bus.emit(&node_changed(2));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
