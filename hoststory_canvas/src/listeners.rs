// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host key listeners registered through the canvas bridge.
//!
//! Listeners registered here are called in registration order for every key
//! event the bridge delivers, including earlier events replayed from the
//! reconciliation queue. The scene's own handler always runs after them.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hoststory_event_state::snapshot::{KeyEventKind, NativeKeyEvent};

/// A typed key listener.
pub trait KeyListener {
    /// A key went down. Clear [`NativeKeyEvent::doit`] to veto it.
    fn key_pressed(&mut self, event: &mut NativeKeyEvent);

    /// A key went up.
    fn key_released(&mut self, event: &mut NativeKeyEvent);
}

/// Shared handle to a typed key listener.
pub type KeyListenerRef = Rc<RefCell<dyn KeyListener>>;

/// Shared handle to an untyped listener for a single event kind.
pub type EventListenerRef = Rc<RefCell<dyn FnMut(&mut NativeKeyEvent)>>;

/// Handle returned when registering a listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
enum Entry {
    Typed(KeyListenerRef),
    Untyped {
        kind: KeyEventKind,
        listener: EventListenerRef,
    },
}

impl Entry {
    fn call(&self, event: &mut NativeKeyEvent) {
        match self {
            Self::Typed(listener) => {
                let mut listener = listener.borrow_mut();
                match event.kind {
                    KeyEventKind::Down => listener.key_pressed(event),
                    KeyEventKind::Up => listener.key_released(event),
                }
            }
            Self::Untyped { kind, listener } => {
                if *kind == event.kind {
                    (&mut *listener.borrow_mut())(event);
                }
            }
        }
    }
}

/// Registered key listeners, in registration order.
#[derive(Default)]
pub(crate) struct KeyListeners {
    next_id: u64,
    entries: Vec<(ListenerId, Entry)>,
}

impl fmt::Debug for KeyListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyListeners")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl KeyListeners {
    fn push(&mut self, entry: Entry) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entry));
        id
    }

    pub(crate) fn add_typed(&mut self, listener: KeyListenerRef) -> ListenerId {
        self.push(Entry::Typed(listener))
    }

    pub(crate) fn add_untyped(&mut self, kind: KeyEventKind, listener: EventListenerRef) -> ListenerId {
        self.push(Entry::Untyped { kind, listener })
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(other, _)| *other != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the current registrations, so listeners may register or
    /// remove listeners while being called.
    pub(crate) fn snapshot(&self) -> Listeners {
        Listeners(self.entries.iter().map(|(_, entry)| entry.clone()).collect())
    }
}

/// Listeners captured for one delivery.
pub(crate) struct Listeners(Vec<Entry>);

impl Listeners {
    pub(crate) fn forward(&self, event: &mut NativeKeyEvent) {
        for entry in &self.0 {
            entry.call(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use hoststory_event_state::snapshot::{DisplayId, WidgetId};

    #[derive(Default)]
    struct Log(Vec<(&'static str, KeyEventKind)>);

    impl KeyListener for Log {
        fn key_pressed(&mut self, event: &mut NativeKeyEvent) {
            self.0.push(("pressed", event.kind));
        }
        fn key_released(&mut self, event: &mut NativeKeyEvent) {
            self.0.push(("released", event.kind));
        }
    }

    fn key(kind: KeyEventKind) -> NativeKeyEvent {
        NativeKeyEvent::new(DisplayId(0), WidgetId(0), 0, kind)
    }

    #[test]
    fn typed_listeners_split_by_kind_and_untyped_filter() {
        let mut listeners = KeyListeners::default();
        let log = Rc::new(RefCell::new(Log::default()));
        let typed: KeyListenerRef = log.clone();
        listeners.add_typed(typed);
        let hits = Rc::new(RefCell::new(0_u32));
        let h = Rc::clone(&hits);
        let untyped: EventListenerRef = Rc::new(RefCell::new(move |event: &mut NativeKeyEvent| {
            *h.borrow_mut() += 1;
            event.doit = false;
        }));
        let id = listeners.add_untyped(KeyEventKind::Up, untyped);

        let mut down = key(KeyEventKind::Down);
        listeners.snapshot().forward(&mut down);
        assert!(down.doit);
        let mut up = key(KeyEventKind::Up);
        listeners.snapshot().forward(&mut up);
        assert!(!up.doit);

        assert_eq!(
            log.borrow().0,
            vec![("pressed", KeyEventKind::Down), ("released", KeyEventKind::Up)]
        );
        assert_eq!(*hits.borrow(), 1);
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert_eq!(listeners.len(), 1);
    }
}
