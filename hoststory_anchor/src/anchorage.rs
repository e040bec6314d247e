// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchorages: scene elements that dynamic anchors attach to.
//!
//! A curve only needs two things from the element it is anchored to: its
//! bounds in scene coordinates (and the centroid derived from them) and a
//! notification whenever they change. [`Anchorage`] is exactly that.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Rect};

/// Handle returned by [`Anchorage::observe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&Anchorage)>;

/// Observable bounds of a scene element.
pub struct Anchorage {
    bounds: Cell<Rect>,
    next_id: Cell<u64>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
}

impl fmt::Debug for Anchorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anchorage")
            .field("bounds", &self.bounds.get())
            .field("observers", &self.observers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Anchorage {
    /// An anchorage occupying `bounds` (scene coordinates).
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: Cell::new(bounds),
            next_id: Cell::new(0),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Current bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    /// Center of the bounds.
    pub fn centroid(&self) -> Point {
        self.bounds.get().center()
    }

    /// Move or resize, notifying observers if anything changed.
    pub fn set_bounds(&self, bounds: Rect) {
        if self.bounds.get() == bounds {
            return;
        }
        self.bounds.set(bounds);
        // Observers may (un)register while being notified.
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer(self);
        }
    }

    /// Call `observer` after every change of the bounds.
    pub fn observe(&self, observer: impl Fn(&Self) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Stop notifying `id`. Returns `false` if it was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(other, _)| *other != id);
        observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}
