// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key event reconciliation: deliver native key events in arrival order and
//! remember how each one was settled.
//!
//! Two facts about the host make this necessary:
//!
//! - The listener the bridge registers is only guaranteed to see the *current*
//!   event. Events generated earlier may never reach it, or reach it late.
//! - The embedded scene derives its own key events (pressed, typed, released)
//!   without exposing whether an intervening host listener vetoed the native
//!   original.
//!
//! [`KeyReconciler`] keeps three FIFO queues:
//!
//! - *observed*: a snapshot of every native key event, appended by a
//!   display-wide filter before any listener runs ([`KeyReconciler::observe`]).
//! - *unprocessed down* / *unprocessed up*: the settled snapshot of every
//!   delivered event, waiting for the scene event it produces.
//!
//! ## Delivery
//!
//! When the listener fires, [`KeyReconciler::drain_due`] pops every observed
//! snapshot up to and including the current event. The caller delivers them
//! in order: host listeners first, then [`KeyReconciler::settle`] records the
//! final `doit` value, then the scene's own key events are dispatched.
//!
//! Settle only events the scene will actually see. If the scene events of a
//! settled event are dropped before dispatch, [`KeyReconciler::discard`]
//! retires what they would have resolved.
//!
//! ## Resolution
//!
//! When the scene later dispatches a derived event, [`KeyReconciler::resolve`]
//! answers whether it should be consumed:
//!
//! - `Pressed` peeks the head of *unprocessed down*.
//! - `Typed` dequeues it.
//! - `Released` dequeues the head of *unprocessed up*.
//!
//! A press that produced no typed event is retired when the next press is
//! resolved.
//!
//! ```
//! use hoststory_event_state::keys::{DueKey, KeyReconciler};
//! use hoststory_event_state::snapshot::{DisplayId, KeyEventKind, KeyPhase, NativeKeyEvent, WidgetId};
//!
//! let mut keys = KeyReconciler::new();
//! let mut event = NativeKeyEvent::new(DisplayId(0), WidgetId(1), 5, KeyEventKind::Down)
//!     .with_character('q');
//! keys.observe(&event);
//!
//! assert_eq!(keys.drain_due(&event), vec![DueKey::Current]);
//! // A host listener vetoes the key.
//! event.doit = false;
//! keys.settle(&event);
//!
//! assert_eq!(keys.resolve(KeyPhase::Pressed), Some(true));
//! assert_eq!(keys.resolve(KeyPhase::Typed), Some(true));
//! assert_eq!(keys.resolve(KeyPhase::Typed), None);
//! ```

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use tracing::trace;

use crate::snapshot::{KeyEventKind, KeyPhase, NativeEventSnapshot, NativeKeyEvent};

/// An entry returned by [`KeyReconciler::drain_due`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DueKey {
    /// An earlier event that never reached the listener on its own; replay it
    /// from the snapshot.
    Earlier(NativeEventSnapshot),
    /// The event currently reaching the listener.
    Current,
}

/// Ordering and consumption bookkeeping for native key events.
#[derive(Clone, Debug, Default)]
pub struct KeyReconciler {
    observed: VecDeque<NativeEventSnapshot>,
    unprocessed_down: VecDeque<NativeEventSnapshot>,
    unprocessed_up: VecDeque<NativeEventSnapshot>,
    // The head of `unprocessed_down` has been resolved as `Pressed` and is
    // waiting for its `Typed` counterpart.
    down_head_pressed: bool,
    // Bumped whenever settled state is dropped wholesale.
    epoch: u64,
}

impl KeyReconciler {
    /// Create empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly generated native key event.
    ///
    /// Call from a display-wide filter, before any listener sees the event.
    pub fn observe(&mut self, event: &NativeKeyEvent) {
        self.observed.push_back(NativeEventSnapshot::capture(event));
    }

    /// Pop every observed snapshot up to and including `current`.
    ///
    /// The result lists earlier events oldest first, followed by
    /// [`DueKey::Current`]. If `current` is no longer queued (it was already
    /// delivered on behalf of a later event) every remaining snapshot is
    /// still due, but no `Current` entry is produced.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been observed. The filter runs before every
    /// listener, so an empty queue means the filter was never installed.
    pub fn drain_due(&mut self, current: &NativeKeyEvent) -> Vec<DueKey> {
        assert!(
            !self.observed.is_empty(),
            "key listener invoked with an empty observation queue; is the display filter installed?"
        );
        let current = NativeEventSnapshot::capture(current);
        if !self.observed.contains(&current) {
            trace!(time = current.time(), "key event already delivered out of order");
            return Vec::new();
        }
        let mut due = Vec::new();
        while let Some(head) = self.observed.pop_front() {
            if head == current {
                due.push(DueKey::Current);
                break;
            }
            trace!(time = head.time(), "replaying earlier key event");
            due.push(DueKey::Earlier(head));
        }
        due
    }

    /// Record the final state of a delivered event, after host listeners ran
    /// and before the scene sees it.
    ///
    /// Every settled event must eventually be resolved or
    /// [discarded](Self::discard).
    pub fn settle(&mut self, event: &NativeKeyEvent) {
        let settled = NativeEventSnapshot::capture(event);
        match settled.kind() {
            KeyEventKind::Down => self.unprocessed_down.push_back(settled),
            KeyEventKind::Up => self.unprocessed_up.push_back(settled),
        }
    }

    /// Retire settled state for scene events that were never dispatched.
    ///
    /// `phases` are the phases those scene events would have resolved, in
    /// order.
    pub fn discard(&mut self, phases: impl IntoIterator<Item = KeyPhase>) {
        for phase in phases {
            trace!(?phase, "settled key event discarded");
            self.resolve(phase);
        }
    }

    /// Whether the scene event of the given phase should be marked consumed.
    ///
    /// Returns `None` when no settled native event is pending for the phase.
    pub fn resolve(&mut self, phase: KeyPhase) -> Option<bool> {
        match phase {
            KeyPhase::Pressed => {
                if self.down_head_pressed {
                    // The previous press produced no typed event.
                    self.unprocessed_down.pop_front();
                    self.down_head_pressed = false;
                }
                let consumed = !self.unprocessed_down.front()?.is_actionable();
                self.down_head_pressed = true;
                Some(consumed)
            }
            KeyPhase::Typed => {
                self.down_head_pressed = false;
                self.unprocessed_down
                    .pop_front()
                    .map(|settled| !settled.is_actionable())
            }
            KeyPhase::Released => self
                .unprocessed_up
                .pop_front()
                .map(|settled| !settled.is_actionable()),
        }
    }

    /// Number of observed events not yet delivered.
    pub fn pending_observed(&self) -> usize {
        self.observed.len()
    }

    /// Number of settled key-down events awaiting resolution.
    pub fn pending_down(&self) -> usize {
        self.unprocessed_down.len()
    }

    /// Number of settled key-up events awaiting resolution.
    pub fn pending_up(&self) -> usize {
        self.unprocessed_up.len()
    }

    /// Generation of the settled queues.
    ///
    /// Changes on [`clear_settled`](Self::clear_settled) and
    /// [`clear`](Self::clear), so work queued against older settled state
    /// can tell it is stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Drop every settled event awaiting resolution, e.g. when the canvas
    /// switches scenes. Observed events are kept.
    pub fn clear_settled(&mut self) {
        self.unprocessed_down.clear();
        self.unprocessed_up.clear();
        self.down_head_pressed = false;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Drop all queued state.
    pub fn clear(&mut self) {
        self.observed.clear();
        self.clear_settled();
    }
}
