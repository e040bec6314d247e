// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts of the embedded scene graph, as the bridge consumes them.
//!
//! The bridge never owns a scene. It reaches one through [`SceneHost`], which
//! exposes the settable root dispatcher, and through the internal
//! [`SceneListener`] that low-level gesture events are delivered to.

use alloc::rc::Rc;
use core::cell::RefCell;

use hoststory_event_state::snapshot::{KeyPhase, Modifiers};
use hoststory_event_state::synthetic::{GesturePayload, SyntheticGesture};
use kurbo::Point;

/// Identity of an embedded scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u64);

/// A key event as the scene derives it from a native key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SceneKeyEvent {
    /// Pressed, typed or released.
    pub phase: KeyPhase,
    /// Host key code of the originating native event.
    pub key_code: u32,
    /// Produced character, `'\0'` if none.
    pub character: char,
    /// Modifier state.
    pub modifiers: Modifiers,
}

/// What a [`SceneEvent`] carries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SceneEventKind {
    /// Keyboard.
    Key(SceneKeyEvent),
    /// A synthesized gesture.
    Gesture(SyntheticGesture),
    /// Pointer motion, in scene coordinates.
    Pointer {
        /// Pointer position.
        position: Point,
    },
}

/// A consumable event travelling through the scene's dispatch chain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneEvent {
    /// Event payload.
    pub kind: SceneEventKind,
    consumed: bool,
}

impl SceneEvent {
    /// Wrap `kind` in an unconsumed event.
    pub fn new(kind: SceneEventKind) -> Self {
        Self {
            kind,
            consumed: false,
        }
    }

    /// Shorthand for a key event.
    pub fn key(event: SceneKeyEvent) -> Self {
        Self::new(SceneEventKind::Key(event))
    }

    /// Mark the event consumed. Consumption is sticky.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether any handler consumed the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// A scene's root event dispatcher.
pub trait EventDispatcher {
    /// Route `event` through the scene.
    fn dispatch(&mut self, event: &mut SceneEvent);
}

/// Shared handle to a dispatcher, as stored by a scene.
pub type DispatcherRef = Rc<RefCell<dyn EventDispatcher>>;

/// The parts of an embedded scene the bridge touches.
pub trait SceneHost {
    /// Identity of the scene.
    fn id(&self) -> SceneId;

    /// The current root dispatcher, if any.
    fn event_dispatcher(&self) -> Option<DispatcherRef>;

    /// Replace the root dispatcher.
    fn set_event_dispatcher(&self, dispatcher: Option<DispatcherRef>);
}

/// The scene's internal listener for low-level input.
///
/// Only reachable through platform interop; see
/// [`PlatformInterop::scene_listener`](crate::interop::PlatformInterop::scene_listener).
/// Every method defaults to ignoring the event.
pub trait SceneListener {
    /// Scroll started, updated or finished.
    fn scroll_event(&mut self, _event: &SyntheticGesture) {}
    /// Zoom started, updated or finished.
    fn zoom_event(&mut self, _event: &SyntheticGesture) {}
    /// Rotation started, updated or finished.
    fn rotate_event(&mut self, _event: &SyntheticGesture) {}
    /// Single-shot swipe.
    fn swipe_event(&mut self, _event: &SyntheticGesture) {}
}

/// Route `event` to the listener method matching its payload.
pub fn deliver_gesture(listener: &mut dyn SceneListener, event: &SyntheticGesture) {
    match event.payload {
        GesturePayload::Scroll { .. } => listener.scroll_event(event),
        GesturePayload::Zoom { .. } => listener.zoom_event(event),
        GesturePayload::Rotate { .. } => listener.rotate_event(event),
        GesturePayload::Swipe { .. } => listener.swipe_event(event),
    }
}

/// Surface that can be told to repaint now.
///
/// Implemented by the native canvas; the scene does not repaint while a
/// long-running synchronous handler holds its thread.
pub trait RepaintTarget {
    /// Repaint immediately.
    fn force_repaint(&self);

    /// Flush pending drawing to the window system.
    fn force_flush(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumption_is_sticky() {
        let mut event = SceneEvent::new(SceneEventKind::Pointer {
            position: Point::ORIGIN,
        });
        assert!(!event.is_consumed());
        event.consume();
        event.consume();
        assert!(event.is_consumed());
    }
}
