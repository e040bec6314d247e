// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Low-level gesture events synthesized for the embedded scene.
//!
//! The scene's public API cannot construct these with full parameters (total
//! deltas, inertia, precise modifiers), so they are delivered straight to its
//! internal listener. See `hoststory_responder::injector`.

use kurbo::{Point, Vec2};

use crate::snapshot::Modifiers;

/// Stage of a bracketed atomic gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// First event of the gesture.
    Started,
    /// Intermediate event.
    Update,
    /// Last event of the gesture.
    Finished,
}

/// Atomic gestures that are bracketed with started/finished events.
///
/// Swipes are single-shot and never bracketed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Pan, reported to the scene as scrolling.
    Scroll,
    /// Magnification.
    Zoom,
    /// Rotation.
    Rotate,
}

/// Direction of a swipe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Toward the top.
    Up,
    /// Toward the bottom.
    Down,
    /// Toward the left.
    Left,
    /// Toward the right.
    Right,
}

/// Kind-specific values of a [`SyntheticGesture`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GesturePayload {
    /// Scrolling, from a pan or a wheel tick.
    Scroll {
        /// Stage within the gesture. Wheel ticks are always `Update`.
        phase: GesturePhase,
        /// Delta of this event, in scene scroll units.
        delta: Vec2,
        /// Accumulated delta since the gesture started.
        total: Vec2,
    },
    /// Zooming.
    Zoom {
        /// Stage within the gesture.
        phase: GesturePhase,
        /// Ratio relative to the previous event; `1.0` is neutral.
        factor: f64,
        /// Ratio relative to the start of the gesture.
        total_factor: f64,
    },
    /// Rotation, clockwise positive, in degrees.
    Rotate {
        /// Stage within the gesture.
        phase: GesturePhase,
        /// Angle relative to the previous event.
        angle: f64,
        /// Angle relative to the start of the gesture.
        total_angle: f64,
    },
    /// A single-shot swipe.
    Swipe {
        /// Direction of the swipe.
        direction: SwipeDirection,
    },
}

/// A gesture event ready to hand to the scene's internal listener.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SyntheticGesture {
    /// Position relative to the host widget.
    pub position: Point,
    /// Position relative to the display.
    ///
    /// Equal to `position` until the canvas resolves it; resolution happens
    /// when the event is scheduled, not when it runs.
    pub screen_position: Point,
    /// Modifier state of the originating native event.
    pub modifiers: Modifiers,
    /// `true` for direct-touch input. Trackpads and wheels are indirect.
    pub direct: bool,
    /// `true` for events continuing a gesture after the fingers lifted.
    pub inertia: bool,
    /// Number of touch points; always zero for synthesized events.
    pub touch_count: u32,
    /// Kind-specific values.
    pub payload: GesturePayload,
}

impl SyntheticGesture {
    pub(crate) fn new(position: Point, modifiers: Modifiers, payload: GesturePayload) -> Self {
        Self {
            position,
            screen_position: position,
            modifiers,
            direct: false,
            inertia: false,
            touch_count: 0,
            payload,
        }
    }

    /// Stage within a bracketed gesture; `None` for swipes.
    pub fn phase(&self) -> Option<GesturePhase> {
        match self.payload {
            GesturePayload::Scroll { phase, .. }
            | GesturePayload::Zoom { phase, .. }
            | GesturePayload::Rotate { phase, .. } => Some(phase),
            GesturePayload::Swipe { .. } => None,
        }
    }

    /// Atomic kind; `None` for swipes.
    pub fn kind(&self) -> Option<GestureKind> {
        match self.payload {
            GesturePayload::Scroll { .. } => Some(GestureKind::Scroll),
            GesturePayload::Zoom { .. } => Some(GestureKind::Zoom),
            GesturePayload::Rotate { .. } => Some(GestureKind::Rotate),
            GesturePayload::Swipe { .. } => None,
        }
    }
}
