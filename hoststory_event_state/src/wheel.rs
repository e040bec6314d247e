// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wheel normalization: turn native wheel ticks into the same scroll events
//! pans produce.
//!
//! Wheel scrolling shares the pan accumulator of the [`GestureSession`]: a tick
//! that arrives while a pan is bracketed adds to its total. Outside a pan the
//! total of a wheel event equals its delta.
//!
//! Ticks are scaled by [`GestureConfig::wheel_scroll_multiplier`]; unlike pans
//! they are never sign-flipped.
//!
//! [`GestureConfig::wheel_scroll_multiplier`]: crate::gesture::GestureConfig::wheel_scroll_multiplier

use kurbo::{Point, Vec2};
use tracing::trace;

use crate::gesture::GestureSession;
use crate::snapshot::{Modifiers, WidgetId};
use crate::synthetic::{GestureKind, GesturePayload, GesturePhase, SyntheticGesture};

/// Axis a wheel tick scrolls along.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WheelAxis {
    /// Regular wheel.
    Vertical,
    /// Tilt wheel or horizontal trackpad scroll.
    Horizontal,
}

/// A native wheel event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NativeWheelEvent {
    /// Widget under the pointer.
    pub widget: WidgetId,
    /// Host timestamp.
    pub time: u64,
    /// Position relative to the widget.
    pub position: Point,
    /// Signed number of ticks.
    pub count: i32,
    /// Axis of the ticks.
    pub axis: WheelAxis,
    /// Modifier state.
    pub modifiers: Modifiers,
}

impl NativeWheelEvent {
    /// Vertical ticks at `position`.
    pub fn vertical(time: u64, position: Point, count: i32) -> Self {
        Self {
            widget: WidgetId(0),
            time,
            position,
            count,
            axis: WheelAxis::Vertical,
            modifiers: Modifiers::empty(),
        }
    }

    /// Horizontal ticks at `position`.
    pub fn horizontal(time: u64, position: Point, count: i32) -> Self {
        Self {
            axis: WheelAxis::Horizontal,
            ..Self::vertical(time, position, count)
        }
    }

    /// Set the modifier state.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl GestureSession {
    /// Normalize a wheel event into a scroll update.
    ///
    /// Returns `None` for a zero tick count.
    pub fn wheel(&mut self, event: &NativeWheelEvent) -> Option<SyntheticGesture> {
        if event.count == 0 {
            return None;
        }
        let amount = f64::from(event.count) * self.config.wheel_scroll_multiplier;
        let delta = match event.axis {
            WheelAxis::Vertical => Vec2::new(0.0, amount),
            WheelAxis::Horizontal => Vec2::new(amount, 0.0),
        };
        let total = if self.bracket.contains(&GestureKind::Scroll) {
            self.total_scroll += delta;
            self.total_scroll
        } else {
            delta
        };
        trace!(?delta, ?total, "wheel normalized");
        Some(SyntheticGesture::new(
            event.position,
            event.modifiers,
            GesturePayload::Scroll {
                phase: GesturePhase::Update,
                delta,
                total,
            },
        ))
    }
}
