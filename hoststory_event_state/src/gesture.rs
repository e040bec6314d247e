// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture state machine: expand native compound gestures into bracketed
//! atomic gestures for the embedded scene.
//!
//! The host reports a trackpad interaction as one compound gesture,
//! `BEGIN (MAGNIFY | PAN | ROTATE | SWIPE)* END`, where sub-events of several
//! kinds may interleave. The scene expects each atomic kind to be bracketed on
//! its own: `started, update*, finished`.
//!
//! [`GestureSession`] tracks:
//!
//! - whether a compound gesture is active,
//! - a stack of atomic kinds that have been started and must be finished, in
//!   reverse order, when the compound gesture ends,
//! - accumulators (total scroll, zoom and rotation),
//! - an inertia seed captured when a pan ends, so that inertia frames arriving
//!   after `END` continue the pan instead of starting a new one.
//!
//! ## Numeric conventions
//!
//! - Pan directions are scaled by [`GestureConfig::pan_scroll_multiplier`].
//! - Rotation sign is inverted: the host reports clockwise as negative, the
//!   scene expects clockwise positive.
//! - Zoom `started` and `finished` always carry a neutral factor of `1.0`;
//!   only updates carry the real ratio.
//! - Scroll totals reset on `started`, accumulate on updates, and pass the
//!   delta through unchanged during inertia.
//!
//! ```
//! use kurbo::Point;
//! use hoststory_event_state::gesture::{GestureConfig, GestureSession, NativeGestureEvent, detail};
//! use hoststory_event_state::synthetic::GesturePhase;
//!
//! let mut session = GestureSession::new(GestureConfig::default());
//! let at = |time, code| NativeGestureEvent::new(time, code, Point::new(10.0, 10.0));
//!
//! assert!(session.handle(&at(0, detail::BEGIN)).unwrap().is_empty());
//! let out = session.handle(&at(10, detail::PAN).with_direction(1, 0)).unwrap();
//! assert_eq!(out[0].phase(), Some(GesturePhase::Started));
//! assert_eq!(out[1].phase(), Some(GesturePhase::Update));
//! let out = session.handle(&at(20, detail::END)).unwrap();
//! assert_eq!(out[0].phase(), Some(GesturePhase::Finished));
//! ```

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::snapshot::{Modifiers, WidgetId};
use crate::synthetic::{
    GestureKind, GesturePayload, GesturePhase, SwipeDirection, SyntheticGesture,
};

/// Native gesture detail codes as reported by the host toolkit.
pub mod detail {
    /// Compound gesture begins.
    pub const BEGIN: u32 = 1 << 1;
    /// Compound gesture ends.
    pub const END: u32 = 1 << 2;
    /// Rotation sub-event.
    pub const ROTATE: u32 = 1 << 3;
    /// Swipe sub-event.
    pub const SWIPE: u32 = 1 << 4;
    /// Magnification sub-event.
    pub const MAGNIFY: u32 = 1 << 5;
    /// Pan sub-event.
    pub const PAN: u32 = 1 << 6;
}

/// Errors raised while handling native gestures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    /// The host reported a detail code this state machine does not know.
    #[error("unsupported native gesture detail {0:#x}")]
    UnsupportedDetail(u32),
}

/// Decoded native gesture detail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureDetail {
    /// See [`detail::BEGIN`].
    Begin,
    /// See [`detail::END`].
    End,
    /// See [`detail::MAGNIFY`].
    Magnify,
    /// See [`detail::PAN`].
    Pan,
    /// See [`detail::ROTATE`].
    Rotate,
    /// See [`detail::SWIPE`].
    Swipe,
}

impl TryFrom<u32> for GestureDetail {
    type Error = GestureError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            detail::BEGIN => Ok(Self::Begin),
            detail::END => Ok(Self::End),
            detail::MAGNIFY => Ok(Self::Magnify),
            detail::PAN => Ok(Self::Pan),
            detail::ROTATE => Ok(Self::Rotate),
            detail::SWIPE => Ok(Self::Swipe),
            other => Err(GestureError::UnsupportedDetail(other)),
        }
    }
}

/// Platform-dependent gesture constants.
///
/// Resolve once at startup and pass to [`GestureSession::new`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureConfig {
    /// Scale from native pan direction to scene scroll units.
    pub pan_scroll_multiplier: f64,
    /// Scale from wheel ticks to scene scroll units.
    pub wheel_scroll_multiplier: f64,
    /// Inertia ends when no gesture event arrived for longer than this.
    pub inertia_timeout: u64,
    /// Duration over which a synthesized inertia delta decays to zero.
    pub inertia_decay: u64,
}

impl GestureConfig {
    /// Pan multiplier on current platforms.
    pub const PAN_SCROLL_MULTIPLIER: f64 = 5.0;
    /// Pan multiplier on the legacy platform/toolkit combination that reports
    /// inverted pan directions.
    pub const LEGACY_PAN_SCROLL_MULTIPLIER: f64 = -5.0;
    /// Wheel multiplier; never sign-flipped.
    pub const WHEEL_SCROLL_MULTIPLIER: f64 = 40.0;
    /// Default inertia timeout.
    pub const INERTIA_TIMEOUT: u64 = 250;
    /// Default inertia decay duration.
    pub const INERTIA_DECAY: u64 = 1500;

    /// Constants for the legacy platform with inverted pan directions.
    pub fn legacy() -> Self {
        Self {
            pan_scroll_multiplier: Self::LEGACY_PAN_SCROLL_MULTIPLIER,
            ..Self::default()
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pan_scroll_multiplier: Self::PAN_SCROLL_MULTIPLIER,
            wheel_scroll_multiplier: Self::WHEEL_SCROLL_MULTIPLIER,
            inertia_timeout: Self::INERTIA_TIMEOUT,
            inertia_decay: Self::INERTIA_DECAY,
        }
    }
}

/// A native gesture event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NativeGestureEvent {
    /// Widget the gesture targets.
    pub widget: WidgetId,
    /// Host timestamp.
    pub time: u64,
    /// Raw detail code, see [`detail`].
    pub detail: u32,
    /// Position relative to the widget.
    pub position: Point,
    /// Horizontal direction (pan, swipe).
    pub x_direction: i32,
    /// Vertical direction (pan, swipe).
    pub y_direction: i32,
    /// Magnification since the gesture began, `1.0` is neutral.
    pub magnification: f64,
    /// Rotation since the gesture began, in degrees, clockwise negative.
    pub rotation: f64,
    /// Modifier state.
    pub modifiers: Modifiers,
}

impl NativeGestureEvent {
    /// Create an event with neutral values.
    pub fn new(time: u64, detail: u32, position: Point) -> Self {
        Self {
            widget: WidgetId(0),
            time,
            detail,
            position,
            x_direction: 0,
            y_direction: 0,
            magnification: 1.0,
            rotation: 0.0,
            modifiers: Modifiers::empty(),
        }
    }

    /// Set the pan/swipe direction.
    #[must_use]
    pub fn with_direction(mut self, x: i32, y: i32) -> Self {
        self.x_direction = x;
        self.y_direction = y;
        self
    }

    /// Set the cumulative magnification.
    #[must_use]
    pub fn with_magnification(mut self, magnification: f64) -> Self {
        self.magnification = magnification;
        self
    }

    /// Set the cumulative rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the modifier state.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the target widget.
    #[must_use]
    pub fn with_widget(mut self, widget: WidgetId) -> Self {
        self.widget = widget;
        self
    }
}

/// Events produced for one native gesture event.
pub type Synthesized = SmallVec<[SyntheticGesture; 2]>;

/// Gesture state for one input surface.
#[derive(Clone, Debug)]
pub struct GestureSession {
    pub(crate) config: GestureConfig,
    active: bool,
    inertia_active: bool,
    pub(crate) bracket: SmallVec<[GestureKind; 3]>,
    last_event: Option<NativeGestureEvent>,
    pub(crate) total_scroll: Vec2,
    total_zoom: f64,
    total_rotation: f64,
    last_pan_delta: Vec2,
    inertia_time: u64,
    inertia_seed: Vec2,
}

impl GestureSession {
    /// Create an idle session.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: false,
            inertia_active: false,
            bracket: SmallVec::new(),
            last_event: None,
            total_scroll: Vec2::ZERO,
            total_zoom: 1.0,
            total_rotation: 0.0,
            last_pan_delta: Vec2::ZERO,
            inertia_time: 0,
            inertia_seed: Vec2::ZERO,
        }
    }

    /// The constants this session was created with.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// `true` between a native `BEGIN` and `END`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `true` while pans arriving outside a compound gesture continue the
    /// last one.
    pub fn is_inertia_active(&self) -> bool {
        self.inertia_active
    }

    /// Atomic kinds currently bracketed, in start order.
    pub fn bracketed(&self) -> &[GestureKind] {
        &self.bracket
    }

    /// The last native gesture event handled.
    pub fn last_event(&self) -> Option<&NativeGestureEvent> {
        self.last_event.as_ref()
    }

    /// Advance the state machine with a native gesture event.
    ///
    /// Returns the synthesized events in delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::UnsupportedDetail`] for unknown detail codes.
    /// State is left untouched in that case.
    pub fn handle(&mut self, event: &NativeGestureEvent) -> Result<Synthesized, GestureError> {
        let detail = GestureDetail::try_from(event.detail)?;
        let mut out = Synthesized::new();
        match detail {
            GestureDetail::Begin => {
                debug!(time = event.time, "compound gesture begins");
                self.active = true;
                // An active compound gesture always takes precedence over inertia.
                self.inertia_active = false;
                self.bracket.clear();
            }
            GestureDetail::Magnify => {
                if self.active {
                    self.ensure_started(GestureKind::Zoom, event, &mut out);
                    out.push(self.zoom_update(event));
                } else {
                    trace!("magnify outside a compound gesture ignored");
                }
            }
            GestureDetail::Rotate => {
                if self.active {
                    self.ensure_started(GestureKind::Rotate, event, &mut out);
                    out.push(self.rotate_update(event));
                } else {
                    trace!("rotate outside a compound gesture ignored");
                }
            }
            GestureDetail::Pan => {
                if self.active {
                    self.ensure_started(GestureKind::Scroll, event, &mut out);
                    out.push(self.scroll_update(event));
                } else if let Some(inertia) = self.inertia_scroll(event) {
                    out.push(inertia);
                }
            }
            GestureDetail::Swipe => {
                if let Some(direction) = swipe_direction(event.x_direction, event.y_direction) {
                    out.push(SyntheticGesture::new(
                        event.position,
                        event.modifiers,
                        GesturePayload::Swipe { direction },
                    ));
                }
            }
            GestureDetail::End => {
                while let Some(kind) = self.bracket.pop() {
                    out.push(self.finish(kind, event));
                }
                self.active = false;
                debug!(time = event.time, "compound gesture ends");
            }
        }
        for synthesized in &out {
            trace!(payload = ?synthesized.payload, inertia = synthesized.inertia, "synthesized gesture");
        }
        self.last_event = Some(*event);
        Ok(out)
    }

    fn ensure_started(
        &mut self,
        kind: GestureKind,
        event: &NativeGestureEvent,
        out: &mut Synthesized,
    ) {
        if self.bracket.contains(&kind) {
            return;
        }
        self.bracket.push(kind);
        let payload = match kind {
            GestureKind::Scroll => {
                self.total_scroll = Vec2::ZERO;
                GesturePayload::Scroll {
                    phase: GesturePhase::Started,
                    delta: Vec2::ZERO,
                    total: self.total_scroll,
                }
            }
            GestureKind::Zoom => {
                self.total_zoom = 1.0;
                GesturePayload::Zoom {
                    phase: GesturePhase::Started,
                    factor: 1.0,
                    total_factor: self.total_zoom,
                }
            }
            GestureKind::Rotate => {
                self.total_rotation = 0.0;
                GesturePayload::Rotate {
                    phase: GesturePhase::Started,
                    angle: 0.0,
                    total_angle: self.total_rotation,
                }
            }
        };
        out.push(SyntheticGesture::new(event.position, event.modifiers, payload));
    }

    fn pan_delta(&self, event: &NativeGestureEvent) -> Vec2 {
        let m = self.config.pan_scroll_multiplier;
        Vec2::new(
            f64::from(event.x_direction) * m,
            f64::from(event.y_direction) * m,
        )
    }

    fn scroll_update(&mut self, event: &NativeGestureEvent) -> SyntheticGesture {
        let delta = self.pan_delta(event);
        self.last_pan_delta = delta;
        self.total_scroll += delta;
        SyntheticGesture::new(
            event.position,
            event.modifiers,
            GesturePayload::Scroll {
                phase: GesturePhase::Update,
                delta,
                total: self.total_scroll,
            },
        )
    }

    fn zoom_update(&mut self, event: &NativeGestureEvent) -> SyntheticGesture {
        let factor = if self.total_zoom == 0.0 {
            event.magnification
        } else {
            event.magnification / self.total_zoom
        };
        self.total_zoom = event.magnification;
        SyntheticGesture::new(
            event.position,
            event.modifiers,
            GesturePayload::Zoom {
                phase: GesturePhase::Update,
                factor,
                total_factor: self.total_zoom,
            },
        )
    }

    fn rotate_update(&mut self, event: &NativeGestureEvent) -> SyntheticGesture {
        let total = -event.rotation;
        let angle = total - self.total_rotation;
        self.total_rotation = total;
        SyntheticGesture::new(
            event.position,
            event.modifiers,
            GesturePayload::Rotate {
                phase: GesturePhase::Update,
                angle,
                total_angle: self.total_rotation,
            },
        )
    }

    fn finish(&mut self, kind: GestureKind, event: &NativeGestureEvent) -> SyntheticGesture {
        let payload = match kind {
            GestureKind::Scroll => {
                self.inertia_seed = self.last_pan_delta;
                self.inertia_time = event.time;
                self.inertia_active = true;
                GesturePayload::Scroll {
                    phase: GesturePhase::Finished,
                    delta: Vec2::ZERO,
                    total: self.total_scroll,
                }
            }
            GestureKind::Zoom => GesturePayload::Zoom {
                phase: GesturePhase::Finished,
                factor: 1.0,
                total_factor: self.total_zoom,
            },
            GestureKind::Rotate => GesturePayload::Rotate {
                phase: GesturePhase::Finished,
                angle: 0.0,
                total_angle: self.total_rotation,
            },
        };
        SyntheticGesture::new(event.position, event.modifiers, payload)
    }

    /// A pan outside a compound gesture: continue the last pan while inertia
    /// is live.
    fn inertia_scroll(&mut self, event: &NativeGestureEvent) -> Option<SyntheticGesture> {
        if !self.inertia_active {
            return None;
        }
        let last_time = self.last_event.map_or(self.inertia_time, |last| last.time);
        if event.time.saturating_sub(last_time) > self.config.inertia_timeout {
            debug!(time = event.time, "inertia expired");
            self.inertia_active = false;
            return None;
        }
        let delta = if event.x_direction == 0 && event.y_direction == 0 {
            // Some hosts report inertia frames without a direction; decay the
            // seed linearly instead.
            self.inertia_seed * self.inertia_decay_at(event.time)
        } else {
            self.pan_delta(event)
        };
        let mut synthesized = SyntheticGesture::new(
            event.position,
            event.modifiers,
            GesturePayload::Scroll {
                phase: GesturePhase::Update,
                delta,
                total: delta,
            },
        );
        synthesized.inertia = true;
        Some(synthesized)
    }

    fn inertia_decay_at(&self, time: u64) -> f64 {
        if self.config.inertia_decay == 0 {
            return 0.0;
        }
        let elapsed = time.saturating_sub(self.inertia_time) as f64;
        (1.0 - elapsed / self.config.inertia_decay as f64).clamp(0.0, 1.0)
    }
}

/// Map native swipe directions to a discrete direction.
///
/// Priority when several are non-zero: down, up, right, left.
pub fn swipe_direction(x: i32, y: i32) -> Option<SwipeDirection> {
    if y > 0 {
        Some(SwipeDirection::Down)
    } else if y < 0 {
        Some(SwipeDirection::Up)
    } else if x > 0 {
        Some(SwipeDirection::Right)
    } else if x < 0 {
        Some(SwipeDirection::Left)
    } else {
        None
    }
}
