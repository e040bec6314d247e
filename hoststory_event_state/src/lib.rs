// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hoststory Event State: native input state machines for a scene graph
//! embedded in a host windowing toolkit.
//!
//! The host toolkit and the embedded scene were designed independently. The
//! host delivers one mutable event per device signal; the scene expects typed,
//! consumable events, with gestures bracketed per kind. This crate holds the
//! state that translating between the two requires:
//!
//! - [`snapshot`]: immutable copies of native key events, taken before any
//!   listener runs, compared by value.
//! - [`keys`]: the key reconciliation queue, which delivers native key events
//!   strictly in arrival order and remembers whether each was vetoed so the
//!   scene's derived key events can be marked consumed.
//! - [`gesture`]: the gesture state machine, which expands a native compound
//!   gesture into nested started/update/finished sequences and continues pans
//!   with inertia after the gesture ends.
//! - [`wheel`]: wheel ticks normalized into the same scroll vocabulary.
//! - [`synthetic`]: the synthesized gesture events themselves.
//!
//! Nothing here talks to a toolkit or a scene. Callers feed native events in
//! and deliver what comes out; `hoststory_canvas` wires both ends.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use hoststory_event_state::gesture::{detail, GestureConfig, GestureSession, NativeGestureEvent};
//! use hoststory_event_state::synthetic::{GesturePayload, GesturePhase};
//!
//! let mut session = GestureSession::new(GestureConfig::default());
//! let pan = |time, x, y| {
//!     NativeGestureEvent::new(time, detail::PAN, Point::new(5.0, 5.0)).with_direction(x, y)
//! };
//!
//! session.handle(&NativeGestureEvent::new(0, detail::BEGIN, Point::ORIGIN)).unwrap();
//! session.handle(&pan(10, 1, 0)).unwrap();
//! let out = session.handle(&pan(20, 1, 0)).unwrap();
//! assert_eq!(
//!     out[0].payload,
//!     GesturePayload::Scroll {
//!         phase: GesturePhase::Update,
//!         delta: Vec2::new(5.0, 0.0),
//!         total: Vec2::new(10.0, 0.0),
//!     }
//! );
//! ```
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod gesture;
pub mod keys;
pub mod snapshot;
pub mod synthetic;
pub mod wheel;
