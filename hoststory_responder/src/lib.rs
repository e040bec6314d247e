// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hoststory Responder: the scene-side half of the Hoststory bridge.
//!
//! ## Overview
//!
//! Everything here runs on, or posts to, the embedded scene's own execution
//! context.
//!
//! - [`scene`]: the scene contracts the bridge consumes (root dispatcher,
//!   internal low-level listener, repaint target).
//! - [`chain`]: a capture → target → bubble dispatch chain usable as a scene's
//!   root dispatcher.
//! - [`executor`]: the "run later" primitive and the access-scope token that
//!   travels with every posted task, plus a ready-made FIFO [`PostQueue`].
//! - [`interop`]: privileged, per-capability access to scene internals.
//! - [`injector`]: posts synthesized gestures to a scene's internal listener,
//!   resolving the listener lazily when the task runs.
//! - [`throttle`]: the redraw interval and the [`Clock`] it reads.
//! - [`interceptor`]: wraps a scene's root dispatcher to correct key
//!   consumption and force throttled repaints; restores it on detach.
//! - [`cursor`]: bridges custom image cursors to native cursors.
//!
//! ## Wrapping a dispatcher
//!
//! ```
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//!
//! use hoststory_responder::chain::ChainDispatcher;
//! use hoststory_responder::interceptor::{DispatchInterceptor, InterceptorInstallation};
//! use hoststory_responder::scene::{
//!     DispatcherRef, EventDispatcher, RepaintTarget, SceneEvent, SceneEventKind, SceneHost,
//!     SceneId,
//! };
//! use hoststory_responder::throttle::{Clock, RedrawConfig};
//!
//! struct Scene(RefCell<Option<DispatcherRef>>);
//! impl SceneHost for Scene {
//!     fn id(&self) -> SceneId { SceneId(1) }
//!     fn event_dispatcher(&self) -> Option<DispatcherRef> { self.0.borrow().clone() }
//!     fn set_event_dispatcher(&self, d: Option<DispatcherRef>) { *self.0.borrow_mut() = d; }
//! }
//! struct Canvas(Cell<u32>);
//! impl RepaintTarget for Canvas {
//!     fn force_repaint(&self) { self.0.set(self.0.get() + 1); }
//!     fn force_flush(&self) {}
//! }
//! struct Now(Cell<u64>);
//! impl Clock for Now {
//!     fn now_millis(&self) -> u64 { self.0.get() }
//! }
//!
//! let root: DispatcherRef = Rc::new(RefCell::new(ChainDispatcher::new(vec![1_u32])));
//! let scene = Rc::new(Scene(RefCell::new(Some(root.clone()))));
//! let canvas = Rc::new(Canvas(Cell::new(0)));
//! let clock = Rc::new(Now(Cell::new(0)));
//!
//! let interceptor = DispatchInterceptor::new(canvas.clone(), clock.clone(), RedrawConfig::default());
//! let mut installed = InterceptorInstallation::install(scene.clone(), interceptor);
//!
//! clock.0.set(40);
//! let mut event = SceneEvent::new(SceneEventKind::Pointer { position: kurbo::Point::ORIGIN });
//! let dispatcher = scene.event_dispatcher().unwrap();
//! dispatcher.borrow_mut().dispatch(&mut event);
//! assert_eq!(canvas.0.get(), 1);
//!
//! installed.detach();
//! assert!(Rc::ptr_eq(&scene.event_dispatcher().unwrap(), &root));
//! ```
//!
//! This crate is `no_std` and uses `alloc`; the `std` feature adds
//! [`SystemClock`](throttle::SystemClock).
//!
//! [`PostQueue`]: executor::PostQueue
//! [`Clock`]: throttle::Clock

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chain;
pub mod cursor;
pub mod executor;
pub mod injector;
pub mod interceptor;
pub mod interop;
pub mod scene;
pub mod throttle;
