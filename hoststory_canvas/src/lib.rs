// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hoststory Canvas: embed a scene in a native canvas widget.
//!
//! This crate composes the state machines of `hoststory_event_state` and the
//! scene plumbing of `hoststory_responder` into one [`CanvasBridge`] per
//! native canvas.
//!
//! - [`config`]: [`BridgeConfig`], every platform switch, resolved once.
//! - [`native`]: what the bridge needs from the host toolkit.
//! - [`listeners`]: host key listeners, called in arrival order.
//! - [`bridge`]: the [`CanvasBridge`] and its native entry points.
//! - [`factory`]: the injectable [`CanvasFactory`] and the scene → canvas
//!   [`CanvasRegistry`].
//!
//! ## Wiring
//!
//! A host creates canvases through a [`CanvasFactory`], attaches a scene with
//! [`CanvasBridge::set_scene`] and forwards its native callbacks to the
//! bridge. The scene executor runs whatever the bridge posted.
//!
//! Listeners that should observe key events in order, including events the
//! bridge replays, must be registered on the bridge
//! ([`CanvasBridge::add_key_listener`], [`CanvasBridge::add_listener`]), not on
//! the native widget.
//!
//! This crate is `no_std` compatible (with `alloc`).
//!
//! [`BridgeConfig`]: config::BridgeConfig
//! [`CanvasBridge`]: bridge::CanvasBridge
//! [`CanvasBridge::set_scene`]: bridge::CanvasBridge::set_scene
//! [`CanvasBridge::add_key_listener`]: bridge::CanvasBridge::add_key_listener
//! [`CanvasBridge::add_listener`]: bridge::CanvasBridge::add_listener
//! [`CanvasFactory`]: factory::CanvasFactory
//! [`CanvasRegistry`]: factory::CanvasRegistry

#![no_std]

extern crate alloc;

pub mod bridge;
pub mod config;
pub mod factory;
pub mod listeners;
pub mod native;
