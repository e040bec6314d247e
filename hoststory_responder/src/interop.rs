// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Privileged access to scene internals.
//!
//! Some of what the bridge needs is not part of the scene's public API: its
//! platform peer, the internal listener for low-level input, the stage peer
//! used to find the hosting canvas on legacy platforms, and the setter that
//! installs a native cursor into a cursor's current frame. Each capability is
//! a named method here; implementations decide how to reach it on their
//! platform.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use hoststory_event_state::snapshot::WidgetId;

use crate::cursor::{ImageCursor, NativeCursor};
use crate::executor::AccessScope;
use crate::scene::{SceneId, SceneListener};

/// Name of the scene's internal cursor-frame setter.
///
/// The misspelling is the scene's own and must be matched exactly when the
/// setter is looked up by name.
pub const CURSOR_FRAME_SETTER: &str = "setPlatforCursor";

/// Identity of a platform peer object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

/// Failures of privileged access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InteropError {
    /// The scene has no platform peer (not shown, or torn down).
    #[error("scene {0:?} has no platform peer")]
    NoPeer(SceneId),
    /// An internal member could not be found.
    #[error("internal member `{0}` is unavailable")]
    MissingMember(&'static str),
    /// The platform rejected the call.
    #[error("platform call failed: {0}")]
    Platform(String),
}

/// Narrow, per-capability access to scene internals.
pub trait PlatformInterop {
    /// The platform peer of the scene `scope` grants access to.
    fn scene_peer(&self, scope: &AccessScope) -> Option<PeerId>;

    /// The internal low-level listener of a scene peer.
    ///
    /// Resolved on every call; scenes and peers are replaced freely.
    fn scene_listener(
        &self,
        peer: PeerId,
        scope: &AccessScope,
    ) -> Option<Rc<RefCell<dyn SceneListener>>>;

    /// The stage peer showing `scene`.
    fn stage_peer(&self, scene: SceneId) -> Option<PeerId>;

    /// The host widget embedding a stage peer.
    fn peer_host(&self, peer: PeerId) -> Option<WidgetId>;

    /// The host widget of `scene` through the scene's public accessor.
    ///
    /// Legacy platforms lack the accessor.
    fn scene_canvas(&self, _scene: SceneId) -> Option<WidgetId> {
        None
    }

    /// Install `native` as the platform cursor of `cursor`'s current frame.
    ///
    /// # Errors
    ///
    /// Any failure to reach or invoke [`CURSOR_FRAME_SETTER`].
    fn set_platform_cursor(
        &self,
        cursor: &ImageCursor,
        native: NativeCursor,
    ) -> Result<(), InteropError>;
}
