// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deliver synthesized gestures straight to a scene's internal listener.
//!
//! Injection never calls the scene from the native callback. It posts a task
//! to the scene's executor; the task resolves the scene peer and its internal
//! listener when it runs, under the access scope captured at post time. When
//! either is gone the event is dropped silently: the scene was torn down
//! before the task ran.
//!
//! Positions are taken from the event as given. Callers resolve
//! [`SyntheticGesture::screen_position`] before injecting, since the widget's
//! display mapping must be the one in effect for the native event.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use hoststory_event_state::synthetic::SyntheticGesture;
use tracing::trace;

use crate::executor::{AccessScope, SceneExecutor};
use crate::interop::PlatformInterop;
use crate::scene::{SceneId, deliver_gesture};

/// Posts synthesized gestures to one scene.
pub struct SceneEventInjector {
    scene: SceneId,
    executor: Rc<dyn SceneExecutor>,
    interop: Rc<dyn PlatformInterop>,
}

impl fmt::Debug for SceneEventInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneEventInjector")
            .field("scene", &self.scene)
            .finish_non_exhaustive()
    }
}

impl SceneEventInjector {
    /// Inject into `scene` through `executor`.
    pub fn new(
        scene: SceneId,
        executor: Rc<dyn SceneExecutor>,
        interop: Rc<dyn PlatformInterop>,
    ) -> Self {
        Self {
            scene,
            executor,
            interop,
        }
    }

    /// Target scene.
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// Schedule delivery of `event`.
    pub fn inject(&self, event: SyntheticGesture) {
        let scope = self.executor.access_scope(self.scene);
        let interop = Rc::clone(&self.interop);
        self.executor.post(
            scope,
            Box::new(move |scope: &AccessScope| {
                let Some(peer) = interop.scene_peer(scope) else {
                    trace!(scene = ?scope.scene(), "scene peer gone; gesture dropped");
                    return;
                };
                let Some(listener) = interop.scene_listener(peer, scope) else {
                    trace!(scene = ?scope.scene(), "scene listener gone; gesture dropped");
                    return;
                };
                trace!(payload = ?event.payload, "injecting gesture");
                deliver_gesture(&mut *listener.borrow_mut(), &event);
            }),
        );
    }
}
