// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrap a scene's root dispatcher.
//!
//! [`DispatchInterceptor`] sits in front of the dispatcher a scene already has.
//! For every event, native or synthesized, it delegates first and then:
//!
//! 1. when a [`KeyReconciler`] is attached, marks a scene key event consumed
//!    if the settled native event of the same phase was vetoed;
//! 2. forces a repaint (and optionally a flush) once per redraw interval.
//!
//! [`InterceptorInstallation`] installs the wrapper on a scene and restores the
//! previous dispatcher on [`detach`](InterceptorInstallation::detach). Detach is
//! a single-level undo and may happen only once.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use hoststory_event_state::keys::KeyReconciler;
use tracing::{debug, trace};

use crate::scene::{
    DispatcherRef, EventDispatcher, RepaintTarget, SceneEvent, SceneEventKind, SceneHost,
};
use crate::throttle::{Clock, RedrawConfig, RedrawThrottle};

/// The wrapping dispatcher.
pub struct DispatchInterceptor {
    inner: Option<DispatcherRef>,
    repaint: Rc<dyn RepaintTarget>,
    clock: Rc<dyn Clock>,
    throttle: RedrawThrottle,
    flush_after_repaint: bool,
    keys: Option<Rc<RefCell<KeyReconciler>>>,
}

impl fmt::Debug for DispatchInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchInterceptor")
            .field("wraps", &self.inner.is_some())
            .field("throttle", &self.throttle)
            .field("flush_after_repaint", &self.flush_after_repaint)
            .field("reconciles_keys", &self.keys.is_some())
            .finish_non_exhaustive()
    }
}

impl DispatchInterceptor {
    /// Create an interceptor that repaints `repaint` per `config`.
    ///
    /// The interval starts now.
    pub fn new(repaint: Rc<dyn RepaintTarget>, clock: Rc<dyn Clock>, config: RedrawConfig) -> Self {
        let throttle = RedrawThrottle::new(config.interval, clock.now_millis());
        Self {
            inner: None,
            repaint,
            clock,
            throttle,
            flush_after_repaint: config.flush_after_repaint,
            keys: None,
        }
    }

    /// Correct key consumption from `keys`.
    #[must_use]
    pub fn with_key_reconciler(mut self, keys: Rc<RefCell<KeyReconciler>>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// The dispatcher being wrapped.
    pub fn inner(&self) -> Option<&DispatcherRef> {
        self.inner.as_ref()
    }

    fn reconcile_key(&self, event: &mut SceneEvent) {
        let (Some(keys), SceneEventKind::Key(key)) = (&self.keys, &event.kind) else {
            return;
        };
        let phase = key.phase;
        if keys.borrow_mut().resolve(phase) == Some(true) {
            trace!(?phase, "native key was vetoed; consuming scene key event");
            event.consume();
        }
    }
}

impl EventDispatcher for DispatchInterceptor {
    fn dispatch(&mut self, event: &mut SceneEvent) {
        if let Some(inner) = &self.inner {
            inner.borrow_mut().dispatch(event);
        }
        self.reconcile_key(event);
        if self.throttle.poll(self.clock.now_millis()) {
            trace!("forcing repaint");
            self.repaint.force_repaint();
            if self.flush_after_repaint {
                self.repaint.force_flush();
            }
        }
    }
}

/// A [`DispatchInterceptor`] installed on a scene.
pub struct InterceptorInstallation {
    scene: Rc<dyn SceneHost>,
    previous: Option<DispatcherRef>,
    interceptor: Rc<RefCell<DispatchInterceptor>>,
    detached: bool,
}

impl fmt::Debug for InterceptorInstallation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorInstallation")
            .field("scene", &self.scene.id())
            .field("had_previous", &self.previous.is_some())
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

impl InterceptorInstallation {
    /// Wrap the scene's current dispatcher with `interceptor` and install it.
    pub fn install(scene: Rc<dyn SceneHost>, mut interceptor: DispatchInterceptor) -> Self {
        let previous = scene.event_dispatcher();
        interceptor.inner = previous.clone();
        let interceptor = Rc::new(RefCell::new(interceptor));
        let installed: DispatcherRef = interceptor.clone();
        scene.set_event_dispatcher(Some(installed));
        debug!(scene = ?scene.id(), "dispatch interceptor installed");
        Self {
            scene,
            previous,
            interceptor,
            detached: false,
        }
    }

    /// The installed interceptor.
    pub fn interceptor(&self) -> &Rc<RefCell<DispatchInterceptor>> {
        &self.interceptor
    }

    /// Whether [`detach`](Self::detach) already ran.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Restore the dispatcher the scene had before installation.
    ///
    /// # Panics
    ///
    /// Panics when called a second time.
    pub fn detach(&mut self) {
        assert!(!self.detached, "dispatch interceptor detached twice");
        self.detached = true;
        self.scene.set_event_dispatcher(self.previous.take());
        debug!(scene = ?self.scene.id(), "dispatch interceptor detached");
    }
}
