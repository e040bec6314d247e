// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas bridge.
//!
//! [`CanvasBridge`] sits between one native canvas widget and the scene it
//! shows. The host wires its native callbacks to the bridge's entry points:
//!
//! | Host callback | Entry point |
//! |---|---|
//! | display-wide key filter | [`CanvasBridge::filter_key`] |
//! | canvas key listener | [`CanvasBridge::handle_key`] |
//! | canvas gesture listener | [`CanvasBridge::handle_gesture`] |
//! | canvas wheel listener | [`CanvasBridge::handle_wheel`] |
//! | scene cursor property observer | [`CanvasBridge::scene_cursor_changed`] |
//!
//! Everything that reaches the scene is posted through the scene executor.
//! Key events go through the scene's root dispatcher, which the bridge wraps
//! with a [`DispatchInterceptor`] while a scene is attached. Gestures go to
//! the scene's internal listener through a [`SceneEventInjector`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hoststory_event_state::gesture::{GestureError, GestureSession, NativeGestureEvent};
use hoststory_event_state::keys::{DueKey, KeyReconciler};
use hoststory_event_state::snapshot::{KeyEventKind, KeyPhase, NativeKeyEvent, WidgetId};
use hoststory_event_state::synthetic::SyntheticGesture;
use hoststory_event_state::wheel::NativeWheelEvent;
use hoststory_responder::cursor::{CursorBridge, NativeCursor, NativeCursorFactory, SceneCursor};
use hoststory_responder::executor::{AccessScope, SceneExecutor};
use hoststory_responder::injector::SceneEventInjector;
use hoststory_responder::interceptor::{DispatchInterceptor, InterceptorInstallation};
use hoststory_responder::interop::PlatformInterop;
use hoststory_responder::scene::{RepaintTarget, SceneEvent, SceneHost, SceneKeyEvent};
use hoststory_responder::throttle::Clock;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::listeners::{EventListenerRef, KeyListenerRef, KeyListeners, ListenerId};
use crate::native::NativeCanvas;

/// Collaborators of a [`CanvasBridge`].
#[derive(Clone)]
pub struct BridgeParts {
    /// The native widget.
    pub native: Rc<dyn NativeCanvas>,
    /// Posts work to the scene's execution context.
    pub executor: Rc<dyn SceneExecutor>,
    /// Privileged access to scene internals.
    pub interop: Rc<dyn PlatformInterop>,
    /// Time source for the redraw throttle.
    pub clock: Rc<dyn Clock>,
}

impl fmt::Debug for BridgeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeParts")
            .field("widget", &self.native.widget())
            .finish_non_exhaustive()
    }
}

struct Attached {
    host: Rc<dyn SceneHost>,
    installation: InterceptorInstallation,
    injector: SceneEventInjector,
}

/// Connects a native canvas to an embedded scene.
pub struct CanvasBridge {
    config: BridgeConfig,
    native: Rc<dyn NativeCanvas>,
    executor: Rc<dyn SceneExecutor>,
    interop: Rc<dyn PlatformInterop>,
    clock: Rc<dyn Clock>,
    keys: Rc<RefCell<KeyReconciler>>,
    listeners: RefCell<KeyListeners>,
    gestures: RefCell<GestureSession>,
    scene: RefCell<Option<Attached>>,
    cursor: RefCell<SceneCursor>,
    cursor_bridge: Option<RefCell<CursorBridge>>,
}

impl fmt::Debug for CanvasBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasBridge")
            .field("widget", &self.native.widget())
            .field("config", &self.config)
            .field("scene", &self.scene.borrow().as_ref().map(|a| a.host.id()))
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CanvasBridge {
    /// Create a bridge for `parts.native`, without a scene.
    pub fn new(parts: BridgeParts, config: BridgeConfig) -> Rc<Self> {
        let cursor_bridge = config.bridge_image_cursors.then(|| {
            let factory: Rc<dyn NativeCursorFactory> = parts.native.clone();
            RefCell::new(CursorBridge::new(factory, Rc::clone(&parts.interop)))
        });
        Rc::new(Self {
            config,
            native: parts.native,
            executor: parts.executor,
            interop: parts.interop,
            clock: parts.clock,
            keys: Rc::new(RefCell::new(KeyReconciler::new())),
            listeners: RefCell::new(KeyListeners::default()),
            gestures: RefCell::new(GestureSession::new(config.gesture)),
            scene: RefCell::new(None),
            cursor: RefCell::new(SceneCursor::Default),
            cursor_bridge,
        })
    }

    /// The configuration this bridge was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The native widget.
    pub fn native(&self) -> &Rc<dyn NativeCanvas> {
        &self.native
    }

    /// Identity of the native widget.
    pub fn widget(&self) -> WidgetId {
        self.native.widget()
    }

    // Scene.

    /// The attached scene.
    pub fn scene(&self) -> Option<Rc<dyn SceneHost>> {
        self.scene.borrow().as_ref().map(|a| Rc::clone(&a.host))
    }

    /// Attach `scene`, detaching the previous one first.
    ///
    /// Attaching wraps the scene's root dispatcher; detaching restores it.
    /// Gesture state starts over. Scene key events still waiting to be
    /// dispatched are dropped along with their settled state. Observed key
    /// events survive, since they still have to be delivered in order.
    pub fn set_scene(&self, scene: Option<Rc<dyn SceneHost>>) {
        let previous = self.scene.borrow_mut().take();
        if let Some(mut attached) = previous {
            attached.installation.detach();
            debug!(scene = ?attached.host.id(), widget = ?self.widget(), "scene detached");
        }
        self.keys.borrow_mut().clear_settled();
        *self.gestures.borrow_mut() = GestureSession::new(self.config.gesture);
        let Some(host) = scene else {
            return;
        };
        let repaint: Rc<dyn RepaintTarget> = self.native.clone();
        let mut interceptor =
            DispatchInterceptor::new(repaint, Rc::clone(&self.clock), self.config.redraw);
        if self.config.reconcile_key_consumption {
            interceptor = interceptor.with_key_reconciler(Rc::clone(&self.keys));
        }
        let injector = SceneEventInjector::new(
            host.id(),
            Rc::clone(&self.executor),
            Rc::clone(&self.interop),
        );
        let installation = InterceptorInstallation::install(Rc::clone(&host), interceptor);
        debug!(scene = ?host.id(), widget = ?self.widget(), "scene attached");
        *self.scene.borrow_mut() = Some(Attached {
            host,
            installation,
            injector,
        });
    }

    // Listeners.

    /// Register a typed key listener.
    pub fn add_key_listener(&self, listener: KeyListenerRef) -> ListenerId {
        self.listeners.borrow_mut().add_typed(listener)
    }

    /// Register an untyped listener for key events of `kind`.
    pub fn add_listener(&self, kind: KeyEventKind, listener: EventListenerRef) -> ListenerId {
        self.listeners.borrow_mut().add_untyped(kind, listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    // Keys.

    /// Display-wide key filter; runs before any listener.
    ///
    /// Events for other widgets are ignored.
    pub fn filter_key(&self, event: &NativeKeyEvent) {
        if !self.config.reconcile_key_consumption || event.widget != self.widget() {
            return;
        }
        self.keys.borrow_mut().observe(event);
    }

    /// Key listener on the canvas.
    ///
    /// With key reconciliation, every earlier observed event is delivered
    /// first, then `event` itself unless it was already delivered.
    ///
    /// # Panics
    ///
    /// With key reconciliation, panics if [`filter_key`](Self::filter_key)
    /// observed nothing.
    pub fn handle_key(&self, event: &mut NativeKeyEvent) {
        if !self.config.reconcile_key_consumption {
            self.deliver_key(event);
            return;
        }
        let due = self.keys.borrow_mut().drain_due(event);
        for entry in due {
            match entry {
                DueKey::Earlier(snapshot) => {
                    let mut replay = snapshot.to_event();
                    self.deliver_key(&mut replay);
                }
                DueKey::Current => self.deliver_key(event),
            }
        }
    }

    fn deliver_key(&self, event: &mut NativeKeyEvent) {
        let listeners = self.listeners.borrow().snapshot();
        listeners.forward(event);
        let target = self
            .scene
            .borrow()
            .as_ref()
            .map(|a| (Rc::downgrade(&a.host), a.host.id()));
        let Some((host, id)) = target else {
            trace!(time = event.time, "no scene attached; key event not delivered");
            return;
        };
        let settled = self.config.reconcile_key_consumption;
        if settled {
            self.keys.borrow_mut().settle(event);
        }
        let keys = scene_key_events(event);
        let reconciler = Rc::clone(&self.keys);
        let epoch = reconciler.borrow().epoch();
        let scope = self.executor.access_scope(id);
        self.executor.post(
            scope,
            Box::new(move |_: &AccessScope| {
                if reconciler.borrow().epoch() != epoch {
                    trace!(scene = ?id, "scene switched; key event dropped");
                    return;
                }
                let Some(dispatcher) = host.upgrade().and_then(|host| host.event_dispatcher())
                else {
                    trace!(scene = ?id, "scene gone; key event dropped");
                    if settled {
                        reconciler
                            .borrow_mut()
                            .discard(keys.iter().map(|key| key.phase));
                    }
                    return;
                };
                for key in keys {
                    let mut event = SceneEvent::key(key);
                    dispatcher.borrow_mut().dispatch(&mut event);
                    trace!(phase = ?key.phase, consumed = event.is_consumed(), "scene key dispatched");
                }
            }),
        );
    }

    // Gestures.

    /// Gesture listener on the canvas.
    ///
    /// # Errors
    ///
    /// [`GestureError`] for a detail code the bridge does not know. Nothing is
    /// synthesized for that event.
    pub fn handle_gesture(&self, event: &NativeGestureEvent) -> Result<(), GestureError> {
        if !self.config.synthesize_gestures {
            return Ok(());
        }
        let synthesized = self.gestures.borrow_mut().handle(event)?;
        for gesture in synthesized {
            self.inject(gesture);
        }
        Ok(())
    }

    /// Wheel listener on the canvas.
    pub fn handle_wheel(&self, event: &NativeWheelEvent) {
        if !self.config.synthesize_gestures {
            return;
        }
        let gesture = self.gestures.borrow_mut().wheel(event);
        if let Some(gesture) = gesture {
            self.inject(gesture);
        }
    }

    /// Whether a compound gesture or its inertia is in progress.
    pub fn is_gesturing(&self) -> bool {
        let gestures = self.gestures.borrow();
        gestures.is_active() || gestures.is_inertia_active()
    }

    fn inject(&self, mut gesture: SyntheticGesture) {
        // Resolve against the display now, not when the post runs.
        gesture.screen_position = self.native.to_display(gesture.position);
        match self.scene.borrow().as_ref() {
            Some(attached) => attached.injector.inject(gesture),
            None => trace!(payload = ?gesture.payload, "no scene attached; gesture dropped"),
        }
    }

    // Cursor.

    /// The scene's current cursor as last reported or set.
    pub fn cursor(&self) -> SceneCursor {
        self.cursor.borrow().clone()
    }

    /// Set the cursor.
    pub fn set_cursor(&self, cursor: SceneCursor) {
        self.scene_cursor_changed(&cursor);
    }

    /// Observer for the scene's cursor property.
    pub fn scene_cursor_changed(&self, cursor: &SceneCursor) {
        *self.cursor.borrow_mut() = cursor.clone();
        if let Some(bridge) = &self.cursor_bridge {
            bridge.borrow_mut().cursor_changed(cursor);
        }
    }

    /// The native cursor installed for the last custom image cursor.
    pub fn installed_cursor(&self) -> Option<NativeCursor> {
        self.cursor_bridge
            .as_ref()
            .and_then(|bridge| bridge.borrow().installed())
    }
}

impl Drop for CanvasBridge {
    fn drop(&mut self) {
        if let Some(mut attached) = self.scene.get_mut().take() {
            attached.installation.detach();
        }
    }
}

/// The scene key events a native key event turns into.
fn scene_key_events(event: &NativeKeyEvent) -> Vec<SceneKeyEvent> {
    let key = |phase| SceneKeyEvent {
        phase,
        key_code: event.key_code,
        character: event.character,
        modifiers: event.modifiers,
    };
    match event.kind {
        KeyEventKind::Down if event.character != '\0' => {
            alloc::vec![key(KeyPhase::Pressed), key(KeyPhase::Typed)]
        }
        KeyEventKind::Down => alloc::vec![key(KeyPhase::Pressed)],
        KeyEventKind::Up => alloc::vec![key(KeyPhase::Released)],
    }
}
