// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas construction and the scene → canvas lookup.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use hoststory_event_state::snapshot::WidgetId;
use hoststory_responder::executor::SceneExecutor;
use hoststory_responder::interop::PlatformInterop;
use hoststory_responder::scene::SceneId;
use hoststory_responder::throttle::Clock;
use tracing::debug;

use crate::bridge::{BridgeParts, CanvasBridge};
use crate::config::{BridgeConfig, CanvasLookup};
use crate::native::{CanvasError, NativeToolkit};

/// Creates embedded canvases.
///
/// Hosts inject the implementation; [`DefaultCanvasFactory`] covers the
/// common case.
pub trait CanvasFactory {
    /// Create a canvas inside `parent`.
    ///
    /// # Errors
    ///
    /// See [`CanvasError`].
    fn create_canvas(&self, parent: WidgetId) -> Result<Rc<CanvasBridge>, CanvasError>;
}

/// Canvases by host widget, for finding the canvas that shows a scene.
///
/// Holds weak references; dropped canvases disappear on their own.
pub struct CanvasRegistry {
    lookup: CanvasLookup,
    interop: Rc<dyn PlatformInterop>,
    canvases: RefCell<HashMap<WidgetId, Weak<CanvasBridge>>>,
}

impl fmt::Debug for CanvasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRegistry")
            .field("lookup", &self.lookup)
            .field("canvases", &self.canvases.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CanvasRegistry {
    /// An empty registry resolving scenes with `lookup`.
    pub fn new(lookup: CanvasLookup, interop: Rc<dyn PlatformInterop>) -> Self {
        Self {
            lookup,
            interop,
            canvases: RefCell::new(HashMap::new()),
        }
    }

    /// Track `canvas` under its widget.
    pub fn register(&self, canvas: &Rc<CanvasBridge>) {
        self.canvases
            .borrow_mut()
            .insert(canvas.widget(), Rc::downgrade(canvas));
    }

    /// Stop tracking the canvas of `widget`.
    pub fn unregister(&self, widget: WidgetId) -> bool {
        self.canvases.borrow_mut().remove(&widget).is_some()
    }

    /// The live canvas of `widget`.
    pub fn get(&self, widget: WidgetId) -> Option<Rc<CanvasBridge>> {
        let mut canvases = self.canvases.borrow_mut();
        let canvas = canvases.get(&widget)?.upgrade();
        if canvas.is_none() {
            canvases.remove(&widget);
        }
        canvas
    }

    /// Number of tracked canvases, including dropped ones not yet pruned.
    pub fn len(&self) -> usize {
        self.canvases.borrow().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.canvases.borrow().is_empty()
    }

    /// The canvas embedding `scene`, if any.
    pub fn canvas_for_scene(&self, scene: SceneId) -> Option<Rc<CanvasBridge>> {
        let widget = match self.lookup {
            CanvasLookup::Direct => self.interop.scene_canvas(scene)?,
            CanvasLookup::FieldWalk => {
                let peer = self.interop.stage_peer(scene)?;
                self.interop.peer_host(peer)?
            }
        };
        self.get(widget)
    }
}

/// Builds [`CanvasBridge`]s on widgets from a [`NativeToolkit`] and registers
/// them.
pub struct DefaultCanvasFactory {
    toolkit: Rc<dyn NativeToolkit>,
    executor: Rc<dyn SceneExecutor>,
    interop: Rc<dyn PlatformInterop>,
    clock: Rc<dyn Clock>,
    config: BridgeConfig,
    registry: Rc<CanvasRegistry>,
}

impl fmt::Debug for DefaultCanvasFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCanvasFactory")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl DefaultCanvasFactory {
    /// A factory sharing `executor`, `interop` and `clock` between canvases.
    ///
    /// The registry uses the lookup strategy of `config`.
    pub fn new(
        toolkit: Rc<dyn NativeToolkit>,
        executor: Rc<dyn SceneExecutor>,
        interop: Rc<dyn PlatformInterop>,
        clock: Rc<dyn Clock>,
        config: BridgeConfig,
    ) -> Self {
        let registry = Rc::new(CanvasRegistry::new(config.canvas_lookup, Rc::clone(&interop)));
        Self {
            toolkit,
            executor,
            interop,
            clock,
            config,
            registry,
        }
    }

    /// Registry of the canvases this factory created.
    pub fn registry(&self) -> &Rc<CanvasRegistry> {
        &self.registry
    }
}

impl CanvasFactory for DefaultCanvasFactory {
    fn create_canvas(&self, parent: WidgetId) -> Result<Rc<CanvasBridge>, CanvasError> {
        let native = self.toolkit.create_canvas(parent)?;
        let canvas = CanvasBridge::new(
            BridgeParts {
                native,
                executor: Rc::clone(&self.executor),
                interop: Rc::clone(&self.interop),
                clock: Rc::clone(&self.clock),
            },
            self.config,
        );
        self.registry.register(&canvas);
        debug!(?parent, widget = ?canvas.widget(), "canvas created");
        Ok(canvas)
    }
}
