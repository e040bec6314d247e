// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for canvas creation and the scene → canvas lookup.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hoststory_canvas::config::{BridgeConfig, CanvasLookup};
use hoststory_canvas::factory::{CanvasFactory, DefaultCanvasFactory};
use hoststory_canvas::native::{CanvasError, NativeCanvas, NativeToolkit};
use hoststory_event_state::snapshot::WidgetId;
use hoststory_responder::cursor::{CursorError, ImageCursor, NativeCursor, NativeCursorFactory, PixelBuffer};
use hoststory_responder::executor::{AccessScope, PostQueue};
use hoststory_responder::interop::{InteropError, PeerId, PlatformInterop};
use hoststory_responder::scene::{RepaintTarget, SceneId, SceneListener};
use hoststory_responder::throttle::Clock;
use kurbo::Point;

struct Native(WidgetId);

impl RepaintTarget for Native {
    fn force_repaint(&self) {}
    fn force_flush(&self) {}
}

impl NativeCursorFactory for Native {
    fn create_cursor(&self, _pixels: &PixelBuffer, _hotspot: Point) -> Result<NativeCursor, CursorError> {
        Err(CursorError::Creation("unsupported".into()))
    }
    fn release_cursor(&self, _cursor: NativeCursor) {}
}

impl NativeCanvas for Native {
    fn widget(&self) -> WidgetId {
        self.0
    }
    fn to_display(&self, point: Point) -> Point {
        point
    }
}

/// Creates widgets numbered from 100; parent 0 does not exist.
#[derive(Default)]
struct Toolkit {
    created: Cell<u64>,
}

impl NativeToolkit for Toolkit {
    fn create_canvas(&self, parent: WidgetId) -> Result<Rc<dyn NativeCanvas>, CanvasError> {
        if parent == WidgetId(0) {
            return Err(CanvasError::NoParent(parent));
        }
        self.created.set(self.created.get() + 1);
        Ok(Rc::new(Native(WidgetId(99 + self.created.get()))))
    }
}

/// Scene `n` is shown by stage peer `n`, hosted by widget `99 + n`.
#[derive(Default)]
struct Interop {
    walked: RefCell<Vec<SceneId>>,
}

impl PlatformInterop for Interop {
    fn scene_peer(&self, _scope: &AccessScope) -> Option<PeerId> {
        None
    }
    fn scene_listener(
        &self,
        _peer: PeerId,
        _scope: &AccessScope,
    ) -> Option<Rc<RefCell<dyn SceneListener>>> {
        None
    }
    fn stage_peer(&self, scene: SceneId) -> Option<PeerId> {
        self.walked.borrow_mut().push(scene);
        Some(PeerId(scene.0))
    }
    fn peer_host(&self, peer: PeerId) -> Option<WidgetId> {
        Some(WidgetId(99 + peer.0))
    }
    fn scene_canvas(&self, scene: SceneId) -> Option<WidgetId> {
        (scene.0 != 0).then(|| WidgetId(99 + scene.0))
    }
    fn set_platform_cursor(
        &self,
        _cursor: &ImageCursor,
        _native: NativeCursor,
    ) -> Result<(), InteropError> {
        Ok(())
    }
}

struct Zero;

impl Clock for Zero {
    fn now_millis(&self) -> u64 {
        0
    }
}

fn factory(lookup: CanvasLookup) -> (DefaultCanvasFactory, Rc<Interop>) {
    let interop = Rc::new(Interop::default());
    let factory = DefaultCanvasFactory::new(
        Rc::new(Toolkit::default()),
        Rc::new(PostQueue::new()),
        interop.clone(),
        Rc::new(Zero),
        BridgeConfig::default().with_canvas_lookup(lookup),
    );
    (factory, interop)
}

#[test]
fn created_canvases_are_found_by_scene() {
    let (factory, interop) = factory(CanvasLookup::Direct);
    let first = factory.create_canvas(WidgetId(1)).unwrap();
    let second = factory.create_canvas(WidgetId(1)).unwrap();
    assert_eq!(first.widget(), WidgetId(100));
    assert_eq!(factory.registry().len(), 2);

    let found = factory.registry().canvas_for_scene(SceneId(2)).unwrap();
    assert!(Rc::ptr_eq(&found, &second));
    assert!(factory.registry().canvas_for_scene(SceneId(0)).is_none());
    assert!(factory.registry().canvas_for_scene(SceneId(7)).is_none());
    assert!(interop.walked.borrow().is_empty(), "direct lookup never walks peers");
}

#[test]
fn legacy_lookup_walks_stage_peers() {
    let (factory, interop) = factory(CanvasLookup::FieldWalk);
    let canvas = factory.create_canvas(WidgetId(1)).unwrap();
    let found = factory.registry().canvas_for_scene(SceneId(1)).unwrap();
    assert!(Rc::ptr_eq(&found, &canvas));
    assert_eq!(*interop.walked.borrow(), vec![SceneId(1)]);
}

#[test]
fn dropped_canvases_are_pruned() {
    let (factory, _interop) = factory(CanvasLookup::Direct);
    let canvas = factory.create_canvas(WidgetId(1)).unwrap();
    drop(canvas);
    assert_eq!(factory.registry().len(), 1);
    assert!(factory.registry().get(WidgetId(100)).is_none());
    assert!(factory.registry().is_empty());
}

#[test]
fn unregister_forgets_a_live_canvas() {
    let (factory, _interop) = factory(CanvasLookup::Direct);
    let canvas = factory.create_canvas(WidgetId(1)).unwrap();
    assert!(factory.registry().unregister(canvas.widget()));
    assert!(!factory.registry().unregister(canvas.widget()));
    assert!(factory.registry().canvas_for_scene(SceneId(1)).is_none());
    factory.registry().register(&canvas);
    assert!(factory.registry().canvas_for_scene(SceneId(1)).is_some());
}

#[test]
fn toolkit_failures_surface_to_the_caller() {
    let (factory, _interop) = factory(CanvasLookup::Direct);
    let err = factory.create_canvas(WidgetId(0)).unwrap_err();
    assert_eq!(err, CanvasError::NoParent(WidgetId(0)));
    assert!(err.to_string().contains("not available"));
    assert!(factory.registry().is_empty());
}
