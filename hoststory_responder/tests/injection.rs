// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for posting synthesized gestures into a scene.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hoststory_event_state::snapshot::{Modifiers, WidgetId};
use hoststory_event_state::synthetic::{
    GesturePayload, GesturePhase, SwipeDirection, SyntheticGesture,
};
use hoststory_responder::cursor::{ImageCursor, NativeCursor};
use hoststory_responder::executor::{AccessScope, PostQueue};
use hoststory_responder::injector::SceneEventInjector;
use hoststory_responder::interop::{InteropError, PeerId, PlatformInterop};
use hoststory_responder::scene::{SceneId, SceneListener};
use kurbo::{Point, Vec2};

#[derive(Default)]
struct Recorder {
    seen: Vec<(&'static str, SyntheticGesture)>,
}

impl SceneListener for Recorder {
    fn scroll_event(&mut self, event: &SyntheticGesture) {
        self.seen.push(("scroll", *event));
    }
    fn swipe_event(&mut self, event: &SyntheticGesture) {
        self.seen.push(("swipe", *event));
    }
}

#[derive(Default)]
struct Interop {
    listener: RefCell<Option<Rc<RefCell<Recorder>>>>,
    lookups: Cell<u32>,
    scopes: RefCell<Vec<SceneId>>,
}

impl PlatformInterop for Interop {
    fn scene_peer(&self, scope: &AccessScope) -> Option<PeerId> {
        self.scopes.borrow_mut().push(scope.scene());
        self.listener.borrow().as_ref().map(|_| PeerId(scope.scene().0))
    }

    fn scene_listener(
        &self,
        _peer: PeerId,
        _scope: &AccessScope,
    ) -> Option<Rc<RefCell<dyn SceneListener>>> {
        self.lookups.set(self.lookups.get() + 1);
        let listener: Rc<RefCell<dyn SceneListener>> = self.listener.borrow().clone()?;
        Some(listener)
    }

    fn stage_peer(&self, _scene: SceneId) -> Option<PeerId> {
        None
    }

    fn peer_host(&self, _peer: PeerId) -> Option<WidgetId> {
        None
    }

    fn set_platform_cursor(
        &self,
        _cursor: &ImageCursor,
        _native: NativeCursor,
    ) -> Result<(), InteropError> {
        Ok(())
    }
}

fn scroll(dy: f64) -> SyntheticGesture {
    SyntheticGesture {
        position: Point::new(1.0, 2.0),
        screen_position: Point::new(101.0, 202.0),
        modifiers: Modifiers::CONTROL,
        direct: false,
        inertia: false,
        touch_count: 0,
        payload: GesturePayload::Scroll {
            phase: GesturePhase::Update,
            delta: Vec2::new(0.0, dy),
            total: Vec2::new(0.0, dy),
        },
    }
}

#[test]
fn delivery_is_deferred_and_ordered() {
    let queue = Rc::new(PostQueue::new());
    let interop = Rc::new(Interop::default());
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    *interop.listener.borrow_mut() = Some(recorder.clone());

    let injector = SceneEventInjector::new(SceneId(7), queue.clone(), interop.clone());
    injector.inject(scroll(1.0));
    let swipe = SyntheticGesture {
        payload: GesturePayload::Swipe {
            direction: SwipeDirection::Left,
        },
        ..scroll(0.0)
    };
    injector.inject(swipe);
    injector.inject(scroll(2.0));

    assert!(recorder.borrow().seen.is_empty(), "injection ran synchronously");
    assert_eq!(queue.run_pending(), 3);

    let recorded = recorder.borrow();
    let seen = &recorded.seen;
    assert_eq!(
        seen.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        vec!["scroll", "swipe", "scroll"]
    );
    assert_eq!(seen[0].1, scroll(1.0));
    assert_eq!(seen[2].1.screen_position, Point::new(101.0, 202.0));
    assert_eq!(*interop.scopes.borrow(), vec![SceneId(7); 3]);
}

#[test]
fn listener_is_resolved_when_the_task_runs() {
    let queue = Rc::new(PostQueue::new());
    let interop = Rc::new(Interop::default());
    let first = Rc::new(RefCell::new(Recorder::default()));
    *interop.listener.borrow_mut() = Some(first.clone());

    let injector = SceneEventInjector::new(SceneId(1), queue.clone(), interop.clone());
    injector.inject(scroll(1.0));

    // The scene's peer is replaced before the task runs.
    let second = Rc::new(RefCell::new(Recorder::default()));
    *interop.listener.borrow_mut() = Some(second.clone());
    queue.run_pending();

    assert!(first.borrow().seen.is_empty());
    assert_eq!(second.borrow().seen.len(), 1);
    assert_eq!(interop.lookups.get(), 1);
}

#[test]
fn torn_down_scene_drops_events_silently() {
    let queue = Rc::new(PostQueue::new());
    let interop = Rc::new(Interop::default());
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    *interop.listener.borrow_mut() = Some(recorder.clone());

    let injector = SceneEventInjector::new(SceneId(1), queue.clone(), interop.clone());
    injector.inject(scroll(1.0));
    *interop.listener.borrow_mut() = None;

    assert_eq!(queue.run_pending(), 1);
    assert!(recorder.borrow().seen.is_empty());
    assert_eq!(interop.lookups.get(), 0);
}
