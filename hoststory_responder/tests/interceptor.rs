// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the dispatch interceptor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hoststory_event_state::keys::KeyReconciler;
use hoststory_event_state::snapshot::{DisplayId, KeyEventKind, KeyPhase, Modifiers, NativeKeyEvent, WidgetId};
use hoststory_responder::chain::{ChainDispatcher, Outcome, Phase};
use hoststory_responder::interceptor::{DispatchInterceptor, InterceptorInstallation};
use hoststory_responder::scene::{
    DispatcherRef, EventDispatcher, RepaintTarget, SceneEvent, SceneEventKind, SceneHost,
    SceneId, SceneKeyEvent,
};
use hoststory_responder::throttle::{Clock, RedrawConfig};
use kurbo::Point;

struct Scene {
    dispatcher: RefCell<Option<DispatcherRef>>,
}

impl SceneHost for Scene {
    fn id(&self) -> SceneId {
        SceneId(3)
    }
    fn event_dispatcher(&self) -> Option<DispatcherRef> {
        self.dispatcher.borrow().clone()
    }
    fn set_event_dispatcher(&self, dispatcher: Option<DispatcherRef>) {
        *self.dispatcher.borrow_mut() = dispatcher;
    }
}

#[derive(Default)]
struct Canvas {
    repaints: Cell<u32>,
    flushes: Cell<u32>,
}

impl RepaintTarget for Canvas {
    fn force_repaint(&self) {
        self.repaints.set(self.repaints.get() + 1);
    }
    fn force_flush(&self) {
        self.flushes.set(self.flushes.get() + 1);
    }
}

#[derive(Default)]
struct ManualClock(Cell<u64>);

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.get()
    }
}

struct Fixture {
    scene: Rc<Scene>,
    root: DispatcherRef,
    canvas: Rc<Canvas>,
    clock: Rc<ManualClock>,
    hits: Rc<Cell<u32>>,
}

fn fixture() -> Fixture {
    let hits = Rc::new(Cell::new(0));
    let mut chain = ChainDispatcher::new(vec![1_u32]);
    let h = hits.clone();
    chain.add_handler(1, Some(Phase::Target), move |_, _| {
        h.set(h.get() + 1);
        Outcome::Continue
    });
    let root: DispatcherRef = Rc::new(RefCell::new(chain));
    Fixture {
        scene: Rc::new(Scene {
            dispatcher: RefCell::new(Some(root.clone())),
        }),
        root,
        canvas: Rc::new(Canvas::default()),
        clock: Rc::new(ManualClock::default()),
        hits,
    }
}

fn pointer() -> SceneEvent {
    SceneEvent::new(SceneEventKind::Pointer {
        position: Point::ORIGIN,
    })
}

fn key(phase: KeyPhase) -> SceneEvent {
    SceneEvent::key(SceneKeyEvent {
        phase,
        key_code: 0,
        character: 'x',
        modifiers: Modifiers::empty(),
    })
}

fn dispatch(scene: &Scene, event: &mut SceneEvent) {
    let dispatcher = scene.event_dispatcher().expect("scene has a dispatcher");
    dispatcher.borrow_mut().dispatch(event);
}

#[test]
fn delegates_then_repaints_once_per_interval() {
    let f = fixture();
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default());
    let _installed = InterceptorInstallation::install(f.scene.clone(), interceptor);

    for now in [10, 20, 39] {
        f.clock.0.set(now);
        dispatch(&f.scene, &mut pointer());
    }
    assert_eq!(f.hits.get(), 3);
    assert_eq!(f.canvas.repaints.get(), 0);

    f.clock.0.set(40);
    dispatch(&f.scene, &mut pointer());
    f.clock.0.set(60);
    dispatch(&f.scene, &mut pointer());
    assert_eq!(f.canvas.repaints.get(), 1);
    assert_eq!(f.canvas.flushes.get(), 0);

    f.clock.0.set(80);
    dispatch(&f.scene, &mut pointer());
    assert_eq!(f.canvas.repaints.get(), 2);
}

#[test]
fn flush_follows_repaint_when_configured() {
    let f = fixture();
    let config = RedrawConfig {
        interval: 10,
        flush_after_repaint: true,
    };
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), config);
    let _installed = InterceptorInstallation::install(f.scene.clone(), interceptor);
    f.clock.0.set(10);
    dispatch(&f.scene, &mut pointer());
    assert_eq!((f.canvas.repaints.get(), f.canvas.flushes.get()), (1, 1));
}

#[test]
fn vetoed_native_keys_consume_scene_keys() {
    let f = fixture();
    let keys = Rc::new(RefCell::new(KeyReconciler::new()));
    let mut vetoed = NativeKeyEvent::new(DisplayId(0), WidgetId(0), 1, KeyEventKind::Down)
        .with_character('x');
    vetoed.doit = false;
    keys.borrow_mut().settle(&vetoed);
    keys.borrow_mut()
        .settle(&NativeKeyEvent::new(DisplayId(0), WidgetId(0), 2, KeyEventKind::Up));

    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default())
        .with_key_reconciler(keys.clone());
    let _installed = InterceptorInstallation::install(f.scene.clone(), interceptor);

    let mut pressed = key(KeyPhase::Pressed);
    dispatch(&f.scene, &mut pressed);
    let mut typed = key(KeyPhase::Typed);
    dispatch(&f.scene, &mut typed);
    let mut released = key(KeyPhase::Released);
    dispatch(&f.scene, &mut released);

    assert!(pressed.is_consumed());
    assert!(typed.is_consumed());
    assert!(!released.is_consumed());
    assert_eq!(keys.borrow().pending_down(), 0);
    assert_eq!(keys.borrow().pending_up(), 0);
}

#[test]
fn keys_pass_through_without_reconciler() {
    let f = fixture();
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default());
    let _installed = InterceptorInstallation::install(f.scene.clone(), interceptor);
    let mut typed = key(KeyPhase::Typed);
    dispatch(&f.scene, &mut typed);
    assert!(!typed.is_consumed());
    assert_eq!(f.hits.get(), 1);
}

#[test]
fn detach_restores_previous_dispatcher() {
    let f = fixture();
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default());
    let mut installed = InterceptorInstallation::install(f.scene.clone(), interceptor);
    let current = f.scene.event_dispatcher().expect("interceptor installed");
    assert!(!Rc::ptr_eq(&current, &f.root));

    installed.detach();
    assert!(installed.is_detached());
    let restored = f.scene.event_dispatcher().expect("root restored");
    assert!(Rc::ptr_eq(&restored, &f.root));
}

#[test]
fn detach_restores_an_absent_dispatcher() {
    let f = fixture();
    f.scene.set_event_dispatcher(None);
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default());
    let mut installed = InterceptorInstallation::install(f.scene.clone(), interceptor);
    assert!(f.scene.event_dispatcher().is_some());
    // Without a wrapped dispatcher the interceptor still throttles.
    f.clock.0.set(100);
    dispatch(&f.scene, &mut pointer());
    assert_eq!(f.canvas.repaints.get(), 1);

    installed.detach();
    assert!(f.scene.event_dispatcher().is_none());
}

#[test]
#[should_panic(expected = "dispatch interceptor detached twice")]
fn detaching_twice_panics() {
    let f = fixture();
    let interceptor = DispatchInterceptor::new(f.canvas.clone(), f.clock.clone(), RedrawConfig::default());
    let mut installed = InterceptorInstallation::install(f.scene.clone(), interceptor);
    installed.detach();
    installed.detach();
}
