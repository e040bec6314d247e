// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the gesture state machine.
//!
//! These exercise whole native sequences and check the exact synthesized
//! vocabulary the scene receives.

use hoststory_event_state::gesture::{
    GestureConfig, GestureSession, NativeGestureEvent, Synthesized, detail,
};
use hoststory_event_state::synthetic::{GestureKind, GesturePayload, GesturePhase};
use kurbo::{Point, Vec2};

fn at(time: u64, code: u32) -> NativeGestureEvent {
    NativeGestureEvent::new(time, code, Point::new(20.0, 30.0))
}

fn session() -> GestureSession {
    GestureSession::new(GestureConfig::default())
}

fn phases(out: &Synthesized) -> Vec<(Option<GestureKind>, Option<GesturePhase>)> {
    out.iter().map(|g| (g.kind(), g.phase())).collect()
}

fn scroll(payload: GesturePayload) -> (GesturePhase, Vec2, Vec2) {
    match payload {
        GesturePayload::Scroll {
            phase,
            delta,
            total,
        } => (phase, delta, total),
        other => panic!("expected scroll, got {other:?}"),
    }
}

#[test]
fn begin_pan_pan_end_is_started_update_update_finished() {
    let mut s = session();
    let mut all = Vec::new();
    all.extend(s.handle(&at(0, detail::BEGIN)).unwrap());
    all.extend(s.handle(&at(10, detail::PAN).with_direction(1, 2)).unwrap());
    all.extend(s.handle(&at(20, detail::PAN).with_direction(3, 0)).unwrap());
    all.extend(s.handle(&at(30, detail::END)).unwrap());

    let got: Vec<_> = all.iter().map(|g| scroll(g.payload)).collect();
    assert_eq!(
        got,
        vec![
            (GesturePhase::Started, Vec2::ZERO, Vec2::ZERO),
            (
                GesturePhase::Update,
                Vec2::new(5.0, 10.0),
                Vec2::new(5.0, 10.0)
            ),
            (
                GesturePhase::Update,
                Vec2::new(15.0, 0.0),
                Vec2::new(20.0, 10.0)
            ),
            (GesturePhase::Finished, Vec2::ZERO, Vec2::new(20.0, 10.0)),
        ]
    );
    assert!(all.iter().all(|g| !g.inertia));
    assert!(!s.is_active());
}

#[test]
fn second_pan_gesture_resets_total() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(10, detail::PAN).with_direction(1, 0)).unwrap();
    s.handle(&at(20, detail::END)).unwrap();

    s.handle(&at(1000, detail::BEGIN)).unwrap();
    let out = s.handle(&at(1010, detail::PAN).with_direction(1, 0)).unwrap();
    assert_eq!(scroll(out[0].payload).2, Vec2::ZERO);
    assert_eq!(scroll(out[1].payload).2, Vec2::new(5.0, 0.0));
}

#[test]
fn zoom_started_and_finished_are_neutral() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    let out = s
        .handle(&at(10, detail::MAGNIFY).with_magnification(1.5))
        .unwrap();
    assert_eq!(
        out[0].payload,
        GesturePayload::Zoom {
            phase: GesturePhase::Started,
            factor: 1.0,
            total_factor: 1.0,
        }
    );
    assert_eq!(
        out[1].payload,
        GesturePayload::Zoom {
            phase: GesturePhase::Update,
            factor: 1.5,
            total_factor: 1.5,
        }
    );
    let out = s
        .handle(&at(20, detail::MAGNIFY).with_magnification(3.0))
        .unwrap();
    assert_eq!(
        out[0].payload,
        GesturePayload::Zoom {
            phase: GesturePhase::Update,
            factor: 2.0,
            total_factor: 3.0,
        }
    );
    let out = s.handle(&at(30, detail::END)).unwrap();
    let GesturePayload::Zoom { phase, factor, .. } = out[0].payload else {
        panic!("expected zoom finished");
    };
    assert_eq!(phase, GesturePhase::Finished);
    assert_eq!(factor, 1.0);
}

#[test]
fn nested_kinds_finish_in_reverse_order() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(1, detail::PAN).with_direction(0, 1)).unwrap();
    s.handle(&at(2, detail::MAGNIFY).with_magnification(1.1))
        .unwrap();
    let out = s.handle(&at(3, detail::ROTATE).with_rotation(5.0)).unwrap();
    assert_eq!(
        phases(&out),
        vec![
            (Some(GestureKind::Rotate), Some(GesturePhase::Started)),
            (Some(GestureKind::Rotate), Some(GesturePhase::Update)),
        ]
    );
    // A second pan does not restart the bracket.
    let out = s.handle(&at(4, detail::PAN).with_direction(0, 1)).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(
        s.bracketed(),
        &[GestureKind::Scroll, GestureKind::Zoom, GestureKind::Rotate]
    );

    let out = s.handle(&at(5, detail::END)).unwrap();
    assert_eq!(
        phases(&out),
        vec![
            (Some(GestureKind::Rotate), Some(GesturePhase::Finished)),
            (Some(GestureKind::Zoom), Some(GesturePhase::Finished)),
            (Some(GestureKind::Scroll), Some(GesturePhase::Finished)),
        ]
    );
    assert!(s.bracketed().is_empty());
}

#[test]
fn inertia_without_direction_decays_linearly() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(10, detail::PAN).with_direction(0, 3)).unwrap();
    s.handle(&at(20, detail::END)).unwrap();
    assert!(s.is_inertia_active());

    let out = s.handle(&at(120, detail::PAN)).unwrap();
    assert_eq!(out.len(), 1);
    let (phase, delta, total) = scroll(out[0].payload);
    let expected = Vec2::new(0.0, 15.0) * (1.0 - 100.0 / 1500.0);
    assert_eq!(phase, GesturePhase::Update);
    assert!((delta - expected).hypot() < 1e-9, "delta {delta:?}");
    assert_ne!(delta, Vec2::ZERO);
    // Totals pass through during inertia.
    assert_eq!(total, delta);
    assert!(out[0].inertia);
}

#[test]
fn inertia_with_direction_uses_native_delta() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(10, detail::PAN).with_direction(0, 3)).unwrap();
    s.handle(&at(20, detail::END)).unwrap();

    let out = s.handle(&at(50, detail::PAN).with_direction(0, 1)).unwrap();
    let (_, delta, total) = scroll(out[0].payload);
    assert_eq!(delta, Vec2::new(0.0, 5.0));
    assert_eq!(total, delta);
}

#[test]
fn inertia_expires_after_timeout() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(10, detail::PAN).with_direction(0, 3)).unwrap();
    s.handle(&at(20, detail::END)).unwrap();

    let out = s.handle(&at(320, detail::PAN)).unwrap();
    assert!(out.is_empty());
    assert!(!s.is_inertia_active());
    // Stays expired even if the next frame is close.
    assert!(s.handle(&at(330, detail::PAN)).unwrap().is_empty());
}

#[test]
fn inertia_frames_extend_the_window() {
    let mut s = session();
    s.handle(&at(0, detail::BEGIN)).unwrap();
    s.handle(&at(10, detail::PAN).with_direction(0, 3)).unwrap();
    s.handle(&at(20, detail::END)).unwrap();

    // Frames 200 apart keep inertia alive well past the first timeout.
    let mut time = 20;
    let mut last = None;
    while time < 1620 {
        time += 200;
        let out = s.handle(&at(time, detail::PAN)).unwrap();
        assert_eq!(out.len(), 1, "inertia frame at {time}");
        last = Some(scroll(out[0].payload).1);
    }
    // Past the decay duration the synthesized delta is clamped to zero.
    assert_eq!(last, Some(Vec2::ZERO));

    assert!(s.handle(&at(time + 251, detail::PAN)).unwrap().is_empty());
}

#[test]
fn pan_without_gesture_or_inertia_is_dropped() {
    let mut s = session();
    assert!(s.handle(&at(0, detail::PAN).with_direction(1, 1)).unwrap().is_empty());
}
