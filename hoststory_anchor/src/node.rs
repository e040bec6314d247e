// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The curve node: a polyline whose points are bound to anchors.
//!
//! A [`CurveNode`] has a start and an end anchor and any number of ordered
//! control anchors in between. Each revision resolves every anchor into the
//! node's point buffer, then places the decorations, rebuilds the clip and
//! updates the clickable shadow.
//!
//! ## Propagation
//!
//! - Scene → node: every dynamic anchor observes its anchorage. When an
//!   anchorage moves, the node recomputes its dynamic points and everything
//!   derived from them.
//! - Node → scene: changing the node transform recomputes every dynamic
//!   anchor, and observers registered with [`CurveNode::observe`] run after
//!   every recomputation.
//!
//! ## Reference points
//!
//! A dynamic anchor aims at a neighbour: the start at the second point, every
//! other anchor at the point before it. The reference is the neighbour's
//! [`Anchor::reference_point`]: its fixed point when static, its anchorage
//! centroid when dynamic. Dynamic neighbours are never aimed at through their
//! cached positions, so the result does not depend on which point is
//! resolved first, and two dynamic ends aim at each other's centroid.
//!
//! ## Reentrancy
//!
//! Observers and anchorage notifications must not mutate the node they are
//! notified about.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Affine, BezPath, Line, ParamCurveNearest, Point, Rect};
use tracing::{debug, trace};

use crate::AnchorError;
use crate::anchor::{Anchor, AnchorRole};
use crate::anchorage::{Anchorage, ObserverId};
use crate::decoration::{ClipHole, ClipRegion, Decoration};

/// Which end of the curve a decoration sits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CurveEnd {
    /// At the start point.
    Start,
    /// At the end point.
    End,
}

/// Wider invisible copy of the curve, receiving pointer input.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickableShadow {
    /// Stroke width of the shadow.
    pub width: f64,
    /// Same points as the curve.
    pub path: BezPath,
}

/// Visual children of a curve node, in paint order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeChild {
    /// The clickable shadow, below the curve.
    Shadow,
    /// The curve itself.
    Curve,
    /// A decoration.
    Decoration(CurveEnd),
}

struct Subscription {
    anchorage: Rc<Anchorage>,
    id: ObserverId,
}

struct Binding {
    anchor: Anchor,
    // Shared with the anchorage observer so renumbering reaches it.
    role: Rc<Cell<AnchorRole>>,
    subscription: Option<Subscription>,
    position: Point,
}

impl Binding {
    fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.anchorage.unobserve(sub.id);
        }
    }
}

type NodeObserver = Rc<dyn Fn(&CurveNode)>;

struct CurveState {
    start: Binding,
    end: Binding,
    controls: Vec<Binding>,
    transform: Affine,
    decorations: [Option<Decoration>; 2],
    placements: [Option<Affine>; 2],
    clip: Option<ClipRegion>,
    stroke_width: f64,
    clickable_width: f64,
    shadow: Option<ClickableShadow>,
    keys: Option<Vec<AnchorRole>>,
    next_observer: u64,
    observers: Vec<(u64, NodeObserver)>,
}

impl Drop for CurveState {
    fn drop(&mut self) {
        self.start.detach();
        self.end.detach();
        for binding in &mut self.controls {
            binding.detach();
        }
    }
}

impl CurveState {
    fn len(&self) -> usize {
        self.controls.len() + 2
    }

    fn index_of(&self, role: AnchorRole) -> Option<usize> {
        match role {
            AnchorRole::Start => Some(0),
            AnchorRole::End => Some(self.len() - 1),
            AnchorRole::Control(i) => (i < self.controls.len()).then_some(i + 1),
        }
    }

    fn binding(&self, index: usize) -> &Binding {
        if index == 0 {
            &self.start
        } else if index == self.len() - 1 {
            &self.end
        } else {
            &self.controls[index - 1]
        }
    }

    fn binding_mut(&mut self, index: usize) -> &mut Binding {
        let last = self.len() - 1;
        if index == 0 {
            &mut self.start
        } else if index == last {
            &mut self.end
        } else {
            &mut self.controls[index - 1]
        }
    }

    fn positions(&self) -> Vec<Point> {
        (0..self.len()).map(|i| self.binding(i).position).collect()
    }

    fn renumber(&mut self) {
        for (i, binding) in self.controls.iter().enumerate() {
            binding.role.set(AnchorRole::Control(i));
        }
        self.end.role.set(AnchorRole::End);
        self.keys = None;
    }

    fn reference_for(&self, index: usize) -> Point {
        let other = if index == 0 { 1 } else { index - 1 };
        self.binding(other).anchor.reference_point(self.transform)
    }

    /// Recompute every cached point and everything derived from them.
    fn refresh(&mut self) {
        let n = self.len();
        for i in 0..n {
            let binding = self.binding_mut(i);
            if let Anchor::Static(p) = binding.anchor {
                binding.position = p;
            }
        }
        for i in 0..n {
            if !self.binding(i).anchor.is_dynamic() {
                continue;
            }
            let reference = self.reference_for(i);
            let transform = self.transform;
            let binding = self.binding_mut(i);
            binding.position = binding.anchor.resolve(reference, transform);
        }
        self.refresh_decorations();
        self.refresh_shadow();
    }

    fn refresh_decorations(&mut self) {
        let points = self.positions();
        let n = points.len();
        let ends = [(points[0], points[1]), (points[n - 1], points[n - 2])];
        for (slot, (tip, toward)) in ends.into_iter().enumerate() {
            self.placements[slot] = self.decorations[slot]
                .as_ref()
                .map(|deco| deco.placement(tip, toward));
        }
        let holes: Vec<ClipHole> = self
            .decorations
            .iter()
            .zip(&self.placements)
            .filter_map(|(deco, placement)| Some(ClipHole::new(deco.as_ref()?, (*placement)?)))
            .collect();
        self.clip = if holes.is_empty() {
            None
        } else {
            Some(ClipRegion {
                bounds: visual_bounds(&points, self.stroke_width),
                holes,
            })
        };
    }

    fn refresh_shadow(&mut self) {
        self.shadow = (self.clickable_width > self.stroke_width).then(|| ClickableShadow {
            width: self.clickable_width,
            path: polyline(&self.positions()),
        });
    }
}

fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
    }
    path
}

fn visual_bounds(points: &[Point], stroke_width: f64) -> Rect {
    let mut bounds = Rect::from_points(points[0], points[0]);
    for p in &points[1..] {
        bounds = bounds.union_pt(*p);
    }
    let half = stroke_width * 0.5;
    bounds.inflate(half, half)
}

fn check_finite(p: Point) -> Result<(), AnchorError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(AnchorError::NonFinite(p))
    }
}

fn check_anchor(anchor: &Anchor) -> Result<(), AnchorError> {
    match anchor {
        Anchor::Static(p) => check_finite(*p),
        Anchor::Dynamic { .. } => Ok(()),
    }
}

/// Handle to a curve node. Clones share the node.
#[derive(Clone)]
pub struct CurveNode {
    state: Rc<RefCell<CurveState>>,
}

impl fmt::Debug for CurveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("CurveNode")
            .field("points", &state.positions())
            .field("transform", &state.transform)
            .field("stroke_width", &state.stroke_width)
            .field("clickable_width", &state.clickable_width)
            .finish_non_exhaustive()
    }
}

impl CurveNode {
    /// Default stroke width.
    pub const STROKE_WIDTH: f64 = 1.0;

    /// A curve from `start` to `end`.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] for a static anchor at a non-finite point.
    pub fn new(start: Anchor, end: Anchor) -> Result<Self, AnchorError> {
        check_anchor(&start)?;
        check_anchor(&end)?;
        let unbound = |anchor, role| Binding {
            anchor,
            role: Rc::new(Cell::new(role)),
            subscription: None,
            position: Point::ORIGIN,
        };
        let node = Self {
            state: Rc::new(RefCell::new(CurveState {
                start: unbound(start, AnchorRole::Start),
                end: unbound(end, AnchorRole::End),
                controls: Vec::new(),
                transform: Affine::IDENTITY,
                decorations: [None, None],
                placements: [None, None],
                clip: None,
                stroke_width: Self::STROKE_WIDTH,
                clickable_width: 0.0,
                shadow: None,
                keys: None,
                next_observer: 0,
                observers: Vec::new(),
            })),
        };
        {
            let mut state = node.state.borrow_mut();
            node.attach(&mut state.start);
            node.attach(&mut state.end);
            state.refresh();
        }
        Ok(node)
    }

    /// A curve through `points`, all fixed.
    ///
    /// # Errors
    ///
    /// See [`set_points`](Self::set_points).
    pub fn from_points(points: &[Point]) -> Result<Self, AnchorError> {
        if points.len() < 2 {
            return Err(AnchorError::TooFewPoints(points.len()));
        }
        let node = Self::new(
            Anchor::fixed(points[0]),
            Anchor::fixed(points[points.len() - 1]),
        )?;
        node.set_points(points)?;
        Ok(node)
    }

    fn attach(&self, binding: &mut Binding) {
        binding.detach();
        let Some(anchorage) = binding.anchor.anchorage() else {
            return;
        };
        let weak: Weak<RefCell<CurveState>> = Rc::downgrade(&self.state);
        let role = Rc::clone(&binding.role);
        let id = anchorage.observe(move |_| {
            if let Some(state) = weak.upgrade() {
                CurveNode { state }.anchorage_moved(role.get());
            }
        });
        binding.subscription = Some(Subscription {
            anchorage: Rc::clone(anchorage),
            id,
        });
    }

    fn anchorage_moved(&self, role: AnchorRole) {
        {
            let mut state = self.state.borrow_mut();
            debug_assert!(
                state.index_of(role).is_some(),
                "anchorage observer registered under stale role {role:?}"
            );
            trace!(?role, "anchorage moved");
            state.refresh();
        }
        self.notify();
    }

    fn notify(&self) {
        let observers: Vec<NodeObserver> = self
            .state
            .borrow()
            .observers
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer(self);
        }
    }

    /// Run `f` on the state, refresh, then notify observers.
    fn mutate<R>(&self, f: impl FnOnce(&Self, &mut CurveState) -> R) -> R {
        let result = {
            let mut state = self.state.borrow_mut();
            let result = f(self, &mut *state);
            state.refresh();
            result
        };
        self.notify();
        result
    }

    fn replace(&self, state: &mut CurveState, index: usize, anchor: Anchor) {
        let binding = state.binding_mut(index);
        binding.detach();
        binding.anchor = anchor;
        self.attach(binding);
    }

    fn new_binding(&self, anchor: Anchor, role: AnchorRole) -> Binding {
        let mut binding = Binding {
            anchor,
            role: Rc::new(Cell::new(role)),
            subscription: None,
            position: Point::ORIGIN,
        };
        self.attach(&mut binding);
        binding
    }

    // Anchors.

    /// Anchor bound to `role`.
    pub fn anchor(&self, role: AnchorRole) -> Option<Anchor> {
        let state = self.state.borrow();
        let index = state.index_of(role)?;
        Some(state.binding(index).anchor.clone())
    }

    /// Bind `anchor` to `role`, replacing the previous binding.
    ///
    /// # Errors
    ///
    /// [`AnchorError::IndexOutOfRange`] for a missing control index and
    /// [`AnchorError::NonFinite`] for a non-finite static point.
    pub fn set_anchor(&self, role: AnchorRole, anchor: Anchor) -> Result<(), AnchorError> {
        check_anchor(&anchor)?;
        let index = {
            let state = self.state.borrow();
            state.index_of(role).ok_or(AnchorError::IndexOutOfRange {
                index: control_index(role),
                len: state.controls.len(),
            })?
        };
        self.mutate(|node, state| node.replace(state, index, anchor));
        Ok(())
    }

    /// Start anchor.
    pub fn start_anchor(&self) -> Anchor {
        self.state.borrow().start.anchor.clone()
    }

    /// Replace the start anchor.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] for a non-finite static point.
    pub fn set_start_anchor(&self, anchor: Anchor) -> Result<(), AnchorError> {
        self.set_anchor(AnchorRole::Start, anchor)
    }

    /// End anchor.
    pub fn end_anchor(&self) -> Anchor {
        self.state.borrow().end.anchor.clone()
    }

    /// Replace the end anchor.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] for a non-finite static point.
    pub fn set_end_anchor(&self, anchor: Anchor) -> Result<(), AnchorError> {
        self.set_anchor(AnchorRole::End, anchor)
    }

    /// Control anchors in order.
    pub fn control_anchors(&self) -> Vec<Anchor> {
        self.state
            .borrow()
            .controls
            .iter()
            .map(|b| b.anchor.clone())
            .collect()
    }

    /// Insert a control anchor at `index`, shifting later ones.
    ///
    /// # Errors
    ///
    /// [`AnchorError::IndexOutOfRange`] if `index` exceeds the control count.
    pub fn insert_control_anchor(&self, index: usize, anchor: Anchor) -> Result<(), AnchorError> {
        check_anchor(&anchor)?;
        let len = self.state.borrow().controls.len();
        if index > len {
            return Err(AnchorError::IndexOutOfRange { index, len });
        }
        self.mutate(|node, state| {
            let binding = node.new_binding(anchor, AnchorRole::Control(index));
            state.controls.insert(index, binding);
            state.renumber();
        });
        Ok(())
    }

    /// Remove and return the control anchor at `index`.
    ///
    /// # Errors
    ///
    /// [`AnchorError::IndexOutOfRange`] for a missing index.
    pub fn remove_control_anchor(&self, index: usize) -> Result<Anchor, AnchorError> {
        let len = self.state.borrow().controls.len();
        if index >= len {
            return Err(AnchorError::IndexOutOfRange { index, len });
        }
        Ok(self.mutate(|_, state| {
            let mut binding = state.controls.remove(index);
            binding.detach();
            state.renumber();
            binding.anchor.clone()
        }))
    }

    /// Replace all control anchors.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] if any static anchor is non-finite; nothing
    /// changes in that case.
    pub fn set_control_anchors(&self, anchors: Vec<Anchor>) -> Result<(), AnchorError> {
        anchors.iter().try_for_each(check_anchor)?;
        self.mutate(|node, state| node.replace_controls(state, anchors));
        Ok(())
    }

    fn replace_controls(&self, state: &mut CurveState, anchors: Vec<Anchor>) {
        for binding in &mut state.controls {
            binding.detach();
        }
        state.controls = anchors
            .into_iter()
            .enumerate()
            .map(|(i, anchor)| self.new_binding(anchor, AnchorRole::Control(i)))
            .collect();
        state.renumber();
    }

    /// Roles in point order: start, controls, end.
    ///
    /// Cached until the next structural change.
    pub fn anchor_keys(&self) -> Vec<AnchorRole> {
        let mut state = self.state.borrow_mut();
        let controls = state.controls.len();
        state
            .keys
            .get_or_insert_with(|| {
                core::iter::once(AnchorRole::Start)
                    .chain((0..controls).map(AnchorRole::Control))
                    .chain(core::iter::once(AnchorRole::End))
                    .collect()
            })
            .clone()
    }

    // Points.

    /// Resolved start point, local coordinates.
    pub fn start_point(&self) -> Point {
        self.state.borrow().start.position
    }

    /// Fix the start at `point`.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] for a non-finite point.
    pub fn set_start_point(&self, point: Point) -> Result<(), AnchorError> {
        self.set_anchor(AnchorRole::Start, Anchor::fixed(point))
    }

    /// Resolved end point, local coordinates.
    pub fn end_point(&self) -> Point {
        self.state.borrow().end.position
    }

    /// Fix the end at `point`.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`] for a non-finite point.
    pub fn set_end_point(&self, point: Point) -> Result<(), AnchorError> {
        self.set_anchor(AnchorRole::End, Anchor::fixed(point))
    }

    /// Resolved control point at `index`.
    pub fn control_point(&self, index: usize) -> Option<Point> {
        self.state.borrow().controls.get(index).map(|b| b.position)
    }

    /// Fix control point `index` at `point`.
    ///
    /// # Errors
    ///
    /// See [`set_anchor`](Self::set_anchor).
    pub fn set_control_point(&self, index: usize, point: Point) -> Result<(), AnchorError> {
        self.set_anchor(AnchorRole::Control(index), Anchor::fixed(point))
    }

    /// Resolved control points.
    pub fn control_points(&self) -> Vec<Point> {
        self.state
            .borrow()
            .controls
            .iter()
            .map(|b| b.position)
            .collect()
    }

    /// Replace all control anchors with fixed points.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NonFinite`]; nothing changes in that case.
    pub fn set_control_points(&self, points: &[Point]) -> Result<(), AnchorError> {
        self.set_control_anchors(points.iter().copied().map(Anchor::fixed).collect())
    }

    /// All resolved points: start, controls, end.
    pub fn points(&self) -> Vec<Point> {
        self.state.borrow().positions()
    }

    /// Replace every anchor with fixed points.
    ///
    /// The first and last points become the start and end; the rest become
    /// control points.
    ///
    /// # Errors
    ///
    /// [`AnchorError::TooFewPoints`] for fewer than two points and
    /// [`AnchorError::NonFinite`] for a non-finite point. Nothing changes in
    /// either case.
    pub fn set_points(&self, points: &[Point]) -> Result<(), AnchorError> {
        if points.len() < 2 {
            return Err(AnchorError::TooFewPoints(points.len()));
        }
        points.iter().copied().try_for_each(check_finite)?;
        let last = points.len() - 1;
        self.mutate(|node, state| {
            node.replace(state, 0, Anchor::fixed(points[0]));
            let end = state.len() - 1;
            node.replace(state, end, Anchor::fixed(points[last]));
            let controls = points[1..last].iter().copied().map(Anchor::fixed).collect();
            node.replace_controls(state, controls);
        });
        debug!(points = points.len(), "curve points replaced");
        Ok(())
    }

    /// The curve as a polyline path.
    pub fn path(&self) -> BezPath {
        polyline(&self.points())
    }

    // Transform.

    /// Local-to-scene transform.
    pub fn transform(&self) -> Affine {
        self.state.borrow().transform
    }

    /// Change the local-to-scene transform; dynamic anchors are recomputed.
    pub fn set_transform(&self, transform: Affine) {
        self.mutate(|_, state| state.transform = transform);
    }

    // Decorations.

    /// Decoration at `end`.
    pub fn decoration(&self, end: CurveEnd) -> Option<Decoration> {
        self.state.borrow().decorations[end as usize].clone()
    }

    /// Set or clear the decoration at `end`.
    pub fn set_decoration(&self, end: CurveEnd, decoration: Option<Decoration>) {
        self.mutate(|_, state| state.decorations[end as usize] = decoration);
    }

    /// Placement of the decoration at `end`, if present.
    pub fn decoration_transform(&self, end: CurveEnd) -> Option<Affine> {
        self.state.borrow().placements[end as usize]
    }

    /// Clip applied to the curve; `None` without decorations.
    pub fn clip(&self) -> Option<ClipRegion> {
        self.state.borrow().clip.clone()
    }

    // Widths.

    /// Stroke width of the curve.
    pub fn stroke_width(&self) -> f64 {
        self.state.borrow().stroke_width
    }

    /// Set the stroke width.
    pub fn set_stroke_width(&self, width: f64) {
        self.mutate(|_, state| state.stroke_width = width);
    }

    /// Width of the clickable area.
    pub fn clickable_width(&self) -> f64 {
        self.state.borrow().clickable_width
    }

    /// Set the width of the clickable area. A shadow exists while it exceeds
    /// the stroke width.
    pub fn set_clickable_width(&self, width: f64) {
        self.mutate(|_, state| state.clickable_width = width);
    }

    /// The clickable shadow, if present.
    pub fn shadow(&self) -> Option<ClickableShadow> {
        self.state.borrow().shadow.clone()
    }

    /// Visual children in paint order.
    pub fn children(&self) -> Vec<NodeChild> {
        let state = self.state.borrow();
        let mut children = Vec::with_capacity(4);
        if state.shadow.is_some() {
            children.push(NodeChild::Shadow);
        }
        children.push(NodeChild::Curve);
        for end in [CurveEnd::Start, CurveEnd::End] {
            if state.decorations[end as usize].is_some() {
                children.push(NodeChild::Decoration(end));
            }
        }
        children
    }

    /// Whether `point` (local coordinates) hits the curve or its shadow.
    ///
    /// Points removed by the clip never hit.
    pub fn hit_test(&self, point: Point) -> bool {
        let state = self.state.borrow();
        if let Some(clip) = &state.clip {
            if !clip.contains(point) {
                return false;
            }
        }
        let half = state.stroke_width.max(state.clickable_width) * 0.5;
        state
            .positions()
            .windows(2)
            .any(|w| Line::new(w[0], w[1]).nearest(point, 0.).distance_sq <= half * half)
    }

    // Observation.

    /// Call `observer` after every recomputation of the node.
    pub fn observe(&self, observer: impl Fn(&Self) + 'static) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_observer;
        state.next_observer += 1;
        state.observers.push((id, Rc::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unobserve(&self, id: u64) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.observers.len();
        state.observers.retain(|(other, _)| *other != id);
        state.observers.len() != before
    }
}

fn control_index(role: AnchorRole) -> usize {
    match role {
        AnchorRole::Control(i) => i,
        AnchorRole::Start | AnchorRole::End => 0,
    }
}
