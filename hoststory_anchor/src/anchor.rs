// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchors: strategies that resolve to a curve point.
//!
//! An [`Anchor`] is either fixed at a point in the curve's local coordinates,
//! or dynamic: computed in scene coordinates from a live [`Anchorage`] and a
//! reference point, then mapped into the curve's local space.
//!
//! Dynamic anchors plug in an [`AnchorComputation`]. Two are provided:
//!
//! - [`Centroid`]: the center of the anchorage.
//! - [`ChopBox`]: where the ray from the anchorage center toward the reference
//!   point leaves the anchorage bounds.

use alloc::rc::Rc;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point};

use crate::anchorage::Anchorage;

/// Computes a dynamic anchor position.
pub trait AnchorComputation {
    /// Position in scene coordinates for `anchorage`, given a scene-space
    /// `reference` point the curve wants to reach.
    fn compute(&self, anchorage: &Anchorage, reference: Point) -> Point;
}

/// Anchor at the anchorage center.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Centroid;

impl AnchorComputation for Centroid {
    fn compute(&self, anchorage: &Anchorage, _reference: Point) -> Point {
        anchorage.centroid()
    }
}

/// Anchor on the anchorage bounds, facing the reference point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChopBox;

impl AnchorComputation for ChopBox {
    fn compute(&self, anchorage: &Anchorage, reference: Point) -> Point {
        let bounds = anchorage.bounds();
        let center = bounds.center();
        let d = reference - center;
        if d.x == 0.0 && d.y == 0.0 {
            return center;
        }
        let sx = if d.x == 0.0 {
            f64::INFINITY
        } else {
            bounds.width() * 0.5 / d.x.abs()
        };
        let sy = if d.y == 0.0 {
            f64::INFINITY
        } else {
            bounds.height() * 0.5 / d.y.abs()
        };
        center + d * sx.min(sy)
    }
}

/// Where a curve point comes from.
#[derive(Clone)]
pub enum Anchor {
    /// A fixed point in the curve's local coordinates.
    Static(Point),
    /// A point computed from a live anchorage.
    Dynamic {
        /// Element the point is attached to.
        anchorage: Rc<Anchorage>,
        /// How the point is derived from it.
        computation: Rc<dyn AnchorComputation>,
    },
}

impl fmt::Debug for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(p) => f.debug_tuple("Static").field(p).finish(),
            Self::Dynamic { anchorage, .. } => f
                .debug_struct("Dynamic")
                .field("anchorage", anchorage)
                .finish_non_exhaustive(),
        }
    }
}

impl Anchor {
    /// Fixed anchor at `point` (local coordinates).
    pub fn fixed(point: Point) -> Self {
        Self::Static(point)
    }

    /// Dynamic anchor using `computation`.
    pub fn dynamic(anchorage: Rc<Anchorage>, computation: Rc<dyn AnchorComputation>) -> Self {
        Self::Dynamic {
            anchorage,
            computation,
        }
    }

    /// Dynamic anchor at the anchorage center.
    pub fn centroid(anchorage: Rc<Anchorage>) -> Self {
        Self::dynamic(anchorage, Rc::new(Centroid))
    }

    /// Dynamic anchor on the anchorage bounds.
    pub fn chop_box(anchorage: Rc<Anchorage>) -> Self {
        Self::dynamic(anchorage, Rc::new(ChopBox))
    }

    /// The anchorage of a dynamic anchor.
    pub fn anchorage(&self) -> Option<&Rc<Anchorage>> {
        match self {
            Self::Static(_) => None,
            Self::Dynamic { anchorage, .. } => Some(anchorage),
        }
    }

    /// `true` for [`Anchor::Dynamic`].
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }

    /// Resolve to a point in local coordinates.
    ///
    /// `reference` is in scene coordinates; static anchors ignore it.
    pub fn resolve(&self, reference: Point, local_to_scene: Affine) -> Point {
        match self {
            Self::Static(p) => *p,
            Self::Dynamic {
                anchorage,
                computation,
            } => local_to_scene.inverse() * computation.compute(anchorage, reference),
        }
    }

    /// Scene-space point other anchors should aim at when aiming at this one.
    ///
    /// The fixed point for static anchors; the anchorage centroid for dynamic
    /// ones.
    pub fn reference_point(&self, local_to_scene: Affine) -> Point {
        match self {
            Self::Static(p) => local_to_scene * *p,
            Self::Dynamic { anchorage, .. } => anchorage.centroid(),
        }
    }
}

/// Which point of a curve an anchor is bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnchorRole {
    /// First point.
    Start,
    /// Interior point, by index among control points.
    Control(usize),
    /// Last point.
    End,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Vec2};

    #[test]
    fn chop_box_leaves_through_the_facing_side() {
        let a = Anchorage::new(Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(ChopBox.compute(&a, Point::new(110.0, 5.0)), Point::new(20.0, 5.0));
        assert_eq!(ChopBox.compute(&a, Point::new(10.0, -45.0)), Point::new(10.0, 0.0));
        // Diagonal: the bottom side is hit first.
        assert_eq!(ChopBox.compute(&a, Point::new(30.0, 25.0)), Point::new(15.0, 10.0));
        assert_eq!(ChopBox.compute(&a, a.centroid()), a.centroid());
    }

    #[test]
    fn dynamic_resolves_into_local_space() {
        let a = Rc::new(Anchorage::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let anchor = Anchor::centroid(a);
        let local_to_scene = Affine::translate(Vec2::new(100.0, 0.0));
        assert_eq!(
            anchor.resolve(Point::ORIGIN, local_to_scene),
            Point::new(-95.0, 5.0)
        );
        assert_eq!(anchor.reference_point(local_to_scene), Point::new(5.0, 5.0));
    }

    #[test]
    fn static_reference_is_mapped_to_scene() {
        let anchor = Anchor::fixed(Point::new(1.0, 2.0));
        let local_to_scene = Affine::translate(Vec2::new(10.0, 10.0));
        assert_eq!(anchor.resolve(Point::ORIGIN, local_to_scene), Point::new(1.0, 2.0));
        assert_eq!(anchor.reference_point(local_to_scene), Point::new(11.0, 12.0));
    }
}
