// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curve end decorations and the clip they imply.
//!
//! A decoration shape is authored pointing along +x: its attachment point is
//! the middle of the left edge of its bounds, and the shape extends toward the
//! interior of the curve. [`Decoration::placement`] rotates it along the
//! first (or last) curve segment and moves the attachment point onto the tip.
//!
//! The curve must not be stroked underneath a decoration. [`ClipRegion`] keeps
//! the curve's visual bounds minus, for every decoration, the part of the
//! decoration's placed bounds not covered by the decoration itself.

use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Point, Rect, Shape, Vec2};

/// Tolerance used when converting rectangles to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// A shape drawn at one end of a curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    shape: BezPath,
}

impl Decoration {
    /// Wrap `shape`, authored pointing along +x.
    pub fn new(shape: BezPath) -> Self {
        Self { shape }
    }

    /// The shape in its own coordinates.
    pub fn shape(&self) -> &BezPath {
        &self.shape
    }

    /// Bounds of the shape in its own coordinates.
    pub fn bounds(&self) -> Rect {
        self.shape.bounding_box()
    }

    /// Transform placing the decoration at `tip`, pointing at `toward`.
    pub fn placement(&self, tip: Point, toward: Point) -> Affine {
        let bounds = self.bounds();
        let angle = (toward - tip).atan2();
        Affine::translate(tip.to_vec2())
            * Affine::rotate(angle)
            * Affine::translate(Vec2::new(-bounds.x0, -bounds.center().y))
    }
}

/// Area removed from a curve's clip by one decoration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipHole {
    /// Placed bounds of the decoration.
    pub area: BezPath,
    /// Placed decoration shape, kept visible inside `area`.
    pub keep: BezPath,
}

impl ClipHole {
    /// Hole for `decoration` placed by `placement`.
    pub fn new(decoration: &Decoration, placement: Affine) -> Self {
        Self {
            area: placement * decoration.bounds().to_path(PATH_TOLERANCE),
            keep: placement * decoration.shape().clone(),
        }
    }

    fn removes(&self, p: Point) -> bool {
        self.area.contains(p) && !self.keep.contains(p)
    }
}

/// Clip applied to a decorated curve, in the curve's local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipRegion {
    /// Visual bounds of the curve.
    pub bounds: Rect,
    /// One hole per present decoration.
    pub holes: Vec<ClipHole>,
}

impl ClipRegion {
    /// Whether `p` survives the clip.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p) && !self.holes.iter().any(|hole| hole.removes(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn triangle() -> Decoration {
        // Arrow head pointing at -x, attachment at (0, 5).
        let mut path = BezPath::new();
        path.move_to((0.0, 5.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.close_path();
        Decoration::new(path)
    }

    #[test]
    fn placement_moves_attachment_to_tip() {
        let deco = triangle();
        let t = deco.placement(Point::new(50.0, 50.0), Point::new(100.0, 50.0));
        assert_eq!(t * Point::new(0.0, 5.0), Point::new(50.0, 50.0));
        assert_eq!(t * Point::new(10.0, 5.0), Point::new(60.0, 50.0));
    }

    #[test]
    fn placement_follows_segment_direction() {
        let deco = triangle();
        let t = deco.placement(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        let p = t * Point::new(10.0, 5.0);
        assert!((p - Point::new(0.0, 10.0)).hypot() < 1e-9, "got {p:?}");
    }

    #[test]
    fn clip_removes_decoration_bounds_but_not_the_shape() {
        let deco = triangle();
        let placement = deco.placement(Point::new(0.0, 5.0), Point::new(100.0, 5.0));
        let clip = ClipRegion {
            bounds: Rect::new(0.0, 0.0, 100.0, 10.0),
            holes: vec![ClipHole::new(&deco, placement)],
        };
        // Inside the triangle.
        assert!(clip.contains(Point::new(8.0, 5.0)));
        // Inside the decoration bounds, outside the triangle.
        assert!(!clip.contains(Point::new(1.0, 1.0)));
        // Further along the curve.
        assert!(clip.contains(Point::new(50.0, 5.0)));
        // Outside the curve bounds.
        assert!(!clip.contains(Point::new(50.0, 20.0)));
    }
}
