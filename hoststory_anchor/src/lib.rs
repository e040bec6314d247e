// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hoststory Anchor: curves whose points follow other scene elements.
//!
//! - [`anchorage`]: an observable element a curve point can be attached to.
//! - [`anchor`]: fixed and dynamic anchors and the computations behind them.
//! - [`decoration`]: shapes at the curve ends and the clip they imply.
//! - [`node`]: the [`CurveNode`](node::CurveNode) tying it all together.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use hoststory_anchor::anchor::Anchor;
//! use hoststory_anchor::anchorage::Anchorage;
//! use hoststory_anchor::node::CurveNode;
//! use kurbo::{Point, Rect};
//!
//! let target = Rc::new(Anchorage::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
//! let curve = CurveNode::new(
//!     Anchor::fixed(Point::new(100.0, 5.0)),
//!     Anchor::chop_box(target.clone()),
//! )
//! .unwrap();
//! assert_eq!(curve.end_point(), Point::new(10.0, 5.0));
//!
//! target.set_bounds(Rect::new(20.0, 0.0, 30.0, 10.0));
//! assert_eq!(curve.end_point(), Point::new(30.0, 5.0));
//! ```
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

use kurbo::Point;

pub mod anchor;
pub mod anchorage;
pub mod decoration;
pub mod node;

/// Errors from editing a curve's anchors.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum AnchorError {
    /// A curve needs a start and an end.
    #[error("a curve needs at least two points, got {0}")]
    TooFewPoints(usize),
    /// No control anchor at `index`.
    #[error("control index {index} out of range for {len} control points")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of control points.
        len: usize,
    },
    /// A fixed point with a NaN or infinite coordinate.
    #[error("non-finite point {0:?}")]
    NonFinite(Point),
}
