// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture → target → bubble dispatch chain for the embedded scene.
//!
//! This is the concrete root dispatcher the bridge wraps. A dispatch walks a
//! root→target path three times:
//!
//! - Capture: root to target.
//! - Target: the target alone.
//! - Bubble: target to root.
//!
//! Handlers control propagation with an [`Outcome`]:
//!
//! - [`Outcome::Continue`] keeps going.
//! - [`Outcome::Stop`] aborts immediately; no target/bubble if raised in capture.
//! - [`Outcome::StopAndConsume`] aborts and marks the event consumed.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use hoststory_responder::chain::{ChainDispatcher, Outcome, Phase};
//! use hoststory_responder::scene::{EventDispatcher, SceneEvent, SceneEventKind};
//! use kurbo::Point;
//!
//! let visits = Rc::new(RefCell::new(Vec::new()));
//! let mut chain = ChainDispatcher::new(vec![1_u32, 2]);
//! for node in [1, 2] {
//!     let visits = Rc::clone(&visits);
//!     chain.add_handler(node, None, move |d, _| {
//!         visits.borrow_mut().push((d.phase, d.node));
//!         Outcome::Continue
//!     });
//! }
//!
//! let mut event = SceneEvent::new(SceneEventKind::Pointer { position: Point::ORIGIN });
//! chain.dispatch(&mut event);
//!
//! assert!(!event.is_consumed());
//! assert_eq!(*visits.borrow(), vec![
//!     (Phase::Capture, 1), (Phase::Capture, 2),
//!     (Phase::Target, 2),
//!     (Phase::Bubble, 2), (Phase::Bubble, 1),
//! ]);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use tracing::trace;

use crate::scene::{EventDispatcher, SceneEvent};

/// Propagation phase of one dispatch entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Root to target.
    Capture,
    /// The target itself.
    Target,
    /// Target to root.
    Bubble,
}

/// What a handler wants to happen next.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Keep propagating.
    Continue,
    /// Stop propagating without consuming.
    Stop,
    /// Stop propagating and consume the event.
    StopAndConsume,
}

/// One step of a dispatch sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatch<K> {
    /// Phase of this step.
    pub phase: Phase,
    /// Node visited.
    pub node: K,
}

impl<K> Dispatch<K> {
    /// Capture step at `node`.
    pub fn capture(node: K) -> Self {
        Self {
            phase: Phase::Capture,
            node,
        }
    }

    /// Target step at `node`.
    pub fn target(node: K) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// Bubble step at `node`.
    pub fn bubble(node: K) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}

/// Build the capture → target → bubble sequence for a root→target path.
///
/// An empty path yields an empty sequence.
pub fn route<K: Copy>(path: &[K]) -> Vec<Dispatch<K>> {
    let Some((&target, _)) = path.split_last() else {
        return Vec::new();
    };
    let mut seq = Vec::with_capacity(path.len() * 2 + 1);
    seq.extend(path.iter().copied().map(Dispatch::capture));
    seq.push(Dispatch::target(target));
    seq.extend(path.iter().rev().copied().map(Dispatch::bubble));
    seq
}

/// Handler registered on a [`ChainDispatcher`].
pub type NodeHandler<K> = Box<dyn FnMut(&Dispatch<K>, &mut SceneEvent) -> Outcome>;

struct Registration<K> {
    node: K,
    // `None` listens in every phase.
    phase: Option<Phase>,
    handler: NodeHandler<K>,
}

/// A scene root dispatcher routing every event along one root→target path.
///
/// Handlers on the same node and phase run in registration order; the first
/// one that does not return [`Outcome::Continue`] decides for the step.
pub struct ChainDispatcher<K> {
    path: Vec<K>,
    handlers: Vec<Registration<K>>,
}

impl<K> fmt::Debug for ChainDispatcher<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainDispatcher")
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<K: Copy + PartialEq> ChainDispatcher<K> {
    /// Dispatch along `path`, root first.
    pub fn new(path: Vec<K>) -> Self {
        Self {
            path,
            handlers: Vec::new(),
        }
    }

    /// Current root→target path.
    pub fn path(&self) -> &[K] {
        &self.path
    }

    /// Retarget, e.g. when focus moves.
    pub fn set_path(&mut self, path: Vec<K>) {
        self.path = path;
    }

    /// Register `handler` on `node`, for one phase or all of them.
    pub fn add_handler(
        &mut self,
        node: K,
        phase: Option<Phase>,
        handler: impl FnMut(&Dispatch<K>, &mut SceneEvent) -> Outcome + 'static,
    ) {
        self.handlers.push(Registration {
            node,
            phase,
            handler: Box::new(handler),
        });
    }
}

impl<K: Copy + PartialEq + fmt::Debug> ChainDispatcher<K> {
    fn visit(&mut self, step: &Dispatch<K>, event: &mut SceneEvent) -> Outcome {
        let matching = self
            .handlers
            .iter_mut()
            .filter(|reg| reg.node == step.node && reg.phase.is_none_or(|p| p == step.phase));
        for reg in matching {
            let outcome = (reg.handler)(step, event);
            if outcome != Outcome::Continue {
                trace!(node = ?step.node, phase = ?step.phase, ?outcome, "propagation stopped");
                return outcome;
            }
        }
        Outcome::Continue
    }
}

impl<K: Copy + PartialEq + fmt::Debug> EventDispatcher for ChainDispatcher<K> {
    fn dispatch(&mut self, event: &mut SceneEvent) {
        for step in route(&self.path) {
            match self.visit(&step, event) {
                Outcome::Continue => {}
                Outcome::Stop => return,
                Outcome::StopAndConsume => {
                    event.consume();
                    return;
                }
            }
        }
    }
}
