// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene's single-threaded "run later" primitive.
//!
//! Crossing from a native callback to the scene's execution context happens
//! only through [`SceneExecutor::post`]. Posts from one source run in FIFO
//! order; nothing is promised about native-originated scene events that the
//! scene processes in between.
//!
//! Every task receives the [`AccessScope`] captured when it was posted. The
//! scope is the capability that platform interop requires to reach scene
//! internals, so it is threaded explicitly rather than held in ambient state.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::RefCell;
use core::fmt;

use tracing::trace;

use crate::scene::SceneId;

/// Capability to touch the internals of one scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccessScope {
    scene: SceneId,
}

impl AccessScope {
    /// Scope for `scene`. Executors hand these out; bridge code only
    /// forwards them.
    pub fn for_scene(scene: SceneId) -> Self {
        Self { scene }
    }

    /// The scene this scope grants access to.
    pub fn scene(&self) -> SceneId {
        self.scene
    }
}

/// Work posted to the scene's execution context.
pub type Task = Box<dyn FnOnce(&AccessScope)>;

/// The scene's scheduling context.
pub trait SceneExecutor {
    /// The access scope associated with `scene`.
    fn access_scope(&self, scene: SceneId) -> AccessScope;

    /// Queue `task` to run later with `scope`. Must not run it synchronously.
    fn post(&self, scope: AccessScope, task: Task);
}

/// A FIFO [`SceneExecutor`] drained explicitly by its owner.
#[derive(Default)]
pub struct PostQueue {
    pending: RefCell<VecDeque<(AccessScope, Task)>>,
}

impl fmt::Debug for PostQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl PostQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Run queued tasks in order until the queue is empty, including tasks
    /// posted by the tasks themselves.
    ///
    /// Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the borrow before running so tasks may post.
            let next = self.pending.borrow_mut().pop_front();
            let Some((scope, task)) = next else {
                break;
            };
            task(&scope);
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "drained posted tasks");
        }
        ran
    }
}

impl SceneExecutor for PostQueue {
    fn access_scope(&self, scene: SceneId) -> AccessScope {
        AccessScope::for_scene(scene)
    }

    fn post(&self, scope: AccessScope, task: Task) {
        self.pending.borrow_mut().push_back((scope, task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn posts_run_in_order_with_their_scope() {
        let queue = Rc::new(PostQueue::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [3_u64, 1, 2] {
            let log = Rc::clone(&log);
            queue.post(
                queue.access_scope(SceneId(id)),
                Box::new(move |scope: &AccessScope| log.borrow_mut().push(scope.scene().0)),
            );
        }
        assert!(log.borrow().is_empty());
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.borrow(), vec![3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_may_post_more_tasks() {
        let queue = Rc::new(PostQueue::new());
        let hits = Rc::new(RefCell::new(0));
        let inner_queue = Rc::clone(&queue);
        let inner_hits = Rc::clone(&hits);
        queue.post(
            AccessScope::for_scene(SceneId(0)),
            Box::new(move |scope: &AccessScope| {
                let hits = Rc::clone(&inner_hits);
                inner_queue.post(*scope, Box::new(move |_: &AccessScope| *hits.borrow_mut() += 1));
            }),
        );
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(*hits.borrow(), 1);
    }
}
