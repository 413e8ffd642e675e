//! Flood-fill bookkeeping shared by both expansion strategies.

use std::collections::VecDeque;

/// One flag per point recording whether it has entered a worklist.
#[derive(Clone, Debug)]
pub(crate) struct VisitedArena {
    flags: Vec<bool>,
}

impl VisitedArena {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    /// Marks `id` as visited, returning `true` when it was not visited before.
    pub(crate) fn visit(&mut self, id: usize) -> bool {
        !std::mem::replace(&mut self.flags[id], true)
    }

    #[cfg(test)]
    pub(crate) fn is_visited(&self, id: usize) -> bool {
        self.flags[id]
    }
}

/// FIFO queue of points awaiting expansion, deduplicated through a
/// run-wide [`VisitedArena`].
#[derive(Debug)]
pub(crate) struct Worklist {
    queue: VecDeque<usize>,
    visited: VisitedArena,
}

impl Worklist {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: VisitedArena::new(len),
        }
    }

    /// Enqueues `id` even when it was visited by an earlier expansion.
    pub(crate) fn seed(&mut self, id: usize) {
        self.visited.visit(id);
        self.queue.push_back(id);
    }

    /// Enqueues `id` unless it has already been visited.
    pub(crate) fn offer(&mut self, id: usize) -> bool {
        let fresh = self.visited.visit(id);
        if fresh {
            self.queue.push_back(id);
        }
        fresh
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }
}
