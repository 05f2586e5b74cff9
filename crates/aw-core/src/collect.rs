//! Mutation Collector
//!
//! Receives tree-mutation batches from the host observer and queues newly
//! inserted subtree roots for a later sweep. Nothing is classified here;
//! the handler stays O(batch size) so the observer callback never walks
//! the tree.

use std::collections::{HashSet, VecDeque};

use crate::dom::{MutationBatch, NodeId};

/// Deduplicated, order-preserving queue of pending sweep roots.
///
/// Roots are processed in collection order within a flush; membership is a
/// set, so re-inserting a queued root is a no-op and a root is processed at
/// most once per flush cycle.
#[derive(Debug, Default)]
pub struct MutationCollector {
    queue: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
}

impl MutationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every added element node from the batch. Returns how many
    /// roots were newly queued.
    pub fn ingest(&mut self, batch: &MutationBatch) -> usize {
        let mut added = 0;
        for record in &batch.records {
            for &node in &record.added {
                if self.enqueue_root(node) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Queue a single root. Returns `false` if it was already pending.
    pub fn enqueue_root(&mut self, node: NodeId) -> bool {
        if !self.queued.insert(node) {
            return false;
        }
        self.queue.push_back(node);
        true
    }

    /// Remove and return up to `max` roots in collection order. Drained
    /// roots leave the set immediately, whether or not their sweep runs to
    /// completion.
    pub fn drain(&mut self, max: usize) -> Vec<NodeId> {
        let n = max.min(self.queue.len());
        let drained: Vec<NodeId> = self.queue.drain(..n).collect();
        for node in &drained {
            self.queued.remove(node);
        }
        drained
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
