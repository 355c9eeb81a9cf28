//! Incremental maintenance of levels and reverse levels.
//!
//! Nodes whose level may have changed are bucketed by their current (reverse) level and processed
//! in increasing order. A recomputed level is always strictly greater than the level of the node
//! that triggered the recomputation, so a node is never revisited at a lower level.

use log::debug;

use super::{Aig, NodeId};

/// Per-level buckets of pending nodes.
///
/// Removed entries are replaced by `None` so that positions stay valid while a bucket is being
/// walked.
#[derive(Debug, Clone, Default)]
pub(crate) struct LevelQueue {
    buckets: Vec<Vec<Option<NodeId>>>,
}

impl LevelQueue {
    pub(crate) fn push(&mut self, level: u32, id: NodeId) {
        let level = level as usize;
        if self.buckets.len() <= level {
            self.buckets.resize_with(level + 1, Vec::new);
        }
        self.buckets[level].push(Some(id));
    }

    /// Removes `id` from the bucket of `level`. Panics if it is not there.
    pub(crate) fn remove(&mut self, level: u32, id: NodeId) {
        let slot = self
            .buckets
            .get_mut(level as usize)
            .and_then(|bucket| bucket.iter_mut().find(|entry| **entry == Some(id)));
        match slot {
            Some(entry) => *entry = None,
            None => panic!("node {} is not queued at level {}", id, level),
        }
    }

    fn depth(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_len(&self, level: usize) -> usize {
        self.buckets[level].len()
    }

    fn entry(&self, level: usize, k: usize) -> Option<NodeId> {
        self.buckets[level][k]
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.buckets.iter().flatten().all(Option::is_none)
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl Aig {
    /// Queues an AND node for the forward pass.
    pub(crate) fn enqueue_level(&mut self, id: NodeId) {
        let node = self.store.node_mut(id);
        assert!(!node.flags.mark_a, "node {} is already queued", id);
        node.flags.mark_a = true;
        let level = node.level;
        self.levels.push(level, id);
    }

    /// Queues an AND node for the reverse pass.
    pub(crate) fn enqueue_reverse_level(&mut self, id: NodeId) {
        let node = self.store.node_mut(id);
        assert!(!node.flags.mark_b, "node {} is already queued", id);
        node.flags.mark_b = true;
        let level = node.reverse_level;
        self.levels_r.push(level, id);
    }

    /// Pulls a node out of both worklists, if it is queued.
    pub(crate) fn dequeue_levels(&mut self, id: NodeId) {
        let node = self.store.node_mut(id);
        let (level, reverse_level) = (node.level, node.reverse_level);
        if node.flags.mark_a {
            node.flags.mark_a = false;
            self.levels.remove(level, id);
        }
        let node = self.store.node_mut(id);
        if node.flags.mark_b {
            node.flags.mark_b = false;
            self.levels_r.remove(reverse_level, id);
        }
    }

    fn fresh_level(&self, id: NodeId) -> u32 {
        let node = self.store.node(id);
        1 + node
            .get_fanins()
            .iter()
            .map(|fanin| self.store.node(fanin.node).level)
            .max()
            .unwrap_or(0)
    }

    /// `1 + max` of the reverse levels of the fanouts, terminal consumers counting as 0.
    pub(crate) fn fresh_reverse_level(&self, id: NodeId) -> u32 {
        1 + self
            .store
            .node(id)
            .get_fanouts()
            .iter()
            .map(|&f| {
                let fanout = self.store.node(f);
                if fanout.is_co() { 0 } else { fanout.reverse_level }
            })
            .max()
            .unwrap_or(0)
    }

    /// Drains the forward worklist, propagating level changes to the fanouts of queued nodes.
    pub(crate) fn update_level_forward(&mut self) {
        let mut updated = 0usize;
        let mut i = 0;
        while i < self.levels.depth() {
            let mut k = 0;
            while k < self.levels.bucket_len(i) {
                let entry = self.levels.entry(i, k);
                k += 1;
                let Some(id) = entry else {
                    continue;
                };
                let node = self.store.node_mut(id);
                debug_assert!(node.is_and());
                debug_assert_eq!(node.level as usize, i);
                node.flags.mark_a = false;

                let fanouts = node.fanouts.clone();
                for f in fanouts {
                    if !self.is_and(f) {
                        continue;
                    }
                    let new_level = self.fresh_level(f);
                    assert!(
                        new_level as usize > i,
                        "level of node {} does not grow along its fanin {}",
                        f,
                        id
                    );
                    if self.store.node(f).level == new_level {
                        continue;
                    }
                    let fanout = self.store.node_mut(f);
                    if fanout.flags.mark_a {
                        fanout.flags.mark_a = false;
                        let old_level = fanout.level;
                        self.levels.remove(old_level, f);
                    }
                    self.store.node_mut(f).level = new_level;
                    self.enqueue_level(f);
                    updated += 1;
                }
            }
            i += 1;
        }
        self.levels.clear();
        if updated > 0 {
            debug!("forward level pass updated {} nodes", updated);
        }
    }

    /// Drains the reverse worklist, propagating reverse level changes to the fanins of queued
    /// nodes.
    pub(crate) fn update_level_reverse(&mut self) {
        let mut updated = 0usize;
        let mut i = 0;
        while i < self.levels_r.depth() {
            let mut k = 0;
            while k < self.levels_r.bucket_len(i) {
                let entry = self.levels_r.entry(i, k);
                k += 1;
                let Some(id) = entry else {
                    continue;
                };
                let node = self.store.node_mut(id);
                debug_assert_eq!(node.reverse_level as usize, i);
                node.flags.mark_b = false;

                let fanins: Vec<NodeId> = node.fanins.iter().map(|e| e.node).collect();
                for fanin in fanins {
                    if !self.is_and(fanin) {
                        continue;
                    }
                    let new_level = self.fresh_reverse_level(fanin);
                    assert!(new_level as usize > i);
                    if self.store.node(fanin).reverse_level == new_level {
                        continue;
                    }
                    let node = self.store.node_mut(fanin);
                    if node.flags.mark_b {
                        node.flags.mark_b = false;
                        let old_level = node.reverse_level;
                        self.levels_r.remove(old_level, fanin);
                    }
                    self.store.node_mut(fanin).reverse_level = new_level;
                    self.enqueue_reverse_level(fanin);
                    updated += 1;
                }
            }
            i += 1;
        }
        self.levels_r.clear();
        if updated > 0 {
            debug!("reverse level pass updated {} nodes", updated);
        }
    }

    /// Computes the reverse level of every node and keeps them up to date in later calls to
    /// [`Aig::replace`] with level maintenance enabled.
    ///
    /// Terminal consumers have reverse level 0, any other node is one more than the largest
    /// reverse level among its fanouts (1 when it has none).
    pub fn start_reverse_levels(&mut self) -> super::Result<()> {
        let order = self.get_topological_sort()?;
        for &id in order.iter().rev() {
            let reverse_level = if self.store.node(id).is_co() {
                0
            } else {
                self.fresh_reverse_level(id)
            };
            self.store.node_mut(id).reverse_level = reverse_level;
        }
        self.reverse_levels = true;
        debug!("started reverse levels on {} nodes", order.len());
        Ok(())
    }

    /// Stops maintaining reverse levels. Stored values are left as they are.
    pub fn stop_reverse_levels(&mut self) {
        self.reverse_levels = false;
        debug!("stopped reverse levels");
    }

    /// True while reverse levels are maintained.
    pub fn has_reverse_levels(&self) -> bool {
        self.reverse_levels
    }

    /// Reverse level of a node.
    pub fn reverse_level(&self, id: NodeId) -> u32 {
        self.store.node(id).reverse_level
    }
}
