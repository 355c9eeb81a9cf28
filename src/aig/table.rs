//! The structural hash table: a vector of buckets, each holding the ids of the AND nodes whose
//! canonical fanin pair hashes to it.
//!
//! The table does not own nodes. Keys are always read from the [`NodeStore`], so a node must be
//! removed from the table *before* its fanins change, and re-inserted after.

use log::debug;

use super::{AigEdge, NodeId, NodeStore};

#[derive(Debug, Clone)]
pub(crate) struct StrashTable {
    bins: Vec<Vec<NodeId>>,
    entries: usize,
}

/// Bucket of the canonical pair `(p0, p1)` in a table of `size` buckets.
///
/// Ids and polarity bits contribute separately, so `(a, !b)` and `(!a, b)` spread differently.
pub(crate) fn hash_key(p0: AigEdge, p1: AigEdge, size: usize) -> usize {
    let mut key: u64 = 0;
    key ^= p0.node.wrapping_mul(7937);
    key ^= p1.node.wrapping_mul(2971);
    key ^= p0.complement as u64 * 911;
    key ^= p1.complement as u64 * 353;
    (key % size as u64) as usize
}

/// Smallest prime greater or equal to `n`.
pub(crate) fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    loop {
        if is_prime(candidate) {
            return candidate;
        }
        candidate += 1;
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Orders two operands by ascending node id.
pub(crate) fn canonical(p0: AigEdge, p1: AigEdge) -> (AigEdge, AigEdge) {
    if p0.node > p1.node { (p1, p0) } else { (p0, p1) }
}

impl StrashTable {
    pub(crate) fn new(requested_bins: usize) -> Self {
        let size = next_prime(requested_bins);
        StrashTable {
            bins: vec![Vec::new(); size],
            entries: 0,
        }
    }

    pub(crate) fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
    }

    /// True when the load factor calls for [`StrashTable::resize`].
    pub(crate) fn is_overloaded(&self) -> bool {
        self.entries > 2 * self.bins.len()
    }

    /// Finds the node whose fanins are exactly `(p0, p1)`. Operands must be in canonical order.
    pub(crate) fn find(&self, store: &NodeStore, p0: AigEdge, p1: AigEdge) -> Option<NodeId> {
        debug_assert!(p0.node <= p1.node);
        let key = hash_key(p0, p1, self.bins.len());
        self.bins[key].iter().copied().find(|&id| {
            let fanins = store.node(id).get_fanins();
            fanins[0] == p0 && fanins[1] == p1
        })
    }

    /// Indexes `id` under its current fanins.
    pub(crate) fn insert(&mut self, store: &NodeStore, id: NodeId) {
        let node = store.node(id);
        let key = hash_key(node.fanin0(), node.fanin1(), self.bins.len());
        self.bins[key].push(id);
        self.entries += 1;
    }

    /// Drops `id` from the table. Its fanins must still be the ones it was indexed under.
    pub(crate) fn remove(&mut self, store: &NodeStore, id: NodeId) {
        let node = store.node(id);
        let key = hash_key(node.fanin0(), node.fanin1(), self.bins.len());
        let bin = &mut self.bins[key];
        match bin.iter().position(|&entry| entry == id) {
            Some(k) => {
                bin.remove(k);
            }
            None => panic!("node {} is not in the structural hash table", id),
        }
        self.entries -= 1;
    }

    /// Grows the table to the next prime above three times its size and rehashes every entry.
    pub(crate) fn resize(&mut self, store: &NodeStore) {
        let new_size = next_prime(3 * self.bins.len());
        debug!(
            "resizing structural hash table from {} to {} bins ({} entries)",
            self.bins.len(),
            new_size,
            self.entries
        );
        self.rebuild(store, new_size);
    }

    /// Rehashes every entry into `size` buckets. No entry is created or destroyed.
    pub(crate) fn rebuild(&mut self, store: &NodeStore, size: usize) {
        let old = std::mem::replace(&mut self.bins, vec![Vec::new(); size]);
        let mut counter = 0;
        for id in old.into_iter().flatten() {
            let node = store.node(id);
            let key = hash_key(node.fanin0(), node.fanin1(), size);
            self.bins[key].push(id);
            counter += 1;
        }
        assert_eq!(counter, self.entries);
    }

    /// All indexed node ids, bucket by bucket.
    pub(crate) fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.bins.iter().flatten().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aig::NodeKind;
    use test_log::test;

    #[test]
    fn primes() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(7), 7);
        assert_eq!(next_prime(21), 23);
        assert_eq!(next_prime(10_000), 10_007);
    }

    #[test]
    fn canonical_order() {
        let a = AigEdge::new(5, true);
        let b = AigEdge::new(2, false);
        assert_eq!(canonical(a, b), (b, a));
        assert_eq!(canonical(b, a), (b, a));
    }

    #[test]
    fn polarity_changes_key() {
        let a = AigEdge::new(1, false);
        let b = AigEdge::new(2, false);
        let size = 10_007;
        assert_ne!(hash_key(a, b, size), hash_key(a, !b, size));
        assert_ne!(hash_key(a, !b, size), hash_key(!a, b, size));
    }

    #[test]
    fn insert_find_remove() {
        let mut store = NodeStore::default();
        store.allocate_node(NodeKind::Const1);
        let a = store.allocate_node(NodeKind::Input);
        let b = store.allocate_node(NodeKind::Input);
        let n = store.allocate_node(NodeKind::And);
        let (p0, p1) = (AigEdge::new(a, true), AigEdge::new(b, false));
        store.add_fanin(n, p0);
        store.add_fanin(n, p1);

        let mut table = StrashTable::new(3);
        table.insert(&store, n);
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(&store, p0, p1), Some(n));
        assert_eq!(table.find(&store, !p0, p1), None);

        table.rebuild(&store, 11);
        assert_eq!(table.bin_count(), 11);
        assert_eq!(table.find(&store, p0, p1), Some(n));

        table.remove(&store, n);
        assert_eq!(table.len(), 0);
        assert_eq!(table.find(&store, p0, p1), None);
    }
}
