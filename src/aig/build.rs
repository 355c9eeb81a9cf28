//! Building logic: every AND gate of an [`Aig`] is created here, through the structural hash table.

use log::{debug, warn};

use super::table::canonical;
use super::{Aig, AigEdge, CONST1_ID, NodeId, NodeKind};

impl Aig {
    /// Looks for an existing signal computing `p0 AND p1`, without building anything.
    ///
    /// Trivial cases are answered directly (`a.a = a`, `a.!a = 0`, constants). Operands whose
    /// node has no fanout are never matched in the table.
    pub fn lookup_and(&self, p0: AigEdge, p1: AigEdge) -> Option<AigEdge> {
        if p0 == p1 {
            return Some(p0);
        }
        if p0.is_complement_of(&p1) {
            return Some(self.const0());
        }
        if p0.node == CONST1_ID {
            return Some(if p0.is_cst_true() { p1 } else { self.const0() });
        }
        if p1.node == CONST1_ID {
            return Some(if p1.is_cst_true() { p0 } else { self.const0() });
        }
        // Nodes being deleted by a replace cascade have no fanout: keep them out of reach.
        if self.fanout_count(p0.node) == 0 || self.fanout_count(p1.node) == 0 {
            return None;
        }
        let (p0, p1) = canonical(p0, p1);
        self.table
            .find(&self.store, p0, p1)
            .map(|id| AigEdge::new(id, false))
    }

    /// Returns a signal computing `p0 AND p1`, creating a new AND gate only if no existing node
    /// computes it already.
    ///
    /// ```rust
    /// use strashaig::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.add_input();
    /// let b = aig.add_input();
    /// let ab = aig.make_and(a, !b);
    /// assert_eq!(aig.make_and(!b, a), ab);
    /// assert_eq!(aig.make_and(a, !a), aig.const0());
    /// assert_eq!(aig.make_and(aig.const1(), b), b);
    /// assert_eq!(aig.and_count(), 1);
    /// ```
    pub fn make_and(&mut self, p0: AigEdge, p1: AigEdge) -> AigEdge {
        if let Some(edge) = self.lookup_and(p0, p1) {
            return edge;
        }
        AigEdge::new(self.create_and(p0, p1), false)
    }

    /// `a OR b`
    pub fn or(&mut self, a: AigEdge, b: AigEdge) -> AigEdge {
        !self.make_and(!a, !b)
    }

    /// `a XOR b`, built as `a.!b + !a.b`.
    pub fn xor(&mut self, a: AigEdge, b: AigEdge) -> AigEdge {
        let left = self.make_and(a, !b);
        let right = self.make_and(!a, b);
        self.or(left, right)
    }

    /// `if c then t else e`, built as `c.t + !c.e`.
    pub fn mux(&mut self, c: AigEdge, t: AigEdge, e: AigEdge) -> AigEdge {
        let left = self.make_and(c, t);
        let right = self.make_and(!c, e);
        self.or(left, right)
    }

    /// Looks for an existing signal computing `a XOR b`, built either as `!(!a.!b + a.b)` or as
    /// `a.!b + !a.b`.
    pub fn lookup_xor(&self, a: AigEdge, b: AigEdge) -> Option<AigEdge> {
        if let (Some(n1), Some(n2)) = (self.lookup_and(!a, !b), self.lookup_and(a, b)) {
            return self.lookup_and(!n1, !n2);
        }
        if let (Some(n1), Some(n2)) = (self.lookup_and(a, !b), self.lookup_and(!a, b)) {
            return self.lookup_and(!n1, !n2).map(|n| !n);
        }
        None
    }

    /// Looks for an existing signal computing `if c then t else e`, built either as
    /// `!(c.!t + !c.!e)` or as `c.t + !c.e`.
    pub fn lookup_mux(&self, c: AigEdge, t: AigEdge, e: AigEdge) -> Option<AigEdge> {
        if let (Some(n1), Some(n2)) = (self.lookup_and(c, !t), self.lookup_and(!c, !e)) {
            return self.lookup_and(!n1, !n2);
        }
        if let (Some(n1), Some(n2)) = (self.lookup_and(c, t), self.lookup_and(!c, e)) {
            return self.lookup_and(!n1, !n2).map(|n| !n);
        }
        None
    }

    /// Creates a new AND gate. The caller made sure no such gate exists.
    fn create_and(&mut self, p0: AigEdge, p1: AigEdge) -> NodeId {
        if self.table.is_overloaded() {
            self.resize();
        }
        let (p0, p1) = canonical(p0, p1);
        let id = self.store.allocate_node(NodeKind::And);
        self.store.add_fanin(id, p0);
        self.store.add_fanin(id, p1);
        let level = 1 + self.level(p0.node).max(self.level(p1.node));
        let exor = self.is_exor_type(id);
        let phase = self.edge_phase(p0) & self.edge_phase(p1);
        let node = self.store.node_mut(id);
        node.level = level;
        node.flags.exor = exor;
        node.flags.phase = phase;
        self.table.insert(&self.store, id);
        self.record_added(id);
        id
    }

    /// Gives the existing gate `id`, stripped of its fanins, the new fanins `(p0, p1)` and indexes
    /// it under them.
    pub(crate) fn create_from(&mut self, p0: AigEdge, p1: AigEdge, id: NodeId) {
        debug_assert!(self.store.node(id).get_fanins().is_empty());
        let (p0, p1) = canonical(p0, p1);
        self.store.add_fanin(id, p0);
        self.store.add_fanin(id, p1);
        let level = 1 + self.level(p0.node).max(self.level(p1.node));
        let exor = self.is_exor_type(id);
        let node = self.store.node_mut(id);
        node.level = level;
        node.flags.exor = exor;
        self.table.insert(&self.store, id);
    }

    /// True if the node is the root of an EXOR/NEXOR: `!(x.y) . !(!x.!y)` up to the
    /// polarities of `x` and `y`.
    ///
    /// Relies on the grandchildren being stored in ascending id order.
    pub fn is_exor_type(&self, id: NodeId) -> bool {
        let node = self.store.node(id);
        if !node.is_and() {
            return false;
        }
        let (f0, f1) = (node.fanin0(), node.fanin1());
        if !f0.complement || !f1.complement {
            return false;
        }
        let (n0, n1) = (self.store.node(f0.node), self.store.node(f1.node));
        if !n0.is_and() || !n1.is_and() {
            return false;
        }
        if n0.fanin0().node != n1.fanin0().node || n0.fanin1().node != n1.fanin1().node {
            return false;
        }
        n0.fanin0().complement != n1.fanin0().complement
            && n0.fanin1().complement != n1.fanin1().complement
    }

    /// True if the node is the root of a multiplexer: `!(c.x) . !(!c.y)`.
    pub fn is_mux_type(&self, id: NodeId) -> bool {
        let node = self.store.node(id);
        if !node.is_and() {
            return false;
        }
        let (f0, f1) = (node.fanin0(), node.fanin1());
        if !f0.complement || !f1.complement {
            return false;
        }
        let (n0, n1) = (self.store.node(f0.node), self.store.node(f1.node));
        if !n0.is_and() || !n1.is_and() {
            return false;
        }
        n0.get_fanins().iter().any(|g0| {
            n1.get_fanins()
                .iter()
                .any(|g1| g0.node == g1.node && g0.complement != g1.complement)
        })
    }

    /// True if some fanout reads this node through a complemented edge.
    pub fn has_compl_fanout_edge(&self, id: NodeId) -> bool {
        self.store.node(id).get_fanouts().iter().any(|&f| {
            self.store
                .node(f)
                .get_fanins()
                .iter()
                .find(|fanin| fanin.node == id)
                .is_some_and(|fanin| fanin.complement)
        })
    }

    /// False if `root` is a fanin or a fanin of a fanin of `node`, ie there would be a loop of
    /// length 1 or 2 through `root`.
    pub fn node_is_acyclic(&self, node: NodeId, root: NodeId) -> bool {
        let node = self.store.node(node);
        if !node.is_and() {
            return true;
        }
        node.get_fanins().iter().all(|fanin| {
            if fanin.node == root {
                return false;
            }
            let child = self.store.node(fanin.node);
            !child.is_and() || child.get_fanins().iter().all(|g| g.node != root)
        })
    }

    /// Grows the structural hash table. Called automatically when it gets too loaded.
    pub fn resize(&mut self) {
        self.table.resize(&self.store);
    }

    /// Puts the fanins of every indexed gate back in ascending id order and rebuilds the table.
    ///
    /// Needed only when ids have been changed from outside the engine.
    pub fn repair_order(&mut self) {
        let ids: Vec<NodeId> = self.table.iter().collect();
        let mut swapped = 0;
        for &id in &ids {
            if self.store.node_mut(id).reorder_fanins() {
                swapped += 1;
            }
        }
        self.table.rebuild(&self.store, self.table.bin_count());
        debug!(
            "repaired fanin order of {} out of {} nodes",
            swapped,
            ids.len()
        );
    }

    /// Reports indexed gates whose fanins are not in ascending id order.
    pub fn check_fanin_order(&self) -> bool {
        let mut ok = true;
        for id in self.table.iter() {
            let node = self.store.node(id);
            if node.fanin0().node > node.fanin1().node {
                warn!("node {} has incorrect ordering of fanins", id);
                ok = false;
            }
        }
        ok
    }

    /// Swaps the fanins of a gate behind the table's back.
    #[cfg(test)]
    pub(crate) fn scramble_fanins(&mut self, id: NodeId) {
        self.store.node_mut(id).fanins.swap(0, 1);
    }
}
