//! Rewiring the consumers of a node to another signal while keeping the AIG structurally hashed.

use log::{debug, trace};

use super::{Aig, AigEdge, NodeId};

impl Aig {
    /// Replaces every use of node `old` by the signal `new`.
    ///
    /// Consumers are rewired in place whenever their new fanin pair is not in the table yet.
    /// When it is, the consumer itself is scheduled for replacement by the existing node, which is
    /// how the rewiring cascades through the AIG. Gates left without fanouts are deleted along with
    /// the part of their cone nobody else uses.
    ///
    /// With `update_levels`, levels (and reverse levels, if [started](Aig::start_reverse_levels))
    /// are brought up to date before returning. Without it, levels downstream of the rewired gates
    /// may be stale.
    ///
    /// `old` must be a live AND gate or a combinational input with at least one fanout, and must
    /// differ from the node of `new`.
    ///
    /// ```rust
    /// use strashaig::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.add_input();
    /// let b = aig.add_input();
    /// let c = aig.add_input();
    /// let ab = aig.make_and(a, b);
    /// let f = aig.make_and(ab, c);
    /// aig.add_output(f).unwrap();
    /// // b is constant true
    /// aig.replace(b.get_node_id(), aig.const1(), true);
    /// assert_eq!(aig.get_outputs(), vec![aig.make_and(a, c)]);
    /// assert_eq!(aig.and_count(), 1);
    /// assert!(aig.check());
    /// ```
    pub fn replace(&mut self, old: NodeId, new: AigEdge, update_levels: bool) {
        assert!(self.replace_stack.is_empty(), "replace is not reentrant");
        assert_ne!(old, new.node, "replacing node {} with itself", old);
        let node = self.store.node(old);
        assert!(
            node.is_and() || node.is_ci(),
            "node {} ({:?}) cannot be replaced",
            old,
            node.kind
        );
        assert!(
            node.fanout_count() > 0,
            "replacing node {} which has no fanout",
            old
        );
        let ands = self.and_count();

        self.replace_stack.push((old, new));
        while let Some((o, n)) = self.replace_stack.pop() {
            if self.store.get(o).is_none_or(|node| node.fanout_count() == 0) {
                continue;
            }
            self.replace_step(o, n, update_levels);
        }

        if update_levels {
            self.update_level_forward();
            if self.reverse_levels {
                self.update_level_reverse();
            }
        }
        debug!(
            "replaced node {} by {:?}, {} and gates before, {} after",
            old,
            new,
            ands,
            self.and_count()
        );
    }

    /// Rewires the fanouts of `old` to `new`, then deletes `old` if it became dangling.
    fn replace_step(&mut self, old: NodeId, new: AigEdge, update_levels: bool) {
        trace!("replacing node {} by {:?}", old, new);
        let fanouts = self.store.node(old).get_fanouts().to_vec();
        for f in fanouts {
            let fanout = self.store.node(f);
            if !fanout.is_and() {
                self.patch_terminal(f, old, new, update_levels);
                continue;
            }

            let position = match fanout.fanin_position(old) {
                Some(position) => position,
                None => panic!("node {} is a fanout of {} without reading it", f, old),
            };
            let fanin1 = new.negate_if(fanout.fanin(position).complement);
            let fanin2 = fanout.fanin(position.other());
            assert_ne!(fanin1.node, f, "node {} would read itself", f);
            assert_ne!(fanin2.node, f, "node {} would read itself", f);

            if let Some(existing) = self.lookup_and(fanin1, fanin2) {
                // the consumer is redundant now, replace it in turn
                self.replace_stack.push((f, existing));
                continue;
            }
            assert_ne!(fanin1.node, fanin2.node);

            // no such gate yet: rewire the consumer in place
            self.dequeue_levels(f);
            self.table.remove(&self.store, f);
            self.store.remove_fanins(f);
            self.create_from(fanin1, fanin2, f);
            debug_assert!(self.node_is_acyclic(f, f), "node {} is in a loop", f);

            if update_levels {
                self.enqueue_level(f);
                if self.reverse_levels {
                    self.enqueue_reverse_level(f);
                }
            }

            let fanout_fanouts = self.store.node(f).get_fanouts().to_vec();
            for ff in fanout_fanouts {
                if self.is_and(ff) {
                    let exor = self.is_exor_type(ff);
                    self.store.node_mut(ff).flags.exor = exor;
                }
            }
        }

        let node = self.store.node(old);
        if node.fanout_count() == 0 && node.is_and() && !node.is_persistent() {
            self.delete_dangling(old);
        }
    }

    /// Rewires an output or a latch reading `old` to `new`.
    fn patch_terminal(&mut self, terminal: NodeId, old: NodeId, new: AigEdge, update_levels: bool) {
        let target = new.node;
        let node = self.store.node_mut(target);
        if node.flags.mark_b {
            node.flags.mark_b = false;
            let reverse_level = node.reverse_level;
            self.levels_r.remove(reverse_level, target);
        }
        if update_levels && self.reverse_levels {
            let reverse_level = self.store.node(old).reverse_level;
            self.store.node_mut(target).reverse_level = reverse_level;
            if self.is_and(target) {
                self.enqueue_reverse_level(target);
            }
        }
        self.store.patch_fanin(terminal, old, new);
        self.record_net(target);
    }
}
