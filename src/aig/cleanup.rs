//! Removal of dangling AND gates.

use log::{debug, trace};

use super::{Aig, NodeId};

impl Aig {
    /// Deletes the AND gate `id`, which must not have any fanout, then every gate of its cone left
    /// without fanout. Returns the number of deleted gates.
    ///
    /// Persistent gates stop the cascade, but `id` itself is deleted even if it is persistent.
    /// During a [`Aig::replace`], a gate still waiting to replace another one is kept.
    ///
    /// A deleted choice member is unlinked from its class. A deleted representative takes the
    /// members of its class down with it.
    pub fn delete_dangling(&mut self, id: NodeId) -> usize {
        let node = self.store.node(id);
        assert!(node.is_and(), "node {} is not an and gate", id);
        assert_eq!(
            node.fanout_count(),
            0,
            "deleting node {} which still has fanouts",
            id
        );

        let mut deleted = 0;
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if self.store.get(n).is_none_or(|node| node.fanout_count() > 0) {
                continue;
            }
            // pending replacements of n are moot, replacements by n still need it
            self.replace_stack.retain(|&(old, _)| old != n);
            if self.replace_stack.iter().any(|&(_, new)| new.node == n) {
                trace!("keeping node {}, a replacement is pending", n);
                continue;
            }

            let members = self.release_choice(n);
            stack.extend(members);

            let fanins: Vec<NodeId> = self
                .store
                .node(n)
                .get_fanins()
                .iter()
                .map(|fanin| fanin.node)
                .collect();
            for &fanin in &fanins {
                self.record_net(fanin);
            }

            self.table.remove(&self.store, n);
            self.dequeue_levels(n);
            self.store.delete_object(n);
            deleted += 1;
            trace!("deleted dangling node {}", n);

            for fanin in fanins {
                let dangling = self.store.get(fanin).is_some_and(|node| {
                    node.is_and() && node.fanout_count() == 0 && !node.is_persistent()
                });
                if dangling {
                    stack.push(fanin);
                }
            }
        }
        deleted
    }

    /// Takes `id` out of its equivalence class before it is deleted.
    ///
    /// Returns the members of the class if `id` was its representative. They are no longer
    /// persistent.
    fn release_choice(&mut self, id: NodeId) -> Vec<NodeId> {
        let next = self.store.node_mut(id).equiv.take();
        let owner = if self.store.node(id).is_persistent() {
            self.choice_owner(id)
        } else {
            None
        };
        if let Some(owner) = owner {
            self.store.node_mut(owner).equiv = next;
            return Vec::new();
        }

        let mut members = Vec::new();
        let mut current = next;
        while let Some(member) = current {
            let node = self.store.node_mut(member);
            current = node.equiv.take();
            node.flags.persistent = false;
            members.push(member);
        }
        if !members.is_empty() {
            trace!("releasing members {:?} of node {}", members, id);
        }
        members
    }

    /// Deletes every AND gate without fanout (persistent ones excepted), and whatever they were
    /// the only users of. Returns the number of deleted gates.
    pub fn cleanup_all(&mut self) -> usize {
        let before = self.table.len();
        let dangling: Vec<NodeId> = self
            .table
            .iter()
            .filter(|&id| {
                let node = self.store.node(id);
                node.fanout_count() == 0 && !node.is_persistent()
            })
            .collect();
        for id in dangling {
            if self.store.get(id).is_some_and(|node| node.fanout_count() == 0) {
                self.delete_dangling(id);
            }
        }
        let removed = before - self.table.len();
        debug!("cleanup removed {} dangling nodes", removed);
        removed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn dead_cone_is_removed() {
        let mut aig = Aig::new();
        let x: Vec<_> = (0..4).map(|_| aig.add_input()).collect();
        let p = aig.make_and(x[0], x[1]);
        let q = aig.make_and(x[2], !x[3]);
        let r = aig.make_and(p, !q);
        assert_eq!(aig.delete_dangling(r.get_node_id()), 3);
        assert_eq!(aig.and_count(), 0);
        assert_eq!(aig.table_len(), 0);
        for input in x {
            assert_eq!(aig.get_node(input.get_node_id()).unwrap().fanout_count(), 0);
        }
    }

    #[test]
    fn shared_fanin_survives() {
        let mut aig = Aig::new();
        let x: Vec<_> = (0..5).map(|_| aig.add_input()).collect();
        let p = aig.make_and(x[0], x[1]);
        let q = aig.make_and(x[2], x[3]);
        let r = aig.make_and(p, q);
        let s = aig.make_and(p, x[4]);
        aig.add_output(s).unwrap();

        assert_eq!(aig.delete_dangling(r.get_node_id()), 2);
        assert!(aig.get_node(p.get_node_id()).is_some());
        assert!(aig.get_node(q.get_node_id()).is_none());
        assert_eq!(aig.get_node(p.get_node_id()).unwrap().get_fanouts(), &[s.get_node_id()]);
        assert!(aig.check());
    }

    #[test]
    fn persistent_fanin_stops_cascade() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let p = aig.make_and(a, b);
        let r = aig.make_and(p, c);
        aig.set_persistent(p.get_node_id(), true).unwrap();
        assert_eq!(aig.delete_dangling(r.get_node_id()), 1);
        assert!(aig.get_node(p.get_node_id()).is_some());
    }

    #[test]
    fn cleanup_all_sweeps_dangling_nodes() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let used = aig.make_and(a, b);
        aig.add_output(used).unwrap();
        let t = aig.make_and(a, c);
        aig.make_and(t, !b);
        aig.make_and(!b, !c);

        aig.begin_update();
        assert_eq!(aig.cleanup_all(), 3);
        let session = aig.end_update();
        assert!(session.updated_nets().contains(&t.get_node_id()));
        assert!(session.updated_nets().contains(&c.get_node_id()));

        assert_eq!(aig.and_count(), 1);
        assert!(aig.store().iter().filter(|n| n.is_and()).all(|n| n.fanout_count() > 0));
        assert_eq!(aig.cleanup_all(), 0);
        assert!(aig.check());
    }

    #[test]
    fn pending_replacement_of_deleted_node_is_dropped() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let n = aig.make_and(a, b);
        let m = aig.make_and(n, c);
        let other = aig.make_and(!a, c);
        aig.replace_stack.push((n.get_node_id(), aig.const0()));
        aig.replace_stack.push((other.get_node_id(), c));

        assert_eq!(aig.delete_dangling(m.get_node_id()), 2);
        assert_eq!(aig.replace_stack, vec![(other.get_node_id(), c)]);
        aig.replace_stack.clear();
        assert!(aig.check());
    }

    #[test]
    fn pending_target_is_kept() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let n = aig.make_and(a, b);
        let m = aig.make_and(n, c);
        let old = aig.make_and(!a, c);
        aig.add_output(old).unwrap();
        aig.replace_stack.push((old.get_node_id(), !n));

        // n loses its only fanout but is still needed
        assert_eq!(aig.delete_dangling(m.get_node_id()), 1);
        assert_eq!(aig.get_node(n.get_node_id()).unwrap().fanout_count(), 0);
        assert_eq!(aig.replace_stack, vec![(old.get_node_id(), !n)]);
        aig.replace_stack.clear();
        assert!(aig.check());
    }

    #[test]
    fn deleting_representative_deletes_members() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let ab = aig.make_and(a, b);
        let repr = aig.make_and(ab, c);
        let bc = aig.make_and(b, c);
        let alt = aig.make_and(a, bc);
        aig.add_choice(repr.get_node_id(), alt.get_node_id()).unwrap();

        assert_eq!(aig.delete_dangling(repr.get_node_id()), 4);
        assert_eq!(aig.and_count(), 0);
        assert!(aig.check());
    }

    #[test]
    fn deleting_member_unlinks_it() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let repr = aig.make_and(a, b);
        aig.add_output(repr).unwrap();
        let alt1 = aig.make_and(a, c);
        let alt2 = aig.make_and(b, c);
        let alt3 = aig.make_and(!a, c);
        for alt in [alt1, alt2, alt3] {
            aig.add_choice(repr.get_node_id(), alt.get_node_id()).unwrap();
        }

        assert_eq!(aig.delete_dangling(alt2.get_node_id()), 1);
        assert_eq!(
            aig.choice_members(repr.get_node_id()).collect::<Vec<_>>(),
            vec![alt1.get_node_id(), alt3.get_node_id()]
        );
        assert_eq!(aig.delete_dangling(alt3.get_node_id()), 1);
        assert_eq!(
            aig.choice_members(repr.get_node_id()).collect::<Vec<_>>(),
            vec![alt1.get_node_id()]
        );
        assert!(aig.get_node(alt1.get_node_id()).unwrap().is_persistent());
        assert_eq!(aig.cleanup_all(), 0);
        assert!(aig.check());
    }

    #[test]
    #[should_panic]
    fn deleting_used_node_panics() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let n = aig.make_and(a, b);
        aig.add_output(n).unwrap();
        aig.delete_dangling(n.get_node_id());
    }
}
