use log::warn;

use crate::{Aig, AigError, AigNode, NodeKind, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment outside of [`Aig::replace`].
    ///
    /// Returns the first violation found:
    /// - fanin counts, fanin/fanout coherence and levels of every node
    /// - every AND gate is found in the structural hash table under its own fanins
    /// - the table holds exactly the AND gates
    /// - members of an equivalence class have no fanout
    /// - the AIG is acyclic (latches excepted)
    pub fn check_integrity(&self) -> Result<()> {
        for node in self.store.iter() {
            self.check_node_integrity(node)?;
        }

        // Checking the table population
        if self.table.len() != self.store.and_count() {
            return Err(AigError::InvalidState(format!(
                "the structural hash table holds {} entries but there are {} and gates",
                self.table.len(),
                self.store.and_count()
            )));
        }
        if let Some(id) = self.table.iter().find(|&id| !self.is_and(id)) {
            return Err(AigError::InvalidState(format!(
                "the structural hash table refers to node {} which is not a live and gate",
                id
            )));
        }

        // Checking that members of a class are not used
        for node in self.store.iter().filter(|node| node.is_and()) {
            for member in self.choice_members(node.id) {
                let fanouts = self.store.get(member).map_or(0, AigNode::fanout_count);
                if fanouts > 0 {
                    return Err(AigError::InvalidState(format!(
                        "member {} of choice node {} has {} fanouts",
                        member, node.id, fanouts
                    )));
                }
            }
        }

        // Checking the registered terminals
        for &id in self.inputs.iter().chain(&self.latches).chain(&self.outputs) {
            if !self.store.contains(id) {
                return Err(AigError::NodeDoesNotExist(id));
            }
        }

        // Checks for acyclicity
        self.get_topological_sort()?;

        Ok(())
    }

    /// Check the integrity for an individual node, that is:
    /// - the constant has id 0 and only it
    /// - the node has as many fanins as its kind requires (latches may miss their next state)
    /// - fanins refer to live nodes, which list this node as a fanout, and conversely
    /// - and gates have the right level and can be found in the table
    fn check_node_integrity(&self, node: &AigNode) -> Result<()> {
        let id = node.id;
        if node.is_const() != (id == 0) {
            return Err(AigError::InvalidState(format!(
                "node {} is {:?}, only the constant node has id 0",
                id, node.kind
            )));
        }

        let arity = node.kind.arity();
        let fanin_count = node.fanins.len();
        let fanins_ok = match node.kind {
            NodeKind::Latch { .. } => fanin_count <= arity,
            _ => fanin_count == arity,
        };
        if !fanins_ok {
            return Err(AigError::InvalidState(format!(
                "node {} ({:?}) has {} fanins",
                id, node.kind, fanin_count
            )));
        }

        // Checking fanin/fanout coherence
        for fanin in &node.fanins {
            match self.store.get(fanin.node) {
                None => {
                    return Err(AigError::InvalidState(format!(
                        "node {} has fanin {} which does not exist",
                        id, fanin.node
                    )));
                }
                Some(child) => {
                    let listed = child.fanouts.iter().filter(|&&f| f == id).count();
                    if listed != 1 {
                        return Err(AigError::InvalidState(format!(
                            "node {} is listed {} times as a fanout of its fanin {}",
                            id, listed, fanin.node
                        )));
                    }
                }
            }
        }
        for &f in &node.fanouts {
            let reads = self
                .store
                .get(f)
                .is_some_and(|fanout| fanout.fanin_position(id).is_some());
            if !reads {
                return Err(AigError::InvalidState(format!(
                    "node {} has fanout {} which does not read it",
                    id, f
                )));
            }
        }

        if !node.is_and() {
            return Ok(());
        }

        let (f0, f1) = (node.fanin0(), node.fanin1());
        if f0.node == f1.node {
            return Err(AigError::InvalidState(format!(
                "and gate {} reads node {} twice",
                id, f0.node
            )));
        }

        // Checking level consistency
        let expected = 1 + self.level(f0.node).max(self.level(f1.node));
        if node.level != expected {
            return Err(AigError::InvalidState(format!(
                "node {} has level {} that does not agree with its fanins (expected {})",
                id, node.level, expected
            )));
        }

        // Checking the node can be found in the table
        let (p0, p1) = super::table::canonical(f0, f1);
        if self.table.find(&self.store, p0, p1) != Some(id) {
            return Err(AigError::InvalidState(format!(
                "node {} is not in the structural hash table",
                id
            )));
        }

        Ok(())
    }

    /// Same as [`Aig::check_integrity`], logging the violation instead of returning it.
    pub fn check(&self) -> bool {
        match self.check_integrity() {
            Ok(()) => true,
            Err(e) => {
                warn!("integrity check failed: {}", e);
                false
            }
        }
    }
}
