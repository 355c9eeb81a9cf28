//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`AigEdge`] and some others relevant structs.
//!
//! The [`Aig`] is always structurally hashed. At any time outside of a running [`Aig::replace`]:
//! - no two AND gates have the same fanins (up to their order)
//! - constants are propagated and there are no single-input AND gates
//! - the level of each AND gate is one more than the largest level of its fanins
//! - the EXOR status of each AND gate is up-to-date.
//!
//! To build logic, check [`Aig::make_and`] and the derived operators next to it.
//! To rewire logic, check [`Aig::replace`].

mod build;
mod cleanup;
mod clone;
pub mod config;
pub mod edge;
pub mod error;
mod integrity;
mod level;
pub mod node;
mod replace;
pub mod store;
mod table;
pub mod update;

use std::collections::HashSet;

use log::debug;

pub use config::AigConfig;
pub use edge::{AigEdge, CONST1_ID, FaninId};
pub use error::{AigError, Result};
pub use node::{AigNode, NodeFlags, NodeId, NodeKind};
pub use store::NodeStore;
pub use update::UpdateSession;

use level::LevelQueue;
use table::StrashTable;

/// A whole structurally hashed AIG.
///
/// Nodes live in a [`NodeStore`] arena and are referred to by [`NodeId`]. The AND gates are
/// additionally indexed by their canonical fanin pair, which is what lets [`Aig::make_and`]
/// return the existing node instead of creating a duplicate.
///
/// Dangling AND gates (no fanout) are removed as soon as a [`Aig::replace`] leaves them
/// unused. Gates built with [`Aig::make_and`] and never used stay around until you call
/// [`Aig::cleanup_all`].
///
/// Note that [`Aig::clone`] copies the arena as is (same ids).
/// If you want a freshly hashed copy, use [`Aig::deep_clone`] instead.
///
/// ```rust
/// use strashaig::Aig;
/// let mut aig = Aig::new();
/// let a = aig.add_input();
/// let b = aig.add_input();
/// let ab = aig.make_and(a, b);
/// assert_eq!(aig.make_and(b, a), ab);
/// let f = aig.xor(a, b);
/// aig.add_output(f).unwrap();
/// aig.cleanup_all();
/// assert!(aig.check());
/// ```
#[derive(Debug, Clone)]
pub struct Aig {
    store: NodeStore,
    table: StrashTable,
    inputs: Vec<NodeId>,
    latches: Vec<NodeId>,
    outputs: Vec<NodeId>,
    /// Pending `(old, new)` replacements of a running [`Aig::replace`].
    replace_stack: Vec<(NodeId, AigEdge)>,
    levels: LevelQueue,
    levels_r: LevelQueue,
    reverse_levels: bool,
    update: Option<UpdateSession>,
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node included).
    pub fn new() -> Self {
        Self::with_config(AigConfig::default())
    }

    /// Create a brand new AIG using the given parameters.
    pub fn with_config(config: AigConfig) -> Self {
        let mut store = NodeStore::with_capacity(config.node_capacity);
        let const1 = store.allocate_node(NodeKind::Const1);
        assert_eq!(const1, CONST1_ID);
        store.node_mut(const1).flags.phase = true;
        Aig {
            store,
            table: StrashTable::new(config.initial_bins),
            inputs: Vec::new(),
            latches: Vec::new(),
            outputs: Vec::new(),
            replace_stack: Vec::new(),
            levels: LevelQueue::default(),
            levels_r: LevelQueue::default(),
            reverse_levels: false,
            update: None,
        }
    }

    /// The constant true signal.
    pub fn const1(&self) -> AigEdge {
        AigEdge::new(CONST1_ID, false)
    }

    /// The constant false signal.
    pub fn const0(&self) -> AigEdge {
        AigEdge::new(CONST1_ID, true)
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&AigNode> {
        self.store.get(id)
    }

    /// Read access to the underlying node arena.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Creates a new primary input.
    pub fn add_input(&mut self) -> AigEdge {
        let id = self.store.allocate_node(NodeKind::Input);
        self.inputs.push(id);
        AigEdge::new(id, false)
    }

    /// Creates a new latch, its next-state fanin must be set with [`Aig::set_latch_next`].
    pub fn add_latch(&mut self, init: Option<bool>) -> AigEdge {
        let id = self.store.allocate_node(NodeKind::Latch { init });
        self.store.node_mut(id).flags.phase = init == Some(true);
        self.latches.push(id);
        AigEdge::new(id, false)
    }

    /// Sets (or rewires) the next-state fanin of a latch.
    pub fn set_latch_next(&mut self, latch: NodeId, next: AigEdge) -> Result<()> {
        let node = self
            .store
            .get(latch)
            .ok_or(AigError::NodeDoesNotExist(latch))?;
        if !node.is_latch() {
            return Err(AigError::NotALatch(latch));
        }
        if !self.store.contains(next.node) {
            return Err(AigError::NodeDoesNotExist(next.node));
        }
        self.store.remove_fanins(latch);
        self.store.add_fanin(latch, next);
        Ok(())
    }

    /// Mark a signal as an output. Returns the id of the new output node.
    pub fn add_output(&mut self, fanin: AigEdge) -> Result<NodeId> {
        if !self.store.contains(fanin.node) {
            return Err(AigError::NodeDoesNotExist(fanin.node));
        }
        let id = self.store.allocate_node(NodeKind::Output);
        self.store.add_fanin(id, fanin);
        self.outputs.push(id);
        Ok(id)
    }

    /// Remove an output, returning the signal it was reading.
    ///
    /// The driver is not deleted even if it is now dangling, see [`Aig::cleanup_all`].
    pub fn remove_output(&mut self, id: NodeId) -> Result<AigEdge> {
        let node = self.store.get(id).ok_or(AigError::NodeDoesNotExist(id))?;
        if !node.is_output() {
            return Err(AigError::NotAnOutput(id));
        }
        let fanin = node.fanin0();
        self.store.delete_object(id);
        self.outputs.retain(|&out| out != id);
        Ok(fanin)
    }

    /// Retrieves inputs id.
    pub fn get_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Retrieves latches id.
    pub fn get_latches(&self) -> &[NodeId] {
        &self.latches
    }

    /// Retrieves output nodes id.
    pub fn get_output_ids(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Retrieves the signals driving the outputs.
    pub fn get_outputs(&self) -> Vec<AigEdge> {
        self.outputs
            .iter()
            .map(|&id| self.store.node(id).fanin0())
            .collect()
    }

    /// Number of AND gates.
    pub fn and_count(&self) -> usize {
        self.store.and_count()
    }

    /// Number of live objects of any kind (constant, inputs, latches, gates and outputs).
    pub fn node_count(&self) -> usize {
        self.store.live_count()
    }

    /// Number of buckets of the structural hash table.
    pub fn bin_count(&self) -> usize {
        self.table.bin_count()
    }

    /// Number of AND gates indexed by the structural hash table.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Level of a node (0 for constants, inputs and latches).
    pub fn level(&self, id: NodeId) -> u32 {
        self.store.node(id).level
    }

    /// Number of logic levels, ie the largest level of a signal read by an output or a latch.
    pub fn max_level(&self) -> u32 {
        self.store
            .iter()
            .filter(|node| node.is_co())
            .filter_map(|node| node.get_fanins().first())
            .map(|fanin| self.store.node(fanin.node).level)
            .max()
            .unwrap_or(0)
    }

    /// Marks an AND gate as persistent (or not): persistent gates are never removed
    /// as dangling nodes.
    pub fn set_persistent(&mut self, id: NodeId, persistent: bool) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or(AigError::NodeDoesNotExist(id))?;
        if !node.is_and() {
            return Err(AigError::NotAnAnd(id));
        }
        node.flags.persistent = persistent;
        Ok(())
    }

    /// Adds `member` to the equivalence class of `repr`.
    ///
    /// Members are alternative implementations of `repr` and must not be used by anybody.
    /// They become persistent, so that cleaning up dangling gates leaves them alone.
    ///
    /// `member` must not belong to any class yet (neither as a member nor as a representative),
    /// and `repr` must not be a member of another class.
    pub fn add_choice(&mut self, repr: NodeId, member: NodeId) -> Result<()> {
        for id in [repr, member] {
            let node = self.store.get(id).ok_or(AigError::NodeDoesNotExist(id))?;
            if !node.is_and() {
                return Err(AigError::NotAnAnd(id));
            }
        }
        if repr == member
            || self.store.node(member).equiv.is_some()
            || self.choice_owner(member).is_some()
        {
            return Err(AigError::AlreadyInClass(member));
        }
        if self.choice_owner(repr).is_some() {
            return Err(AigError::AlreadyInClass(repr));
        }
        if self.store.node(member).fanout_count() > 0 {
            return Err(AigError::ChoiceHasFanouts(member));
        }
        let mut last = repr;
        while let Some(next) = self.store.node(last).equiv {
            last = next;
        }
        self.store.node_mut(last).equiv = Some(member);
        self.store.node_mut(member).flags.persistent = true;
        Ok(())
    }

    /// Members of the equivalence class of `repr` (`repr` excluded).
    pub fn choice_members(&self, repr: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.store.get(repr).and_then(|node| node.equiv);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.store.get(id).and_then(|node| node.equiv);
            Some(id)
        })
    }

    /// The node whose `equiv` link points to `id`, if `id` is a choice member.
    pub(crate) fn choice_owner(&self, id: NodeId) -> Option<NodeId> {
        self.store
            .iter()
            .find(|node| node.equiv == Some(id))
            .map(|node| node.id)
    }

    /// True if the node is the representative of a non-trivial equivalence class.
    pub fn is_choice(&self, id: NodeId) -> bool {
        self.store
            .get(id)
            .is_some_and(|node| node.is_and() && node.equiv.is_some() && node.fanout_count() > 0)
    }

    fn topological_visit(
        &self,
        start: NodeId,
        sort: &mut Vec<NodeId>,
        seen: &mut HashSet<NodeId>,
        done: &mut HashSet<NodeId>,
    ) -> Result<()> {
        let mut stack: Vec<(NodeId, bool)> = vec![(start, false)];

        while let Some((id, last_time)) = stack.pop() {
            // Post order check
            if last_time {
                done.insert(id);
                sort.push(id);
                continue;
            }

            if done.contains(&id) {
                continue;
            } else if seen.contains(&id) {
                return Err(AigError::InvalidState(format!(
                    "found a cycle through node {}",
                    id
                )));
            }

            seen.insert(id);
            stack.push((id, true));

            let node = self.store.node(id);
            // Latches break cycles: their next-state fanin is visited as a start of its own.
            if node.is_latch() {
                continue;
            }
            for fanin in node.get_fanins() {
                if !done.contains(&fanin.node) {
                    stack.push((fanin.node, false));
                }
            }
        }

        Ok(())
    }

    /// Returns a topological sort (fanins first) of every live node, will error if a cycle is detected.
    ///
    /// The "topological" sort makes sense only for the purely combinational part of the AIG.
    /// Latches are allowed to create cycles through their next-state fanin.
    pub fn get_topological_sort(&self) -> Result<Vec<NodeId>> {
        let mut sort = Vec::with_capacity(self.store.live_count());
        let mut seen = HashSet::new();
        let mut done = HashSet::new();

        for node in self.store.iter() {
            if done.contains(&node.id) {
                continue;
            }
            self.topological_visit(node.id, &mut sort, &mut seen, &mut done)?;
            // Latch next-state cones
            if node.is_latch() {
                for fanin in node.get_fanins() {
                    if !done.contains(&fanin.node) {
                        self.topological_visit(fanin.node, &mut sort, &mut seen, &mut done)?;
                    }
                }
            }
        }
        Ok(sort)
    }

    /// Recomputes the phase of every node: its value when all inputs are 0 and every latch holds
    /// its initial value.
    pub fn set_node_phases(&mut self) -> Result<()> {
        let order = self.get_topological_sort()?;
        for id in order {
            let node = self.store.node(id);
            let phase = match node.kind {
                NodeKind::Const1 => true,
                NodeKind::Input => false,
                NodeKind::Latch { init } => init == Some(true),
                NodeKind::And => self.edge_phase(node.fanin0()) & self.edge_phase(node.fanin1()),
                NodeKind::Output => node
                    .get_fanins()
                    .first()
                    .is_some_and(|&fanin| self.edge_phase(fanin)),
            };
            self.store.node_mut(id).flags.phase = phase;
        }
        debug!("recomputed phases of {} nodes", self.store.live_count());
        Ok(())
    }

    /// Phase of the signal carried by an edge.
    pub(crate) fn edge_phase(&self, edge: AigEdge) -> bool {
        self.store.node(edge.node).flags.phase ^ edge.complement
    }

    pub(crate) fn is_and(&self, id: NodeId) -> bool {
        self.store.get(id).is_some_and(AigNode::is_and)
    }

    pub(crate) fn fanout_count(&self, id: NodeId) -> usize {
        self.store.node(id).fanout_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn new_aig_has_constant() {
        let aig = Aig::new();
        let c = aig.get_node(CONST1_ID).unwrap();
        assert!(c.is_const());
        assert!(c.phase());
        assert_eq!(aig.node_count(), 1);
        assert_eq!(aig.and_count(), 0);
        assert_eq!(aig.bin_count(), 10_007);
        assert!(aig.const1().is_cst_true());
        assert_eq!(aig.const0(), !aig.const1());
    }

    #[test]
    fn outputs_and_inputs() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let n = aig.make_and(a, !b);
        let o = aig.add_output(!n).unwrap();
        assert_eq!(aig.get_inputs(), &[a.get_node_id(), b.get_node_id()]);
        assert_eq!(aig.get_outputs(), vec![!n]);
        assert_eq!(aig.get_output_ids(), &[o]);
        assert_eq!(aig.max_level(), 1);

        assert!(aig.add_output(AigEdge::new(1000, false)).is_err());
        assert!(matches!(
            aig.remove_output(n.get_node_id()),
            Err(AigError::NotAnOutput(_))
        ));
        assert_eq!(aig.remove_output(o).unwrap(), !n);
        assert!(aig.get_outputs().is_empty());
        // the driver is left dangling until cleanup
        assert!(aig.get_node(n.get_node_id()).is_some());
        assert_eq!(aig.cleanup_all(), 1);
        assert!(aig.get_node(n.get_node_id()).is_none());
    }

    #[test]
    fn latches() {
        let mut aig = Aig::new();
        let i = aig.add_input();
        let l = aig.add_latch(Some(true));
        let n = aig.make_and(i, l);
        aig.set_latch_next(l.get_node_id(), !n).unwrap();
        aig.add_output(n).unwrap();
        assert_eq!(aig.get_latches(), &[l.get_node_id()]);
        assert!(aig.get_node(l.get_node_id()).unwrap().phase());
        assert!(matches!(
            aig.set_latch_next(i.get_node_id(), n),
            Err(AigError::NotALatch(_))
        ));
        // the latch loop is not a combinational cycle
        assert!(aig.get_topological_sort().is_ok());
        assert!(aig.check());
    }

    #[test]
    fn topological_sort_puts_fanins_first() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let ab = aig.make_and(a, b);
        let abc = aig.make_and(ab, c);
        aig.add_output(abc).unwrap();
        let sort = aig.get_topological_sort().unwrap();
        let pos = |id: NodeId| sort.iter().position(|&x| x == id).unwrap();
        assert_eq!(sort.len(), aig.node_count());
        assert!(pos(a.get_node_id()) < pos(ab.get_node_id()));
        assert!(pos(ab.get_node_id()) < pos(abc.get_node_id()));
        assert!(pos(c.get_node_id()) < pos(abc.get_node_id()));
    }

    #[test]
    fn phases() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let n = aig.make_and(!a, !b);
        assert!(aig.get_node(n.get_node_id()).unwrap().phase());
        let m = aig.make_and(a, !b);
        assert!(!aig.get_node(m.get_node_id()).unwrap().phase());
        aig.set_node_phases().unwrap();
        assert!(aig.get_node(n.get_node_id()).unwrap().phase());
        assert!(aig.edge_phase(!m));
    }

    #[test]
    fn choices() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let ab = aig.make_and(a, b);
        let repr = aig.make_and(ab, c);
        let bc = aig.make_and(b, c);
        let alt = aig.make_and(a, bc);
        aig.add_output(repr).unwrap();

        aig.add_choice(repr.get_node_id(), alt.get_node_id()).unwrap();
        assert!(aig.is_choice(repr.get_node_id()));
        // members are kept by the cleanup
        assert!(aig.get_node(alt.get_node_id()).unwrap().is_persistent());
        assert_eq!(aig.cleanup_all(), 0);
        assert_eq!(
            aig.choice_members(repr.get_node_id()).collect::<Vec<_>>(),
            vec![alt.get_node_id()]
        );
        assert!(aig.check());

        // a member which is used somewhere is refused
        let used = aig.make_and(a, c);
        aig.add_output(used).unwrap();
        assert!(matches!(
            aig.add_choice(repr.get_node_id(), used.get_node_id()),
            Err(AigError::ChoiceHasFanouts(_))
        ));
        assert!(aig.add_choice(repr.get_node_id(), alt.get_node_id()).is_err());
    }

    #[test]
    fn choice_classes_stay_disjoint() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let [p, q, r, s] = [(a, b), (a, c), (b, c), (!a, b)]
            .map(|(x, y)| aig.make_and(x, y).get_node_id());

        aig.add_choice(p, q).unwrap();
        // linking back would close the chain into a loop
        assert!(matches!(aig.add_choice(q, p), Err(AigError::AlreadyInClass(id)) if id == p));
        // q is taken
        assert!(matches!(aig.add_choice(r, q), Err(AigError::AlreadyInClass(id)) if id == q));
        // q is a member, it cannot lead a class
        assert!(matches!(aig.add_choice(q, r), Err(AigError::AlreadyInClass(id)) if id == q));
        // p already leads a class
        assert!(matches!(aig.add_choice(r, p), Err(AigError::AlreadyInClass(id)) if id == p));
        assert!(matches!(aig.add_choice(s, s), Err(AigError::AlreadyInClass(id)) if id == s));

        aig.add_choice(p, r).unwrap();
        assert_eq!(aig.choice_members(p).collect::<Vec<_>>(), vec![q, r]);
        assert!(aig.check());
    }

    #[test]
    fn persistent_flag() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let n = aig.make_and(a, b);
        aig.set_persistent(n.get_node_id(), true).unwrap();
        assert!(aig.get_node(n.get_node_id()).unwrap().is_persistent());
        assert!(matches!(
            aig.set_persistent(a.get_node_id(), true),
            Err(AigError::NotAnAnd(_))
        ));
    }
}
