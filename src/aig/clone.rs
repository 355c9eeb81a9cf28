use std::collections::HashMap;

use crate::{Aig, AigConfig, AigEdge, AigError, CONST1_ID, NodeId, NodeKind, Result};

/// Maps an edge of the source AIG to the corresponding signal of the copy.
fn translate(map: &HashMap<NodeId, AigEdge>, edge: AigEdge) -> Result<AigEdge> {
    map.get(&edge.node)
        .map(|copy| copy.negate_if(edge.complement))
        .ok_or(AigError::NodeDoesNotExist(edge.node))
}

impl Aig {
    /// Builds a brand new AIG computing the same functions, with fresh ids.
    ///
    /// Every gate goes through [`Aig::make_and`] again, so the copy is structurally hashed
    /// whatever the state of this one.
    /// The strategy to do the clone is roughly:
    /// - create inputs
    /// - create latches without their next state
    /// - create and gates in topological order
    /// - set the next state of latches
    /// - register outputs
    ///
    /// Input, latch and output order is preserved.
    pub fn deep_clone(&self) -> Result<Self> {
        self.check_integrity()?;

        let config = AigConfig::default()
            .with_initial_bins(self.bin_count())
            .with_node_capacity(self.node_count());
        let mut aig = Aig::with_config(config);
        let mut map = HashMap::from([(CONST1_ID, aig.const1())]);

        // Adding inputs
        for &id in &self.inputs {
            map.insert(id, aig.add_input());
        }

        // Adding latches, their fanin comes later
        for &id in &self.latches {
            match self.store.node(id).kind {
                NodeKind::Latch { init } => {
                    map.insert(id, aig.add_latch(init));
                }
                kind => panic!("Expected latch, got {:?} for node {}", kind, id),
            }
        }

        // Adding and gates in topological order
        aig.copy_logic(self, &mut map)?;

        // Edit the fanin of the latches
        for &id in &self.latches {
            if let Some(&next) = self.store.node(id).get_fanins().first() {
                let latch = translate(&map, AigEdge::new(id, false))?;
                aig.set_latch_next(latch.node, translate(&map, next)?)?;
            }
        }

        // Mark outputs
        for output in self.get_outputs() {
            aig.add_output(translate(&map, output)?)?;
        }

        aig.check_integrity()?;
        Ok(aig)
    }

    /// Rebuilds every AND gate of `src` into this AIG.
    ///
    /// `map` must already send the constant, inputs and latches of `src` to signals of this AIG.
    /// It is completed with the image of every gate.
    pub(crate) fn copy_logic(
        &mut self,
        src: &Aig,
        map: &mut HashMap<NodeId, AigEdge>,
    ) -> Result<()> {
        for id in src.get_topological_sort()? {
            let node = src.store.node(id);
            if !node.is_and() {
                continue;
            }
            let fanin0 = translate(map, node.fanin0())?;
            let fanin1 = translate(map, node.fanin1())?;
            let copy = self.make_and(fanin0, fanin1);
            map.insert(id, copy);
        }
        Ok(())
    }
}
