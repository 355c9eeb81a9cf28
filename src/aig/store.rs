//! The [`NodeStore`] owns every object of an AIG and keeps fanins and fanouts in sync.
//!
//! It knows nothing about structural hashing: the engine in [`Aig`](crate::Aig) indexes the
//! nodes it owns and must drop them from every index before asking the store to release them.

use super::{AigEdge, AigNode, NodeId, NodeKind};

/// Arena of [`AigNode`]s indexed by [`NodeId`].
///
/// Deleted nodes leave an empty slot behind, ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Option<AigNode>>,
    live: usize,
    ands: usize,
}

impl NodeStore {
    pub fn with_capacity(capacity: usize) -> Self {
        NodeStore {
            nodes: Vec::with_capacity(capacity),
            live: 0,
            ands: 0,
        }
    }

    /// Creates a new node without fanins and returns its id.
    pub fn allocate_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Some(AigNode::new(id, kind)));
        self.live += 1;
        if kind == NodeKind::And {
            self.ands += 1;
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&AigNode> {
        self.nodes.get(id as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut AigNode> {
        self.nodes.get_mut(id as usize)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Same as [`NodeStore::get`], for ids the caller knows to be live.
    pub(crate) fn node(&self, id: NodeId) -> &AigNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} does not exist", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut AigNode {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {} does not exist", id),
        }
    }

    /// Connects `fanin` as the next fanin of `id`, and registers `id` as a fanout of the fanin node.
    ///
    /// Panics if the node already has all the fanins its kind allows.
    pub fn add_fanin(&mut self, id: NodeId, fanin: AigEdge) {
        assert!(
            self.contains(fanin.node),
            "fanin {} of node {} does not exist",
            fanin.node,
            id
        );
        let node = self.node_mut(id);
        assert!(
            node.fanins.len() < node.kind.arity(),
            "node {} ({:?}) cannot take another fanin",
            id,
            node.kind
        );
        node.fanins.push(fanin);
        self.node_mut(fanin.node).fanouts.push(id);
    }

    /// Disconnects all fanins of `id`, updating the fanout lists on the other side.
    pub fn remove_fanins(&mut self, id: NodeId) {
        let fanins = std::mem::take(&mut self.node_mut(id).fanins);
        for fanin in fanins {
            self.remove_fanout(fanin.node, id);
        }
    }

    /// Replaces the fanin of `id` pointing at `old` by `new`.
    ///
    /// The polarity of `new` is combined with the polarity the existing fanin already had.
    pub fn patch_fanin(&mut self, id: NodeId, old: NodeId, new: AigEdge) {
        assert_ne!(old, new.node, "patching node {} with itself", id);
        let node = self.node_mut(id);
        let position = match node.fanin_position(old) {
            Some(position) => position.index(),
            None => panic!("node {} does not have fanin {}", id, old),
        };
        let edge = &mut node.fanins[position];
        *edge = new.negate_if(edge.complement);
        self.remove_fanout(old, id);
        self.node_mut(new.node).fanouts.push(id);
    }

    /// Releases a node. It must not have any fanout left.
    pub fn delete_object(&mut self, id: NodeId) {
        assert_eq!(
            self.node(id).fanout_count(),
            0,
            "deleting node {} which still has fanouts",
            id
        );
        self.remove_fanins(id);
        if let Some(node) = self.nodes[id as usize].take() {
            self.live -= 1;
            if node.is_and() {
                self.ands -= 1;
            }
        }
    }

    fn remove_fanout(&mut self, id: NodeId, fanout: NodeId) {
        let fanouts = &mut self.node_mut(id).fanouts;
        match fanouts.iter().position(|&f| f == fanout) {
            Some(k) => {
                fanouts.remove(k);
            }
            None => panic!("failed to remove fanout {} (not found) from node {}", fanout, id),
        }
    }

    /// Live nodes in increasing id order.
    pub fn iter(&self) -> impl Iterator<Item = &AigNode> {
        self.nodes.iter().flatten()
    }

    /// Number of live nodes of any kind.
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn and_count(&self) -> usize {
        self.ands
    }

    /// One past the largest id ever handed out.
    pub fn id_bound(&self) -> usize {
        self.nodes.len()
    }
}
