use super::{AigEdge, FaninId};

/// A node id.
///
/// The constant-1 node has id 0 by convention. Ids are handed out by the
/// [`NodeStore`](super::NodeStore) and never reused.
pub type NodeId = u64;

/// What an [`AigNode`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The constant high/true signal, id 0.
    Const1,
    /// A primary input.
    Input,
    /// A latch (for sequential circuits).
    ///
    /// Its output is read like an input, its `next` fanin is a terminal consumer.
    Latch { init: Option<bool> },
    /// An AND gate with two fanins.
    And,
    /// A primary output, a terminal consumer with a single fanin.
    Output,
}

/// Per-node boolean attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// The node is the root of an EXOR/NEXOR structure.
    pub exor: bool,
    /// Value of the node under the all-zero input assignment.
    pub phase: bool,
    /// Persistent nodes survive dangling-node elimination.
    pub persistent: bool,
    /// Pending in the forward level worklist.
    pub(crate) mark_a: bool,
    /// Pending in the reverse level worklist.
    pub(crate) mark_b: bool,
}

/// An AIG node.
///
/// Each node has an id, a kind, its fanins (0, 1 or 2 edges depending on the kind) and the ids of
/// the nodes reading it (its fanouts).
///
/// Internal note: fanins and fanouts are kept in sync by the [`NodeStore`](super::NodeStore).
/// Never edit one without the other.
#[derive(Debug, Clone)]
pub struct AigNode {
    pub(super) id: NodeId,
    pub(super) kind: NodeKind,
    pub(super) fanins: Vec<AigEdge>,
    pub(super) fanouts: Vec<NodeId>,
    pub(super) level: u32,
    pub(super) reverse_level: u32,
    pub(super) flags: NodeFlags,
    /// Next member of the equivalence class, if this node is a choice node or a member of one.
    pub(super) equiv: Option<NodeId>,
}

impl AigNode {
    pub(super) fn new(id: NodeId, kind: NodeKind) -> Self {
        AigNode {
            id,
            kind,
            fanins: Vec::with_capacity(kind.arity()),
            fanouts: Vec::new(),
            level: 0,
            reverse_level: 0,
            flags: NodeFlags::default(),
            equiv: None,
        }
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }

    pub fn get_kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, NodeKind::Const1)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input)
    }

    pub fn is_latch(&self) -> bool {
        matches!(self.kind, NodeKind::Latch { .. })
    }

    pub fn is_and(&self) -> bool {
        matches!(self.kind, NodeKind::And)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.kind, NodeKind::Output)
    }

    /// Combinational input: its value comes from outside the AND network.
    pub fn is_ci(&self) -> bool {
        self.is_input() || self.is_latch()
    }

    /// Terminal consumer: reads a signal without being an AND gate.
    pub fn is_co(&self) -> bool {
        self.is_output() || self.is_latch()
    }

    pub fn get_fanins(&self) -> &[AigEdge] {
        &self.fanins
    }

    /// Returns the requested fanin edge.
    ///
    /// Panics if the node does not have it.
    pub fn fanin(&self, fanin_id: FaninId) -> AigEdge {
        match self.fanins.get(fanin_id.index()) {
            Some(edge) => *edge,
            None => panic!("node {} has no {:?}", self.id, fanin_id),
        }
    }

    pub fn fanin0(&self) -> AigEdge {
        self.fanin(FaninId::Fanin0)
    }

    pub fn fanin1(&self) -> AigEdge {
        self.fanin(FaninId::Fanin1)
    }

    /// Position of `child` among the fanins, if it is one.
    pub fn fanin_position(&self, child: NodeId) -> Option<FaninId> {
        self.fanins
            .iter()
            .position(|edge| edge.node == child)
            .map(FaninId::from)
    }

    pub fn get_fanouts(&self) -> &[NodeId] {
        &self.fanouts
    }

    pub fn fanout_count(&self) -> usize {
        self.fanouts.len()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn reverse_level(&self) -> u32 {
        self.reverse_level
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_exor(&self) -> bool {
        self.flags.exor
    }

    pub fn phase(&self) -> bool {
        self.flags.phase
    }

    pub fn is_persistent(&self) -> bool {
        self.flags.persistent
    }

    pub fn next_equiv(&self) -> Option<NodeId> {
        self.equiv
    }

    /// Swaps fanins so that fanin0 refers to the smaller id, polarities travel with their position.
    ///
    /// Returns true if the fanins were swapped.
    pub(super) fn reorder_fanins(&mut self) -> bool {
        if self.is_and() && self.fanins[0].node > self.fanins[1].node {
            self.fanins.swap(0, 1);
            true
        } else {
            false
        }
    }
}

impl NodeKind {
    /// Number of fanins a settled node of this kind has.
    pub fn arity(self) -> usize {
        match self {
            NodeKind::Const1 | NodeKind::Input => 0,
            NodeKind::Latch { .. } | NodeKind::Output => 1,
            NodeKind::And => 2,
        }
    }
}
