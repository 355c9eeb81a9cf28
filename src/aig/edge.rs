//! An [`AigEdge`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`AigNode`]: crate::AigNode

use std::ops::Not;

use crate::NodeId;

/// Id of the constant-1 node, created once per [`Aig`](crate::Aig).
pub const CONST1_ID: NodeId = 0;

/// Unambiguous fanin selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaninId {
    Fanin0,
    Fanin1,
}

impl From<bool> for FaninId {
    fn from(value: bool) -> Self {
        if value {
            FaninId::Fanin1
        } else {
            FaninId::Fanin0
        }
    }
}

impl From<usize> for FaninId {
    fn from(value: usize) -> Self {
        if value == 0 {
            FaninId::Fanin0
        } else if value == 1 {
            FaninId::Fanin1
        } else {
            panic!("could not create FaninId from value={}", value)
        }
    }
}

impl FaninId {
    /// The other fanin of a two-input node.
    pub fn other(self) -> Self {
        match self {
            FaninId::Fanin0 => FaninId::Fanin1,
            FaninId::Fanin1 => FaninId::Fanin0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            FaninId::Fanin0 => 0,
            FaninId::Fanin1 => 1,
        }
    }
}

/// A directed edge representing a fanin for AIG nodes.
///
/// The edge is a plain handle: the id of the node it refers to plus a polarity bit.
/// It never owns the node, the [`Aig`](crate::Aig) does.
///
/// For example:
///
/// ```rust
/// use strashaig::{Aig, AigEdge};
/// let mut aig = Aig::new();
/// let x = aig.add_input();
/// assert_eq!(x, !!x);
/// assert!((!x).is_complement_of(&x));
/// assert_eq!((!x).regular(), x);
/// assert!(aig.const1().is_cst_true());
/// assert!(aig.const0().is_cst_false());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AigEdge {
    /// The node the edge is refering to.
    pub(super) node: NodeId,
    /// Set to true if signal should be inverted.
    pub(super) complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl From<&AigEdge> for (NodeId, bool) {
    fn from(edge: &AigEdge) -> Self {
        (edge.node, edge.complement)
    }
}

impl AigEdge {
    pub fn new(node: NodeId, complement: bool) -> Self {
        AigEdge { node, complement }
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    /// The same edge without its inverter.
    pub fn regular(self) -> Self {
        AigEdge::new(self.node, false)
    }

    /// Same as `!edge`.
    pub fn negate(self) -> Self {
        !self
    }

    /// Complements the edge only if `cond` holds.
    pub fn negate_if(self, cond: bool) -> Self {
        AigEdge::new(self.node, self.complement ^ cond)
    }

    pub fn is_const(&self) -> bool {
        self.node == CONST1_ID
    }

    pub fn is_cst_true(&self) -> bool {
        self.node == CONST1_ID && !self.complement
    }

    pub fn is_cst_false(&self) -> bool {
        self.node == CONST1_ID && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.node == other.node && self.complement ^ other.complement
    }
}
