//! Structurally hashed And-Inverter Graphs.
//!
//! An [`Aig`] never holds two AND gates reading the same pair of signals: gates are built
//! through [`Aig::make_and`], which looks the pair up before creating anything.
//! The graph can then be rewritten in place with [`Aig::replace`], which keeps the table,
//! the fanouts and the levels consistent, and dangling logic removed with
//! [`Aig::cleanup_all`].

pub mod aig;
pub mod miter;

// Re-exporting symbols and modules.
pub use aig::{
    Aig, AigConfig, AigEdge, AigError, AigNode, CONST1_ID, FaninId, NodeFlags, NodeId, NodeKind,
    NodeStore, Result, UpdateSession,
};
pub use miter::MiterError;
