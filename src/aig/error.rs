use thiserror::Error;

use crate::miter::MiterError;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
///
/// Only misuse of the outer API and integrity-check failures are reported this way.
/// Breaking a structural invariant from inside the engine is a bug and panics.
#[derive(Debug, Error)]
pub enum AigError {
    /// The node with given id does not exist.
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// The node exists but is not an AND gate.
    #[error("node with id={0} is not an and gate")]
    NotAnAnd(NodeId),

    /// The node exists but is not a latch.
    #[error("node with id={0} is not a latch")]
    NotALatch(NodeId),

    /// The node exists but is not a primary output.
    #[error("node with id={0} is not an output")]
    NotAnOutput(NodeId),

    /// Only nodes without fanouts can join an equivalence class.
    #[error("node with id={0} has fanouts and cannot be a choice member")]
    ChoiceHasFanouts(NodeId),

    /// Equivalence classes are disjoint chains hanging from their representative.
    #[error("node with id={0} already belongs to an equivalence class")]
    AlreadyInClass(NodeId),

    /// The AIG has reached an invalid state. This should never happen.
    /// Raised by the integrity checker with a description of the first violation found.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`MiterError`].
    #[error("{0}")]
    MiterError(#[from] MiterError),
}
