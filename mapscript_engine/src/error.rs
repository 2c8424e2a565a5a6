//! Errors raised while walking event chains.
//!
//! Rejected interactions are not errors (see [`ChainOutcome::Aborted`](crate::chain::ChainOutcome)).
//! Everything here means either broken map data or a host that drove the
//! interpreter incorrectly.

use thiserror::Error;

use crate::event::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Map data is inconsistent: a declared type disagrees with its payload,
    /// a link points outside the node table, or a raw code is out of range.
    #[error("corrupt event data at node {node}: {reason}")]
    CorruptData { node: NodeId, reason: String },

    /// A tile or character referenced an event id with no chain head.
    #[error("event id {0} has no chain on this map")]
    UnknownEvent(u16),

    /// The walker visited more nodes than allowed without the chain ending.
    #[error("chain starting at node {start} exceeded {limit} steps")]
    ChainLimitExceeded { start: NodeId, limit: usize },

    /// `resume` was given a response that the suspended node cannot use.
    #[error("node {node} cannot continue with response {response}")]
    UnexpectedResponse { node: NodeId, response: String },

    /// `resume` was given a continuation whose node never suspends.
    #[error("node {0} does not suspend")]
    NotSuspendable(NodeId),
}

impl EventError {
    pub(crate) fn corrupt(node: NodeId, reason: impl Into<String>) -> Self {
        EventError::CorruptData {
            node,
            reason: reason.into(),
        }
    }
}
