// ABOUTME: Error type for window tree operations.
// ABOUTME: Covers bad addresses, stale handles and rejected splits.

use crate::address::Address;
use crate::pane::BufferId;
use crate::tree::{Axis, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid address: {0}")]
    InvalidAddress(Address),

    #[error("Address {0} names a container, not a window")]
    NotAWindow(Address),

    #[error("Cannot split {axis:?} in a {children}-child container laid out the other way")]
    SplitRejected { axis: Axis, children: usize },

    #[error("No node {0:?} in the tree")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is a container, not a window")]
    NotALeaf(NodeId),

    #[error("Node {0:?} is a window, not a container")]
    NotAContainer(NodeId),

    #[error("The root container cannot be wrapped")]
    CannotWrapRoot,

    #[error("Cannot remove the last window")]
    LastWindow,

    #[error("A buffer named {0:?} is already registered")]
    DuplicateBuffer(String),

    #[error("No buffer {0:?} in the registry")]
    UnknownBuffer(BufferId),
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
