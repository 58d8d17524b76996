// ABOUTME: Window layout management for tilebuf.
// ABOUTME: Arranges buffers in a tree of split windows and tracks the active one.

mod address;
mod error;
mod modeline;
mod pane;
mod snapshot;
mod stack;
mod tree;

pub use address::{Address, ParseAddressError};
pub use error::{LayoutError, Result};
pub use modeline::{Modeline, WindowStatus};
pub use pane::{BufferId, BufferView, Domain, Pane};
pub use snapshot::{BufferSnapshot, LayoutSnapshot, NodeSnapshot};
pub use stack::{BufferStack, Host};
pub use tree::{
    Axis, Container, Focus, LayoutTree, Leaf, Node, NodeId, Placeholder, RemovedWindow, Windows,
};
