// ABOUTME: Serializable view of the whole layout.
// ABOUTME: Used by frontends to print or inspect the tree; never read back.

use serde::Serialize;

use crate::address::Address;
use crate::error::Result;
use crate::modeline::WindowStatus;
use crate::pane::Domain;
use crate::stack::{BufferStack, Host};
use crate::tree::{Axis, Node, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Window(WindowStatus),
    Container {
        address: Address,
        axis: Axis,
        children: Vec<NodeSnapshot>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSnapshot {
    pub name: String,
    pub domain: Domain,
    /// Address of the window showing it, if any
    pub window: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSnapshot {
    pub root: NodeSnapshot,
    pub window_count: usize,
    /// Address of the current window
    pub current: Option<Address>,
    pub buffers: Vec<BufferSnapshot>,
}

impl<H: Host> BufferStack<H> {
    pub fn snapshot(&self) -> Result<LayoutSnapshot> {
        let current = match self.current_window() {
            Some(window) => Some(self.address(window)?),
            None => None,
        };

        let mut buffers = Vec::with_capacity(self.buffers().len());
        for pane in self.buffers() {
            let window = match pane.window() {
                Some(window) => Some(self.address(window)?),
                None => None,
            };
            buffers.push(BufferSnapshot {
                name: pane.name().to_string(),
                domain: pane.domain().clone(),
                window,
            });
        }

        Ok(LayoutSnapshot {
            root: self.node_snapshot(self.tree().root())?,
            window_count: self.window_count(),
            current,
            buffers,
        })
    }

    fn node_snapshot(&self, id: NodeId) -> Result<NodeSnapshot> {
        match self.tree().node(id)? {
            Node::Leaf(_) => Ok(NodeSnapshot::Window(self.status(id)?)),
            Node::Container(container) => Ok(NodeSnapshot::Container {
                address: self.address(id)?,
                axis: container.axis(),
                children: container
                    .children()
                    .iter()
                    .map(|&child| self.node_snapshot(child))
                    .collect::<Result<_>>()?,
            }),
        }
    }
}
