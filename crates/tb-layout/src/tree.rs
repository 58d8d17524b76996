// ABOUTME: Arena-backed window tree for buffer layout.
// ABOUTME: Supports splitting, insertion, removal, addressing and focus lookup.

use serde::Serialize;
use tracing::debug;

use crate::address::Address;
use crate::error::{LayoutError, Result};
use crate::modeline::{Modeline, WindowStatus};
use crate::pane::BufferId;

/// Stable handle of a node in the tree. Slots are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Children side by side
    #[default]
    Horizontal,
    /// Children stacked top to bottom
    Vertical,
}

/// Owner of the toolkit's input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Buffer(BufferId),
    /// The stand-in widget of an empty window
    Placeholder(NodeId),
}

/// Focusable stand-in shown by a window with no buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    text: String,
    visible: bool,
}

impl Placeholder {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// Terminal node: shows one buffer or its placeholder
pub struct Leaf {
    parent: NodeId,
    buffer: Option<BufferId>,
    modeline: Box<dyn Modeline>,
    placeholder: Placeholder,
}

impl Leaf {
    fn new(parent: NodeId, placeholder_text: &str, modeline: Box<dyn Modeline>) -> Self {
        Self {
            parent,
            buffer: None,
            modeline,
            placeholder: Placeholder {
                text: placeholder_text.to_string(),
                visible: true,
            },
        }
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// Swap the displayed content, returning the buffer shown before
    pub(crate) fn attach(&mut self, buffer: Option<BufferId>) -> Option<BufferId> {
        self.placeholder.visible = buffer.is_none();
        std::mem::replace(&mut self.buffer, buffer)
    }

    pub(crate) fn update_modeline(&mut self, status: &WindowStatus) {
        self.modeline.update(status);
    }

    fn holds_focus(&self, id: NodeId, focus: Focus) -> bool {
        match (focus, self.buffer) {
            (Focus::Buffer(focused), Some(shown)) => focused == shown,
            (Focus::Placeholder(window), None) => window == id,
            _ => false,
        }
    }
}

/// Internal node: children laid out along one axis
#[derive(Debug, Clone)]
pub struct Container {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    axis: Axis,
}

impl Container {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

pub enum Node {
    Leaf(Leaf),
    Container(Container),
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(leaf) => Some(leaf.parent),
            Node::Container(container) => container.parent,
        }
    }
}

/// A window that left the tree, and the buffer it was showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedWindow {
    pub id: NodeId,
    pub buffer: Option<BufferId>,
}

/// The window tree. The root is always a container.
pub struct LayoutTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    placeholder_text: String,
}

impl LayoutTree {
    /// Create a horizontal root container holding `initial_windows` empty windows
    pub fn new(
        initial_windows: usize,
        placeholder_text: impl Into<String>,
        mut make_modeline: impl FnMut() -> Box<dyn Modeline>,
    ) -> Self {
        let root = NodeId(0);
        let mut tree = Self {
            nodes: vec![Some(Node::Container(Container {
                parent: None,
                children: Vec::new(),
                axis: Axis::Horizontal,
            }))],
            root,
            placeholder_text: placeholder_text.into(),
        };

        for _ in 0..initial_windows.max(1) {
            let leaf = Leaf::new(root, &tree.placeholder_text, make_modeline());
            let id = tree.alloc(Node::Leaf(leaf));
            if let Some(Some(Node::Container(container))) = tree.nodes.get_mut(root.0) {
                container.children.push(id);
            }
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(LayoutError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LayoutError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id), Ok(Node::Leaf(_)))
    }

    pub fn leaf(&self, id: NodeId) -> Result<&Leaf> {
        match self.node(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Container(_) => Err(LayoutError::NotALeaf(id)),
        }
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Leaf> {
        match self.node_mut(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Container(_) => Err(LayoutError::NotALeaf(id)),
        }
    }

    pub fn container(&self, id: NodeId) -> Result<&Container> {
        match self.node(id)? {
            Node::Container(container) => Ok(container),
            Node::Leaf(_) => Err(LayoutError::NotAContainer(id)),
        }
    }

    fn container_mut(&mut self, id: NodeId) -> Result<&mut Container> {
        match self.node_mut(id)? {
            Node::Container(container) => Ok(container),
            Node::Leaf(_) => Err(LayoutError::NotAContainer(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    /// Child at `index`; `-1` picks the last child
    pub fn child(&self, container: NodeId, index: isize) -> Result<NodeId> {
        let children = &self.container(container)?.children;
        let resolved = match index {
            -1 => children.len().checked_sub(1),
            i if i >= 0 => Some(i as usize),
            _ => None,
        };
        match resolved.and_then(|i| children.get(i)) {
            Some(&child) => Ok(child),
            None => Err(LayoutError::InvalidAddress(
                self.address(container)?.child(index),
            )),
        }
    }

    pub fn child_index(&self, container: NodeId, child: NodeId) -> Option<usize> {
        self.container(container)
            .ok()?
            .children
            .iter()
            .position(|&c| c == child)
    }

    /// Insert a new empty window at `position` among the container's children
    pub fn insert_child(
        &mut self,
        container: NodeId,
        position: usize,
        modeline: Box<dyn Modeline>,
    ) -> Result<NodeId> {
        let len = self.container(container)?.children.len();
        if position > len {
            return Err(LayoutError::InvalidAddress(
                self.address(container)?.child(position as isize),
            ));
        }

        let leaf = Leaf::new(container, &self.placeholder_text, modeline);
        let id = self.alloc(Node::Leaf(leaf));
        self.container_mut(container)?.children.insert(position, id);
        debug!("Inserted window {:?} at {} in {:?}", id, position, container);
        Ok(id)
    }

    /// Remove `child` and everything under it.
    ///
    /// A container left without children is removed from its own parent as
    /// well. Removing every window of the tree is refused.
    pub fn remove_child(&mut self, container: NodeId, child: NodeId) -> Result<Vec<RemovedWindow>> {
        if self.child_index(container, child).is_none() {
            return Err(LayoutError::UnknownNode(child));
        }
        if self.window_count(child)? >= self.window_count(self.root)? {
            return Err(LayoutError::LastWindow);
        }

        let (mut container, mut child) = (container, child);
        loop {
            let current = self.container(container)?;
            match current.parent {
                Some(parent) if current.children.len() == 1 => {
                    child = container;
                    container = parent;
                }
                _ => break,
            }
        }

        let index = self
            .child_index(container, child)
            .ok_or(LayoutError::UnknownNode(child))?;
        self.container_mut(container)?.children.remove(index);

        let mut removed = Vec::new();
        self.free_subtree(child, &mut removed);
        debug!(
            "Removed {:?} from {:?} ({} windows)",
            child,
            container,
            removed.len()
        );
        Ok(removed)
    }

    /// Split the container at `at_child`, placing a new window right after it.
    ///
    /// Horizontal splits always succeed. A vertical split flips a single-child
    /// horizontal container to vertical; a horizontal container with more
    /// children refuses it and stays unchanged.
    pub fn split_along(
        &mut self,
        container: NodeId,
        axis: Axis,
        at_child: NodeId,
        make_modeline: impl FnOnce() -> Box<dyn Modeline>,
    ) -> Result<NodeId> {
        let index = self
            .child_index(container, at_child)
            .ok_or(LayoutError::UnknownNode(at_child))?;

        let target = self.container_mut(container)?;
        if axis == Axis::Vertical && target.axis != Axis::Vertical {
            if target.children.len() != 1 {
                return Err(LayoutError::SplitRejected {
                    axis,
                    children: target.children.len(),
                });
            }
            target.axis = Axis::Vertical;
            debug!("Container {:?} now stacks vertically", container);
        }

        self.insert_child(container, index + 1, make_modeline())
    }

    /// Split a window through its parent; returns the new sibling
    pub fn split(
        &mut self,
        window: NodeId,
        axis: Axis,
        make_modeline: impl FnOnce() -> Box<dyn Modeline>,
    ) -> Result<NodeId> {
        let parent = self.leaf(window)?.parent;
        self.split_along(parent, axis, window, make_modeline)
    }

    /// Put `id` inside a new single-child container at the same position.
    ///
    /// The new container is horizontal until a vertical split flips it, which
    /// is how a window gets a nested, perpendicular layout.
    pub fn wrap(&mut self, id: NodeId) -> Result<NodeId> {
        let parent = self.node(id)?.parent().ok_or(LayoutError::CannotWrapRoot)?;
        let index = self
            .child_index(parent, id)
            .ok_or(LayoutError::UnknownNode(id))?;

        let wrapper = self.alloc(Node::Container(Container {
            parent: Some(parent),
            children: vec![id],
            axis: Axis::Horizontal,
        }));
        self.container_mut(parent)?.children[index] = wrapper;
        match self.node_mut(id)? {
            Node::Leaf(leaf) => leaf.parent = wrapper,
            Node::Container(container) => container.parent = Some(wrapper),
        }
        debug!("Wrapped {:?} in container {:?}", id, wrapper);
        Ok(wrapper)
    }

    /// Walk `address` down from the root. The empty address is the root.
    pub fn resolve(&self, address: &Address) -> Result<NodeId> {
        let mut node = self.root;
        for &segment in address.segments() {
            if self.is_leaf(node) {
                return Err(LayoutError::InvalidAddress(address.clone()));
            }
            node = self
                .child(node, segment)
                .map_err(|_| LayoutError::InvalidAddress(address.clone()))?;
        }
        Ok(node)
    }

    /// Like `resolve`, but the target must be a window
    pub fn resolve_window(&self, address: &Address) -> Result<NodeId> {
        let node = self.resolve(address)?;
        if self.is_leaf(node) {
            Ok(node)
        } else {
            Err(LayoutError::NotAWindow(address.clone()))
        }
    }

    pub fn address(&self, id: NodeId) -> Result<Address> {
        match self.node(id)?.parent() {
            None => Ok(Address::root()),
            Some(parent) => self.child_position(parent, id),
        }
    }

    /// The container's own address with the child's index appended
    pub fn child_position(&self, container: NodeId, child: NodeId) -> Result<Address> {
        let index = self
            .child_index(container, child)
            .ok_or(LayoutError::UnknownNode(child))?;
        Ok(self.address(container)?.child(index as isize))
    }

    /// 1-based number of the first window under `id`, in depth-first order
    pub fn win_id(&self, id: NodeId) -> Result<usize> {
        match self.node(id)?.parent() {
            None => Ok(1),
            Some(parent) => self.child_win_id(parent, id),
        }
    }

    pub fn child_win_id(&self, container: NodeId, child: NodeId) -> Result<usize> {
        let index = self
            .child_index(container, child)
            .ok_or(LayoutError::UnknownNode(child))?;
        let mut win_id = self.win_id(container)?;
        for &sibling in &self.container(container)?.children[..index] {
            win_id += self.window_count(sibling)?;
        }
        Ok(win_id)
    }

    /// Number of windows under `id`, recomputed on every call
    pub fn window_count(&self, id: NodeId) -> Result<usize> {
        match self.node(id)? {
            Node::Leaf(_) => Ok(1),
            Node::Container(container) => container
                .children
                .iter()
                .map(|&child| self.window_count(child))
                .sum(),
        }
    }

    /// All windows in depth-first order
    pub fn windows(&self) -> Windows<'_> {
        self.windows_under(self.root)
    }

    pub fn windows_under(&self, id: NodeId) -> Windows<'_> {
        Windows {
            tree: self,
            pending: vec![id],
        }
    }

    /// The window under `id` whose content owns `focus`
    pub fn current(&self, id: NodeId, focus: Option<Focus>) -> Option<NodeId> {
        let focus = focus?;
        match self.node(id).ok()? {
            Node::Leaf(leaf) => leaf.holds_focus(id, focus).then_some(id),
            Node::Container(container) => container
                .children
                .iter()
                .find_map(|&child| self.current(child, Some(focus))),
        }
    }

    /// First window (depth-first) that shows no buffer
    pub fn first_empty_window(&self) -> Option<NodeId> {
        self.windows()
            .find(|&id| matches!(self.leaf(id), Ok(leaf) if leaf.buffer.is_none()))
    }

    pub fn window_showing(&self, buffer: BufferId) -> Option<NodeId> {
        self.windows()
            .find(|&id| matches!(self.leaf(id), Ok(leaf) if leaf.buffer == Some(buffer)))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    fn free_subtree(&mut self, id: NodeId, removed: &mut Vec<RemovedWindow>) {
        match self.nodes.get_mut(id.0).and_then(Option::take) {
            Some(Node::Leaf(mut leaf)) => {
                leaf.modeline.release();
                removed.push(RemovedWindow {
                    id,
                    buffer: leaf.buffer,
                });
            }
            Some(Node::Container(container)) => {
                for child in container.children {
                    self.free_subtree(child, removed);
                }
            }
            None => {}
        }
    }
}

/// Lazy depth-first walk over the windows of a subtree
pub struct Windows<'a> {
    tree: &'a LayoutTree,
    pending: Vec<NodeId>,
}

impl Iterator for Windows<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.pending.pop() {
            match self.tree.node(id) {
                Ok(Node::Leaf(_)) => return Some(id),
                Ok(Node::Container(container)) => {
                    self.pending.extend(container.children.iter().rev());
                }
                Err(_) => {}
            }
        }
        None
    }
}
