// ABOUTME: Buffers (panes) that windows display.
// ABOUTME: Wraps a content view and records which window currently shows it.

use std::fmt;

use serde::Serialize;

use crate::tree::NodeId;

/// Registry handle of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BufferId(pub usize);

/// Application context a buffer belongs to; switched when its window activates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Domain(pub String);

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The content widget behind a buffer.
///
/// Richer buffer kinds override `deactivate` to drop transient state such as
/// an open completion popup.
pub trait BufferView {
    /// Ask the toolkit to give this view input focus
    fn focus(&mut self);

    fn deactivate(&mut self) {}

    /// Called when the view is attached to or detached from a window
    fn set_visible(&mut self, _visible: bool) {}
}

/// A named unit of content, shown by at most one window at a time
pub struct Pane {
    name: String,
    domain: Domain,
    view: Box<dyn BufferView>,
    window: Option<NodeId>,
}

impl Pane {
    pub fn new(name: impl Into<String>, domain: Domain, view: Box<dyn BufferView>) -> Self {
        Self {
            name: name.into(),
            domain,
            view,
            window: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Window currently showing this buffer
    pub fn window(&self) -> Option<NodeId> {
        self.window
    }

    pub fn visible(&self) -> bool {
        self.window.is_some()
    }

    pub fn show(&mut self, window: NodeId) {
        if self.window == Some(window) {
            return;
        }
        self.window = Some(window);
        self.view.set_visible(true);
    }

    pub fn hide(&mut self) {
        if self.window.take().is_some() {
            self.view.set_visible(false);
        }
    }

    pub fn activate(&mut self) {
        self.view.focus();
    }

    pub fn deactivate(&mut self) {
        self.view.deactivate();
    }
}

impl fmt::Debug for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pane")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("window", &self.window)
            .finish()
    }
}
