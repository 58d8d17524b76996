// ABOUTME: Per-window status line contract.
// ABOUTME: Each window owns one modeline and refreshes it on every state change.

use serde::Serialize;

use crate::address::Address;

/// What a window's status line is asked to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowStatus {
    /// 1-based window number in depth-first order
    pub win_id: usize,
    pub address: Address,
    /// Name of the displayed buffer, `None` while the placeholder is shown
    pub buffer: Option<String>,
    /// Whether this is the stack's current window
    pub active: bool,
}

pub trait Modeline {
    fn update(&mut self, status: &WindowStatus);

    /// Called once when the owning window is removed from the tree
    fn release(&mut self) {}
}
