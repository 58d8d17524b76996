// ABOUTME: Layout root that owns the window tree and the buffer registry.
// ABOUTME: Tracks the active window and forwards activation to the host application.

use tb_core::Config;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::error::{LayoutError, Result};
use crate::modeline::{Modeline, WindowStatus};
use crate::pane::{BufferId, Domain, Pane};
use crate::tree::{Axis, Focus, LayoutTree, NodeId, RemovedWindow, Windows};

/// The application hosting the layout
pub trait Host {
    /// Switch the application to the domain of the newly active buffer
    fn change_domain(&mut self, domain: &Domain);

    /// Status text for the active buffer; `None` when the active window is empty
    fn active_buffer_name_changed(&mut self, _name: Option<&str>) {}

    /// Status line for a newly created window
    fn new_modeline(&mut self) -> Box<dyn Modeline>;
}

/// Root of the layout: the window tree, the buffers it can show, and which
/// window is active.
pub struct BufferStack<H: Host> {
    tree: LayoutTree,
    buffers: Vec<Pane>,
    current_window: Option<NodeId>,
    focus: Option<Focus>,
    host: H,
}

impl<H: Host> BufferStack<H> {
    pub fn new(mut host: H, config: &Config) -> Self {
        let tree = LayoutTree::new(
            config.layout.initial_windows,
            config.placeholder_text.as_str(),
            || host.new_modeline(),
        );
        let mut stack = Self {
            tree,
            buffers: Vec::new(),
            current_window: None,
            focus: None,
            host,
        };
        stack.refresh_all_modelines();
        debug!("Layout created with {} windows", stack.window_count());
        stack
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn buffers(&self) -> &[Pane] {
        &self.buffers
    }

    pub fn buffer(&self, id: BufferId) -> Result<&Pane> {
        self.buffers.get(id.0).ok_or(LayoutError::UnknownBuffer(id))
    }

    fn buffer_mut(&mut self, id: BufferId) -> Result<&mut Pane> {
        self.buffers.get_mut(id.0).ok_or(LayoutError::UnknownBuffer(id))
    }

    pub fn buffer_id(&self, name: &str) -> Option<BufferId> {
        self.buffers
            .iter()
            .position(|pane| pane.name() == name)
            .map(BufferId)
    }

    pub fn buffer_by_name(&self, name: &str) -> Option<&Pane> {
        self.buffers.iter().find(|pane| pane.name() == name)
    }

    /// Register a buffer and show it in the first empty window, if there is one
    pub fn add_buffer(&mut self, pane: Pane) -> Result<BufferId> {
        if self.buffer_id(pane.name()).is_some() {
            warn!("Buffer {:?} is already registered", pane.name());
            return Err(LayoutError::DuplicateBuffer(pane.name().to_string()));
        }

        let id = BufferId(self.buffers.len());
        debug!("Registered buffer {:?} as {:?}", pane.name(), id);
        self.buffers.push(pane);

        match self.tree.first_empty_window() {
            Some(window) => self.place_in_window(window, Some(id))?,
            None => debug!("No empty window for {:?}, leaving it unplaced", id),
        }
        Ok(id)
    }

    /// Show `buffer` (or the placeholder) in the window at `address` and activate it
    pub fn place_buffer(&mut self, buffer: Option<BufferId>, address: &Address) -> Result<NodeId> {
        let window = self.tree.resolve_window(address)?;
        self.place_in_window(window, buffer)?;
        Ok(window)
    }

    /// Swap the content of `window` and activate it.
    ///
    /// A buffer already shown by another window moves here; that window falls
    /// back to its placeholder.
    pub fn place_in_window(&mut self, window: NodeId, buffer: Option<BufferId>) -> Result<()> {
        self.tree.leaf(window)?;
        if let Some(id) = buffer {
            let shown_in = self.buffer(id)?.window();
            if let Some(other) = shown_in.filter(|&other| other != window) {
                self.tree.leaf_mut(other)?.attach(None);
                self.buffer_mut(id)?.hide();
                self.refresh_modeline(other)?;
            }
        }

        let previous = self.tree.leaf_mut(window)?.attach(buffer);
        if let Some(previous) = previous.filter(|&previous| Some(previous) != buffer) {
            self.buffer_mut(previous)?.hide();
        }
        if let Some(id) = buffer {
            self.buffer_mut(id)?.show(window);
        }
        debug!("Window {:?} now shows {:?}", window, buffer);

        self.activate(window)
    }

    pub fn activate_window(&mut self, address: &Address) -> Result<NodeId> {
        let window = self.tree.resolve_window(address)?;
        self.activate(window)?;
        Ok(window)
    }

    /// Give `window` input focus and make it the current window.
    ///
    /// An empty window focuses its placeholder.
    pub fn activate(&mut self, window: NodeId) -> Result<()> {
        match self.tree.leaf(window)?.buffer() {
            Some(id) => {
                self.buffer_mut(id)?.activate();
                self.focus = Some(Focus::Buffer(id));
            }
            None => self.focus = Some(Focus::Placeholder(window)),
        }
        self.window_activated(window)?;
        self.refresh_modeline(window)
    }

    pub fn deactivate(&mut self, window: NodeId) -> Result<()> {
        if let Some(id) = self.tree.leaf(window)?.buffer() {
            self.buffer_mut(id)?.deactivate();
        }
        self.refresh_modeline(window)
    }

    /// Record `window` as current, deactivating the previous one before the
    /// host hears about the new domain.
    pub fn window_activated(&mut self, window: NodeId) -> Result<()> {
        let buffer = self.tree.leaf(window)?.buffer();

        let last = self.current_window.replace(window);
        if let Some(last) = last.filter(|&last| last != window) {
            if self.tree.contains(last) {
                self.deactivate(last)?;
            }
        }

        let name = match buffer {
            Some(id) => {
                let pane = self.buffers.get(id.0).ok_or(LayoutError::UnknownBuffer(id))?;
                info!("Window {:?} active, domain {}", window, pane.domain());
                self.host.change_domain(pane.domain());
                Some(pane.name())
            }
            None => {
                info!("Window {:?} active, no buffer", window);
                None
            }
        };
        self.host.active_buffer_name_changed(name);
        Ok(())
    }

    /// Split `window` through its parent container; returns the new empty window
    pub fn split(&mut self, window: NodeId, axis: Axis) -> Result<NodeId> {
        let host = &mut self.host;
        let new_window = self
            .tree
            .split(window, axis, || host.new_modeline())
            .inspect_err(|err| warn!("Split of {:?} refused: {}", window, err))?;
        self.refresh_all_modelines();
        Ok(new_window)
    }

    pub fn split_at(&mut self, address: &Address, axis: Axis) -> Result<NodeId> {
        let window = self.tree.resolve_window(address)?;
        self.split(window, axis)
    }

    /// Insert a new empty window at `position` in `container`
    pub fn insert_child(&mut self, container: NodeId, position: usize) -> Result<NodeId> {
        let modeline = self.host.new_modeline();
        let window = self.tree.insert_child(container, position, modeline)?;
        self.refresh_all_modelines();
        Ok(window)
    }

    /// Nest `node` in a new single-child container; see `LayoutTree::wrap`
    pub fn wrap(&mut self, node: NodeId) -> Result<NodeId> {
        let container = self.tree.wrap(node)?;
        self.refresh_all_modelines();
        Ok(container)
    }

    pub fn remove_window(&mut self, window: NodeId) -> Result<()> {
        let parent = self.tree.leaf(window)?.parent();
        self.remove_child(parent, window)
    }

    /// Remove `child` from `container`.
    ///
    /// Afterwards no window is current; the caller activates one explicitly.
    pub fn remove_child(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        let removed = self.tree.remove_child(container, child)?;
        for RemovedWindow { id, buffer } in removed {
            if let Some(buffer) = buffer {
                self.buffer_mut(buffer)?.hide();
                if self.focus == Some(Focus::Buffer(buffer)) {
                    self.focus = None;
                }
            }
            if self.focus == Some(Focus::Placeholder(id)) {
                self.focus = None;
            }
        }

        self.current_window = None;
        self.refresh_all_modelines();
        info!("Removed {:?}, no active window", child);
        Ok(())
    }

    /// Show the next registered buffer in the current window, wrapping around
    pub fn next_buffer(&mut self) -> Result<Option<BufferId>> {
        let Some(window) = self.current_window else {
            return Ok(None);
        };
        if self.buffers.is_empty() {
            return Ok(None);
        }

        let next = match self.tree.leaf(window)?.buffer() {
            Some(BufferId(i)) => BufferId((i + 1) % self.buffers.len()),
            None => BufferId(0),
        };
        self.place_in_window(window, Some(next))?;
        Ok(Some(next))
    }

    /// The toolkit moved input focus without going through `activate`
    pub fn focus_changed(&mut self, focus: Option<Focus>) {
        debug!("Focus moved to {:?}", focus);
        self.focus = focus;
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Window whose content owns input focus, found by scanning the tree
    pub fn active_window(&self) -> Option<NodeId> {
        self.tree.current(self.tree.root(), self.focus)
    }

    /// Window recorded by the last activation
    pub fn current_window(&self) -> Option<NodeId> {
        self.current_window
    }

    pub fn is_active(&self, window: NodeId) -> bool {
        self.current_window == Some(window)
    }

    /// Buffer shown by the current window
    pub fn active_buffer(&self) -> Option<&Pane> {
        let window = self.current_window?;
        let id = self.tree.leaf(window).ok()?.buffer()?;
        self.buffers.get(id.0)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.active_buffer().map(Pane::name)
    }

    pub fn windows(&self) -> Windows<'_> {
        self.tree.windows()
    }

    pub fn window_count(&self) -> usize {
        self.tree.windows().count()
    }

    pub fn address(&self, node: NodeId) -> Result<Address> {
        self.tree.address(node)
    }

    pub fn win_id(&self, node: NodeId) -> Result<usize> {
        self.tree.win_id(node)
    }

    pub fn status(&self, window: NodeId) -> Result<WindowStatus> {
        let buffer = match self.tree.leaf(window)?.buffer() {
            Some(id) => Some(self.buffer(id)?.name().to_string()),
            None => None,
        };
        Ok(WindowStatus {
            win_id: self.tree.win_id(window)?,
            address: self.tree.address(window)?,
            buffer,
            active: self.is_active(window),
        })
    }

    fn refresh_modeline(&mut self, window: NodeId) -> Result<()> {
        let status = self.status(window)?;
        self.tree.leaf_mut(window)?.update_modeline(&status);
        Ok(())
    }

    /// Window numbers and addresses shift after structural changes
    fn refresh_all_modelines(&mut self) {
        let windows: Vec<NodeId> = self.tree.windows().collect();
        for window in windows {
            if let Err(err) = self.refresh_modeline(window) {
                warn!("Could not refresh modeline of {:?}: {}", window, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::BufferView;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Focus(String),
        Deactivate(String),
        Domain(String),
        Name(Option<String>),
        Modeline(usize, Option<String>, bool),
        Released,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct View {
        name: String,
        log: Log,
    }

    impl BufferView for View {
        fn focus(&mut self) {
            self.log.borrow_mut().push(Event::Focus(self.name.clone()));
        }

        fn deactivate(&mut self) {
            self.log.borrow_mut().push(Event::Deactivate(self.name.clone()));
        }
    }

    struct RecordingModeline(Log);

    impl Modeline for RecordingModeline {
        fn update(&mut self, status: &WindowStatus) {
            self.0.borrow_mut().push(Event::Modeline(
                status.win_id,
                status.buffer.clone(),
                status.active,
            ));
        }

        fn release(&mut self) {
            self.0.borrow_mut().push(Event::Released);
        }
    }

    struct TestHost(Log);

    impl Host for TestHost {
        fn change_domain(&mut self, domain: &Domain) {
            self.0.borrow_mut().push(Event::Domain(domain.to_string()));
        }

        fn active_buffer_name_changed(&mut self, name: Option<&str>) {
            self.0.borrow_mut().push(Event::Name(name.map(str::to_string)));
        }

        fn new_modeline(&mut self) -> Box<dyn Modeline> {
            Box::new(RecordingModeline(Rc::clone(&self.0)))
        }
    }

    fn stack(initial_windows: usize) -> (BufferStack<TestHost>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut config = Config::default();
        config.layout.initial_windows = initial_windows;
        let stack = BufferStack::new(TestHost(Rc::clone(&log)), &config);
        log.borrow_mut().clear();
        (stack, log)
    }

    fn pane(name: &str, domain: &str, log: &Log) -> Pane {
        Pane::new(
            name,
            Domain::new(domain),
            Box::new(View {
                name: name.to_string(),
                log: Rc::clone(log),
            }),
        )
    }

    fn position(log: &Log, event: &Event) -> usize {
        log.borrow()
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("{:?} not logged", event))
    }

    fn focused_windows(stack: &BufferStack<TestHost>) -> usize {
        stack
            .windows()
            .filter(|&id| stack.tree().current(id, stack.focus()).is_some())
            .count()
    }

    #[test]
    fn add_buffer_fills_empty_window() {
        let (mut stack, log) = stack(1);
        let window = stack.windows().next().unwrap();

        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();

        assert_eq!(stack.tree().leaf(window).unwrap().buffer(), Some(a));
        assert_eq!(stack.buffer(a).unwrap().window(), Some(window));
        assert_eq!(stack.current_window(), Some(window));
        assert_eq!(stack.active_window(), Some(window));
        assert_eq!(stack.current_name(), Some("A"));
        assert!(log.borrow().contains(&Event::Focus("A".into())));
        assert!(log.borrow().contains(&Event::Domain("text".into())));
        assert!(log.borrow().contains(&Event::Name(Some("A".into()))));
    }

    #[test]
    fn add_buffer_without_empty_window_leaves_it_unplaced() {
        let (mut stack, log) = stack(1);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        let b = stack.add_buffer(pane("B", "wave", &log)).unwrap();

        let registered = stack.buffer_by_name("B").unwrap();
        assert_eq!(registered.name(), "B");
        assert!(!registered.visible());
        assert!(stack
            .windows()
            .all(|id| stack.tree().leaf(id).unwrap().buffer() != Some(b)));
        assert_eq!(stack.active_buffer().map(Pane::name), Some("A"));
        assert_eq!(stack.buffer_id("A"), Some(a));
        assert!(stack.buffer_by_name("C").is_none());
    }

    #[test]
    fn duplicate_names_are_refused() {
        let (mut stack, log) = stack(1);
        stack.add_buffer(pane("A", "text", &log)).unwrap();
        assert_eq!(
            stack.add_buffer(pane("A", "wave", &log)).unwrap_err(),
            LayoutError::DuplicateBuffer("A".into())
        );
        assert_eq!(stack.buffers().len(), 1);
    }

    #[test]
    fn previous_window_deactivates_before_domain_switch() {
        let (mut stack, log) = stack(2);
        stack.add_buffer(pane("A", "text", &log)).unwrap();
        stack.add_buffer(pane("B", "wave", &log)).unwrap();

        let deactivated = position(&log, &Event::Deactivate("A".into()));
        let switched = position(&log, &Event::Domain("wave".into()));
        assert!(deactivated < switched);
        assert_eq!(stack.current_name(), Some("B"));
        assert_eq!(focused_windows(&stack), 1);
    }

    #[test]
    fn reactivating_same_window_does_not_deactivate_it() {
        let (mut stack, log) = stack(1);
        stack.add_buffer(pane("A", "text", &log)).unwrap();
        log.borrow_mut().clear();

        stack.activate_window(&Address::from([0])).unwrap();
        assert!(!log.borrow().contains(&Event::Deactivate("A".into())));
        assert!(log.borrow().contains(&Event::Domain("text".into())));
    }

    #[test]
    fn place_buffer_activates_target() {
        let (mut stack, log) = stack(2);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        let b = stack.add_buffer(pane("B", "wave", &log)).unwrap();

        let window = stack.place_buffer(Some(a), &Address::from([1])).unwrap();
        assert_eq!(window, stack.tree().resolve(&Address::from([1])).unwrap());
        assert_eq!(stack.current_window(), Some(window));
        assert_eq!(stack.tree().leaf(window).unwrap().buffer(), Some(a));
        // B was shown there and is now detached
        assert!(!stack.buffer(b).unwrap().visible());
    }

    #[test]
    fn placing_shown_buffer_moves_it() {
        let (mut stack, log) = stack(2);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        let first = stack.tree().resolve(&Address::from([0])).unwrap();

        let second = stack.place_buffer(Some(a), &Address::from([1])).unwrap();

        let old = stack.tree().leaf(first).unwrap();
        assert_eq!(old.buffer(), None);
        assert!(old.placeholder().visible());
        assert_eq!(stack.buffer(a).unwrap().window(), Some(second));
        assert_eq!(stack.tree().window_showing(a), Some(second));
    }

    #[test]
    fn place_buffer_rejects_bad_address() {
        let (mut stack, log) = stack(1);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();

        let address = Address::from([3]);
        assert_eq!(
            stack.place_buffer(Some(a), &address).unwrap_err(),
            LayoutError::InvalidAddress(address)
        );
        assert_eq!(
            stack.place_buffer(Some(a), &Address::root()).unwrap_err(),
            LayoutError::NotAWindow(Address::root())
        );
        assert_eq!(
            stack.place_buffer(Some(BufferId(9)), &Address::from([0])).unwrap_err(),
            LayoutError::UnknownBuffer(BufferId(9))
        );
    }

    #[test]
    fn clearing_a_window_shows_placeholder_and_focuses_it() {
        let (mut stack, log) = stack(1);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        log.borrow_mut().clear();

        let window = stack.place_buffer(None, &Address::from([0])).unwrap();
        assert!(!stack.buffer(a).unwrap().visible());
        assert_eq!(stack.focus(), Some(Focus::Placeholder(window)));
        assert_eq!(stack.active_window(), Some(window));
        assert_eq!(stack.current_name(), None);
        assert!(log.borrow().contains(&Event::Name(None)));
        assert!(!log.borrow().iter().any(|e| matches!(e, Event::Domain(_))));
    }

    #[test]
    fn split_refreshes_new_modeline() {
        let (mut stack, log) = stack(1);
        let first = stack.windows().next().unwrap();

        let second = stack.split(first, Axis::Horizontal).unwrap();
        assert_eq!(stack.win_id(second).unwrap(), 2);
        assert!(log.borrow().contains(&Event::Modeline(2, None, false)));
    }

    #[test]
    fn inserted_window_gets_modeline_update() {
        let (mut stack, log) = stack(2);
        let root = stack.tree().root();
        log.borrow_mut().clear();

        let front = stack.insert_child(root, 0).unwrap();
        assert_eq!(stack.win_id(front).unwrap(), 1);
        assert_eq!(stack.window_count(), 3);
        assert!(log.borrow().contains(&Event::Modeline(1, None, false)));
        assert!(log.borrow().contains(&Event::Modeline(3, None, false)));

        assert!(matches!(
            stack.insert_child(root, 7),
            Err(LayoutError::InvalidAddress(_))
        ));
        assert_eq!(stack.window_count(), 3);
    }

    #[test]
    fn rejected_split_leaves_tree_alone() {
        let (mut stack, _log) = stack(2);
        let err = stack.split_at(&Address::from([0]), Axis::Vertical).unwrap_err();

        assert!(matches!(err, LayoutError::SplitRejected { .. }));
        assert_eq!(stack.window_count(), 2);
    }

    #[test]
    fn wrap_then_vertical_split_nests() {
        let (mut stack, _log) = stack(2);
        let first = stack.tree().resolve(&Address::from([0])).unwrap();

        let wrapper = stack.wrap(first).unwrap();
        let below = stack.split(first, Axis::Vertical).unwrap();

        assert_eq!(stack.tree().container(wrapper).unwrap().axis(), Axis::Vertical);
        assert_eq!(stack.address(below).unwrap(), Address::from([0, 1]));
        assert_eq!(stack.win_id(below).unwrap(), 2);
        assert_eq!(stack.window_count(), 3);
    }

    #[test]
    fn removal_clears_active_window() {
        let (mut stack, log) = stack(1);
        let first = stack.windows().next().unwrap();
        let second = stack.split(first, Axis::Horizontal).unwrap();
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        let b = stack.add_buffer(pane("B", "wave", &log)).unwrap();
        assert_eq!(stack.current_window(), Some(second));

        stack.remove_child(stack.tree().root(), second).unwrap();

        assert_eq!(stack.current_window(), None);
        assert_eq!(stack.active_window(), None);
        assert_eq!(stack.window_count(), 1);
        assert!(!stack.buffer(b).unwrap().visible());
        assert!(stack.buffer(a).unwrap().visible());
        assert!(log.borrow().contains(&Event::Released));

        stack.activate_window(&Address::from([0])).unwrap();
        assert_eq!(stack.current_window(), Some(first));
        assert_eq!(stack.active_window(), Some(first));
    }

    #[test]
    fn last_window_stays() {
        let (mut stack, _log) = stack(1);
        let only = stack.windows().next().unwrap();
        assert_eq!(stack.remove_window(only).unwrap_err(), LayoutError::LastWindow);
        assert_eq!(stack.window_count(), 1);
    }

    #[test]
    fn next_buffer_cycles_in_registry_order() {
        let (mut stack, log) = stack(1);
        let a = stack.add_buffer(pane("A", "text", &log)).unwrap();
        let b = stack.add_buffer(pane("B", "wave", &log)).unwrap();

        assert_eq!(stack.next_buffer().unwrap(), Some(b));
        assert_eq!(stack.current_name(), Some("B"));
        assert!(!stack.buffer(a).unwrap().visible());

        assert_eq!(stack.next_buffer().unwrap(), Some(a));
        assert_eq!(stack.current_name(), Some("A"));
    }

    #[test]
    fn next_buffer_without_current_window_is_noop() {
        let (mut stack, log) = stack(1);
        assert_eq!(stack.next_buffer().unwrap(), None);
        stack.buffers.push(pane("A", "text", &log));
        assert_eq!(stack.next_buffer().unwrap(), None);
    }

    #[test]
    fn focus_moves_without_activation() {
        let (mut stack, log) = stack(2);
        stack.add_buffer(pane("A", "text", &log)).unwrap();
        let first = stack.current_window().unwrap();
        let second = stack.tree().resolve(&Address::from([1])).unwrap();

        stack.focus_changed(Some(Focus::Placeholder(second)));
        assert_eq!(stack.active_window(), Some(second));
        assert_eq!(stack.current_window(), Some(first));
        assert!(stack.is_active(first));
        assert!(!stack.is_active(second));
        assert_eq!(focused_windows(&stack), 1);

        stack.focus_changed(None);
        assert_eq!(stack.active_window(), None);
    }

    #[test]
    fn status_reports_window_state() {
        let (mut stack, log) = stack(2);
        stack.add_buffer(pane("A", "text", &log)).unwrap();
        let first = stack.tree().resolve(&Address::from([0])).unwrap();
        let second = stack.tree().resolve(&Address::from([1])).unwrap();

        let status = stack.status(first).unwrap();
        assert_eq!(status.win_id, 1);
        assert_eq!(status.address, Address::from([0]));
        assert_eq!(status.buffer.as_deref(), Some("A"));
        assert!(status.active);

        let status = stack.status(second).unwrap();
        assert_eq!(status.buffer, None);
        assert!(!status.active);
    }
}
