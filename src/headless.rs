//! An in-memory [`Surface`]: no drawing, just bookkeeping.
//!
//! Useful for tests, demos and as the state holder behind a terminal UI. Layout is simulated:
//! the host says how tall a row *would* be with [`HeadlessSurface::set_layout_height`], and
//! [`HeadlessSurface::take_size_reports`] plays the part of a size observer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{Frame, GridState, NodeId, SizeReport, Surface, ViewportState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessNode<V> {
    /// Index last populated into this node.
    pub index: Option<usize>,
    pub view: Option<V>,
    pub attached: bool,
    pub populate_count: u32,
}

#[derive(Clone, Debug)]
pub struct HeadlessSurface<V = String> {
    connected: bool,
    scroll_top: u64,
    container_height: u32,
    clock_ms: f64,
    commit_cost_ms: f64,

    nodes: BTreeMap<NodeId, HeadlessNode<V>>,
    frame: Frame,
    commits: usize,
    grid: GridState,
    focused: Option<NodeId>,
    announcements: Vec<String>,

    size_observer: bool,
    observer_connected: bool,
    observed: BTreeMap<NodeId, usize>,
    layout_heights: HashMap<usize, u32>,
    default_layout_height: Option<u32>,
    unmeasurable: BTreeSet<usize>,
}

impl<V> HeadlessSurface<V> {
    pub fn new(container_height: u32) -> Self {
        Self {
            connected: true,
            scroll_top: 0,
            container_height,
            clock_ms: 0.0,
            commit_cost_ms: 0.0,
            nodes: BTreeMap::new(),
            frame: Frame::default(),
            commits: 0,
            grid: GridState::default(),
            focused: None,
            announcements: Vec::new(),
            size_observer: true,
            observer_connected: true,
            observed: BTreeMap::new(),
            layout_heights: HashMap::new(),
            default_layout_height: None,
            unmeasurable: BTreeSet::new(),
        }
    }

    /// A surface whose container is missing; construction against it fails.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new(0)
        }
    }

    /// Simulates a host without asynchronous size observation.
    pub fn without_size_observer(mut self) -> Self {
        self.size_observer = false;
        self
    }

    pub fn with_scroll_top(mut self, scroll_top: u64) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Rows without an explicit layout height measure as `height`.
    pub fn with_default_layout_height(mut self, height: u32) -> Self {
        self.default_layout_height = Some(height);
        self
    }

    /// Every commit advances the clock by `ms`, standing in for layout and paint time.
    pub fn with_commit_cost_ms(mut self, ms: f64) -> Self {
        self.commit_cost_ms = ms;
        self
    }

    /// User scroll. Follow with [`crate::VirtualList::on_scroll`].
    pub fn scroll_to(&mut self, scroll_top: u64) {
        self.scroll_top = scroll_top;
    }

    /// Container resize. Follow with [`crate::VirtualList::on_resize`].
    pub fn resize(&mut self, container_height: u32) {
        self.container_height = container_height;
    }

    pub fn advance_clock(&mut self, ms: f64) {
        self.clock_ms += ms;
    }

    pub fn set_layout_height(&mut self, index: usize, height: u32) {
        self.layout_heights.insert(index, height);
    }

    /// Makes synchronous measurement of `index` fail.
    pub fn set_unmeasurable(&mut self, index: usize) {
        self.unmeasurable.insert(index);
    }

    /// What a size observer would report right now for every observed, attached node with a
    /// known layout height.
    pub fn take_size_reports(&self) -> Vec<SizeReport> {
        if !self.observer_connected {
            return Vec::new();
        }
        self.observed
            .iter()
            .filter(|(node, _)| self.nodes.get(node).is_some_and(|n| n.attached))
            .filter_map(|(&node, &index)| {
                let height = self.layout_height(index)?;
                Some(SizeReport {
                    index,
                    node,
                    height,
                })
            })
            .collect()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn grid(&self) -> GridState {
        self.grid
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn node(&self, node: NodeId) -> Option<&HeadlessNode<V>> {
        self.nodes.get(&node)
    }

    /// Nodes that exist (attached or parked), i.e. not destroyed.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn attached_count(&self) -> usize {
        self.nodes.values().filter(|n| n.attached).count()
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    pub fn is_observer_connected(&self) -> bool {
        self.observer_connected
    }

    /// The view shown for `index` in the last committed frame.
    pub fn view_at(&self, index: usize) -> Option<&V> {
        let row = self.frame.rows.iter().find(|r| r.index == index)?;
        self.nodes.get(&row.node?)?.view.as_ref()
    }

    fn layout_height(&self, index: usize) -> Option<u32> {
        self.layout_heights
            .get(&index)
            .copied()
            .or(self.default_layout_height)
    }
}

impl<V> Surface for HeadlessSurface<V> {
    type View = V;

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn viewport(&self) -> ViewportState {
        ViewportState::new(self.scroll_top, self.container_height)
    }

    fn set_scroll_top(&mut self, scroll_top: u64) {
        self.scroll_top = scroll_top;
    }

    fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    fn create_node(&mut self, node: NodeId) {
        self.nodes.insert(
            node,
            HeadlessNode {
                index: None,
                view: None,
                attached: false,
                populate_count: 0,
            },
        );
    }

    fn populate(&mut self, node: NodeId, index: usize, view: V) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.index = Some(index);
            n.view = Some(view);
            n.attached = true;
            n.populate_count += 1;
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attached = false;
        }
        if self.focused == Some(node) {
            self.focused = None;
        }
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
        self.observed.remove(&node);
    }

    fn commit(&mut self, frame: &Frame) {
        self.frame = frame.clone();
        self.commits += 1;
        self.clock_ms += self.commit_cost_ms;
    }

    fn set_grid(&mut self, grid: GridState) {
        self.grid = grid;
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn announce(&mut self, message: &str) {
        self.announcements.push(message.to_owned());
    }

    fn supports_size_observer(&self) -> bool {
        self.size_observer
    }

    fn observe(&mut self, node: NodeId, index: usize) {
        if self.observer_connected {
            self.observed.insert(node, index);
        }
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }

    fn disconnect_observer(&mut self) {
        self.observed.clear();
        self.observer_connected = false;
    }

    fn measure(&mut self, node: NodeId) -> Option<u32> {
        let index = self.nodes.get(&node)?.index?;
        if self.unmeasurable.contains(&index) {
            return None;
        }
        self.layout_height(index)
    }
}
