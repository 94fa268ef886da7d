use crate::{NodeId, ViewportState};

/// Roving tabindex value of a rendered row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TabIndex {
    /// `tabindex="0"`: the row keyboard focus enters on.
    Focusable,
    /// `tabindex="-1"`.
    Skipped,
}

impl TabIndex {
    pub fn value(self) -> i8 {
        match self {
            Self::Focusable => 0,
            Self::Skipped => -1,
        }
    }
}

/// One slot of the render window, in index order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRow {
    pub index: usize,
    /// `None` when the item was skipped this pass: lay out an empty placeholder of `height`.
    pub node: Option<NodeId>,
    /// Height the engine accounts for this row.
    pub height: u32,
    /// 1-based `aria-rowindex`.
    pub row_index: usize,
    pub tab_index: TabIndex,
}

/// Everything a host needs to lay out one render pass.
///
/// `top_spacer + sum(rows[..].height) + bottom_spacer == total_height`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub top_spacer: u64,
    pub bottom_spacer: u64,
    pub total_height: u64,
    pub rows: Vec<FrameRow>,
}

impl Frame {
    pub fn content_height(&self) -> u64 {
        self.rows.iter().map(|r| r.height as u64).sum()
    }
}

/// Container-level accessibility metadata (`role="grid"`, `aria-rowcount`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridState {
    pub row_count: usize,
}

/// A size-observer notification, delivered by the host through
/// [`crate::VirtualList::on_size_report`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeReport {
    pub index: usize,
    pub node: NodeId,
    pub height: u32,
}

/// The scroll container the engine renders into.
///
/// In a browser this wraps the container element, its children, a `ResizeObserver` and a
/// visually hidden live region. Node handles are issued by the engine; the surface maps them to
/// whatever it actually draws.
pub trait Surface {
    /// What [`crate::ItemSource::render_item`] produces: markup, a node, a widget tree.
    type View;

    /// Whether the container exists and can be rendered into.
    fn is_connected(&self) -> bool;

    fn viewport(&self) -> ViewportState;

    fn set_scroll_top(&mut self, scroll_top: u64);

    /// Monotonic clock in milliseconds, used for render timings.
    fn now_ms(&self) -> f64;

    fn create_node(&mut self, node: NodeId);

    /// Installs the rendered view for `index` into `node` (fresh, pooled, or invalidated).
    fn populate(&mut self, node: NodeId, index: usize, view: Self::View);

    /// Takes `node` out of the container; it may be populated again later.
    fn detach(&mut self, node: NodeId);

    /// Frees `node` for good.
    fn destroy_node(&mut self, node: NodeId);

    /// Applies spacers, row order and per-row attributes for one pass.
    fn commit(&mut self, frame: &Frame);

    fn set_grid(&mut self, grid: GridState);

    fn focus(&mut self, node: NodeId);

    /// Writes `message` to the live region.
    fn announce(&mut self, message: &str);

    /// Whether asynchronous size observation is available. When it isn't, the engine falls back
    /// to deferred [`Surface::measure`] reads.
    fn supports_size_observer(&self) -> bool {
        true
    }

    fn observe(&mut self, node: NodeId, index: usize);

    fn unobserve(&mut self, node: NodeId);

    /// Disconnects the size observer entirely.
    fn disconnect_observer(&mut self) {}

    /// Synchronous layout read. `None` if the node can't be measured right now.
    fn measure(&mut self, node: NodeId) -> Option<u32>;
}
