#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// A contiguous index range `[start_index, end_index)`.
///
/// Used both for the render window (overscan included) and for the visible range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl RenderWindow {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    pub fn indexes(&self) -> core::ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// Snapshot of the scroll container, re-read on every evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub scroll_top: u64,
    pub container_height: u32,
}

impl ViewportState {
    pub fn new(scroll_top: u64, container_height: u32) -> Self {
        Self {
            scroll_top,
            container_height,
        }
    }

    pub fn bottom(&self) -> u64 {
        self.scroll_top.saturating_add(self.container_height as u64)
    }
}

/// Handle for a visual node. Issued by the engine, backed by whatever the [`crate::Surface`] uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

/// Outcome of the most recent window evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Evaluation {
    /// Same window and nothing pending: no render pass.
    Unchanged,
    Rendered,
}

/// Where the event coordinator currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Phase {
    #[default]
    Idle,
    Evaluating,
    Rendering,
}
