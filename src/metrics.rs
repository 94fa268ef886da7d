use crate::ItemFailure;

/// Render and scroll counters. Advisory only; nothing in the engine reads them back.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Duration of the last render pass, in milliseconds of the surface clock.
    pub render_time: f64,
    pub scroll_events: u64,
    /// Live nodes after the last pass.
    pub rendered_items: usize,
    /// Rows whose existing node was kept as-is, across all passes.
    pub recycled_items: u64,
    pub viewport_start_index: usize,
    pub viewport_end_index: usize,
    pub total_height: u64,
    pub container_height: u32,

    pub render_passes: u64,
    pub created_nodes: u64,
    /// Fresh rows that took a node from the free pool instead of creating one.
    pub pooled_reuses: u64,
    /// Rows skipped because the data source had nothing for them yet.
    pub skipped_items: u64,
    pub failed_items: u64,
    pub measurements_applied: u64,
    /// Size reports dropped because their row was no longer tracked.
    pub stale_measurements: u64,
    pub last_failure: Option<ItemFailure>,
}
