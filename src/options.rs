use crate::ConfigError;

/// Configuration for [`crate::VirtualList`].
///
/// Plain data: the data source and item template are passed separately as an
/// [`crate::ItemSource`], so options can be cloned, compared and (with `feature = "serde"`)
/// persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VirtualListOptions {
    /// Row height in fixed mode.
    pub item_height: u32,
    /// Height assumed for rows that have not been measured yet (variable mode).
    pub estimated_item_height: u32,
    /// Measure rendered rows and feed their heights back into layout.
    pub variable_height: bool,
    /// Extra rows rendered above and below the visible range.
    pub overscan: usize,
    pub total_items: usize,

    /// Trailing-edge throttle for scroll evaluations.
    pub throttle_scroll_delay_ms: u64,
    /// Trailing-edge debounce for resize evaluations.
    pub resize_debounce_ms: u64,

    pub enable_keyboard_navigation: bool,
    /// Announce "Showing items X to Y of Z" through the live region after renders.
    pub announce_changes: bool,

    /// Measurements within this many pixels of the recorded height are ignored.
    pub measure_epsilon: u32,
    /// Shift `scroll_top` when a row above it changes height, so visible content stays put.
    pub adjust_scroll_on_measure: bool,
    /// How many released nodes are kept around for reuse.
    pub node_pool_limit: usize,
}

impl Default for VirtualListOptions {
    fn default() -> Self {
        Self {
            item_height: 50,
            estimated_item_height: 50,
            variable_height: false,
            overscan: 5,
            total_items: 0,
            throttle_scroll_delay_ms: 16,
            resize_debounce_ms: 100,
            enable_keyboard_navigation: true,
            announce_changes: true,
            measure_epsilon: 1,
            adjust_scroll_on_measure: true,
            node_pool_limit: 64,
        }
    }
}

impl VirtualListOptions {
    /// Every row is exactly `item_height` tall.
    pub fn fixed(total_items: usize, item_height: u32) -> Self {
        Self {
            item_height,
            estimated_item_height: item_height,
            total_items,
            ..Self::default()
        }
    }

    /// Rows start at `estimated_item_height` and are corrected once measured.
    pub fn variable(total_items: usize, estimated_item_height: u32) -> Self {
        Self {
            item_height: estimated_item_height,
            estimated_item_height,
            variable_height: true,
            total_items,
            ..Self::default()
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_total_items(mut self, total_items: usize) -> Self {
        self.total_items = total_items;
        self
    }

    pub fn with_throttle_scroll_delay_ms(mut self, delay_ms: u64) -> Self {
        self.throttle_scroll_delay_ms = delay_ms;
        self
    }

    pub fn with_resize_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.resize_debounce_ms = delay_ms;
        self
    }

    pub fn with_keyboard_navigation(mut self, enabled: bool) -> Self {
        self.enable_keyboard_navigation = enabled;
        self
    }

    pub fn with_announce_changes(mut self, enabled: bool) -> Self {
        self.announce_changes = enabled;
        self
    }

    pub fn with_measure_epsilon(mut self, epsilon: u32) -> Self {
        self.measure_epsilon = epsilon;
        self
    }

    pub fn with_adjust_scroll_on_measure(mut self, enabled: bool) -> Self {
        self.adjust_scroll_on_measure = enabled;
        self
    }

    pub fn with_node_pool_limit(mut self, limit: usize) -> Self {
        self.node_pool_limit = limit;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.variable_height {
            if self.estimated_item_height == 0 {
                return Err(ConfigError::ZeroEstimatedHeight);
            }
        } else if self.item_height == 0 {
            return Err(ConfigError::ZeroItemHeight);
        }
        Ok(())
    }
}
