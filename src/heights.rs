use crate::fenwick::Fenwick;

/// Per-row heights and the derived scroll height.
///
/// Fixed mode is pure arithmetic. Variable mode keeps one record per row (estimated until
/// measured) and a Fenwick tree of the same heights, so `offset_of` and `total_height` never
/// rescan from row 0.
#[derive(Clone, Debug)]
pub(crate) struct HeightStore {
    count: usize,
    layout: Layout,
    epsilon: u32,
}

#[derive(Clone, Debug)]
enum Layout {
    Fixed {
        item_height: u32,
    },
    Variable {
        estimate: u32,
        heights: Vec<u32>,
        measured: Vec<bool>,
        sums: Fenwick,
    },
}

impl HeightStore {
    pub(crate) fn fixed(count: usize, item_height: u32) -> Self {
        Self {
            count,
            layout: Layout::Fixed { item_height },
            epsilon: 0,
        }
    }

    pub(crate) fn variable(count: usize, estimate: u32, epsilon: u32) -> Self {
        let heights = vec![estimate; count];
        let sums = Fenwick::from_heights(&heights);
        Self {
            count,
            layout: Layout::Variable {
                estimate,
                heights,
                measured: vec![false; count],
                sums,
            },
            epsilon,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn is_variable(&self) -> bool {
        matches!(self.layout, Layout::Variable { .. })
    }

    /// Measured height if known, otherwise the configured estimate (or the fixed height).
    pub(crate) fn height(&self, index: usize) -> u32 {
        match &self.layout {
            Layout::Fixed { item_height } => *item_height,
            Layout::Variable {
                estimate, heights, ..
            } => heights.get(index).copied().unwrap_or(*estimate),
        }
    }

    pub(crate) fn is_measured(&self, index: usize) -> bool {
        match &self.layout {
            Layout::Fixed { .. } => false,
            Layout::Variable { measured, .. } => measured.get(index).copied().unwrap_or(false),
        }
    }

    /// Records a measured height.
    ///
    /// Returns the applied delta; `0` when the change is within `epsilon`, the index is out of
    /// range, or the store is in fixed mode.
    pub(crate) fn set_measured(&mut self, index: usize, height: u32) -> i64 {
        let epsilon = self.epsilon;
        let Layout::Variable {
            heights,
            measured,
            sums,
            ..
        } = &mut self.layout
        else {
            return 0;
        };
        let Some(prev) = heights.get(index).copied() else {
            return 0;
        };
        measured[index] = true;
        if height.abs_diff(prev) <= epsilon {
            return 0;
        }
        heights[index] = height;
        let delta = height as i64 - prev as i64;
        sums.add(index, delta);
        delta
    }

    /// Cumulative height of all rows before `index` (`index` is clamped to the row count).
    pub(crate) fn offset_of(&self, index: usize) -> u64 {
        let index = index.min(self.count);
        match &self.layout {
            Layout::Fixed { item_height } => index as u64 * *item_height as u64,
            Layout::Variable { sums, .. } => sums.prefix_sum(index),
        }
    }

    pub(crate) fn total_height(&self) -> u64 {
        match &self.layout {
            Layout::Fixed { item_height } => self.count as u64 * *item_height as u64,
            Layout::Variable { sums, .. } => sums.total(),
        }
    }

    /// Index of the row containing `offset`, clamped to the last row. `None` for an empty list.
    pub(crate) fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let index = match &self.layout {
            Layout::Fixed { item_height } => {
                usize::try_from(offset / *item_height as u64).unwrap_or(usize::MAX)
            }
            Layout::Variable { sums, .. } => sums.rows_within(offset),
        };
        Some(index.min(self.count - 1))
    }

    /// Grows with estimates or shrinks, keeping the records of surviving rows.
    pub(crate) fn set_count(&mut self, count: usize) {
        if let Layout::Variable {
            estimate,
            heights,
            measured,
            sums,
        } = &mut self.layout
        {
            if count < heights.len() {
                heights.truncate(count);
                measured.truncate(count);
                sums.truncate(count);
            } else {
                for _ in heights.len()..count {
                    heights.push(*estimate);
                    measured.push(false);
                    sums.push(*estimate);
                }
            }
        }
        self.count = count;
    }

    /// Drops every measurement.
    pub(crate) fn reset(&mut self) {
        if let Layout::Variable {
            estimate,
            heights,
            measured,
            sums,
        } = &mut self.layout
        {
            heights.clear();
            heights.resize(self.count, *estimate);
            measured.clear();
            measured.resize(self.count, false);
            *sums = Fenwick::from_heights(heights);
        }
    }

    pub(crate) fn measurements(&self) -> Vec<(usize, u32)> {
        match &self.layout {
            Layout::Fixed { .. } => Vec::new(),
            Layout::Variable {
                heights, measured, ..
            } => heights
                .iter()
                .zip(measured.iter())
                .enumerate()
                .filter(|(_, (_, m))| **m)
                .map(|(i, (h, _))| (i, *h))
                .collect(),
        }
    }

    /// Replaces all measurements in one rebuild. Out-of-range entries are ignored.
    pub(crate) fn import(&mut self, entries: impl IntoIterator<Item = (usize, u32)>) -> usize {
        self.reset();
        let Layout::Variable {
            heights,
            measured,
            sums,
            ..
        } = &mut self.layout
        else {
            return 0;
        };
        let mut applied = 0usize;
        for (index, height) in entries {
            if index < heights.len() {
                heights[index] = height;
                measured[index] = true;
                applied += 1;
            }
        }
        *sums = Fenwick::from_heights(heights);
        applied
    }
}
