use std::cmp;

/// Binary indexed tree over per-row heights.
///
/// Backs the variable-height mode of [`crate::heights::HeightStore`]: prefix sums, point
/// updates, appends and offset lookups are all `O(log n)`, so a measurement only invalidates the
/// partial sums covering rows at or after the changed one.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<u64>, // 1-indexed
    total: u64,
    top_bit: usize,
}

impl Fenwick {
    pub(crate) fn from_heights(heights: &[u32]) -> Self {
        let n = heights.len();
        let mut tree = vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let h = heights[i - 1] as u64;
            total = total.saturating_add(h);
            tree[i] = tree[i].saturating_add(h);
            let parent = i + lsb(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Appends one height.
    ///
    /// The new node covers `lsb(n)` rows ending at `n`; the rows before it are recovered from two
    /// prefix sums, so this is `O(log n)`.
    pub(crate) fn push(&mut self, height: u32) {
        let n = self.len() + 1;
        let h = height as u64;
        let covered_from = n - lsb(n);
        let covered = self
            .prefix_sum(n - 1)
            .saturating_sub(self.prefix_sum(covered_from));
        self.tree.push(covered.saturating_add(h));
        self.total = self.total.saturating_add(h);
        self.top_bit = top_bit(n);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.total = self.prefix_sum(len);
        self.tree.truncate(len + 1);
        self.top_bit = top_bit(len);
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            debug_assert!(
                self.tree[i] as i128 + delta as i128 >= 0,
                "Fenwick underflow (node={i}, delta={delta})"
            );
            self.tree[i] = apply_delta(self.tree[i], delta);
            i += lsb(i);
        }
    }

    /// Sum of the first `count` heights.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    /// Number of leading rows whose cumulative height is `<= target`.
    ///
    /// For an offset inside the list this is the index of the row containing it.
    pub(crate) fn rows_within(&self, mut target: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}
