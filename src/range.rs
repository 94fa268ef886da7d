use crate::RenderWindow;
use crate::ViewportState;
use crate::heights::HeightStore;

/// Largest valid `scroll_top`: the list can't scroll past its own end.
pub(crate) fn max_scroll_top(heights: &HeightStore, container_height: u32) -> u64 {
    heights
        .total_height()
        .saturating_sub(container_height as u64)
}

/// Rows intersecting the viewport, without overscan.
///
/// Fixed mode reduces to `floor(top / h)..ceil(bottom / h)`. Variable mode finds the row
/// containing `scroll_top` and the row containing the last visible pixel through the prefix-sum
/// tree. An empty list or a zero-height container yields an empty range.
pub(crate) fn visible_range(heights: &HeightStore, viewport: ViewportState) -> RenderWindow {
    let count = heights.count();
    if count == 0 || viewport.container_height == 0 {
        return RenderWindow::EMPTY;
    }

    let top = viewport
        .scroll_top
        .min(max_scroll_top(heights, viewport.container_height));
    let bottom = top.saturating_add(viewport.container_height as u64);
    if top >= heights.total_height() {
        return RenderWindow::new(count, count);
    }

    let start = heights.index_at_offset(top).unwrap_or(count);
    let last = heights
        .index_at_offset(bottom.saturating_sub(1).max(top))
        .unwrap_or(count);
    RenderWindow::new(start.min(count), last.saturating_add(1).min(count))
}

/// The visible range grown by `overscan` rows on both sides and clamped to `[0, count)`.
pub(crate) fn render_window(
    heights: &HeightStore,
    viewport: ViewportState,
    overscan: usize,
) -> RenderWindow {
    let visible = visible_range(heights, viewport);
    if visible.is_empty() {
        return RenderWindow::EMPTY;
    }
    RenderWindow::new(
        visible.start_index.saturating_sub(overscan),
        visible
            .end_index
            .saturating_add(overscan)
            .min(heights.count()),
    )
}

/// Rows that fit entirely inside the viewport, starting from the first visible one (at least 1).
///
/// This is the `PageUp`/`PageDown` step. Fixed mode is `floor(container / h)`.
pub(crate) fn page_size(heights: &HeightStore, viewport: ViewportState) -> usize {
    if !heights.is_variable() {
        let h = heights.height(0).max(1);
        return (viewport.container_height / h).max(1) as usize;
    }
    let visible = visible_range(heights, viewport);
    let bottom = viewport.bottom();
    let mut full = 0usize;
    let mut start = heights.offset_of(visible.start_index);
    for i in visible.indexes() {
        let end = start.saturating_add(heights.height(i) as u64);
        if start >= viewport.scroll_top && end <= bottom {
            full += 1;
        }
        start = end;
    }
    full.max(1)
}
