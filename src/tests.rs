use crate::*;

use crate::fenwick::Fenwick;
use crate::heights::HeightStore;

use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

/// Test data source: rows `< loaded` exist, rows in `failing` can't be rendered.
#[derive(Clone, Debug, Default)]
struct Posts {
    loaded: usize,
    failing: BTreeSet<usize>,
    version: u32,
}

impl Posts {
    fn all(count: usize) -> Self {
        Self {
            loaded: count,
            ..Self::default()
        }
    }
}

impl ItemSource for Posts {
    type Item = usize;
    type View = String;

    fn get_item(&self, index: usize) -> Option<usize> {
        (index < self.loaded).then_some(index)
    }

    fn render_item(&self, item: &usize, index: usize) -> Result<String, RenderError> {
        if self.failing.contains(&index) {
            return Err(RenderError::new(format!("post {index} is corrupt")));
        }
        Ok(format!("post {item} v{}", self.version))
    }
}

type TestList = VirtualList<HeadlessSurface, Posts>;

fn fixed_list(total: usize, item_height: u32, container: u32) -> TestList {
    VirtualList::new(
        HeadlessSurface::new(container),
        Posts::all(total),
        VirtualListOptions::fixed(total, item_height),
    )
    .unwrap()
}

fn variable_list(total: usize, estimate: u32, container: u32) -> TestList {
    VirtualList::new(
        HeadlessSurface::new(container),
        Posts::all(total),
        VirtualListOptions::variable(total, estimate),
    )
    .unwrap()
}

/// User scroll followed by the throttled evaluation.
fn scroll(list: &mut TestList, scroll_top: u64, now_ms: u64) -> bool {
    list.surface_mut().scroll_to(scroll_top);
    list.on_scroll(now_ms);
    list.tick(now_ms + list.options().throttle_scroll_delay_ms)
}

/// Delivers size-observer reports until nothing changes anymore.
fn settle_measurements(list: &mut TestList) {
    for _ in 0..64 {
        let reports = list.surface().take_size_reports();
        let mut applied = false;
        for r in reports {
            applied |= list.on_size_report(r);
        }
        if !applied {
            return;
        }
    }
    panic!("measurements did not settle");
}

fn assert_conserved(list: &TestList) {
    let f = list.surface().frame();
    assert_eq!(f.total_height, list.total_height());
    assert_eq!(
        f.top_spacer + f.content_height() + f.bottom_spacer,
        list.total_height(),
        "spacers + rows must add up to the scroll height"
    );
}

fn focusable_rows(list: &TestList) -> Vec<usize> {
    list.surface()
        .frame()
        .rows
        .iter()
        .filter(|r| r.tab_index == TabIndex::Focusable)
        .map(|r| r.index)
        .collect()
}

fn expected_window(
    sizes: &[u32],
    scroll_top: u64,
    container: u32,
    overscan: usize,
) -> RenderWindow {
    let count = sizes.len();
    if count == 0 || container == 0 {
        return RenderWindow::EMPTY;
    }
    let total: u64 = sizes.iter().map(|&s| s as u64).sum();
    let top = scroll_top.min(total.saturating_sub(container as u64));
    let bottom = top + container as u64;
    if top >= total {
        return RenderWindow::EMPTY;
    }

    // Walk forward from row 0.
    let mut acc = 0u64;
    let mut start = None;
    let mut end = count;
    for (i, &h) in sizes.iter().enumerate() {
        acc += h as u64;
        if start.is_none() && acc > top {
            start = Some(i);
        }
        if acc >= bottom {
            end = i + 1;
            break;
        }
    }
    let start = start.unwrap_or(count - 1);
    RenderWindow::new(
        start.saturating_sub(overscan),
        (end + overscan).min(count),
    )
}

#[test]
fn fenwick_matches_naive_prefix_sums() {
    let mut rng = Lcg::new(7);
    let mut heights: Vec<u32> = (0..97).map(|_| rng.gen_range_u32(0, 300)).collect();
    let mut tree = Fenwick::from_heights(&heights);

    for round in 0..200 {
        match round % 4 {
            0 => {
                let h = rng.gen_range_u32(0, 300);
                heights.push(h);
                tree.push(h);
            }
            1 if !heights.is_empty() => {
                let len = rng.gen_range_usize(0, heights.len());
                heights.truncate(len);
                tree.truncate(len);
            }
            _ if !heights.is_empty() => {
                let i = rng.gen_range_usize(0, heights.len());
                let h = rng.gen_range_u32(0, 300);
                tree.add(i, h as i64 - heights[i] as i64);
                heights[i] = h;
            }
            _ => {}
        }

        assert_eq!(tree.len(), heights.len());
        let mut prefix = 0u64;
        for (i, &h) in heights.iter().enumerate() {
            assert_eq!(tree.prefix_sum(i), prefix);
            prefix += h as u64;
        }
        assert_eq!(tree.total(), prefix);
        assert_eq!(tree.prefix_sum(heights.len()), prefix);
    }
}

#[test]
fn fenwick_rows_within_maps_offsets_to_rows() {
    let tree = Fenwick::from_heights(&[10, 20, 30]);
    assert_eq!(tree.rows_within(0), 0);
    assert_eq!(tree.rows_within(9), 0);
    assert_eq!(tree.rows_within(10), 1);
    assert_eq!(tree.rows_within(29), 1);
    assert_eq!(tree.rows_within(30), 2);
    assert_eq!(tree.rows_within(59), 2);
    assert_eq!(tree.rows_within(60), 3);
}

#[test]
fn fixed_height_store_is_arithmetic() {
    let store = HeightStore::fixed(10_000, 80);
    assert_eq!(store.height(42), 80);
    assert_eq!(store.offset_of(0), 0);
    assert_eq!(store.offset_of(10), 800);
    assert_eq!(store.offset_of(20_000), 800_000);
    assert_eq!(store.total_height(), 800_000);
    assert_eq!(store.index_at_offset(799), Some(9));
    assert_eq!(store.index_at_offset(800), Some(10));
    assert_eq!(store.index_at_offset(u64::MAX), Some(9_999));
    assert_eq!(HeightStore::fixed(0, 80).index_at_offset(0), None);
}

#[test]
fn measured_height_updates_total_and_later_offsets() {
    let mut store = HeightStore::variable(3, 80, 1);
    assert_eq!(store.total_height(), 240);
    assert_eq!(store.offset_of(2), 160);
    assert!(!store.is_measured(1));

    assert_eq!(store.set_measured(1, 200), 120);
    assert!(store.is_measured(1));
    assert_eq!(store.height(1), 200);
    assert_eq!(store.total_height(), 360);
    assert_eq!(store.offset_of(1), 80);
    assert_eq!(store.offset_of(2), 280);
}

#[test]
fn measurements_within_epsilon_are_ignored() {
    let mut store = HeightStore::variable(2, 80, 1);
    assert_eq!(store.set_measured(0, 81), 0);
    assert_eq!(store.set_measured(0, 79), 0);
    assert_eq!(store.total_height(), 160);
    assert!(store.is_measured(0));

    assert_eq!(store.set_measured(0, 82), 2);
    assert_eq!(store.total_height(), 162);

    // Out of range and fixed mode never change anything.
    assert_eq!(store.set_measured(5, 500), 0);
    assert_eq!(HeightStore::fixed(2, 80).set_measured(0, 500), 0);
}

#[test]
fn height_store_count_changes_keep_surviving_measurements() {
    let mut store = HeightStore::variable(2, 10, 0);
    store.set_measured(0, 40);
    store.set_count(4);
    assert_eq!(store.height(0), 40);
    assert_eq!(store.height(3), 10);
    assert_eq!(store.total_height(), 70);

    store.set_count(1);
    assert_eq!(store.total_height(), 40);
    store.set_count(3);
    assert_eq!(store.total_height(), 60);
    assert!(!store.is_measured(2));

    store.reset();
    assert_eq!(store.total_height(), 30);
    assert!(store.measurements().is_empty());
}

#[test]
fn fixed_window_at_top_and_bottom() {
    let mut list = fixed_list(10_000, 80, 800);
    assert_eq!(list.render_window(), RenderWindow::new(0, 15));
    assert_eq!(list.visible_range(), RenderWindow::new(0, 10));

    // Middle of the list.
    scroll(&mut list, 400_000, 0);
    assert_eq!(list.render_window(), RenderWindow::new(4_995, 5_015));

    // Maximum scroll offset.
    scroll(&mut list, 799_200, 100);
    assert_eq!(list.render_window(), RenderWindow::new(9_985, 10_000));

    // Past the end is clamped to the same window.
    scroll(&mut list, 5_000_000, 200);
    assert_eq!(list.render_window(), RenderWindow::new(9_985, 10_000));
    assert_conserved(&list);
}

#[test]
fn empty_list_has_empty_window_and_zero_spacers() {
    let list = fixed_list(0, 80, 800);
    assert!(list.render_window().is_empty());
    let f = list.surface().frame();
    assert_eq!(f.top_spacer, 0);
    assert_eq!(f.bottom_spacer, 0);
    assert!(f.rows.is_empty());
    assert!(list.surface().announcements().is_empty());
    assert_eq!(list.focused_index(), None);
}

#[test]
fn zero_height_container_renders_nothing_until_resized() {
    let mut list = fixed_list(100, 80, 0);
    assert!(list.render_window().is_empty());
    assert_eq!(list.surface().frame().bottom_spacer, 8_000);
    assert_conserved(&list);

    list.surface_mut().resize(800);
    list.on_resize(0);
    assert!(!list.tick(50));
    assert!(list.render_window().is_empty());
    assert!(list.tick(100));
    assert_eq!(list.render_window(), RenderWindow::new(0, 15));
    assert_eq!(list.metrics().container_height, 800);
}

#[test]
fn property_window_matches_forward_walk() {
    for seed in [1u64, 42, 1337, 2025] {
        let mut rng = Lcg::new(seed);
        let count = rng.gen_range_usize(1, 300);
        let container = rng.gen_range_u32(1, 900);
        let overscan = rng.gen_range_usize(0, 8);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(1, 121)).collect();

        let opts = VirtualListOptions::variable(count, 50).with_overscan(overscan);
        let mut list =
            VirtualList::new(HeadlessSurface::new(container), Posts::all(count), opts).unwrap();
        list.import_measurements(sizes.iter().copied().enumerate());

        let total: u64 = sizes.iter().map(|&s| s as u64).sum();
        assert_eq!(list.total_height(), total);

        let mut now = 0u64;
        for _ in 0..60 {
            let top = rng.gen_range_u64(0, total + 200);
            scroll(&mut list, top, now);
            now += 100;

            let w = list.render_window();
            assert!(w.start_index <= w.end_index);
            assert!(w.end_index <= count);
            assert_eq!(w, expected_window(&sizes, top, container, overscan));
            assert_conserved(&list);
        }
    }
}

#[test]
fn property_fixed_window_stays_in_bounds() {
    let mut rng = Lcg::new(99);
    let mut list = fixed_list(10_000, 80, 800);
    for step in 0..200u64 {
        let top = rng.gen_range_u64(0, 900_000);
        scroll(&mut list, top, step * 50);
        let w = list.render_window();
        assert!(w.start_index <= w.end_index && w.end_index <= 10_000);
        assert!(list.rendered().all(|(i, _)| w.contains(i)));
        assert_conserved(&list);
    }
}

#[test]
fn rendered_nodes_are_unique_and_inside_the_window() {
    let mut list = variable_list(500, 40, 400);
    let mut rng = Lcg::new(5);
    for step in 0..100u64 {
        let top = rng.gen_range_u64(0, 25_000);
        scroll(&mut list, top, step * 20);
        list.surface_mut()
            .set_layout_height(rng.gen_range_usize(0, 500), rng.gen_range_u32(10, 90));
        settle_measurements(&mut list);

        let w = list.render_window();
        let mut seen = HashSet::new();
        for (index, node) in list.rendered() {
            assert!(w.contains(index));
            assert!(seen.insert(node), "node {node:?} rendered twice");
        }
        let rows: Vec<usize> = list.surface().frame().rows.iter().map(|r| r.index).collect();
        assert_eq!(rows, w.indexes().collect::<Vec<_>>());
        assert_conserved(&list);
    }
}

#[test]
fn scrolling_back_and_forth_converges() {
    let mut list = fixed_list(10_000, 80, 800);
    let mut counts = Vec::new();
    let mut now = 0;
    for _ in 0..10 {
        scroll(&mut list, 40_000, now);
        counts.push(list.metrics().rendered_items);
        scroll(&mut list, 80_000, now + 50);
        now += 100;
    }
    assert!(counts.iter().all(|&c| c == counts[0]));
    assert_eq!(counts[0], 20);

    let m = list.metrics();
    // Everything beyond the first window's worth came out of the pool.
    assert_eq!(m.created_nodes, 20);
    assert!(m.pooled_reuses > 0);
    assert!(list.surface().node_count() <= 20 + list.options().node_pool_limit);
    assert_eq!(list.surface().attached_count(), 20);
}

#[test]
fn jitter_inside_the_same_rows_does_not_render() {
    let mut list = fixed_list(10_000, 80, 800);
    assert!(scroll(&mut list, 40, 0));
    let commits = list.surface().commits();
    let recycled = list.metrics().recycled_items;

    assert_eq!(list.last_evaluation(), Some(Evaluation::Rendered));

    assert!(!scroll(&mut list, 41, 100));
    assert!(!scroll(&mut list, 39, 200));
    assert_eq!(list.surface().commits(), commits);
    assert_eq!(list.metrics().recycled_items, recycled);
    assert_eq!(list.last_evaluation(), Some(Evaluation::Unchanged));

    list.destroy();
    assert_eq!(list.last_evaluation(), None);
}

#[test]
fn scroll_is_throttled_on_the_trailing_edge() {
    let mut list = fixed_list(10_000, 80, 800);
    list.surface_mut().scroll_to(8_000);
    list.on_scroll(0);
    list.on_scroll(5);
    list.on_scroll(10);
    assert_eq!(list.next_deadline(10), Some(16));
    assert!(!list.tick(15));
    assert_eq!(list.render_window(), RenderWindow::new(0, 15));

    assert!(list.tick(16));
    assert_eq!(list.render_window(), RenderWindow::new(95, 115));
    assert_eq!(list.metrics().scroll_events, 3);
    assert_eq!(list.next_deadline(16), None);
}

#[test]
fn resize_is_debounced() {
    let mut list = fixed_list(10_000, 80, 800);
    list.surface_mut().resize(1_600);
    list.on_resize(0);
    list.on_resize(50);
    assert_eq!(list.next_deadline(50), Some(150));
    assert!(!list.tick(100));
    assert!(list.tick(150));
    assert_eq!(list.render_window(), RenderWindow::new(0, 25));
}

#[test]
fn measured_row_updates_total_and_offsets_through_the_engine() {
    let mut list = variable_list(3, 80, 800);
    assert_eq!(list.total_height(), 240);
    assert_eq!(list.offset_of(2), 160);
    assert_eq!(list.surface().observed_count(), 3);

    list.surface_mut().set_layout_height(1, 200);
    settle_measurements(&mut list);

    assert_eq!(list.total_height(), 360);
    assert_eq!(list.offset_of(2), 280);
    assert!(list.is_measured(1));
    assert!(!list.is_measured(0));
    assert_eq!(list.metrics().measurements_applied, 1);
    assert_eq!(list.surface().frame().rows[1].height, 200);
    assert_conserved(&list);
}

#[test]
fn property_measurements_converge_to_true_heights() {
    for seed in [3u64, 17, 404] {
        let mut rng = Lcg::new(seed);
        let count = rng.gen_range_usize(50, 400);
        let truth: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(10, 200)).collect();

        let opts = VirtualListOptions::variable(count, 60)
            .with_measure_epsilon(0)
            .with_adjust_scroll_on_measure(false);
        let mut surface = HeadlessSurface::new(rng.gen_range_u32(100, 700));
        for (i, &h) in truth.iter().enumerate() {
            surface.set_layout_height(i, h);
        }
        let mut list = VirtualList::new(surface, Posts::all(count), opts).unwrap();

        let mut next = 0usize;
        loop {
            list.scroll_to_index(next, Align::Start);
            settle_measurements(&mut list);
            assert_conserved(&list);
            let end = list.visible_range().end_index;
            if end >= count {
                break;
            }
            next = end;
        }

        let sum: u64 = truth.iter().map(|&h| h as u64).sum();
        assert_eq!(list.total_height(), sum);
        let mut prefix = 0u64;
        for (i, &h) in truth.iter().enumerate() {
            assert_eq!(list.offset_of(i), prefix);
            prefix += h as u64;
        }
    }
}

#[test]
fn measuring_a_row_above_the_viewport_keeps_content_in_place() {
    let mut list = variable_list(100, 50, 200);
    assert_eq!(list.scroll_to_index(20, Align::Start), 1_000);
    assert_eq!(list.render_window(), RenderWindow::new(15, 29));

    let node = list.node_for(15).unwrap();
    let before = list.offset_of(20) - list.surface().viewport().scroll_top;
    assert!(list.on_size_report(SizeReport {
        index: 15,
        node,
        height: 80
    }));
    assert_eq!(list.surface().viewport().scroll_top, 1_030);
    assert_eq!(
        list.offset_of(20) - list.surface().viewport().scroll_top,
        before
    );
    assert_conserved(&list);
}

#[test]
fn stale_size_report_is_ignored() {
    let mut list = variable_list(1_000, 50, 500);
    let node = list.node_for(0).unwrap();
    list.scroll_to_index(500, Align::Start);
    assert!(list.node_for(0).is_none());

    let total = list.total_height();
    assert!(!list.on_size_report(SizeReport {
        index: 0,
        node,
        height: 300
    }));
    assert_eq!(list.total_height(), total);
    assert!(!list.is_measured(0));
    assert_eq!(list.metrics().stale_measurements, 1);
}

#[test]
fn size_report_after_destroy_is_a_no_op() {
    let mut list = variable_list(10, 80, 400);
    let node = list.node_for(1).unwrap();
    list.surface_mut().set_layout_height(1, 200);
    let pending = list.surface().take_size_reports();

    list.destroy();
    assert!(list.is_destroyed());
    assert!(!list.surface().is_observer_connected());
    assert_eq!(list.surface().observed_count(), 0);
    assert_eq!(list.surface().node_count(), 0);

    let metrics = list.metrics();
    let total = list.total_height();
    assert!(!list.on_size_report(SizeReport {
        index: 1,
        node,
        height: 200
    }));
    for r in pending {
        assert!(!list.on_size_report(r));
    }
    assert_eq!(list.total_height(), total);
    assert_eq!(list.metrics(), metrics);
}

#[test]
fn destroy_cancels_pending_timers() {
    let mut list = variable_list(100, 50, 400);
    list.surface_mut().scroll_to(1_000);
    list.on_scroll(0);
    list.on_resize(0);
    list.update_item(0);
    let commits = list.surface().commits();

    list.destroy();
    assert!(!list.has_pending_work());
    assert_eq!(list.next_deadline(0), None);
    assert!(!list.tick(10_000));

    list.on_scroll(20_000);
    list.set_total_items(5);
    list.refresh();
    assert!(!list.handle_key(NavKey::End));
    assert!(!list.tick(30_000));
    assert_eq!(list.surface().commits(), commits);
    assert_eq!(list.total_items(), 100);
    assert_eq!(list.metrics().rendered_items, 0);

    // Idempotent.
    list.destroy();
}

#[test]
fn fixed_mode_never_observes() {
    let list = fixed_list(100, 80, 800);
    assert_eq!(list.surface().observed_count(), 0);
}

#[test]
fn fallback_measurement_runs_on_the_next_tick() {
    let surface = HeadlessSurface::new(200)
        .without_size_observer()
        .with_default_layout_height(100);
    let opts = VirtualListOptions::variable(20, 50).with_overscan(0);
    let mut list = VirtualList::new(surface, Posts::all(20), opts).unwrap();
    assert_eq!(list.surface().observed_count(), 0);
    assert_eq!(list.render_window(), RenderWindow::new(0, 4));
    assert_eq!(list.next_deadline(0), Some(0));

    for now in 0..10 {
        if list.next_deadline(now).is_none() {
            break;
        }
        list.tick(now);
    }

    assert_eq!(list.render_window(), RenderWindow::new(0, 2));
    for i in 0..2 {
        assert!(list.is_measured(i));
        assert_eq!(list.item_height(i), 100);
    }
    assert_conserved(&list);
}

#[test]
fn failed_measurement_is_reported_per_row() {
    let mut surface = HeadlessSurface::new(200)
        .without_size_observer()
        .with_default_layout_height(50);
    surface.set_unmeasurable(1);
    let opts = VirtualListOptions::variable(10, 50).with_overscan(0);
    let mut list = VirtualList::new(surface, Posts::all(10), opts).unwrap();
    list.tick(0);

    let m = list.metrics();
    assert_eq!(m.failed_items, 1);
    let failure = m.last_failure.unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.kind, FailureKind::Measure);
    assert!(list.is_measured(0));
    assert!(!list.is_measured(1));
    assert!(list.is_measured(2));
}

#[test]
fn missing_items_are_skipped_and_retried() {
    let mut source = Posts::all(50);
    source.loaded = 5;
    let mut list = VirtualList::new(
        HeadlessSurface::new(400),
        source,
        VirtualListOptions::fixed(50, 40),
    )
    .unwrap();

    let rows = &list.surface().frame().rows;
    assert_eq!(rows.len(), 15);
    assert!(rows[..5].iter().all(|r| r.node.is_some()));
    assert!(rows[5..].iter().all(|r| r.node.is_none()));
    assert_eq!(list.metrics().rendered_items, 5);
    assert_eq!(list.metrics().skipped_items, 10);
    assert_conserved(&list);

    // Data arrives; any evaluation picks the rows up.
    list.source_mut().loaded = 50;
    list.on_scroll(0);
    assert!(list.tick(16));
    assert_eq!(list.metrics().rendered_items, 15);
    assert!(list.surface().frame().rows.iter().all(|r| r.node.is_some()));
}

#[test]
fn render_failure_only_affects_its_row() {
    let mut source = Posts::all(100);
    source.failing.insert(3);
    let list = VirtualList::new(
        HeadlessSurface::new(400),
        source,
        VirtualListOptions::fixed(100, 40),
    )
    .unwrap();

    let m = list.metrics();
    assert_eq!(m.failed_items, 1);
    assert_eq!(m.rendered_items, 14);
    let failure = m.last_failure.unwrap();
    assert_eq!(failure.index, 3);
    assert_eq!(failure.kind, FailureKind::Render);
    assert_eq!(failure.reason, "post 3 is corrupt");
    assert!(list.node_for(3).is_none());
    assert!(list.node_for(4).is_some());
    assert_conserved(&list);
}

#[test]
fn update_item_rerenders_just_that_row() {
    let mut list = fixed_list(100, 40, 400);
    let n1 = list.node_for(1).unwrap();
    let n2 = list.node_for(2).unwrap();

    list.source_mut().version = 1;
    list.update_item(2);
    list.update_item(90); // not in the window
    assert_eq!(list.next_deadline(5), Some(5));
    assert!(list.tick(5));

    assert_eq!(list.node_for(2), Some(n2));
    assert_eq!(list.surface().node(n2).unwrap().populate_count, 2);
    assert_eq!(list.surface().node(n1).unwrap().populate_count, 1);
    assert_eq!(list.surface().view_at(2).unwrap(), "post 2 v1");
    assert_eq!(list.surface().view_at(1).unwrap(), "post 1 v0");
}

#[test]
fn refresh_drops_nodes_and_measurements() {
    let mut list = variable_list(10, 50, 300);
    list.surface_mut().set_layout_height(0, 90);
    settle_measurements(&mut list);
    assert_eq!(list.total_height(), 540);
    let created = list.metrics().created_nodes;

    list.source_mut().version = 7;
    list.refresh();
    assert_eq!(list.total_height(), 500);
    assert!(!list.is_measured(0));
    assert_eq!(list.surface().view_at(0).unwrap(), "post 0 v7");
    assert!(list.metrics().created_nodes > created);

    let replaced = Posts {
        loaded: 10,
        version: 9,
        ..Posts::default()
    };
    list.replace_source(replaced);
    assert_eq!(list.surface().view_at(3).unwrap(), "post 3 v9");
}

#[test]
fn set_total_items_shrinks_and_grows() {
    let mut list = fixed_list(10_000, 80, 800);
    list.focus_index(9_000);
    assert_eq!(list.surface().grid().row_count, 10_000);

    list.set_total_items(3);
    assert_eq!(list.render_window(), RenderWindow::new(0, 3));
    assert_eq!(list.total_height(), 240);
    assert_eq!(list.surface().grid().row_count, 3);
    assert_eq!(list.focused_index(), Some(2));
    assert_eq!(list.metrics().rendered_items, 3);
    assert_conserved(&list);

    list.set_total_items(0);
    assert!(list.render_window().is_empty());
    assert_eq!(list.focused_index(), None);
    assert_eq!(list.focus_state(), FocusState::Unfocused);
    assert_eq!(list.surface().attached_count(), 0);

    list.set_total_items(50);
    assert_eq!(list.render_window(), RenderWindow::new(0, 15));
    assert_eq!(list.focused_index(), Some(0));
}

#[test]
fn page_down_scrolls_the_next_page_into_view() {
    let mut list = fixed_list(10_000, 80, 800);
    assert_eq!(list.focused_index(), Some(0));

    assert!(list.handle_key(NavKey::PageDown));
    assert_eq!(list.focused_index(), Some(10));
    assert_eq!(list.focus_state(), FocusState::Focused(10));
    assert_eq!(list.surface().viewport().scroll_top, list.offset_of(10));
    assert_eq!(list.surface().viewport().scroll_top, 800);
    assert_eq!(list.surface().focused(), list.node_for(10));
    assert_eq!(focusable_rows(&list), vec![10]);
}

#[test]
fn arrows_home_and_end_move_focus() {
    let mut list = fixed_list(10_000, 80, 800);

    assert!(list.handle_key(NavKey::ArrowUp));
    assert_eq!(list.focused_index(), Some(0));

    assert!(list.handle_key(NavKey::ArrowDown));
    assert_eq!(list.focused_index(), Some(1));
    // Still visible: no scroll.
    assert_eq!(list.surface().viewport().scroll_top, 0);
    assert_eq!(focusable_rows(&list), vec![1]);

    assert!(list.handle_key(NavKey::End));
    assert_eq!(list.focused_index(), Some(9_999));
    assert_eq!(list.surface().viewport().scroll_top, 799_200);
    assert_eq!(list.surface().focused(), list.node_for(9_999));

    assert!(list.handle_key(NavKey::PageUp));
    assert_eq!(list.focused_index(), Some(9_989));

    assert!(list.handle_key(NavKey::Home));
    assert_eq!(list.focused_index(), Some(0));
    assert_eq!(list.surface().viewport().scroll_top, 0);
    assert_eq!(focusable_rows(&list), vec![0]);
}

#[test]
fn tab_stop_falls_back_to_first_row_when_focus_is_offscreen() {
    let mut list = fixed_list(1_000, 80, 800);
    scroll(&mut list, 40_000, 0);
    assert_eq!(list.focused_index(), Some(0));
    let w = list.render_window();
    assert_eq!(focusable_rows(&list), vec![w.start_index]);
}

#[test]
fn variable_page_size_counts_fully_visible_rows() {
    let mut list = variable_list(100, 100, 350);
    assert!(list.handle_key(NavKey::PageDown));
    assert_eq!(list.focused_index(), Some(3));
    // Row 3 is partially visible, so no scroll yet.
    assert_eq!(list.surface().viewport().scroll_top, 0);

    assert!(list.handle_key(NavKey::PageDown));
    assert_eq!(list.focused_index(), Some(6));
    assert_eq!(list.surface().viewport().scroll_top, 600);
}

#[test]
fn keyboard_navigation_can_be_disabled() {
    let opts = VirtualListOptions::fixed(100, 80).with_keyboard_navigation(false);
    let mut list = VirtualList::new(HeadlessSurface::new(800), Posts::all(100), opts).unwrap();
    assert!(!list.handle_key(NavKey::PageDown));
    assert_eq!(list.focused_index(), Some(0));
    assert_eq!(list.surface().viewport().scroll_top, 0);
}

#[test]
fn nav_key_names_match_dom_keys() {
    assert_eq!(NavKey::from_key_name("ArrowDown"), Some(NavKey::ArrowDown));
    assert_eq!(NavKey::from_key_name("PageUp"), Some(NavKey::PageUp));
    assert_eq!(NavKey::from_key_name("End"), Some(NavKey::End));
    assert_eq!(NavKey::from_key_name("Enter"), None);
}

#[test]
fn announces_visible_range_after_renders() {
    let mut list = fixed_list(10_000, 80, 800);
    assert_eq!(
        list.surface().announcements(),
        ["Showing items 1 to 10 of 10000"]
    );

    scroll(&mut list, 800, 0);
    // Focus moves re-render the same range; no duplicate announcement.
    assert!(list.focus_index(12));
    assert_eq!(
        list.surface().announcements(),
        [
            "Showing items 1 to 10 of 10000",
            "Showing items 11 to 20 of 10000"
        ]
    );
}

#[test]
fn announces_when_only_the_visible_range_moves() {
    // Twelve rows: the overscanned window is clamped to [0, 12) at every offset.
    let mut list = fixed_list(12, 80, 800);
    assert!(!scroll(&mut list, 160, 0));
    assert_eq!(list.render_window(), RenderWindow::new(0, 12));
    assert_eq!(list.visible_range(), RenderWindow::new(2, 12));
    assert_eq!(list.last_evaluation(), Some(Evaluation::Unchanged));
    assert_eq!(
        list.surface().announcements(),
        [
            "Showing items 1 to 10 of 12",
            "Showing items 3 to 12 of 12"
        ]
    );

    // Back to the top, then a no-op scroll: announced once, not repeated.
    scroll(&mut list, 0, 100);
    scroll(&mut list, 0, 200);
    assert_eq!(list.surface().announcements().len(), 3);
    assert_eq!(
        list.surface().announcements()[2],
        "Showing items 1 to 10 of 12"
    );
}

#[test]
fn announcements_can_be_disabled() {
    let opts = VirtualListOptions::fixed(100, 80).with_announce_changes(false);
    let mut list = VirtualList::new(HeadlessSurface::new(800), Posts::all(100), opts).unwrap();
    scroll(&mut list, 800, 0);
    assert!(list.surface().announcements().is_empty());
}

#[test]
fn rows_carry_grid_metadata() {
    let mut list = fixed_list(10_000, 80, 800);
    scroll(&mut list, 8_000, 0);
    assert_eq!(list.surface().grid(), GridState { row_count: 10_000 });
    for row in &list.surface().frame().rows {
        assert_eq!(row.row_index, row.index + 1);
        assert_eq!(row.height, 80);
    }
    assert_eq!(TabIndex::Focusable.value(), 0);
    assert_eq!(TabIndex::Skipped.value(), -1);
}

#[test]
fn construction_rejects_bad_configuration() {
    let err = VirtualList::new(
        HeadlessSurface::<String>::disconnected(),
        Posts::all(10),
        VirtualListOptions::fixed(10, 80),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::DetachedContainer);

    let err = VirtualList::new(
        HeadlessSurface::<String>::new(800),
        Posts::all(10),
        VirtualListOptions::fixed(10, 0),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::ZeroItemHeight);

    let err = VirtualList::new(
        HeadlessSurface::<String>::new(800),
        Posts::all(10),
        VirtualListOptions::variable(10, 0),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::ZeroEstimatedHeight);
    assert_eq!(
        err.to_string(),
        "estimated item height must be greater than zero"
    );
}

#[test]
fn scroll_to_index_alignments() {
    let mut list = fixed_list(100, 10, 50);
    assert_eq!(list.scroll_to_index_offset(20, Align::Start), 200);
    assert_eq!(list.scroll_to_index_offset(20, Align::End), 160);
    assert_eq!(list.scroll_to_index_offset(20, Align::Center), 180);
    assert_eq!(list.scroll_to_index_offset(99, Align::Start), 950);
    assert_eq!(list.scroll_to_index_offset(1_000, Align::Start), 950);

    list.scroll_to_index(30, Align::Start);
    assert_eq!(list.surface().viewport().scroll_top, 300);
    assert_eq!(list.visible_range(), RenderWindow::new(30, 35));
    // Fully visible: Auto keeps the current offset.
    assert_eq!(list.scroll_to_index_offset(32, Align::Auto), 300);
    // Above: align to start. Below: align to end.
    assert_eq!(list.scroll_to_index_offset(10, Align::Auto), 100);
    assert_eq!(list.scroll_to_index_offset(40, Align::Auto), 360);
}

#[test]
fn measurements_can_be_exported_and_imported() {
    let mut list = variable_list(20, 50, 200);
    list.surface_mut().set_layout_height(0, 70);
    list.surface_mut().set_layout_height(2, 30);
    settle_measurements(&mut list);
    let exported = list.export_measurements();
    assert_eq!(exported, vec![(0, 70), (2, 30)]);

    let mut other = variable_list(20, 50, 200);
    assert_eq!(other.import_measurements(exported.iter().copied().chain([(99, 10)])), 2);
    assert_eq!(other.total_height(), list.total_height());
    assert_eq!(other.offset_of(3), 150);
    assert_conserved(&other);
}

#[test]
fn metrics_track_render_activity() {
    let surface = HeadlessSurface::new(800).with_commit_cost_ms(2.5);
    let mut list =
        VirtualList::new(surface, Posts::all(10_000), VirtualListOptions::fixed(10_000, 80))
            .unwrap();
    assert_eq!(list.metrics().render_time, 2.5);
    list.surface_mut().advance_clock(3.0);
    scroll(&mut list, 1_600, 0);

    let m = list.metrics();
    assert_eq!(m.render_passes, 2);
    assert_eq!(m.scroll_events, 1);
    assert_eq!(m.rendered_items, 20);
    assert_eq!(m.viewport_start_index, 15);
    assert_eq!(m.viewport_end_index, 35);
    assert_eq!(m.total_height, 800_000);
    assert_eq!(m.container_height, 800);
    // Rows 15..35 were new; nothing was kept from [0, 15).
    assert_eq!(m.recycled_items, 0);
    // Only the commit inside the pass counts, not clock movement between passes.
    assert_eq!(m.render_time, 2.5);
    assert!(m.last_failure.is_none());
}
