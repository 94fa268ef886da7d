use crate::a11y::{self, FocusController};
use crate::events::EventCoordinator;
use crate::heights::HeightStore;
use crate::range;
use crate::recycler::NodeRecycler;
use crate::types::Phase;
use crate::{
    Align, ConfigError, Evaluation, FailureKind, FocusState, Frame, FrameRow, GridState,
    ItemFailure, ItemSource, Metrics, NavKey, NodeId, RenderWindow, SizeReport, Surface, TabIndex,
    ViewportState, VirtualListOptions,
};

/// A virtualized list bound to one scroll container.
///
/// The engine owns all list state: heights, the index → node arena, timers, and focus. The host
/// forwards container events (`on_scroll`, `on_resize`, `on_size_report`, `handle_key`) and calls
/// [`VirtualList::tick`] at [`VirtualList::next_deadline`]. Everything else happens through the
/// [`Surface`] and [`ItemSource`] it was constructed with.
///
/// Rendering is synchronous and bounded by the window size (plus overscan), never by the total
/// item count.
#[derive(Debug)]
pub struct VirtualList<S, D> {
    options: VirtualListOptions,
    surface: S,
    source: D,

    heights: HeightStore,
    recycler: NodeRecycler,
    events: EventCoordinator,
    focus: FocusController,

    viewport: ViewportState,
    window: RenderWindow,
    visible: RenderWindow,
    phase: Phase,
    last_evaluation: Option<Evaluation>,
    metrics: Metrics,

    observing: bool,
    deferred: Vec<(usize, NodeId)>, // awaiting a fallback measurement read
    last_announcement: Option<String>,
    destroyed: bool,
}

impl<S, D> VirtualList<S, D>
where
    S: Surface,
    D: ItemSource<View = S::View>,
{
    /// Validates the configuration, binds to `surface` and renders the initial window.
    pub fn new(surface: S, source: D, options: VirtualListOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        if !surface.is_connected() {
            return Err(ConfigError::DetachedContainer);
        }

        let count = options.total_items;
        let heights = if options.variable_height {
            HeightStore::variable(
                count,
                options.estimated_item_height,
                options.measure_epsilon,
            )
        } else {
            HeightStore::fixed(count, options.item_height)
        };
        let observing = options.variable_height && surface.supports_size_observer();
        vdebug!(
            total_items = count,
            variable_height = options.variable_height,
            overscan = options.overscan,
            observing,
            "VirtualList::new"
        );

        let mut list = Self {
            recycler: NodeRecycler::new(options.node_pool_limit),
            events: EventCoordinator::new(
                options.throttle_scroll_delay_ms,
                options.resize_debounce_ms,
            ),
            focus: FocusController::new(count),
            viewport: surface.viewport(),
            window: RenderWindow::EMPTY,
            visible: RenderWindow::EMPTY,
            phase: Phase::Idle,
            last_evaluation: None,
            metrics: Metrics::default(),
            observing,
            deferred: Vec::new(),
            last_announcement: None,
            destroyed: false,
            heights,
            options,
            surface,
            source,
        };
        list.surface.set_grid(GridState { row_count: count });
        list.evaluate(true);
        Ok(list)
    }

    pub fn options(&self) -> &VirtualListOptions {
        &self.options
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for hosts that keep platform state in the surface. Call an event method
    /// afterwards if you changed scroll position or size.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Mutable access to the data source. Pair with [`VirtualList::update_item`] (one row) or
    /// [`VirtualList::refresh`] (everything) so changed rows get re-rendered.
    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the last evaluation (event, tick or explicit operation) rendered. `None` after
    /// [`VirtualList::destroy`].
    pub fn last_evaluation(&self) -> Option<Evaluation> {
        self.last_evaluation
    }

    pub fn total_items(&self) -> usize {
        self.heights.count()
    }

    pub fn render_window(&self) -> RenderWindow {
        self.window
    }

    pub fn visible_range(&self) -> RenderWindow {
        self.visible
    }

    /// The viewport as read by the last evaluation.
    pub fn viewport_state(&self) -> ViewportState {
        self.viewport
    }

    pub fn item_height(&self, index: usize) -> u32 {
        self.heights.height(index)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.heights.is_measured(index)
    }

    pub fn offset_of(&self, index: usize) -> u64 {
        self.heights.offset_of(index)
    }

    pub fn total_height(&self) -> u64 {
        self.heights.total_height()
    }

    pub fn node_for(&self, index: usize) -> Option<NodeId> {
        self.recycler.node_for(index)
    }

    /// Live `(index, node)` pairs in index order.
    pub fn rendered(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.recycler.live()
    }

    /// Released nodes currently parked for reuse.
    pub fn pooled_nodes(&self) -> usize {
        self.recycler.pool_len()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focus.focused()
    }

    pub fn focus_state(&self) -> FocusState {
        self.focus.state()
    }

    /// Records a scroll event. The evaluation runs on a later [`VirtualList::tick`].
    pub fn on_scroll(&mut self, now_ms: u64) {
        if self.destroyed {
            vwarn!("on_scroll after destroy");
            return;
        }
        self.events.on_scroll(now_ms);
    }

    /// Records a container resize. Debounced; evaluated on a later [`VirtualList::tick`].
    pub fn on_resize(&mut self, now_ms: u64) {
        if self.destroyed {
            vwarn!("on_resize after destroy");
            return;
        }
        self.events.on_resize(now_ms);
    }

    /// When the host should call [`VirtualList::tick`] next, if anything is pending.
    pub fn next_deadline(&self, now_ms: u64) -> Option<u64> {
        if self.destroyed {
            return None;
        }
        self.events.next_deadline(now_ms)
    }

    pub fn has_pending_work(&self) -> bool {
        !self.destroyed && self.events.is_pending()
    }

    /// Runs whatever became due at `now_ms`. Returns `true` if a render pass happened.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.destroyed {
            return false;
        }
        let due = self.events.take_due(now_ms);
        let requested = self.events.take_render();
        let mut rendered = false;
        if due.any() || requested {
            vtrace!(scroll = due.scroll, resize = due.resize, now_ms, "tick");
            rendered |= self.evaluate(false);
        }
        if self.events.take_measure() {
            rendered |= self.flush_deferred_measurements();
        }
        rendered
    }

    /// Applies an asynchronous size-observer report.
    ///
    /// Reports for rows that were recycled or released since, or that arrive after
    /// [`VirtualList::destroy`], are dropped. Returns `true` when the height was recorded.
    pub fn on_size_report(&mut self, report: SizeReport) -> bool {
        if self.destroyed {
            vtrace!(index = report.index, "size report after destroy ignored");
            return false;
        }
        if !self.heights.is_variable() {
            return false;
        }
        if !self.recycler.tracks(report.index, report.node) {
            vtrace!(index = report.index, "stale size report ignored");
            self.metrics.stale_measurements = self.metrics.stale_measurements.saturating_add(1);
            return false;
        }
        self.apply_measurement(report.index, report.height)
    }

    /// Changes the item count and re-renders.
    pub fn set_total_items(&mut self, total_items: usize) {
        if self.destroyed {
            vwarn!("set_total_items after destroy");
            return;
        }
        vdebug!(total_items, "set_total_items");
        self.options.total_items = total_items;
        self.heights.set_count(total_items);
        self.focus.clamp(total_items);
        // A shrinking list pulls the scroll position back inside the new height.
        let viewport = self.surface.viewport();
        let max = range::max_scroll_top(&self.heights, viewport.container_height);
        if viewport.scroll_top > max {
            self.surface.set_scroll_top(max);
        }
        self.surface.set_grid(GridState {
            row_count: total_items,
        });
        self.evaluate(true);
    }

    /// Marks the row at `index` for re-rendering on the next pass (if it's in the window).
    pub fn update_item(&mut self, index: usize) {
        if self.destroyed {
            vwarn!(index, "update_item after destroy");
            return;
        }
        if !self.window.contains(index) {
            return;
        }
        self.recycler.invalidate(index);
        self.events.queue_render();
    }

    /// Drops every node and measurement and renders from scratch.
    pub fn refresh(&mut self) {
        if self.destroyed {
            vwarn!("refresh after destroy");
            return;
        }
        vdebug!(rendered = self.recycler.len(), "refresh");
        self.recycler.clear(&mut self.surface, self.observing);
        self.heights.reset();
        self.deferred.clear();
        self.last_announcement = None;
        self.window = RenderWindow::EMPTY;
        self.evaluate(true);
    }

    /// Swaps the data source wholesale and refreshes.
    pub fn replace_source(&mut self, source: D) {
        if self.destroyed {
            vwarn!("replace_source after destroy");
            return;
        }
        self.source = source;
        self.refresh();
    }

    pub fn metrics(&self) -> Metrics {
        let mut m = self.metrics.clone();
        m.scroll_events = self.events.scroll_events();
        m.rendered_items = self.recycler.len();
        m.viewport_start_index = self.window.start_index;
        m.viewport_end_index = self.window.end_index;
        m.total_height = self.heights.total_height();
        m.container_height = self.viewport.container_height;
        m
    }

    /// Cancels timers, disconnects observers and releases every node.
    ///
    /// Synchronous: once this returns nothing fires and every other method is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        vdebug!(rendered = self.recycler.len(), "destroy");
        self.events.cancel_all();
        self.recycler.clear(&mut self.surface, self.observing);
        if self.observing {
            self.surface.disconnect_observer();
        }
        self.deferred.clear();
        self.window = RenderWindow::EMPTY;
        self.visible = RenderWindow::EMPTY;
        self.phase = Phase::Idle;
        self.last_evaluation = None;
        self.destroyed = true;
    }

    /// Handles a navigation key. Returns `true` if focus moved (the host should prevent the
    /// default action).
    pub fn handle_key(&mut self, key: NavKey) -> bool {
        if self.destroyed || !self.options.enable_keyboard_navigation {
            return false;
        }
        let count = self.heights.count();
        let current = self.focus.focused().unwrap_or(0);
        let page = range::page_size(&self.heights, self.surface.viewport());
        let Some(target) = key.target(current, count, page) else {
            return false;
        };
        vtrace!(?key, current, target, page, "handle_key");
        self.move_focus(target);
        true
    }

    /// Moves keyboard focus to `index`, scrolling it into view first if needed.
    pub fn focus_index(&mut self, index: usize) -> bool {
        if self.destroyed || index >= self.heights.count() {
            return false;
        }
        self.move_focus(index);
        true
    }

    /// Scroll offset that brings `index` into view with `align`, clamped to the scrollable range.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        let count = self.heights.count();
        if count == 0 {
            return 0;
        }
        let index = index.min(count - 1);
        let viewport = self.surface.viewport();
        let view = viewport.container_height as u64;
        let start = self.heights.offset_of(index);
        let size = self.heights.height(index) as u64;
        let end = start.saturating_add(size);

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = viewport.scroll_top;
                if start >= cur && end <= viewport.bottom() {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };
        target.min(range::max_scroll_top(&self.heights, viewport.container_height))
    }

    /// Programmatic scroll (no throttling). Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        if self.destroyed {
            vwarn!(index, "scroll_to_index after destroy");
            return self.viewport.scroll_top;
        }
        let offset = self.scroll_to_index_offset(index, align);
        self.surface.set_scroll_top(offset);
        self.evaluate(false);
        offset
    }

    /// Measured heights as `(index, height)` pairs, for persistence.
    pub fn export_measurements(&self) -> Vec<(usize, u32)> {
        self.heights.measurements()
    }

    /// Replaces all measured heights and re-renders. Returns how many entries were applied.
    pub fn import_measurements(
        &mut self,
        entries: impl IntoIterator<Item = (usize, u32)>,
    ) -> usize {
        if self.destroyed {
            vwarn!("import_measurements after destroy");
            return 0;
        }
        let applied = self.heights.import(entries);
        vdebug!(applied, "import_measurements");
        self.evaluate(true);
        applied
    }

    // Idle -> Evaluating -> (unchanged -> Idle) | (changed -> Rendering -> Idle)
    fn evaluate(&mut self, force: bool) -> bool {
        debug_assert_eq!(self.phase, Phase::Idle, "evaluate re-entered");
        self.phase = Phase::Evaluating;
        let viewport = self.surface.viewport();
        self.viewport = viewport;
        let window = range::render_window(&self.heights, viewport, self.options.overscan);
        let previous_visible = self.visible;
        self.visible = range::visible_range(&self.heights, viewport);

        let changed = force || window != self.window || self.recycler.has_pending_in(window);
        if !changed {
            // Clamped windows stay put while the visible rows still move.
            if self.visible != previous_visible {
                self.announce();
            }
            self.phase = Phase::Idle;
            self.last_evaluation = Some(Evaluation::Unchanged);
            return false;
        }

        vtrace!(
            start = window.start_index,
            end = window.end_index,
            scroll_top = viewport.scroll_top,
            container_height = viewport.container_height,
            "render window"
        );
        self.phase = Phase::Rendering;
        self.render(window);
        self.phase = Phase::Idle;
        self.last_evaluation = Some(Evaluation::Rendered);
        true
    }

    fn render(&mut self, window: RenderWindow) {
        let started = self.surface.now_ms();

        self.recycler
            .release_outside(window, &mut self.surface, self.observing);
        let mut populated = Vec::new();
        let stats = self.recycler.fill(
            window,
            &mut self.surface,
            &self.source,
            self.observing,
            &mut populated,
        );
        self.window = window;

        if self.heights.is_variable() {
            for (index, node) in populated {
                if self.observing {
                    self.surface.observe(node, index);
                } else {
                    self.deferred.push((index, node));
                    self.events.queue_measure();
                }
            }
        }

        let frame = self.frame();
        self.surface.commit(&frame);

        let m = &mut self.metrics;
        m.render_passes = m.render_passes.saturating_add(1);
        m.recycled_items = m.recycled_items.saturating_add(stats.recycled);
        m.created_nodes = m.created_nodes.saturating_add(stats.created);
        m.pooled_reuses = m.pooled_reuses.saturating_add(stats.pooled);
        m.skipped_items = m.skipped_items.saturating_add(stats.skipped);
        m.failed_items = m.failed_items.saturating_add(stats.failed);
        if stats.last_failure.is_some() {
            m.last_failure = stats.last_failure;
        }
        m.render_time = (self.surface.now_ms() - started).max(0.0);
        vtrace!(
            rendered = self.recycler.len(),
            recycled = stats.recycled,
            created = stats.created,
            skipped = stats.skipped,
            failed = stats.failed,
            "render pass"
        );

        self.announce();
    }

    fn frame(&self) -> Frame {
        let window = self.window;
        let tab_stop = self
            .focus
            .tab_stop(window, |i| self.recycler.node_for(i).is_some());
        let rows = window
            .indexes()
            .map(|index| FrameRow {
                index,
                node: self.recycler.node_for(index),
                height: self.heights.height(index),
                row_index: index + 1,
                tab_index: if tab_stop == Some(index) {
                    TabIndex::Focusable
                } else {
                    TabIndex::Skipped
                },
            })
            .collect();

        let total_height = self.heights.total_height();
        let top_spacer = self.heights.offset_of(window.start_index);
        let bottom_spacer = total_height.saturating_sub(self.heights.offset_of(window.end_index));
        Frame {
            top_spacer,
            bottom_spacer,
            total_height,
            rows,
        }
    }

    fn announce(&mut self) {
        if !self.options.announce_changes {
            return;
        }
        let Some(text) = a11y::announcement(self.visible, self.heights.count()) else {
            return;
        };
        if self.last_announcement.as_deref() == Some(text.as_str()) {
            return;
        }
        self.surface.announce(&text);
        self.last_announcement = Some(text);
    }

    // Focused(i) -> Scrolling -> Rendered -> Focused(j)
    fn move_focus(&mut self, target: usize) {
        let viewport = self.surface.viewport();
        let visible = range::visible_range(&self.heights, viewport);
        if !visible.contains(target) {
            self.focus.begin_scroll(target);
            let top = self
                .heights
                .offset_of(target)
                .min(range::max_scroll_top(&self.heights, viewport.container_height));
            self.surface.set_scroll_top(top);
        } else {
            self.focus.settle(target);
        }
        // Re-render so the roving tabindex lands on the new row.
        self.evaluate(true);

        if let Some(node) = self.recycler.node_for(target) {
            self.focus.rendered(target);
            self.surface.focus(node);
        }
        self.focus.settle(target);
    }

    fn apply_measurement(&mut self, index: usize, height: u32) -> bool {
        let item_top = self.heights.offset_of(index);
        let delta = self.heights.set_measured(index, height);
        if delta == 0 {
            return false;
        }
        self.metrics.measurements_applied = self.metrics.measurements_applied.saturating_add(1);
        vtrace!(index, height, delta, "measurement applied");

        if self.options.adjust_scroll_on_measure {
            let scroll_top = self.surface.viewport().scroll_top;
            if item_top < scroll_top {
                let adjusted = if delta > 0 {
                    scroll_top.saturating_add(delta as u64)
                } else {
                    scroll_top.saturating_sub(delta.unsigned_abs())
                };
                self.surface.set_scroll_top(adjusted);
            }
        }

        // Spacers (and maybe the window) are stale once anything up to the window end moves.
        if index <= self.window.end_index {
            self.evaluate(true);
        }
        true
    }

    fn flush_deferred_measurements(&mut self) -> bool {
        let mut applied = false;
        for (index, node) in core::mem::take(&mut self.deferred) {
            if !self.recycler.tracks(index, node) {
                self.metrics.stale_measurements = self.metrics.stale_measurements.saturating_add(1);
                continue;
            }
            match self.surface.measure(node) {
                Some(height) => applied |= self.apply_measurement(index, height),
                None => {
                    vwarn!(index, "deferred measurement failed");
                    self.metrics.failed_items = self.metrics.failed_items.saturating_add(1);
                    self.metrics.last_failure = Some(ItemFailure {
                        index,
                        kind: FailureKind::Measure,
                        reason: "node could not be measured".to_owned(),
                    });
                }
            }
        }
        applied
    }
}
