/// Which evaluations became due on a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Due {
    pub(crate) scroll: bool,
    pub(crate) resize: bool,
}

impl Due {
    pub(crate) fn any(self) -> bool {
        self.scroll || self.resize
    }
}

/// Rate limiting for scroll and resize input.
///
/// Time is supplied by the host (`now_ms`). Scroll uses a trailing-edge throttle: the first event
/// of a burst arms a timer and later events ride along until it fires. Resize uses a
/// trailing-edge debounce: every event pushes the deadline back.
#[derive(Clone, Debug)]
pub(crate) struct EventCoordinator {
    scroll_delay_ms: u64,
    resize_delay_ms: u64,
    scroll_deadline: Option<u64>,
    resize_deadline: Option<u64>,
    // Zero-delay work, due on the next tick.
    render_queued: bool,
    measure_queued: bool,
    scroll_events: u64,
}

impl EventCoordinator {
    pub(crate) fn new(scroll_delay_ms: u64, resize_delay_ms: u64) -> Self {
        Self {
            scroll_delay_ms,
            resize_delay_ms,
            scroll_deadline: None,
            resize_deadline: None,
            render_queued: false,
            measure_queued: false,
            scroll_events: 0,
        }
    }

    pub(crate) fn scroll_events(&self) -> u64 {
        self.scroll_events
    }

    pub(crate) fn on_scroll(&mut self, now_ms: u64) {
        self.scroll_events = self.scroll_events.saturating_add(1);
        if self.scroll_deadline.is_none() {
            self.scroll_deadline = Some(now_ms.saturating_add(self.scroll_delay_ms));
        }
    }

    pub(crate) fn on_resize(&mut self, now_ms: u64) {
        self.resize_deadline = Some(now_ms.saturating_add(self.resize_delay_ms));
    }

    pub(crate) fn queue_render(&mut self) {
        self.render_queued = true;
    }

    pub(crate) fn take_render(&mut self) -> bool {
        core::mem::take(&mut self.render_queued)
    }

    pub(crate) fn queue_measure(&mut self) {
        self.measure_queued = true;
    }

    pub(crate) fn take_measure(&mut self) -> bool {
        core::mem::take(&mut self.measure_queued)
    }

    /// Consumes the timers that have expired at `now_ms`.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Due {
        Due {
            scroll: take_if_due(&mut self.scroll_deadline, now_ms),
            resize: take_if_due(&mut self.resize_deadline, now_ms),
        }
    }

    /// Earliest time the host should call `tick`. Queued zero-delay work is due immediately.
    pub(crate) fn next_deadline(&self, now_ms: u64) -> Option<u64> {
        let timers = match (self.scroll_deadline, self.resize_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if self.render_queued || self.measure_queued {
            return Some(timers.map_or(now_ms, |t| t.min(now_ms)));
        }
        timers
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.scroll_deadline.is_some()
            || self.resize_deadline.is_some()
            || self.render_queued
            || self.measure_queued
    }

    pub(crate) fn cancel_all(&mut self) {
        self.scroll_deadline = None;
        self.resize_deadline = None;
        self.render_queued = false;
        self.measure_queued = false;
    }
}

fn take_if_due(deadline: &mut Option<u64>, now_ms: u64) -> bool {
    match *deadline {
        Some(at) if now_ms >= at => {
            *deadline = None;
            true
        }
        _ => false,
    }
}
