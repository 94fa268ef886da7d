use crate::RenderWindow;

/// Keys handled by the roving-tabindex controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
}

impl NavKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(key: &str) -> Option<Self> {
        Some(match key {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => return None,
        })
    }

    /// Target index for a move from `current`, clamped to `[0, count)`.
    pub(crate) fn target(self, current: usize, count: usize, page: usize) -> Option<usize> {
        let last = count.checked_sub(1)?;
        let target = match self {
            Self::ArrowUp => current.saturating_sub(1),
            Self::ArrowDown => current.saturating_add(1),
            Self::PageUp => current.saturating_sub(page),
            Self::PageDown => current.saturating_add(page),
            Self::Home => 0,
            Self::End => last,
        };
        Some(target.min(last))
    }
}

/// Keyboard focus transitions: `Focused(i) -> Scrolling -> Rendered -> Focused(j)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusState {
    /// Nothing to focus (empty list).
    #[default]
    Unfocused,
    Focused(usize),
    /// The target was off-screen; `scroll_top` has been moved to it.
    Scrolling { target: usize },
    /// The target's row exists; DOM focus is about to move.
    Rendered { target: usize },
}

/// Tracks the roving focus index.
#[derive(Clone, Debug, Default)]
pub(crate) struct FocusController {
    focused: Option<usize>,
    state: FocusState,
}

impl FocusController {
    pub(crate) fn new(count: usize) -> Self {
        let mut c = Self::default();
        c.clamp(count);
        c
    }

    pub(crate) fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub(crate) fn state(&self) -> FocusState {
        self.state
    }

    pub(crate) fn begin_scroll(&mut self, target: usize) {
        self.focused = Some(target);
        self.state = FocusState::Scrolling { target };
    }

    pub(crate) fn rendered(&mut self, target: usize) {
        self.focused = Some(target);
        self.state = FocusState::Rendered { target };
    }

    pub(crate) fn settle(&mut self, target: usize) {
        self.focused = Some(target);
        self.state = FocusState::Focused(target);
    }

    /// Keeps the focus index valid after the item count changes.
    pub(crate) fn clamp(&mut self, count: usize) {
        match count.checked_sub(1) {
            None => {
                self.focused = None;
                self.state = FocusState::Unfocused;
            }
            Some(last) => {
                let index = self.focused.map_or(0, |i| i.min(last));
                self.focused = Some(index);
                self.state = FocusState::Focused(index);
            }
        }
    }

    /// The row that carries `tabindex="0"`: the focused one when rendered, else the first row.
    pub(crate) fn tab_stop(
        &self,
        window: RenderWindow,
        is_live: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        match self.focused {
            Some(i) if window.contains(i) && is_live(i) => Some(i),
            _ => window.indexes().find(|&i| is_live(i)),
        }
    }
}

/// Live-region text for a visible range. `None` for an empty range.
pub(crate) fn announcement(visible: RenderWindow, total: usize) -> Option<String> {
    if visible.is_empty() {
        return None;
    }
    Some(format!(
        "Showing items {} to {} of {}",
        visible.start_index + 1,
        visible.end_index,
        total
    ))
}
