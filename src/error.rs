use thiserror::Error;

/// Construction-time configuration errors. These are the only errors the engine returns.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("scroll container is not connected")]
    DetachedContainer,
    #[error("fixed item height must be greater than zero")]
    ZeroItemHeight,
    #[error("estimated item height must be greater than zero")]
    ZeroEstimatedHeight,
}

/// Failure reported by [`crate::ItemSource::render_item`] for a single index.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// What failed while rendering or measuring an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    Render,
    Measure,
}

/// The most recent per-item failure, surfaced through [`crate::Metrics`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemFailure {
    pub index: usize,
    pub kind: FailureKind,
    pub reason: String,
}
