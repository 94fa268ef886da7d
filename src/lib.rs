//! A headless virtual list engine.
//!
//! Renders arbitrarily long ordered collections (posts, topic lists, search results) inside a
//! fixed-size scroll container while only materializing the rows near the viewport:
//!
//! - a height store with `O(1)` fixed-height math or an incrementally maintained prefix-sum tree
//!   for variable heights,
//! - an overscanned render window computed from the scroll position,
//! - a node recycler that diffs the window against live nodes and keeps spacer heights exact,
//! - a measurement feedback loop correcting estimated heights from real layout,
//! - throttled scroll / debounced resize handling,
//! - roving-tabindex keyboard navigation and live-region announcements.
//!
//! The engine is UI-agnostic. A host provides a [`Surface`] (the scroll container and its
//! nodes) and an [`ItemSource`] (data lookup + item template); [`HeadlessSurface`] is an
//! in-memory surface for tests and terminal UIs.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod a11y;
mod error;
mod events;
mod fenwick;
mod heights;
mod list;
mod metrics;
mod options;
mod range;
mod recycler;
mod source;
mod surface;
mod types;

pub mod headless;

#[cfg(test)]
mod tests;

pub use a11y::{FocusState, NavKey};
pub use error::{ConfigError, FailureKind, ItemFailure, RenderError};
pub use headless::HeadlessSurface;
pub use list::VirtualList;
pub use metrics::Metrics;
pub use options::VirtualListOptions;
pub use source::{FnSource, ItemSource};
pub use surface::{Frame, FrameRow, GridState, SizeReport, Surface, TabIndex};
pub use types::{Align, Evaluation, NodeId, RenderWindow, ViewportState};
