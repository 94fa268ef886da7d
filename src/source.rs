use crate::RenderError;

/// The data + template capability the engine renders from.
///
/// Contract:
/// - `get_item` is a pure lookup. `None` means "not loaded yet": the row is skipped for this pass
///   and retried on a later one.
/// - `render_item` is deterministic for a given `(item, index)` and must not touch engine state.
///   An `Err` only affects that row; it is counted in [`crate::Metrics`].
pub trait ItemSource {
    type Item;
    type View;

    fn get_item(&self, index: usize) -> Option<Self::Item>;

    fn render_item(&self, item: &Self::Item, index: usize) -> Result<Self::View, RenderError>;
}

/// An [`ItemSource`] made of two closures.
///
/// ```
/// use virtual_list::{FnSource, ItemSource};
///
/// let source = FnSource::new(
///     |i| (i < 100).then(|| format!("post #{i}")),
///     |post: &String, _| Ok(post.to_uppercase()),
/// );
/// assert_eq!(source.get_item(7).as_deref(), Some("post #7"));
/// assert!(source.get_item(100).is_none());
/// ```
pub struct FnSource<G, R> {
    get_item: G,
    render_item: R,
}

impl<G, R> FnSource<G, R> {
    pub fn new<T, V>(get_item: G, render_item: R) -> Self
    where
        G: Fn(usize) -> Option<T>,
        R: Fn(&T, usize) -> Result<V, RenderError>,
    {
        Self {
            get_item,
            render_item,
        }
    }
}

impl<T, V, G, R> ItemSource for FnSource<G, R>
where
    G: Fn(usize) -> Option<T>,
    R: Fn(&T, usize) -> Result<V, RenderError>,
{
    type Item = T;
    type View = V;

    fn get_item(&self, index: usize) -> Option<T> {
        (self.get_item)(index)
    }

    fn render_item(&self, item: &T, index: usize) -> Result<V, RenderError> {
        (self.render_item)(item, index)
    }
}

impl<G, R> core::fmt::Debug for FnSource<G, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnSource(..)")
    }
}
