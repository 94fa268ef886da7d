use std::collections::{BTreeMap, BTreeSet};

use crate::{FailureKind, ItemFailure, ItemSource, NodeId, RenderWindow, Surface};

/// Counters for one reconcile pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct PassStats {
    pub(crate) recycled: u64,
    pub(crate) created: u64,
    pub(crate) pooled: u64,
    pub(crate) skipped: u64,
    pub(crate) failed: u64,
    pub(crate) last_failure: Option<ItemFailure>,
}

/// Owns the index → node arena.
///
/// Only this type inserts into or removes from the live map. Nodes leaving the window go to a
/// bounded free pool and are handed to the next index that needs a fresh node.
#[derive(Debug)]
pub(crate) struct NodeRecycler {
    live: BTreeMap<usize, NodeId>,
    free: Vec<NodeId>,
    // Indexes whose node must be re-populated (or that still have none) on the next pass.
    pending: BTreeSet<usize>,
    next_id: u64,
    pool_limit: usize,
}

impl NodeRecycler {
    pub(crate) fn new(pool_limit: usize) -> Self {
        Self {
            live: BTreeMap::new(),
            free: Vec::new(),
            pending: BTreeSet::new(),
            next_id: 1,
            pool_limit,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn pool_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn node_for(&self, index: usize) -> Option<NodeId> {
        self.live.get(&index).copied()
    }

    /// Whether `node` still renders `index`. Used to drop stale measurement callbacks.
    pub(crate) fn tracks(&self, index: usize, node: NodeId) -> bool {
        self.live.get(&index) == Some(&node)
    }

    pub(crate) fn live(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.live.iter().map(|(&i, &n)| (i, n))
    }

    pub(crate) fn invalidate(&mut self, index: usize) {
        self.pending.insert(index);
    }

    pub(crate) fn has_pending_in(&self, window: RenderWindow) -> bool {
        self.pending.range(window.indexes()).next().is_some()
    }

    /// Detaches every node outside `window`.
    pub(crate) fn release_outside<S: Surface>(
        &mut self,
        window: RenderWindow,
        surface: &mut S,
        observing: bool,
    ) {
        let leaving: Vec<(usize, NodeId)> = self
            .live
            .iter()
            .filter(|(i, _)| !window.contains(**i))
            .map(|(&i, &n)| (i, n))
            .collect();
        for (index, node) in leaving {
            self.live.remove(&index);
            self.release(node, surface, observing);
        }
        self.pending.retain(|i| window.contains(*i));
    }

    /// Makes every index in `window` either live or pending.
    ///
    /// Returns the pass counters; `populated` receives the `(index, node)` pairs whose content was
    /// (re)installed and therefore needs measuring.
    pub(crate) fn fill<S, D>(
        &mut self,
        window: RenderWindow,
        surface: &mut S,
        source: &D,
        observing: bool,
        populated: &mut Vec<(usize, NodeId)>,
    ) -> PassStats
    where
        S: Surface,
        D: ItemSource<View = S::View>,
    {
        let mut stats = PassStats::default();
        for index in window.indexes() {
            let existing = self.live.get(&index).copied();
            if existing.is_some() && !self.pending.contains(&index) {
                stats.recycled += 1;
                continue;
            }

            let Some(item) = source.get_item(index) else {
                stats.skipped += 1;
                if let Some(node) = self.live.remove(&index) {
                    self.release(node, surface, observing);
                }
                self.pending.insert(index);
                continue;
            };

            match source.render_item(&item, index) {
                Ok(view) => {
                    let node = match existing {
                        Some(node) => node,
                        None => self.acquire(surface, &mut stats),
                    };
                    surface.populate(node, index, view);
                    self.live.insert(index, node);
                    self.pending.remove(&index);
                    populated.push((index, node));
                }
                Err(err) => {
                    vwarn!(index, reason = %err, "render_item failed");
                    stats.failed += 1;
                    stats.last_failure = Some(ItemFailure {
                        index,
                        kind: FailureKind::Render,
                        reason: err.reason,
                    });
                    // Keep whatever was shown before; retry next pass.
                    self.pending.insert(index);
                }
            }
        }
        stats
    }

    /// Releases every node and empties the pool.
    pub(crate) fn clear<S: Surface>(&mut self, surface: &mut S, observing: bool) {
        for (_, node) in core::mem::take(&mut self.live) {
            if observing {
                surface.unobserve(node);
            }
            surface.detach(node);
            surface.destroy_node(node);
        }
        for node in self.free.drain(..) {
            surface.destroy_node(node);
        }
        self.pending.clear();
    }

    fn acquire<S: Surface>(&mut self, surface: &mut S, stats: &mut PassStats) -> NodeId {
        if let Some(node) = self.free.pop() {
            stats.pooled += 1;
            return node;
        }
        let node = NodeId(self.next_id);
        self.next_id += 1;
        surface.create_node(node);
        stats.created += 1;
        node
    }

    fn release<S: Surface>(&mut self, node: NodeId, surface: &mut S, observing: bool) {
        if observing {
            surface.unobserve(node);
        }
        surface.detach(node);
        if self.free.len() < self.pool_limit {
            self.free.push(node);
        } else {
            surface.destroy_node(node);
        }
    }
}
