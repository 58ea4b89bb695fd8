//! Diffable data source: a synchronizer plus the hooks a list view calls back.
//!
//! A list view needs three things from its data source: how many items there
//! are, a configured cell for an index path, and optionally early notice of
//! rows about to scroll in. [`DiffableDataSource`] answers the first from the
//! retained snapshot and delegates the others to functions supplied at
//! construction:
//!
//! - [`CellProvider`]: builds or configures the cell for one row
//! - [`PrefetchHandler`]: warms up rows that will become visible
//! - [`CancelPrefetchHandler`]: withdraws a prefetch that is no longer useful
//!
//! # Example
//!
//! ```
//! use horizon_feed::{DiffableDataSource, IndexPath, Snapshot};
//!
//! let source: DiffableDataSource<u8, &str, String> =
//!     DiffableDataSource::new(|path, name| format!("{path}: {name}"));
//!
//! source
//!     .apply(Snapshot::from_sections([(0, vec!["ruby", "jade"])]), false)
//!     .unwrap();
//!
//! assert_eq!(source.cell_for(IndexPath::new(0, 1)).unwrap(), "[0, 1]: jade");
//! ```

use std::sync::Arc;

use horizon_feed_core::logging::targets;

use crate::diff::SnapshotDiff;
use crate::error::{FeedError, Result};
use crate::index::IndexPath;
use crate::snapshot::{Identifier, Snapshot};
use crate::synchronizer::{ListSynchronizer, SynchronizerSignals};

/// Type alias for the function that produces a cell for a row.
pub type CellProvider<I, C> = Arc<dyn Fn(&IndexPath, &I) -> C + Send + Sync>;

/// Type alias for the function told about rows that will become visible.
pub type PrefetchHandler<I> = Arc<dyn Fn(&[IndexPath], &[I]) + Send + Sync>;

/// Type alias for the function told that earlier prefetches are withdrawn.
pub type CancelPrefetchHandler<I> = Arc<dyn Fn(&[IndexPath], &[I]) + Send + Sync>;

/// A list synchronizer bundled with cell and prefetch hooks.
pub struct DiffableDataSource<S: Identifier, I: Identifier, C> {
    synchronizer: ListSynchronizer<S, I>,
    cell_provider: CellProvider<I, C>,
    prefetch_handler: Option<PrefetchHandler<I>>,
    cancel_prefetch_handler: Option<CancelPrefetchHandler<I>>,
}

impl<S: Identifier, I: Identifier, C> DiffableDataSource<S, I, C> {
    /// Creates a data source with the given cell provider and no prefetching.
    pub fn new<F>(cell_provider: F) -> Self
    where
        F: Fn(&IndexPath, &I) -> C + Send + Sync + 'static,
    {
        Self {
            synchronizer: ListSynchronizer::new(),
            cell_provider: Arc::new(cell_provider),
            prefetch_handler: None,
            cancel_prefetch_handler: None,
        }
    }

    /// Sets the prefetch handler.
    pub fn with_prefetch_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[IndexPath], &[I]) + Send + Sync + 'static,
    {
        self.prefetch_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the handler for withdrawn prefetches.
    pub fn with_cancel_prefetch_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[IndexPath], &[I]) + Send + Sync + 'static,
    {
        self.cancel_prefetch_handler = Some(Arc::new(handler));
        self
    }

    /// The underlying synchronizer.
    pub fn synchronizer(&self) -> &ListSynchronizer<S, I> {
        &self.synchronizer
    }

    /// Shorthand for the synchronizer's signals.
    pub fn signals(&self) -> &SynchronizerSignals<S, I> {
        self.synchronizer.signals()
    }

    /// Applies `snapshot`; see [`ListSynchronizer::apply`].
    pub fn apply(&self, snapshot: Snapshot<S, I>, animate: bool) -> Result<Arc<SnapshotDiff<S, I>>> {
        self.synchronizer.apply(snapshot, animate)
    }

    /// Replaces everything; see [`ListSynchronizer::apply_reloading`].
    pub fn apply_reloading(&self, snapshot: Snapshot<S, I>) -> Result<Arc<SnapshotDiff<S, I>>> {
        self.synchronizer.apply_reloading(snapshot)
    }

    /// A copy of the displayed snapshot.
    pub fn snapshot(&self) -> Snapshot<S, I> {
        self.synchronizer.snapshot()
    }

    /// Number of sections on display.
    pub fn number_of_sections(&self) -> usize {
        self.synchronizer.with_snapshot(|s| s.number_of_sections())
    }

    /// Number of items on display in the section at `section`.
    pub fn number_of_items_in_section(&self, section: usize) -> usize {
        self.synchronizer.with_snapshot(|s| {
            s.sections()
                .nth(section)
                .map_or(0, |(_, items)| items.len())
        })
    }

    /// The item displayed at `index_path`.
    pub fn item_identifier(&self, index_path: IndexPath) -> Option<I> {
        self.synchronizer
            .with_snapshot(|s| s.item_at(index_path).cloned())
    }

    /// Where `item` is displayed.
    pub fn index_path(&self, item: &I) -> Option<IndexPath> {
        self.synchronizer.with_snapshot(|s| s.index_path_of(item))
    }

    /// Asks the cell provider for the cell at `index_path`.
    ///
    /// The provider runs outside the snapshot lock.
    pub fn cell_for(&self, index_path: IndexPath) -> Result<C> {
        let item = self
            .item_identifier(index_path)
            .ok_or_else(|| FeedError::IndexOutOfBounds {
                index_path: index_path.to_string(),
            })?;
        tracing::trace!(target: targets::DATA_SOURCE, %index_path, item = ?item, "cell requested");
        Ok((self.cell_provider)(&index_path, &item))
    }

    /// Announces rows that will soon become visible.
    ///
    /// Paths that do not address a displayed item are skipped. Returns the
    /// number of rows passed to the handler.
    pub fn prefetch(&self, index_paths: &[IndexPath]) -> usize {
        let Some(handler) = &self.prefetch_handler else {
            return 0;
        };
        let (paths, items) = self.resolve(index_paths);
        if !paths.is_empty() {
            tracing::trace!(target: targets::DATA_SOURCE, count = paths.len(), "prefetch");
            handler(&paths, &items);
        }
        paths.len()
    }

    /// Withdraws earlier prefetch announcements.
    ///
    /// Behaves like [`prefetch`](Self::prefetch) but calls the cancel handler.
    pub fn cancel_prefetch(&self, index_paths: &[IndexPath]) -> usize {
        let Some(handler) = &self.cancel_prefetch_handler else {
            return 0;
        };
        let (paths, items) = self.resolve(index_paths);
        if !paths.is_empty() {
            tracing::trace!(target: targets::DATA_SOURCE, count = paths.len(), "cancel prefetch");
            handler(&paths, &items);
        }
        paths.len()
    }

    fn resolve(&self, index_paths: &[IndexPath]) -> (Vec<IndexPath>, Vec<I>) {
        self.synchronizer.with_snapshot(|s| {
            index_paths
                .iter()
                .filter_map(|&path| s.item_at(path).map(|item| (path, item.clone())))
                .unzip()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn source() -> DiffableDataSource<u8, char, String> {
        let source = DiffableDataSource::new(|path: &IndexPath, item: &char| format!("{item}@{path}"));
        source
            .apply(Snapshot::from_sections([(0, vec!['a', 'b', 'c'])]), false)
            .unwrap();
        source
    }

    #[test]
    fn test_lookups() {
        let source = source();
        assert_eq!(source.number_of_sections(), 1);
        assert_eq!(source.number_of_items_in_section(0), 3);
        assert_eq!(source.number_of_items_in_section(1), 0);
        assert_eq!(source.item_identifier(IndexPath::new(0, 2)), Some('c'));
        assert_eq!(source.item_identifier(IndexPath::new(0, 3)), None);
        assert_eq!(source.index_path(&'b'), Some(IndexPath::new(0, 1)));
        assert_eq!(source.index_path(&'z'), None);
    }

    #[test]
    fn test_cell_for() {
        let source = source();
        assert_eq!(source.cell_for(IndexPath::new(0, 0)).unwrap(), "a@[0, 0]");
        assert!(matches!(
            source.cell_for(IndexPath::new(1, 0)),
            Err(FeedError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_prefetch_resolves_items() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let source = DiffableDataSource::<u8, char, ()>::new(|_, _| ())
            .with_prefetch_handler(move |_, items| seen_clone.lock().extend_from_slice(items));
        source
            .apply(Snapshot::from_sections([(0, vec!['a', 'b'])]), false)
            .unwrap();

        let count = source.prefetch(&[IndexPath::new(0, 1), IndexPath::new(0, 9)]);
        assert_eq!(count, 1);
        assert_eq!(*seen.lock(), vec!['b']);
    }

    #[test]
    fn test_hooks_are_optional() {
        let source = source();
        assert_eq!(source.prefetch(&[IndexPath::new(0, 0)]), 0);
        assert_eq!(source.cancel_prefetch(&[IndexPath::new(0, 0)]), 0);
    }

    #[test]
    fn test_cancel_prefetch() {
        let cancelled = Arc::new(Mutex::new(Vec::new()));
        let cancelled_clone = cancelled.clone();
        let source = DiffableDataSource::<u8, char, ()>::new(|_, _| ())
            .with_cancel_prefetch_handler(move |paths, _| {
                cancelled_clone.lock().extend_from_slice(paths)
            });
        source
            .apply(Snapshot::from_sections([(0, vec!['a', 'b'])]), false)
            .unwrap();

        assert_eq!(source.cancel_prefetch(&[IndexPath::new(0, 0)]), 1);
        assert_eq!(*cancelled.lock(), vec![IndexPath::new(0, 0)]);
    }
}
