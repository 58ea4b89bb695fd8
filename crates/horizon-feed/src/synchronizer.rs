//! Snapshot-based list synchronizer.
//!
//! [`ListSynchronizer`] retains the snapshot currently on display. Each
//! [`apply`](ListSynchronizer::apply) validates the incoming snapshot, diffs it
//! against the retained one by identity, swaps it in, and hands the diff to
//! consumers through [`SynchronizerSignals`].
//!
//! # Example
//!
//! ```
//! use horizon_feed::{ListSynchronizer, Snapshot};
//!
//! let sync: ListSynchronizer<u8, &str> = ListSynchronizer::new();
//! sync.signals().did_apply.connect(|update| {
//!     println!("inserted {}", update.diff.inserted.len());
//! });
//!
//! let snapshot = Snapshot::from_sections([(0, vec!["red", "green"])]);
//! let diff = sync.apply(snapshot, false).unwrap();
//! assert_eq!(diff.inserted.len(), 2);
//! assert_eq!(sync.generation(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_feed_core::Signal;
use horizon_feed_core::logging::{span_names, targets};
use parking_lot::{ReentrantMutex, RwLock};

use crate::diff::SnapshotDiff;
use crate::error::Result;
use crate::snapshot::{Identifier, Snapshot};

/// A diff that has been applied, as delivered to consumers.
#[derive(Debug, Clone)]
pub struct AppliedUpdate<S, I> {
    /// The changes from the previous snapshot.
    pub diff: Arc<SnapshotDiff<S, I>>,
    /// Whether the consumer should animate the transition.
    pub animate: bool,
    /// Generation the synchronizer reached with this apply.
    pub generation: u64,
    /// The apply replaced everything without diffing.
    pub reloaded_data: bool,
}

/// Signals emitted by a [`ListSynchronizer`].
pub struct SynchronizerSignals<S: Identifier, I: Identifier> {
    /// Emitted after validation, before the retained snapshot is replaced.
    /// Args: generation about to be reached
    pub will_apply: Signal<u64>,

    /// Emitted once per successful apply, after the retained snapshot is replaced.
    pub did_apply: Signal<AppliedUpdate<S, I>>,
}

impl<S: Identifier, I: Identifier> SynchronizerSignals<S, I> {
    /// Creates a new set of synchronizer signals.
    pub fn new() -> Self {
        Self {
            will_apply: Signal::new(),
            did_apply: Signal::new(),
        }
    }
}

impl<S: Identifier, I: Identifier> Default for SynchronizerSignals<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a displayed collection in sync with a sequence of snapshots.
///
/// The synchronizer is `Send + Sync`. Applies from different threads are
/// serialized as a whole, so each `will_apply`/`did_apply` pair carries its own
/// generation. The retained snapshot lock is released before any signal fires,
/// so slots may read back [`snapshot`](Self::snapshot) freely.
pub struct ListSynchronizer<S: Identifier, I: Identifier> {
    // Held from validation to `did_apply`; reentrant so slots may apply again.
    apply_gate: ReentrantMutex<()>,
    current: RwLock<Snapshot<S, I>>,
    generation: AtomicU64,
    signals: SynchronizerSignals<S, I>,
}

impl<S: Identifier, I: Identifier> ListSynchronizer<S, I> {
    /// Creates a synchronizer displaying nothing.
    pub fn new() -> Self {
        Self {
            apply_gate: ReentrantMutex::new(()),
            current: RwLock::new(Snapshot::new()),
            generation: AtomicU64::new(0),
            signals: SynchronizerSignals::new(),
        }
    }

    /// Returns the signals for this synchronizer.
    pub fn signals(&self) -> &SynchronizerSignals<S, I> {
        &self.signals
    }

    /// Returns a copy of the retained snapshot.
    pub fn snapshot(&self) -> Snapshot<S, I> {
        self.current.read().clone()
    }

    /// Runs `f` against the retained snapshot without cloning it.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&Snapshot<S, I>) -> R) -> R {
        f(&self.current.read())
    }

    /// Number of successful applies so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Makes `snapshot` the displayed state and returns what changed.
    ///
    /// Fails with [`FeedError::DuplicateIdentifier`](crate::FeedError::DuplicateIdentifier)
    /// when a section or item identifier occurs twice; in that case nothing is
    /// retained and no signal fires.
    #[tracing::instrument(
        name = "apply",
        target = "horizon_feed::synchronizer",
        skip(self, snapshot),
        fields(sections = snapshot.number_of_sections(), items = snapshot.number_of_items())
    )]
    pub fn apply(&self, snapshot: Snapshot<S, I>, animate: bool) -> Result<Arc<SnapshotDiff<S, I>>> {
        self.apply_with(snapshot, animate, false)
    }

    /// Replaces the displayed state without computing an incremental diff.
    ///
    /// Consumers receive a diff that removes everything and inserts everything,
    /// and must rebuild from scratch.
    #[tracing::instrument(
        name = "apply_reloading",
        target = "horizon_feed::synchronizer",
        skip(self, snapshot),
        fields(sections = snapshot.number_of_sections(), items = snapshot.number_of_items())
    )]
    pub fn apply_reloading(&self, snapshot: Snapshot<S, I>) -> Result<Arc<SnapshotDiff<S, I>>> {
        self.apply_with(snapshot, false, true)
    }

    fn apply_with(
        &self,
        mut snapshot: Snapshot<S, I>,
        animate: bool,
        reload_data: bool,
    ) -> Result<Arc<SnapshotDiff<S, I>>> {
        let _gate = self.apply_gate.lock();
        if let Err(err) = snapshot.validate() {
            tracing::warn!(target: targets::SYNCHRONIZER, error = %err, "rejected snapshot");
            return Err(err);
        }

        self.signals.will_apply.emit(self.generation() + 1);

        let (diff, generation) = {
            let mut current = self.current.write();
            let diff = {
                let _span = tracing::trace_span!(target: targets::SYNCHRONIZER, span_names::DIFF, reload_data)
                    .entered();
                if reload_data {
                    SnapshotDiff::full_reload(&current, &snapshot)
                } else {
                    SnapshotDiff::between(&current, &snapshot)
                }
            };
            // Reload marks describe a single transition.
            snapshot.clear_reload_marks();
            *current = snapshot;
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            (Arc::new(diff), generation)
        };

        let summary = diff.summary();
        tracing::debug!(
            target: targets::SYNCHRONIZER,
            generation,
            inserted = summary.inserted,
            removed = summary.removed,
            moved = summary.moved,
            reloaded = summary.reloaded,
            sections = summary.section_changes,
            reload_data,
            "applied snapshot"
        );

        self.signals.did_apply.emit(AppliedUpdate {
            diff: Arc::clone(&diff),
            animate,
            generation,
            reloaded_data: reload_data,
        });

        Ok(diff)
    }
}

impl<S: Identifier, I: Identifier> Default for ListSynchronizer<S, I> {
    fn default() -> Self {
        Self::new()
    }
}
