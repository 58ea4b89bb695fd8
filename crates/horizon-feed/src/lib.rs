//! Horizon Feed - snapshot-based list synchronization and a paged colour feed.
//!
//! The crate is built around [`Snapshot`]: an ordered set of sections, each
//! holding an ordered sequence of unique item identifiers. Handing a new
//! snapshot to a [`ListSynchronizer`] diffs it against the one on display by
//! identity and emits the resulting [`SnapshotDiff`] (inserts, removes, moves
//! and reloads) to whoever renders the list.
//!
//! On top of that sit the pieces a list view needs:
//!
//! - [`DiffableDataSource`]: synchronizer plus cell and prefetch hooks
//! - [`ReusePool`]: recycles cells as they scroll out of view
//! - [`PrefetchScheduler`]: announces rows shortly before they become visible
//! - [`PagingLayout`]: one full-viewport item per page
//! - [`FeedController`]: all of the above driving 201 random [`Color`]s
//!
//! # Example
//!
//! ```
//! use horizon_feed::{ListSynchronizer, Snapshot};
//!
//! let sync = ListSynchronizer::new();
//!
//! let mut snapshot = Snapshot::new();
//! snapshot.append_sections(["main"]);
//! snapshot.append_items(["a", "b", "c"]).unwrap();
//! sync.apply(snapshot, false).unwrap();
//!
//! let mut next = sync.snapshot();
//! next.move_item_before(&"c", &"a").unwrap();
//! let diff = sync.apply(next, true).unwrap();
//!
//! assert!(diff.inserted.is_empty());
//! assert_eq!(diff.minimal_moves().len(), 1);
//! ```

pub use horizon_feed_core::*;

pub mod color;
pub mod config;
pub mod data_source;
pub mod diff;
pub mod error;
pub mod feed;
pub mod index;
pub mod layout;
pub mod prefetch;
pub mod reuse;
pub mod snapshot;
pub mod synchronizer;

pub use color::{Color, ColorGenerator};
pub use config::FeedConfig;
pub use data_source::{CancelPrefetchHandler, CellProvider, DiffableDataSource, PrefetchHandler};
pub use diff::{DiffSummary, ItemChange, ItemMove, SectionChange, SectionMove, SnapshotDiff};
pub use error::{FeedError, IdentifierScope, Result};
pub use feed::{
    CELL_REUSE_TAG, ColorCell, FeedController, FeedDataSource, FeedSection, FeedSnapshot,
    RenderPass, VisibleCell,
};
pub use index::IndexPath;
pub use layout::{Axis, PagingLayout, Point, Rect, Size};
pub use prefetch::{PrefetchScheduler, PrefetchStrategy, PrefetchUpdate, ScrollDirection};
pub use reuse::{Factory, ReusePool};
pub use snapshot::{Identifier, Snapshot};
pub use synchronizer::{AppliedUpdate, ListSynchronizer, SynchronizerSignals};
