//! A headless, full-screen paged feed of random colours.
//!
//! [`FeedController`] plays the role of a collection view controller: it owns a
//! [`DiffableDataSource`] whose items are [`Color`]s in a single
//! [`FeedSection::Main`], lays one cell per page out with a [`PagingLayout`],
//! recycles cells through a [`ReusePool`] as pages scroll in and out, and
//! announces upcoming pages through a [`PrefetchScheduler`].
//!
//! Nothing is painted. Configured cells, frames and render passes are plain
//! data, so a real renderer (or a test) can consume them.
//!
//! # Example
//!
//! ```
//! use horizon_feed::{FeedConfig, FeedController, Size};
//!
//! let mut feed = FeedController::new(FeedConfig { seed: Some(1), ..FeedConfig::default() });
//! feed.set_viewport(Size::new(390.0, 844.0)).unwrap();
//! feed.load().unwrap();
//!
//! assert_eq!(feed.page_count(), 201);
//! assert_eq!(feed.visible_cells().len(), 1);
//!
//! feed.scroll_to_page(3).unwrap();
//! assert_eq!(feed.current_page(), 3);
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use horizon_feed_core::{OutlineFormatOptions, PerfSpan, TreeStyle};
use horizon_feed_core::logging::{span_names, targets};
use parking_lot::Mutex;

use crate::color::{Color, ColorGenerator};
use crate::config::FeedConfig;
use crate::data_source::DiffableDataSource;
use crate::diff::{DiffSummary, SnapshotDiff};
use crate::error::Result;
use crate::index::IndexPath;
use crate::layout::{PagingLayout, Rect, Size};
use crate::prefetch::{PrefetchScheduler, PrefetchUpdate, ScrollDirection};
use crate::reuse::ReusePool;
use crate::snapshot::Snapshot;

const TRACE_OUTLINE: OutlineFormatOptions = OutlineFormatOptions {
    style: TreeStyle::Compact,
    show_counts: true,
    max_children: Some(8),
};

/// Reuse tag under which colour cells are pooled.
pub const CELL_REUSE_TAG: &str = "ColorCell";

/// Sections of the feed. There is only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedSection {
    /// The full-screen colour pages.
    Main,
}

/// Snapshot type of the feed.
pub type FeedSnapshot = Snapshot<FeedSection, Color>;

/// Data source type of the feed. The cell provider can fail to dequeue.
pub type FeedDataSource = DiffableDataSource<FeedSection, Color, Result<ColorCell>>;

/// A recyclable cell showing one colour.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCell {
    id: u64,
    background: Option<Color>,
    index_path: Option<IndexPath>,
    configure_count: usize,
}

impl ColorCell {
    fn new(id: u64) -> Self {
        Self {
            id,
            background: None,
            index_path: None,
            configure_count: 0,
        }
    }

    /// Identity of the underlying cell object; survives reuse.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Background colour, once configured.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Index path the cell was last configured for.
    pub fn index_path(&self) -> Option<IndexPath> {
        self.index_path
    }

    /// How many times this cell object has been configured.
    pub fn configure_count(&self) -> usize {
        self.configure_count
    }

    fn configure(&mut self, index_path: IndexPath, color: Color) {
        self.background = Some(color);
        self.index_path = Some(index_path);
        self.configure_count += 1;
    }

    fn prepare_for_reuse(&mut self) {
        self.background = None;
        self.index_path = None;
    }
}

/// A cell placed on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCell {
    /// Where the item is in the displayed snapshot.
    pub index_path: IndexPath,
    /// The item shown.
    pub item: Color,
    /// Frame in content coordinates.
    pub frame: Rect,
    /// The configured cell.
    pub cell: ColorCell,
}

/// One apply as the renderer would have performed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPass {
    /// Synchronizer generation reached by the apply.
    pub generation: u64,
    /// Change counts.
    pub summary: DiffSummary,
    /// Whether the transition is animated.
    pub animated: bool,
    /// Animation length; zero when not animated.
    pub animation_duration: Duration,
    /// The apply discarded all state instead of diffing.
    pub reloaded_data: bool,
}

/// Headless controller for the colour feed.
pub struct FeedController {
    config: FeedConfig,
    data_source: FeedDataSource,
    pool: Arc<ReusePool<ColorCell>>,
    generator: ColorGenerator,
    layout: PagingLayout,
    prefetcher: PrefetchScheduler,
    offset: f32,
    direction: ScrollDirection,
    visible: Vec<VisibleCell>,
    render_passes: Arc<Mutex<Vec<RenderPass>>>,
    last_prefetch: PrefetchUpdate,
}

impl FeedController {
    /// Creates a controller with nothing loaded and an empty viewport.
    pub fn new(config: FeedConfig) -> Self {
        let pool = Arc::new(ReusePool::new(config.max_reusable_cells));
        let next_cell_id = AtomicU64::new(1);
        pool.register(CELL_REUSE_TAG, move || {
            ColorCell::new(next_cell_id.fetch_add(1, Ordering::Relaxed))
        });

        let provider_pool = Arc::clone(&pool);
        let data_source = DiffableDataSource::new(
            move |index_path: &IndexPath, color: &Color| -> Result<ColorCell> {
                let mut cell = provider_pool.dequeue(CELL_REUSE_TAG)?;
                tracing::debug!(target: targets::FEED, %index_path, cell = cell.id(), "configure cell");
                cell.configure(*index_path, *color);
                Ok(cell)
            },
        )
        .with_prefetch_handler(|index_paths, _| {
            tracing::debug!(target: targets::FEED, index_paths = ?index_paths, "prefetch cells");
        })
        .with_cancel_prefetch_handler(|index_paths, _| {
            tracing::debug!(target: targets::FEED, index_paths = ?index_paths, "cancel prefetch");
        });

        let render_passes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&render_passes);
        let duration = config.animation_duration();
        data_source.signals().did_apply.connect(move |update| {
            sink.lock().push(RenderPass {
                generation: update.generation,
                summary: update.diff.summary(),
                animated: update.animate,
                animation_duration: if update.animate { duration } else { Duration::ZERO },
                reloaded_data: update.reloaded_data,
            });
        });

        let generator = match config.seed {
            Some(seed) => ColorGenerator::seeded(seed),
            None => ColorGenerator::new(),
        };
        let layout = PagingLayout::new(Size::ZERO, config.axis);
        tracing::info!(
            target: targets::FEED,
            axis = ?config.axis,
            prefetch = ?config.prefetch_strategy(),
            "collection layout: full-bleed paging, no spacing"
        );

        Self {
            prefetcher: PrefetchScheduler::new(config.prefetch_strategy()),
            config,
            data_source,
            pool,
            generator,
            layout,
            offset: 0.0,
            direction: ScrollDirection::Forward,
            visible: Vec::new(),
            render_passes,
            last_prefetch: PrefetchUpdate::default(),
        }
    }

    /// Generates the initial colours and shows them without animation.
    pub fn load(&mut self) -> Result<Arc<SnapshotDiff<FeedSection, Color>>> {
        let _span = PerfSpan::new("feed.load");
        let snapshot = self.random_snapshot();
        self.apply_snapshot(snapshot, false)
    }

    /// Replaces every colour with a fresh random one.
    pub fn refresh(&mut self, animate: bool) -> Result<Arc<SnapshotDiff<FeedSection, Color>>> {
        let snapshot = self.random_snapshot();
        self.apply_snapshot(snapshot, animate)
    }

    /// Reorders the current colours, keeping their identity.
    pub fn shuffle(&mut self, animate: bool) -> Result<Arc<SnapshotDiff<FeedSection, Color>>> {
        let mut items = self.data_source.snapshot().item_identifiers();
        self.generator.shuffle(&mut items);
        self.apply_snapshot(Self::snapshot_of(items), animate)
    }

    /// Shows the current colours again, discarding and rebuilding every cell.
    pub fn reload_data(&mut self) -> Result<Arc<SnapshotDiff<FeedSection, Color>>> {
        let diff = self.data_source.apply_reloading(self.data_source.snapshot())?;
        self.prefetcher.reset();
        self.layout_visible_cells(|_| true)?;
        self.announce_prefetch();
        Ok(diff)
    }

    /// Resizes the viewport, staying on the current page.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<()> {
        let page = self.current_page();
        let (previous_viewport, previous_offset) = (self.layout.viewport(), self.offset);
        self.layout.set_viewport(viewport);
        self.offset = self.layout.offset_for_page(page, self.page_count());
        tracing::debug!(target: targets::FEED, ?viewport, page, "viewport changed");
        if let Err(err) = self.layout_visible_cells(|_| false) {
            self.layout.set_viewport(previous_viewport);
            self.offset = previous_offset;
            return Err(err);
        }
        self.announce_prefetch();
        Ok(())
    }

    /// Scrolls to `offset` along the paging axis, clamped to the content.
    pub fn scroll_to(&mut self, offset: f32) -> Result<()> {
        let offset = self.layout.clamp_offset(offset, self.page_count());
        let (previous_offset, previous_direction) = (self.offset, self.direction);
        if let Some(direction) = ScrollDirection::between(self.offset, offset) {
            self.direction = direction;
        }
        self.offset = offset;
        if let Err(err) = self.layout_visible_cells(|_| false) {
            self.offset = previous_offset;
            self.direction = previous_direction;
            return Err(err);
        }
        self.announce_prefetch();
        Ok(())
    }

    /// Scrolls so that `page` fills the viewport.
    pub fn scroll_to_page(&mut self, page: usize) -> Result<()> {
        self.scroll_to(self.layout.offset_for_page(page, self.page_count()))
    }

    /// Cells currently on screen, in display order.
    pub fn visible_cells(&self) -> &[VisibleCell] {
        &self.visible
    }

    /// Every apply performed so far.
    pub fn render_passes(&self) -> Vec<RenderPass> {
        self.render_passes.lock().clone()
    }

    /// Page nearest to the scroll offset.
    pub fn current_page(&self) -> usize {
        self.layout.page_for_offset(self.offset, self.page_count())
    }

    /// Number of pages, one per item.
    pub fn page_count(&self) -> usize {
        self.data_source
            .synchronizer()
            .with_snapshot(|s| s.number_of_items())
    }

    /// Scroll offset along the paging axis.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// The feed's data source.
    pub fn data_source(&self) -> &FeedDataSource {
        &self.data_source
    }

    /// The cell reuse pool.
    pub fn reuse_pool(&self) -> &ReusePool<ColorCell> {
        &self.pool
    }

    /// The layout in use.
    pub fn layout(&self) -> &PagingLayout {
        &self.layout
    }

    /// The configuration the controller was created with.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Announcements made by the most recent layout pass.
    pub fn last_prefetch(&self) -> &PrefetchUpdate {
        &self.last_prefetch
    }

    fn random_snapshot(&mut self) -> FeedSnapshot {
        Self::snapshot_of(self.generator.generate(self.config.item_count))
    }

    fn snapshot_of(items: Vec<Color>) -> FeedSnapshot {
        Snapshot::from_sections([(FeedSection::Main, items)])
    }

    fn apply_snapshot(
        &mut self,
        snapshot: FeedSnapshot,
        animate: bool,
    ) -> Result<Arc<SnapshotDiff<FeedSection, Color>>> {
        if tracing::enabled!(target: targets::FEED, tracing::Level::TRACE) {
            let outline = snapshot.outline();
            tracing::trace!(
                target: targets::FEED,
                sections = outline.group_count(),
                outline = %outline.format(&TRACE_OUTLINE),
                "applying"
            );
        }
        let diff = self.data_source.apply(snapshot, animate)?;

        // Announced ordinals may now hold other items.
        if !diff.is_empty() {
            self.prefetcher.reset();
        }
        self.offset = self.layout.clamp_offset(self.offset, self.page_count());

        let reloaded: HashSet<Color> = diff.reloaded_items().into_iter().copied().collect();
        self.layout_visible_cells(|item| reloaded.contains(item))?;
        self.announce_prefetch();
        Ok(diff)
    }

    /// Brings the on-screen cells in line with the displayed snapshot and the
    /// scroll offset. Cells whose item left the viewport, or for which `stale`
    /// returns `true`, go back to the pool; uncovered pages get new cells.
    ///
    /// New cells are all dequeued before anything is released. If one cannot
    /// be provided, the ones already taken return to the pool and the visible
    /// cells stay as they were.
    fn layout_visible_cells(&mut self, stale: impl Fn(&Color) -> bool) -> Result<usize> {
        let _span = tracing::trace_span!(target: targets::FEED, span_names::LAYOUT).entered();
        let snapshot = self.data_source.snapshot();
        let range = self.layout.visible_range(self.offset, snapshot.number_of_items());
        let keep = |visible: &VisibleCell| {
            snapshot
                .index_path_of(&visible.item)
                .filter(|path| range.contains(&path.item) && !stale(&visible.item))
        };

        let kept: HashSet<usize> = self
            .visible
            .iter()
            .filter_map(|visible| keep(visible))
            .map(|path| path.item)
            .collect();

        let mut placed = Vec::with_capacity(range.len());
        for ordinal in range.clone() {
            if kept.contains(&ordinal) {
                continue;
            }
            let index_path = IndexPath::new(0, ordinal);
            let Some(item) = snapshot.item_at(index_path).copied() else {
                continue;
            };
            match self.data_source.cell_for(index_path).and_then(|cell| cell) {
                Ok(cell) => placed.push(VisibleCell {
                    index_path,
                    item,
                    frame: self.layout.frame_for(ordinal),
                    cell,
                }),
                Err(err) => {
                    tracing::warn!(target: targets::FEED, %index_path, error = %err, "cell unavailable, layout unchanged");
                    for visible in placed {
                        self.release(visible.cell);
                    }
                    return Err(err);
                }
            }
        }
        let configured = placed.len();

        for mut visible in std::mem::take(&mut self.visible) {
            match keep(&visible) {
                Some(path) => {
                    visible.index_path = path;
                    visible.frame = self.layout.frame_for(path.item);
                    placed.push(visible);
                }
                None => self.release(visible.cell),
            }
        }

        placed.sort_by_key(|v| v.index_path);
        self.visible = placed;
        if configured > 0 {
            tracing::trace!(target: targets::FEED, configured, visible = self.visible.len(), "laid out cells");
        }
        Ok(configured)
    }

    fn release(&self, mut cell: ColorCell) {
        cell.prepare_for_reuse();
        if !self.pool.enqueue(CELL_REUSE_TAG, cell) {
            tracing::trace!(target: targets::FEED, "reuse pool full, dropped cell");
        }
    }

    fn announce_prefetch(&mut self) {
        let count = self.page_count();
        let visible = self.layout.visible_range(self.offset, count);
        if visible.is_empty() {
            self.last_prefetch = PrefetchUpdate::default();
            return;
        }

        let update = self.prefetcher.update(visible, count, self.direction);
        let paths = |rows: &[usize]| rows.iter().map(|&row| IndexPath::new(0, row)).collect::<Vec<_>>();
        if !update.cancel.is_empty() {
            self.data_source.cancel_prefetch(&paths(update.cancel.as_slice()));
        }
        if !update.prefetch.is_empty() {
            self.data_source.prefetch(&paths(update.prefetch.as_slice()));
        }
        self.last_prefetch = update;
    }
}
