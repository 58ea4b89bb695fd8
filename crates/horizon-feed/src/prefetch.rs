//! Prefetch scheduling for paged lists.
//!
//! Announces rows shortly before they scroll into view so their content can be
//! prepared ahead of time. Announcements are advisory: rows may become visible
//! without ever being announced, and an announcement may never be followed by
//! the row becoming visible. When scrolling reverses, announcements that are no
//! longer ahead of the viewport are withdrawn.

use std::collections::BTreeSet;
use std::ops::Range;

use horizon_feed_core::logging::targets;

/// Default number of rows announced ahead of the viewport.
pub const DEFAULT_PREFETCH_COUNT: usize = 2;

/// Strategy for prefetching rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefetchStrategy {
    /// Number of rows to announce beyond the visible range.
    pub prefetch_count: usize,

    /// Whether prefetching is enabled.
    pub enabled: bool,
}

impl Default for PrefetchStrategy {
    fn default() -> Self {
        Self {
            prefetch_count: DEFAULT_PREFETCH_COUNT,
            enabled: true,
        }
    }
}

impl PrefetchStrategy {
    /// Creates a strategy announcing `prefetch_count` rows ahead.
    pub fn new(prefetch_count: usize) -> Self {
        Self {
            prefetch_count,
            enabled: true,
        }
    }

    /// Disables prefetching.
    pub fn disabled() -> Self {
        Self {
            prefetch_count: 0,
            enabled: false,
        }
    }
}

/// Direction of the most recent scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// Towards higher ordinals.
    #[default]
    Forward,
    /// Towards lower ordinals.
    Backward,
}

impl ScrollDirection {
    /// Direction of a scroll from `previous` to `current` offset.
    ///
    /// Returns `None` if the offset did not change.
    pub fn between(previous: f32, current: f32) -> Option<Self> {
        if current > previous {
            Some(Self::Forward)
        } else if current < previous {
            Some(Self::Backward)
        } else {
            None
        }
    }
}

/// Result of a scheduler update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefetchUpdate {
    /// Newly announced rows, nearest to the viewport first.
    pub prefetch: Vec<usize>,
    /// Previously announced rows that are no longer ahead of the viewport.
    pub cancel: Vec<usize>,
}

impl PrefetchUpdate {
    /// Returns `true` if there is nothing to announce or withdraw.
    pub fn is_empty(&self) -> bool {
        self.prefetch.is_empty() && self.cancel.is_empty()
    }
}

/// Tracks announced rows and decides what to announce next.
#[derive(Debug, Default)]
pub struct PrefetchScheduler {
    strategy: PrefetchStrategy,
    /// Rows announced but not yet visible.
    outstanding: BTreeSet<usize>,
}

impl PrefetchScheduler {
    /// Creates a scheduler with the given strategy.
    pub fn new(strategy: PrefetchStrategy) -> Self {
        Self {
            strategy,
            outstanding: BTreeSet::new(),
        }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> &PrefetchStrategy {
        &self.strategy
    }

    /// Recomputes announcements for the `visible` row range.
    ///
    /// # Arguments
    /// * `visible` - Half-open range of rows intersecting the viewport
    /// * `total_items` - Total number of rows
    /// * `direction` - Direction of the scroll that produced `visible`
    pub fn update(
        &mut self,
        visible: Range<usize>,
        total_items: usize,
        direction: ScrollDirection,
    ) -> PrefetchUpdate {
        // Rows that scrolled in are fulfilled, not cancelled.
        self.outstanding.retain(|row| !visible.contains(row));

        let ahead = if self.strategy.enabled {
            self.rows_ahead(&visible, total_items, direction)
        } else {
            Vec::new()
        };

        let cancel: Vec<usize> = self
            .outstanding
            .iter()
            .copied()
            .filter(|row| !ahead.contains(row))
            .collect();
        let prefetch: Vec<usize> = ahead
            .iter()
            .copied()
            .filter(|row| !self.outstanding.contains(row))
            .collect();

        self.outstanding = ahead.into_iter().collect();

        let update = PrefetchUpdate { prefetch, cancel };
        if !update.is_empty() {
            tracing::trace!(
                target: targets::PREFETCH,
                ?direction,
                prefetch = ?update.prefetch,
                cancel = ?update.cancel,
                "prefetch update"
            );
        }
        update
    }

    fn rows_ahead(&self, visible: &Range<usize>, total_items: usize, direction: ScrollDirection) -> Vec<usize> {
        let count = self.strategy.prefetch_count;
        match direction {
            ScrollDirection::Forward => {
                let start = visible.end.min(total_items);
                let end = visible.end.saturating_add(count).min(total_items);
                (start..end).collect()
            }
            ScrollDirection::Backward => {
                let end = visible.start.min(total_items);
                let start = visible.start.saturating_sub(count);
                (start..end).rev().collect()
            }
        }
    }

    /// Rows announced and not yet visible or withdrawn.
    pub fn outstanding(&self) -> impl Iterator<Item = usize> + '_ {
        self.outstanding.iter().copied()
    }

    /// Returns `true` if `row` has an outstanding announcement.
    pub fn is_outstanding(&self, row: usize) -> bool {
        self.outstanding.contains(&row)
    }

    /// Forgets every announcement without withdrawing it, for when the rows
    /// themselves were replaced.
    pub fn reset(&mut self) {
        self.outstanding.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefetch_forward_scroll() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::new(2));
        let update = scheduler.update(5..11, 100, ScrollDirection::Forward);

        assert_eq!(update.prefetch, vec![11, 12]);
        assert!(update.cancel.is_empty());
    }

    #[test]
    fn test_prefetch_backward_scroll() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::new(2));
        let update = scheduler.update(5..11, 100, ScrollDirection::Backward);

        assert_eq!(update.prefetch, vec![4, 3]);
    }

    #[test]
    fn test_prefetch_at_bounds() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::default());
        assert!(scheduler.update(95..100, 100, ScrollDirection::Forward).is_empty());
        assert!(scheduler.update(0..1, 100, ScrollDirection::Backward).is_empty());
        assert_eq!(scheduler.update(0..1, 2, ScrollDirection::Forward).prefetch, vec![1]);
    }

    #[test]
    fn test_prefetch_disabled() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::disabled());
        assert!(scheduler.update(5..11, 100, ScrollDirection::Forward).is_empty());
    }

    #[test]
    fn test_no_repeat_announcements() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::new(2));
        scheduler.update(0..1, 10, ScrollDirection::Forward);

        // Row 1 scrolls in; only row 3 is new.
        let update = scheduler.update(1..2, 10, ScrollDirection::Forward);
        assert_eq!(update.prefetch, vec![3]);
        assert!(update.cancel.is_empty());
        assert!(!scheduler.is_outstanding(1));
    }

    #[test]
    fn test_reversal_cancels() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::new(2));
        scheduler.update(5..6, 10, ScrollDirection::Forward);

        let update = scheduler.update(4..5, 10, ScrollDirection::Backward);
        assert_eq!(update.prefetch, vec![3, 2]);
        assert_eq!(update.cancel, vec![6, 7]);
        assert_eq!(scheduler.outstanding().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_reset() {
        let mut scheduler = PrefetchScheduler::new(PrefetchStrategy::default());
        scheduler.update(0..1, 10, ScrollDirection::Forward);
        scheduler.reset();
        assert_eq!(scheduler.outstanding().count(), 0);
        assert_eq!(ScrollDirection::between(1.0, 1.0), None);
        assert_eq!(ScrollDirection::between(0.0, 1.0), Some(ScrollDirection::Forward));
    }
}
