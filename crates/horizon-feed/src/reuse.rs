//! Recycling of cell values across scrolling.
//!
//! A [`ReusePool`] hands out values by reuse tag. Values released when a row
//! scrolls out of view are kept (up to [`max_per_tag`](ReusePool::max_per_tag)
//! per tag) and handed back to the next row that needs one, so steady-state
//! scrolling constructs nothing new.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_feed_core::logging::targets;
use parking_lot::Mutex;

use crate::error::{FeedError, Result};

/// Default number of idle values kept per tag.
pub const DEFAULT_MAX_PER_TAG: usize = 7;

/// Type alias for the function that constructs a fresh value for a tag.
pub type Factory<V> = Arc<dyn Fn() -> V + Send + Sync>;

struct TagPool<V> {
    factory: Factory<V>,
    idle: Vec<V>,
    created: usize,
}

/// Pool of reusable values keyed by reuse tag.
///
/// # Example
///
/// ```
/// use horizon_feed::ReusePool;
///
/// let pool = ReusePool::new(2);
/// pool.register("cell", || String::with_capacity(64));
///
/// let cell = pool.dequeue("cell").unwrap();
/// pool.enqueue("cell", cell);
/// let _again = pool.dequeue("cell").unwrap();
/// assert_eq!(pool.created("cell"), 1);
/// ```
pub struct ReusePool<V> {
    tags: Mutex<HashMap<String, TagPool<V>>>,
    max_per_tag: usize,
}

impl<V> ReusePool<V> {
    /// Creates a pool keeping at most `max_per_tag` idle values per tag.
    pub fn new(max_per_tag: usize) -> Self {
        Self {
            tags: Mutex::new(HashMap::new()),
            max_per_tag,
        }
    }

    /// Maximum idle values kept per tag.
    pub fn max_per_tag(&self) -> usize {
        self.max_per_tag
    }

    /// Registers (or replaces) the factory for `tag`.
    ///
    /// Idle values of a replaced registration are kept.
    pub fn register<F>(&self, tag: impl Into<String>, factory: F)
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        let tag = tag.into();
        tracing::debug!(target: targets::REUSE, tag = %tag, "registered reuse tag");
        let mut tags = self.tags.lock();
        match tags.get_mut(&tag) {
            Some(pool) => pool.factory = Arc::new(factory),
            None => {
                tags.insert(
                    tag,
                    TagPool {
                        factory: Arc::new(factory),
                        idle: Vec::new(),
                        created: 0,
                    },
                );
            }
        }
    }

    /// Removes the registration for `tag` along with its idle values.
    ///
    /// Returns `false` if the tag was not registered.
    pub fn unregister(&self, tag: &str) -> bool {
        let removed = self.tags.lock().remove(tag).is_some();
        if removed {
            tracing::debug!(target: targets::REUSE, tag, "unregistered reuse tag");
        }
        removed
    }

    /// Returns `true` if `tag` has a factory.
    pub fn is_registered(&self, tag: &str) -> bool {
        self.tags.lock().contains_key(tag)
    }

    /// Takes an idle value for `tag`, constructing one if none is idle.
    pub fn dequeue(&self, tag: &str) -> Result<V> {
        let factory = {
            let mut tags = self.tags.lock();
            let pool = tags
                .get_mut(tag)
                .ok_or_else(|| FeedError::UnregisteredReuseTag { tag: tag.to_string() })?;
            if let Some(value) = pool.idle.pop() {
                tracing::trace!(target: targets::REUSE, tag, idle = pool.idle.len(), "reused value");
                return Ok(value);
            }
            pool.created += 1;
            Arc::clone(&pool.factory)
        };

        tracing::trace!(target: targets::REUSE, tag, "constructed value");
        Ok(factory())
    }

    /// Returns `value` to the pool.
    ///
    /// Returns `false` (and drops the value) when the tag is unknown or its idle
    /// list is already full.
    pub fn enqueue(&self, tag: &str, value: V) -> bool {
        let mut tags = self.tags.lock();
        let Some(pool) = tags.get_mut(tag) else {
            tracing::warn!(target: targets::REUSE, tag, "dropping value for unregistered tag");
            return false;
        };
        if pool.idle.len() >= self.max_per_tag {
            return false;
        }
        pool.idle.push(value);
        true
    }

    /// Number of idle values for `tag`.
    pub fn available(&self, tag: &str) -> usize {
        self.tags.lock().get(tag).map_or(0, |pool| pool.idle.len())
    }

    /// Number of values the factory for `tag` has constructed.
    pub fn created(&self, tag: &str) -> usize {
        self.tags.lock().get(tag).map_or(0, |pool| pool.created)
    }

    /// Drops every idle value, keeping registrations.
    pub fn clear(&self) {
        for pool in self.tags.lock().values_mut() {
            pool.idle.clear();
        }
    }
}

impl<V> Default for ReusePool<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_tag() {
        let pool: ReusePool<u32> = ReusePool::default();
        assert!(matches!(
            pool.dequeue("cell"),
            Err(FeedError::UnregisteredReuseTag { tag }) if tag == "cell"
        ));
        assert!(!pool.enqueue("cell", 1));
    }

    #[test]
    fn test_unregister_drops_idle_values() {
        let pool = ReusePool::new(4);
        pool.register("cell", || 0u32);
        pool.enqueue("cell", 5);

        assert!(pool.unregister("cell"));
        assert!(!pool.unregister("cell"));
        assert!(!pool.is_registered("cell"));
        assert_eq!(pool.available("cell"), 0);
        assert!(pool.dequeue("cell").is_err());
    }

    #[test]
    fn test_recycles_before_constructing() {
        let pool = ReusePool::new(4);
        pool.register("cell", || vec![0u8; 4]);

        let a = pool.dequeue("cell").unwrap();
        let b = pool.dequeue("cell").unwrap();
        assert_eq!(pool.created("cell"), 2);

        assert!(pool.enqueue("cell", a));
        assert!(pool.enqueue("cell", b));
        assert_eq!(pool.available("cell"), 2);

        pool.dequeue("cell").unwrap();
        assert_eq!(pool.created("cell"), 2);
        assert_eq!(pool.available("cell"), 1);
    }

    #[test]
    fn test_idle_list_is_bounded() {
        let pool = ReusePool::new(2);
        pool.register("cell", || 0u32);

        assert!(pool.enqueue("cell", 1));
        assert!(pool.enqueue("cell", 2));
        assert!(!pool.enqueue("cell", 3));
        assert_eq!(pool.available("cell"), 2);

        pool.clear();
        assert_eq!(pool.available("cell"), 0);
        assert!(pool.is_registered("cell"));
    }

    #[test]
    fn test_tags_are_independent() {
        let pool = ReusePool::default();
        pool.register("a", || 'a');
        pool.register("b", || 'b');

        pool.enqueue("a", 'x');
        assert_eq!(pool.dequeue("b").unwrap(), 'b');
        assert_eq!(pool.dequeue("a").unwrap(), 'x');
        assert_eq!(pool.max_per_tag(), DEFAULT_MAX_PER_TAG);
    }
}
