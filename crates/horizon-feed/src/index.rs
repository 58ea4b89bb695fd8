//! Index paths for addressing items in sectioned snapshots.
//!
//! An `IndexPath` locates an item by ordinal: the section it lives in and its
//! position within that section. Index paths describe *where* something is in
//! one particular snapshot; identity lives in the item identifier itself.
//! After an apply, previously obtained index paths may point elsewhere.

use std::fmt;

/// Position of an item inside a snapshot: `(section, item)`.
///
/// Ordering is section-major, matching display order.
///
/// # Example
///
/// ```
/// use horizon_feed::IndexPath;
///
/// let path = IndexPath::new(0, 5);
/// assert_eq!(path.to_string(), "[0, 5]");
/// assert_eq!(path.with_item(6), IndexPath::new(0, 6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// The section ordinal.
    pub section: usize,
    /// The item ordinal within the section.
    pub item: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Returns the sibling at `item` in the same section.
    #[inline]
    pub const fn with_item(self, item: usize) -> Self {
        Self {
            section: self.section,
            item,
        }
    }

    /// Builds index paths for `range` of items in `section`.
    pub fn range(section: usize, range: std::ops::Range<usize>) -> Vec<Self> {
        range.map(|item| Self::new(section, item)).collect()
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}
