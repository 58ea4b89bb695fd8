//! Full-bleed paging layout.
//!
//! Every item fills the viewport exactly, items are laid out edge to edge with
//! no spacing, and scrolling moves one page per item. Horizontal paging is the
//! default; a vertical axis is available for feeds that page top to bottom.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

/// A size in 2D space (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self { width, height }
    }
}

/// A rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Right edge x coordinate.
    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge y coordinate.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }
}

/// Scroll axis of a paging layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Pages advance left to right.
    #[default]
    Horizontal,
    /// Pages advance top to bottom.
    Vertical,
}

/// One-item-per-page layout sized to the viewport.
///
/// Offsets are measured along the scroll axis from the start of the content.
///
/// # Example
///
/// ```
/// use horizon_feed::{PagingLayout, Size};
///
/// let layout = PagingLayout::horizontal(Size::new(390.0, 844.0));
/// assert_eq!(layout.visible_range(0.0, 201), 0..1);
/// assert_eq!(layout.visible_range(195.0, 201), 0..2);
/// assert_eq!(layout.page_for_offset(780.0, 201), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagingLayout {
    viewport: Size,
    axis: Axis,
}

impl PagingLayout {
    /// Creates a layout for `viewport` scrolling along `axis`.
    pub fn new(viewport: Size, axis: Axis) -> Self {
        Self { viewport, axis }
    }

    /// Creates a horizontally paging layout.
    pub fn horizontal(viewport: Size) -> Self {
        Self::new(viewport, Axis::Horizontal)
    }

    /// The viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Changes the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// The scroll axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Every item is exactly the viewport size.
    pub fn item_size(&self) -> Size {
        self.viewport
    }

    /// Length of one page along the scroll axis.
    pub fn page_extent(&self) -> f32 {
        match self.axis {
            Axis::Horizontal => self.viewport.width,
            Axis::Vertical => self.viewport.height,
        }
    }

    /// Frame of the item at `ordinal`.
    pub fn frame_for(&self, ordinal: usize) -> Rect {
        let along = ordinal as f32 * self.page_extent();
        let Size { width, height } = self.viewport;
        match self.axis {
            Axis::Horizontal => Rect::new(along, 0.0, width, height),
            Axis::Vertical => Rect::new(0.0, along, width, height),
        }
    }

    /// Total content size for `count` items.
    pub fn content_size(&self, count: usize) -> Size {
        let along = count as f32 * self.page_extent();
        match self.axis {
            Axis::Horizontal => Size::new(along, self.viewport.height),
            Axis::Vertical => Size::new(self.viewport.width, along),
        }
    }

    /// Largest offset at which the viewport still lies within the content.
    pub fn max_offset(&self, count: usize) -> f32 {
        (count.saturating_sub(1) as f32 * self.page_extent()).max(0.0)
    }

    /// Clamps `offset` to `[0, max_offset(count)]`.
    pub fn clamp_offset(&self, offset: f32, count: usize) -> f32 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_offset(count))
    }

    /// Half-open range of items intersecting the viewport at `offset`.
    pub fn visible_range(&self, offset: f32, count: usize) -> Range<usize> {
        let extent = self.page_extent();
        if count == 0 || extent <= 0.0 {
            return 0..0;
        }
        let offset = self.clamp_offset(offset, count);
        let start = ((offset / extent).floor() as usize).min(count - 1);
        let end = (((offset + extent) / extent).ceil() as usize).clamp(start + 1, count);
        start..end
    }

    /// Page closest to `offset`.
    pub fn page_for_offset(&self, offset: f32, count: usize) -> usize {
        let extent = self.page_extent();
        if count == 0 || extent <= 0.0 {
            return 0;
        }
        let offset = self.clamp_offset(offset, count);
        ((offset / extent).round() as usize).min(count - 1)
    }

    /// Offset that shows `page` exactly, clamped to the last page.
    pub fn offset_for_page(&self, page: usize, count: usize) -> f32 {
        page.min(count.saturating_sub(1)) as f32 * self.page_extent()
    }
}
