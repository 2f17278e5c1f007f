//! Viewport windower: which rows to materialize for a scroll position.
//!
//! Rows have one uniform height per density mode, so the window is pure
//! arithmetic on `(row count, row height, scroll offset, viewport height,
//! overscan)` and costs the same for ten rows or ten million.
//!
//! The windower does not clamp the scroll offset. A stale offset (for example
//! right after the collection shrank) yields a window whose end is clamped to
//! the last row and may therefore be empty; the caller is expected to clamp
//! its scroll position, see
//! [`ViewportState::clamped`](crate::app::ViewportState::clamped).

use serde::Serialize;
use std::ops::Range;

/// Contiguous range of row positions to render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowRange {
    /// First row position to render, overscan included.
    pub start_index: usize,
    /// Last row position to render (inclusive), `None` when nothing renders.
    pub end_index: Option<usize>,
    /// Height of the whole scrollable content in pixels.
    pub total_size: f64,
}

impl WindowRange {
    /// Window of an empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            start_index: 0,
            end_index: None,
            total_size: 0.0,
        }
    }

    /// Row positions as a half-open range.
    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        match self.end_index {
            Some(end) if end >= self.start_index => self.start_index..end + 1,
            _ => self.start_index..self.start_index,
        }
    }

    /// Number of rows to render.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices().len()
    }

    /// Whether no row is rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes the render window.
///
/// ```text
/// total_size  = total_rows * row_height
/// start_index = max(0, floor(scroll_offset / row_height) - overscan)
/// end_index   = min(total_rows - 1, ceil((scroll_offset + viewport_height) / row_height) + overscan)
/// ```
///
/// A non-positive or non-finite `row_height` yields an empty window; a
/// non-finite scroll offset or viewport height is read as zero.
///
/// # Examples
///
/// ```
/// use virtgrid::engine::compute_range;
///
/// let window = compute_range(10_000, 48.0, 4800.0, 600.0, 5);
/// assert_eq!(window.start_index, 95);
/// assert_eq!(window.end_index, Some(118));
/// assert_eq!(window.total_size, 480_000.0);
///
/// assert!(compute_range(0, 48.0, 0.0, 600.0, 5).is_empty());
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_range(
    total_rows: usize,
    row_height: f64,
    scroll_offset: f64,
    viewport_height: f64,
    overscan: usize,
) -> WindowRange {
    if total_rows == 0 || !row_height.is_finite() || row_height <= 0.0 {
        return WindowRange::empty();
    }

    let scroll_offset = if scroll_offset.is_finite() { scroll_offset } else { 0.0 };
    let viewport_height = if viewport_height.is_finite() { viewport_height.max(0.0) } else { 0.0 };

    let total_size = total_rows as f64 * row_height;
    let overscan = overscan as f64;
    let last_row = (total_rows - 1) as f64;

    let first_visible = (scroll_offset / row_height).floor();
    let last_visible = ((scroll_offset + viewport_height) / row_height).ceil();

    let start = (first_visible - overscan).max(0.0);
    let end = (last_visible + overscan).min(last_row);

    let start_index = start as usize;
    let end_index = if end >= start {
        Some(end as usize)
    } else {
        None
    };

    tracing::trace!(
        total_rows,
        scroll_offset,
        start_index,
        end_index = ?end_index,
        "window computed"
    );

    WindowRange {
        start_index,
        end_index,
        total_size,
    }
}

/// Top pixel offset of the row at `index`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn row_offset(index: usize, row_height: f64) -> f64 {
    index as f64 * row_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_collection_scenario() {
        let window = compute_range(10_000, 48.0, 4800.0, 600.0, 5);
        assert_eq!(window.start_index, 95);
        assert_eq!(window.end_index, Some(118));
        assert_eq!(window.len(), 24);
    }

    #[test]
    fn top_of_list_clamps_start_to_zero() {
        let window = compute_range(1000, 40.0, 0.0, 400.0, 3);
        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, Some(13));
    }

    #[test]
    fn short_list_clamps_end_to_last_row() {
        let window = compute_range(4, 48.0, 0.0, 600.0, 5);
        assert_eq!(window.indices(), 0..4);
        assert_eq!(window.total_size, 192.0);
    }

    #[test]
    fn empty_collection_has_no_rows_and_no_size() {
        let window = compute_range(0, 48.0, 120.0, 600.0, 5);
        assert_eq!(window, WindowRange::empty());
        assert!(window.is_empty());
    }

    #[test]
    fn stale_offset_past_the_end_renders_nothing() {
        // Collection shrank to 10 rows while the offset still points at row 500.
        let window = compute_range(10, 48.0, 24_000.0, 600.0, 5);
        assert_eq!(window.start_index, 495);
        assert_eq!(window.end_index, None);
        assert!(window.is_empty());
        assert_eq!(window.total_size, 480.0);
    }

    #[test]
    fn invalid_row_height_is_empty() {
        assert!(compute_range(10, 0.0, 0.0, 600.0, 5).is_empty());
        assert!(compute_range(10, f64::NAN, 0.0, 600.0, 5).is_empty());
    }

    #[test]
    fn non_finite_offset_reads_as_top() {
        let window = compute_range(10_000, 48.0, f64::NAN, 600.0, 5);
        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, Some(18));
    }

    #[test]
    fn negative_offset_starts_at_top() {
        let window = compute_range(100, 10.0, -50.0, 100.0, 2);
        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, Some(7));
    }

    #[test]
    fn window_covers_every_intersecting_row_plus_overscan() {
        let (rows, height, viewport, overscan) = (500_usize, 37.0, 410.0, 4_usize);
        let total = rows as f64 * height;
        let mut offset = 0.0;
        while offset <= total - viewport {
            let window = compute_range(rows, height, offset, viewport, overscan);
            let first = (offset / height).floor() as usize;
            let last = (((offset + viewport) / height).floor() as usize).min(rows - 1);

            assert!(window.start_index <= first.saturating_sub(overscan));
            let end = window.end_index.unwrap();
            assert!(end >= (last + overscan).min(rows - 1));
            offset += 13.5;
        }
    }

    #[test]
    fn row_offsets_are_multiples_of_height() {
        assert_eq!(row_offset(0, 48.0), 0.0);
        assert_eq!(row_offset(3, 48.0), 144.0);
    }
}
