//! Viewport geometry supplied by the presentation layer.

use serde::{Deserialize, Serialize};

use crate::engine::windower::{compute_range, WindowRange};

/// Scroll position and geometry of the grid's scroll container.
///
/// Updated from live scroll and resize events; read-only during one
/// recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Pixels scrolled from the top of the content.
    pub scroll_offset: f64,
    /// Visible height of the scroll container in pixels.
    pub viewport_height: f64,
    /// Uniform row height in pixels.
    pub row_height: f64,
    /// Rows rendered beyond each edge of the viewport.
    pub overscan: usize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 600.0,
            row_height: 48.0,
            overscan: 5,
        }
    }
}

impl ViewportState {
    /// Creates a viewport scrolled to the top.
    #[must_use]
    pub const fn new(viewport_height: f64, row_height: f64, overscan: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height,
            row_height,
            overscan,
        }
    }

    /// Largest meaningful scroll offset for content of `total_size` pixels.
    #[must_use]
    pub fn max_scroll_offset(&self, total_size: f64) -> f64 {
        (total_size - self.viewport_height).max(0.0)
    }

    /// Copy of this viewport with the scroll offset clamped into
    /// `[0, max_scroll_offset(total_size)]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use virtgrid::app::ViewportState;
    ///
    /// let mut viewport = ViewportState::new(600.0, 48.0, 5);
    /// viewport.scroll_offset = 9_000.0;
    /// // Only 20 rows remain: 960px of content.
    /// assert_eq!(viewport.clamped(960.0).scroll_offset, 360.0);
    /// ```
    #[must_use]
    pub fn clamped(&self, total_size: f64) -> Self {
        Self {
            scroll_offset: self.scroll_offset.clamp(0.0, self.max_scroll_offset(total_size)),
            ..*self
        }
    }

    /// Render window over `total_rows` rows at the current position.
    #[must_use]
    pub fn window(&self, total_rows: usize) -> WindowRange {
        compute_range(
            total_rows,
            self.row_height,
            self.scroll_offset,
            self.viewport_height,
            self.overscan,
        )
    }
}
