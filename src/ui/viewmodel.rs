//! Render instructions emitted by the grid controller.
//!
//! A [`GridView`] is everything a presentation layer needs for one frame:
//! the rows to draw (with their absolute pixel offsets and selection flags),
//! the full content height for the scroll container, and the counts behind an
//! "N of M" indicator. It borrows from the controller and carries no logic.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use virtgrid::app::{GridController, ViewportState};
//! use virtgrid::domain::{ColumnDescriptor, JsonRecord};
//!
//! let mut grid = GridController::new(
//!     vec![ColumnDescriptor::text("name", "Name")],
//!     ViewportState::new(96.0, 48.0, 0),
//! );
//! grid.set_records(vec![
//!     JsonRecord::from_value(json!({"id": 1, "name": "Dock A"}), "id", 0)?,
//!     JsonRecord::from_value(json!({"id": 2, "name": "Dock B"}), "id", 1)?,
//! ])?;
//!
//! let view = grid.view();
//! assert_eq!(view.counter_label(), "2 of 2");
//! assert_eq!(view.visible_rows[1].offset, 48.0);
//! # Ok::<(), virtgrid::GridError>(())
//! ```

use crate::domain::Record;

/// One frame of grid output.
#[derive(Debug)]
pub struct GridView<'a, R: Record> {
    /// Rows inside the render window, in display order.
    pub visible_rows: Vec<VisibleRow<'a, R>>,
    /// Rows passing the current filter.
    pub total_filtered_count: usize,
    /// Rows in the base collection.
    pub total_count: usize,
    /// Content height in pixels for the scroll container.
    pub total_size: f64,
    /// Display position of the first rendered row.
    pub start_index: usize,
    /// Display position of the last rendered row, if any.
    pub end_index: Option<usize>,
    /// Number of selected rows, including rows hidden by the filter.
    pub selected_count: usize,
}

impl<R: Record> GridView<'_, R> {
    /// "N of M" label for a record counter.
    #[must_use]
    pub fn counter_label(&self) -> String {
        format!("{} of {}", self.total_filtered_count, self.total_count)
    }

    /// Whether the filter left nothing to show.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_filtered_count == 0
    }
}

/// A row to materialize in the current frame.
#[derive(Debug)]
pub struct VisibleRow<'a, R: Record> {
    pub record: &'a R,
    pub row_id: &'a R::Id,
    pub selected: bool,
    /// Position in the filtered and sorted order.
    pub position: usize,
    /// Top pixel offset for absolute positioning.
    pub offset: f64,
}
