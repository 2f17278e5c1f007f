//! Pure engine stages behind the grid controller.
//!
//! Each stage is a free-standing function or small value type with no
//! knowledge of the others. The controller in [`crate::app`] composes them in
//! a fixed order: filter, then sort, then window.
//!
//! ```text
//! RowSet ──filter_indices──▶ matching positions ──sort_indices──▶ ordered positions
//!                                                                      │
//!            ViewportState ──compute_range──▶ WindowRange ─────────────┤
//!                                                                      ▼
//!                                  SelectionStore ──is_selected──▶ visible rows
//! ```
//!
//! # Modules
//!
//! - [`rows`]: Row model and duplicate-id policy
//! - [`predicate`]: Free-text matching and highlight ranges
//! - [`sort`]: Stable single-column sort and the header-click state machine
//! - [`selection`]: Id-keyed multi-selection
//! - [`windower`]: Overscanned render window computation

pub mod predicate;
pub mod rows;
pub mod selection;
pub mod sort;
pub mod windower;

pub use predicate::{filter_indices, matches, MatchMode, Query};
pub use rows::{DuplicatePolicy, Row, RowSet};
pub use selection::SelectionStore;
pub use sort::{resolve_sort, sort_indices, SortDirection, SortState};
pub use windower::{compute_range, row_offset, WindowRange};
