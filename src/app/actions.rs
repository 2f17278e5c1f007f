//! Actions representing follow-up work for the presentation layer.
//!
//! The event handler returns a `Vec<Action>` next to its redraw flag. Actions
//! cover what a redraw alone cannot express: state the caller mirrors outside
//! the grid (a selection badge, the scroll container's position).
//!
//! # Example
//!
//! ```rust
//! use virtgrid::app::Action;
//!
//! let actions = vec![Action::SelectionChanged { count: 3 }];
//! assert!(matches!(actions[0], Action::SelectionChanged { count: 3 }));
//! ```

/// Commands emitted by [`handle_event`](super::handle_event).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The selection changed size or membership.
    SelectionChanged {
        /// Selected rows after the change.
        count: usize,
    },

    /// The scroll container points past the end of the filtered content.
    ///
    /// Emitted after a query, resize or collection change shrinks the content.
    /// The caller should move its scroll position to `offset`; the grid has
    /// already adopted it.
    ClampScroll {
        /// New scroll offset in pixels.
        offset: f64,
    },
}
