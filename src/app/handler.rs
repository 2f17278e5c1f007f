//! Event handling and state transition logic.
//!
//! [`handle_event`] is the single entry point for input arriving from a
//! presentation layer. It applies the event to a [`GridController`], decides
//! whether a redraw is needed, and collects follow-up [`Action`]s.
//!
//! # Event Types
//!
//! Events fall into several categories:
//! - **Query**: `SetQuery`, `AppendQuery`, `Backspace`, `ClearQuery`
//! - **Sort**: `ClickColumn`
//! - **Viewport**: `Scroll`, `Resize`, `SetDensity`
//! - **Selection**: `Toggle`, `SelectAllVisible`, `ClearSelection`
//! - **Data**: `ReplaceRecords`
//!
//! # Example
//!
//! ```rust
//! use virtgrid::app::{handle_event, GridController, GridEvent, ViewportState};
//! use virtgrid::domain::{ColumnDescriptor, JsonRecord};
//!
//! let mut grid: GridController<JsonRecord> = GridController::new(
//!     vec![ColumnDescriptor::text("name", "Name")],
//!     ViewportState::default(),
//! );
//! let (redraw, actions) = handle_event(&mut grid, GridEvent::AppendQuery('a'))?;
//! assert!(redraw);
//! assert!(actions.is_empty());
//! # Ok::<(), virtgrid::GridError>(())
//! ```

use crate::app::{Action, GridController};
use crate::domain::error::Result;
use crate::domain::Record;
use crate::infrastructure::Density;

/// Input events from the presentation layer.
#[derive(Debug, Clone)]
pub enum GridEvent<R: Record> {
    /// Replaces the query text.
    SetQuery(String),
    /// Appends a typed character to the query.
    AppendQuery(char),
    /// Removes the last query character.
    Backspace,
    /// Empties the query.
    ClearQuery,

    /// Header click on the column with this key.
    ClickColumn(String),

    /// Scroll container moved to this offset.
    Scroll(f64),
    /// Scroll container resized to this height.
    Resize(f64),
    /// Density preference changed.
    SetDensity(Density),

    /// Row checkbox clicked.
    Toggle(R::Id),
    /// Header select-all checkbox clicked.
    SelectAllVisible,
    /// Selection cleared, e.g. after a bulk action completed.
    ClearSelection,

    /// A fresh collection arrived from the data source.
    ReplaceRecords(Vec<R>),
}

impl<R: Record> GridEvent<R> {
    /// Short event name for spans and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetQuery(_) => "set_query",
            Self::AppendQuery(_) => "append_query",
            Self::Backspace => "backspace",
            Self::ClearQuery => "clear_query",
            Self::ClickColumn(_) => "click_column",
            Self::Scroll(_) => "scroll",
            Self::Resize(_) => "resize",
            Self::SetDensity(_) => "set_density",
            Self::Toggle(_) => "toggle",
            Self::SelectAllVisible => "select_all_visible",
            Self::ClearSelection => "clear_selection",
            Self::ReplaceRecords(_) => "replace_records",
        }
    }
}

/// Processes an event, mutates the grid, and returns actions to execute.
///
/// Returns `(redraw, actions)`: `redraw` is `false` when the event left every
/// render input untouched (e.g. `Backspace` on an empty query, a click on an
/// unsortable column).
///
/// # Errors
///
/// Returns [`GridError::DuplicateRowId`](crate::GridError::DuplicateRowId) when
/// a `ReplaceRecords` collection is rejected. The grid keeps its previous
/// collection in that case.
pub fn handle_event<R: Record>(
    grid: &mut GridController<R>,
    event: GridEvent<R>,
) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event.name()).entered();

    match event {
        GridEvent::SetQuery(query) => {
            if !grid.set_query(query) {
                return Ok((false, vec![]));
            }
            tracing::trace!(query = %grid.query(), "query replaced");
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::AppendQuery(c) => {
            grid.push_query_char(c);
            tracing::trace!(query = %grid.query(), char = %c, "query updated");
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::Backspace => {
            if !grid.pop_query_char() {
                return Ok((false, vec![]));
            }
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::ClearQuery => {
            if !grid.set_query(String::new()) {
                return Ok((false, vec![]));
            }
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::ClickColumn(key) => Ok((grid.click_column(&key), vec![])),
        GridEvent::Scroll(offset) => Ok((grid.set_scroll_offset(offset), vec![])),
        GridEvent::Resize(height) => {
            grid.set_viewport_height(height);
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::SetDensity(density) => {
            if grid.density() == density {
                return Ok((false, vec![]));
            }
            grid.set_density(density);
            Ok((true, clamp_actions(grid)))
        }
        GridEvent::Toggle(id) => {
            let before = grid.selection().len();
            grid.toggle(&id);
            let count = grid.selection().len();
            if count == before {
                return Ok((false, vec![]));
            }
            Ok((true, vec![Action::SelectionChanged { count }]))
        }
        GridEvent::SelectAllVisible => {
            grid.select_all_visible();
            let count = grid.selection().len();
            tracing::debug!(selected = count, "select-all toggled");
            Ok((true, vec![Action::SelectionChanged { count }]))
        }
        GridEvent::ClearSelection => {
            if grid.selection().is_empty() {
                return Ok((false, vec![]));
            }
            grid.clear_selection();
            Ok((true, vec![Action::SelectionChanged { count: 0 }]))
        }
        GridEvent::ReplaceRecords(records) => {
            let before = grid.selection().len();
            grid.set_records(records)?;

            let mut actions = clamp_actions(grid);
            let count = grid.selection().len();
            if count != before {
                actions.push(Action::SelectionChanged { count });
            }
            Ok((true, actions))
        }
    }
}

/// Adopts a clamped scroll offset when the content shrank below the current
/// position and reports it to the caller.
fn clamp_actions<R: Record>(grid: &mut GridController<R>) -> Vec<Action> {
    grid.scroll_clamp().map_or_else(Vec::new, |offset| {
        tracing::debug!(offset, "clamping scroll offset");
        grid.set_scroll_offset(offset);
        vec![Action::ClampScroll { offset }]
    })
}
