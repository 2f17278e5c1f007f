//! Grid controller: the filter → sort → window pipeline with memoization.
//!
//! [`GridController`] owns the base collection and every user input (query,
//! sort request, viewport, selection) and derives render output from them.
//!
//! # Recomputation Policy
//!
//! Derived state is recomputed lazily, on the next [`GridController::view`]
//! (or any other read that needs it), and only when its inputs changed:
//!
//! | Stage  | Cache key                                   | Cost          |
//! |--------|---------------------------------------------|---------------|
//! | filter | collection epoch, query, match mode         | O(N)          |
//! | sort   | filter epoch, column epoch, sort state      | O(N log N)    |
//! | window | none, recomputed on every read              | O(window)     |
//!
//! A scroll or resize event only touches the viewport, so a 100 000-row
//! collection is never re-filtered or re-sorted while scrolling.
//! [`CacheStats`] counts recomputations so this is observable.
//!
//! # Collection Updates
//!
//! Every [`set_records`](GridController::set_records) call is treated as a new
//! collection: derived state is rebuilt from scratch (no diffing) while query,
//! sort, viewport and selection carry over. Selected ids that no longer exist
//! are pruned before the next frame.

use std::borrow::Cow;

use crate::domain::error::Result;
use crate::domain::{find_column, ColumnDescriptor, Record};
use crate::engine::{
    filter_indices, row_offset, sort_indices, DuplicatePolicy, MatchMode, Query, RowSet,
    SelectionStore, SortState, WindowRange,
};
use crate::infrastructure::{Density, DensityHeights, RowHeightProvider};
use crate::ui::viewmodel::{GridView, VisibleRow};

use super::viewport::ViewportState;

/// Recomputation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Times the filter stage ran.
    pub filter_runs: u64,
    /// Times the sort stage ran.
    pub sort_runs: u64,
}

struct FilterCache {
    collection_epoch: u64,
    query: Query,
    epoch: u64,
    positions: Vec<usize>,
}

struct SortCache {
    filter_epoch: u64,
    columns_epoch: u64,
    sort: SortState,
    /// `None` when the sort resolved to a no-op and filter order stands.
    positions: Option<Vec<usize>>,
}

/// Windowed data grid over records of type `R`.
pub struct GridController<R: Record> {
    columns: Vec<ColumnDescriptor>,
    columns_epoch: u64,
    rows: RowSet<R>,
    collection_epoch: u64,
    duplicate_policy: DuplicatePolicy,
    match_mode: MatchMode,
    query: String,
    sort: SortState,
    viewport: ViewportState,
    density: Density,
    heights: DensityHeights,
    row_height_override: Option<f64>,
    selection: SelectionStore<R::Id>,
    filtered: Option<FilterCache>,
    sorted: Option<SortCache>,
    filter_epoch: u64,
    stats: CacheStats,
}

impl<R: Record> std::fmt::Debug for GridController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("rows", &self.rows.len())
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("viewport", &self.viewport)
            .field("selected", &self.selection.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<R: Record> GridController<R> {
    /// Creates an empty grid with the given columns and viewport.
    ///
    /// The duplicate-id policy defaults per build profile, see
    /// [`DuplicatePolicy::default`].
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>, viewport: ViewportState) -> Self {
        Self {
            columns,
            columns_epoch: 0,
            rows: RowSet::default(),
            collection_epoch: 0,
            duplicate_policy: DuplicatePolicy::default(),
            match_mode: MatchMode::default(),
            query: String::new(),
            sort: SortState::unsorted(),
            viewport,
            density: Density::default(),
            heights: DensityHeights::default(),
            row_height_override: None,
            selection: SelectionStore::new(),
            filtered: None,
            sorted: None,
            filter_epoch: 0,
            stats: CacheStats::default(),
        }
    }

    /// Sets the duplicate-id policy used by later collection updates.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sets the query matching algorithm.
    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.set_match_mode(mode);
        self
    }

    /// Sets the density table and density, applying the resulting row height.
    #[must_use]
    pub fn with_density(mut self, density: Density, heights: DensityHeights) -> Self {
        self.heights = heights;
        self.set_density(density);
        self
    }

    /// Pins every density to one row height. `None` restores the table.
    #[must_use]
    pub fn with_row_height(mut self, height: Option<f64>) -> Self {
        self.row_height_override = height;
        self.set_density(self.density);
        self
    }

    // ----- inputs -----------------------------------------------------------

    /// Replaces the base collection.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateRowId`](crate::GridError::DuplicateRowId)
    /// under [`DuplicatePolicy::FailFast`]; the previous collection stays in
    /// place in that case.
    pub fn set_records(&mut self, records: Vec<R>) -> Result<()> {
        let rows = RowSet::new(records, self.duplicate_policy)?;
        self.rows = rows;
        self.collection_epoch += 1;

        let pruned = self.selection.prune(|id| self.rows.contains(id));

        tracing::debug!(
            total_rows = self.rows.len(),
            collection_epoch = self.collection_epoch,
            pruned_selection = pruned,
            "record collection replaced"
        );
        Ok(())
    }

    /// Replaces the column set. Stale sort keys become no-op sorts.
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.columns = columns;
        self.columns_epoch += 1;
    }

    /// Sets the free-text query. Returns whether it changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.query {
            return false;
        }
        self.query = query;
        true
    }

    /// Appends one character to the query.
    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    /// Removes the last query character. Returns whether anything was removed.
    pub fn pop_query_char(&mut self) -> bool {
        self.query.pop().is_some()
    }

    /// Switches the query matching algorithm.
    pub fn set_match_mode(&mut self, mode: MatchMode) {
        self.match_mode = mode;
    }

    /// Applies a header click on column `key`.
    ///
    /// Clicks on unknown or unsortable columns are ignored and return `false`.
    pub fn click_column(&mut self, key: &str) -> bool {
        match find_column(&self.columns, key) {
            Some(column) if column.sortable => {
                self.sort.click(key);
                tracing::debug!(sort_key = %key, direction = ?self.sort.direction, "sort state advanced");
                true
            }
            _ => {
                tracing::warn!(column = %key, "ignoring click on a column that cannot sort");
                false
            }
        }
    }

    /// Replaces the sort request wholesale.
    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Moves the scroll position. Returns whether it changed.
    ///
    /// Non-finite offsets are read as `0`.
    pub fn set_scroll_offset(&mut self, offset: f64) -> bool {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        #[allow(clippy::float_cmp)]
        let unchanged = self.viewport.scroll_offset == offset;
        self.viewport.scroll_offset = offset;
        !unchanged
    }

    /// Updates the visible height of the scroll container.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.viewport_height = height;
    }

    /// Updates the overscan row count.
    pub fn set_overscan(&mut self, overscan: usize) {
        self.viewport.overscan = overscan;
    }

    /// Switches density, taking the row height from the grid's density table
    /// unless a fixed row height is pinned.
    pub fn set_density(&mut self, density: Density) {
        match self.row_height_override {
            Some(height) => self.apply_density(density, &move |_: Density| height),
            None => {
                let heights = self.heights;
                self.apply_density(density, &heights);
            }
        }
    }

    /// Switches density, taking the row height from an external provider.
    pub fn set_density_with<P: RowHeightProvider + ?Sized>(&mut self, density: Density, provider: &P) {
        self.apply_density(density, provider);
    }

    fn apply_density<P: RowHeightProvider + ?Sized>(&mut self, density: Density, provider: &P) {
        self.density = density;
        self.viewport.row_height = provider.row_height(density);
        tracing::debug!(%density, row_height = self.viewport.row_height, "density changed");
    }

    // ----- selection --------------------------------------------------------

    /// Flips selection of `id`. Returns whether it is selected afterwards.
    ///
    /// Ids not present in the collection are ignored.
    pub fn toggle(&mut self, id: &R::Id) -> bool {
        if !self.rows.contains(id) {
            tracing::debug!(id = ?id, "ignoring toggle of unknown row id");
            return false;
        }
        self.selection.toggle(id.clone())
    }

    /// Select-all toggle over every row passing the current filter.
    ///
    /// Returns whether the filtered rows are selected afterwards.
    pub fn select_all_visible(&mut self) -> bool {
        self.refresh();
        let visible: Vec<R::Id> = self
            .ordered_positions()
            .iter()
            .filter_map(|&pos| self.rows.get(pos))
            .map(|row| row.id().clone())
            .collect();
        self.selection.select_all(visible.iter())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &R::Id) -> bool {
        self.selection.is_selected(id)
    }

    /// The selection store.
    #[must_use]
    pub const fn selection(&self) -> &SelectionStore<R::Id> {
        &self.selection
    }

    /// Selected records in base collection order.
    #[must_use]
    pub fn selected_records(&self) -> Vec<&R> {
        self.rows
            .rows()
            .iter()
            .filter(|row| self.selection.is_selected(row.id()))
            .map(|row| row.record())
            .collect()
    }

    // ----- accessors --------------------------------------------------------

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn sort(&self) -> &SortState {
        &self.sort
    }

    #[must_use]
    pub const fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    #[must_use]
    pub const fn density(&self) -> Density {
        self.density
    }

    #[must_use]
    pub const fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[must_use]
    pub const fn rows(&self) -> &RowSet<R> {
        &self.rows
    }

    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    // ----- derived state ----------------------------------------------------

    /// Brings filter and sort caches up to date with the current inputs.
    pub fn refresh(&mut self) {
        self.ensure_filtered();
        self.ensure_sorted();
    }

    /// Number of rows passing the current filter.
    pub fn filtered_count(&mut self) -> usize {
        self.refresh();
        self.ordered_positions().len()
    }

    /// Render window at the current scroll position.
    pub fn window(&mut self) -> WindowRange {
        let total = self.filtered_count();
        self.viewport.window(total)
    }

    /// Scroll offset the caller should clamp to, if the current one points
    /// past the end of the filtered content.
    pub fn scroll_clamp(&mut self) -> Option<f64> {
        let total = self.filtered_count();
        #[allow(clippy::cast_precision_loss)]
        let total_size = total as f64 * self.viewport.row_height;
        let clamped = self.viewport.clamped(total_size).scroll_offset;
        (clamped < self.viewport.scroll_offset).then_some(clamped)
    }

    /// Computes the render output for the current inputs.
    pub fn view(&mut self) -> GridView<'_, R> {
        self.refresh();

        let ordered = self.ordered_positions();
        let window = self.viewport.window(ordered.len());
        let row_height = self.viewport.row_height;

        let visible_rows: Vec<VisibleRow<'_, R>> = ordered
            .get(window.indices())
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter_map(|(i, &pos)| {
                let row = self.rows.get(pos)?;
                let position = window.start_index + i;
                Some(VisibleRow {
                    record: row.record(),
                    row_id: row.id(),
                    selected: self.selection.is_selected(row.id()),
                    position,
                    offset: row_offset(position, row_height),
                })
            })
            .collect();

        GridView {
            visible_rows,
            total_filtered_count: ordered.len(),
            total_count: self.rows.len(),
            total_size: window.total_size,
            start_index: window.start_index,
            end_index: window.end_index,
            selected_count: self.selection.len(),
        }
    }

    /// Byte ranges of `record`'s `column` text matching the current query.
    #[must_use]
    pub fn highlight_ranges(&self, record: &R, column: &str) -> Vec<(usize, usize)> {
        let Some(column) = find_column(&self.columns, column) else {
            return Vec::new();
        };
        let text = column.display(record);

        match &self.filtered {
            Some(cache) if cache.query.as_str() == self.query && cache.query.mode() == self.match_mode => {
                cache.query.highlight_ranges(&text)
            }
            _ => Query::new(&self.query, self.match_mode).highlight_ranges(&text),
        }
    }

    fn ordered_positions(&self) -> &[usize] {
        if let Some(order) = self.sorted.as_ref().and_then(|cache| cache.positions.as_deref()) {
            return order;
        }
        self.filtered
            .as_ref()
            .map_or(&[][..], |cache| cache.positions.as_slice())
    }

    fn ensure_filtered(&mut self) {
        let fresh = self.filtered.as_ref().is_some_and(|cache| {
            cache.collection_epoch == self.collection_epoch
                && cache.query.as_str() == self.query
                && cache.query.mode() == self.match_mode
        });
        if fresh {
            return;
        }

        let _span = tracing::debug_span!(
            "filter",
            total_rows = self.rows.len(),
            query_len = self.query.len(),
            mode = ?self.match_mode
        )
        .entered();

        let query = Query::new(&self.query, self.match_mode);
        let positions = filter_indices(self.rows.rows(), &query);

        self.filter_epoch += 1;
        self.stats.filter_runs += 1;
        tracing::debug!(filtered_count = positions.len(), "filter recomputed");

        self.filtered = Some(FilterCache {
            collection_epoch: self.collection_epoch,
            query,
            epoch: self.filter_epoch,
            positions,
        });
    }

    fn ensure_sorted(&mut self) {
        let Some(filtered) = self.filtered.as_ref() else {
            return;
        };

        let fresh = self.sorted.as_ref().is_some_and(|cache| {
            cache.filter_epoch == filtered.epoch
                && cache.columns_epoch == self.columns_epoch
                && cache.sort == self.sort
        });
        if fresh {
            return;
        }

        let _span = tracing::debug_span!(
            "sort",
            rows = filtered.positions.len(),
            sort_key = ?self.sort.key,
            direction = ?self.sort.direction
        )
        .entered();

        let filter_epoch = filtered.epoch;
        let positions = match sort_indices(self.rows.rows(), &filtered.positions, &self.sort, &self.columns) {
            Cow::Borrowed(_) => None,
            Cow::Owned(sorted) => Some(sorted),
        };

        self.stats.sort_runs += 1;
        tracing::debug!(reordered = positions.is_some(), "sort recomputed");

        self.sorted = Some(SortCache {
            filter_epoch,
            columns_epoch: self.columns_epoch,
            sort: self.sort.clone(),
            positions,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;
    use crate::engine::SortDirection;

    #[derive(Debug, Clone, PartialEq)]
    struct Location {
        id: u32,
        code: String,
        zone: Option<&'static str>,
    }

    impl Record for Location {
        type Id = u32;

        fn row_id(&self) -> u32 {
            self.id
        }

        fn field(&self, key: &str) -> FieldValue {
            match key {
                "id" => FieldValue::from(self.id),
                "code" => FieldValue::from(self.code.as_str()),
                "zone" => FieldValue::from(self.zone),
                _ => FieldValue::Null,
            }
        }

        fn fields(&self) -> Vec<FieldValue> {
            vec![self.field("code"), self.field("zone")]
        }
    }

    fn location(id: u32, code: &str, zone: Option<&'static str>) -> Location {
        Location {
            id,
            code: code.to_string(),
            zone,
        }
    }

    fn grid() -> GridController<Location> {
        let mut grid = GridController::new(
            vec![
                ColumnDescriptor::text("code", "Code"),
                ColumnDescriptor::text("zone", "Zone"),
                ColumnDescriptor::text("id", "Id").unsortable(),
            ],
            ViewportState::new(480.0, 48.0, 2),
        )
        .with_duplicate_policy(DuplicatePolicy::FailFast);

        grid.set_records(
            (0..1000)
                .map(|i| location(i, &format!("LOC-{i:04}"), if i % 2 == 0 { Some("cold") } else { None }))
                .collect(),
        )
        .unwrap();
        grid
    }

    #[test]
    fn scrolling_never_refilters_or_resorts() {
        let mut grid = grid();
        grid.set_sort(SortState::descending("code"));
        let _ = grid.view();
        let after_first = grid.stats();
        assert_eq!(after_first, CacheStats { filter_runs: 1, sort_runs: 1 });

        for step in 0..50 {
            grid.set_scroll_offset(f64::from(step) * 97.0);
            let view = grid.view();
            assert!(!view.visible_rows.is_empty());
        }
        grid.set_viewport_height(900.0);
        let _ = grid.view();

        assert_eq!(grid.stats(), after_first);
    }

    #[test]
    fn query_change_refilters_and_resorts_but_sort_change_only_resorts() {
        let mut grid = grid();
        let _ = grid.view();

        grid.set_query("LOC-00");
        let _ = grid.view();
        assert_eq!(grid.stats(), CacheStats { filter_runs: 2, sort_runs: 2 });

        grid.click_column("code");
        let _ = grid.view();
        assert_eq!(grid.stats(), CacheStats { filter_runs: 2, sort_runs: 3 });

        assert!(!grid.set_query("LOC-00"));
        let _ = grid.view();
        assert_eq!(grid.stats(), CacheStats { filter_runs: 2, sort_runs: 3 });
    }

    #[test]
    fn view_materializes_only_the_window() {
        let mut grid = grid();
        grid.set_scroll_offset(4800.0);
        let view = grid.view();

        // rows 100..=109 visible, 2 overscan each side
        assert_eq!(view.start_index, 98);
        assert_eq!(view.end_index, Some(112));
        assert_eq!(view.visible_rows.len(), 15);
        assert_eq!(view.visible_rows[0].position, 98);
        assert_eq!(view.visible_rows[0].offset, 98.0 * 48.0);
        assert_eq!(view.total_size, 48_000.0);
        assert_eq!(view.total_filtered_count, 1000);

        let window = grid.window();
        assert_eq!(window.indices(), 98..113);
    }

    #[test]
    fn descending_sort_keeps_null_zones_last() {
        let mut grid = grid();
        grid.set_sort(SortState::descending("zone"));
        grid.set_scroll_offset(499.0 * 48.0);
        let view = grid.view();

        let ids: Vec<u32> = view.visible_rows.iter().map(|row| *row.row_id).collect();
        // Position 499 is the last "cold" row (id 998), 500 the first null (id 1).
        let boundary = ids.iter().position(|id| *id == 1).unwrap();
        assert_eq!(ids[boundary - 1], 998);
    }

    #[test]
    fn unsortable_column_clicks_are_ignored() {
        let mut grid = grid();
        assert!(!grid.click_column("id"));
        assert!(!grid.click_column("missing"));
        assert_eq!(grid.sort().direction, SortDirection::None);
    }

    #[test]
    fn stale_sort_key_after_column_change_is_a_no_op() {
        let mut grid = grid();
        grid.set_sort(SortState::descending("code"));
        let first = *grid.view().visible_rows[0].row_id;
        assert_eq!(first, 999);

        grid.set_columns(vec![ColumnDescriptor::text("zone", "Zone")]);
        let first = *grid.view().visible_rows[0].row_id;
        assert_eq!(first, 0);
    }

    #[test]
    fn replacing_records_prunes_selection_and_keeps_inputs() {
        let mut grid = grid();
        grid.set_query("LOC-000");
        grid.toggle(&3);
        grid.toggle(&7);
        grid.set_scroll_offset(96.0);

        grid.set_records(vec![location(3, "LOC-0003", None), location(4, "LOC-0004", None)])
            .unwrap();

        assert!(grid.is_selected(&3));
        assert!(!grid.is_selected(&7));
        assert_eq!(grid.query(), "LOC-000");
        assert_eq!(grid.viewport().scroll_offset, 96.0);
        assert_eq!(grid.filtered_count(), 2);
    }

    #[test]
    fn rejected_collection_keeps_previous_rows() {
        let mut grid = grid();
        let err = grid.set_records(vec![location(1, "a", None), location(1, "b", None)]);
        assert!(err.is_err());
        assert_eq!(grid.rows().len(), 1000);
    }

    #[test]
    fn select_all_covers_filtered_rows_only() {
        let mut grid = grid();
        grid.set_query("LOC-001");
        assert!(grid.select_all_visible());
        assert_eq!(grid.selection().len(), 10);

        let picked: Vec<u32> = grid.selected_records().iter().map(|loc| loc.id).collect();
        assert_eq!(picked, (10..20).collect::<Vec<_>>());

        assert!(!grid.select_all_visible());
        assert!(grid.selection().is_empty());
    }

    #[test]
    fn toggling_unknown_ids_does_nothing() {
        let mut grid = grid();
        assert!(!grid.toggle(&5000));
        assert!(grid.selection().is_empty());
    }

    #[test]
    fn scroll_clamp_reports_offsets_past_the_end() {
        let mut grid = grid();
        grid.set_scroll_offset(40_000.0);
        assert_eq!(grid.scroll_clamp(), None);

        grid.set_query("LOC-09");
        // 100 rows → 4800px content, 480px viewport
        assert_eq!(grid.scroll_clamp(), Some(4320.0));
    }

    #[test]
    fn density_changes_row_height() {
        let mut grid = grid();
        grid.set_density(Density::Compact);
        assert_eq!(grid.viewport().row_height, 36.0);

        grid.set_density_with(Density::Spacious, &|_: Density| 80.0);
        assert_eq!(grid.viewport().row_height, 80.0);
        assert_eq!(grid.density(), Density::Spacious);
    }

    #[test]
    fn pinned_row_height_survives_density_changes() {
        let mut grid = grid().with_row_height(Some(40.0));
        assert_eq!(grid.viewport().row_height, 40.0);

        grid.set_density(Density::Compact);
        assert_eq!(grid.viewport().row_height, 40.0);
        assert_eq!(grid.density(), Density::Compact);

        let mut grid = grid.with_row_height(None);
        assert_eq!(grid.viewport().row_height, 36.0);
        grid.set_density(Density::Spacious);
        assert_eq!(grid.viewport().row_height, 64.0);
    }

    #[test]
    fn non_finite_scroll_offsets_read_as_zero() {
        let mut grid = grid();
        assert!(grid.set_scroll_offset(120.0));
        assert!(grid.set_scroll_offset(f64::NAN));
        assert_eq!(grid.viewport().scroll_offset, 0.0);
        assert!(!grid.set_scroll_offset(f64::NAN));
        assert!(!grid.set_scroll_offset(f64::INFINITY));
    }

    #[test]
    fn highlights_follow_current_query() {
        let mut grid = grid();
        grid.set_query("0042");
        let _ = grid.view();
        let record = location(42, "LOC-0042", None);
        assert_eq!(grid.highlight_ranges(&record, "code"), vec![(4, 8)]);
        assert!(grid.highlight_ranges(&record, "nope").is_empty());
    }

    #[test]
    fn empty_collection_renders_nothing() {
        let mut grid: GridController<Location> =
            GridController::new(vec![], ViewportState::default());
        let view = grid.view();
        assert!(view.visible_rows.is_empty());
        assert_eq!(view.total_size, 0.0);
        assert!(view.is_empty());
    }
}
