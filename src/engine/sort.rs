//! Sort engine and the header-click sort state machine.
//!
//! Sorting orders the *filtered* row positions by one column. The sort is
//! stable, text compares case-insensitively, and missing values always sink to
//! the bottom: direction flips the comparison of present values but never the
//! placement of nulls.
//!
//! A sort request naming a column that no longer exists (or is not sortable)
//! is treated as "unsorted". Column sets change while UI state still holds the
//! old key, so this path is expected and is not an error.
//!
//! # State Machine
//!
//! ```text
//! None --click(k)--> Ascending(k) --click(k)--> Descending(k) --click(k)--> None
//!   any state --click(other)--> Ascending(other)
//! ```

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

use super::rows::Row;
use crate::domain::column::find_column;
use crate::domain::{ColumnDescriptor, FieldValue, Record};

/// Sort direction of the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Caller order, no sorting applied.
    #[default]
    None,
}

/// The user's sort request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    /// Column key, `None` when unsorted.
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Unsorted state.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self {
            key: None,
            direction: SortDirection::None,
        }
    }

    /// Ascending sort on `key`.
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on `key`.
    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: SortDirection::Descending,
        }
    }

    /// Advances the state machine for a header click on `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use virtgrid::engine::{SortDirection, SortState};
    ///
    /// let mut sort = SortState::unsorted();
    /// sort.click("name");
    /// assert_eq!(sort, SortState::ascending("name"));
    /// sort.click("name");
    /// assert_eq!(sort, SortState::descending("name"));
    /// sort.click("name");
    /// assert_eq!(sort.direction, SortDirection::None);
    /// sort.click("qty");
    /// assert_eq!(sort, SortState::ascending("qty"));
    /// ```
    pub fn click(&mut self, key: &str) {
        let same_key = self.key.as_deref() == Some(key);
        *self = match (same_key, self.direction) {
            (true, SortDirection::Ascending) => Self::descending(key),
            (true, SortDirection::Descending) => Self::unsorted(),
            _ => Self::ascending(key),
        };
    }

    /// Whether this state requests any ordering at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.key.is_some() && self.direction != SortDirection::None
    }
}

/// Resolves a sort request against the current columns.
///
/// Returns `None` (no-op) when the state is inactive or its key does not name
/// a sortable column.
#[must_use]
pub fn resolve_sort<'a>(
    state: &'a SortState,
    columns: &[ColumnDescriptor],
) -> Option<(&'a str, SortDirection)> {
    if !state.is_active() {
        return None;
    }
    let key = state.key.as_deref()?;
    match find_column(columns, key) {
        Some(column) if column.sortable => Some((key, state.direction)),
        _ => {
            tracing::debug!(sort_key = %key, "sort key has no sortable column, leaving order unchanged");
            None
        }
    }
}

/// Sorts the row positions in `order` according to `state`.
///
/// Returns `order` borrowed and untouched when the sort resolves to a no-op.
/// Otherwise returns a new, stably sorted vector of the same positions.
pub fn sort_indices<'a, R: Record>(
    rows: &[Row<R>],
    order: &'a [usize],
    state: &SortState,
    columns: &[ColumnDescriptor],
) -> Cow<'a, [usize]> {
    let Some((key, direction)) = resolve_sort(state, columns) else {
        return Cow::Borrowed(order);
    };

    let mut keyed: Vec<(SortKey, usize)> = order
        .iter()
        .map(|&idx| {
            let value = rows.get(idx).map_or(FieldValue::Null, |row| row.record().field(key));
            (SortKey::from(value), idx)
        })
        .collect();

    // `sort_by` is stable, so ties keep their filtered order.
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, direction));

    Cow::Owned(keyed.into_iter().map(|(_, idx)| idx).collect())
}

/// Comparable projection of a field value.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Instant(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) | Self::Number(_) => 2,
            Self::Instant(_) => 3,
            Self::Text(_) => 4,
        }
    }
}

impl From<FieldValue> for SortKey {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Self::Null,
            FieldValue::Bool(b) => Self::Bool(b),
            FieldValue::Integer(i) => Self::Integer(i),
            FieldValue::Float(f) if f.is_nan() => Self::Null,
            FieldValue::Float(f) => Self::Number(f),
            FieldValue::Text(s) => Self::Text(s.to_lowercase()),
            FieldValue::Date(d) => Self::Instant(d.and_time(NaiveTime::MIN).and_utc()),
            FieldValue::DateTime(dt) => Self::Instant(dt),
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortKey::Null, SortKey::Null) => Ordering::Equal,
        (SortKey::Null, _) => Ordering::Greater,
        (_, SortKey::Null) => Ordering::Less,
        _ => {
            let base = natural_order(a, b);
            match direction {
                SortDirection::Descending => base.reverse(),
                SortDirection::Ascending | SortDirection::None => base,
            }
        }
    }
}

fn natural_order(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(y),
        (SortKey::Integer(x), SortKey::Integer(y)) => x.cmp(y),
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        #[allow(clippy::cast_precision_loss)]
        (SortKey::Integer(x), SortKey::Number(y)) => (*x as f64).total_cmp(y),
        #[allow(clippy::cast_precision_loss)]
        (SortKey::Number(x), SortKey::Integer(y)) => x.total_cmp(&(*y as f64)),
        (SortKey::Instant(x), SortKey::Instant(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        // Mixed types in one column: group by type so the order stays total.
        _ => a.rank().cmp(&b.rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rows::{DuplicatePolicy, RowSet};

    #[derive(Debug, Clone)]
    struct Pick {
        id: u32,
        name: &'static str,
        qty: Option<i64>,
    }

    impl Record for Pick {
        type Id = u32;

        fn row_id(&self) -> u32 {
            self.id
        }

        fn field(&self, key: &str) -> FieldValue {
            match key {
                "name" => FieldValue::from(self.name),
                "qty" => FieldValue::from(self.qty),
                _ => FieldValue::Null,
            }
        }

        fn fields(&self) -> Vec<FieldValue> {
            vec![self.field("name"), self.field("qty")]
        }
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::text("qty", "Qty"),
            ColumnDescriptor::text("notes", "Notes").unsortable(),
        ]
    }

    fn rows() -> RowSet<Pick> {
        RowSet::new(
            vec![
                Pick { id: 1, name: "banana", qty: Some(3) },
                Pick { id: 2, name: "Apple", qty: None },
                Pick { id: 3, name: "cherry", qty: Some(3) },
                Pick { id: 4, name: "apricot", qty: Some(1) },
                Pick { id: 5, name: "date", qty: None },
            ],
            DuplicatePolicy::FailFast,
        )
        .unwrap()
    }

    fn ids(rows: &RowSet<Pick>, order: &[usize]) -> Vec<u32> {
        order.iter().map(|&i| *rows.get(i).unwrap().id()).collect()
    }

    #[test]
    fn unsorted_state_borrows_input() {
        let rows = rows();
        let order = vec![4, 0, 2];
        let sorted = sort_indices(rows.rows(), &order, &SortState::unsorted(), &columns());
        assert!(matches!(sorted, Cow::Borrowed(_)));
        assert_eq!(&*sorted, &[4, 0, 2]);
    }

    #[test]
    fn text_sort_is_case_insensitive() {
        let rows = rows();
        let order: Vec<usize> = (0..rows.len()).collect();
        let sorted = sort_indices(rows.rows(), &order, &SortState::ascending("name"), &columns());
        assert_eq!(ids(&rows, &sorted), vec![2, 4, 1, 3, 5]);
    }

    #[test]
    fn nulls_sink_in_both_directions_and_ties_stay_stable() {
        let rows = rows();
        let order: Vec<usize> = (0..rows.len()).collect();

        let asc = sort_indices(rows.rows(), &order, &SortState::ascending("qty"), &columns());
        assert_eq!(ids(&rows, &asc), vec![4, 1, 3, 2, 5]);

        let desc = sort_indices(rows.rows(), &order, &SortState::descending("qty"), &columns());
        assert_eq!(ids(&rows, &desc), vec![1, 3, 4, 2, 5]);
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let rows = rows();
        let order: Vec<usize> = (0..rows.len()).collect();
        let state = SortState::descending("qty");
        let once = sort_indices(rows.rows(), &order, &state, &columns()).into_owned();
        let twice = sort_indices(rows.rows(), &once, &state, &columns()).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_or_unsortable_keys_are_no_ops() {
        let rows = rows();
        let order = vec![3, 1, 0];

        let unknown = sort_indices(rows.rows(), &order, &SortState::ascending("gone"), &columns());
        assert_eq!(&*unknown, &[3, 1, 0]);

        let unsortable = sort_indices(rows.rows(), &order, &SortState::ascending("notes"), &columns());
        assert_eq!(&*unsortable, &[3, 1, 0]);
    }

    #[test]
    fn key_without_direction_is_inactive() {
        let state = SortState {
            key: Some("name".into()),
            direction: SortDirection::None,
        };
        assert!(!state.is_active());
        assert!(resolve_sort(&state, &columns()).is_none());
    }

    #[test]
    fn click_on_another_column_restarts_ascending() {
        let mut state = SortState::descending("name");
        state.click("qty");
        assert_eq!(state, SortState::ascending("qty"));

        let mut state = SortState::unsorted();
        state.click("qty");
        state.click("qty");
        state.click("qty");
        state.click("qty");
        assert_eq!(state, SortState::ascending("qty"));
    }

    #[test]
    fn mixed_numbers_and_dates_order_consistently() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let early = SortKey::from(FieldValue::Date(d));
        let late = SortKey::from(FieldValue::DateTime(
            d.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        ));
        assert_eq!(compare_keys(&early, &late, SortDirection::Ascending), Ordering::Less);
        assert_eq!(
            compare_keys(&SortKey::Number(1.0), &SortKey::Text("a".into()), SortDirection::Ascending),
            Ordering::Less
        );
        assert_eq!(
            compare_keys(&SortKey::from(FieldValue::Float(f64::NAN)), &SortKey::Number(1.0), SortDirection::Descending),
            Ordering::Greater
        );
    }

    #[test]
    fn large_integers_keep_exact_order() {
        let big = SortKey::from(FieldValue::Integer(9_007_199_254_740_993));
        let smaller = SortKey::from(FieldValue::Integer(9_007_199_254_740_992));
        assert_eq!(compare_keys(&smaller, &big, SortDirection::Ascending), Ordering::Less);
        assert_eq!(compare_keys(&smaller, &big, SortDirection::Descending), Ordering::Greater);

        assert_eq!(
            compare_keys(&SortKey::Integer(2), &SortKey::Number(2.5), SortDirection::Ascending),
            Ordering::Less
        );
        assert_eq!(
            compare_keys(&SortKey::Number(-0.5), &SortKey::Integer(0), SortDirection::Ascending),
            Ordering::Less
        );
    }
}
