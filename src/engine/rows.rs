//! Row model: records paired with their identity.
//!
//! A [`RowSet`] is built once per collection replacement. It captures each
//! record's id up front so later stages (selection lookups, pruning, view
//! output) never call back into [`Record::row_id`], and it enforces the
//! uniqueness contract on those ids.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::error::{GridError, Result};
use crate::domain::Record;

/// What to do when a collection contains the same row id twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Reject the whole collection with [`GridError::DuplicateRowId`].
    FailFast,
    /// Keep the first record carrying an id and drop the later ones.
    KeepFirst,
}

impl Default for DuplicatePolicy {
    /// Fails fast in debug builds and keeps the first record in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::FailFast
        } else {
            Self::KeepFirst
        }
    }
}

/// A record with its captured identity.
#[derive(Debug, Clone)]
pub struct Row<R: Record> {
    id: R::Id,
    record: R,
}

impl<R: Record> Row<R> {
    /// Row identity.
    pub const fn id(&self) -> &R::Id {
        &self.id
    }

    /// Caller payload, untouched.
    pub const fn record(&self) -> &R {
        &self.record
    }
}

/// The base collection of one grid instance, in caller order.
#[derive(Debug, Clone)]
pub struct RowSet<R: Record> {
    rows: Vec<Row<R>>,
    positions: HashMap<R::Id, usize>,
}

impl<R: Record> Default for RowSet<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<R: Record> RowSet<R> {
    /// Wraps `records`, enforcing id uniqueness according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateRowId`] on the first repeated id when
    /// `policy` is [`DuplicatePolicy::FailFast`].
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use virtgrid::domain::JsonRecord;
    /// use virtgrid::engine::{DuplicatePolicy, RowSet};
    ///
    /// let records = vec![
    ///     JsonRecord::from_value(json!({"id": 1}), "id", 0)?,
    ///     JsonRecord::from_value(json!({"id": 1}), "id", 1)?,
    /// ];
    ///
    /// assert!(RowSet::new(records.clone(), DuplicatePolicy::FailFast).is_err());
    /// assert_eq!(RowSet::new(records, DuplicatePolicy::KeepFirst)?.len(), 1);
    /// # Ok::<(), virtgrid::GridError>(())
    /// ```
    pub fn new(records: Vec<R>, policy: DuplicatePolicy) -> Result<Self> {
        let mut rows = Vec::with_capacity(records.len());
        let mut positions = HashMap::with_capacity(records.len());
        let mut dropped = 0_usize;

        for record in records {
            let id = record.row_id();
            if positions.contains_key(&id) {
                match policy {
                    DuplicatePolicy::FailFast => {
                        return Err(GridError::DuplicateRowId {
                            id: format!("{id:?}"),
                        });
                    }
                    DuplicatePolicy::KeepFirst => {
                        dropped += 1;
                        continue;
                    }
                }
            }
            positions.insert(id.clone(), rows.len());
            rows.push(Row { id, record });
        }

        if dropped > 0 {
            tracing::warn!(dropped, kept = rows.len(), "dropped records with duplicate row ids");
        }

        Ok(Self { rows, positions })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in caller order.
    #[must_use]
    pub fn rows(&self) -> &[Row<R>] {
        &self.rows
    }

    /// Row at base position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row<R>> {
        self.rows.get(index)
    }

    /// Base position of the row with `id`.
    #[must_use]
    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Whether a row with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &R::Id) -> bool {
        self.positions.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[derive(Debug, Clone)]
    struct Slot(u32, &'static str);

    impl Record for Slot {
        type Id = u32;

        fn row_id(&self) -> u32 {
            self.0
        }

        fn field(&self, _key: &str) -> FieldValue {
            FieldValue::from(self.1)
        }

        fn fields(&self) -> Vec<FieldValue> {
            vec![FieldValue::from(self.1)]
        }
    }

    #[test]
    fn captures_ids_and_positions() {
        let set = RowSet::new(vec![Slot(10, "a"), Slot(20, "b")], DuplicatePolicy::FailFast).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.position(&20), Some(1));
        assert!(set.contains(&10));
        assert!(!set.contains(&30));
        assert_eq!(set.get(0).map(|row| *row.id()), Some(10));
    }

    #[test]
    fn fail_fast_rejects_duplicates() {
        let err = RowSet::new(vec![Slot(1, "a"), Slot(1, "b")], DuplicatePolicy::FailFast).unwrap_err();
        assert!(matches!(err, GridError::DuplicateRowId { ref id } if id == "1"));
    }

    #[test]
    fn keep_first_drops_later_duplicates() {
        let set = RowSet::new(
            vec![Slot(1, "first"), Slot(2, "b"), Slot(1, "second")],
            DuplicatePolicy::KeepFirst,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        let kept = set.get(set.position(&1).unwrap()).unwrap();
        assert_eq!(kept.record().1, "first");
    }

    #[test]
    fn empty_collection_is_valid() {
        let set: RowSet<Slot> = RowSet::new(vec![], DuplicatePolicy::FailFast).unwrap();
        assert!(set.is_empty());
    }
}
