//! Selection store keyed by row identity.
//!
//! Selection is a set of row ids and nothing else. It does not know about
//! filtering, sorting or the render window, which is what lets a selection
//! survive a filter that temporarily hides selected rows.

use std::collections::HashSet;
use std::hash::Hash;

use crate::domain::Record;

/// Set of selected row ids.
///
/// # Examples
///
/// ```
/// use virtgrid::engine::SelectionStore;
///
/// let mut selection = SelectionStore::new();
/// selection.select_all([1, 2, 3].iter());
/// assert_eq!(selection.len(), 3);
///
/// // Record 2 disappears from the collection.
/// selection.prune(|id| *id != 2);
/// assert!(selection.is_selected(&1));
/// assert!(!selection.is_selected(&2));
/// assert!(selection.is_selected(&3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore<Id: Eq + Hash> {
    selected: HashSet<Id>,
}

impl<Id: Eq + Hash> Default for SelectionStore<Id> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<Id: Clone + Eq + Hash> SelectionStore<Id> {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Select-all toggle over the currently visible ids.
    ///
    /// Clears the selection when it already equals the visible set; otherwise
    /// replaces it with exactly the visible set. Selected rows that are not
    /// visible are dropped in the second case, so repeated clicks never
    /// accumulate. Returns whether the visible set is selected afterwards.
    pub fn select_all<'a, I>(&mut self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let visible: HashSet<Id> = visible.into_iter().cloned().collect();
        if self.selected == visible {
            self.selected.clear();
            false
        } else {
            self.selected = visible;
            true
        }
    }

    /// Removes every selected id for which `exists` returns `false`.
    ///
    /// Returns the number of ids removed.
    pub fn prune<F>(&mut self, exists: F) -> usize
    where
        F: Fn(&Id) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|id| exists(id));
        before - self.selected.len()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Iterates the selected ids in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.selected.iter()
    }

    /// Projects the selection back onto full records, in the order of `records`.
    pub fn selected_records<'a, R>(&self, records: &'a [R]) -> Vec<&'a R>
    where
        R: Record<Id = Id>,
    {
        if self.selected.is_empty() {
            return Vec::new();
        }
        records
            .iter()
            .filter(|record| self.selected.contains(&record.row_id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    struct Lot(u16);

    impl Record for Lot {
        type Id = u16;

        fn row_id(&self) -> u16 {
            self.0
        }

        fn field(&self, _key: &str) -> FieldValue {
            FieldValue::Null
        }

        fn fields(&self) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = SelectionStore::new();
        assert!(selection.toggle(7));
        assert!(selection.is_selected(&7));
        assert!(!selection.toggle(7));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_twice_clears() {
        let visible = [1, 2, 3];
        let mut selection = SelectionStore::new();

        assert!(selection.select_all(visible.iter()));
        assert_eq!(selection.len(), 3);
        assert!(!selection.select_all(visible.iter()));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_replaces_partial_selection() {
        let mut selection = SelectionStore::new();
        selection.toggle(1);
        selection.toggle(99);

        assert!(selection.select_all([1, 2].iter()));
        assert!(selection.is_selected(&2));
        assert!(!selection.is_selected(&99));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn prune_reports_removed_count() {
        let mut selection = SelectionStore::new();
        selection.select_all([1, 2, 3].iter());
        assert_eq!(selection.prune(|id| *id == 3), 2);
        assert_eq!(selection.iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn selected_records_follow_record_order() {
        let records = vec![Lot(5), Lot(1), Lot(9)];
        let mut selection = SelectionStore::new();
        selection.toggle(9);
        selection.toggle(5);

        let picked: Vec<u16> = selection
            .selected_records(&records)
            .into_iter()
            .map(|lot| lot.0)
            .collect();
        assert_eq!(picked, vec![5, 9]);
    }
}
