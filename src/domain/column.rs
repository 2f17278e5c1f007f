//! Declarative column metadata.
//!
//! Columns belong to a grid instance's configuration, not to any record. The
//! engine only consults them to decide whether a sort key is valid; how a
//! column is drawn is resolved by the presentation layer through
//! [`ColumnDescriptor::display`].

use std::fmt;
use std::sync::Arc;

use super::record::{FieldValue, Record};

/// Custom cell formatter for a column.
pub type Formatter = Arc<dyn Fn(&FieldValue) -> String + Send + Sync>;

/// How a column turns a field value into display text.
#[derive(Clone)]
pub enum ColumnKind {
    /// Canonical string of the field value.
    Text,
    /// Caller-supplied formatter.
    Custom(Formatter),
}

impl fmt::Debug for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Metadata for one grid column.
///
/// # Examples
///
/// ```
/// use virtgrid::domain::{ColumnDescriptor, FieldValue};
///
/// let qty = ColumnDescriptor::custom("qty", "Quantity", |v: &FieldValue| format!("{v} pcs"))
///     .hidden_on_narrow();
/// assert!(!qty.visible_on_narrow_viewport);
///
/// let notes = ColumnDescriptor::text("notes", "Notes").unsortable();
/// assert!(!notes.sortable);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Field key passed to [`Record::field`].
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether clicking the header may sort by this column.
    pub sortable: bool,
    /// Display resolution for cells of this column.
    pub kind: ColumnKind,
    /// Whether the column stays visible on narrow viewports.
    pub visible_on_narrow_viewport: bool,
}

impl ColumnDescriptor {
    /// Creates a sortable text column visible on every viewport width.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            kind: ColumnKind::Text,
            visible_on_narrow_viewport: true,
        }
    }

    /// Creates a sortable column rendered through `formatter`.
    pub fn custom<F>(key: impl Into<String>, label: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&FieldValue) -> String + Send + Sync + 'static,
    {
        Self {
            kind: ColumnKind::Custom(Arc::new(formatter)),
            ..Self::text(key, label)
        }
    }

    /// Marks the column as not sortable.
    #[must_use]
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Hides the column on narrow viewports.
    #[must_use]
    pub fn hidden_on_narrow(mut self) -> Self {
        self.visible_on_narrow_viewport = false;
        self
    }

    /// Resolves the display text of this column for `record`.
    pub fn display<R: Record>(&self, record: &R) -> String {
        let value = record.field(&self.key);
        match &self.kind {
            ColumnKind::Text => value.to_string(),
            ColumnKind::Custom(formatter) => formatter(&value),
        }
    }
}

/// Looks up a column by key.
#[must_use]
pub fn find_column<'a>(columns: &'a [ColumnDescriptor], key: &str) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|column| column.key == key)
}

/// Returns the columns to lay out for the given viewport width class.
#[must_use]
pub fn columns_for_viewport(columns: &[ColumnDescriptor], narrow: bool) -> Vec<&ColumnDescriptor> {
    columns
        .iter()
        .filter(|column| !narrow || column.visible_on_narrow_viewport)
        .collect()
}
