//! Record source boundary.
//!
//! Fetching the base collection (REST calls, fixtures, caches) happens outside
//! the engine and before the controller sees anything. [`RecordSource`] is the
//! minimal contract for that collaborator: hand back a full collection.

use serde_json::Value;
use std::io::Read;

use crate::domain::error::Result;
use crate::domain::{JsonRecord, Record};

/// Supplies a complete base collection on demand.
pub trait RecordSource<R: Record> {
    /// Returns the current collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be produced or parsed.
    fn load(&mut self) -> Result<Vec<R>>;
}

/// In-memory source returning a clone of a fixed collection.
#[derive(Debug, Clone, Default)]
pub struct StaticSource<R> {
    records: Vec<R>,
}

impl<R> StaticSource<R> {
    #[must_use]
    pub const fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Replaces the collection returned by later loads.
    pub fn replace(&mut self, records: Vec<R>) {
        self.records = records;
    }
}

impl<R: Record + Clone> RecordSource<R> for StaticSource<R> {
    fn load(&mut self) -> Result<Vec<R>> {
        Ok(self.records.clone())
    }
}

/// Source parsing a JSON array of objects into [`JsonRecord`]s.
///
/// # Examples
///
/// ```
/// use virtgrid::domain::Record;
/// use virtgrid::infrastructure::{JsonSource, RecordSource};
///
/// let body = r#"[{"id": 1, "bin": "A-01"}, {"id": 2, "bin": "A-02"}]"#;
/// let mut source = JsonSource::from_reader(body.as_bytes(), "id")?;
/// let records = source.load()?;
/// assert_eq!(records[1].row_id(), "2");
/// # Ok::<(), virtgrid::GridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonSource {
    body: String,
    id_field: String,
}

impl JsonSource {
    /// Buffers the JSON document from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`](crate::GridError::Io) if reading fails.
    pub fn from_reader<Rd: Read>(mut reader: Rd, id_field: impl Into<String>) -> Result<Self> {
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(Self {
            body,
            id_field: id_field.into(),
        })
    }
}

impl RecordSource<JsonRecord> for JsonSource {
    fn load(&mut self) -> Result<Vec<JsonRecord>> {
        parse_json_records(&self.body, &self.id_field)
    }
}

/// Parses a JSON array of objects, identifying each by `id_field`.
///
/// # Errors
///
/// Returns [`GridError::Json`](crate::GridError::Json) for malformed JSON or a
/// non-array document, and [`GridError::MissingRowId`](crate::GridError::MissingRowId)
/// for an element without a usable id.
pub fn parse_json_records(body: &str, id_field: &str) -> Result<Vec<JsonRecord>> {
    let values: Vec<Value> = serde_json::from_str(body)?;
    let records = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| JsonRecord::from_value(value, id_field, index))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = records.len(), id_field, "parsed JSON records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GridError;

    #[test]
    fn static_source_returns_its_collection() {
        let body = r#"[{"id": "a"}]"#;
        let mut source = StaticSource::new(parse_json_records(body, "id").unwrap());
        assert_eq!(source.load().unwrap().len(), 1);

        source.replace(Vec::new());
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn json_source_reports_element_without_id() {
        let body = r#"[{"id": 1}, {"name": "orphan"}]"#;
        let mut source = JsonSource::from_reader(body.as_bytes(), "id").unwrap();
        let err = source.load().unwrap_err();
        assert!(matches!(err, GridError::MissingRowId { index: 1, .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_json_records("{\"id\": 1}", "id"),
            Err(GridError::Json(_))
        ));
    }
}
