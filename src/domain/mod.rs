//! Domain layer for the grid engine.
//!
//! This module contains the types every other layer speaks in: the [`Record`]
//! abstraction that the caller's data implements, the [`FieldValue`] cells it
//! exposes, the declarative [`ColumnDescriptor`] metadata, and the crate error
//! type. Nothing here knows about filtering, sorting or windowing.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`record`]: Record trait, field values and the JSON-backed record
//! - [`column`]: Column metadata and per-column formatting
//!
//! # Examples
//!
//! ```
//! use virtgrid::domain::{ColumnDescriptor, FieldValue};
//!
//! let column = ColumnDescriptor::text("name", "Name");
//! assert!(column.sortable);
//! assert_eq!(FieldValue::Integer(42).canonical_string().as_deref(), Some("42"));
//! ```

pub mod column;
pub mod error;
pub mod record;

pub use column::{columns_for_viewport, find_column, ColumnDescriptor, ColumnKind, Formatter};
pub use error::{GridError, Result};
pub use record::{FieldValue, JsonRecord, Record};
