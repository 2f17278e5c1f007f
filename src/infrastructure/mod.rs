//! Infrastructure layer: the engine's external collaborators.
//!
//! Both collaborators are plain value providers. The row-height provider turns
//! a density preference into pixels; the record source produces the base
//! collection. Neither carries any contract beyond "returns a value of the
//! expected shape".

pub mod density;
pub mod source;

pub use density::{Density, DensityHeights, RowHeightProvider};
pub use source::{parse_json_records, JsonSource, RecordSource, StaticSource};
