//! Presentation boundary.
//!
//! The engine stops at render instructions. Drawing them (terminal, GUI or
//! DOM) belongs to the caller.
//!
//! ```text
//! GridController → view() → GridView → caller's renderer
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: Frame output types

pub mod viewmodel;

pub use viewmodel::{GridView, VisibleRow};
