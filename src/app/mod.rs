//! Application layer coordinating grid state, events, and actions.
//!
//! This layer sits between a presentation layer (whatever draws the rows) and
//! the pure engine stages. It owns every mutable input and memoizes the
//! derived filter and sort results.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Input → GridEvent → handle_event → GridController mutations → Actions
//!                                                ↓
//!                                 view() → GridView → caller's renderer
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Follow-up commands emitted by the event handler
//! - [`controller`]: Memoized filter → sort → window pipeline
//! - [`handler`]: Event processing and redraw decisions
//! - [`viewport`]: Scroll container geometry

pub mod actions;
pub mod controller;
pub mod handler;
pub mod viewport;

pub use actions::Action;
pub use controller::{CacheStats, GridController};
pub use handler::{handle_event, GridEvent};
pub use viewport::ViewportState;
