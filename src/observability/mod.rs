//! Structured logging built on `tracing`.
//!
//! The engine instruments itself with `tracing` spans and events; this module
//! is the optional sink side for hosts that do not install their own
//! subscriber.
//!
//! # Architecture
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → stderr | RotatingFileWriter
//! ```
//!
//! # Features
//!
//! - **Level Control**: `RUST_LOG` first, then `trace_level`, then `"info"`
//! - **Automatic Rotation**: Log files rotate at 10 MiB with 3-backup retention
//! - **Spans**: `filter` and `sort` spans wrap every recomputation, and
//!   `handle_event` wraps every event
//!
//! # Usage
//!
//! Initialize tracing early in the host's lifecycle:
//!
//! ```rust
//! use virtgrid::observability::init_tracing;
//! use virtgrid::GridConfig;
//!
//! init_tracing(&GridConfig::default());
//! tracing::info!("grid host started");
//! ```
//!
//! # Modules
//!
//! - `init`: Subscriber setup
//! - `file_writer`: Rotating file writer with size-based rotation

mod file_writer;
mod init;

pub use file_writer::RotatingFileWriter;
pub use init::init_tracing;
