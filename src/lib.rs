//! Virtgrid: a windowed data-grid engine for large in-memory collections.
//!
//! Virtgrid turns a collection of records plus a handful of user inputs into
//! render instructions for a scrollable table:
//! - Case-insensitive free-text filtering across every field (substring or fuzzy)
//! - Single-column tri-state sorting with a stable, type-aware comparator
//! - Row selection keyed by stable identity, surviving filter and sort changes
//! - Viewport windowing so only the rows near the scroll position are materialized
//! - Memoized recomputation: scrolling never re-filters or re-sorts

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation layer (caller)                        │  ← Draws rows
//! └─────────────────────────────────────────────────────┘
//!                        │ GridEvent      ↑ GridView
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Owns inputs
//! │  - Event handling                                   │  ← Memoization
//! │  - Action dispatching                               │
//! │  - View computation                                 │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Engine        │   │ UI Layer      │   │ Infrastructure│
//! │ (engine/)     │   │ (ui/)         │   │ (infra/)      │
//! │ - Predicate   │   │ - GridView    │   │ - Row heights │
//! │ - Sort        │   │ - VisibleRow  │   │ - Sources     │
//! │ - Selection   │   │               │   │               │
//! │ - Windower    │   │               │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain Layer (domain/)                             │
//! │  - Record trait and field values                    │
//! │  - Column descriptors                               │
//! │  - Error types                                      │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing-subscriber setup                         │
//! │  - Rotating log file                                │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Grid controller with event/action model
//! - [`domain`]: Core domain types (records, columns, errors)
//! - [`engine`]: Pure pipeline stages (filter, sort, selection, window)
//! - [`infrastructure`]: Row-height provider and record sources
//! - [`ui`]: Render output types
//! - [`observability`]: Tracing subscriber setup
//!
//! # Configuration
//!
//! The grid is configured from TOML or from a host-provided string map:
//!
//! ```toml
//! overscan = 8
//! density = "compact"
//! viewport_height = 720.0
//! match_mode = "fuzzy"
//! trace_level = "debug"
//!
//! [heights]
//! compact = 32.0
//! ```
//!
//! # Examples
//!
//! ```rust
//! use virtgrid::{handle_event, initialize, GridConfig, GridEvent};
//! use virtgrid::domain::{ColumnDescriptor, JsonRecord};
//! use virtgrid::infrastructure::{JsonSource, RecordSource};
//!
//! let body = r#"[
//!     {"id": 1, "name": "Apple"},
//!     {"id": 2, "name": "Banana"},
//!     {"id": 3, "name": "apricot"}
//! ]"#;
//!
//! let config = GridConfig::default();
//! let mut grid = initialize(&config, vec![ColumnDescriptor::text("name", "Name")]);
//!
//! let records = JsonSource::from_reader(body.as_bytes(), "id")?.load()?;
//! handle_event(&mut grid, GridEvent::ReplaceRecords(records))?;
//! handle_event(&mut grid, GridEvent::SetQuery("ap".into()))?;
//! handle_event(&mut grid, GridEvent::ClickColumn("name".into()))?;
//!
//! let view = grid.view();
//! let ids: Vec<&str> = view.visible_rows.iter().map(|row| row.row_id.as_str()).collect();
//! assert_eq!(ids, ["1", "3"]);
//! assert_eq!(view.counter_label(), "2 of 3");
//! # Ok::<(), virtgrid::GridError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Index-Based Pipeline
//!
//! Filter and sort produce position lists into the base collection rather
//! than cloned records. Records are never copied after ingestion.
//!
//! ## Selection by Identity
//!
//! Selection stores row ids, never display positions, so it is independent of
//! the current filter, sort and scroll position.
//!
//! ## Uniform Row Height
//!
//! Every row shares one height, which keeps windowing O(1) arithmetic instead
//! of a measurement pass.
//!
//! # Performance Characteristics
//!
//! - **Filter**: O(N · fields) per query or collection change
//! - **Sort**: O(N log N) per sort, query or collection change
//! - **Scroll**: O(window) per event, independent of N

pub mod app;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod observability;
pub mod ui;

pub use app::{handle_event, Action, GridController, GridEvent, ViewportState};
pub use domain::{GridError, Result};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use domain::ColumnDescriptor;
use domain::Record;
use engine::{DuplicatePolicy, MatchMode};
use infrastructure::{Density, DensityHeights, RowHeightProvider};

/// Grid configuration.
///
/// # Example
///
/// ```toml
/// overscan = 5
/// density = "comfortable"
/// viewport_height = 600.0
/// match_mode = "substring"
/// duplicate_policy = "keep-first"
/// log_file = "/var/log/grid.log"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Rows rendered beyond each viewport edge. Default: 5
    pub overscan: usize,

    /// Initial row density. Default: `comfortable`
    pub density: Density,

    /// Row height per density in pixels.
    pub heights: DensityHeights,

    /// Fixed row height overriding the density table.
    pub row_height: Option<f64>,

    /// Initial scroll container height in pixels. Default: 600
    pub viewport_height: f64,

    /// Query matching algorithm. Default: `substring`
    pub match_mode: MatchMode,

    /// Handling of repeated row ids. Default: `fail-fast` in debug builds,
    /// `keep-first` in release builds.
    pub duplicate_policy: DuplicatePolicy,

    /// Tracing filter directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any
    /// `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Log file path. Logs go to stderr when unset.
    pub log_file: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            overscan: 5,
            density: Density::default(),
            heights: DensityHeights::default(),
            row_height: None,
            viewport_height: 600.0,
            match_mode: MatchMode::default(),
            duplicate_policy: DuplicatePolicy::default(),
            trace_level: None,
            log_file: None,
        }
    }
}

impl GridConfig {
    /// Parses configuration from a host-provided string map.
    ///
    /// Parsing is lenient: a missing or unparsable value falls back to its
    /// default and the fallback is logged.
    ///
    /// # Parsing Rules
    ///
    /// - `overscan`: String → `usize`
    /// - `density`: `compact` / `comfortable` / `spacious`
    /// - `compact_height`, `comfortable_height`, `spacious_height`: String → `f64`
    /// - `row_height`, `viewport_height`: String → `f64`
    /// - `match_mode`: `substring` / `fuzzy`
    /// - `duplicate_policy`: `fail-fast` / `keep-first`
    /// - `trace_level`, `log_file`: taken verbatim
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use virtgrid::GridConfig;
    /// use virtgrid::infrastructure::Density;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("overscan".to_string(), "8".to_string());
    /// map.insert("density".to_string(), "compact".to_string());
    /// map.insert("viewport_height".to_string(), "tall".to_string());
    ///
    /// let config = GridConfig::from_map(&map);
    /// assert_eq!(config.overscan, 8);
    /// assert_eq!(config.density, Density::Compact);
    /// assert_eq!(config.viewport_height, 600.0);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let heights = DensityHeights {
            compact: parse_or(config, "compact_height", defaults.heights.compact),
            comfortable: parse_or(config, "comfortable_height", defaults.heights.comfortable),
            spacious: parse_or(config, "spacious_height", defaults.heights.spacious),
        };

        let match_mode = match config.get("match_mode").map(|s| s.trim().to_ascii_lowercase()) {
            Some(mode) if mode == "fuzzy" => MatchMode::Fuzzy,
            Some(mode) if mode == "substring" => MatchMode::Substring,
            Some(mode) => {
                tracing::debug!(match_mode = %mode, "unknown match mode, using default");
                defaults.match_mode
            }
            None => defaults.match_mode,
        };

        let duplicate_policy =
            match config.get("duplicate_policy").map(|s| s.trim().to_ascii_lowercase()) {
                Some(policy) if policy == "fail-fast" => DuplicatePolicy::FailFast,
                Some(policy) if policy == "keep-first" => DuplicatePolicy::KeepFirst,
                Some(policy) => {
                    tracing::debug!(duplicate_policy = %policy, "unknown duplicate policy, using default");
                    defaults.duplicate_policy
                }
                None => defaults.duplicate_policy,
            };

        Self {
            overscan: parse_or(config, "overscan", defaults.overscan),
            density: parse_or(config, "density", defaults.density),
            heights,
            row_height: config.get("row_height").and_then(|s| s.trim().parse().ok()),
            viewport_height: parse_or(config, "viewport_height", defaults.viewport_height),
            match_mode,
            duplicate_policy,
            trace_level: config.get("trace_level").cloned(),
            log_file: config.get("log_file").cloned(),
        }
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Toml`] for malformed TOML, unknown keys or unknown
    /// enum values, and [`GridError::Config`] when [`validate`](Self::validate)
    /// fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use virtgrid::GridConfig;
    /// use virtgrid::engine::MatchMode;
    ///
    /// let config = GridConfig::from_toml_str("overscan = 2\nmatch_mode = \"fuzzy\"")?;
    /// assert_eq!(config.overscan, 2);
    /// assert_eq!(config.match_mode, MatchMode::Fuzzy);
    /// # Ok::<(), virtgrid::GridError>(())
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading grid configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks geometry values.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Config`] for non-positive or non-finite row
    /// heights and for a negative or non-finite viewport height.
    pub fn validate(&self) -> Result<()> {
        self.heights.validate()?;

        if let Some(height) = self.row_height {
            if !height.is_finite() || height <= 0.0 {
                return Err(GridError::Config(format!(
                    "row_height must be a positive number, got {height}"
                )));
            }
        }

        if !self.viewport_height.is_finite() || self.viewport_height < 0.0 {
            return Err(GridError::Config(format!(
                "viewport_height must be a non-negative number, got {}",
                self.viewport_height
            )));
        }

        Ok(())
    }

    /// Row height in pixels for the configured density.
    #[must_use]
    pub fn resolved_row_height(&self) -> f64 {
        self.row_height
            .unwrap_or_else(|| self.heights.row_height(self.density))
    }
}

fn parse_or<T: std::str::FromStr>(config: &BTreeMap<String, String>, key: &str, default: T) -> T {
    match config.get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(key, value = %raw, "unparsable config value, using default");
            default
        }),
        None => default,
    }
}

/// Creates a grid controller from configuration.
///
/// The controller starts with an empty collection, an empty query, no sort and
/// the scroll position at the top. Tracing is not installed here; call
/// [`observability::init_tracing`] once at startup for that.
///
/// # Example
///
/// ```rust
/// use virtgrid::{initialize, GridConfig, GridController};
/// use virtgrid::domain::JsonRecord;
/// use virtgrid::infrastructure::Density;
///
/// let config = GridConfig {
///     density: Density::Compact,
///     ..Default::default()
/// };
///
/// let grid: GridController<JsonRecord> = initialize(&config, vec![]);
/// assert_eq!(grid.viewport().row_height, 36.0);
/// ```
#[must_use]
pub fn initialize<R: Record>(config: &GridConfig, columns: Vec<ColumnDescriptor>) -> GridController<R> {
    tracing::debug!(
        overscan = config.overscan,
        density = %config.density,
        match_mode = ?config.match_mode,
        "initializing grid"
    );

    let viewport = ViewportState::new(
        config.viewport_height,
        config.resolved_row_height(),
        config.overscan,
    );

    GridController::new(columns, viewport)
        .with_duplicate_policy(config.duplicate_policy)
        .with_match_mode(config.match_mode)
        .with_density(config.density, config.heights)
        .with_row_height(config.row_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_parsing_falls_back_per_key() {
        let mut map = BTreeMap::new();
        map.insert("overscan".to_string(), "-3".to_string());
        map.insert("density".to_string(), " Spacious ".to_string());
        map.insert("match_mode".to_string(), "FUZZY".to_string());
        map.insert("duplicate_policy".to_string(), "keep-first".to_string());
        map.insert("compact_height".to_string(), "30".to_string());
        map.insert("trace_level".to_string(), "virtgrid=trace".to_string());

        let config = GridConfig::from_map(&map);
        assert_eq!(config.overscan, 5);
        assert_eq!(config.density, Density::Spacious);
        assert_eq!(config.match_mode, MatchMode::Fuzzy);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepFirst);
        assert_eq!(config.heights.compact, 30.0);
        assert_eq!(config.heights.spacious, 64.0);
        assert_eq!(config.trace_level.as_deref(), Some("virtgrid=trace"));
    }

    #[test]
    fn toml_rejects_bad_geometry() {
        assert!(matches!(
            GridConfig::from_toml_str("row_height = 0.0"),
            Err(GridError::Config(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("[heights]\ncompact = -1.0"),
            Err(GridError::Config(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("viewport_height = -10.0"),
            Err(GridError::Config(_))
        ));
    }

    #[test]
    fn toml_rejects_unknown_values() {
        assert!(matches!(
            GridConfig::from_toml_str("density = \"cramped\""),
            Err(GridError::Toml(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("rows_per_page = 10"),
            Err(GridError::Toml(_))
        ));
    }

    #[test]
    fn partial_heights_table_keeps_other_defaults() {
        let config = GridConfig::from_toml_str("density = \"compact\"\n[heights]\ncompact = 28.0").unwrap();
        assert_eq!(config.resolved_row_height(), 28.0);
        assert_eq!(config.heights.comfortable, 48.0);
    }

    #[test]
    fn row_height_override_wins_over_density() {
        let config = GridConfig {
            row_height: Some(40.0),
            density: Density::Spacious,
            ..Default::default()
        };
        let grid: GridController<domain::JsonRecord> = initialize(&config, vec![]);
        assert_eq!(grid.viewport().row_height, 40.0);
        assert_eq!(grid.density(), Density::Spacious);
    }
}
