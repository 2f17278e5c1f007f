//! Row density and the row-height provider boundary.
//!
//! The presentation layer owns the density preference; the engine only needs
//! the pixel height it maps to. [`RowHeightProvider`] is that seam, with
//! [`DensityHeights`] as the stock table. Any `Fn(Density) -> f64` closure is
//! a provider too.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{GridError, Result};

/// UI density preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Density {
    Compact,
    #[default]
    Comfortable,
    Spacious,
}

impl Density {
    /// Configuration name of the density.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Comfortable => "comfortable",
            Self::Spacious => "spacious",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "comfortable" => Ok(Self::Comfortable),
            "spacious" => Ok(Self::Spacious),
            other => Err(GridError::Config(format!("unknown density `{other}`"))),
        }
    }
}

/// Maps a density to a row height in pixels.
pub trait RowHeightProvider {
    fn row_height(&self, density: Density) -> f64;
}

impl<F> RowHeightProvider for F
where
    F: Fn(Density) -> f64,
{
    fn row_height(&self, density: Density) -> f64 {
        self(density)
    }
}

/// Row height per density, overridable from configuration.
///
/// # Examples
///
/// ```
/// use virtgrid::infrastructure::{Density, DensityHeights, RowHeightProvider};
///
/// let heights = DensityHeights::default();
/// assert_eq!(heights.row_height(Density::Comfortable), 48.0);
/// assert_eq!(heights.row_height(Density::Compact), 36.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityHeights {
    pub compact: f64,
    pub comfortable: f64,
    pub spacious: f64,
}

impl Default for DensityHeights {
    fn default() -> Self {
        Self {
            compact: 36.0,
            comfortable: 48.0,
            spacious: 64.0,
        }
    }
}

impl DensityHeights {
    /// Rejects non-positive or non-finite heights.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Config`] naming the first invalid density.
    pub fn validate(&self) -> Result<()> {
        for density in [Density::Compact, Density::Comfortable, Density::Spacious] {
            let height = self.row_height(density);
            if !height.is_finite() || height <= 0.0 {
                return Err(GridError::Config(format!(
                    "row height for `{density}` must be a positive number, got {height}"
                )));
            }
        }
        Ok(())
    }
}

impl RowHeightProvider for DensityHeights {
    fn row_height(&self, density: Density) -> f64 {
        match density {
            Density::Compact => self.compact,
            Density::Comfortable => self.comfortable,
            Density::Spacious => self.spacious,
        }
    }
}
