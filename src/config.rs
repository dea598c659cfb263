//! Grid configuration and the size math derived from it.
//!
//! Every image in a grid is drawn at the same size: the page content width split
//! evenly across the columns, and a height taken from the single reference aspect
//! ratio `target_height / target_width`. The native proportions of the uploaded
//! images are never consulted.

use std::fs::read_to_string;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

pub const EMU_PER_INCH: f64 = 914_400.0;

pub const TWIPS_PER_INCH: f64 = 1_440.0;

/// Usable width of a Letter/A4 page with default margins.
pub const PAGE_CONTENT_WIDTH_INCHES: f64 = 6.5;

/// Ratio used when the target width is zero.
pub const DEFAULT_ASPECT_RATIO: f64 = 0.75;

pub const DEFAULT_COLUMNS: u32 = 2;
pub const DEFAULT_TARGET_WIDTH: u32 = 400;
pub const DEFAULT_TARGET_HEIGHT: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub target_width: u32,
    pub target_height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
        }
    }
}

impl GridConfig {
    /// Build a config from raw (possibly negative) form input.
    pub fn new(columns: i64, target_width: i64, target_height: i64) -> Result<Self> {
        let columns = u32::try_from(columns)
            .ok()
            .filter(|c| *c > 0)
            .ok_or(GridError::InvalidColumns(columns))?;
        let degenerate = || GridError::DegenerateTargetSize {
            width: target_width,
            height: target_height,
        };
        let target_width = u32::try_from(target_width).map_err(|_| degenerate())?;
        let target_height = u32::try_from(target_height).map_err(|_| degenerate())?;

        let config = Self {
            columns,
            target_width,
            target_height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file. Missing keys fall back to the defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        debug!("Reading grid config from {}", path.display());
        let raw = read_to_string(path).map_err(|e| GridError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| GridError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot be laid out.
    ///
    /// A zero target width is allowed and selects [`DEFAULT_ASPECT_RATIO`]. A zero
    /// target height against a real width would collapse every image to nothing.
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(GridError::InvalidColumns(0));
        }
        if self.target_width > 0 && self.target_height == 0 {
            return Err(GridError::DegenerateTargetSize {
                width: self.target_width.into(),
                height: 0,
            });
        }
        // Picture extents are written as u32 EMUs.
        if self.raw_image_height_emu() > f64::from(u32::MAX) {
            return Err(GridError::DegenerateTargetSize {
                width: self.target_width.into(),
                height: self.target_height.into(),
            });
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.target_width == 0 {
            DEFAULT_ASPECT_RATIO
        } else {
            f64::from(self.target_height) / f64::from(self.target_width)
        }
    }

    pub fn column_width_inches(&self) -> f64 {
        PAGE_CONTENT_WIDTH_INCHES / f64::from(self.columns.max(1))
    }

    pub fn column_width_emu(&self) -> u32 {
        (self.column_width_inches() * EMU_PER_INCH).round() as u32
    }

    pub fn image_height_emu(&self) -> u32 {
        self.raw_image_height_emu() as u32
    }

    fn raw_image_height_emu(&self) -> f64 {
        (self.column_width_inches() * self.aspect_ratio() * EMU_PER_INCH).round()
    }

    pub fn column_width_twips(&self) -> usize {
        (self.column_width_inches() * TWIPS_PER_INCH).round() as usize
    }
}
