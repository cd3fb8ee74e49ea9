//! Runtime configuration for the front ends.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::preview::Size;

/// Default composite output file name.
const DEFAULT_OUTPUT: &str = "color_vision_simulation_output.png";
/// Environment variable overriding the composite output path.
pub const OUTPUT_ENV: &str = "CVDSIM_OUTPUT";

/// Settings shared by the batch figure and the interactive session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Where the composite figure is written.
    pub output_path: PathBuf,
    /// Bounding box for the original-image preview.
    pub preview_size: Size,
    /// Bounding box for each simulated result preview.
    pub result_size: Size,
    /// Image area of one composite figure cell, excluding the caption band.
    pub cell_size: Size,
    /// Integer scale of the caption font.
    pub title_scale: u32,
    /// Padding around each cell in pixels.
    pub padding: u32,
    /// Figure background color.
    pub background: [u8; 3],
    /// Caption color.
    pub text_color: [u8; 3],
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            output_path: output_path_or_default(std::env::var_os(OUTPUT_ENV)),
            preview_size: Size::new(400, 400),
            result_size: Size::new(300, 300),
            cell_size: Size::new(320, 240),
            title_scale: 2,
            padding: 12,
            background: [255, 255, 255],
            text_color: [0, 0, 0],
        }
    }
}

/// `$CVDSIM_OUTPUT` when set and non-empty, else the built-in file name.
fn output_path_or_default(value: Option<OsString>) -> PathBuf {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from)
}

impl SimulatorConfig {
    /// Load a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| SimError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
