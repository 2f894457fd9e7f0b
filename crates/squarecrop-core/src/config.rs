//! Per-session configuration.
//!
//! [`CropConfig`] is what the host passes when opening an editor. Every field
//! has a default, so hosts only need to send what they want to change. Field
//! names are camelCase on the wire to match JavaScript callers:
//!
//! ```json
//! { "stageSize": 320, "outputSize": 1024, "outputFormat": "png", "fileName": "logo.png" }
//! ```
//!
//! Leaving out `fileName` names the file after the format:
//!
//! ```json
//! { "outputFormat": "png" }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::OutputFormat;
use crate::gesture::DEFAULT_WHEEL_SENSITIVITY;

pub const DEFAULT_STAGE_SIZE: f64 = 360.0;
pub const DEFAULT_OUTPUT_SIZE: u32 = 512;
pub const DEFAULT_QUALITY: u8 = 90;
/// File stem used when the host does not name the output.
pub const DEFAULT_FILE_STEM: &str = "cropped";

/// Upper bound for the output side length (keeps a single raster under
/// ~200 MB of RGB data).
pub const MAX_OUTPUT_SIZE: u32 = 8192;

/// Errors from validating a [`CropConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Output size must be between 1 and {max}, got {size}")]
    InvalidOutputSize { size: u32, max: u32 },

    #[error("Stage size must be a positive number, got {0}")]
    InvalidStageSize(f64),

    #[error("Output file name must not be empty")]
    EmptyFileName,

    #[error("Wheel sensitivity must be a finite number, got {0}")]
    InvalidWheelSensitivity(f64),
}

/// Host-provided configuration for one crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    /// Preferred stage side length in pixels; shrunk to fit the viewport.
    pub stage_size: f64,
    /// Output raster side length in pixels.
    pub output_size: u32,
    /// Encoded output format.
    pub output_format: OutputFormat,
    /// Lossy quality (1-100); ignored for lossless output.
    pub quality: u8,
    /// Name given to the produced file. Defaults to `cropped.<ext>` for the
    /// chosen format.
    pub file_name: Option<String>,
    /// Zoom change per wheel delta unit.
    pub wheel_sensitivity: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            stage_size: DEFAULT_STAGE_SIZE,
            output_size: DEFAULT_OUTPUT_SIZE,
            output_format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
            file_name: None,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
        }
    }
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the configuration can drive a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_size == 0 || self.output_size > MAX_OUTPUT_SIZE {
            return Err(ConfigError::InvalidOutputSize {
                size: self.output_size,
                max: MAX_OUTPUT_SIZE,
            });
        }
        if !self.stage_size.is_finite() || self.stage_size <= 0.0 {
            return Err(ConfigError::InvalidStageSize(self.stage_size));
        }
        if matches!(&self.file_name, Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::EmptyFileName);
        }
        if !self.wheel_sensitivity.is_finite() {
            return Err(ConfigError::InvalidWheelSensitivity(self.wheel_sensitivity));
        }
        Ok(())
    }

    /// Validate and extract the fixed export settings.
    pub fn output_spec(&self) -> Result<OutputSpec, ConfigError> {
        self.validate()?;
        Ok(OutputSpec {
            size: self.output_size,
            format: self.output_format,
            quality: self.quality.clamp(1, 100),
            file_name: self.resolved_file_name(),
        })
    }

    fn resolved_file_name(&self) -> String {
        match &self.file_name {
            Some(name) => name.trim().to_string(),
            None => format!("{}.{}", DEFAULT_FILE_STEM, self.output_format.extension()),
        }
    }
}

/// Export settings, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub size: u32,
    pub format: OutputFormat,
    pub quality: u8,
    pub file_name: String,
}
