//! Tunables for the relaxation engine, the host and PDF layout.

use serde::{Deserialize, Serialize};

/// Default number of relaxation iterations per pass.
pub const DEFAULT_RELAXATION_ITERATIONS: usize = 30;

/// Squared page-space displacement at or below which a node is not written back.
pub const DEFAULT_MIN_DISPLACEMENT_SQ: f64 = 0.01;

/// Default cap on consecutive operation-complete passes in one flush.
pub const DEFAULT_MAX_OPERATION_PASSES: usize = 16;

/// Pin relaxation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    pub iterations: usize,
    pub min_displacement_sq: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_RELAXATION_ITERATIONS,
            min_displacement_sq: DEFAULT_MIN_DISPLACEMENT_SQ,
        }
    }
}

/// PDF page layout and camera settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Vertical gap between pages in page units.
    pub page_spacing: f64,
    /// Raster resolution multiplier applied on top of the device pixel ratio.
    pub visual_scale: f64,
    /// Viewport width below which the mobile camera padding is used.
    pub mobile_breakpoint: f64,
    pub desktop_padding_x: f64,
    pub mobile_padding_x: f64,
    pub padding_y: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_spacing: 32.0,
            visual_scale: 2.0,
            mobile_breakpoint: 840.0,
            desktop_padding_x: 164.0,
            mobile_padding_x: 16.0,
            padding_y: 64.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinboardConfig {
    pub relaxation: RelaxationConfig,
    pub pdf: PdfConfig,
    /// Guard against handlers that keep writing at every operation boundary.
    pub max_operation_passes: usize,
}

impl Default for PinboardConfig {
    fn default() -> Self {
        Self {
            relaxation: RelaxationConfig::default(),
            pdf: PdfConfig::default(),
            max_operation_passes: DEFAULT_MAX_OPERATION_PASSES,
        }
    }
}

impl PinboardConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
