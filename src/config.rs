use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabOcrError, Result};
use crate::lines::DEFAULT_LINE_TOLERANCE_PX;

/// Tunables for one extraction run. Every field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max vertical distance (px) between a word and a line key
    pub line_tolerance_px: i32,
    /// Minimum similarity for a field-name correction
    pub field_cutoff: f64,
    /// Minimum similarity for a unit correction
    pub unit_cutoff: f64,
    /// Phrase announcing the case number, matched case-insensitively
    pub dossier_marker: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_tolerance_px: DEFAULT_LINE_TOLERANCE_PX,
            field_cutoff: 0.70,
            unit_cutoff: 0.60,
            dossier_marker: "dossier n°".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LabOcrError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_tolerance_px < 0 {
            return Err(LabOcrError::InvalidConfig(format!(
                "line_tolerance_px must be >= 0, got {}",
                self.line_tolerance_px
            )));
        }
        let cutoffs = [("field_cutoff", self.field_cutoff), ("unit_cutoff", self.unit_cutoff)];
        for (name, cutoff) in cutoffs {
            if !(0.0..=1.0).contains(&cutoff) {
                return Err(LabOcrError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, cutoff
                )));
            }
        }
        if self.dossier_marker.trim().is_empty() {
            return Err(LabOcrError::InvalidConfig("dossier_marker is empty".to_string()));
        }
        Ok(())
    }
}
