use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::reference;

/// A single measured analyte. Units must match the canonical unit recorded in
/// the reference table; the engine never guesses a conversion it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub value: f64,
    pub unit: String,
}

/// One timepoint's lab panel, keyed by canonical analyte name
/// (lowercase, e.g. "ferritin", "crp", "platelets").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    #[serde(default)]
    pub analytes: BTreeMap<String, LabValue>,
}

impl LabPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, analyte: &str, value: f64, unit: &str) {
        self.analytes.insert(
            analyte.to_ascii_lowercase(),
            LabValue {
                value,
                unit: unit.to_string(),
            },
        );
    }

    /// Returns the value for `analyte` if present, in canonical units, and
    /// within the physiologically valid bounds of the reference table.
    /// Absent, non-finite, or out-of-bounds values all read as `None`;
    /// callers turn that into a skip reason, never into a default.
    #[must_use]
    pub fn usable(&self, analyte: &str) -> Option<f64> {
        let entry = self.analytes.get(analyte)?;
        let spec = reference::analyte_spec(analyte)?;
        if !entry.value.is_finite() || !entry.unit.eq_ignore_ascii_case(spec.unit) {
            return None;
        }
        if entry.value < spec.valid_min || entry.value > spec.valid_max {
            return None;
        }
        Some(entry.value)
    }

    /// Validates every entry against the reference table up front. Unknown
    /// analytes are tolerated (panels carry more than the engine consumes);
    /// a known analyte with the wrong unit is a contract violation.
    pub fn validate(&self) -> Result<()> {
        for (name, entry) in &self.analytes {
            let Some(spec) = reference::analyte_spec(name) else {
                continue;
            };
            if !entry.unit.eq_ignore_ascii_case(spec.unit) {
                return Err(EngineError::InvalidInput(format!(
                    "analyte {name} expects unit {}, got {}",
                    spec.unit, entry.unit
                )));
            }
            if !entry.value.is_finite() {
                return Err(EngineError::InvalidInput(format!(
                    "analyte {name} has non-finite value"
                )));
            }
            if entry.value < 0.0 {
                return Err(EngineError::InvalidInput(format!(
                    "analyte {name} cannot be negative"
                )));
            }
        }
        Ok(())
    }
}
