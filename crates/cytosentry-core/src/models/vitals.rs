use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::alert::Severity;

/// Raw vital signs for one timepoint. Every field is optional; derived
/// calculations guard on presence before computing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl VitalSigns {
    pub fn validate(&self) -> Result<()> {
        if let (Some(s), Some(d)) = (self.systolic_bp, self.diastolic_bp)
            && s < d
        {
            return Err(EngineError::InvalidInput(format!(
                "systolic {s} below diastolic {d}"
            )));
        }
        for (name, value) in [
            ("systolic_bp", self.systolic_bp),
            ("diastolic_bp", self.diastolic_bp),
            ("heart_rate", self.heart_rate),
            ("respiratory_rate", self.respiratory_rate),
            ("spo2", self.spo2),
            ("temperature", self.temperature),
        ] {
            if let Some(v) = value
                && (!v.is_finite() || v < 0.0)
            {
                return Err(EngineError::InvalidInput(format!(
                    "vital {name} out of range: {v}"
                )));
            }
        }
        Ok(())
    }
}

/// A derived vital with the severity tag assigned at derivation time.
/// The alert engine consumes these tags; it does not recompute thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedVital {
    pub value: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedVitals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<TaggedVital>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shock_index: Option<TaggedVital>,
}
