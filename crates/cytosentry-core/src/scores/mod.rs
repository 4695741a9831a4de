use serde::{Deserialize, Serialize};

use crate::models::{ClinicalState, LabPanel, RiskLevel, ScoreResult, VitalSigns};

mod easix;
mod hematotox;
mod hscore;

pub(crate) use hscore::HSCORE_HIGH_THRESHOLD;

/// Every prognostic model the engine knows. Aggregation and alerting iterate
/// the registry, so a model added here is wired everywhere by construction;
/// there is no string-keyed dispatch to fall out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    HScore,
    Easix,
    ModifiedEasix,
    CarHematotox,
}

impl ModelId {
    pub const ALL: [Self; 4] = [
        Self::HScore,
        Self::Easix,
        Self::ModifiedEasix,
        Self::CarHematotox,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    pub(crate) fn spec(self) -> &'static ModelSpec {
        match self {
            Self::HScore => &hscore::SPEC,
            Self::Easix => &easix::EASIX_SPEC,
            Self::ModifiedEasix => &easix::MODIFIED_EASIX_SPEC,
            Self::CarHematotox => &hematotox::SPEC,
        }
    }
}

/// Immutable snapshot of one timepoint, shared by every model.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub labs: &'a LabPanel,
    pub vitals: &'a VitalSigns,
    pub clinical: &'a ClinicalState,
}

pub(crate) enum ModelOutcome {
    Scored { value: f64, risk_level: RiskLevel },
    Skipped { missing_inputs: Vec<String> },
}

pub(crate) struct ModelSpec {
    pub(crate) name: &'static str,
    pub(crate) citation: &'static str,
    pub(crate) compute: fn(&ScoreInputs<'_>) -> ModelOutcome,
}

/// Evaluates one model. Never fails: a model that cannot run reports the
/// inputs it was missing through `skip_reason` and an `Unknown` risk level.
#[must_use]
pub fn score(model: ModelId, inputs: &ScoreInputs<'_>) -> ScoreResult {
    let spec = model.spec();
    match (spec.compute)(inputs) {
        ModelOutcome::Scored { value, risk_level } => ScoreResult {
            model: spec.name.to_string(),
            value: Some(value),
            risk_level,
            citation: spec.citation.to_string(),
            skip_reason: None,
            missing_inputs: Vec::new(),
        },
        ModelOutcome::Skipped { missing_inputs } => ScoreResult {
            model: spec.name.to_string(),
            value: None,
            risk_level: RiskLevel::Unknown,
            citation: spec.citation.to_string(),
            skip_reason: Some(format!("missing inputs: {}", missing_inputs.join(", "))),
            missing_inputs,
        },
    }
}

/// Evaluates every registered model in registry order.
#[must_use]
pub fn score_all(inputs: &ScoreInputs<'_>) -> Vec<ScoreResult> {
    ModelId::ALL
        .into_iter()
        .map(|model| score(model, inputs))
        .collect()
}

/// Collects required inputs for one model, recording the name of everything
/// absent or unusable so the skip reason is specific.
pub(crate) struct InputGather<'a> {
    inputs: &'a ScoreInputs<'a>,
    missing: Vec<String>,
}

impl<'a> InputGather<'a> {
    pub(crate) fn new(inputs: &'a ScoreInputs<'a>) -> Self {
        Self {
            inputs,
            missing: Vec::new(),
        }
    }

    pub(crate) fn lab(&mut self, analyte: &str) -> Option<f64> {
        let value = self.inputs.labs.usable(analyte);
        if value.is_none() {
            self.missing.push(analyte.to_string());
        }
        value
    }

    /// Like `lab`, but additionally requires a strictly positive value
    /// (denominators).
    pub(crate) fn lab_positive(&mut self, analyte: &str) -> Option<f64> {
        match self.inputs.labs.usable(analyte) {
            Some(value) if value > 0.0 => Some(value),
            _ => {
                self.missing.push(format!("{analyte} (non-zero)"));
                None
            }
        }
    }

    pub(crate) fn temperature(&mut self) -> Option<f64> {
        let value = self.inputs.vitals.temperature.filter(|t| t.is_finite());
        if value.is_none() {
            self.missing.push("temperature".to_string());
        }
        value
    }

    pub(crate) fn clinical(&self) -> &'a ClinicalState {
        self.inputs.clinical
    }

    pub(crate) fn into_skipped(self) -> ModelOutcome {
        ModelOutcome::Skipped {
            missing_inputs: self.missing,
        }
    }
}
