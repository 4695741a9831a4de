use crate::models::{DerivedVitals, Severity, TaggedVital, VitalSigns};

const MAP_DANGER_BELOW: f64 = 65.0;
const SHOCK_INDEX_DANGER_ABOVE: f64 = 1.2;
const SHOCK_INDEX_WARNING_ABOVE: f64 = 0.9;

/// Composite hemodynamic vitals. Each output is computed only when every
/// operand is present and the denominator is positive; the guard runs before
/// the arithmetic, so a missing component yields `None` rather than a NaN
/// smuggled through later severity checks.
#[must_use]
pub fn derive_vitals(vitals: &VitalSigns) -> DerivedVitals {
    DerivedVitals {
        map: mean_arterial_pressure(vitals),
        shock_index: shock_index(vitals),
    }
}

fn mean_arterial_pressure(vitals: &VitalSigns) -> Option<TaggedVital> {
    let systolic = vitals.systolic_bp?;
    let diastolic = vitals.diastolic_bp?;
    if systolic <= 0.0 || diastolic < 0.0 {
        return None;
    }
    let value = (systolic + 2.0 * diastolic) / 3.0;
    let severity = if value < MAP_DANGER_BELOW {
        Severity::Danger
    } else {
        Severity::Info
    };
    Some(TaggedVital { value, severity })
}

fn shock_index(vitals: &VitalSigns) -> Option<TaggedVital> {
    let heart_rate = vitals.heart_rate?;
    let systolic = vitals.systolic_bp?;
    if systolic <= 0.0 || heart_rate < 0.0 {
        return None;
    }
    let value = heart_rate / systolic;
    let severity = if value > SHOCK_INDEX_DANGER_ABOVE {
        Severity::Danger
    } else if value > SHOCK_INDEX_WARNING_ABOVE {
        Severity::Warning
    } else {
        Severity::Info
    };
    Some(TaggedVital { value, severity })
}
