use serde::{Deserialize, Serialize};

use crate::models::{
    Alert, AlertCode, ClinicalState, LabPanel, RiskLevel, ScoreResult, Severity, VitalSigns,
};
use crate::scores::{HSCORE_HIGH_THRESHOLD, ModelId};
use crate::vitals::derive_vitals;

/// Complete snapshot the rule set evaluates. Every field is structurally
/// present: a caller that has no clinical assessment passes the all-absent
/// `ClinicalState::default()`, it cannot drop the field and silently disable
/// the cross-check rules. This is the type-level fix for the partial-snapshot
/// defect class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertContext {
    pub labs: LabPanel,
    pub vitals: VitalSigns,
    pub clinical: ClinicalState,
    pub model_outputs: Vec<ScoreResult>,
}

const SPO2_DANGER_BELOW: f64 = 90.0;
const SPO2_WARNING_BELOW: f64 = 94.0;
const FEVER_DANGER_AT: f64 = 40.0;
const FEVER_WARNING_AT: f64 = 38.0;
const SYSTOLIC_WARNING_BELOW: f64 = 90.0;
const ICE_DANGER_AT_OR_BELOW: u8 = 3;

/// Applies the fixed, ordered rule list to a full snapshot. Pure and
/// deterministic: identical contexts yield identical alert lists no matter
/// which view asked.
#[must_use]
pub fn evaluate_alerts(context: &AlertContext) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let derived = derive_vitals(&context.vitals);

    // Rule 1: MAP below perfusion threshold (severity assigned at derivation).
    if let Some(map) = derived.map
        && map.severity >= Severity::Danger
    {
        alerts.push(Alert {
            severity: Severity::Danger,
            code: AlertCode::LowMap,
            message: format!("mean arterial pressure {:.0} mmHg below 65", map.value),
            source_rule: "map_below_65",
        });
    }

    // Rule 2: shock index bands.
    if let Some(si) = derived.shock_index
        && si.severity >= Severity::Warning
    {
        alerts.push(Alert {
            severity: si.severity,
            code: AlertCode::ElevatedShockIndex,
            message: format!("shock index {:.2} elevated", si.value),
            source_rule: "shock_index_bands",
        });
    }

    // Rule 3: hypoxia.
    if let Some(spo2) = context.vitals.spo2 {
        if spo2 < SPO2_DANGER_BELOW {
            alerts.push(Alert {
                severity: Severity::Danger,
                code: AlertCode::Hypoxia,
                message: format!("SpO2 {spo2:.0}% below 90%"),
                source_rule: "spo2_bands",
            });
        } else if spo2 < SPO2_WARNING_BELOW {
            alerts.push(Alert {
                severity: Severity::Warning,
                code: AlertCode::Hypoxia,
                message: format!("SpO2 {spo2:.0}% below 94%"),
                source_rule: "spo2_bands",
            });
        }
    }

    // Rule 4: fever, the earliest CRS trigger.
    if let Some(temp) = context.vitals.temperature {
        if temp >= FEVER_DANGER_AT {
            alerts.push(Alert {
                severity: Severity::Danger,
                code: AlertCode::Fever,
                message: format!("hyperpyrexia {temp:.1} C"),
                source_rule: "fever_bands",
            });
        } else if temp >= FEVER_WARNING_AT {
            alerts.push(Alert {
                severity: Severity::Warning,
                code: AlertCode::Fever,
                message: format!("fever {temp:.1} C"),
                source_rule: "fever_bands",
            });
        }
    }

    // Rule 5: named HLH-probability score at or above its published threshold.
    if let Some(hscore) = context
        .model_outputs
        .iter()
        .find(|s| s.model == ModelId::HScore.as_str())
        && let Some(value) = hscore.value
        && value >= HSCORE_HIGH_THRESHOLD
    {
        alerts.push(Alert {
            severity: Severity::Danger,
            code: AlertCode::HlhProbability,
            message: format!("HScore {value:.0} at or above {HSCORE_HIGH_THRESHOLD:.0}"),
            source_rule: "hscore_threshold",
        });
    }

    // Rule 6: any model at or above High. Ordinal comparison, so Critical is
    // included by construction rather than by remembering to list it.
    for result in &context.model_outputs {
        if result.is_scored() && result.risk_level >= RiskLevel::High {
            alerts.push(Alert {
                severity: Severity::Danger,
                code: AlertCode::HighRiskModel,
                message: format!(
                    "{} classified {}",
                    result.model,
                    result.risk_level.as_str()
                ),
                source_rule: "model_risk_at_least_high",
            });
        }
    }

    // Rule 7: neurotoxicity without CRS. Grade0 and Absent are both "not
    // present"; either form must still let the alert fire.
    if context.clinical.icans_grade.is_present() && !context.clinical.crs_grade.is_present() {
        alerts.push(Alert {
            severity: Severity::Warning,
            code: AlertCode::IcansWithoutCrs,
            message: format!(
                "ICANS grade {} without concurrent CRS",
                context.clinical.icans_grade.numeric()
            ),
            source_rule: "icans_without_crs",
        });
    }

    // Rule 8: severe neurotoxicity.
    let ice_critical = context
        .clinical
        .ice_score
        .is_some_and(|ice| ice <= ICE_DANGER_AT_OR_BELOW);
    if context.clinical.icans_grade.numeric() >= 3 || ice_critical {
        alerts.push(Alert {
            severity: Severity::Danger,
            code: AlertCode::SevereIcans,
            message: "severe neurotoxicity (ICANS >= 3 or ICE <= 3)".to_string(),
            source_rule: "severe_icans",
        });
    }

    // Rule 9: severe CRS.
    let crs = context.clinical.crs_grade.numeric();
    if crs >= 3 || (crs >= 2 && context.clinical.vasopressor_support) {
        alerts.push(Alert {
            severity: Severity::Danger,
            code: AlertCode::SevereCrs,
            message: format!("CRS grade {crs} with hemodynamic compromise"),
            source_rule: "severe_crs",
        });
    }

    // Rule 10: hypotension on raw systolic, independent of MAP availability.
    if let Some(systolic) = context.vitals.systolic_bp
        && systolic > 0.0
        && systolic < SYSTOLIC_WARNING_BELOW
    {
        alerts.push(Alert {
            severity: Severity::Warning,
            code: AlertCode::Hypotension,
            message: format!("systolic BP {systolic:.0} mmHg below 90"),
            source_rule: "systolic_below_90",
        });
    }

    alerts
}
