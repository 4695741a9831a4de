use crate::models::RiskLevel;

use super::{InputGather, ModelOutcome, ModelSpec, ScoreInputs};

/// CAR-HEMATOTOX, Rejeski 2021 (Blood 138:2499-2513): baseline cytopenia and
/// inflammation markers predicting prolonged neutropenia after CAR-T.
/// Published binning: total 0-1 low risk, >=2 high risk.
pub(super) const SPEC: ModelSpec = ModelSpec {
    name: "car_hematotox",
    citation: "Rejeski K et al. Blood. 2021;138(24):2499-2513",
    compute,
};

fn compute(inputs: &ScoreInputs<'_>) -> ModelOutcome {
    let mut gather = InputGather::new(inputs);
    let platelets = gather.lab("platelets");
    let anc = gather.lab("anc");
    let hemoglobin = gather.lab("hemoglobin");
    let crp = gather.lab("crp");
    let ferritin = gather.lab("ferritin");

    let (Some(platelets), Some(anc), Some(hemoglobin), Some(crp), Some(ferritin)) =
        (platelets, anc, hemoglobin, crp, ferritin)
    else {
        return gather.into_skipped();
    };

    let total = platelet_points(platelets)
        + u16::from(anc <= 1.2)
        + u16::from(hemoglobin <= 9.0)
        + u16::from(crp >= 30.0)
        + ferritin_points(ferritin);

    let risk_level = if total >= 2 {
        RiskLevel::High
    } else {
        RiskLevel::Low
    };

    ModelOutcome::Scored {
        value: f64::from(total),
        risk_level,
    }
}

fn platelet_points(per_nl: f64) -> u16 {
    if per_nl < 75.0 {
        2
    } else if per_nl <= 175.0 {
        1
    } else {
        0
    }
}

fn ferritin_points(ng_per_ml: f64) -> u16 {
    if ng_per_ml > 2000.0 {
        2
    } else if ng_per_ml > 650.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ModelId, ScoreInputs, score};
    use crate::models::{ClinicalState, LabPanel, RiskLevel, VitalSigns};

    fn evaluate(labs: &LabPanel) -> crate::models::ScoreResult {
        let vitals = VitalSigns::default();
        let clinical = ClinicalState::default();
        score(
            ModelId::CarHematotox,
            &ScoreInputs {
                labs,
                vitals: &vitals,
                clinical: &clinical,
            },
        )
    }

    #[test]
    fn healthy_baseline_scores_zero() {
        let mut labs = LabPanel::new();
        labs.insert("platelets", 220.0, "10^9/L");
        labs.insert("anc", 3.5, "10^9/L");
        labs.insert("hemoglobin", 13.0, "g/dL");
        labs.insert("crp", 4.0, "mg/L");
        labs.insert("ferritin", 200.0, "ng/mL");
        let result = evaluate(&labs);
        assert_eq!(result.value, Some(0.0));
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn hand_computed_high_risk_case() {
        // plt 60 => 2; anc 0.9 => 1; hgb 8.4 => 1; crp 85 => 1; ferritin 900 => 1.
        let mut labs = LabPanel::new();
        labs.insert("platelets", 60.0, "10^9/L");
        labs.insert("anc", 0.9, "10^9/L");
        labs.insert("hemoglobin", 8.4, "g/dL");
        labs.insert("crp", 85.0, "mg/L");
        labs.insert("ferritin", 900.0, "ng/mL");
        let result = evaluate(&labs);
        assert_eq!(result.value, Some(6.0));
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn two_points_crosses_into_high() {
        // plt 150 => 1; ferritin 700 => 1; rest normal.
        let mut labs = LabPanel::new();
        labs.insert("platelets", 150.0, "10^9/L");
        labs.insert("anc", 3.5, "10^9/L");
        labs.insert("hemoglobin", 13.0, "g/dL");
        labs.insert("crp", 4.0, "mg/L");
        labs.insert("ferritin", 700.0, "ng/mL");
        let result = evaluate(&labs);
        assert_eq!(result.value, Some(2.0));
        assert_eq!(result.risk_level, RiskLevel::High);
    }
}
