use crate::models::RiskLevel;

use super::{InputGather, ModelOutcome, ModelSpec, ScoreInputs};

/// Endothelial Activation and Stress Index, Luft 2017 (Lancet Haematol
/// 4:e414-23): LDH [U/L] x creatinine [mg/dL] / platelets [10^9/L].
pub(super) const EASIX_SPEC: ModelSpec = ModelSpec {
    name: "easix",
    citation: "Luft T et al. Lancet Haematol. 2017;4(9):e414-e423",
    compute: compute_easix,
};

/// Modified EASIX for CAR-T toxicity, Pennisi 2021 (Blood Adv 5:3397-3406):
/// CRP [mg/L] x ferritin [ng/mL] / platelets [10^9/L].
pub(super) const MODIFIED_EASIX_SPEC: ModelSpec = ModelSpec {
    name: "modified_easix",
    citation: "Pennisi M et al. Blood Adv. 2021;5(17):3397-3406",
    compute: compute_modified_easix,
};

const EASIX_MODERATE_AT: f64 = 2.0;
const EASIX_HIGH_AT: f64 = 32.0;
const MEASIX_MODERATE_AT: f64 = 500.0;
const MEASIX_HIGH_AT: f64 = 5000.0;

fn compute_easix(inputs: &ScoreInputs<'_>) -> ModelOutcome {
    let mut gather = InputGather::new(inputs);
    let ldh = gather.lab("ldh");
    let creatinine = gather.lab("creatinine");
    let platelets = gather.lab_positive("platelets");

    let (Some(ldh), Some(creatinine), Some(platelets)) = (ldh, creatinine, platelets) else {
        return gather.into_skipped();
    };

    let value = ldh * creatinine / platelets;
    ModelOutcome::Scored {
        value,
        risk_level: tier(value, EASIX_MODERATE_AT, EASIX_HIGH_AT),
    }
}

fn compute_modified_easix(inputs: &ScoreInputs<'_>) -> ModelOutcome {
    let mut gather = InputGather::new(inputs);
    let crp = gather.lab("crp");
    let ferritin = gather.lab("ferritin");
    let platelets = gather.lab_positive("platelets");

    let (Some(crp), Some(ferritin), Some(platelets)) = (crp, ferritin, platelets) else {
        return gather.into_skipped();
    };

    let value = crp * ferritin / platelets;
    ModelOutcome::Scored {
        value,
        risk_level: tier(value, MEASIX_MODERATE_AT, MEASIX_HIGH_AT),
    }
}

fn tier(value: f64, moderate_at: f64, high_at: f64) -> RiskLevel {
    if value >= high_at {
        RiskLevel::High
    } else if value >= moderate_at {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
