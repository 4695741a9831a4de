use crate::models::RiskLevel;

use super::{InputGather, ModelOutcome, ModelSpec, ScoreInputs};

/// HScore for reactive hemophagocytic syndrome, Fardet 2014
/// (Arthritis Rheumatol 66:2613-20), restricted to the lab-and-exam item
/// subset (no bone-marrow aspirate or immunosuppression items). Published
/// operating point: a total of 169 corresponds to ~93% sensitivity and
/// best discriminates HLH; we tier >=169 as High and >=250 as Critical.
pub(super) const SPEC: ModelSpec = ModelSpec {
    name: "hscore",
    citation: "Fardet L et al. Arthritis Rheumatol. 2014;66(9):2613-2620",
    compute,
};

pub(crate) const HSCORE_HIGH_THRESHOLD: f64 = 169.0;
const HSCORE_CRITICAL_THRESHOLD: f64 = 250.0;

const HGB_CYTOPENIA_BELOW: f64 = 9.2; // g/dL
const WBC_CYTOPENIA_BELOW: f64 = 5.0; // 10^9/L
const PLT_CYTOPENIA_BELOW: f64 = 110.0; // 10^9/L

fn compute(inputs: &ScoreInputs<'_>) -> ModelOutcome {
    let mut gather = InputGather::new(inputs);
    let temperature = gather.temperature();
    let ferritin = gather.lab("ferritin");
    let triglycerides = gather.lab("triglycerides");
    let fibrinogen = gather.lab("fibrinogen");
    let ast = gather.lab("ast");
    let hemoglobin = gather.lab("hemoglobin");
    let wbc = gather.lab("wbc");
    let platelets = gather.lab("platelets");
    let organomegaly = gather.clinical().organomegaly;

    let (
        Some(temperature),
        Some(ferritin),
        Some(triglycerides),
        Some(fibrinogen),
        Some(ast),
        Some(hemoglobin),
        Some(wbc),
        Some(platelets),
    ) = (
        temperature,
        ferritin,
        triglycerides,
        fibrinogen,
        ast,
        hemoglobin,
        wbc,
        platelets,
    )
    else {
        return gather.into_skipped();
    };

    let total = f64::from(
        temperature_points(temperature)
            + u16::from(organomegaly) * 23
            + cytopenia_points(hemoglobin, wbc, platelets)
            + ferritin_points(ferritin)
            + triglyceride_points(triglycerides)
            + fibrinogen_points(fibrinogen)
            + ast_points(ast),
    );

    let risk_level = if total >= HSCORE_CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if total >= HSCORE_HIGH_THRESHOLD {
        RiskLevel::High
    } else if total >= 90.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    ModelOutcome::Scored {
        value: total,
        risk_level,
    }
}

fn temperature_points(celsius: f64) -> u16 {
    if celsius > 39.4 {
        49
    } else if celsius >= 38.4 {
        33
    } else {
        0
    }
}

fn cytopenia_points(hemoglobin: f64, wbc: f64, platelets: f64) -> u16 {
    let lineages = u8::from(hemoglobin < HGB_CYTOPENIA_BELOW)
        + u8::from(wbc < WBC_CYTOPENIA_BELOW)
        + u8::from(platelets < PLT_CYTOPENIA_BELOW);
    match lineages {
        0 | 1 => 0,
        2 => 24,
        _ => 34,
    }
}

fn ferritin_points(ng_per_ml: f64) -> u16 {
    if ng_per_ml > 6000.0 {
        50
    } else if ng_per_ml >= 2000.0 {
        35
    } else {
        0
    }
}

fn triglyceride_points(mmol_per_l: f64) -> u16 {
    if mmol_per_l > 4.0 {
        64
    } else if mmol_per_l >= 1.5 {
        44
    } else {
        0
    }
}

fn fibrinogen_points(g_per_l: f64) -> u16 {
    if g_per_l <= 2.5 { 30 } else { 0 }
}

fn ast_points(u_per_l: f64) -> u16 {
    if u_per_l >= 30.0 { 19 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::super::{ModelId, ScoreInputs, score};
    use crate::models::{ClinicalState, LabPanel, RiskLevel, VitalSigns};

    fn full_panel() -> LabPanel {
        let mut labs = LabPanel::new();
        labs.insert("ferritin", 7000.0, "ng/mL");
        labs.insert("triglycerides", 4.5, "mmol/L");
        labs.insert("fibrinogen", 1.8, "g/L");
        labs.insert("ast", 120.0, "U/L");
        labs.insert("hemoglobin", 8.0, "g/dL");
        labs.insert("wbc", 2.0, "10^9/L");
        labs.insert("platelets", 40.0, "10^9/L");
        labs
    }

    #[test]
    fn hand_computed_fulminant_case() {
        // 39.8C => 49; organomegaly => 23; 3 cytopenia lines => 34;
        // ferritin 7000 => 50; tg 4.5 => 64; fibrinogen 1.8 => 30; ast 120 => 19.
        let labs = full_panel();
        let vitals = VitalSigns {
            temperature: Some(39.8),
            ..VitalSigns::default()
        };
        let clinical = ClinicalState {
            organomegaly: true,
            ..ClinicalState::default()
        };
        let result = score(
            ModelId::HScore,
            &ScoreInputs {
                labs: &labs,
                vitals: &vitals,
                clinical: &clinical,
            },
        );
        assert_eq!(result.value, Some(269.0));
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn published_threshold_is_169_not_a_scaled_variant() {
        // 38.6C => 33; no organomegaly; 2 lines (hgb 8.0, plt 40) => 24;
        // ferritin 2500 => 35; tg 2.0 => 44; fibrinogen 2.0 => 30; ast 10 => 0.
        // Total 166: just below threshold, stays Moderate.
        let mut labs = full_panel();
        labs.insert("ferritin", 2500.0, "ng/mL");
        labs.insert("triglycerides", 2.0, "mmol/L");
        labs.insert("fibrinogen", 2.0, "g/L");
        labs.insert("ast", 10.0, "U/L");
        labs.insert("wbc", 6.0, "10^9/L");
        let vitals = VitalSigns {
            temperature: Some(38.6),
            ..VitalSigns::default()
        };
        let clinical = ClinicalState::default();
        let inputs = ScoreInputs {
            labs: &labs,
            vitals: &vitals,
            clinical: &clinical,
        };
        let result = score(ModelId::HScore, &inputs);
        assert_eq!(result.value, Some(166.0));
        assert_eq!(result.risk_level, RiskLevel::Moderate);

        // Raising AST to 30 adds 19 points, crossing 169 exactly into High.
        labs.insert("ast", 30.0, "U/L");
        let inputs = ScoreInputs {
            labs: &labs,
            vitals: &vitals,
            clinical: &clinical,
        };
        let result = score(ModelId::HScore, &inputs);
        assert_eq!(result.value, Some(185.0));
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn missing_temperature_names_the_gap() {
        let labs = full_panel();
        let vitals = VitalSigns::default();
        let clinical = ClinicalState::default();
        let result = score(
            ModelId::HScore,
            &ScoreInputs {
                labs: &labs,
                vitals: &vitals,
                clinical: &clinical,
            },
        );
        assert!(result.value.is_none());
        assert!(
            result
                .skip_reason
                .expect("skip reason")
                .contains("temperature")
        );
    }
}
