/// Canonical unit, adult reference range, and physiologically valid bounds
/// for every analyte the engine consumes. Values outside the valid bounds are
/// treated as unusable input, never clamped into range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnalyteSpec {
    pub(crate) name: &'static str,
    pub(crate) unit: &'static str,
    pub(crate) reference_low: f64,
    pub(crate) reference_high: f64,
    pub(crate) valid_min: f64,
    pub(crate) valid_max: f64,
}

const ANALYTES: &[AnalyteSpec] = &[
    AnalyteSpec {
        name: "ferritin",
        unit: "ng/mL",
        reference_low: 30.0,
        reference_high: 400.0,
        valid_min: 0.0,
        valid_max: 500_000.0,
    },
    AnalyteSpec {
        name: "crp",
        unit: "mg/L",
        reference_low: 0.0,
        reference_high: 10.0,
        valid_min: 0.0,
        valid_max: 1_000.0,
    },
    AnalyteSpec {
        name: "ldh",
        unit: "U/L",
        reference_low: 120.0,
        reference_high: 250.0,
        valid_min: 0.0,
        valid_max: 50_000.0,
    },
    AnalyteSpec {
        name: "creatinine",
        unit: "mg/dL",
        reference_low: 0.6,
        reference_high: 1.3,
        valid_min: 0.1,
        valid_max: 30.0,
    },
    AnalyteSpec {
        name: "platelets",
        unit: "10^9/L",
        reference_low: 150.0,
        reference_high: 400.0,
        valid_min: 0.0,
        valid_max: 2_000.0,
    },
    AnalyteSpec {
        name: "anc",
        unit: "10^9/L",
        reference_low: 1.5,
        reference_high: 8.0,
        valid_min: 0.0,
        valid_max: 100.0,
    },
    AnalyteSpec {
        name: "hemoglobin",
        unit: "g/dL",
        reference_low: 12.0,
        reference_high: 17.5,
        valid_min: 1.0,
        valid_max: 25.0,
    },
    AnalyteSpec {
        name: "fibrinogen",
        unit: "g/L",
        reference_low: 2.0,
        reference_high: 4.0,
        valid_min: 0.0,
        valid_max: 15.0,
    },
    AnalyteSpec {
        name: "triglycerides",
        unit: "mmol/L",
        reference_low: 0.5,
        reference_high: 1.7,
        valid_min: 0.0,
        valid_max: 60.0,
    },
    AnalyteSpec {
        name: "ast",
        unit: "U/L",
        reference_low: 10.0,
        reference_high: 40.0,
        valid_min: 0.0,
        valid_max: 20_000.0,
    },
    AnalyteSpec {
        name: "il6",
        unit: "pg/mL",
        reference_low: 0.0,
        reference_high: 7.0,
        valid_min: 0.0,
        valid_max: 100_000.0,
    },
    AnalyteSpec {
        name: "wbc",
        unit: "10^9/L",
        reference_low: 4.0,
        reference_high: 11.0,
        valid_min: 0.0,
        valid_max: 500.0,
    },
];

pub(crate) fn analyte_spec(name: &str) -> Option<&'static AnalyteSpec> {
    ANALYTES.iter().find(|spec| spec.name == name)
}
