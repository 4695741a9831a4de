use serde::{Deserialize, Serialize};

/// Ordinal risk classification. The derive order is the clinical order:
/// `Unknown < Low < Moderate < High < Critical`, so "at least High" is a
/// single comparison instead of a list of string literals.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Unknown,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::Critical,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Outcome of evaluating one prognostic model. Exactly one of `value` and
/// `skip_reason` is set: a computed score always has a value, and a model
/// that could not run always names the inputs it was missing — as a
/// human-readable `skip_reason` and as the structured `missing_inputs`
/// list consumers account against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub risk_level: RiskLevel,
    pub citation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_inputs: Vec<String>,
}

impl ScoreResult {
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.value.is_some()
    }

    /// Invariant check used by consumers before trusting a result.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.value.is_some() != self.skip_reason.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub model: String,
    pub missing_inputs: Vec<String>,
}

/// Aggregate over all contributing models. `skipped` distinguishes
/// "evaluated as low risk" from "not evaluated at all".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRisk {
    pub risk_level: RiskLevel,
    pub contributing: Vec<ScoreResult>,
    pub skipped: Vec<SkippedModel>,
}

#[cfg(test)]
mod tests {
    use super::RiskLevel;

    #[test]
    fn ordinal_order_puts_critical_above_high() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Moderate > RiskLevel::Low);
        assert!(RiskLevel::Low > RiskLevel::Unknown);
    }

    #[test]
    fn at_least_high_is_one_comparison() {
        let at_least_high: Vec<_> = RiskLevel::ALL
            .into_iter()
            .filter(|level| *level >= RiskLevel::High)
            .collect();
        assert_eq!(at_least_high, vec![RiskLevel::High, RiskLevel::Critical]);
    }
}
