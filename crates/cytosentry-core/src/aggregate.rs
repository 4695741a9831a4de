use crate::error::{EngineError, Result};
use crate::models::{CompositeRisk, RiskLevel, ScoreResult, SkippedModel};

/// Folds per-model results into one ordinal classification.
///
/// The composite level is the maximum over scored contributions; on the
/// ordinal `Unknown < Low < Moderate < High < Critical` the max already
/// resolves ties toward the more severe tier, and Critical can never be
/// shadowed by High. Models that could not run are reported with their
/// specific missing inputs so a consumer can tell "evaluated as low risk"
/// from "not evaluated".
pub fn aggregate_risk(results: &[ScoreResult]) -> Result<CompositeRisk> {
    let mut contributing = Vec::new();
    let mut skipped = Vec::new();
    let mut level = RiskLevel::Unknown;

    for result in results {
        if !result.is_well_formed() {
            return Err(EngineError::ConsistencyViolation(format!(
                "score result for {} must carry exactly one of value and skip_reason",
                result.model
            )));
        }
        if result.skip_reason.is_some() {
            skipped.push(SkippedModel {
                model: result.model.clone(),
                missing_inputs: result.missing_inputs.clone(),
            });
        } else {
            level = level.max(result.risk_level);
            contributing.push(result.clone());
        }
    }

    Ok(CompositeRisk {
        risk_level: level,
        contributing,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::aggregate_risk;
    use crate::models::{RiskLevel, ScoreResult};

    fn scored(model: &str, risk_level: RiskLevel) -> ScoreResult {
        ScoreResult {
            model: model.to_string(),
            value: Some(1.0),
            risk_level,
            citation: String::new(),
            skip_reason: None,
            missing_inputs: Vec::new(),
        }
    }

    fn skipped(model: &str, missing: &[&str]) -> ScoreResult {
        ScoreResult {
            model: model.to_string(),
            value: None,
            risk_level: RiskLevel::Unknown,
            citation: String::new(),
            skip_reason: Some(format!("missing inputs: {}", missing.join(", "))),
            missing_inputs: missing.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn composite_is_critical_whenever_any_contribution_is_critical() {
        let composite = aggregate_risk(&[
            scored("easix", RiskLevel::Low),
            scored("hscore", RiskLevel::Critical),
            scored("car_hematotox", RiskLevel::High),
        ])
        .expect("aggregate");
        assert_eq!(composite.risk_level, RiskLevel::Critical);
        assert_eq!(composite.contributing.len(), 3);
    }

    #[test]
    fn skipped_models_are_reported_with_their_gaps() {
        let composite = aggregate_risk(&[
            scored("easix", RiskLevel::Moderate),
            skipped("hscore", &["temperature", "ferritin"]),
        ])
        .expect("aggregate");
        assert_eq!(composite.risk_level, RiskLevel::Moderate);
        assert_eq!(composite.skipped.len(), 1);
        assert_eq!(
            composite.skipped[0].missing_inputs,
            vec!["temperature".to_string(), "ferritin".to_string()]
        );
    }

    #[test]
    fn skipped_accounting_reads_the_structured_list_not_the_message() {
        // The human-readable reason can say anything; the gap accounting
        // must come from `missing_inputs` untouched.
        let mut result = skipped("hscore", &["ferritin"]);
        result.skip_reason = Some("panel incomplete, see lab notes".to_string());
        let composite = aggregate_risk(&[result]).expect("aggregate");
        assert_eq!(
            composite.skipped[0].missing_inputs,
            vec!["ferritin".to_string()]
        );
    }

    #[test]
    fn all_skipped_yields_unknown_not_low() {
        let composite =
            aggregate_risk(&[skipped("easix", &["ldh"]), skipped("hscore", &["temperature"])])
                .expect("aggregate");
        assert_eq!(composite.risk_level, RiskLevel::Unknown);
        assert!(composite.contributing.is_empty());
    }

    #[test]
    fn empty_input_yields_unknown() {
        let composite = aggregate_risk(&[]).expect("aggregate");
        assert_eq!(composite.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn malformed_result_is_a_consistency_violation() {
        let malformed = ScoreResult {
            model: "easix".to_string(),
            value: Some(3.0),
            risk_level: RiskLevel::Low,
            citation: String::new(),
            skip_reason: Some("missing inputs: ldh".to_string()),
            missing_inputs: vec!["ldh".to_string()],
        };
        assert!(aggregate_risk(&[malformed]).is_err());
    }
}
