use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Beta prior for one adverse-event rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorSpec {
    pub alpha: f64,
    pub beta: f64,
    pub source_description: String,
}

impl PriorSpec {
    pub fn new(alpha: f64, beta: f64, source_description: impl Into<String>) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) || !(beta.is_finite() && beta > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "prior parameters must be positive and finite, got alpha={alpha}, beta={beta}"
            )));
        }
        Ok(Self {
            alpha,
            beta,
            source_description: source_description.into(),
        })
    }
}

/// Conjugate posterior for one adverse-event rate. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorEstimate {
    pub alpha: f64,
    pub beta: f64,
    pub mean: f64,
    pub credible_interval: (f64, f64),
    pub coverage: f64,
}

#[cfg(test)]
mod tests {
    use super::PriorSpec;

    #[test]
    fn prior_rejects_non_positive_parameters() {
        assert!(PriorSpec::new(0.0, 5.0, "registry").is_err());
        assert!(PriorSpec::new(2.0, -1.0, "registry").is_err());
        assert!(PriorSpec::new(f64::NAN, 5.0, "registry").is_err());
        assert!(PriorSpec::new(2.0, 5.0, "registry").is_ok());
    }
}
