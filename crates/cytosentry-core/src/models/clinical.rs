use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// CTCAE-style toxicity grade for CRS and ICANS. `Absent` means the grade was
/// never assessed at this timepoint; cross-check rules treat `Absent` and
/// `Grade0` identically as "syndrome not present".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToxGrade {
    #[default]
    Absent,
    Grade0,
    Grade1,
    Grade2,
    Grade3,
    Grade4,
}

impl ToxGrade {
    /// Numeric grade, with `Absent` reading as 0.
    #[must_use]
    pub fn numeric(self) -> u8 {
        match self {
            Self::Absent | Self::Grade0 => 0,
            Self::Grade1 => 1,
            Self::Grade2 => 2,
            Self::Grade3 => 3,
            Self::Grade4 => 4,
        }
    }

    #[must_use]
    pub fn is_present(self) -> bool {
        self.numeric() > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OxygenRequirement {
    #[default]
    RoomAir,
    LowFlow,
    HighFlow,
    PositivePressure,
    MechanicalVentilation,
}

/// Clinical assessment recorded at one timepoint. Immutable once created;
/// later timepoints supersede rather than mutate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalState {
    #[serde(default)]
    pub crs_grade: ToxGrade,
    #[serde(default)]
    pub icans_grade: ToxGrade,
    /// Immune effector cell-associated encephalopathy score, 0-10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_score: Option<u8>,
    #[serde(default)]
    pub oxygen_requirement: OxygenRequirement,
    #[serde(default)]
    pub vasopressor_support: bool,
    /// Hepatosplenomegaly on exam or imaging (HScore item).
    #[serde(default)]
    pub organomegaly: bool,
}

impl ClinicalState {
    pub fn validate(&self) -> Result<()> {
        if let Some(ice) = self.ice_score
            && ice > 10
        {
            return Err(EngineError::InvalidInput(format!(
                "ice_score must be 0-10, got {ice}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClinicalState, ToxGrade};

    #[test]
    fn absent_and_grade0_both_read_as_not_present() {
        assert!(!ToxGrade::Absent.is_present());
        assert!(!ToxGrade::Grade0.is_present());
        assert!(ToxGrade::Grade1.is_present());
        assert_eq!(ToxGrade::Absent.numeric(), 0);
        assert_eq!(ToxGrade::Grade4.numeric(), 4);
    }

    #[test]
    fn ice_score_above_ten_is_rejected() {
        let state = ClinicalState {
            ice_score: Some(11),
            ..ClinicalState::default()
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn grade_order_follows_severity() {
        assert!(ToxGrade::Grade4 > ToxGrade::Grade3);
        assert!(ToxGrade::Grade0 > ToxGrade::Absent);
    }
}
