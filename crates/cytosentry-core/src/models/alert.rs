use serde::{Deserialize, Serialize};

/// Alert severity, ordered `Info < Warning < Danger`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

/// Stable machine-readable alert identifiers. One code per rule in the
/// fixed rule list; consumers switch on these, not on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCode {
    LowMap,
    ElevatedShockIndex,
    Hypoxia,
    Fever,
    HlhProbability,
    HighRiskModel,
    IcansWithoutCrs,
    SevereIcans,
    SevereCrs,
    Hypotension,
}

/// A derived alert. Alerts are regenerated per evaluation from the current
/// timepoint snapshot and are never stored as mutable state, so they are
/// serialized outward but never parsed back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub code: AlertCode,
    pub message: String,
    pub source_rule: &'static str,
}

#[cfg(test)]
mod tests {
    use super::Severity;

    #[test]
    fn danger_outranks_warning_outranks_info() {
        assert!(Severity::Danger > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
