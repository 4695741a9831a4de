// Public fallible APIs in this crate share one concrete error contract (`EngineError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod aggregate;
pub mod alerts;
pub mod bayes;
pub mod config;
pub mod error;
pub mod mitigation;
pub mod models;
pub(crate) mod reference;
pub mod scores;
pub mod signal;
pub mod vitals;

pub use aggregate::aggregate_risk;
pub use alerts::{AlertContext, evaluate_alerts};
pub use bayes::posterior;
pub use error::{EngineError, Result};
pub use mitigation::{MitigationSimulator, SimulationRequest};
pub use models::{
    Alert, ClinicalState, CompositeRisk, DerivedVitals, LabPanel, PosteriorEstimate, PriorSpec,
    RiskLevel, ScoreResult, Severity, SignalQuery, SignalSummary, ToxGrade, VitalSigns,
};
pub use scores::{ModelId, score, score_all};
pub use signal::{RateLedger, SignalClient, SignalSource};
pub use vitals::derive_vitals;
