mod alert;
mod clinical;
mod labs;
mod population;
mod score;
mod signal;
mod vitals;

pub use alert::{Alert, AlertCode, Severity};
pub use clinical::{ClinicalState, OxygenRequirement, ToxGrade};
pub use labs::{LabPanel, LabValue};
pub use population::{PosteriorEstimate, PriorSpec};
pub use score::{CompositeRisk, RiskLevel, ScoreResult, SkippedModel};
pub use signal::{SignalHit, SignalQuery, SignalSummary};
pub use vitals::{DerivedVitals, TaggedVital, VitalSigns};
