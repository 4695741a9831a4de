use std::collections::HashMap;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const MIN_SAMPLES: usize = 100;
pub const MAX_SAMPLES: usize = 10_000;

/// Fixed catalog of risk-reducing interventions. `relative_risk` is the
/// residual risk factor when the intervention takes effect; `efficacy` is the
/// per-patient probability that it does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MitigationSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub relative_risk: f64,
    pub efficacy: f64,
}

pub const CATALOG: &[MitigationSpec] = &[
    MitigationSpec {
        id: "tocilizumab",
        label: "Early tocilizumab (IL-6 receptor blockade)",
        relative_risk: 0.55,
        efficacy: 0.85,
    },
    MitigationSpec {
        id: "corticosteroids",
        label: "Early corticosteroids",
        relative_risk: 0.70,
        efficacy: 0.80,
    },
    MitigationSpec {
        id: "anakinra",
        label: "Prophylactic anakinra (IL-1 blockade)",
        relative_risk: 0.60,
        efficacy: 0.75,
    },
    MitigationSpec {
        id: "fractionated_dosing",
        label: "Fractionated CAR-T dosing",
        relative_risk: 0.65,
        efficacy: 0.90,
    },
    MitigationSpec {
        id: "bridging_debulking",
        label: "Bridging therapy tumor debulking",
        relative_risk: 0.75,
        efficacy: 0.70,
    },
];

#[must_use]
pub fn catalog_spec(id: &str) -> Option<&'static MitigationSpec> {
    CATALOG.iter().find(|spec| spec.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Baseline adverse-event probability in (0, 1].
    pub baseline_risk: f64,
    /// Catalog identifiers; normalized (trimmed, lowercased, deduplicated)
    /// before validation.
    pub mitigations: Vec<String>,
    /// Inter-mitigation correlation in [0, 1].
    pub correlation: f64,
    pub samples: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationResult {
    pub baseline_risk: f64,
    pub mitigated_risk_mean: f64,
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
    pub sample_count: usize,
    pub seed: u64,
    pub mitigations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    mitigations: Vec<String>,
    baseline_bits: u64,
    correlation_bits: u64,
    samples: usize,
    seed: u64,
}

/// CPU-bound Monte Carlo combiner with an input-keyed memo, so an identical
/// request from another view returns the cached distribution instead of
/// re-running the simulation. Entries are invalidated only by input change;
/// there is no time-based eviction.
#[derive(Default)]
pub struct MitigationSimulator {
    memo: Mutex<HashMap<MemoKey, MitigationResult>>,
}

impl std::fmt::Debug for MitigationSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MitigationSimulator").finish_non_exhaustive()
    }
}

impl MitigationSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulate(&self, request: &SimulationRequest) -> Result<MitigationResult> {
        let (ids, specs) = validate_request(request)?;
        let key = MemoKey {
            mitigations: ids.clone(),
            baseline_bits: request.baseline_risk.to_bits(),
            correlation_bits: request.correlation.to_bits(),
            samples: request.samples,
            seed: request.seed,
        };

        {
            let memo = self
                .memo
                .lock()
                .map_err(|_| EngineError::mutex_poisoned("simulation memo"))?;
            if let Some(result) = memo.get(&key) {
                return Ok(result.clone());
            }
        }

        let result = run_simulation(request, &ids, &specs);

        let mut memo = self
            .memo
            .lock()
            .map_err(|_| EngineError::mutex_poisoned("simulation memo"))?;
        memo.insert(key, result.clone());
        Ok(result)
    }
}

fn validate_request(
    request: &SimulationRequest,
) -> Result<(Vec<String>, Vec<&'static MitigationSpec>)> {
    if !(request.baseline_risk > 0.0 && request.baseline_risk <= 1.0) {
        return Err(EngineError::InvalidInput(format!(
            "baseline_risk must be in (0, 1], got {}",
            request.baseline_risk
        )));
    }
    if !(0.0..=1.0).contains(&request.correlation) || !request.correlation.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "correlation must be in [0, 1], got {}",
            request.correlation
        )));
    }
    if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&request.samples) {
        return Err(EngineError::InvalidInput(format!(
            "samples must be in [{MIN_SAMPLES}, {MAX_SAMPLES}], got {}",
            request.samples
        )));
    }

    let mut ids: Vec<String> = request
        .mitigations
        .iter()
        .map(|id| id.trim().to_ascii_lowercase())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Err(EngineError::InvalidInput(
            "at least one mitigation is required".to_string(),
        ));
    }

    let mut specs = Vec::with_capacity(ids.len());
    for id in &ids {
        let Some(spec) = catalog_spec(id) else {
            return Err(EngineError::InvalidInput(format!(
                "unknown mitigation id: {id}"
            )));
        };
        specs.push(spec);
    }
    Ok((ids, specs))
}

/// Per sample, each mitigation takes effect by a Bernoulli draw whose
/// uniform is shared with probability rho (fully correlated response) or
/// fresh with probability 1-rho (independent response). The residual-risk
/// factors of the effective mitigations then combine by the pinned rule
///
///   residual = (prod of residuals)^(1-rho) * (min of residuals)^rho
///
/// which is exactly the independent product at rho = 0 and exactly the
/// single strongest effect at rho = 1, and interpolates monotonically
/// (geometric blend) in between.
fn run_simulation(
    request: &SimulationRequest,
    ids: &[String],
    specs: &[&'static MitigationSpec],
) -> MitigationResult {
    let mut rng = ChaCha20Rng::seed_from_u64(request.seed);
    let rho = request.correlation;
    let mut draws = Vec::with_capacity(request.samples);

    for _ in 0..request.samples {
        let shared: f64 = rng.r#gen();
        let mut product = 1.0_f64;
        let mut minimum = 1.0_f64;
        let mut any_effective = false;

        for spec in specs {
            let coupled = rng.r#gen::<f64>() < rho;
            let uniform = if coupled { shared } else { rng.r#gen() };
            if uniform < spec.efficacy {
                any_effective = true;
                product *= spec.relative_risk;
                minimum = minimum.min(spec.relative_risk);
            }
        }

        let residual = if any_effective {
            product.powf(1.0 - rho) * minimum.powf(rho)
        } else {
            1.0
        };
        draws.push(request.baseline_risk * residual);
    }

    draws.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    #[allow(clippy::cast_precision_loss, reason = "samples <= 10_000")]
    let mean = draws.iter().sum::<f64>() / draws.len() as f64;

    MitigationResult {
        baseline_risk: request.baseline_risk,
        mitigated_risk_mean: mean,
        p05: percentile(&draws, 5),
        p50: percentile(&draws, 50),
        p95: percentile(&draws, 95),
        sample_count: request.samples,
        seed: request.seed,
        mitigations: ids.to_vec(),
    }
}

fn percentile(sorted: &[f64], q_percent: usize) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (q_percent * sorted.len()).div_ceil(100).saturating_sub(1);
    sorted[idx.min(sorted.len() - 1)]
}
