use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use cytosentry_core::alerts::{AlertContext, evaluate_alerts};
use cytosentry_core::config::EngineConfig;
use cytosentry_core::mitigation::{CATALOG, MitigationSimulator, SimulationRequest};
use cytosentry_core::models::{ClinicalState, LabPanel, PriorSpec, SignalQuery, VitalSigns};
use cytosentry_core::scores::{ScoreInputs, score_all};
use cytosentry_core::signal::{
    FixtureSource, MemoryLedger, OpenFdaSource, RateLedger, SignalClient, SignalSource,
    SqliteLedger,
};
use cytosentry_core::{EngineError, aggregate_risk, bayes};
use serde::{Deserialize, Serialize};

use crate::cli::{Commands, PosteriorArgs, SignalsArgs, SimulateArgs, TimepointArgs};

/// Timepoint snapshot as consumers serialize it. Clinical state is a
/// required field of the alert path; `#[serde(default)]` admits an
/// all-absent assessment but the structure is always present.
#[derive(Debug, Deserialize)]
struct TimepointInput {
    #[serde(default)]
    labs: LabPanel,
    #[serde(default)]
    vitals: VitalSigns,
    #[serde(default)]
    clinical: ClinicalState,
}

pub(crate) fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Score(args) => run_score(&args),
        Commands::Alerts(args) => run_alerts(&args),
        Commands::Posterior(args) => run_posterior(&args),
        Commands::Simulate(args) => run_simulate(&args),
        Commands::Signals(args) => run_signals(&args),
        Commands::Catalog => print_json(&CATALOG),
    }
}

fn load_timepoint(path: &Path) -> Result<TimepointInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read timepoint file {}", path.display()))?;
    let timepoint: TimepointInput =
        serde_json::from_str(&raw).context("failed to parse timepoint JSON")?;
    timepoint.labs.validate().map_err(engine_failure("score.validate"))?;
    timepoint
        .vitals
        .validate()
        .map_err(engine_failure("score.validate"))?;
    timepoint
        .clinical
        .validate()
        .map_err(engine_failure("score.validate"))?;
    Ok(timepoint)
}

fn run_score(args: &TimepointArgs) -> Result<()> {
    let timepoint = load_timepoint(&args.input)?;
    let results = score_all(&ScoreInputs {
        labs: &timepoint.labs,
        vitals: &timepoint.vitals,
        clinical: &timepoint.clinical,
    });
    let composite = aggregate_risk(&results).map_err(engine_failure("score.aggregate"))?;

    #[derive(Serialize)]
    struct ScoreOutput<'a> {
        scores: &'a [cytosentry_core::ScoreResult],
        composite: &'a cytosentry_core::CompositeRisk,
    }
    print_json(&ScoreOutput {
        scores: &results,
        composite: &composite,
    })
}

fn run_alerts(args: &TimepointArgs) -> Result<()> {
    let timepoint = load_timepoint(&args.input)?;
    let model_outputs = score_all(&ScoreInputs {
        labs: &timepoint.labs,
        vitals: &timepoint.vitals,
        clinical: &timepoint.clinical,
    });
    let context = AlertContext {
        labs: timepoint.labs,
        vitals: timepoint.vitals,
        clinical: timepoint.clinical,
        model_outputs,
    };
    print_json(&evaluate_alerts(&context))
}

fn run_posterior(args: &PosteriorArgs) -> Result<()> {
    let prior = PriorSpec::new(args.alpha, args.beta, args.source.clone())
        .map_err(engine_failure("posterior"))?;
    let coverage = args.coverage.unwrap_or(EngineConfig::from_env().credible_coverage);
    let estimate = bayes::posterior_with_coverage(&prior, args.events, args.n, coverage)
        .map_err(engine_failure("posterior"))?;
    print_json(&estimate)
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let simulator = MitigationSimulator::new();
    let result = simulator
        .simulate(&SimulationRequest {
            baseline_risk: args.baseline_risk,
            mitigations: args.mitigations.clone(),
            correlation: args.correlation,
            samples: args.samples,
            seed: args.seed,
        })
        .map_err(engine_failure("simulate"))?;
    print_json(&result)
}

fn run_signals(args: &SignalsArgs) -> Result<()> {
    let config = EngineConfig::from_env();
    let source: Box<dyn SignalSource> = match &args.offline {
        Some(path) => {
            Box::new(FixtureSource::from_path(path).map_err(engine_failure("signals.init"))?)
        }
        None => {
            Box::new(OpenFdaSource::new(&config.signal).map_err(engine_failure("signals.init"))?)
        }
    };
    let ledger: Box<dyn RateLedger> = match &args.ledger {
        Some(path) => Box::new(
            SqliteLedger::open(path, config.signal.rate_budget_per_minute)
                .map_err(engine_failure("signals.init"))?,
        ),
        None => Box::new(
            MemoryLedger::new(config.signal.rate_budget_per_minute)
                .map_err(engine_failure("signals.init"))?,
        ),
    };
    let client = SignalClient::new(source, ledger, config.signal.cache_ttl_secs);

    let summary = client
        .query(&SignalQuery {
            products: args.products.clone(),
            adverse_events: args.adverse_events.clone(),
        })
        .map_err(engine_failure("signals.query"))?;
    print_json(&summary)
}

/// Converts an engine error into the structured payload consumers parse from
/// stderr, then fails the process through anyhow.
fn engine_failure(operation: &'static str) -> impl Fn(EngineError) -> anyhow::Error {
    move |err| {
        let payload = err.to_payload(operation);
        if let Ok(rendered) = serde_json::to_string(&payload) {
            eprintln!("{rendered}");
        }
        anyhow::Error::new(err).context(format!("{operation} failed"))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => {
            println!("{rendered}");
            Ok(())
        }
        Err(err) => bail!("failed to render output: {err}"),
    }
}
