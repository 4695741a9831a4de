use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cytosentry")]
#[command(about = "CAR-T toxicity scoring and population risk engine", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every registered model against a timepoint and aggregate.
    Score(TimepointArgs),
    /// Evaluate the full alert rule set against a timepoint.
    Alerts(TimepointArgs),
    /// Beta-Binomial posterior for one adverse-event rate.
    Posterior(PosteriorArgs),
    /// Correlated Monte Carlo combination of mitigations.
    Simulate(SimulateArgs),
    /// Disproportionality signals from the adverse-event reporting source.
    Signals(SignalsArgs),
    /// List the mitigation catalog.
    Catalog,
}

#[derive(Debug, Args)]
pub struct TimepointArgs {
    /// Path to a timepoint JSON file ({labs, vitals, clinical}).
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct PosteriorArgs {
    #[arg(long)]
    pub alpha: f64,
    #[arg(long)]
    pub beta: f64,
    #[arg(long)]
    pub events: u64,
    #[arg(long)]
    pub n: u64,
    /// Credible-interval coverage; engine default when omitted.
    #[arg(long)]
    pub coverage: Option<f64>,
    #[arg(long, default_value = "unspecified prior")]
    pub source: String,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[arg(long)]
    pub baseline_risk: f64,
    /// Catalog identifiers, repeatable.
    #[arg(long = "mitigation", required = true)]
    pub mitigations: Vec<String>,
    #[arg(long, default_value_t = 0.0)]
    pub correlation: f64,
    #[arg(long, default_value_t = 5_000)]
    pub samples: usize,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args)]
pub struct SignalsArgs {
    /// Product name, repeatable.
    #[arg(long = "product", required = true)]
    pub products: Vec<String>,
    /// Adverse-event term, repeatable.
    #[arg(long = "event", required = true)]
    pub adverse_events: Vec<String>,
    /// Shared sqlite rate-ledger path for multi-worker deployments;
    /// defaults to an in-process ledger.
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// JSON fixtures file of pre-recorded report counts; when set, no
    /// requests leave the machine.
    #[arg(long)]
    pub offline: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn simulate_parses_repeated_mitigations() {
        let cli = Cli::parse_from([
            "cytosentry",
            "simulate",
            "--baseline-risk",
            "0.3",
            "--mitigation",
            "tocilizumab",
            "--mitigation",
            "anakinra",
            "--correlation",
            "0.5",
        ]);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.mitigations.len(), 2);
                assert_eq!(args.samples, 5_000);
                assert_eq!(args.seed, 42);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn signals_accepts_offline_fixtures() {
        let cli = Cli::parse_from([
            "cytosentry",
            "signals",
            "--product",
            "tisagenlecleucel",
            "--event",
            "crs",
            "--offline",
            "fixtures.json",
        ]);
        match cli.command {
            Commands::Signals(args) => {
                assert!(args.offline.is_some());
                assert!(args.ledger.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn posterior_requires_counts() {
        assert!(
            Cli::try_parse_from(["cytosentry", "posterior", "--alpha", "2", "--beta", "5"])
                .is_err()
        );
    }
}
