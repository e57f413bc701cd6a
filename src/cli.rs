use clap::{Parser, ValueEnum};

use crate::solver::acceptance_criterion::AcceptanceCriterionStrategy;
use crate::solver::local_search::Parameters;
use crate::utils::TimeLimit;

#[derive(Parser, Debug)]
#[command(version)]
pub struct ProgramArguments {
    #[arg(long, help = "rng seed")]
    pub seed: Option<i128>,

    #[arg(long, help = "scenario file path (toml)")]
    pub scenario: String,

    #[arg(long, help = "settings file path with the setup/plan timeouts (toml)")]
    pub settings: Option<String>,

    #[arg(long, help = "plan output file path")]
    pub plan: Option<String>,

    #[arg(long, help = "json plan output file path")]
    pub json: Option<String>,

    #[command(flatten)]
    pub solver: SolverArguments,

    #[arg(long, help = "print summary to stdout", default_value = "false")]
    pub print_summary_to_stdout: bool,
}

#[allow(non_camel_case_types)]
#[derive(Clone, ValueEnum, Debug, PartialEq)]
pub enum Solver {
    Local_Search,
    Naive,
}

#[derive(Clone, ValueEnum, Debug, PartialEq)]
pub enum AcceptanceMode {
    Conservative,
    Metropolis,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SolverArguments {
    #[arg(long = "solver", value_enum, default_value = "local-search")]
    pub variant: Solver,
    #[arg(long, default_value = "1000")]
    pub iterations: usize,
    #[arg(
        long,
        default_value = "0.4",
        help = "probability of keeping the current state instead of moving to the best neighbor"
    )]
    pub conservative_rate: f64,
    #[arg(long, default_value = "conservative")]
    pub acceptance: AcceptanceMode,
    #[arg(long, default_value = "10.0", value_parser = parse_temperature)]
    pub init_temp: f64,
    #[arg(long, default_value = "0.01", value_parser = parse_temperature)]
    pub final_temp: f64,
    #[arg(long, help = "wall-clock limit of the search (default: unlimited)")]
    pub time_limit_in_ms: Option<u64>,
}

fn parse_temperature(value: &str) -> Result<f64, String> {
    let temperature: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if temperature.is_finite() && temperature > 0.0 {
        Ok(temperature)
    } else {
        Err(format!("temperature must be positive, got {value}"))
    }
}

impl SolverArguments {
    pub fn acceptance_criterion_strategy(&self) -> AcceptanceCriterionStrategy {
        match self.acceptance {
            AcceptanceMode::Conservative => AcceptanceCriterionStrategy::Conservative {
                rate: self.conservative_rate,
            },
            AcceptanceMode::Metropolis => AcceptanceCriterionStrategy::ExponentialMetropolis {
                initial_temperature: self.init_temp,
                final_temperature: self.final_temp,
            },
        }
    }

    pub fn parameters(&self) -> Parameters {
        Parameters {
            max_iterations: self.iterations,
            acceptance: self.acceptance_criterion_strategy(),
        }
    }

    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit_in_ms
            .map_or(TimeLimit::None, TimeLimit::Milliseconds)
    }
}
