use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use log::{error, info};
use structopt::StructOpt;

use tabular_rl::config::RunConfig;
use tabular_rl::env::TaxiEnv;
use tabular_rl::error::ConfigError;
use tabular_rl::utils::moving_average;
use tabular_rl::{Error, TabularAgent, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Train,
    Test,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Mode::Train),
            "test" => Ok(Mode::Test),
            other => Err(ConfigError::Invalid(format!("unknown mode `{}`", other))),
        }
    }
}

/// Train or test a tabular agent on the Taxi environment
#[derive(StructOpt, Debug)]
#[structopt(name = "RLRust - Taxi")]
struct Cli {
    /// Agent variant: q-learning, sarsa or value-iteration [default: q-learning]
    #[structopt(long = "variant")]
    variant: Option<Variant>,

    /// Train a new table or test the saved one
    #[structopt(long = "mode", default_value = "train")]
    mode: Mode,

    /// TOML file with run settings; command line flags take precedence
    #[structopt(long = "config", parse(from_os_str))]
    config: Option<PathBuf>,

    /// Number of episodes (sweeps for value iteration)
    #[structopt(long = "epochs", short = "n")]
    epochs: Option<usize>,

    /// Directory the value tables are written to and read from
    #[structopt(long = "table_dir", parse(from_os_str))]
    table_dir: Option<PathBuf>,

    /// Pause between evaluation steps, in milliseconds
    #[structopt(long = "step_delay_ms")]
    step_delay_ms: Option<u64>,

    /// Seed for the environment and the exploration schedule
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Hide the training progress bar
    #[structopt(long = "no_progress")]
    no_progress: bool,

    /// Do not draw the map during evaluation
    #[structopt(long = "no_render")]
    no_render: bool,

    /// Moving average window for the training reward summary
    #[structopt(long = "moving_average_window", default_value = "10")]
    moving_average_window: usize,
}

fn build_config(cli: &Cli) -> Result<RunConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_toml_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(epochs) = cli.epochs {
        config.hyperparameters.epochs = Some(epochs);
    }
    if let Some(table_dir) = &cli.table_dir {
        config.table_dir = table_dir.clone();
    }
    if let Some(step_delay_ms) = cli.step_delay_ms {
        config.step_delay_ms = step_delay_ms;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.show_progress &= !cli.no_progress;
    config.render &= !cli.no_render;
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = build_config(&cli)?;
    let env = TaxiEnv::new(config.seed);
    let mut agent = TabularAgent::for_env(&config, &env)?;

    match cli.mode {
        Mode::Train => {
            let now: Instant = Instant::now();
            let results = agent.train(env)?;
            info!("training time of {:.2?}", now.elapsed());
            if !results.episode_rewards.is_empty() {
                let window = results.episode_rewards.len() / cli.moving_average_window.max(1);
                let averages = moving_average(window, &results.episode_rewards);
                info!(
                    "episode reward moving average: first {:.2}, last {:.2}",
                    averages.first().copied().unwrap_or_default(),
                    averages.last().copied().unwrap_or_default()
                );
            }
            info!("{} table saved to {:?}", agent.variant(), agent.table_path());
        }
        Mode::Test => {
            println!("Testing {}...", agent.variant());
            agent.evaluate(env)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli: Cli = Cli::from_args();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
