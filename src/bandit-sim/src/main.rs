//! Bandit Sim — runs a posse of bandit agents against a stationary
//! environment and prints the per-step report as JSON.

use bandit_core::config::SimConfig;
use bandit_core::StrategyKind;
use bandit_engine::{BestChoice, Environment, Posse, Strategy};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bandit-sim")]
#[command(about = "Multi-armed bandit strategy comparison across many independent agents")]
#[command(version)]
struct Cli {
    /// Number of agents in the posse (overrides config)
    #[arg(long, env = "BANDIT_SIM__N_AGENTS")]
    agents: Option<usize>,

    /// Number of steps every agent takes (overrides config)
    #[arg(long, env = "BANDIT_SIM__N_STEPS")]
    steps: Option<usize>,

    /// Strategy: random, greedy or epsilon_greedy (overrides config)
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Exploration rate for epsilon_greedy (overrides config)
    #[arg(long)]
    eps: Option<f64>,

    /// Seed for reproducible runs (overrides config)
    #[arg(long, env = "BANDIT_SIM__SEED")]
    seed: Option<u64>,

    /// Step agents on the rayon thread pool
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Best action as JSON: an index (`4`) or one index per step (`[4, 4, 3]`).
    /// Defaults to the arm with the highest expected reward.
    #[arg(long)]
    best_choice: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandit_sim=info,bandit_engine=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = SimConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        SimConfig::default()
    });

    // Apply CLI overrides
    if let Some(agents) = cli.agents {
        config.n_agents = agents;
    }
    if let Some(steps) = cli.steps {
        config.n_steps = steps;
    }
    if let Some(kind) = cli.strategy {
        config.strategy.kind = kind;
    }
    if let Some(eps) = cli.eps {
        config.strategy.eps = eps;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.parallel |= cli.parallel;

    info!(
        n_agents = config.n_agents,
        n_steps = config.n_steps,
        strategy = ?config.strategy.kind,
        seed = ?config.seed,
        parallel = config.parallel,
        "Configuration loaded"
    );

    let environment = Arc::new(Environment::from_config(&config.environment)?);
    let strategy = Strategy::from_config(&config.strategy)?;

    let best_choice = match cli.best_choice.as_deref() {
        Some(raw) => raw.parse::<BestChoice>()?,
        None => BestChoice::from(environment.best_action()),
    };

    let mut posse = match config.seed {
        Some(seed) => Posse::seeded(environment, strategy, config.n_agents, seed)?,
        None => Posse::new(environment, strategy, config.n_agents)?,
    };

    if config.parallel {
        posse.take_actions_parallel(config.n_steps)?;
    } else {
        posse.take_actions(config.n_steps)?;
    }

    let report = posse.report(&best_choice)?;
    info!(
        run_id = %report.run_id,
        final_mean_reward = ?report.final_mean_reward,
        final_best_choice_fraction = ?report.final_best_choice_fraction,
        "Run complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
