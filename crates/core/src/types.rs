use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decision rule an agent applies over its value estimates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    #[default]
    Greedy,
    EpsilonGreedy,
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "random" => Ok(StrategyKind::Random),
            "greedy" => Ok(StrategyKind::Greedy),
            "epsilon_greedy" | "eps_greedy" => Ok(StrategyKind::EpsilonGreedy),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Distribution family used for every arm of a configured environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    #[default]
    Gaussian,
    Poisson,
}

/// Per-step aggregate statistics of a cohort run, ready for downstream
/// reporting or plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReport {
    pub run_id: Uuid,
    pub strategy: String,
    pub eps: Option<f64>,
    pub n_agents: usize,
    pub n_actions_taken: usize,
    pub expected_rewards: Vec<f64>,
    /// Designated best action per step.
    pub best_choice: Vec<usize>,
    pub mean_reward: Vec<f64>,
    pub var_reward: Vec<f64>,
    pub mean_best_choice: Vec<f64>,
    pub var_best_choice: Vec<f64>,
    pub final_mean_reward: Option<f64>,
    pub final_best_choice_fraction: Option<f64>,
    pub computed_at: DateTime<Utc>,
}
