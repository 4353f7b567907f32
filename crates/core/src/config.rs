use crate::types::{RewardKind, StrategyKind};
use serde::Deserialize;

/// Root simulation configuration. Loaded from environment variables
/// with the prefix `BANDIT_SIM__`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_n_agents")]
    pub n_agents: usize,
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,
    #[serde(default = "default_eps")]
    pub eps: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub reward: RewardKind,
    /// Gaussian means, or Poisson rates.
    #[serde(default = "default_means")]
    pub means: Vec<f64>,
    /// Gaussian variance shared by every arm.
    #[serde(default = "default_variance")]
    pub variance: f64,
    /// Integer shift applied to Poisson arms.
    #[serde(default)]
    pub shift: i64,
}

// Default functions
fn default_n_agents() -> usize {
    20
}
fn default_n_steps() -> usize {
    100
}
fn default_eps() -> f64 {
    0.1
}
fn default_means() -> Vec<f64> {
    vec![-1.0, -0.5, 0.0, 0.5, 1.0]
}
fn default_variance() -> f64 {
    1.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::default(),
            eps: default_eps(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            reward: RewardKind::default(),
            means: default_means(),
            variance: default_variance(),
            shift: 0,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_agents: default_n_agents(),
            n_steps: default_n_steps(),
            seed: None,
            parallel: false,
            strategy: StrategyConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BANDIT_SIM")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("environment.means"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_five_arm_gaussian_run() {
        let config = SimConfig::default();
        assert_eq!(config.n_agents, 20);
        assert_eq!(config.n_steps, 100);
        assert_eq!(config.strategy.kind, StrategyKind::Greedy);
        assert_eq!(config.environment.reward, RewardKind::Gaussian);
        assert_eq!(config.environment.means, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!((config.environment.variance - 1.0).abs() < f64::EPSILON);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let json = r#"{"n_agents": 3, "strategy": {"kind": "epsilon_greedy"}}"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.n_agents, 3);
        assert_eq!(config.n_steps, 100);
        assert_eq!(config.strategy.kind, StrategyKind::EpsilonGreedy);
        assert!((config.strategy.eps - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.environment.means.len(), 5);
    }

    #[test]
    fn test_load_reads_prefixed_environment() {
        std::env::set_var("BANDIT_SIM__N_AGENTS", "7");
        std::env::set_var("BANDIT_SIM__STRATEGY__KIND", "epsilon_greedy");
        std::env::set_var("BANDIT_SIM__ENVIRONMENT__MEANS", "-1,0.5,2");

        let config = SimConfig::load().unwrap();
        assert_eq!(config.n_agents, 7);
        assert_eq!(config.n_steps, 100);
        assert_eq!(config.strategy.kind, StrategyKind::EpsilonGreedy);
        assert_eq!(config.environment.means, vec![-1.0, 0.5, 2.0]);
        assert_eq!(config.environment.reward, RewardKind::Gaussian);

        std::env::remove_var("BANDIT_SIM__N_AGENTS");
        std::env::remove_var("BANDIT_SIM__STRATEGY__KIND");
        std::env::remove_var("BANDIT_SIM__ENVIRONMENT__MEANS");
    }

    #[test]
    fn test_strategy_kind_from_str() {
        assert_eq!("random".parse::<StrategyKind>().unwrap(), StrategyKind::Random);
        assert_eq!(
            "epsilon-greedy".parse::<StrategyKind>().unwrap(),
            StrategyKind::EpsilonGreedy
        );
        assert!("softmax".parse::<StrategyKind>().is_err());
    }
}
