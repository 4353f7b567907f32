//! Single-state environment: a fixed, ordered set of reward sources.

use crate::reward::{GaussianReward, Moment, PoissonReward, RewardSource};
use bandit_core::config::EnvironmentConfig;
use bandit_core::{BanditError, BanditResult, RewardKind};
use rand::RngCore;
use tracing::debug;

/// Immutable collection of arms shared by every agent that samples it.
#[derive(Debug)]
pub struct Environment {
    rewards: Vec<Box<dyn RewardSource>>,
}

impl Environment {
    /// Build an environment from at least one reward source.
    pub fn new(rewards: Vec<Box<dyn RewardSource>>) -> BanditResult<Self> {
        if rewards.is_empty() {
            return Err(BanditError::Validation(
                "environment needs at least one reward source".to_string(),
            ));
        }
        debug!(actions = rewards.len(), "Environment created");
        Ok(Self { rewards })
    }

    /// Build an environment with one arm per configured mean (or rate).
    pub fn from_config(config: &EnvironmentConfig) -> BanditResult<Self> {
        let rewards = config
            .means
            .iter()
            .map(|&m| {
                let source: Box<dyn RewardSource> = match config.reward {
                    RewardKind::Gaussian => Box::new(GaussianReward::new(m, config.variance)?),
                    RewardKind::Poisson => Box::new(PoissonReward::with_shift(m, config.shift)?),
                };
                Ok(source)
            })
            .collect::<BanditResult<Vec<_>>>()?;
        Self::new(rewards)
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Always false for a constructed environment.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Draw one reward from arm `i`.
    pub fn act(&self, i: usize, rng: &mut dyn RngCore) -> BanditResult<f64> {
        let source = self.rewards.get(i).ok_or(BanditError::ActionOutOfRange {
            index: i,
            len: self.rewards.len(),
        })?;
        Ok(source.sample(rng))
    }

    pub fn expected_rewards(&self) -> Vec<f64> {
        self.rewards.iter().map(|r| r.expected_value()).collect()
    }

    pub fn moments(&self, kinds: &[Moment]) -> Vec<Vec<f64>> {
        self.rewards.iter().map(|r| r.moments(kinds)).collect()
    }

    /// Index of the arm with the highest expected reward (lowest index on ties).
    pub fn best_action(&self) -> usize {
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, value) in self.expected_rewards().into_iter().enumerate() {
            if value > best_value {
                best_value = value;
                best = i;
            }
        }
        best
    }

    pub fn rewards(&self) -> &[Box<dyn RewardSource>] {
        &self.rewards
    }
}
