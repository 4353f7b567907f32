//! Bandit agent — value estimates, selection counts and append-only histories
//! driven by a [`Strategy`].

use crate::environment::Environment;
use crate::strategy::Strategy;
use bandit_core::{BanditError, BanditResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// A single strategy-driven decision process sampling a shared environment.
#[derive(Debug)]
pub struct Agent {
    environment: Arc<Environment>,
    strategy: Strategy,
    values: Vec<f64>,
    selection_count: Vec<u64>,
    reward_history: Vec<f64>,
    choice_history: Vec<usize>,
    rng: StdRng,
}

impl Agent {
    /// Agent with all-zero estimates and an entropy-seeded generator.
    pub fn new(environment: Arc<Environment>, strategy: Strategy) -> Self {
        Self::with_rng(environment, strategy, StdRng::from_entropy())
    }

    pub fn with_rng(environment: Arc<Environment>, strategy: Strategy, rng: StdRng) -> Self {
        let n = environment.len();
        Self {
            environment,
            strategy,
            values: vec![0.0; n],
            selection_count: vec![0; n],
            reward_history: Vec::new(),
            choice_history: Vec::new(),
            rng,
        }
    }

    /// Replace the initial value estimates. Only valid before any action.
    pub fn with_values(mut self, values: Vec<f64>) -> BanditResult<Self> {
        if self.step_count() > 0 {
            return Err(BanditError::Validation(
                "initial values can only be set before any action".to_string(),
            ));
        }
        if values.len() != self.environment.len() {
            return Err(BanditError::Validation(format!(
                "expected {} initial values, got {}",
                self.environment.len(),
                values.len()
            )));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(BanditError::Validation(
                "initial values must not be NaN".to_string(),
            ));
        }
        self.values = values;
        Ok(self)
    }

    /// Strategy decision over the current estimates. Consumes randomness only.
    pub fn choose_action(&mut self) -> usize {
        self.strategy.choose(&self.values, &mut self.rng)
    }

    /// Take one action, or `forced` verbatim when given, and fold the reward
    /// into the estimates. Nothing is mutated if the draw fails.
    pub fn act(&mut self, forced: Option<usize>) -> BanditResult<f64> {
        let action = match forced {
            Some(i) => i,
            None => self.choose_action(),
        };
        let reward = self.environment.act(action, &mut self.rng)?;

        // Incremental sample mean: v += (r - v) / (n + 1).
        let n = self.selection_count[action];
        self.values[action] += (reward - self.values[action]) / (n + 1) as f64;
        self.selection_count[action] = n + 1;

        self.reward_history.push(reward);
        self.choice_history.push(action);
        Ok(reward)
    }

    /// Parallel, index-aligned (rewards, choices).
    pub fn history(&self) -> (&[f64], &[usize]) {
        (&self.reward_history, &self.choice_history)
    }

    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    pub fn choice_history(&self) -> &[usize] {
        &self.choice_history
    }

    pub fn step_count(&self) -> usize {
        self.choice_history.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn selection_counts(&self) -> &[u64] {
        &self.selection_count
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn eps(&self) -> Option<f64> {
        self.strategy.eps()
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }
}
