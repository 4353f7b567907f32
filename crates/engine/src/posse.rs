//! Posse — a fixed-size cohort of independently seeded agents sharing one
//! environment, driven in lockstep and summarized per time step.

use crate::agent::Agent;
use crate::environment::Environment;
use crate::strategy::Strategy;
use bandit_core::{BanditError, BanditResult, CohortReport};
use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// The action considered optimal, either for every step or per step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestChoice {
    Constant(usize),
    PerStep(Vec<usize>),
}

impl BestChoice {
    /// Expand to one target per recorded step.
    pub fn resolve(&self, steps: usize) -> BanditResult<Vec<usize>> {
        match self {
            BestChoice::Constant(a) => Ok(vec![*a; steps]),
            BestChoice::PerStep(per_step) => {
                if per_step.len() != steps {
                    return Err(BanditError::LengthMismatch {
                        expected: steps,
                        got: per_step.len(),
                    });
                }
                Ok(per_step.clone())
            }
        }
    }
}

impl From<usize> for BestChoice {
    fn from(a: usize) -> Self {
        BestChoice::Constant(a)
    }
}

impl From<Vec<usize>> for BestChoice {
    fn from(per_step: Vec<usize>) -> Self {
        BestChoice::PerStep(per_step)
    }
}

impl From<&[usize]> for BestChoice {
    fn from(per_step: &[usize]) -> Self {
        BestChoice::PerStep(per_step.to_vec())
    }
}

fn as_index(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|v| usize::try_from(v).ok())
}

impl TryFrom<&Value> for BestChoice {
    type Error = BanditError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(_) => as_index(value).map(BestChoice::Constant).ok_or_else(|| {
                BanditError::InvalidBestChoice(format!(
                    "best_choice must be a non-negative integer, got {value}"
                ))
            }),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    as_index(item).ok_or_else(|| {
                        BanditError::InvalidBestChoice(format!(
                            "best_choice entries must be non-negative integers, got {item}"
                        ))
                    })
                })
                .collect::<BanditResult<Vec<_>>>()
                .map(BestChoice::PerStep),
            other => Err(BanditError::InvalidBestChoice(format!(
                "best_choice must be an integer or a sequence of integers, got {other}"
            ))),
        }
    }
}

impl FromStr for BestChoice {
    type Err = BanditError;

    /// Parse from JSON text: `4` or `[4, 4, 3]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        BestChoice::try_from(&value)
    }
}

/// Row-per-agent history matrices, valid for `generation` steps.
#[derive(Debug)]
struct HistoryCache {
    generation: usize,
    rewards: Array2<f64>,
    choices: Array2<usize>,
}

impl HistoryCache {
    fn empty(n_agents: usize) -> Self {
        Self {
            generation: 0,
            rewards: Array2::zeros((n_agents, 0)),
            choices: Array2::zeros((n_agents, 0)),
        }
    }
}

/// A posse of agents that all sample the same environment for the same
/// number of steps.
#[derive(Debug)]
pub struct Posse {
    run_id: Uuid,
    environment: Arc<Environment>,
    strategy: Strategy,
    agents: Vec<Agent>,
    n_actions_taken: usize,
    cache: HistoryCache,
}

impl Posse {
    /// Cohort of `n_agents` entropy-seeded agents.
    pub fn new(
        environment: Arc<Environment>,
        strategy: Strategy,
        n_agents: usize,
    ) -> BanditResult<Self> {
        Self::build(environment, strategy, n_agents, StdRng::from_entropy())
    }

    /// Reproducible cohort: every agent's generator derives from `seed`.
    pub fn seeded(
        environment: Arc<Environment>,
        strategy: Strategy,
        n_agents: usize,
        seed: u64,
    ) -> BanditResult<Self> {
        Self::build(environment, strategy, n_agents, StdRng::seed_from_u64(seed))
    }

    fn build(
        environment: Arc<Environment>,
        strategy: Strategy,
        n_agents: usize,
        mut master: StdRng,
    ) -> BanditResult<Self> {
        if n_agents == 0 {
            return Err(BanditError::Validation(
                "a posse needs at least one agent".to_string(),
            ));
        }

        let agents = (0..n_agents)
            .map(|_| {
                let rng = StdRng::from_rng(&mut master)
                    .map_err(|e| BanditError::Internal(anyhow::Error::new(e)))?;
                Ok(Agent::with_rng(environment.clone(), strategy, rng))
            })
            .collect::<BanditResult<Vec<_>>>()?;

        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            n_agents = n_agents,
            strategy = strategy.name(),
            actions = environment.len(),
            "Posse assembled"
        );

        Ok(Self {
            run_id,
            environment,
            strategy,
            agents,
            n_actions_taken: 0,
            cache: HistoryCache::empty(n_agents),
        })
    }

    /// Give every agent the same initial value estimates. Only before any step.
    pub fn with_values(mut self, values: Vec<f64>) -> BanditResult<Self> {
        if self.n_actions_taken > 0 {
            return Err(BanditError::Validation(
                "initial values can only be set before any action".to_string(),
            ));
        }
        self.agents = self
            .agents
            .into_iter()
            .map(|agent| agent.with_values(values.clone()))
            .collect::<BanditResult<Vec<_>>>()?;
        Ok(self)
    }

    /// Take `n` actions with every agent in the posse.
    pub fn take_actions(&mut self, n: usize) -> BanditResult<()> {
        for _ in 0..n {
            for agent in &mut self.agents {
                agent.act(None)?;
            }
        }
        self.advance(n);
        Ok(())
    }

    /// Like [`take_actions`](Self::take_actions), with agents stepping on the
    /// rayon pool. Returns once every agent has finished its `n` actions.
    pub fn take_actions_parallel(&mut self, n: usize) -> BanditResult<()> {
        self.agents.par_iter_mut().try_for_each(|agent| {
            (0..n).try_for_each(|_| agent.act(None).map(|_| ()))
        })?;
        self.advance(n);
        Ok(())
    }

    /// Take `n` steps where `choose(agent, step)` dictates every action.
    /// All indices are checked before any agent moves.
    pub fn take_forced_actions<F>(&mut self, n: usize, choose: F) -> BanditResult<()>
    where
        F: Fn(usize, usize) -> usize,
    {
        let len = self.environment.len();
        let start = self.n_actions_taken;
        for step in start..start + n {
            for agent in 0..self.agents.len() {
                let index = choose(agent, step);
                if index >= len {
                    return Err(BanditError::ActionOutOfRange { index, len });
                }
            }
        }

        for step in start..start + n {
            for (i, agent) in self.agents.iter_mut().enumerate() {
                agent.act(Some(choose(i, step)))?;
            }
        }
        self.advance(n);
        Ok(())
    }

    fn advance(&mut self, n: usize) {
        self.n_actions_taken += n;
        metrics::counter!("posse.actions").increment((n * self.agents.len()) as u64);
        debug!(
            run_id = %self.run_id,
            steps = n,
            total = self.n_actions_taken,
            "Posse advanced"
        );
    }

    fn refresh_histories(&mut self) {
        if self.cache.generation >= self.n_actions_taken {
            return;
        }
        let steps = self.n_actions_taken;
        let agents = &self.agents;
        let shape = (agents.len(), steps);
        self.cache = HistoryCache {
            generation: steps,
            rewards: Array2::from_shape_fn(shape, |(i, t)| agents[i].reward_history()[t]),
            choices: Array2::from_shape_fn(shape, |(i, t)| agents[i].choice_history()[t]),
        };
        metrics::counter!("posse.cache_rebuilds").increment(1);
        debug!(run_id = %self.run_id, generation = steps, "History cache rebuilt");
    }

    /// Rewards, one row per agent, one column per step.
    pub fn reward_histories(&mut self) -> &Array2<f64> {
        self.refresh_histories();
        &self.cache.rewards
    }

    /// Chosen actions, one row per agent, one column per step.
    pub fn choice_histories(&mut self) -> &Array2<usize> {
        self.refresh_histories();
        &self.cache.choices
    }

    /// Average reward at each step over all agents.
    pub fn mean_reward(&mut self) -> Array1<f64> {
        self.refresh_histories();
        column_mean(&self.cache.rewards)
    }

    /// Variance at each step of the reward over all agents.
    pub fn var_reward(&mut self) -> Array1<f64> {
        self.refresh_histories();
        self.cache.rewards.var_axis(Axis(0), 0.0)
    }

    /// Fraction of agents choosing the best action at each step.
    pub fn mean_best_choice(&mut self, best_choice: &BestChoice) -> BanditResult<Array1<f64>> {
        let hits = self.best_choice_hits(best_choice)?;
        Ok(column_mean(&hits))
    }

    /// Variance at each step of the best-choice indicator over all agents.
    pub fn var_best_choice(&mut self, best_choice: &BestChoice) -> BanditResult<Array1<f64>> {
        let hits = self.best_choice_hits(best_choice)?;
        Ok(hits.var_axis(Axis(0), 0.0))
    }

    fn best_choice_hits(&mut self, best_choice: &BestChoice) -> BanditResult<Array2<f64>> {
        self.refresh_histories();
        let targets = best_choice.resolve(self.n_actions_taken)?;
        let choices = &self.cache.choices;
        Ok(Array2::from_shape_fn(choices.dim(), |(i, t)| {
            if choices[[i, t]] == targets[t] {
                1.0
            } else {
                0.0
            }
        }))
    }

    /// Per-step summary of the run against `best_choice`.
    pub fn report(&mut self, best_choice: &BestChoice) -> BanditResult<CohortReport> {
        let targets = best_choice.resolve(self.n_actions_taken)?;
        let mean_reward = self.mean_reward().to_vec();
        let var_reward = self.var_reward().to_vec();
        let mean_best_choice = self.mean_best_choice(best_choice)?.to_vec();
        let var_best_choice = self.var_best_choice(best_choice)?.to_vec();

        Ok(CohortReport {
            run_id: self.run_id,
            strategy: self.strategy.name().to_string(),
            eps: self.strategy.eps(),
            n_agents: self.agents.len(),
            n_actions_taken: self.n_actions_taken,
            expected_rewards: self.environment.expected_rewards(),
            best_choice: targets,
            final_mean_reward: mean_reward.last().copied(),
            final_best_choice_fraction: mean_best_choice.last().copied(),
            mean_reward,
            var_reward,
            mean_best_choice,
            var_best_choice,
            computed_at: Utc::now(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn n_actions_taken(&self) -> usize {
        self.n_actions_taken
    }

    /// Number of steps taken, matching [`n_actions_taken`](Self::n_actions_taken).
    pub fn len(&self) -> usize {
        self.n_actions_taken
    }

    pub fn is_empty(&self) -> bool {
        self.n_actions_taken == 0
    }

    pub fn n_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn len_env(&self) -> usize {
        self.environment.len()
    }

    pub fn n_rewards(&self) -> usize {
        self.len_env()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

fn column_mean(matrix: &Array2<f64>) -> Array1<f64> {
    matrix
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(matrix.ncols()))
}
