//! Bandit simulation engine — reward sources, single-state environments,
//! strategy-driven agents (Random, Greedy, Epsilon-Greedy) and posses of
//! agents aggregated per time step.

pub mod agent;
pub mod environment;
pub mod posse;
pub mod reward;
pub mod strategy;

pub use agent::Agent;
pub use environment::Environment;
pub use posse::{BestChoice, Posse};
pub use reward::{GaussianReward, Moment, MomentSet, PoissonReward, RewardSource};
pub use strategy::Strategy;
