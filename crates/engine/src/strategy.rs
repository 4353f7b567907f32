//! Action-selection strategies — Random, Greedy, Epsilon-Greedy.
//!
//! A strategy is a pure decision rule over the current value estimates and an
//! injected random source; agent state lives in [`Agent`](crate::Agent).

use bandit_core::config::StrategyConfig;
use bandit_core::{BanditError, BanditResult, StrategyKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", try_from = "StrategyRepr")]
pub enum Strategy {
    Random,
    #[default]
    Greedy,
    EpsilonGreedy {
        eps: f64,
    },
}

/// Wire shape of [`Strategy`]; deserialized values pass through the same checks
/// as the constructors.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
enum StrategyRepr {
    Random,
    Greedy,
    EpsilonGreedy { eps: f64 },
}

impl TryFrom<StrategyRepr> for Strategy {
    type Error = BanditError;

    fn try_from(repr: StrategyRepr) -> Result<Self, Self::Error> {
        match repr {
            StrategyRepr::Random => Ok(Strategy::Random),
            StrategyRepr::Greedy => Ok(Strategy::Greedy),
            StrategyRepr::EpsilonGreedy { eps } => Strategy::epsilon_greedy(eps),
        }
    }
}

impl Strategy {
    /// Epsilon-greedy with exploration rate `eps` in `[0, 1]`.
    pub fn epsilon_greedy(eps: f64) -> BanditResult<Self> {
        if !(0.0..=1.0).contains(&eps) {
            return Err(BanditError::Validation(format!(
                "eps must lie in [0, 1], got {eps}"
            )));
        }
        Ok(Strategy::EpsilonGreedy { eps })
    }

    pub fn from_config(config: &StrategyConfig) -> BanditResult<Self> {
        match config.kind {
            StrategyKind::Random => Ok(Strategy::Random),
            StrategyKind::Greedy => Ok(Strategy::Greedy),
            StrategyKind::EpsilonGreedy => Self::epsilon_greedy(config.eps),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::EpsilonGreedy { .. } => "epsilon_greedy",
        }
    }

    pub fn eps(&self) -> Option<f64> {
        match self {
            Strategy::EpsilonGreedy { eps } => Some(*eps),
            _ => None,
        }
    }

    /// Pick an action index in `[0, values.len())`. `values` must be non-empty.
    pub fn choose<R: Rng + ?Sized>(&self, values: &[f64], rng: &mut R) -> usize {
        match self {
            Strategy::Random => random_action(values.len(), rng),
            Strategy::Greedy => greedy_action(values, rng),
            Strategy::EpsilonGreedy { eps } => {
                // Explore-vs-exploit coin is drawn before any selection draw.
                if rng.gen::<f64>() < *eps {
                    random_action(values.len(), rng)
                } else {
                    greedy_action(values, rng)
                }
            }
        }
    }
}

fn random_action<R: Rng + ?Sized>(n: usize, rng: &mut R) -> usize {
    rng.gen_range(0..n)
}

/// Index of the maximum value; ties are broken uniformly at random.
fn greedy_action<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> usize {
    let best_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == best_value)
        .map(|(i, _)| i)
        .collect();

    match tied.len() {
        0 => random_action(values.len(), rng),
        1 => tied[0],
        n => tied[rng.gen_range(0..n)],
    }
}
