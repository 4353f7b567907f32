//! Reward sources — the stochastic arms an environment is built from.
//!
//! Every source implements [`RewardSource`], so an [`Environment`](crate::Environment)
//! can mix distribution families freely.

use bandit_core::{BanditError, BanditResult};
use rand::RngCore;
use rand_distr::{Distribution, Poisson, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A statistical moment a reward source can report analytically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moment {
    Mean,
    Variance,
    Skewness,
    /// Excess kurtosis (zero for a Gaussian).
    Kurtosis,
}

/// Moments reported when the caller does not ask for a specific set.
pub const DEFAULT_MOMENTS: [Moment; 2] = [Moment::Mean, Moment::Variance];

/// Ordered selection of moments, parsed from the compact letter form
/// (`"m"`, `"mv"`, `"mvsk"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentSet(Vec<Moment>);

impl MomentSet {
    pub fn as_slice(&self) -> &[Moment] {
        &self.0
    }
}

impl Default for MomentSet {
    fn default() -> Self {
        Self(DEFAULT_MOMENTS.to_vec())
    }
}

impl FromStr for MomentSet {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(BanditError::Validation(
                "moment selection must not be empty".to_string(),
            ));
        }
        let moments = s
            .chars()
            .map(|c| match c {
                'm' => Ok(Moment::Mean),
                'v' => Ok(Moment::Variance),
                's' => Ok(Moment::Skewness),
                'k' => Ok(Moment::Kurtosis),
                other => Err(BanditError::Validation(format!(
                    "unknown moment '{other}', expected one of m, v, s, k"
                ))),
            })
            .collect::<BanditResult<Vec<_>>>()?;
        Ok(Self(moments))
    }
}

/// A stochastic generator of numeric rewards with analytic moments.
pub trait RewardSource: fmt::Debug + Send + Sync {
    /// One stochastic draw.
    fn sample(&self, rng: &mut dyn RngCore) -> f64;

    /// Analytic value of a single moment.
    fn moment(&self, moment: Moment) -> f64;

    /// Distribution family name for logging and reports.
    fn family(&self) -> &'static str;

    fn expected_value(&self) -> f64 {
        self.moment(Moment::Mean)
    }

    /// Requested moments, in the order asked for.
    fn moments(&self, kinds: &[Moment]) -> Vec<f64> {
        kinds.iter().map(|&m| self.moment(m)).collect()
    }
}

/// Normally distributed reward.
#[derive(Debug, Clone)]
pub struct GaussianReward {
    mean: f64,
    variance: f64,
    std_dev: f64,
}

impl GaussianReward {
    pub fn new(mean: f64, variance: f64) -> BanditResult<Self> {
        if !mean.is_finite() {
            return Err(BanditError::Validation(format!(
                "gaussian mean must be finite, got {mean}"
            )));
        }
        if !(variance > 0.0 && variance.is_finite()) {
            return Err(BanditError::Validation(format!(
                "gaussian variance must be positive, got {variance}"
            )));
        }
        Ok(Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }
}

impl Default for GaussianReward {
    fn default() -> Self {
        Self {
            mean: 0.0,
            variance: 1.0,
            std_dev: 1.0,
        }
    }
}

impl RewardSource for GaussianReward {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        self.mean + self.std_dev * z
    }

    fn moment(&self, moment: Moment) -> f64 {
        match moment {
            Moment::Mean => self.mean,
            Moment::Variance => self.variance,
            Moment::Skewness | Moment::Kurtosis => 0.0,
        }
    }

    fn family(&self) -> &'static str {
        "gaussian"
    }
}

/// Poisson distributed reward with an optional integer shift.
#[derive(Debug, Clone)]
pub struct PoissonReward {
    rate: f64,
    shift: i64,
    dist: Poisson<f64>,
}

impl PoissonReward {
    pub fn new(rate: f64) -> BanditResult<Self> {
        Self::with_shift(rate, 0)
    }

    pub fn with_shift(rate: f64, shift: i64) -> BanditResult<Self> {
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(BanditError::Validation(format!(
                "poisson rate must be positive, got {rate}"
            )));
        }
        let dist = Poisson::new(rate).map_err(|e| BanditError::Validation(e.to_string()))?;
        Ok(Self { rate, shift, dist })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn shift(&self) -> i64 {
        self.shift
    }
}

impl Default for PoissonReward {
    fn default() -> Self {
        Self {
            rate: 1.0,
            shift: 0,
            dist: Poisson::new(1.0).expect("unit rate is a valid poisson rate"),
        }
    }
}

impl RewardSource for PoissonReward {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng) + self.shift as f64
    }

    fn moment(&self, moment: Moment) -> f64 {
        match moment {
            Moment::Mean => self.rate + self.shift as f64,
            Moment::Variance => self.rate,
            Moment::Skewness => 1.0 / self.rate.sqrt(),
            Moment::Kurtosis => 1.0 / self.rate,
        }
    }

    fn family(&self) -> &'static str {
        "poisson"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::{E, PI};

    #[test]
    fn test_gaussian_moments() {
        let gr = GaussianReward::new(PI, E).unwrap();
        let mvsk: MomentSet = "mvsk".parse().unwrap();
        let m = gr.moments(mvsk.as_slice());
        assert_eq!(m[0], PI);
        assert!((m[1] - E).abs() < 1e-12);
        assert_eq!(m[2], 0.0);
        assert_eq!(m[3], 0.0);
        assert_eq!(gr.expected_value(), PI);
    }

    #[test]
    fn test_poisson_moments() {
        let pr = PoissonReward::new(PI).unwrap();
        assert_eq!(pr.moments(&DEFAULT_MOMENTS), vec![PI, PI]);
        assert!((pr.moment(Moment::Skewness) - 1.0 / PI.sqrt()).abs() < 1e-12);
        assert!((pr.moment(Moment::Kurtosis) - 1.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn test_poisson_shift_moves_mean_only() {
        let pr = PoissonReward::with_shift(2.0, 3).unwrap();
        assert_eq!(pr.expected_value(), 5.0);
        assert_eq!(pr.moment(Moment::Variance), 2.0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let r = pr.sample(&mut rng);
            assert!(r >= 3.0);
            assert_eq!(r.fract(), 0.0);
        }
    }

    #[test]
    fn test_defaults() {
        let gr = GaussianReward::default();
        assert_eq!(gr.moments(&DEFAULT_MOMENTS), vec![0.0, 1.0]);
        let pr = PoissonReward::default();
        assert_eq!(pr.moments(&DEFAULT_MOMENTS), vec![1.0, 1.0]);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(
            GaussianReward::new(0.0, 0.0),
            Err(BanditError::Validation(_))
        ));
        assert!(matches!(
            GaussianReward::new(0.0, -1.0),
            Err(BanditError::Validation(_))
        ));
        assert!(matches!(
            GaussianReward::new(f64::NAN, 1.0),
            Err(BanditError::Validation(_))
        ));
        assert!(matches!(
            PoissonReward::new(0.0),
            Err(BanditError::Validation(_))
        ));
        assert!(matches!(
            PoissonReward::with_shift(-2.5, 1),
            Err(BanditError::Validation(_))
        ));
    }

    #[test]
    fn test_moment_set_parsing() {
        let set = MomentSet::default();
        assert_eq!(set.as_slice(), &DEFAULT_MOMENTS);
        let sk: MomentSet = "sk".parse().unwrap();
        assert_eq!(sk.as_slice(), &[Moment::Skewness, Moment::Kurtosis]);
        assert!("mx".parse::<MomentSet>().is_err());
        assert!("".parse::<MomentSet>().is_err());
    }

    #[test]
    fn test_gaussian_sample_mean_converges() {
        let gr = GaussianReward::new(2.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mean = (0..n).map(|_| gr.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "sample mean {mean}");
    }
}
