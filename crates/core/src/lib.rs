pub mod config;
pub mod error;
pub mod types;

pub use config::SimConfig;
pub use error::{BanditError, BanditResult};
pub use types::{CohortReport, RewardKind, StrategyKind};
