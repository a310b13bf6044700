pub mod config;
pub mod indicators;
pub mod registry;
pub mod strategies;

pub use config::StrategyConfig;
pub use registry::build_strategies;
pub use strategies::{MomentumStrategy, MovingAverageCrossover, RsiStrategy};

use common::{Action, PriceObservation};
use thiserror::Error;

/// Failure of a single evaluation. The engine isolates these per strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// The input data cannot be evaluated (e.g. a zero base price).
    /// The engine counts it and treats the evaluation as HOLD.
    #[error("data error: {0}")]
    Data(String),

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// All strategy implementations must satisfy this trait.
///
/// Implementations are pure: the result depends only on the arguments and the
/// configuration fixed at construction. Too little history yields
/// `Ok(Action::Hold)`, never an error.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// Evaluate `observation` against `history` (oldest first).
    ///
    /// The engine passes a history that already ends with `observation`;
    /// a history without it is accepted too.
    fn evaluate(
        &self,
        observation: &PriceObservation,
        history: &[PriceObservation],
    ) -> Result<Action, StrategyError>;
}

/// The newest `window` prices ending with `observation`, oldest first.
///
/// `observation` counts as already part of `history` only when it is the
/// last element itself, as the engine passes it. An equal but separate
/// observation is treated as a new tick.
pub fn closing_prices(
    observation: &PriceObservation,
    history: &[PriceObservation],
    window: usize,
) -> Vec<f64> {
    let past = match history.split_last() {
        Some((last, rest)) if std::ptr::eq(last, observation) => rest,
        _ => history,
    };
    let keep = window.saturating_sub(1).min(past.len());

    let mut prices = Vec::with_capacity(keep + 1);
    prices.extend(past[past.len() - keep..].iter().map(|o| o.price));
    prices.push(observation.price);
    prices
}
