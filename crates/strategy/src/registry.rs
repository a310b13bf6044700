use tracing::info;

use common::{Error, Result};

use crate::config::StrategyConfig;
use crate::strategies::{MomentumStrategy, MovingAverageCrossover, RsiStrategy};
use crate::Strategy;

/// Build every configured strategy, in file order.
///
/// Fails on the first invalid entry so a bad config never reaches the engine.
pub fn build_strategies(configs: &[StrategyConfig]) -> Result<Vec<Box<dyn Strategy>>> {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::with_capacity(configs.len());

    for (index, cfg) in configs.iter().enumerate() {
        let strategy = build_strategy(cfg).map_err(|e| match e {
            Error::Config(msg) => {
                Error::Config(format!("strategy #{} '{}': {msg}", index + 1, cfg.display_name()))
            }
            other => other,
        })?;
        info!(name = %strategy.name(), "Registered strategy");
        strategies.push(strategy);
    }

    Ok(strategies)
}

fn build_strategy(cfg: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    let name = cfg.display_name();
    match *cfg {
        StrategyConfig::MovingAverageCrossover {
            short_window,
            long_window,
            ..
        } => Ok(Box::new(MovingAverageCrossover::new(name, short_window, long_window)?)),
        StrategyConfig::Rsi {
            period,
            oversold,
            overbought,
            ..
        } => Ok(Box::new(RsiStrategy::new(name, period, oversold, overbought)?)),
        StrategyConfig::Momentum {
            lookback_period,
            threshold,
            ..
        } => Ok(Box::new(MomentumStrategy::new(name, lookback_period, threshold)?)),
    }
}
