use common::{Action, Error, PriceObservation, Result};

use crate::indicators::momentum::ZeroBase;
use crate::indicators::{Crossover, MomentumIndicator, RsiIndicator, SmaCrossover};
use crate::{closing_prices, Strategy, StrategyError};

// ─── Moving-average crossover ─────────────────────────────────────────────────

/// BUY when the short mean crosses above the long mean, SELL when it crosses
/// below.
#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    name: String,
    indicator: SmaCrossover,
}

impl MovingAverageCrossover {
    pub fn new(name: impl Into<String>, short_window: usize, long_window: usize) -> Result<Self> {
        if short_window == 0 || short_window >= long_window {
            return Err(Error::Config(format!(
                "moving average crossover needs 1 <= short_window < long_window, \
                 got short={short_window} long={long_window}"
            )));
        }
        Ok(Self {
            name: name.into(),
            indicator: SmaCrossover::new(short_window, long_window),
        })
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(
        &self,
        observation: &PriceObservation,
        history: &[PriceObservation],
    ) -> Result<Action, StrategyError> {
        let closes = closing_prices(observation, history, self.indicator.long_window + 1);
        Ok(match self.indicator.compute(&closes) {
            Some(Crossover::Bullish) => Action::Buy,
            Some(Crossover::Bearish) => Action::Sell,
            Some(Crossover::Neutral) | None => Action::Hold,
        })
    }
}

// ─── RSI oscillator ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RsiStrategy {
    name: String,
    indicator: RsiIndicator,
    oversold: f64,
    overbought: f64,
}

impl RsiStrategy {
    pub fn new(name: impl Into<String>, period: usize, oversold: f64, overbought: f64) -> Result<Self> {
        if period == 0 {
            return Err(Error::Config("RSI period must be >= 1".to_string()));
        }
        if !(0.0..=100.0).contains(&oversold)
            || !(0.0..=100.0).contains(&overbought)
            || oversold >= overbought
        {
            return Err(Error::Config(format!(
                "RSI thresholds need 0 <= oversold < overbought <= 100, \
                 got oversold={oversold} overbought={overbought}"
            )));
        }
        Ok(Self {
            name: name.into(),
            indicator: RsiIndicator::new(period),
            oversold,
            overbought,
        })
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(
        &self,
        observation: &PriceObservation,
        history: &[PriceObservation],
    ) -> Result<Action, StrategyError> {
        let closes = closing_prices(observation, history, self.indicator.period + 1);
        let Some(rsi) = self.indicator.compute(&closes) else {
            return Ok(Action::Hold);
        };

        Ok(if rsi < self.oversold {
            Action::Buy
        } else if rsi > self.overbought {
            Action::Sell
        } else {
            Action::Hold
        })
    }
}

// ─── Momentum ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MomentumStrategy {
    name: String,
    indicator: MomentumIndicator,
    threshold: f64,
}

impl MomentumStrategy {
    pub fn new(name: impl Into<String>, lookback_period: usize, threshold: f64) -> Result<Self> {
        if lookback_period == 0 {
            return Err(Error::Config("momentum lookback_period must be >= 1".to_string()));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::Config(format!(
                "momentum threshold must be a non-negative number, got {threshold}"
            )));
        }
        Ok(Self {
            name: name.into(),
            indicator: MomentumIndicator::new(lookback_period),
            threshold,
        })
    }
}

impl Strategy for MomentumStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(
        &self,
        observation: &PriceObservation,
        history: &[PriceObservation],
    ) -> Result<Action, StrategyError> {
        let closes = closing_prices(observation, history, self.indicator.lookback + 1);
        let momentum = match self.indicator.compute(&closes) {
            Ok(Some(m)) => m,
            Ok(None) => return Ok(Action::Hold),
            Err(ZeroBase) => {
                return Err(StrategyError::Data(format!(
                    "price {} observations ago is zero",
                    self.indicator.lookback
                )))
            }
        };

        Ok(if momentum > self.threshold {
            Action::Buy
        } else if momentum < -self.threshold {
            Action::Sell
        } else {
            Action::Hold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::series;

    /// Evaluate at every position the way the engine does: history ends with
    /// the current observation.
    fn run(strategy: &dyn Strategy, prices: &[f64]) -> Vec<Action> {
        let obs = series(prices);
        (0..obs.len())
            .map(|i| strategy.evaluate(&obs[i], &obs[..=i]).unwrap())
            .collect()
    }

    #[test]
    fn crossover_rejects_bad_windows() {
        assert!(matches!(MovingAverageCrossover::new("x", 0, 5), Err(Error::Config(_))));
        assert!(matches!(MovingAverageCrossover::new("x", 5, 5), Err(Error::Config(_))));
        assert!(matches!(MovingAverageCrossover::new("x", 6, 5), Err(Error::Config(_))));
        assert!(MovingAverageCrossover::new("x", 1, 2).is_ok());
    }

    #[test]
    fn crossover_buys_once_at_the_cross() {
        let s = MovingAverageCrossover::new("sma", 2, 3).unwrap();
        // short mean below long until 12 arrives, then stays above.
        let actions = run(&s, &[12.0, 11.0, 10.0, 9.0, 12.0, 13.0]);
        assert_eq!(
            actions,
            vec![
                Action::Hold,
                Action::Hold,
                Action::Hold,
                Action::Hold,
                Action::Buy,
                Action::Hold
            ]
        );
    }

    #[test]
    fn crossover_sells_on_downward_cross() {
        let s = MovingAverageCrossover::new("sma", 2, 3).unwrap();
        let actions = run(&s, &[8.0, 9.0, 10.0, 11.0, 8.0]);
        assert_eq!(actions.last(), Some(&Action::Sell));
    }

    #[test]
    fn crossover_holds_when_means_are_equal() {
        let s = MovingAverageCrossover::new("sma", 2, 3).unwrap();
        assert!(run(&s, &[10.0; 8]).iter().all(|a| *a == Action::Hold));
    }

    #[test]
    fn crossover_accepts_history_without_current() {
        let s = MovingAverageCrossover::new("sma", 2, 3).unwrap();
        let obs = series(&[12.0, 11.0, 10.0, 9.0, 12.0]);
        assert_eq!(s.evaluate(&obs[4], &obs[..4]).unwrap(), Action::Buy);
    }

    #[test]
    fn rsi_rejects_bad_thresholds() {
        assert!(RsiStrategy::new("rsi", 0, 30.0, 70.0).is_err());
        assert!(RsiStrategy::new("rsi", 14, 70.0, 30.0).is_err());
        assert!(RsiStrategy::new("rsi", 14, 50.0, 50.0).is_err());
        assert!(RsiStrategy::new("rsi", 14, -1.0, 70.0).is_err());
        assert!(RsiStrategy::new("rsi", 14, 30.0, 100.5).is_err());
        assert!(RsiStrategy::new("rsi", 14, 0.0, 100.0).is_ok());
    }

    #[test]
    fn rsi_sells_when_all_gains() {
        let s = RsiStrategy::new("rsi", 3, 30.0, 70.0).unwrap();
        let actions = run(&s, &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(actions, vec![Action::Hold, Action::Hold, Action::Hold, Action::Sell]);
    }

    #[test]
    fn rsi_buys_when_all_losses() {
        let s = RsiStrategy::new("rsi", 3, 30.0, 70.0).unwrap();
        let actions = run(&s, &[13.0, 12.0, 11.0, 10.0]);
        assert_eq!(actions.last(), Some(&Action::Buy));
    }

    #[test]
    fn rsi_holds_between_thresholds() {
        let s = RsiStrategy::new("rsi", 2, 30.0, 70.0).unwrap();
        // changes +1, -1 → RSI 50
        let actions = run(&s, &[5.0, 6.0, 5.0]);
        assert_eq!(actions.last(), Some(&Action::Hold));
    }

    #[test]
    fn rsi_at_100_does_not_sell_when_overbought_is_100() {
        let s = RsiStrategy::new("rsi", 3, 30.0, 100.0).unwrap();
        let actions = run(&s, &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(actions.last(), Some(&Action::Hold));
    }

    #[test]
    fn momentum_rejects_bad_config() {
        assert!(MomentumStrategy::new("m", 0, 0.02).is_err());
        assert!(MomentumStrategy::new("m", 3, -0.1).is_err());
        assert!(MomentumStrategy::new("m", 3, f64::NAN).is_err());
    }

    #[test]
    fn momentum_matches_reference_sequence() {
        let s = MomentumStrategy::new("m", 2, 0.02).unwrap();
        let actions = run(&s, &[100.0, 102.0, 101.0, 105.0, 99.0]);
        assert_eq!(
            actions,
            vec![Action::Hold, Action::Hold, Action::Hold, Action::Buy, Action::Hold]
        );
    }

    #[test]
    fn momentum_sells_on_drop() {
        let s = MomentumStrategy::new("m", 1, 0.05).unwrap();
        let actions = run(&s, &[100.0, 90.0]);
        assert_eq!(actions, vec![Action::Hold, Action::Sell]);
    }

    #[test]
    fn repeated_identical_tick_counts_as_a_new_price() {
        // The engine passes the last history element itself; a caller with a
        // separate copy of an identical tick gets it treated as new data.
        let s = MomentumStrategy::new("m", 1, 0.0).unwrap();
        let obs = series(&[100.0, 100.0, 101.0]);
        let repeat = obs[2].clone();
        assert_eq!(s.evaluate(&obs[2], &obs).unwrap(), Action::Buy);
        assert_eq!(s.evaluate(&repeat, &obs).unwrap(), Action::Hold);
    }

    #[test]
    fn momentum_zero_base_is_a_data_error() {
        let s = MomentumStrategy::new("m", 1, 0.02).unwrap();
        let obs = series(&[0.0, 5.0]);
        let result = s.evaluate(&obs[1], &obs);
        assert!(matches!(result, Err(StrategyError::Data(_))));
    }
}
