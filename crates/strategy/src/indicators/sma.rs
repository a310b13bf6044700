/// Simple moving average crossover.
///
/// Compares the short and long means of the newest window with the same means
/// one bar earlier. Everything is recomputed from the supplied prices, so the
/// result is a pure function of its input.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

/// Direction of the latest crossover, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Bullish, // short mean crossed above long mean
    Bearish, // short mean crossed below long mean
    Neutral, // no crossover on the latest bar
}

impl SmaCrossover {
    /// Caller guarantees `1 <= short_window < long_window`.
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }

    /// Detect a crossover on the newest price.
    /// Returns `None` with fewer than `long_window + 1` prices.
    pub fn compute(&self, closes: &[f64]) -> Option<Crossover> {
        if closes.len() < self.long_window + 1 {
            return None;
        }

        let n = closes.len();
        let curr = &closes[n - self.long_window..];
        let prev = &closes[n - self.long_window - 1..n - 1];

        let curr_short = mean(&curr[curr.len() - self.short_window..]);
        let curr_long = mean(curr);
        let prev_short = mean(&prev[prev.len() - self.short_window..]);
        let prev_long = mean(prev);

        if prev_short <= prev_long && curr_short > curr_long {
            Some(Crossover::Bullish)
        } else if prev_short >= prev_long && curr_short < curr_long {
            Some(Crossover::Bearish)
        } else {
            Some(Crossover::Neutral)
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_one_more_than_long_window() {
        let sma = SmaCrossover::new(2, 3);
        assert!(sma.compute(&[1.0, 2.0, 3.0]).is_none());
        assert!(sma.compute(&[1.0, 2.0, 3.0, 4.0]).is_some());
    }

    #[test]
    fn detects_bullish_cross() {
        let sma = SmaCrossover::new(2, 3);
        // prev window [11, 10, 9]: short 9.5 < long 10
        // curr window [10, 9, 12]: short 10.5 > long 10.33
        assert_eq!(
            sma.compute(&[12.0, 11.0, 10.0, 9.0, 12.0]),
            Some(Crossover::Bullish)
        );
    }

    #[test]
    fn detects_bearish_cross() {
        let sma = SmaCrossover::new(2, 3);
        assert_eq!(
            sma.compute(&[8.0, 9.0, 10.0, 11.0, 8.0]),
            Some(Crossover::Bearish)
        );
    }

    #[test]
    fn equal_means_are_neutral() {
        let sma = SmaCrossover::new(2, 4);
        assert_eq!(sma.compute(&[5.0; 6]), Some(Crossover::Neutral));
    }

    #[test]
    fn steady_trend_is_neutral() {
        let sma = SmaCrossover::new(3, 6);
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.5).collect();
        assert_eq!(sma.compute(&prices), Some(Crossover::Neutral));
    }
}
