/// RSI (Relative Strength Index) oscillator.
///
/// Uses simple averages of gains and loss magnitudes over the trailing
/// `period` price changes (no Wilder smoothing), so each value depends only on
/// the last `period + 1` prices.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    /// Caller guarantees `period >= 1`.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    /// Returns `None` if there are fewer than `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period + 1 {
            return None;
        }

        let window = &closes[closes.len() - self.period - 1..];
        let changes: Vec<f64> = window.windows(2).map(|w| w[1] - w[0]).collect();

        let avg_gain = changes.iter().filter(|&&c| c > 0.0).sum::<f64>() / self.period as f64;
        let avg_loss = changes.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>()
            / self.period as f64;

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}
