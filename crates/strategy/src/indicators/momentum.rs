/// Rate of change between the newest price and the price `lookback` bars
/// earlier: `(current - past) / past`.
#[derive(Debug, Clone)]
pub struct MomentumIndicator {
    pub lookback: usize,
}

/// The base price was zero, so the ratio is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroBase;

impl MomentumIndicator {
    /// Caller guarantees `lookback >= 1`.
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    /// Returns `Ok(None)` with fewer than `lookback + 1` prices.
    pub fn compute(&self, closes: &[f64]) -> Result<Option<f64>, ZeroBase> {
        if closes.len() < self.lookback + 1 {
            return Ok(None);
        }

        let current = closes[closes.len() - 1];
        let past = closes[closes.len() - 1 - self.lookback];
        if past == 0.0 {
            return Err(ZeroBase);
        }

        Ok(Some((current - past) / past))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_needs_lookback_plus_one() {
        let m = MomentumIndicator::new(2);
        assert_eq!(m.compute(&[100.0, 102.0]), Ok(None));
        assert!(m.compute(&[100.0, 102.0, 101.0]).unwrap().is_some());
    }

    #[test]
    fn momentum_compares_against_lookback_bars_ago() {
        let m = MomentumIndicator::new(2);
        let value = m.compute(&[100.0, 102.0, 101.0, 105.0]).unwrap().unwrap();
        assert!((value - 3.0 / 102.0).abs() < 1e-12);
    }

    #[test]
    fn momentum_zero_base_is_an_error() {
        let m = MomentumIndicator::new(1);
        assert_eq!(m.compute(&[0.0, 5.0]), Err(ZeroBase));
    }
}
