use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use common::{Error, PriceObservation, Result};

use crate::source::{DataSource, Feed};
use crate::Shutdown;

/// Floor for generated prices; a random walk must never reach zero.
const MIN_PRICE: f64 = 0.01;

/// Random-walk price generator.
///
/// Each tick multiplies the price by `1 + u` with `u` uniform in
/// `[-max_step, max_step]`, rounds to cents, and emits it. Never ends on its
/// own.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    symbol: String,
    interval: Duration,
    base_price: f64,
    max_step: f64,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(
        symbol: impl Into<String>,
        interval: Duration,
        base_price: f64,
        max_step: f64,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::Config("synthetic interval must be > 0".to_string()));
        }
        if !base_price.is_finite() || base_price < MIN_PRICE {
            return Err(Error::Config(format!(
                "synthetic base_price must be >= {MIN_PRICE}, got {base_price}"
            )));
        }
        if !(0.0..1.0).contains(&max_step) {
            return Err(Error::Config(format!(
                "synthetic max_step must be in [0, 1), got {max_step}"
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            interval,
            base_price,
            max_step,
            seed: None,
        })
    }

    /// Fix the RNG seed for a reproducible walk.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[async_trait]
impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn run(self: Box<Self>, feed: Feed, mut shutdown: Shutdown) -> Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut price = self.base_price;
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            symbol = %self.symbol,
            base_price = self.base_price,
            interval = ?self.interval,
            "Starting synthetic price generation"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {}
            }

            let change = rng.gen_range(-self.max_step..=self.max_step);
            price = round_cents(price * (1.0 + change)).max(MIN_PRICE);

            let observation = PriceObservation::new(Utc::now(), price, self.symbol.clone());
            debug!(%observation, "Generated synthetic observation");
            if !feed.observation(observation).await {
                break;
            }
        }

        info!(symbol = %self.symbol, "Synthetic generator stopped");
        Ok(())
    }
}

fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
