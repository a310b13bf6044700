//! Pure indicator math over close prices (oldest first).

pub mod momentum;
pub mod rsi;
pub mod sma;

pub use momentum::MomentumIndicator;
pub use rsi::RsiIndicator;
pub use sma::{Crossover, SmaCrossover};
