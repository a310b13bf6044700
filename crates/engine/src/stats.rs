use chrono::{DateTime, Utc};
use serde::Serialize;

use common::Action;

/// Signal counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalCounts {
    pub buy: u64,
    pub sell: u64,
    pub hold: u64,
}

impl SignalCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Buy => self.buy += 1,
            Action::Sell => self.sell += 1,
            Action::Hold => self.hold += 1,
        }
    }

    pub fn get(&self, action: Action) -> u64 {
        match action {
            Action::Buy => self.buy,
            Action::Sell => self.sell,
            Action::Hold => self.hold,
        }
    }

    pub fn total(&self) -> u64 {
        self.buy + self.sell + self.hold
    }

    /// BUY + SELL, the signals forwarded for execution.
    pub fn actionable(&self) -> u64 {
        self.buy + self.sell
    }

    fn add(&mut self, other: &SignalCounts) {
        self.buy += other.buy;
        self.sell += other.sell;
        self.hold += other.hold;
    }
}

/// Engine activity counters. Cloned out of the engine's lock as a consistent
/// snapshot; never observed half-updated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_processed: u64,
    pub signals: SignalCounts,
    /// Most recent BUY or SELL.
    pub last_signal: Option<Action>,
    pub last_price: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    /// Active strategies in registration order.
    pub strategies: Vec<String>,
    pub history_len: usize,
    pub parse_errors: u64,
    pub data_errors: u64,
    pub strategy_errors: u64,
    pub execution_errors: u64,
    pub connection_retries: u64,
}

impl Statistics {
    pub fn new(strategies: Vec<String>) -> Self {
        Self {
            strategies,
            ..Default::default()
        }
    }

    /// Time since start, frozen once stopped. `None` before start.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        let started = self.started_at?;
        Some(self.stopped_at.unwrap_or_else(Utc::now) - started)
    }

    pub(crate) fn apply(&mut self, tally: &Tally) {
        self.total_processed += 1;
        self.signals.add(&tally.signals);
        if tally.last_actionable.is_some() {
            self.last_signal = tally.last_actionable;
        }
        self.last_price = Some(tally.price);
        self.history_len = tally.history_len;
        self.data_errors += tally.data_errors;
        self.strategy_errors += tally.strategy_errors;
        self.execution_errors += tally.execution_errors;
    }
}

/// Everything one observation changes, applied to [`Statistics`] in a single
/// write.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub signals: SignalCounts,
    pub last_actionable: Option<Action>,
    pub price: f64,
    pub history_len: usize,
    pub data_errors: u64,
    pub strategy_errors: u64,
    pub execution_errors: u64,
}

impl Tally {
    pub fn new(price: f64, history_len: usize) -> Self {
        Self {
            price,
            history_len,
            ..Default::default()
        }
    }

    pub fn record(&mut self, action: Action) {
        self.signals.record(action);
        if action.is_actionable() {
            self.last_actionable = Some(action);
        }
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elapsed() {
            Some(d) => writeln!(f, "Running time: {}s", d.num_seconds())?,
            None => writeln!(f, "Running time: not started")?,
        }
        writeln!(f, "Price history: {} data points", self.history_len)?;
        match self.last_price {
            Some(p) => writeln!(f, "Last price: {p}")?,
            None => writeln!(f, "Last price: -")?,
        }
        writeln!(f, "Observations processed: {}", self.total_processed)?;
        writeln!(
            f,
            "Signals: {} ({} actionable)",
            self.signals.total(),
            self.signals.actionable()
        )?;
        for action in [Action::Buy, Action::Sell, Action::Hold] {
            writeln!(f, "  {action}: {}", self.signals.get(action))?;
        }
        match self.last_signal {
            Some(s) => writeln!(f, "Last signal: {s}")?,
            None => writeln!(f, "Last signal: -")?,
        }
        writeln!(
            f,
            "Errors: parse={} data={} strategy={} execution={} retries={}",
            self.parse_errors,
            self.data_errors,
            self.strategy_errors,
            self.execution_errors,
            self.connection_retries
        )?;
        write!(f, "Active strategies: {}", self.strategies.len())?;
        for (i, name) in self.strategies.iter().enumerate() {
            write!(f, "\n  {}. {name}", i + 1)?;
        }
        Ok(())
    }
}
