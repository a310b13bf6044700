use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped price sample for an instrument.
///
/// Validation (finite, positive price; symbol defaulting) happens at the data
/// source boundary in [`crate::parse_record`]. Once built, an observation is
/// never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub symbol: String,
}

impl PriceObservation {
    pub fn new(timestamp: DateTime<Utc>, price: f64, symbol: impl Into<String>) -> Self {
        Self {
            timestamp,
            price,
            symbol: symbol.into(),
        }
    }
}

impl std::fmt::Display for PriceObservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @ {}",
            self.symbol,
            self.price,
            self.timestamp.to_rfc3339()
        )
    }
}

/// What a strategy recommends for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// BUY and SELL are forwarded to the execution sink; HOLD is not.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Action::Hold)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Output of one (strategy, observation) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    /// Name of the strategy that produced this signal.
    pub strategy: String,
    pub observation: PriceObservation,
    /// Ordinal index, strictly increasing across all signals of one engine.
    pub sequence: u64,
}

impl Signal {
    pub fn symbol(&self) -> &str {
        &self.observation.symbol
    }

    pub fn price(&self) -> f64 {
        self.observation.price
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.observation.timestamp
    }
}

/// Lifecycle of the engine. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Running => write!(f, "running"),
            EngineState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Connection status of a reconnecting data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Retry budget exhausted. Terminal.
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Failed => write!(f, "failed"),
        }
    }
}
