use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{Action, Error, ExecutionSink, Result, Signal};

/// One simulated execution of a BUY or SELL signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub id: String,
    pub action: Action,
    pub symbol: String,
    pub strategy: String,
    /// Price of the observation that triggered the signal.
    pub signal_price: f64,
    /// Price after slippage.
    pub fill_price: f64,
    pub signal_sequence: u64,
    /// Timestamp of the triggering observation.
    pub observed_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
}

/// Execution sink for paper trading.
///
/// Fills every signal at its observation price with configurable slippage
/// and keeps an in-memory ledger. Nothing leaves the process.
#[derive(Clone)]
pub struct PaperSink {
    executions: Arc<RwLock<Vec<Execution>>>,
    /// Slippage in basis points applied to all fills.
    slippage_bps: f64,
}

impl PaperSink {
    pub fn new(slippage_bps: f64) -> Self {
        info!(slippage_bps = slippage_bps, "PaperSink initialized");
        Self {
            executions: Arc::new(RwLock::new(Vec::new())),
            slippage_bps,
        }
    }

    /// Copy of the ledger, oldest first.
    pub async fn executions(&self) -> Vec<Execution> {
        self.executions.read().await.clone()
    }
}

#[async_trait]
impl ExecutionSink for PaperSink {
    async fn execute(&self, signal: &Signal) -> Result<()> {
        // Apply slippage: buys pay more, sells receive less
        let fill_price = match signal.action {
            Action::Buy => signal.price() * (1.0 + self.slippage_bps / 10_000.0),
            Action::Sell => signal.price() * (1.0 - self.slippage_bps / 10_000.0),
            Action::Hold => {
                return Err(Error::Execution(format!(
                    "HOLD signal #{} from '{}' is not executable",
                    signal.sequence, signal.strategy
                )))
            }
        };

        let execution = Execution {
            id: uuid::Uuid::new_v4().to_string(),
            action: signal.action,
            symbol: signal.symbol().to_string(),
            strategy: signal.strategy.clone(),
            signal_price: signal.price(),
            fill_price,
            signal_sequence: signal.sequence,
            observed_at: signal.timestamp(),
            executed_at: Utc::now(),
        };

        info!(
            action = %execution.action,
            symbol = %execution.symbol,
            price = execution.fill_price,
            observed_at = %execution.observed_at.format("%Y-%m-%d %H:%M:%S"),
            strategy = %execution.strategy,
            "EXECUTE"
        );
        debug!(id = %execution.id, mid = signal.price(), "Paper fill simulated");

        self.executions.write().await.push(execution);
        Ok(())
    }
}
