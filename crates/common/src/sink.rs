use async_trait::async_trait;

use crate::{Result, Signal};

/// Destination for actionable signals.
///
/// `PaperSink` in `crates/paper` implements this for simulation. The engine
/// only ever passes BUY and SELL signals; an `Err` is logged and counted by
/// the engine but never stops it.
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    async fn execute(&self, signal: &Signal) -> Result<()>;
}
