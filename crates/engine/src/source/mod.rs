//! Producers of [`PriceObservation`]s.
//!
//! A source runs on its own task and talks to the engine through a [`Feed`],
//! a bounded ordered channel: when the engine falls behind, `send` waits.
//! Recoverable problems (bad records, dropped connections) travel down the
//! same channel so the engine sees them in order with the observations. The
//! value returned from [`DataSource::run`] is the terminal outcome.

pub mod replay;
pub mod stream;
pub mod synthetic;

pub use replay::ReplaySource;
pub use stream::{Connector, MessageStream, StreamSource, WebSocketConnector};
pub use synthetic::SyntheticSource;

use async_trait::async_trait;
use tokio::sync::mpsc;

use common::{PriceObservation, Result};

use crate::Shutdown;

/// Everything a source can report to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Observation(PriceObservation),
    /// A record was rejected and skipped.
    Malformed { reason: String },
    /// A connection attempt failed; a retry follows unless the budget is spent.
    ConnectionLost { attempt: u32, reason: String },
}

/// Sending half handed to a running source.
#[derive(Debug, Clone)]
pub struct Feed {
    tx: mpsc::Sender<SourceEvent>,
}

impl Feed {
    /// Bounded channel pair. `capacity` must be non-zero.
    pub fn channel(capacity: usize) -> (Feed, mpsc::Receiver<SourceEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Feed { tx }, rx)
    }

    /// Returns `false` once the engine has gone away; the source should stop.
    pub async fn observation(&self, observation: PriceObservation) -> bool {
        self.send(SourceEvent::Observation(observation)).await
    }

    pub async fn malformed(&self, reason: impl Into<String>) -> bool {
        self.send(SourceEvent::Malformed {
            reason: reason.into(),
        })
        .await
    }

    pub async fn connection_lost(&self, attempt: u32, reason: impl Into<String>) -> bool {
        self.send(SourceEvent::ConnectionLost {
            attempt,
            reason: reason.into(),
        })
        .await
    }

    async fn send(&self, event: SourceEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}

/// A stream of price observations.
///
/// `run` is spawned by the engine. It returns `Ok(())` when the source is
/// exhausted or `shutdown` fires, and `Err` (normally
/// [`common::Error::FatalSource`]) when it cannot continue.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn run(self: Box<Self>, feed: Feed, shutdown: Shutdown) -> Result<()>;
}
