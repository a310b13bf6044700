use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use common::{Action, EngineState, Error, ExecutionSink, PriceObservation, Result, Signal};
use strategy::{Strategy, StrategyError};

use crate::config::EngineConfig;
use crate::history::{HistoryBuffer, Snapshot};
use crate::source::{DataSource, Feed, SourceEvent};
use crate::stats::{Statistics, Tally};
use crate::Shutdown;

/// Cloneable handle for controlling and observing a running [`Engine`].
#[derive(Clone)]
pub struct EngineHandle {
    state: Arc<RwLock<EngineState>>,
    stats: Arc<RwLock<Statistics>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl EngineHandle {
    /// Request a stop. Idempotent; an idle engine goes straight to Stopped.
    ///
    /// The observation being evaluated, if any, completes; nothing after it
    /// is processed.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if *state != EngineState::Stopped {
                info!(from = %*state, "Engine stop requested");
                *state = EngineState::Stopped;
            }
        }
        self.shutdown_tx.send_replace(true);
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    /// Consistent copy of the current statistics.
    pub async fn stats(&self) -> Statistics {
        self.stats.read().await.clone()
    }
}

/// The streaming evaluation engine.
///
/// One ingest loop: observations are handled strictly one at a time in
/// arrival order, and strategies run sequentially in registration order.
pub struct Engine {
    history: HistoryBuffer,
    strategies: Vec<Box<dyn Strategy>>,
    source: Option<Box<dyn DataSource>>,
    sink: Arc<dyn ExecutionSink>,
    channel_capacity: usize,
    sequence: u64,
    state: Arc<RwLock<EngineState>>,
    stats: Arc<RwLock<Statistics>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl Engine {
    pub fn new(
        config: &EngineConfig,
        source: Box<dyn DataSource>,
        strategies: Vec<Box<dyn Strategy>>,
        sink: Arc<dyn ExecutionSink>,
    ) -> Result<(Self, EngineHandle)> {
        config.validate()?;

        let names = strategies.iter().map(|s| s.name().to_string()).collect();
        let state = Arc::new(RwLock::new(EngineState::Idle));
        let stats = Arc::new(RwLock::new(Statistics::new(names)));
        let (shutdown_tx, _) = watch::channel(false);
        let shutdown_tx = Arc::new(shutdown_tx);

        let handle = EngineHandle {
            state: state.clone(),
            stats: stats.clone(),
            shutdown_tx: shutdown_tx.clone(),
        };

        let engine = Engine {
            history: HistoryBuffer::new(config.max_history)?,
            strategies,
            source: Some(source),
            sink,
            channel_capacity: config.channel_capacity,
            sequence: 0,
            state,
            stats,
            shutdown_tx,
        };

        Ok((engine, handle))
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            state: self.state.clone(),
            stats: self.stats.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// Frozen copy of the observations currently held in history.
    pub fn history(&self) -> Snapshot {
        self.history.snapshot()
    }

    /// Idle → Running; spawn the source and drive the ingest loop.
    ///
    /// Returns `Ok(())` when stopped through a handle or when the source is
    /// exhausted, and the source's error when it fails terminally. The engine
    /// is Stopped afterwards either way. Fails with [`Error::InvalidState`]
    /// unless the engine is Idle.
    pub async fn start(&mut self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != EngineState::Idle {
                return Err(Error::InvalidState {
                    expected: EngineState::Idle,
                    actual: *state,
                });
            }
            *state = EngineState::Running;
        }

        let source = self.source.take().ok_or(Error::InvalidState {
            expected: EngineState::Idle,
            actual: EngineState::Stopped,
        })?;
        let source_name = source.name().to_string();

        self.stats.write().await.started_at = Some(Utc::now());
        info!(
            source = %source_name,
            strategies = self.strategies.len(),
            max_history = self.history.capacity(),
            "Engine running"
        );

        let (feed, mut events) = Feed::channel(self.channel_capacity);
        let mut shutdown = Shutdown::from_receiver(self.shutdown_tx.subscribe());
        let source_task = tokio::spawn(source.run(feed, shutdown.clone()));

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Engine loop cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        // Closing the receiver unblocks a source waiting on a full channel.
        drop(events);
        self.shutdown_tx.send_replace(true);

        let outcome = match source_task.await {
            Ok(result) => result,
            Err(e) => Err(Error::FatalSource(format!("{source_name} task aborted: {e}"))),
        };

        *self.state.write().await = EngineState::Stopped;
        self.stats.write().await.stopped_at = Some(Utc::now());

        match outcome {
            Ok(()) => {
                info!(source = %source_name, "Engine stopped");
                Ok(())
            }
            Err(e) => {
                error!(source = %source_name, error = %e, "Engine stopped by fatal source error");
                Err(e)
            }
        }
    }

    async fn handle_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Observation(observation) => {
                self.ingest(observation).await;
            }
            SourceEvent::Malformed { reason } => {
                debug!(%reason, "Malformed record skipped");
                self.stats.write().await.parse_errors += 1;
            }
            SourceEvent::ConnectionLost { attempt, reason } => {
                debug!(attempt, %reason, "Source retrying connection");
                self.stats.write().await.connection_retries += 1;
            }
        }
    }

    /// Process one observation: append to history, evaluate every strategy
    /// against the history window, forward BUY/SELL to the sink and update
    /// statistics.
    ///
    /// Returns one signal per strategy that evaluated without a hard failure,
    /// in registration order (data errors count as HOLD).
    pub async fn ingest(&mut self, observation: PriceObservation) -> Vec<Signal> {
        self.history.append(observation);
        let window = self.history.window();
        let Some(current) = window.last() else {
            return Vec::new();
        };

        let mut tally = Tally::new(current.price, window.len());
        let mut signals = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                strategy.evaluate(current, window)
            }));

            let action = match outcome {
                Ok(Ok(action)) => action,
                Ok(Err(StrategyError::Data(reason))) => {
                    warn!(strategy = %strategy.name(), %reason, "Data error, holding");
                    tally.data_errors += 1;
                    Action::Hold
                }
                Ok(Err(e)) => {
                    error!(strategy = %strategy.name(), error = %e, "Strategy evaluation failed");
                    tally.strategy_errors += 1;
                    continue;
                }
                Err(_) => {
                    error!(strategy = %strategy.name(), "Strategy panicked during evaluation");
                    tally.strategy_errors += 1;
                    continue;
                }
            };

            self.sequence += 1;
            let signal = Signal {
                action,
                strategy: strategy.name().to_string(),
                observation: current.clone(),
                sequence: self.sequence,
            };

            if action.is_actionable() {
                info!(
                    strategy = %signal.strategy,
                    action = %action,
                    symbol = %signal.symbol(),
                    price = signal.price(),
                    "Signal"
                );
                if let Err(e) = self.sink.execute(&signal).await {
                    warn!(strategy = %signal.strategy, error = %e, "Execution sink rejected signal");
                    tally.execution_errors += 1;
                }
            }

            tally.record(action);
            signals.push(signal);
        }

        debug!(observation = %current, "Observation processed");
        self.stats.write().await.apply(&tally);
        signals
    }
}
