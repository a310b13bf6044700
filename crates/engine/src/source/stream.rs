use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::RwLock;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

use common::{parse_record, ConnectionState, Error, Result};

use crate::source::{DataSource, Feed};
use crate::Shutdown;

/// Text messages of one live connection. Ends when the connection closes.
pub type MessageStream = BoxStream<'static, Result<String>>;

/// Transport used by [`StreamSource`] to (re)establish a connection.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Where this connector points, for logs.
    fn endpoint(&self) -> &str;

    async fn connect(&self) -> Result<MessageStream>;
}

/// WebSocket transport: every text frame is one JSON record.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: Url,
}

impl WebSocketConnector {
    pub fn new(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid stream url '{endpoint}': {e}")))?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self { url }),
            other => Err(Error::Config(format!(
                "stream url must use ws:// or wss://, got '{other}://'"
            ))),
        }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    fn endpoint(&self) -> &str {
        self.url.as_str()
    }

    async fn connect(&self) -> Result<MessageStream> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let (_, read) = ws_stream.split();

        Ok(read
            .filter_map(|msg| async move {
                match msg {
                    Ok(frame) => frame_text(frame).map(Ok),
                    Err(e) => Some(Err(Error::Connection(e.to_string()))),
                }
            })
            .boxed())
    }
}

/// Record text carried by a frame. Binary frames are decoded lossily so a bad
/// payload surfaces as a malformed record; control frames carry none.
fn frame_text(frame: Message) -> Option<String> {
    match frame {
        Message::Text(text) => Some(text),
        Message::Binary(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        other => {
            debug!(frame = ?other, "Control frame skipped");
            None
        }
    }
}

/// Network stream that reconnects after a fixed backoff.
///
/// Delivery is at-most-once: messages sent while disconnected are lost and
/// never replayed. Every refused connect and every dropped connection is
/// reported as a retry. `max_attempts` bounds consecutive failures (`None`
/// retries forever); the count resets once a connection delivers a message.
/// Exhausting the budget moves the source to [`ConnectionState::Failed`] and
/// returns [`Error::FatalSource`].
pub struct StreamSource {
    connector: Box<dyn Connector>,
    symbol: String,
    reconnect_interval: Duration,
    max_attempts: Option<u32>,
    state: Arc<RwLock<ConnectionState>>,
}

impl StreamSource {
    pub fn new(
        connector: impl Connector + 'static,
        symbol: impl Into<String>,
        reconnect_interval: Duration,
        max_attempts: Option<u32>,
    ) -> Result<Self> {
        if max_attempts == Some(0) {
            return Err(Error::Config(
                "max_attempts must be >= 1, omit it to retry forever".to_string(),
            ));
        }
        Ok(Self {
            connector: Box::new(connector),
            symbol: symbol.into(),
            reconnect_interval,
            max_attempts,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        })
    }

    /// Shared view of the connection state, readable while the source runs.
    pub fn state_handle(&self) -> Arc<RwLock<ConnectionState>> {
        self.state.clone()
    }

    async fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write().await;
        if *state != next {
            debug!(from = %*state, to = %next, "Connection state change");
            *state = next;
        }
    }

    /// Pump one live connection into the feed until it ends.
    ///
    /// The first message received resets `failures`: a connection only counts
    /// as healthy once it has carried data.
    async fn pump(
        &self,
        mut messages: MessageStream,
        feed: &Feed,
        shutdown: &mut Shutdown,
        failures: &mut u32,
    ) -> Pump {
        loop {
            let msg = tokio::select! {
                biased;
                _ = shutdown.wait() => return Pump::Stop,
                msg = messages.next() => msg,
            };

            let text = match msg {
                Some(Ok(text)) => text,
                Some(Err(e)) => return Pump::Lost(e.to_string()),
                None => return Pump::Lost("stream closed by remote".to_string()),
            };

            if *failures > 0 {
                debug!(previous_failures = *failures, "Connection healthy, failure count reset");
                *failures = 0;
            }

            let delivered = match parse_record(&text, &self.symbol) {
                Ok(observation) => feed.observation(observation).await,
                Err(e) => {
                    warn!(error = %e, "Failed to parse stream message");
                    feed.malformed(e.to_string()).await
                }
            };
            if !delivered {
                return Pump::Stop;
            }
        }
    }
}

/// How one live connection ended.
enum Pump {
    /// Shutdown, or the engine went away.
    Stop,
    /// The connection dropped; reconnect.
    Lost(String),
}

#[async_trait]
impl DataSource for StreamSource {
    fn name(&self) -> &str {
        "stream"
    }

    async fn run(self: Box<Self>, feed: Feed, mut shutdown: Shutdown) -> Result<()> {
        let mut failures: u32 = 0;

        loop {
            self.set_state(ConnectionState::Connecting).await;
            info!(endpoint = %self.connector.endpoint(), "Connecting to stream");

            let connected = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    self.set_state(ConnectionState::Disconnected).await;
                    return Ok(());
                }
                connected = self.connector.connect() => connected,
            };

            let reason = match connected {
                Ok(messages) => {
                    self.set_state(ConnectionState::Connected).await;
                    info!(endpoint = %self.connector.endpoint(), "Stream connected");

                    match self.pump(messages, &feed, &mut shutdown, &mut failures).await {
                        Pump::Stop => {
                            self.set_state(ConnectionState::Disconnected).await;
                            return Ok(());
                        }
                        Pump::Lost(reason) => reason,
                    }
                }
                Err(e) => e.to_string(),
            };

            // Refused connects and dropped connections both count against the budget.
            failures += 1;
            self.set_state(ConnectionState::Disconnected).await;
            warn!(
                endpoint = %self.connector.endpoint(),
                attempt = failures,
                error = %reason,
                backoff = ?self.reconnect_interval,
                "Connection lost"
            );
            if !feed.connection_lost(failures, reason.as_str()).await {
                return Ok(());
            }

            if let Some(max) = self.max_attempts {
                if failures >= max {
                    self.set_state(ConnectionState::Failed).await;
                    error!(
                        endpoint = %self.connector.endpoint(),
                        attempts = failures,
                        "Retry budget exhausted"
                    );
                    return Err(Error::FatalSource(format!(
                        "{} unreachable after {failures} consecutive attempts: {reason}",
                        self.connector.endpoint()
                    )));
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.wait() => return Ok(()),
                _ = tokio::time::sleep(self.reconnect_interval) => {}
            }
        }
    }
}
