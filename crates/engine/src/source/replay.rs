use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use common::{parse_record, Error, Result};

use crate::source::{DataSource, Feed};
use crate::Shutdown;

#[derive(Debug, Clone)]
enum ReplayInput {
    File(PathBuf),
    Text(String),
}

/// Replays newline-delimited JSON records at a fixed pace.
///
/// Blank lines are ignored. Malformed records, including lines that are not
/// valid UTF-8, are reported and skipped. The sequence ends cleanly at end of
/// input. A file that cannot be opened or read is fatal.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    input: ReplayInput,
    symbol: String,
    /// Pause after each delivered observation. Zero replays as fast as the
    /// engine consumes.
    interval: Duration,
}

impl ReplaySource {
    pub fn from_file(path: impl Into<PathBuf>, symbol: impl Into<String>, interval: Duration) -> Self {
        Self {
            input: ReplayInput::File(path.into()),
            symbol: symbol.into(),
            interval,
        }
    }

    /// Replay records held in memory, one per line.
    pub fn from_text(text: impl Into<String>, symbol: impl Into<String>, interval: Duration) -> Self {
        Self {
            input: ReplayInput::Text(text.into()),
            symbol: symbol.into(),
            interval,
        }
    }

    async fn open(&self) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        match &self.input {
            ReplayInput::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    Error::FatalSource(format!("cannot open replay file '{}': {e}", path.display()))
                })?;
                info!(path = %path.display(), "Reading data from file");
                Ok(Box::new(BufReader::new(file)))
            }
            ReplayInput::Text(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
        }
    }
}

#[async_trait]
impl DataSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    async fn run(self: Box<Self>, feed: Feed, mut shutdown: Shutdown) -> Result<()> {
        let mut lines = self.open().await?.split(b'\n');
        let mut line_no = 0usize;
        let mut delivered = 0usize;

        loop {
            let raw = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!(delivered, "Replay stopped before end of input");
                    return Ok(());
                }
                raw = lines.next_segment() => raw,
            };

            let raw = match raw {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(e) => {
                    return Err(Error::FatalSource(format!(
                        "replay read failed after line {line_no}: {e}"
                    )))
                }
            };
            line_no += 1;

            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_no, error = %e, "Skipping record that is not UTF-8");
                    if !feed.malformed(format!("line {line_no}: {e}")).await {
                        return Ok(());
                    }
                    continue;
                }
            };

            let record = line.trim();
            if record.is_empty() {
                continue;
            }

            match parse_record(record, &self.symbol) {
                Ok(observation) => {
                    debug!(line = line_no, %observation, "Replayed observation");
                    if !feed.observation(observation).await {
                        return Ok(());
                    }
                    delivered += 1;
                }
                Err(e) => {
                    warn!(line = line_no, error = %e, "Skipping malformed record");
                    if !feed.malformed(format!("line {line_no}: {e}")).await {
                        return Ok(());
                    }
                    continue;
                }
            }

            if !self.interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = shutdown.wait() => {
                        info!(delivered, "Replay stopped before end of input");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        }

        info!(delivered, lines = line_no, "Replay exhausted");
        Ok(())
    }
}
