use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::history::HistoryBuffer;
use crate::source::{DataSource, ReplaySource, StreamSource, SyntheticSource, WebSocketConnector};

/// `[engine]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Instrument assigned to records that carry no symbol.
    pub symbol: String,
    /// Capacity of the price history buffer.
    pub max_history: usize,
    /// Bound of the source → engine channel.
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".to_string(),
            max_history: HistoryBuffer::DEFAULT_CAPACITY,
            channel_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::Config("engine symbol must not be empty".to_string()));
        }
        if self.max_history == 0 {
            return Err(Error::Config("max_history must be >= 1".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::Config("channel_capacity must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// `[source]` table, selected by `kind`.
///
/// ```toml
/// [source]
/// kind = "stream"
/// url = "wss://feed.example.com/prices"
/// reconnect_interval_ms = 5000
/// max_attempts = 10
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SourceConfig {
    Synthetic {
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
        #[serde(default = "default_base_price")]
        base_price: f64,
        #[serde(default = "default_max_step")]
        max_step: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
    Replay {
        path: PathBuf,
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
    },
    Stream {
        url: String,
        #[serde(default = "default_reconnect_interval_ms")]
        reconnect_interval_ms: u64,
        /// Omit to retry forever.
        #[serde(default)]
        max_attempts: Option<u32>,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic {
            interval_ms: default_interval_ms(),
            base_price: default_base_price(),
            max_step: default_max_step(),
            seed: None,
        }
    }
}

impl SourceConfig {
    /// Construct the configured source. Invalid parameters are config errors.
    pub fn build(&self, symbol: &str) -> Result<Box<dyn DataSource>> {
        match self {
            SourceConfig::Synthetic {
                interval_ms,
                base_price,
                max_step,
                seed,
            } => {
                let mut source = SyntheticSource::new(
                    symbol,
                    Duration::from_millis(*interval_ms),
                    *base_price,
                    *max_step,
                )?;
                if let Some(seed) = seed {
                    source = source.with_seed(*seed);
                }
                Ok(Box::new(source))
            }
            SourceConfig::Replay { path, interval_ms } => Ok(Box::new(ReplaySource::from_file(
                path.clone(),
                symbol,
                Duration::from_millis(*interval_ms),
            ))),
            SourceConfig::Stream {
                url,
                reconnect_interval_ms,
                max_attempts,
            } => Ok(Box::new(StreamSource::new(
                WebSocketConnector::new(url)?,
                symbol,
                Duration::from_millis(*reconnect_interval_ms),
                *max_attempts,
            )?)),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_base_price() -> f64 {
    50_000.0
}

fn default_max_step() -> f64 {
    0.02
}

fn default_reconnect_interval_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct File {
        #[serde(default)]
        engine: EngineConfig,
        source: SourceConfig,
    }

    #[test]
    fn parses_stream_source() {
        let file: File = toml::from_str(
            r#"
            [engine]
            symbol = "ETH-USD"
            max_history = 50

            [source]
            kind = "stream"
            url = "wss://feed.example.com/prices"
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(file.engine.symbol, "ETH-USD");
        assert_eq!(file.engine.max_history, 50);
        assert_eq!(file.engine.channel_capacity, 256);
        assert_eq!(
            file.source,
            SourceConfig::Stream {
                url: "wss://feed.example.com/prices".into(),
                reconnect_interval_ms: 5000,
                max_attempts: Some(3),
            }
        );
        let source = file.source.build(&file.engine.symbol).unwrap();
        assert_eq!(source.name(), "stream");
    }

    #[test]
    fn synthetic_defaults_follow_reference_values() {
        let file: File = toml::from_str("[source]\nkind = \"synthetic\"\n").unwrap();
        assert_eq!(file.source, SourceConfig::default());
        assert_eq!(file.engine, EngineConfig::default());
    }

    #[test]
    fn replay_requires_path() {
        let result: std::result::Result<File, _> = toml::from_str("[source]\nkind = \"replay\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_values_fail_at_build() {
        let bad_interval = SourceConfig::Synthetic {
            interval_ms: 0,
            base_price: 10.0,
            max_step: 0.01,
            seed: None,
        };
        assert!(matches!(bad_interval.build("X"), Err(Error::Config(_))));

        let bad_url = SourceConfig::Stream {
            url: "http://nope".into(),
            reconnect_interval_ms: 10,
            max_attempts: None,
        };
        assert!(matches!(bad_url.build("X"), Err(Error::Config(_))));
    }

    #[test]
    fn engine_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        let zero = EngineConfig {
            max_history: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(Error::Config(_))));
        let blank = EngineConfig {
            symbol: " ".into(),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }
}
