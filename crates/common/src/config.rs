use std::path::PathBuf;

use crate::{Error, Result};

/// Output format for the log subscriber installed by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process-level settings read from environment variables at startup.
///
/// Engine, source and strategy parameters live in the TOML file named by
/// `config_path`; this only covers what differs between deployments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the TOML file with `[engine]`, `[source]` and `[[strategy]]`.
    pub config_path: PathBuf,
    pub log_format: LogFormat,
    /// Slippage applied by the paper sink, in basis points.
    pub paper_slippage_bps: f64,
    /// Seconds between statistics reports. Zero disables the periodic report.
    pub stats_interval_secs: u64,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults;
    /// set but malformed keys are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT").map(|v| v.trim().to_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" || v.is_empty() => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "LOG_FORMAT must be 'pretty' or 'json', got: '{other}'"
                )))
            }
        };

        let paper_slippage_bps: f64 = parse_optional(&lookup, "PAPER_SLIPPAGE_BPS")?.unwrap_or(0.0);
        if !paper_slippage_bps.is_finite() || paper_slippage_bps < 0.0 {
            return Err(Error::Config(format!(
                "PAPER_SLIPPAGE_BPS must be a non-negative number, got {paper_slippage_bps}"
            )));
        }

        Ok(Config {
            config_path: lookup("VIBETRADER_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config/vibetrader.toml")),
            log_format,
            paper_slippage_bps,
            stats_interval_secs: parse_optional(&lookup, "STATS_INTERVAL_SECS")?.unwrap_or(30),
        })
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}='{raw}' is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.config_path, PathBuf::from("config/vibetrader.toml"));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.paper_slippage_bps, 0.0);
        assert_eq!(cfg.stats_interval_secs, 30);
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("VIBETRADER_CONFIG", "/etc/vt.toml"),
            ("LOG_FORMAT", "JSON"),
            ("PAPER_SLIPPAGE_BPS", "12.5"),
            ("STATS_INTERVAL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.config_path, PathBuf::from("/etc/vt.toml"));
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.paper_slippage_bps, 12.5);
        assert_eq!(cfg.stats_interval_secs, 0);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("STATS_INTERVAL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(err.to_string().contains("LOG_FORMAT"));

        let err = Config::from_lookup(lookup(&[("PAPER_SLIPPAGE_BPS", "-1")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
