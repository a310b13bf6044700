use serde::{Deserialize, Serialize};

/// One `[[strategy]]` entry of the config file.
///
/// Example:
/// ```toml
/// [[strategy]]
/// type = "rsi"
/// name = "RSI 14"
/// period = 14
/// oversold = 30.0
/// overbought = 70.0
///
/// [[strategy]]
/// type = "momentum"
/// lookback_period = 10
/// threshold = 0.015
/// ```
///
/// Omitted parameters take their defaults. Ranges are checked when the
/// strategy is built, not when the file is parsed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum StrategyConfig {
    MovingAverageCrossover {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_short_window")]
        short_window: usize,
        #[serde(default = "default_long_window")]
        long_window: usize,
    },
    Rsi {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    Momentum {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_lookback")]
        lookback_period: usize,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

impl StrategyConfig {
    /// Configured name, or one derived from the parameters.
    pub fn display_name(&self) -> String {
        match self {
            StrategyConfig::MovingAverageCrossover {
                name,
                short_window,
                long_window,
            } => name
                .clone()
                .unwrap_or_else(|| format!("sma_crossover({short_window},{long_window})")),
            StrategyConfig::Rsi {
                name,
                period,
                oversold,
                overbought,
            } => name
                .clone()
                .unwrap_or_else(|| format!("rsi({period},{oversold},{overbought})")),
            StrategyConfig::Momentum {
                name,
                lookback_period,
                threshold,
            } => name
                .clone()
                .unwrap_or_else(|| format!("momentum({lookback_period},{threshold})")),
        }
    }
}

fn default_short_window() -> usize {
    5
}

fn default_long_window() -> usize {
    20
}

fn default_rsi_period() -> usize {
    14
}

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

fn default_lookback() -> usize {
    10
}

fn default_threshold() -> f64 {
    0.02
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct File {
        strategy: Vec<StrategyConfig>,
    }

    #[test]
    fn parses_tagged_tables_with_defaults() {
        let file: File = toml::from_str(
            r#"
            [[strategy]]
            type = "moving_average_crossover"

            [[strategy]]
            type = "rsi"
            name = "fast rsi"
            period = 12
            oversold = 35.0
            overbought = 65.0

            [[strategy]]
            type = "momentum"
            threshold = 0.015
            "#,
        )
        .unwrap();

        assert_eq!(
            file.strategy[0],
            StrategyConfig::MovingAverageCrossover {
                name: None,
                short_window: 5,
                long_window: 20
            }
        );
        assert_eq!(file.strategy[1].display_name(), "fast rsi");
        assert_eq!(
            file.strategy[2],
            StrategyConfig::Momentum {
                name: None,
                lookback_period: 10,
                threshold: 0.015
            }
        );
        assert_eq!(file.strategy[0].display_name(), "sma_crossover(5,20)");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<File, _> = toml::from_str(
            r#"
            [[strategy]]
            type = "macd"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let result: Result<File, _> = toml::from_str(
            r#"
            [[strategy]]
            type = "momentum"
            lookback = 3
            "#,
        );
        assert!(result.is_err());
    }
}
