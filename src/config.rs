use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    DEFAULT_MACD_LONG, DEFAULT_MACD_SHORT, DEFAULT_MACD_SIGNAL, DEFAULT_RSI_PERIOD, Error,
    IndicatorConfig, IndicatorConfigBuilder, MacdConfig, Result, RsiConfig,
};

/// Parameters for a full [`analyze`](crate::analyze) run.
///
/// Deserializable with every field optional, so a partial JSON or TOML
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// RSI look-back period (default: 14).
    pub rsi_period: usize,
    /// MACD short EMA span (default: 12).
    pub macd_short: usize,
    /// MACD long EMA span (default: 26).
    pub macd_long: usize,
    /// MACD signal EMA span (default: 9).
    pub macd_signal: usize,
    /// One simple moving average is computed per window (default: 20, 50).
    pub moving_average_windows: Vec<usize>,
    /// Window of the rolling return volatility (default: 20).
    pub volatility_window: usize,
    /// Fail with `InsufficientData` instead of returning undefined output
    /// when the series cannot fill the longest window.
    pub require_full_history: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            macd_short: DEFAULT_MACD_SHORT,
            macd_long: DEFAULT_MACD_LONG,
            macd_signal: DEFAULT_MACD_SIGNAL,
            moving_average_windows: vec![20, 50],
            volatility_window: 20,
            require_full_history: false,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from `CHARTDECK_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `CHARTDECK_RSI_PERIOD` | `rsi_period` |
    /// | `CHARTDECK_MACD_SHORT` | `macd_short` |
    /// | `CHARTDECK_MACD_LONG` | `macd_long` |
    /// | `CHARTDECK_MACD_SIGNAL` | `macd_signal` |
    /// | `CHARTDECK_MA_WINDOWS` | `moving_average_windows`, comma separated |
    /// | `CHARTDECK_VOLATILITY_WINDOW` | `volatility_window` |
    /// | `CHARTDECK_REQUIRE_FULL_HISTORY` | `require_full_history` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        // Format: "20,50,200"
        let moving_average_windows = lookup("CHARTDECK_MA_WINDOWS")
            .map(|s| {
                s.split(',')
                    .filter_map(|w| w.trim().parse().ok())
                    .collect::<Vec<usize>>()
            })
            .filter(|windows| !windows.is_empty())
            .unwrap_or(defaults.moving_average_windows);

        let require_full_history = lookup("CHARTDECK_REQUIRE_FULL_HISTORY")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.require_full_history);

        Self {
            rsi_period: number("CHARTDECK_RSI_PERIOD", defaults.rsi_period),
            macd_short: number("CHARTDECK_MACD_SHORT", defaults.macd_short),
            macd_long: number("CHARTDECK_MACD_LONG", defaults.macd_long),
            macd_signal: number("CHARTDECK_MACD_SIGNAL", defaults.macd_signal),
            moving_average_windows,
            volatility_window: number("CHARTDECK_VOLATILITY_WINDOW", defaults.volatility_window),
            require_full_history,
        }
    }

    /// Checks every window parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for the first zero parameter.
    pub fn validate(&self) -> Result<()> {
        self.rsi()?;
        self.macd()?;
        for &window in &self.moving_average_windows {
            Error::check_positive("moving_average_window", window)?;
        }
        Error::check_positive("volatility_window", self.volatility_window)?;
        Ok(())
    }

    /// Number of bars needed for every configured output to be defined at
    /// the latest position.
    #[must_use]
    pub fn required_history(&self) -> usize {
        let longest_ma = self.moving_average_windows.iter().copied().max().unwrap_or(1);

        // Returns need one extra bar in front of the RSI and volatility windows.
        longest_ma
            .max(self.rsi_period.saturating_add(1))
            .max(self.volatility_window.saturating_add(1))
    }

    pub(crate) fn rsi(&self) -> Result<RsiConfig> {
        RsiConfig::builder().length(self.rsi_period).build()
    }

    pub(crate) fn macd(&self) -> Result<MacdConfig> {
        MacdConfig::builder()
            .short(self.macd_short)
            .long(self.macd_long)
            .signal(self.macd_signal)
            .build()
    }
}
