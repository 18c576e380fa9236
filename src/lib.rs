//! Technical indicators and summary statistics over daily bar series.
//!
//! A [`Series`] is an ordered, validated sequence of bars. Every derived
//! series ([`IndicatorSeries`]) has the same length as its input and marks
//! positions without enough history as `None`.
//!
//! Batch operations ([`compute_returns`], [`compute_moving_average`],
//! [`compute_rolling_std_dev`], [`compute_rsi`], [`compute_macd`],
//! [`summarize`]) are pure functions of their inputs. [`analyze`] runs all of
//! them under one [`AnalysisConfig`].
//!
//! The streaming indicators behind them ([`Returns`], [`Sma`], [`Ema`],
//! [`Rsi`], [`Macd`]) expose [`new`](Sma::new), [`compute`](Sma::compute),
//! and [`value`](Sma::value) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.

mod analysis;
mod config;
mod ema;
mod error;
mod indicator;
mod indicator_series;
mod lag;
mod macd;
mod ohlcv;
mod price_source;
mod returns;
mod rolling_window;
mod rsi;
mod series;
mod sma;
mod std_dev;
mod summary;

pub use crate::error::{Error, Result};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::indicator_series::IndicatorSeries;
pub use crate::ohlcv::{Ohlcv, Price, Timestamp};
pub use crate::price_source::PriceSource;
pub use crate::series::{Bar, Series};

pub use crate::analysis::{Analysis, MovingAverage, analyze, analyze_all};
pub use crate::config::AnalysisConfig;
pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder, EmaSmoother, compute_ema};
pub use crate::macd::{
    DEFAULT_MACD_LONG, DEFAULT_MACD_SHORT, DEFAULT_MACD_SIGNAL, Macd, MacdConfig,
    MacdConfigBuilder, MacdSeries, MacdValue, compute_macd,
};
pub use crate::returns::{
    Returns, ReturnsConfig, ReturnsConfigBuilder, compute_returns, compute_returns_with,
};
pub use crate::rsi::{DEFAULT_RSI_PERIOD, Rsi, RsiConfig, RsiConfigBuilder, compute_rsi};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder, compute_moving_average};
pub use crate::std_dev::{RollingStdDev, compute_rolling_std_dev};
pub use crate::summary::{NO_DATA, Summary, summarize};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, bar: &impl Ohlcv) -> Option<$output> {
                <Self as Indicator>::compute(self, bar)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Returns, ReturnsConfig, Price);
impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(Rsi, RsiConfig, Price);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);

#[cfg(test)]
mod test_util;
