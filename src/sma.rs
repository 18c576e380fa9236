use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries, Ohlcv, Price,
    PriceSource, Result, Series, Timestamp, price_source::SourceTracker,
    rolling_window::RollingWindow,
};

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use chartdeck_ta::SmaConfig;
/// use std::num::NonZero;
///
/// let config = SmaConfig::close(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> PriceSource {
        self.source
    }

    #[inline]
    fn warm_up(&self) -> usize {
        self.length - 1
    }
}

impl SmaConfig {
    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// SMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            source: PriceSource::Close,
        }
    }

    /// SMA on median price: `(high + low) / 2`.
    #[must_use]
    pub fn hl2(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            source: PriceSource::HL2,
        }
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`SmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl SmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
        }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length.replace(length);
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    fn build(self) -> Result<SmaConfig> {
        Ok(SmaConfig {
            length: Error::check_positive("length", self.length.unwrap_or(0))?,
            source: self.source,
        })
    }
}

/// Simple Moving Average (SMA).
///
/// Arithmetic mean of the last *n* prices, where *n* is the configured
/// window length. Returns `None` until the window is full.
///
/// Each value is the mean of the prices currently in the window. Prices
/// that have left the window do not affect it.
///
/// # Example
///
/// ```rust
/// use chartdeck_ta::{Bar, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(&Bar::new(1, 10.0, 10.0, 10.0, 10.0, 0.0)), None);
/// assert_eq!(sma.compute(&Bar::new(2, 20.0, 20.0, 20.0, 20.0, 0.0)), None);
/// assert_eq!(sma.compute(&Bar::new(3, 30.0, 30.0, 30.0, 30.0, 0.0)), Some(20.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: RollingWindow,
    tracker: SourceTracker,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            window: RollingWindow::new(config.length),
            tracker: SourceTracker::new(config.source),
            current: None,
            last_open_time: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t < ohlcv.open_time()),
            "open_time must be strictly increasing: last={}, got={}",
            self.last_open_time.unwrap_or(0),
            ohlcv.open_time(),
        );
        self.last_open_time = Some(ohlcv.open_time());

        self.window.push(Some(self.tracker.next(ohlcv)));
        self.current = self.window.mean();

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.config.length, self.config.source)
    }
}

/// Simple moving average of the closing price over `window` bars.
///
/// Positions before `window - 1` are undefined. A series shorter than the
/// window yields an all-undefined result, not an error.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `window` is zero.
pub fn compute_moving_average<B: Ohlcv>(
    series: &Series<B>,
    window: usize,
) -> Result<IndicatorSeries> {
    let config = SmaConfig::builder().length(window).build()?;
    Ok(Sma::over(config, series))
}
