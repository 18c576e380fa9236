use std::{fmt::Display, num::NonZero};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries, Ohlcv, Price,
    PriceSource, Result, Series, Timestamp, price_source::SourceTracker,
    rolling_window::RollingWindow,
};

/// Default RSI look-back period.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Configuration for the Relative Strength Index ([`Rsi`]) indicator.
///
/// Average gain and loss are simple means over the last `length` price
/// changes, so output begins at bar `length + 1`.
///
/// # Example
///
/// ```
/// use chartdeck_ta::RsiConfig;
///
/// let config = RsiConfig::default();
/// assert_eq!(config.length(), 14);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> PriceSource {
        self.source
    }

    #[inline]
    fn warm_up(&self) -> usize {
        self.length
    }
}

impl RsiConfig {
    /// Number of price changes averaged.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// RSI on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            source: PriceSource::Close,
        }
    }
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_RSI_PERIOD,
            source: PriceSource::Close,
        }
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`RsiConfig`].
///
/// Defaults: length = `14`, source = [`PriceSource::Close`].
pub struct RsiConfigBuilder {
    length: usize,
    source: PriceSource,
}

impl RsiConfigBuilder {
    #[must_use]
    fn new() -> Self {
        Self {
            length: DEFAULT_RSI_PERIOD,
            source: PriceSource::Close,
        }
    }

    /// Sets the look-back period.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    fn build(self) -> Result<RsiConfig> {
        Ok(RsiConfig {
            length: Error::check_positive("period", self.length)?,
            source: self.source,
        })
    }
}

/// Relative Strength Index (RSI) over simple-mean gains and losses.
///
/// Measures the speed and magnitude of recent price changes on a 0–100
/// scale:
///
/// ```text
/// delta    = price[i] − price[i − 1]
/// gain     = max(delta, 0),  loss = max(−delta, 0)
/// avg_gain = SMA(gain, length),  avg_loss = SMA(loss, length)
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// With no losses in the window RSI is 100. With neither gains nor losses
/// (a flat window) RSI is undefined.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Bar, Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::close(NonZero::new(3).unwrap()));
/// let flat = |c: f64, t: u64| Bar::new(t, c, c, c, c, 0.0);
///
/// // Need 3 price changes (4 bars)
/// assert_eq!(rsi.compute(&flat(10.0, 1)), None);
/// assert_eq!(rsi.compute(&flat(12.0, 2)), None);
/// assert_eq!(rsi.compute(&flat(11.0, 3)), None);
///
/// // changes = +2, −1, +2 → avg_gain = 4/3, avg_loss = 1/3 → RSI = 80
/// assert_eq!(rsi.compute(&flat(13.0, 4)), Some(80.0));
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    tracker: SourceTracker,
    prev_price: Option<Price>,
    gains: RollingWindow,
    losses: RollingWindow,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            tracker: SourceTracker::new(config.source),
            prev_price: None,
            gains: RollingWindow::new(config.length),
            losses: RollingWindow::new(config.length),
            current: None,
            last_open_time: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output> {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t < ohlcv.open_time()),
            "open_time must be strictly increasing: last={}, got={}",
            self.last_open_time.unwrap_or(0),
            ohlcv.open_time(),
        );
        self.last_open_time = Some(ohlcv.open_time());

        let price = self.tracker.next(ohlcv);
        let (gain, loss) = match self.prev_price.replace(price) {
            Some(prev_price) => {
                let (gain, loss) = Self::gain_and_loss(prev_price, price);
                (Some(gain), Some(loss))
            }
            None => (None, None),
        };

        self.gains.push(gain);
        self.losses.push(loss);

        // Both sums share a window length, so the ratio of sums equals the
        // ratio of means.
        self.current = match (self.gains.sum(), self.losses.sum()) {
            (Some(gains), Some(losses)) => Self::rsi_from_sums(gains, losses),
            _ => None,
        };

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Rsi {
    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        (gain, loss)
    }

    #[inline]
    fn rsi_from_sums(gains: f64, losses: f64) -> Option<f64> {
        if losses == 0.0 {
            return (gains > 0.0).then_some(100.0);
        }

        Some((100.0 * gains / (gains + losses)).clamp(0.0, 100.0))
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({}, {})", self.config.length, self.config.source)
    }
}

/// RSI of the closing price over `period` price changes.
///
/// Positions before `period` are undefined, as are positions whose window
/// holds no price movement at all.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `period` is zero.
pub fn compute_rsi<B: Ohlcv>(series: &Series<B>, period: usize) -> Result<IndicatorSeries> {
    let config = RsiConfig::builder().length(period).build()?;
    Ok(Rsi::over(config, series))
}
