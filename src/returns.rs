use std::fmt::{Debug, Display};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries, Ohlcv, Price,
    PriceSource, Result, Series, Timestamp, lag::Lag, price_source::SourceTracker,
};

/// Configuration for the percentage [`Returns`] indicator.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{IndicatorConfig, IndicatorConfigBuilder, ReturnsConfig};
///
/// let weekly = ReturnsConfig::builder().periods(5).build().unwrap();
/// assert_eq!(weekly.periods(), 5);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ReturnsConfig {
    periods: usize,
    source: PriceSource,
}

impl IndicatorConfig for ReturnsConfig {
    type Builder = ReturnsConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        ReturnsConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> PriceSource {
        self.source
    }

    #[inline]
    fn warm_up(&self) -> usize {
        self.periods
    }
}

impl ReturnsConfig {
    /// Number of bars between the two prices compared.
    #[inline]
    #[must_use]
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Bar-over-bar returns on closing price.
    #[must_use]
    pub fn close() -> Self {
        Self {
            periods: 1,
            source: PriceSource::Close,
        }
    }
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self::close()
    }
}

impl Display for ReturnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReturnsConfig({}, {})", self.periods, self.source)
    }
}

/// Builder for [`ReturnsConfig`].
///
/// Defaults: periods = `1`, source = [`PriceSource::Close`].
pub struct ReturnsConfigBuilder {
    periods: usize,
    source: PriceSource,
}

impl ReturnsConfigBuilder {
    fn new() -> Self {
        Self {
            periods: 1,
            source: PriceSource::Close,
        }
    }

    /// Sets the lag between compared prices.
    #[inline]
    #[must_use]
    pub fn periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }
}

impl IndicatorConfigBuilder<ReturnsConfig> for ReturnsConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    fn build(self) -> Result<ReturnsConfig> {
        Ok(ReturnsConfig {
            periods: Error::check_positive("periods", self.periods)?,
            source: self.source,
        })
    }
}

/// Percentage change between a price and the price `periods` bars earlier.
///
/// ```text
/// return[i] = (price[i] − price[i − periods]) / price[i − periods] × 100
/// ```
///
/// The first `periods` positions are undefined. A zero base price also
/// yields an undefined value rather than an infinity.
#[derive(Clone, Debug)]
pub struct Returns {
    config: ReturnsConfig,
    history: Lag,
    tracker: SourceTracker,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Returns {
    type Config = ReturnsConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            history: Lag::new(config.periods),
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

        let price = self.tracker.next(ohlcv);

        self.current = self
            .history
            .push(price)
            .and_then(|base| percent_change(base, price));

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Returns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RETURNS({}, {})", self.config.periods, self.config.source)
    }
}

#[inline]
fn percent_change(base: Price, price: Price) -> Option<Price> {
    (base != 0.0).then(|| (price - base) / base * 100.0)
}

/// Bar-over-bar percentage returns of the closing price.
///
/// Same length as `series`; position 0 is undefined.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Series, compute_returns};
///
/// let series = Series::from_closes(&[10.0, 11.0, 9.0]).unwrap();
/// let returns = compute_returns(&series);
///
/// assert_eq!(returns.get(0), None);
/// assert!((returns.get(1).unwrap() - 10.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn compute_returns<B: Ohlcv>(series: &Series<B>) -> IndicatorSeries {
    Returns::over(ReturnsConfig::close(), series)
}

/// Percentage returns with a custom lag or price source.
#[must_use]
pub fn compute_returns_with<B: Ohlcv>(
    series: &Series<B>,
    config: ReturnsConfig,
) -> IndicatorSeries {
    Returns::over(config, series)
}
