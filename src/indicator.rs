use crate::{IndicatorSeries, Ohlcv, PriceSource, Result, Series};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (window length, spans, price source). Configs are value types: cheap to
/// clone, compare, and hash.
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Price source to extract from each bar.
    fn source(&self) -> PriceSource;

    /// Number of bars consumed before the first defined output.
    fn warm_up(&self) -> usize;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Sets the price source.
    #[must_use]
    fn source(self, source: PriceSource) -> Self;

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// if a window parameter is missing or zero.
    fn build(self) -> Result<Config>;
}

/// A technical indicator.
///
/// Indicators hold streaming state and update incrementally on each call to
/// [`compute`](Indicator::compute). Output is `None` until enough bars have
/// been seen. Bars must arrive with strictly increasing `open_time`.
///
/// [`over`](Indicator::over) runs a fresh indicator across a whole
/// [`Series`]; nothing is carried between calls.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Indicator, Series, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let series = Series::from_closes(&[10.0, 20.0, 30.0]).unwrap();
/// let sma = Sma::over(SmaConfig::close(NonZero::new(3).unwrap()), &series);
///
/// assert_eq!(sma.as_slice(), &[None, None, Some(20.0)]);
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. `f64` for simple indicators,
    /// a struct for composite ones (e.g. MACD).
    type Output: Copy + Send + Sync + Display + Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds the next bar and returns the updated indicator value,
    /// or `None` if there is not enough history.
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output>;

    /// Returns the last computed value without advancing state.
    fn value(&self) -> Option<Self::Output>;

    /// Computes the indicator at every position of `series`.
    ///
    /// The result has exactly `series.len()` positions.
    fn over<B: Ohlcv>(config: Self::Config, series: &Series<B>) -> IndicatorSeries<Self::Output> {
        let mut indicator = Self::new(config);
        series.iter().map(|bar| indicator.compute(bar)).collect()
    }
}
