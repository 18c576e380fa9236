use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries, Ohlcv, Price,
    PriceSource, Result, Series, Timestamp, price_source::SourceTracker,
};

/// Configuration for the Exponential Moving Average ([`Ema`]) indicator.
///
/// The span `s` sets the smoothing factor `α = 2 / (s + 1)`.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{EmaConfig, IndicatorConfig, IndicatorConfigBuilder};
///
/// let config = EmaConfig::builder().span(12).build().unwrap();
///
/// assert_eq!(config.span(), 12);
/// assert_eq!(config.warm_up(), 0);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    span: usize,
    source: PriceSource,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> PriceSource {
        self.source
    }

    /// The recursive EMA is defined from the first bar.
    #[inline]
    fn warm_up(&self) -> usize {
        0
    }
}

impl EmaConfig {
    /// Span (number of bars) of the smoothing.
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    /// Smoothing factor `2 / (span + 1)`.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f64 {
        alpha(self.span)
    }

    /// Callers guarantee `span > 0`.
    pub(crate) fn with_source(span: usize, source: PriceSource) -> Self {
        debug_assert!(span > 0, "span must be positive");
        Self { span, source }
    }

    /// EMA on closing price.
    #[must_use]
    pub fn close(span: NonZero<usize>) -> Self {
        Self {
            span: span.get(),
            source: PriceSource::Close,
        }
    }

    /// EMA on average price: `(open + high + low + close) / 4`.
    #[must_use]
    pub fn ohlc4(span: NonZero<usize>) -> Self {
        Self {
            span: span.get(),
            source: PriceSource::OHLC4,
        }
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({}, {})", self.span, self.source)
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Span must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    span: Option<usize>,
    source: PriceSource,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            span: None,
            source: PriceSource::Close,
        }
    }

    /// Sets the smoothing span.
    #[inline]
    #[must_use]
    pub fn span(mut self, span: usize) -> Self {
        self.span.replace(span);
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    fn build(self) -> Result<EmaConfig> {
        Ok(EmaConfig {
            span: Error::check_positive("span", self.span.unwrap_or(0))?,
            source: self.source,
        })
    }
}

#[inline]
#[allow(clippy::cast_precision_loss)]
fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// The recursive EMA over a stream of possibly-undefined values.
///
/// ```text
/// EMA[first] = x[first]
/// EMA[i]     = α × x[i] + (1 − α) × EMA[i − 1]
/// ```
///
/// The recursion seeds on the first defined value. An undefined input
/// produces an undefined output and leaves the recursion where it was.
///
/// Each step is evaluated in the algebraically equal form
/// `EMA[i − 1] + α × (x[i] − EMA[i − 1])` as one fused multiply-add. An
/// input equal to the current state leaves the state bit-identical, so a
/// constant series smooths to exactly that constant.
#[derive(Clone, Copy, Debug)]
pub struct EmaSmoother {
    alpha: f64,
    state: Option<f64>,
}

impl EmaSmoother {
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `span` is zero.
    pub fn new(span: usize) -> Result<Self> {
        let span = Error::check_positive("span", span)?;
        Ok(Self::with_alpha(alpha(span)))
    }

    pub(crate) fn with_alpha(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    /// Feeds the next value and returns the smoothed value at this position.
    #[inline]
    pub fn push(&mut self, value: Option<f64>) -> Option<f64> {
        let value = value?;

        let next = match self.state {
            Some(previous) => self.alpha.mul_add(value - previous, previous),
            None => value,
        };
        self.state = Some(next);

        Some(next)
    }

    /// Most recent smoothed value, if any input has been defined.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<f64> {
        self.state
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent prices, using
/// the unadjusted recursive form with `α = 2 / (span + 1)`:
///
/// ```text
/// EMA[0] = price[0]
/// EMA[i] = α × price[i] + (1 − α) × EMA[i − 1]
/// ```
///
/// Every position is defined, including the first. Early values are only
/// lightly smoothed; they are reported as computed.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Bar, Ema, EmaConfig};
/// use std::num::NonZero;
///
/// // EMA(3): α = 0.5
/// let mut ema = Ema::new(EmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(ema.compute(&Bar::new(1, 2.0, 2.0, 2.0, 2.0, 0.0)), Some(2.0));
/// assert_eq!(ema.compute(&Bar::new(2, 6.0, 6.0, 6.0, 6.0, 0.0)), Some(4.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    smoother: EmaSmoother,
    tracker: SourceTracker,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            smoother: EmaSmoother::with_alpha(config.alpha()),
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

        self.current = self.smoother.push(Some(self.tracker.next(ohlcv)));
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({}, {})", self.config.span, self.config.source)
    }
}

/// Exponential moving average of the closing price.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `span` is zero.
pub fn compute_ema<B: Ohlcv>(series: &Series<B>, span: usize) -> Result<IndicatorSeries> {
    let config = EmaConfig::builder().span(span).build()?;
    Ok(Ema::over(config, series))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bar, closes, ohlc};

    fn ema(span: usize) -> Ema {
        Ema::new(EmaConfig::builder().span(span).build().unwrap())
    }

    mod seeding {
        use super::*;

        #[test]
        fn first_value_is_first_price() {
            let mut ema = ema(26);
            assert_eq!(ema.compute(&bar(42.0, 1)), Some(42.0));
        }

        #[test]
        fn defined_at_every_position() {
            let out = compute_ema(&closes(&[1.0, 2.0, 3.0, 4.0]), 10).unwrap();
            assert_eq!(out.defined_count(), 4);
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn applies_recursion() {
            // EMA(3): α = 0.5
            let mut ema = ema(3);
            ema.compute(&bar(2.0, 1));
            // 0.5 * 6 + 0.5 * 2 = 4
            assert_eq!(ema.compute(&bar(6.0, 2)), Some(4.0));
            // 0.5 * 10 + 0.5 * 4 = 7
            assert_eq!(ema.compute(&bar(10.0, 3)), Some(7.0));
        }

        #[test]
        fn ema_4_alpha_is_two_fifths() {
            // α = 2/(4+1) = 0.4
            // 10, then 0.4 * 20 + 0.6 * 10 = 14
            let mut ema = ema(4);
            ema.compute(&bar(10.0, 1));
            assert_approx!(ema.compute(&bar(20.0, 2)).unwrap(), 14.0);
        }

        #[test]
        fn constant_input_stays_constant() {
            let out = compute_ema(&closes(&[50.0; 20]), 12).unwrap();
            assert!(out.iter().all(|v| v == Some(50.0)));
        }

        #[test]
        fn span_one_tracks_price() {
            // α = 1
            let mut ema = ema(1);
            ema.compute(&bar(10.0, 1));
            assert_eq!(ema.compute(&bar(20.0, 2)), Some(20.0));
            assert_eq!(ema.compute(&bar(5.0, 3)), Some(5.0));
        }

        #[test]
        fn repeated_runs_are_identical() {
            let series = closes(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
            let a = compute_ema(&series, 3).unwrap();
            let b = compute_ema(&series, 3).unwrap();
            assert_eq!(a, b);
        }
    }

    mod smoother {
        use super::*;

        #[test]
        fn seeds_on_first_defined_value() {
            let mut s = EmaSmoother::new(3).unwrap();
            assert_eq!(s.push(None), None);
            assert_eq!(s.push(Some(8.0)), Some(8.0));
            assert_eq!(s.push(Some(4.0)), Some(6.0));
        }

        #[test]
        fn undefined_input_keeps_state() {
            let mut s = EmaSmoother::new(3).unwrap();
            s.push(Some(8.0));
            assert_eq!(s.push(None), None);
            assert_eq!(s.state(), Some(8.0));
            assert_eq!(s.push(Some(4.0)), Some(6.0));
        }

        #[test]
        fn constant_input_is_bit_identical() {
            for span in [9, 12, 26] {
                let mut s = EmaSmoother::new(span).unwrap();
                for _ in 0..500 {
                    let out = s.push(Some(42.37)).unwrap();
                    assert_eq!(out.to_bits(), 42.37_f64.to_bits());
                }
            }
        }

        #[test]
        fn matches_weighted_recursion() {
            // α = 2/13
            let mut s = EmaSmoother::new(12).unwrap();
            let alpha = 2.0 / 13.0;
            let mut expected: f64 = 100.0;
            s.push(Some(expected));
            for x in [101.5, 99.25, 103.0, 98.75, 100.125] {
                expected = alpha * x + (1.0 - alpha) * expected;
                assert_approx!(s.push(Some(x)).unwrap(), expected);
            }
        }

        #[test]
        fn huge_span_holds_the_seed() {
            let mut s = EmaSmoother::new(usize::MAX).unwrap();
            assert_eq!(s.push(Some(10.0)), Some(10.0));
            assert_approx!(s.push(Some(20.0)).unwrap(), 10.0);
        }

        #[test]
        fn zero_span_is_rejected() {
            assert!(matches!(
                EmaSmoother::new(0),
                Err(Error::InvalidParameter { name: "span", .. })
            ));
        }
    }

    mod price_source {
        use super::*;

        #[test]
        fn uses_configured_source() {
            // OHLC4 bar 1: (10 + 20 + 10 + 20) / 4 = 15
            // OHLC4 bar 2: (30 + 40 + 30 + 40) / 4 = 35
            // EMA(3): 0.5 * 35 + 0.5 * 15 = 25
            let mut ema = Ema::new(EmaConfig::ohlc4(NonZero::new(3).unwrap()));
            ema.compute(&ohlc(10.0, 20.0, 10.0, 20.0, 1));
            assert_eq!(ema.compute(&ohlc(30.0, 40.0, 30.0, 40.0, 2)), Some(25.0));
        }
    }

    mod config {
        use super::*;

        #[test]
        fn zero_span_is_rejected() {
            assert_eq!(
                compute_ema(&closes(&[1.0]), 0).unwrap_err(),
                Error::InvalidParameter {
                    name: "span",
                    value: 0
                }
            );
        }

        #[test]
        fn alpha_matches_span() {
            let config = EmaConfig::close(NonZero::new(9).unwrap());
            assert_eq!(config.alpha(), 0.2);
        }

        #[test]
        fn formats_correctly() {
            assert_eq!(ema(20).to_string(), "EMA(20, Close)");
            assert_eq!(
                EmaConfig::close(NonZero::new(20).unwrap()).to_string(),
                "EmaConfig(20, Close)"
            );
        }
    }
}
