use std::fmt::Display;

use crate::{
    Ema, EmaConfig, Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries,
    Ohlcv, Price, PriceSource, Result, Series, ema::EmaSmoother,
};

/// Default short (fast) EMA span.
pub const DEFAULT_MACD_SHORT: usize = 12;
/// Default long (slow) EMA span.
pub const DEFAULT_MACD_LONG: usize = 26;
/// Default signal EMA span.
pub const DEFAULT_MACD_SIGNAL: usize = 9;

/// Configuration for the [`Macd`] indicator.
///
/// The short span is not required to be smaller than the long one; a
/// reversed pair simply negates the oscillator.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig};
///
/// let config = MacdConfig::builder().short(5).long(35).signal(5).build().unwrap();
/// assert_eq!((config.short(), config.long(), config.signal()), (5, 35, 5));
///
/// assert_eq!(MacdConfig::default().to_string(), "MacdConfig(12, 26, 9, Close)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    short: usize,
    long: usize,
    signal: usize,
    source: PriceSource,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    #[inline]
    fn source(&self) -> PriceSource {
        self.source
    }

    #[inline]
    fn warm_up(&self) -> usize {
        0
    }
}

impl MacdConfig {
    #[inline]
    #[must_use]
    pub fn short(&self) -> usize {
        self.short
    }

    #[inline]
    #[must_use]
    pub fn long(&self) -> usize {
        self.long
    }

    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal
    }

    fn ema(&self, span: usize) -> EmaConfig {
        EmaConfig::with_source(span, self.source)
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            short: DEFAULT_MACD_SHORT,
            long: DEFAULT_MACD_LONG,
            signal: DEFAULT_MACD_SIGNAL,
            source: PriceSource::Close,
        }
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {})",
            self.short, self.long, self.signal, self.source
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// Defaults: spans `(12, 26, 9)`, source = [`PriceSource::Close`].
pub struct MacdConfigBuilder {
    short: usize,
    long: usize,
    signal: usize,
    source: PriceSource,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        Self {
            short: DEFAULT_MACD_SHORT,
            long: DEFAULT_MACD_LONG,
            signal: DEFAULT_MACD_SIGNAL,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn short(mut self, span: usize) -> Self {
        self.short = span;
        self
    }

    #[inline]
    #[must_use]
    pub fn long(mut self, span: usize) -> Self {
        self.long = span;
        self
    }

    #[inline]
    #[must_use]
    pub fn signal(mut self, span: usize) -> Self {
        self.signal = span;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    fn build(self) -> Result<MacdConfig> {
        Ok(MacdConfig {
            short: Error::check_positive("short_span", self.short)?,
            long: Error::check_positive("long_span", self.long)?,
            signal: Error::check_positive("signal_span", self.signal)?,
            source: self.source,
        })
    }
}

/// One MACD observation.
///
/// `histogram` is always exactly `macd − signal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    macd: Price,
    signal: Price,
    histogram: Price,
}

impl MacdValue {
    /// Short EMA minus long EMA.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> Price {
        self.macd
    }

    /// EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Price {
        self.signal
    }

    /// MACD minus signal.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Price {
        self.histogram
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD(m: {}, s: {}, h: {})",
            self.macd, self.signal, self.histogram
        )
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// ```text
/// MACD      = EMA(price, short) − EMA(price, long)
/// Signal    = EMA(MACD, signal)
/// Histogram = MACD − Signal
/// ```
///
/// All EMAs use the unadjusted recursion seeded on the first value, so every
/// position is defined from the first bar on. Values over the first few
/// dozen bars are only lightly smoothed and are reported as computed.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Bar, Macd, MacdConfig};
///
/// let mut macd = Macd::new(MacdConfig::default());
/// let first = macd.compute(&Bar::new(1, 10.0, 10.0, 10.0, 10.0, 0.0)).unwrap();
///
/// assert_eq!(first.macd(), 0.0);
/// assert_eq!(first.histogram(), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    short: Ema,
    long: Ema,
    signal: EmaSmoother,
    current: Option<MacdValue>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        let signal = config.ema(config.signal);

        Self {
            config,
            short: Ema::new(config.ema(config.short)),
            long: Ema::new(config.ema(config.long)),
            signal: EmaSmoother::with_alpha(signal.alpha()),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<MacdValue> {
        let short = self.short.compute(ohlcv);
        let long = self.long.compute(ohlcv);

        let macd = short.zip(long).map(|(short, long)| short - long);
        let signal = self.signal.push(macd);

        self.current = macd.zip(signal).map(|(macd, signal)| MacdValue {
            macd,
            signal,
            histogram: macd - signal,
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<MacdValue> {
        self.current
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {}, {})",
            self.config.short, self.config.long, self.config.signal, self.config.source
        )
    }
}

/// The three MACD lines, each aligned with the input series.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

impl MacdSeries {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    /// Latest observation, if defined.
    #[must_use]
    pub fn last(&self) -> Option<MacdValue> {
        Some(MacdValue {
            macd: self.macd.last()?,
            signal: self.signal.last()?,
            histogram: self.histogram.last()?,
        })
    }
}

impl From<IndicatorSeries<MacdValue>> for MacdSeries {
    fn from(values: IndicatorSeries<MacdValue>) -> Self {
        Self {
            macd: values.map(|v| v.macd),
            signal: values.map(|v| v.signal),
            histogram: values.map(|v| v.histogram),
        }
    }
}

/// MACD of the closing price.
///
/// Returns the MACD, signal and histogram lines, each with the same length as
/// `series` and defined at every position.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if any span is zero.
pub fn compute_macd<B: Ohlcv>(
    series: &Series<B>,
    short_span: usize,
    long_span: usize,
    signal_span: usize,
) -> Result<MacdSeries> {
    let config = MacdConfig::builder()
        .short(short_span)
        .long(long_span)
        .signal(signal_span)
        .build()?;

    Ok(Macd::over(config, series).into())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bar, closes, ramp};

    mod computation {
        use super::*;

        #[test]
        fn first_bar_is_zero() {
            let out = compute_macd(&closes(&[10.0]), 12, 26, 9).unwrap();
            assert_eq!(out.macd.as_slice(), &[Some(0.0)]);
            assert_eq!(out.signal.as_slice(), &[Some(0.0)]);
            assert_eq!(out.histogram.as_slice(), &[Some(0.0)]);
        }

        #[test]
        fn hand_computed_small_spans() {
            // short EMA(1): α = 1 → tracks price
            // long EMA(3): α = 0.5
            // signal EMA(3): α = 0.5
            let out = compute_macd(&closes(&[10.0, 14.0, 12.0]), 1, 3, 3).unwrap();
            // bar 1: short 10, long 10, macd 0, signal 0
            // bar 2: short 14, long 12, macd 2, signal 1, hist 1
            // bar 3: short 12, long 12, macd 0, signal 0.5, hist −0.5
            assert_eq!(out.macd.as_slice(), &[Some(0.0), Some(2.0), Some(0.0)]);
            assert_eq!(out.signal.as_slice(), &[Some(0.0), Some(1.0), Some(0.5)]);
            assert_eq!(out.histogram.as_slice(), &[Some(0.0), Some(1.0), Some(-0.5)]);
        }

        #[test]
        fn constant_prices_are_all_zero() {
            let out = compute_macd(&closes(&[42.0; 30]), 12, 26, 9).unwrap();
            for line in [&out.macd, &out.signal, &out.histogram] {
                assert_eq!(line.len(), 30);
                assert!(line.iter().all(|v| v == Some(0.0)));
            }
        }

        #[test]
        fn histogram_is_exact_difference() {
            let out = compute_macd(&ramp(100.0, 0.7, 60), 12, 26, 9).unwrap();
            for i in 0..out.len() {
                let (m, s, h) = (
                    out.macd[i].unwrap(),
                    out.signal[i].unwrap(),
                    out.histogram[i].unwrap(),
                );
                assert_eq!(h, m - s, "histogram mismatch at {i}");
            }
        }

        #[test]
        fn rising_market_has_positive_macd() {
            let out = compute_macd(&ramp(100.0, 1.0, 60), 12, 26, 9).unwrap();
            assert!(out.macd.last().unwrap() > 0.0);
        }

        #[test]
        fn repeated_runs_are_bit_identical() {
            let series = closes(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0]);
            let a = compute_macd(&series, 12, 26, 9).unwrap();
            let b = compute_macd(&series, 12, 26, 9).unwrap();
            for (x, y) in a.histogram.iter().zip(b.histogram.iter()) {
                assert_eq!(x.map(f64::to_bits), y.map(f64::to_bits));
            }
        }
    }

    mod streaming {
        use super::*;

        #[test]
        fn matches_batch() {
            let series = ramp(50.0, -0.25, 40);
            let batch = compute_macd(&series, 12, 26, 9).unwrap();

            let mut macd = Macd::new(MacdConfig::default());
            for (i, b) in series.iter().enumerate() {
                let v = macd.compute(b).unwrap();
                assert_eq!(Some(v.macd()), batch.macd[i]);
                assert_eq!(Some(v.signal()), batch.signal[i]);
            }
            assert_eq!(macd.value(), batch.last());
        }

        #[test]
        fn value_formats() {
            let mut macd = Macd::new(MacdConfig::default());
            let v = macd.compute(&bar(10.0, 1)).unwrap();
            assert_eq!(v.to_string(), "MACD(m: 0, s: 0, h: 0)");
            assert_eq!(macd.to_string(), "MACD(12, 26, 9, Close)");
        }

        #[test]
        fn long_ema_matches_standalone_ema() {
            let series = ramp(10.0, 0.5, 10);
            let mut macd = Macd::new(MacdConfig::builder().short(1).build().unwrap());
            let mut long = Ema::new(EmaConfig::builder().span(26).build().unwrap());
            for b in &series {
                let short = b.close();
                let v = macd.compute(b).unwrap();
                let l = long.compute(b).unwrap();
                assert_approx!(v.macd() + l, short);
            }
        }
    }

    mod config {
        use super::*;

        #[test]
        fn defaults_are_12_26_9() {
            let config = MacdConfig::builder().build().unwrap();
            assert_eq!(config, MacdConfig::default());
            assert_eq!(
                (config.short(), config.long(), config.signal()),
                (DEFAULT_MACD_SHORT, DEFAULT_MACD_LONG, DEFAULT_MACD_SIGNAL)
            );
        }

        #[test]
        fn zero_span_is_rejected() {
            for (short, long, signal, name) in [
                (0, 26, 9, "short_span"),
                (12, 0, 9, "long_span"),
                (12, 26, 0, "signal_span"),
            ] {
                let err = compute_macd(&closes(&[1.0]), short, long, signal).unwrap_err();
                assert_eq!(err, Error::InvalidParameter { name, value: 0 });
            }
        }

        #[test]
        fn source_reaches_both_emas() {
            let config = MacdConfig::builder()
                .source(PriceSource::HL2)
                .build()
                .unwrap();
            assert_eq!(config.ema(12).source(), PriceSource::HL2);
            assert_eq!(config.ema(26).span(), 26);
        }
    }
}
