use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::{Error, IndicatorSeries, Ohlcv, Price, PriceSource, Result, Timestamp};

/// One OHLCV observation.
///
/// The crate's own bar record. Any other type implementing [`Ohlcv`] can be
/// used in its place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    open_time: Timestamp,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    #[serde(default)]
    volume: f64,
}

impl Bar {
    #[must_use]
    pub const fn new(
        open_time: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.open_time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Ordered price history.
///
/// Bars are strictly increasing by [`open_time`](Ohlcv::open_time), every
/// price is finite and positive, and volume is finite and non-negative.
/// The series is immutable once built; calculators only borrow it.
///
/// An empty series is valid to construct. Calculators map it to empty
/// indicator series and [`summarize`](crate::summarize) rejects it with
/// [`Error::InsufficientData`].
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Bar, Series};
///
/// let series = Series::new(vec![
///     Bar::new(1, 10.0, 10.5, 9.5, 10.0, 1_000.0),
///     Bar::new(2, 10.0, 11.5, 9.8, 11.0, 1_200.0),
/// ])
/// .unwrap();
///
/// assert_eq!(series.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Series<B: Ohlcv = Bar> {
    bars: Vec<B>,
}

impl<B: Ohlcv> Series<B> {
    /// Validates and wraps `bars`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeries`] naming the first offending bar when
    /// timestamps are not strictly increasing, a price is not finite and
    /// positive, or volume is negative or not finite.
    pub fn new(bars: Vec<B>) -> Result<Self> {
        let mut last_open_time: Option<Timestamp> = None;

        for (index, bar) in bars.iter().enumerate() {
            if let Err(reason) = Self::check_bar(bar, last_open_time) {
                tracing::warn!(index, %reason, "rejected bar series");
                return Err(Error::InvalidSeries { index, reason });
            }
            last_open_time = Some(bar.open_time());
        }

        Ok(Self { bars })
    }

    fn check_bar(bar: &B, last_open_time: Option<Timestamp>) -> std::result::Result<(), String> {
        if let Some(last) = last_open_time
            && bar.open_time() <= last
        {
            return Err(format!(
                "open_time {} does not follow {last}",
                bar.open_time()
            ));
        }

        for (field, price) in [
            ("open", bar.open()),
            ("high", bar.high()),
            ("low", bar.low()),
            ("close", bar.close()),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(format!("{field} price {price} must be finite and positive"));
            }
        }

        let volume = bar.volume();
        if !volume.is_finite() || volume < 0.0 {
            return Err(format!("volume {volume} must be finite and non-negative"));
        }

        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bars(&self) -> &[B] {
        &self.bars
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.bars.iter()
    }

    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&B> {
        self.bars.first()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&B> {
        self.bars.last()
    }

    /// Extracts one price column as a fully defined [`IndicatorSeries`].
    ///
    /// Useful for feeding prices into value-level calculators such as
    /// [`compute_rolling_std_dev`](crate::compute_rolling_std_dev).
    #[must_use]
    pub fn prices(&self, source: PriceSource) -> IndicatorSeries {
        let mut prev_close = None;

        self.bars
            .iter()
            .map(|bar| {
                let price = source.extract(bar, prev_close);
                prev_close = Some(bar.close());
                Some(price)
            })
            .collect()
    }

    #[must_use]
    pub fn into_bars(self) -> Vec<B> {
        self.bars
    }
}

impl Series<Bar> {
    /// Builds a series from closing prices alone, with open, high and low
    /// equal to the close, zero volume, and sequential timestamps from 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeries`] if a close is not finite and positive.
    pub fn from_closes(closes: &[Price]) -> Result<Self> {
        Self::new(
            (1..)
                .zip(closes)
                .map(|(t, &c)| Bar::new(t, c, c, c, c, 0.0))
                .collect(),
        )
    }
}

impl<B: Ohlcv> Index<usize> for Series<B> {
    type Output = B;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bars[index]
    }
}

impl<'a, B: Ohlcv> IntoIterator for &'a Series<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

impl<B: Ohlcv> TryFrom<Vec<B>> for Series<B> {
    type Error = Error;

    fn try_from(bars: Vec<B>) -> Result<Self> {
        Self::new(bars)
    }
}
