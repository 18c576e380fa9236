use serde::Serialize;
use std::fmt::Display;

use crate::{Error, IndicatorSeries, Ohlcv, Price, Result, Series, std_dev::mean_and_sample_std};

/// Placeholder shown for statistics that cannot be computed.
pub const NO_DATA: &str = "no data";

/// Fixed set of scalar statistics over a completed series.
///
/// Built by [`summarize`]; recomputed from scratch on every call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Number of bars summarized.
    pub bars: usize,
    /// Close of the last bar.
    pub latest_close: Price,
    /// Highest `high` across the series.
    pub period_high: Price,
    /// Lowest `low` across the series.
    pub period_low: Price,
    /// Arithmetic mean of closes.
    pub average_close: Price,
    /// Sum of volumes.
    pub total_volume: f64,
    /// Mean of the defined returns, in percent.
    pub average_return: Option<f64>,
    /// Sample standard deviation of the defined returns, in percent.
    pub return_volatility: Option<f64>,
}

impl Summary {
    /// Ordered `(label, formatted value)` pairs for table rendering.
    ///
    /// Prices and percentages are shown with two decimals; statistics that
    /// could not be computed show [`NO_DATA`].
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let fixed = |v: f64| format!("{v:.2}");
        let percent =
            |v: Option<f64>| v.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.2}%"));

        vec![
            ("Latest Close", fixed(self.latest_close)),
            ("Period High", fixed(self.period_high)),
            ("Period Low", fixed(self.period_low)),
            ("Average Close", fixed(self.average_close)),
            ("Total Volume", format!("{:.0}", self.total_volume)),
            ("Average Daily Return", percent(self.average_return)),
            ("Return Volatility", percent(self.return_volatility)),
        ]
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, value) in self.entries() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

/// Aggregates `series` and its returns into a [`Summary`].
///
/// `returns` is normally the output of
/// [`compute_returns`](crate::compute_returns) for the same series; undefined
/// entries are ignored. Average return needs one defined return and
/// volatility needs two; otherwise they are `None`.
///
/// # Errors
///
/// Returns [`Error::InsufficientData`] if `series` is empty.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Series, compute_returns, summarize};
///
/// let series = Series::from_closes(&[10.0, 11.0, 9.0, 9.0, 12.0]).unwrap();
/// let summary = summarize(&series, &compute_returns(&series)).unwrap();
///
/// assert_eq!(summary.latest_close, 12.0);
/// assert_eq!(summary.period_high, 12.0);
/// assert_eq!(summary.period_low, 9.0);
/// ```
pub fn summarize<B: Ohlcv>(series: &Series<B>, returns: &IndicatorSeries) -> Result<Summary> {
    let Some(last) = series.last() else {
        tracing::warn!("summary requested for an empty series");
        return Err(Error::InsufficientData {
            required: 1,
            available: 0,
        });
    };

    let mut period_high = f64::NEG_INFINITY;
    let mut period_low = f64::INFINITY;
    let mut close_sum = 0.0;
    let mut total_volume = 0.0;

    for bar in series {
        period_high = period_high.max(bar.high());
        period_low = period_low.min(bar.low());
        close_sum += bar.close();
        total_volume += bar.volume();
    }

    let defined_returns: Vec<f64> = returns.defined().collect();
    let (average_return, return_volatility) = mean_and_sample_std(&defined_returns);

    #[allow(clippy::cast_precision_loss)]
    let average_close = close_sum / series.len() as f64;

    Ok(Summary {
        bars: series.len(),
        latest_close: last.close(),
        period_high,
        period_low,
        average_close,
        total_volume,
        average_return,
        return_volatility,
    })
}
