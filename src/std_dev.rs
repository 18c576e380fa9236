use std::fmt::Display;

use crate::{Error, IndicatorSeries, Price, Result, rolling_window::RollingWindow};

/// Rolling sample standard deviation over a stream of possibly-undefined
/// values.
///
/// Works on derived series (usually percentage returns) rather than on bars,
/// so it is fed `Option<f64>` directly. Each output uses the last `length`
/// values with denominator `length − 1`; any undefined value inside the
/// window makes the output undefined.
///
/// # Example
///
/// ```
/// use chartdeck_ta::RollingStdDev;
///
/// let mut sd = RollingStdDev::new(2).unwrap();
/// assert_eq!(sd.push(Some(1.0)), None);
/// assert_eq!(sd.push(Some(3.0)), Some(2.0_f64.sqrt()));
/// ```
#[derive(Clone, Debug)]
pub struct RollingStdDev {
    length: usize,
    window: RollingWindow,
    current: Option<f64>,
}

impl RollingStdDev {
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `length` is zero.
    pub fn new(length: usize) -> Result<Self> {
        let length = Error::check_positive("window", length)?;
        Ok(Self {
            length,
            window: RollingWindow::new(length),
            current: None,
        })
    }

    /// Feeds the next value and returns the updated standard deviation.
    #[inline]
    pub fn push(&mut self, value: Option<Price>) -> Option<f64> {
        self.window.push(value);
        self.current = self.window.sample_variance().map(f64::sqrt);
        self.current
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Display for RollingStdDev {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "STDEV({})", self.length)
    }
}

/// Rolling sample standard deviation of `values` over `window` positions.
///
/// Typically applied to the output of
/// [`compute_returns`](crate::compute_returns) for volatility reporting.
/// The result has the same length as `values`. A window of one is accepted
/// but every position is undefined, since a single value has no sample
/// deviation.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `window` is zero.
pub fn compute_rolling_std_dev(values: &IndicatorSeries, window: usize) -> Result<IndicatorSeries> {
    let mut sd = RollingStdDev::new(window)?;
    Ok(values.iter().map(|v| sd.push(v)).collect())
}

/// Mean and sample standard deviation of a slice.
///
/// The mean needs one value, the deviation two.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_and_sample_std(values: &[f64]) -> (Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let std = (values.len() >= 2).then(|| {
        let squared: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (squared / (n - 1.0)).sqrt()
    });

    (Some(mean), std)
}
