use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    AnalysisConfig, Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorSeries,
    Macd, MacdSeries, Ohlcv, Result, Rsi, Series, Sma, SmaConfig, Summary, compute_returns,
    compute_rolling_std_dev, summarize,
};

/// Simple moving average of closes for one window length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovingAverage {
    pub window: usize,
    pub values: IndicatorSeries,
}

/// Every derived series and the summary for one bar series.
///
/// All series are aligned with the input: `returns[i]`, `rsi[i]` and so on
/// describe bar `i`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub returns: IndicatorSeries,
    /// One entry per configured window, in configuration order.
    pub moving_averages: Vec<MovingAverage>,
    /// Rolling sample standard deviation of `returns`.
    pub volatility: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd: MacdSeries,
    pub summary: Summary,
}

impl Analysis {
    /// Moving average for `window`, if it was configured.
    #[must_use]
    pub fn moving_average(&self, window: usize) -> Option<&IndicatorSeries> {
        self.moving_averages
            .iter()
            .find(|ma| ma.window == window)
            .map(|ma| &ma.values)
    }
}

/// Runs every indicator and the summary over `series`.
///
/// Each indicator starts from fresh state, so the result depends only on
/// `series` and `config`.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if `config` fails [`AnalysisConfig::validate`].
/// - [`Error::InsufficientData`] if `series` is empty, or if
///   `require_full_history` is set and `series` is shorter than
///   [`AnalysisConfig::required_history`].
///
/// # Example
///
/// ```
/// use chartdeck_ta::{AnalysisConfig, Series, analyze};
///
/// let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i)).collect();
/// let series = Series::from_closes(&closes).unwrap();
/// let analysis = analyze(&series, &AnalysisConfig::default()).unwrap();
///
/// assert_eq!(analysis.rsi.last(), Some(100.0));
/// assert_eq!(analysis.moving_average(20).unwrap().len(), 60);
/// ```
pub fn analyze<B: Ohlcv>(series: &Series<B>, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;

    let required = config.required_history();
    if config.require_full_history && series.len() < required {
        warn!(
            required,
            available = series.len(),
            "series too short for full history"
        );
        return Err(Error::InsufficientData {
            required,
            available: series.len(),
        });
    }

    let returns = compute_returns(series);
    let summary = summarize(series, &returns)?;

    let moving_averages = config
        .moving_average_windows
        .iter()
        .map(|&window| {
            let sma = SmaConfig::builder().length(window).build()?;
            Ok(MovingAverage {
                window,
                values: Sma::over(sma, series),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let volatility = compute_rolling_std_dev(&returns, config.volatility_window)?;
    let rsi = Rsi::over(config.rsi()?, series);
    let macd: MacdSeries = Macd::over(config.macd()?, series).into();

    debug!(
        bars = series.len(),
        defined_rsi = rsi.defined_count(),
        moving_averages = moving_averages.len(),
        "analysis complete"
    );

    Ok(Analysis {
        returns,
        moving_averages,
        volatility,
        rsi,
        macd,
        summary,
    })
}

/// Analyzes several named series with one configuration.
///
/// Output order matches input order. A failure for one series does not stop
/// the others. With the `parallel` feature the series are analyzed on the
/// rayon thread pool.
pub fn analyze_all<B: Ohlcv + Sync>(
    series: &[(String, Series<B>)],
    config: &AnalysisConfig,
) -> Vec<(String, Result<Analysis>)> {
    debug!(count = series.len(), "analyzing series batch");

    let run = |(symbol, bars): &(String, Series<B>)| {
        debug!(%symbol, bars = bars.len(), "analyzing series");
        (symbol.clone(), analyze(bars, config))
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        series.par_iter().map(run).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = series.iter().map(run).collect();

    results
}
