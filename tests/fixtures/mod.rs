#![allow(dead_code)]

use chartdeck_ta::{IndicatorSeries, Ohlcv, Price, Series, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// Daily OHLCV bar parsed from the reference CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
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

/// Reference value with timestamp. Only defined positions are listed.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub open_time: u64,
    pub expected: f64,
}

/// Reference MACD lines with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub open_time: u64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Reference summary statistics.
#[derive(Debug, Deserialize)]
pub struct RefSummary {
    pub bars: usize,
    pub latest_close: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub average_close: f64,
    pub total_volume: f64,
    pub average_return: f64,
    pub return_volatility: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/daily-bars.csv";
const SUMMARY_PATH: &str = "tests/fixtures/data/summary.json";

/// Load the reference daily bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load the reference daily bars as a validated series.
pub fn load_reference_series() -> Series<RefBar> {
    Series::new(load_reference_ohlcvs()).expect("reference bars form a valid series")
}

/// Load single-value reference data (returns, SMA, RSI, volatility).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load MACD reference data (macd, signal, histogram).
pub fn load_macd_ref(path: &str) -> Vec<RefMacdValue> {
    load_records(path, "invalid MACD reference record")
}

pub fn load_summary_ref() -> RefSummary {
    let text = std::fs::read_to_string(SUMMARY_PATH)
        .unwrap_or_else(|e| panic!("failed to open {SUMMARY_PATH}: {e}"));
    serde_json::from_str(&text).expect("invalid summary reference")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert `actual` is defined exactly at the reference timestamps and
/// matches the reference there.
pub fn assert_series_matches(
    series: &Series<RefBar>,
    actual: &IndicatorSeries,
    reference: &[RefValue],
    tolerance: f64,
    name: &str,
) {
    assert_eq!(actual.len(), series.len(), "{name}: length mismatch");

    let mut ref_idx = 0;
    for (i, (bar, value)) in series.iter().zip(actual.iter()).enumerate() {
        let expected = reference
            .get(ref_idx)
            .filter(|r| r.open_time == bar.open_time);

        match (value, expected) {
            (Some(v), Some(r)) => {
                assert_near(
                    v,
                    r.expected,
                    tolerance,
                    &format!("{name} at bar {i} (t={})", bar.open_time),
                );
                ref_idx += 1;
            }
            (None, None) => {}
            (v, r) => panic!(
                "{name}: definedness mismatch at bar {i} (t={}): actual={v:?}, reference={:?}",
                bar.open_time,
                r.map(|r| r.expected)
            ),
        }
    }

    assert_eq!(
        ref_idx,
        reference.len(),
        "not all reference values checked: {ref_idx}/{}",
        reference.len()
    );
}

/// Generate reference match + streaming tests for a single-value indicator.
///
/// `$batch` maps `&Series<RefBar>` to the batch output; the streaming
/// indicator built from `$config` must agree with it bar for bar.
///
/// ```ignore
/// reference_test!(
///     sma_20,
///     Sma,
///     SmaConfig::close(nz(20)),
///     |s| compute_moving_average(s, 20).unwrap(),
///     "tests/fixtures/data/sma-20-close.csv",
///     1e-9
/// );
/// ```
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ind:ty, $config:expr, $batch:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use chartdeck_ta::*;
            use std::num::NonZero;

            #[allow(dead_code)]
            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            fn batch(series: &Series<RefBar>) -> IndicatorSeries {
                ($batch)(series)
            }

            #[test]
            fn matches_reference() {
                let series = load_reference_series();
                let reference = load_ref_values($ref_path);
                assert_series_matches(
                    &series,
                    &batch(&series),
                    &reference,
                    $tolerance,
                    stringify!($name),
                );
            }

            #[test]
            fn streaming_matches_batch() {
                let series = load_reference_series();
                let expected = batch(&series);
                let mut ind = <$ind>::new($config);

                for (i, bar) in series.iter().enumerate() {
                    let streamed = ind.compute(bar);
                    assert_eq!(
                        streamed.map(f64::to_bits),
                        expected.get(i).map(f64::to_bits),
                        "{} diverged at bar {i}",
                        stringify!($name)
                    );
                }
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
