// src/test_util.rs

use crate::{Bar, Price, Series};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

/// Bar with explicit OHLC and zero volume.
pub fn ohlc(open: Price, high: Price, low: Price, close: Price, time: u64) -> Bar {
    Bar::new(time, open, high, low, close, 0.0)
}

/// Convenience: bar with just a close price and timestamp (OHLC all equal to close).
pub fn bar(close: Price, time: u64) -> Bar {
    ohlc(close, close, close, close, time)
}

/// Series of flat bars from closing prices.
pub fn closes(prices: &[Price]) -> Series {
    Series::from_closes(prices).expect("valid closes")
}

/// Strictly rising closes: `start, start + step, ...`.
#[allow(clippy::cast_precision_loss)]
pub fn ramp(start: Price, step: Price, len: usize) -> Series {
    let prices: Vec<Price> = (0..len).map(|i| step.mul_add(i as f64, start)).collect();
    closes(&prices)
}
