/// A price value.
///
/// Semantic alias for [`f64`]. Every calculation in the crate runs in `f64`,
/// so repeated runs over the same input are bit-identical.
pub type Price = f64;

/// Bar open timestamp or sequence number.
///
/// Orders bars inside a [`Series`](crate::Series). Must be strictly
/// increasing between consecutive bars.
pub type Timestamp = u64;

/// OHLCV bar data used as input to all indicators.
///
/// Implement this on your own kline/candle type to avoid per-bar
/// conversion. Indicators accept `&impl Ohlcv` and extract the
/// configured [`PriceSource`](crate::PriceSource) internally.
///
/// # Example
///
/// ```
/// use chartdeck_ta::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64, v: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.ts }
///     fn volume(&self) -> f64 { self.v }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp or sequence number.
    ///
    /// Gaps between timestamps (non-trading days) are allowed and are not
    /// interpolated: derived series align with bars by position.
    fn open_time(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    ///
    /// Only the summary reporter reads volume.
    fn volume(&self) -> f64 {
        0.0
    }
}
