use crate::{Ohlcv, Price};

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Price source extracted from an [`Ohlcv`] bar before feeding into an
/// indicator.
///
/// Each bar-driven indicator is configured with a `PriceSource`; the default
/// is the closing price.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug, Serialize, Deserialize)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Weighted close: `(high + low + close + close) / 4`.
    HLCC4,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// On the first bar (no previous close), falls back to `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    /// Extracts this source from `ohlcv`. `prev_close` is the close of the
    /// preceding bar, only consulted by [`PriceSource::TrueRange`].
    #[inline]
    #[must_use]
    pub fn extract(self, ohlcv: &impl Ohlcv, prev_close: Option<Price>) -> Price {
        match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Close => ohlcv.close(),
            Self::Low => ohlcv.low(),
            Self::HL2 => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::HLC3 => (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0,
            Self::OHLC4 => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
            Self::HLCC4 => (ohlcv.high() + ohlcv.low() + ohlcv.close() + ohlcv.close()) / 4.0,
            Self::TrueRange => {
                let hl = ohlcv.high() - ohlcv.low();

                match prev_close {
                    Some(prev_close) => {
                        let hc = (ohlcv.high() - prev_close).abs();
                        let lc = (ohlcv.low() - prev_close).abs();
                        hl.max(hc).max(lc)
                    }
                    None => hl,
                }
            }
        }
    }
}

/// Tracks the previous bar's close so that [`PriceSource::TrueRange`] can be
/// extracted while streaming.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SourceTracker {
    source: PriceSource,
    prev_close: Option<Price>,
}

impl SourceTracker {
    pub(crate) fn new(source: PriceSource) -> Self {
        Self {
            source,
            prev_close: None,
        }
    }

    /// Extracts the configured source and remembers this bar's close.
    #[inline]
    pub(crate) fn next(&mut self, ohlcv: &impl Ohlcv) -> Price {
        let price = self.source.extract(ohlcv, self.prev_close);
        self.prev_close = Some(ohlcv.close());
        price
    }
}
