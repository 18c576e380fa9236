use crate::Price;
use std::collections::VecDeque;

/// Sliding window over possibly-undefined values.
///
/// The window is ready once it holds `size` values and none of them is
/// undefined. An undefined value poisons every window it belongs to.
///
/// Sums are taken over the values currently in the window, so a value that
/// has left the window has no effect on later results.
#[derive(Clone, Debug)]
pub(crate) struct RollingWindow {
    size: usize,
    window: VecDeque<Option<Price>>,
    undefined: usize,
}

impl RollingWindow {
    pub(crate) fn new(size: usize) -> Self {
        debug_assert!(size > 0, "window size must be positive");
        // Grows with the input; `size` may exceed any series length.
        Self {
            size,
            window: VecDeque::new(),
            undefined: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: Option<Price>) {
        if self.window.len() == self.size
            && let Some(None) = self.window.pop_front()
        {
            self.undefined -= 1;
        }

        if value.is_none() {
            self.undefined += 1;
        }

        self.window.push_back(value);
    }

    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        self.window.len() == self.size && self.undefined == 0
    }

    #[inline]
    pub(crate) fn sum(&self) -> Option<Price> {
        self.is_ready().then(|| self.window.iter().flatten().sum())
    }

    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn mean(&self) -> Option<Price> {
        self.sum().map(|sum| sum / self.size as f64)
    }

    /// Sample variance (denominator `n − 1`) of the window.
    ///
    /// Two-pass over the window values. Undefined for windows of one value.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn sample_variance(&self) -> Option<f64> {
        if self.size < 2 || !self.is_ready() {
            return None;
        }

        let mean = self.mean()?;
        let squared_deviations: f64 = self
            .window
            .iter()
            .flatten()
            .map(|v| (v - mean) * (v - mean))
            .sum();

        Some(squared_deviations / (self.size - 1) as f64)
    }
}
