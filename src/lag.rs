use crate::Price;
use std::collections::VecDeque;

/// Delay line over prices: each push yields the price seen `periods` pushes
/// earlier, or `None` while fewer than `periods` prices precede it.
#[derive(Clone, Debug)]
pub(crate) struct Lag {
    periods: usize,
    history: VecDeque<Price>,
}

impl Lag {
    pub(crate) fn new(periods: usize) -> Self {
        debug_assert!(periods > 0, "lag must be positive");
        Self {
            periods,
            history: VecDeque::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, price: Price) -> Option<Price> {
        self.history.push_back(price);

        if self.history.len() > self.periods {
            self.history.pop_front()
        } else {
            None
        }
    }
}
