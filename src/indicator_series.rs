use serde::Serialize;
use std::ops::Index;

use crate::{Error, Price, Result};

/// A derived series aligned position-for-position with its input.
///
/// Position *i* holds `Some(value)` or `None` when there is not yet enough
/// history (or the value would require a division by zero). `None` never
/// stands for zero, and no calculator fabricates a number in its place.
///
/// Serializes as a JSON array with `null` for undefined positions.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSeries<T = Price> {
    values: Vec<Option<T>>,
}

impl<T: Copy> IndicatorSeries<T> {
    #[must_use]
    pub fn new(values: Vec<Option<T>>) -> Self {
        Self { values }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` when undefined or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the latest position, if defined.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.last().copied().flatten()
    }

    /// Latest value, failing when it is undefined.
    ///
    /// For callers that need a guaranteed value rather than the "undefined"
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] when the series is empty or its
    /// latest position is undefined. `required` reports one past the index of
    /// the first defined value, or the series length plus one when nothing is
    /// defined.
    pub fn require_last(&self) -> Result<T> {
        self.last().ok_or_else(|| {
            let first_defined = self.values.iter().position(Option::is_some);
            Error::InsufficientData {
                required: first_defined.map_or(self.len() + 1, |i| i + 1),
                available: self.len(),
            }
        })
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.values.iter().copied()
    }

    /// Defined values in order, skipping undefined positions.
    #[inline]
    pub fn defined(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    /// Number of defined positions.
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.values
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<T>> {
        self.values
    }

    /// Applies `f` to every defined value, keeping undefined positions.
    #[must_use]
    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> IndicatorSeries<U> {
        self.values.iter().map(|v| v.map(&mut f)).collect()
    }
}

impl<T> Index<usize> for IndicatorSeries<T> {
    type Output = Option<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl<T> FromIterator<Option<T>> for IndicatorSeries<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<Option<T>>> for IndicatorSeries<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        Self { values }
    }
}

impl<T> IntoIterator for IndicatorSeries<T> {
    type Item = Option<T>;
    type IntoIter = std::vec::IntoIter<Option<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
