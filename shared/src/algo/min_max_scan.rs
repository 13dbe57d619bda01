//! MinMaxScan - range scanning for floating point pixel fields
//!
//! Column-density maps and rendered frames may contain NaN pixels where a
//! projection divided by an empty kernel. The scanner records the range of the
//! finite values while remembering where the first NaN sat, so callers can
//! choose between strict and lenient behaviour.

use num_traits::float::Float;
use std::fmt;
use thiserror::Error;

/// Error types for MinMaxScan operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MinMaxError {
    #[error("NaN value encountered at index {0}")]
    NaNEncountered(usize),
    #[error("No finite data provided")]
    NoData,
}

/// A scanner for minimum and maximum values in floating point data
#[derive(Debug, Clone)]
pub struct MinMaxScan<T: Float> {
    min_value: Option<T>,
    max_value: Option<T>,
    nan_index: Option<usize>,
    nan_count: usize,
}

impl<T: Float + fmt::Debug> MinMaxScan<T> {
    /// Scan a slice of values
    ///
    /// # Example
    /// ```
    /// use shared::algo::MinMaxScan;
    ///
    /// let scanner = MinMaxScan::<f64>::new(&[1.0, 5.0, 3.0, 2.0]);
    /// assert_eq!(scanner.min().unwrap(), 1.0);
    /// assert_eq!(scanner.max().unwrap(), 5.0);
    /// ```
    pub fn new(data: &[T]) -> Self {
        Self::from_values(data.iter().copied())
    }

    /// Scan any sequence of values, e.g. `array.iter().copied()`
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut min_value: Option<T> = None;
        let mut max_value: Option<T> = None;
        let mut nan_index = None;
        let mut nan_count = 0;

        for (index, value) in values.into_iter().enumerate() {
            if value.is_nan() {
                nan_index.get_or_insert(index);
                nan_count += 1;
                continue;
            }
            min_value = Some(min_value.map_or(value, |m| m.min(value)));
            max_value = Some(max_value.map_or(value, |m| m.max(value)));
        }

        Self {
            min_value,
            max_value,
            nan_index,
            nan_count,
        }
    }

    /// Minimum value, failing if any NaN was seen
    pub fn min(&self) -> Result<T, MinMaxError> {
        match self.nan_index {
            Some(index) => Err(MinMaxError::NaNEncountered(index)),
            None => self.min_value.ok_or(MinMaxError::NoData),
        }
    }

    /// Maximum value, failing if any NaN was seen
    pub fn max(&self) -> Result<T, MinMaxError> {
        match self.nan_index {
            Some(index) => Err(MinMaxError::NaNEncountered(index)),
            None => self.max_value.ok_or(MinMaxError::NoData),
        }
    }

    /// Both bounds, failing if any NaN was seen
    pub fn min_max(&self) -> Result<(T, T), MinMaxError> {
        Ok((self.min()?, self.max()?))
    }

    /// Range of the non-NaN values, ignoring any NaN entries
    pub fn lenient_min_max(&self) -> Result<(T, T), MinMaxError> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(MinMaxError::NoData),
        }
    }

    /// Check if NaN values were encountered during the scan
    pub fn has_nan(&self) -> bool {
        self.nan_index.is_some()
    }

    /// Number of NaN values encountered
    pub fn nan_count(&self) -> usize {
        self.nan_count
    }
}
