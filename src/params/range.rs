//! Swept parameter ranges and their expansion into concrete value lists.

use crate::error::{EpochError, Result};

/// Relative tolerance used to decide whether `(max - min) / step` is integral.
const STEP_COUNT_EPSILON: f64 = 1e-9;

/// Largest number of values one range may expand to.
pub const MAX_RANGE_VALUES: usize = 1_000_000;

/// One swept input as written in the parameter grid: `[min, max, step]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterRange {
    pub fn new(name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            step,
        }
    }

    /// A range holding exactly one value.
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, value, 0.0)
    }

    /// Expands the range into its ascending value list.
    ///
    /// Values are `min + k * step` for `k = 0..=n`, with `n` the ceiling of
    /// `(max - min) / step`. When that ratio is not integral the last value
    /// overshoots `max`. A range with `min == max` yields one value whatever
    /// its step.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-finite bounds, `max < min`,
    /// `step < 0`, `step == 0` with `min != max`, or a step so small that
    /// the range would exceed [`MAX_RANGE_VALUES`].
    pub fn expand(&self) -> Result<ExpandedParameterRange> {
        let name = &self.name;
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(EpochError::config(format!(
                "parameter \"{name}\": bounds and step must be finite"
            )));
        }
        if self.max < self.min {
            return Err(EpochError::config(format!(
                "parameter \"{name}\": max ({}) is below min ({})",
                self.max, self.min
            )));
        }
        if self.step < 0.0 {
            return Err(EpochError::config(format!(
                "parameter \"{name}\": step ({}) must not be negative",
                self.step
            )));
        }

        if self.min == self.max {
            return Ok(ExpandedParameterRange::new(name.clone(), vec![self.min]));
        }
        if self.step == 0.0 {
            return Err(EpochError::config(format!(
                "parameter \"{name}\": step is zero but min ({}) != max ({})",
                self.min, self.max
            )));
        }

        let ratio = (self.max - self.min) / self.step;
        let rounded = ratio.round();
        let steps = if (ratio - rounded).abs() <= STEP_COUNT_EPSILON * rounded.max(1.0) {
            rounded
        } else {
            ratio.ceil()
        };
        if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
            return Err(EpochError::config(format!(
                "parameter \"{name}\": step ({}) gives more than {MAX_RANGE_VALUES} values",
                self.step
            )));
        }
        let steps = steps as usize;

        let values = (0..=steps)
            .map(|k| self.min + k as f64 * self.step)
            .collect();
        Ok(ExpandedParameterRange::new(name.clone(), values))
    }
}

/// Concrete sweep values for one parameter plus its mixed-radix weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedParameterRange {
    pub name: String,
    pub values: Vec<f64>,
    /// Size of the cartesian product of all preceding ranges.
    pub cumulative_product: u64,
}

impl ExpandedParameterRange {
    fn new(name: String, values: Vec<f64>) -> Self {
        Self {
            name,
            values,
            cumulative_product: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
