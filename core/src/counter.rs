//! Bounded integer register used for health, payload, and tick budgets.

use crate::CoreError;

/// A bounded integer whose value always stays within `[0, max]`.
///
/// Every mutation clamps instead of failing, so callers can apply damage or
/// payload deltas without checking bounds first. `reset` restores the value
/// supplied at construction, which need not be zero or the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counter {
    value: i64,
    start: i64,
    max: Option<i64>,
}

impl Counter {
    /// Creates a counter bounded by `max`, starting at `start`.
    pub fn new(start: i64, max: i64) -> Result<Self, CoreError> {
        if start < 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "counter start {start} is negative"
            )));
        }
        if max < start {
            return Err(CoreError::InvalidConfiguration(format!(
                "counter maximum {max} is below its start {start}"
            )));
        }

        Ok(Self {
            value: start,
            start,
            max: Some(max),
        })
    }

    /// Creates a counter with no upper bound.
    pub fn unbounded(start: i64) -> Result<Self, CoreError> {
        if start < 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "counter start {start} is negative"
            )));
        }

        Ok(Self {
            value: start,
            start,
            max: None,
        })
    }

    /// Current value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.value
    }

    /// Upper bound, or `None` when unbounded.
    #[must_use]
    pub const fn max(&self) -> Option<i64> {
        self.max
    }

    /// Value restored by [`Counter::reset`].
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Stores `value`, clamped into range.
    pub fn set(&mut self, value: i64) {
        let floored = value.max(0);
        self.value = match self.max {
            Some(max) => floored.min(max),
            None => floored,
        };
    }

    /// Adds `delta` to the current value, clamped into range.
    pub fn count(&mut self, delta: i64) {
        self.set(self.value.saturating_add(delta));
    }

    /// Restores the construction-time value.
    pub fn reset(&mut self) {
        self.value = self.start;
    }

    /// Whether the value has reached zero.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.value == 0
    }

    /// Whether the value has reached a finite maximum.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max.map_or(false, |max| self.value >= max)
    }
}
