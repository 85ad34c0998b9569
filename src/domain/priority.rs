//! Range-validated task priority.

use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch priority of a task.
///
/// Priorities run from 1 through 10; higher priorities are dispatched
/// first. Tasks default to [`Priority::DEFAULT`] when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(i32);

impl Priority {
    /// Lowest accepted priority.
    pub const MIN: Self = Self(1);
    /// Highest accepted priority.
    pub const MAX: Self = Self(10);
    /// Priority assigned when a task is added without one.
    pub const DEFAULT: Self = Self(5);

    /// Creates a validated priority.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PriorityOutOfRange`] when the value is
    /// outside 1 through 10.
    pub const fn new(value: i32) -> Result<Self, DomainError> {
        if value >= Self::MIN.0 && value <= Self::MAX.0 {
            Ok(Self(value))
        } else {
            Err(DomainError::PriorityOutOfRange(value))
        }
    }

    /// Returns the numeric priority.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for Priority {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
