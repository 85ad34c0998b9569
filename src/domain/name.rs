//! Validated queue name type.

use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a queue name, matching the storage CHECK constraint.
const MAX_NAME_LENGTH: usize = 255;

/// Validated queue identifier.
///
/// Queue names are unique human-readable identifiers for task queues
/// (e.g. `docs-rewrite`, `ingest.backfill_2026`). Only letters, digits,
/// `-`, `_`, and `.` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    /// Creates a validated queue name.
    ///
    /// The input is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyQueueName`] when the value is empty
    /// after trimming, [`DomainError::QueueNameTooLong`] when it exceeds
    /// 255 characters, or [`DomainError::InvalidQueueName`] when it
    /// contains characters outside `[A-Za-z0-9._-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DomainError::EmptyQueueName);
        }

        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(DomainError::QueueNameTooLong(raw));
        }

        let is_valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !is_valid {
            return Err(DomainError::InvalidQueueName(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the queue name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
