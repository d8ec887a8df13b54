//! Image identifiers.
//!
//! An [`ImageId`] is a random UUID v4 rendered in its canonical lowercase
//! hyphenated form. It doubles as the stem of the stored file name, so the
//! rendering must stay stable.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a string is not a canonical image ID.
#[derive(Debug, Error)]
pub enum ParseImageIdError {
    /// Not a UUID at all.
    #[error("invalid image id: {0}")]
    Invalid(#[from] uuid::Error),

    /// A UUID, but not in lowercase hyphenated form.
    #[error("image id is not in canonical form: {0}")]
    NonCanonical(String),
}

/// Unique identifier for a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub Uuid);

impl ImageId {
    /// Creates a new random ID using UUID v4.
    ///
    /// Backed by the OS CSPRNG; 122 random bits make collisions negligible.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for ImageId {
    type Err = ParseImageIdError;

    /// Parses the canonical hyphenated form only.
    ///
    /// File lookups are prefix matches on this rendering, so braced, URN or
    /// simple forms would never match a stored file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::try_parse(s)?;
        if uuid.hyphenated().to_string() == s {
            Ok(Self(uuid))
        } else {
            Err(ParseImageIdError::NonCanonical(s.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
