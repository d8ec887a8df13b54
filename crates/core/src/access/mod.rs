//! Shared-secret access gate.
//!
//! A single optional credential is fixed at start-up. Without one the service
//! is open to everyone; with one, every request must present it.

use sha2::{Digest, Sha256};

/// Validates request credentials against the configured secret.
#[derive(Clone, Default)]
pub struct AccessGate {
    credential: Option<String>,
}

impl AccessGate {
    /// Create a gate. An empty credential leaves the gate open.
    #[must_use]
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: credential.filter(|c| !c.is_empty()),
        }
    }

    /// A gate that admits every request.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether no credential is configured.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.credential.is_none()
    }

    /// Check a request's credential.
    #[must_use]
    pub fn check(&self, provided: Option<&str>) -> bool {
        check(provided, self.credential.as_deref())
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Check `provided` against `configured`.
///
/// An unset `configured` admits everything. Otherwise both values are hashed
/// and the digests compared without early exit, so response timing does not
/// reveal how much of a guess matched.
#[must_use]
pub fn check(provided: Option<&str>, configured: Option<&str>) -> bool {
    let Some(configured) = configured else {
        return true;
    };
    let Some(provided) = provided else {
        return false;
    };

    let expected = Sha256::digest(configured.as_bytes());
    let actual = Sha256::digest(provided.as_bytes());

    expected
        .iter()
        .zip(actual.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
