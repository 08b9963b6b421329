//! Typed ID wrappers.
//!
//! A [`ConversionId`] is minted once per request and names both temporary
//! artifacts of that request, so two requests arriving in the same second can
//! never share a path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionId(Uuid);

impl ConversionId {
    /// Generate a new random conversion ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Compact form without hyphens, used in file names.
    #[must_use]
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for ConversionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConversionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ConversionId> for Uuid {
    fn from(id: ConversionId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ConversionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
