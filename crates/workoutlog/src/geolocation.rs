//! Geolocation abstraction.
//!
//! The session asks the host for the user's current position once, at
//! startup. The request suspends until the host answers; it cannot be
//! cancelled and is never retried.

use async_trait::async_trait;
use thiserror::Error;

use crate::workout::Coordinates;

/// Errors a geolocation provider can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The user denied access to their location.
    #[error("permission denied")]
    PermissionDenied,
}

/// A source of the user's current position.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Resolve the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if access to the position was denied.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A provider that always answers with the same position, or always denies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    position: Option<Coordinates>,
}

impl FixedPosition {
    /// A provider reporting `position`.
    #[must_use]
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// A provider that denies every request.
    #[must_use]
    pub fn denied() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::PermissionDenied)
    }
}
