//! Location service seam.
//!
//! The platform side implements [`LocationService`] and reports authorization
//! changes, fixes, and failures as [`LocationEvent`]s on a channel the
//! orchestrator consumes, keeping a single writer over the held fix.

/// Authorization tiers, mirroring what platform location services report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

/// A location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Events a location service reports to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    AuthorizationChanged(AuthorizationStatus),
    Updated(Coordinates),
    Failed(String),
}

/// Platform location capability.
///
/// `request_location` is fire-and-request: the eventual fix, if one arrives,
/// comes back as a [`LocationEvent::Updated`] on the orchestrator's event
/// channel, never as a return value.
pub trait LocationService: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;
    fn request_authorization(&self);
    fn request_location(&self);
}

/// Fallback for hosts with no location capability: always restricted, requests
/// are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocationService;

impl LocationService for UnavailableLocationService {
    fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Restricted
    }

    fn request_authorization(&self) {}

    fn request_location(&self) {}
}
