use thiserror::Error;

/// Errors surfaced by the search / weather-loading flow.
///
/// Every variant maps to one fixed, user-facing message. Transport and decode
/// failures keep their source chain for logging, but display a generic fallback
/// so raw failure detail never reaches the user.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("The URL supplied is invalid.")]
    InvalidUrl,

    #[error("Please enter a city name.")]
    MissingCity,

    #[error("Please enter a state name.")]
    MissingState,

    #[error("The user's current location could not be found.")]
    MissingCurrentLocation,

    #[error("Please update your location authorization in settings.")]
    LocationPermissionDenied,

    #[error("Sorry, this device does not support user locations.")]
    Restricted,

    #[error("The weather service could not be reached. Please try again.")]
    Transport(#[from] reqwest::Error),

    #[error("The weather data could not be read. Please try again.")]
    Decode(#[from] serde_json::Error),

    #[error("The location service reported a failure. Please try again.")]
    Location(String),
}
