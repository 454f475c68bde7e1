//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Request descriptors for the weather API and its icon assets
//! - The loader seam that fetches and decodes responses
//! - Shared domain models (cities, forecasts)
//! - The search / location orchestrator and its presentation state
//!
//! It is used by `skycast-cli`, but can also be reused by other front-ends.

pub mod app;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod loader;
pub mod location;
pub mod model;
pub mod store;

pub use app::{App, AppChannels, IconUrlProvider, ViewMode};
pub use config::{ApiConfig, Config};
pub use endpoint::{Endpoint, icon_url};
pub use error::SearchError;
pub use loader::{Fetch, HttpFetch, Loader};
pub use location::{
    AuthorizationStatus, Coordinates, LocationEvent, LocationService, UnavailableLocationService,
};
pub use model::{City, Conditions, Forecast, Temperature, TemperatureRange, Weather};
pub use store::Store;
