//! The search / location orchestrator.
//!
//! Drives the search → geocode → fetch-weather → persist → render-state flow.
//! The orchestrator is the single writer over the presentation state, the
//! current location fix, and the persisted-city slot. Every network-bound
//! operation runs as one fire-and-forget task; validation errors return
//! synchronously, chain errors go to the error channel. There is no
//! cancellation: overlapping chains race and the last completion wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::Error as _;
use tokio::sync::{mpsc, watch};
use url::Url;

use crate::config::ApiConfig;
use crate::endpoint::{self, Endpoint};
use crate::error::SearchError;
use crate::loader::Loader;
use crate::location::{AuthorizationStatus, Coordinates, LocationEvent, LocationService};
use crate::model::{City, Weather};
use crate::store::Store;

/// What the render layer should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Loading,
    Weather(City, Weather),
    Search,
}

/// Capability the render layer uses to resolve icon identifiers to asset URLs.
pub trait IconUrlProvider {
    fn icon_url(&self, name: &str) -> Option<Url>;
}

/// Channels the render layer consumes: the presentation state, and errors from
/// chains that had already returned to their caller when they failed.
pub struct AppChannels {
    pub state: watch::Receiver<ViewMode>,
    pub errors: mpsc::UnboundedReceiver<SearchError>,
}

#[derive(Debug, Default)]
struct SearchText {
    city: String,
    state: String,
}

/// The orchestrator.
pub struct App {
    api: ApiConfig,
    loader: Loader,
    store: Store,
    location: Arc<dyn LocationService>,
    state_tx: watch::Sender<ViewMode>,
    error_tx: mpsc::UnboundedSender<SearchError>,
    current_fix: Mutex<Option<Coordinates>>,
    search_text: Mutex<SearchText>,
}

impl App {
    /// Construct the orchestrator and perform the startup transitions: reload
    /// the persisted city when one exists (initial state `Loading`), otherwise
    /// show the search form; then wire up the location service.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(
        api: ApiConfig,
        loader: Loader,
        store: Store,
        location: Arc<dyn LocationService>,
    ) -> (Arc<Self>, AppChannels) {
        let saved = store.saved_city();
        let initial = if saved.is_some() {
            ViewMode::Loading
        } else {
            ViewMode::Search
        };
        let (state_tx, state_rx) = watch::channel(initial);
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let app = Arc::new(Self {
            api,
            loader,
            store,
            location,
            state_tx,
            error_tx,
            current_fix: Mutex::new(None),
            search_text: Mutex::new(SearchText::default()),
        });

        if let Some(city) = saved {
            app.spawn_weather_load(city);
        }

        match app.location.authorization_status() {
            AuthorizationStatus::NotDetermined => app.location.request_authorization(),
            AuthorizationStatus::AuthorizedAlways => app.location.request_location(),
            _ => {}
        }

        (
            app,
            AppChannels {
                state: state_rx,
                errors: error_rx,
            },
        )
    }

    /// Search for a city by name and state, then load its forecast.
    ///
    /// Both names must be non-empty; the city check comes first. Validation
    /// errors return synchronously before any network call. Everything later in
    /// the chain is reported on the error channel, leaving the state unchanged.
    pub fn search(self: &Arc<Self>, city_name: &str, state_name: &str) -> Result<(), SearchError> {
        if city_name.is_empty() {
            return Err(SearchError::MissingCity);
        }
        if state_name.is_empty() {
            return Err(SearchError::MissingState);
        }

        self.spawn_city_chain(Endpoint::search(&self.api, city_name, state_name));
        Ok(())
    }

    /// Load the forecast for the device's current location.
    ///
    /// The authorization check precedes the fix check. With no fix held, a
    /// one-shot location request is issued and the call fails with
    /// [`SearchError::MissingCurrentLocation`]; the eventual fix arrives as a
    /// [`LocationEvent`] and must be re-submitted by the caller.
    pub fn load_weather_from_fix(self: &Arc<Self>) -> Result<(), SearchError> {
        match self.location.authorization_status() {
            AuthorizationStatus::Denied => return Err(SearchError::LocationPermissionDenied),
            AuthorizationStatus::Restricted => return Err(SearchError::Restricted),
            _ => {}
        }

        let fix = *lock(&self.current_fix);
        let Some(fix) = fix else {
            self.location.request_location();
            return Err(SearchError::MissingCurrentLocation);
        };

        self.spawn_city_chain(Endpoint::reverse_geocode(&self.api, fix.lat, fix.lon));
        Ok(())
    }

    /// Handle one event from the location service.
    pub fn handle_location_event(self: &Arc<Self>, event: LocationEvent) {
        match event {
            LocationEvent::AuthorizationChanged(status) => {
                if status.is_authorized() {
                    self.location.request_location();
                } else {
                    *lock(&self.current_fix) = None;
                }
            }
            LocationEvent::Updated(fix) => {
                *lock(&self.current_fix) = Some(fix);
                // Load from the current location automatically only the first
                // time "always" access is granted.
                if self.location.authorization_status() == AuthorizationStatus::AuthorizedAlways
                    && !self.store.initial_location_load_done()
                {
                    if let Err(err) = self.store.mark_initial_location_load() {
                        tracing::warn!("failed to persist initial-location-load flag: {err:#}");
                    }
                    let _ = self.load_weather_from_fix();
                }
            }
            LocationEvent::Failed(reason) => self.report(SearchError::Location(reason)),
        }
    }

    /// Forward location events from a channel into the orchestrator.
    pub fn drive_location_events(
        self: &Arc<Self>,
        mut events: mpsc::UnboundedReceiver<LocationEvent>,
    ) {
        let app = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                app.handle_location_event(event);
            }
        });
    }

    /// Return to the search form.
    pub fn show_search(&self) {
        self.set_mode(ViewMode::Search);
    }

    /// Transient search-form field contents, cleared on every successful load.
    pub fn search_text(&self) -> (String, String) {
        let text = lock(&self.search_text);
        (text.city.clone(), text.state.clone())
    }

    pub fn set_search_text(&self, city: &str, state: &str) {
        let mut text = lock(&self.search_text);
        text.city = city.to_string();
        text.state = state.to_string();
    }

    fn spawn_city_chain(self: &Arc<Self>, geocode: Endpoint) {
        let app = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = async {
                let city = app.city_from(&geocode).await?;
                app.load_weather_for(city).await
            }
            .await;
            if let Err(err) = outcome {
                app.report(err);
            }
        });
    }

    fn spawn_weather_load(self: &Arc<Self>, city: City) {
        let app = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = app.load_weather_for(city).await {
                app.report(err);
            }
        });
    }

    /// Geocode step: first record of a geocode response, bounds-checked.
    async fn city_from(&self, geocode: &Endpoint) -> Result<City, SearchError> {
        let cities: Vec<City> = self.loader.load(geocode).await?;
        let city = cities.into_iter().next().ok_or(SearchError::MissingCity)?;
        if !city.has_valid_coordinates() {
            return Err(SearchError::Decode(serde_json::Error::custom(
                "geocode coordinates out of range",
            )));
        }
        Ok(city)
    }

    /// Fetch, persist, and publish the forecast for a city.
    async fn load_weather_for(&self, city: City) -> Result<(), SearchError> {
        let weather: Weather = self
            .loader
            .load(&Endpoint::weather(&self.api, city.lat, city.lon))
            .await?;

        self.reset_search_text();
        if let Err(err) = self.store.save_city(&city) {
            tracing::warn!("failed to persist city: {err:#}");
        }
        tracing::info!(city = %city.name, "weather loaded");
        self.set_mode(ViewMode::Weather(city, weather));
        Ok(())
    }

    fn set_mode(&self, mode: ViewMode) {
        self.state_tx.send_replace(mode);
    }

    fn report(&self, err: SearchError) {
        tracing::debug!("chain failed: {err}");
        let _ = self.error_tx.send(err);
    }

    fn reset_search_text(&self) {
        *lock(&self.search_text) = SearchText::default();
    }
}

impl IconUrlProvider for App {
    fn icon_url(&self, name: &str) -> Option<Url> {
        endpoint::icon_url(&self.api.icon_base_url, name).ok()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
