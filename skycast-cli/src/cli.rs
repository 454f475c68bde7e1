use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};

use skycast_core::{
    App, AppChannels, City, Config, IconUrlProvider, Loader, Store, Temperature,
    UnavailableLocationService, ViewMode, Weather,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weather API credential.
    Configure,

    /// Show weather for a US city.
    Search {
        /// City name, e.g. "Plano".
        city: String,
        /// State name, e.g. "TX".
        state: String,
    },

    /// Show weather for the device's current location.
    Here,

    /// Interactive session: search form, weather view, repeat.
    Run,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Run) {
            Command::Configure => configure(),
            Command::Search { city, state } => {
                Session::start(load_config()?)?.search_once(&city, &state).await
            }
            Command::Here => Session::start(load_config()?)?.here_once().await,
            Command::Run => Session::start(load_config()?)?.run_interactive().await,
        }
    }
}

/// Load the startup configuration, refusing to run network commands without a
/// credential.
fn load_config() -> Result<Config> {
    let config = Config::load()?;
    if !config.api.has_api_key() {
        bail!(
            "No API key configured.\n\
             Hint: run `skycast configure` and enter your OpenWeather API key first."
        );
    }
    Ok(config)
}

/// Interactive configuration.
fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// A running orchestrator plus the channels the render layer observes.
struct Session {
    app: Arc<App>,
    channels: AppChannels,
}

impl Session {
    fn start(config: Config) -> Result<Self> {
        let loader = Loader::new(config.api.base_url.clone());
        let store = Store::open()?;
        let location = Arc::new(UnavailableLocationService);
        let (app, channels) = App::start(config.api, loader, store, location);
        Ok(Self { app, channels })
    }

    /// One-shot: run a search and render the first settled outcome.
    async fn search_once(mut self, city: &str, state: &str) -> Result<()> {
        self.app.search(city, state)?;
        self.await_outcome().await
    }

    /// One-shot: load weather for the current location.
    async fn here_once(mut self) -> Result<()> {
        self.app.load_weather_from_fix()?;
        self.await_outcome().await
    }

    /// Wait for either a state transition out of `Loading` or a chain error.
    async fn await_outcome(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                changed = self.channels.state.changed() => {
                    changed.map_err(|_| anyhow!("state channel closed"))?;
                    let mode = self.channels.state.borrow_and_update().clone();
                    if matches!(mode, ViewMode::Loading) {
                        continue;
                    }
                    render(&mode, self.app.as_ref());
                    return Ok(());
                }
                err = self.channels.errors.recv() => {
                    match err {
                        Some(err) => bail!("{err}"),
                        None => bail!("error channel closed"),
                    }
                }
            }
        }
    }

    async fn run_interactive(mut self) -> Result<()> {
        loop {
            let mode = self.channels.state.borrow_and_update().clone();
            match mode {
                ViewMode::Loading => {
                    println!("Loading...");
                    self.resolve_loading().await?;
                }
                ViewMode::Search => {
                    let (city_text, state_text) = self.app.search_text();
                    let city = inquire::Text::new("City (Required):")
                        .with_initial_value(&city_text)
                        .prompt()?;
                    let state = inquire::Text::new("State (Required):")
                        .with_initial_value(&state_text)
                        .prompt()?;
                    self.app.set_search_text(&city, &state);

                    if let Err(err) = self.app.search(&city, &state) {
                        eprintln!("{err}");
                        continue;
                    }
                    self.wait_for_outcome().await?;
                }
                ViewMode::Weather(city, weather) => {
                    render_weather(&city, &weather, self.app.as_ref());
                    let again = inquire::Confirm::new("Search for another city?")
                        .with_default(true)
                        .prompt()?;
                    if !again {
                        return Ok(());
                    }
                    self.app.show_search();
                }
            }
        }
    }

    /// Wait out `Loading`: either the state settles, or the chain behind it
    /// failed — print the error and fall back to the search form. A startup
    /// reload failure leaves the state at `Loading`, so the error channel must
    /// be watched here too.
    async fn resolve_loading(&mut self) -> Result<()> {
        tokio::select! {
            changed = self.channels.state.changed() => {
                changed.map_err(|_| anyhow!("state channel closed"))?;
            }
            err = self.channels.errors.recv() => {
                if let Some(err) = err {
                    eprintln!("{err}");
                }
                self.app.show_search();
            }
        }
        Ok(())
    }

    /// Wait for a state transition or print a chain error and fall through,
    /// leaving the state where it was.
    async fn wait_for_outcome(&mut self) -> Result<()> {
        tokio::select! {
            changed = self.channels.state.changed() => {
                changed.map_err(|_| anyhow!("state channel closed"))?;
            }
            err = self.channels.errors.recv() => {
                if let Some(err) = err {
                    eprintln!("{err}");
                }
            }
        }
        Ok(())
    }
}

/// Pure projection of the presentation state.
fn render(mode: &ViewMode, icons: &dyn IconUrlProvider) {
    match mode {
        ViewMode::Loading => println!("Loading..."),
        ViewMode::Search => println!("Search weather for any US city"),
        ViewMode::Weather(city, weather) => render_weather(city, weather, icons),
    }
}

fn render_weather(city: &City, weather: &Weather, icons: &dyn IconUrlProvider) {
    println!("{}", city.name);

    let current = &weather.current;
    match current.temp.as_ref().and_then(Temperature::scalar) {
        Some(temp) => println!("  {temp:.0}°"),
        None => println!("  N/A"),
    }
    if let Some(conditions) = current.conditions() {
        match icons.icon_url(&conditions.icon) {
            Some(url) => println!("  {} ({url})", conditions.description),
            None => println!("  {}", conditions.description),
        }
    }

    println!();
    println!("Hourly:");
    for forecast in weather.hourly.iter().take(4) {
        let description = forecast
            .conditions()
            .map(|c| c.description.as_str())
            .unwrap_or("N/A");
        match forecast.temp.as_ref().and_then(Temperature::scalar) {
            Some(temp) => println!("  {:>4}  {temp:.0}°  {description}", forecast.hour()),
            None => println!("  {:>4}   N/A  {description}", forecast.hour()),
        }
    }

    println!();
    println!("Daily:");
    for forecast in &weather.daily {
        match forecast.temp.as_ref().and_then(Temperature::range) {
            Some(range) => println!(
                "  {:<9}  {:.0}° Lo  {:.0}° Hi",
                forecast.day_name(),
                range.min,
                range.max
            ),
            None => println!("  {:<9}  N/A", forecast.day_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skycast_core::{ApiConfig, City, Fetch, SearchError, Store};
    use std::time::Duration;
    use url::Url;

    struct FailingFetch;

    #[async_trait]
    impl Fetch for FailingFetch {
        async fn fetch(&self, _url: Url) -> Result<Vec<u8>, SearchError> {
            Err(SearchError::Location("offline".to_string()))
        }
    }

    fn session_with_saved_city(dir: &std::path::Path) -> Session {
        let store = Store::at(dir);
        store
            .save_city(&City {
                name: "Plano".to_string(),
                lat: 33.0198,
                lon: -96.6989,
                weather: None,
            })
            .expect("save");

        let api = ApiConfig {
            api_key: "test-key".to_string(),
            ..ApiConfig::default()
        };
        let loader = Loader::with_transport("https://api.test", Arc::new(FailingFetch));
        let (app, channels) = App::start(api, loader, store, Arc::new(UnavailableLocationService));
        Session { app, channels }
    }

    #[tokio::test]
    async fn failed_startup_reload_falls_back_to_the_search_form() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_saved_city(dir.path());
        assert!(matches!(*session.channels.state.borrow(), ViewMode::Loading));

        tokio::time::timeout(Duration::from_secs(2), session.resolve_loading())
            .await
            .expect("loading must settle instead of hanging")
            .expect("resolve ok");

        assert!(matches!(*session.channels.state.borrow(), ViewMode::Search));
    }

    #[test]
    fn parses_configure_command() {
        let cli = Cli::try_parse_from(["skycast", "configure"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Configure)));
    }

    #[test]
    fn no_subcommand_defaults_to_the_interactive_session() {
        let cli = Cli::try_parse_from(["skycast"]).expect("parse");
        assert!(cli.command.is_none());
    }
}
