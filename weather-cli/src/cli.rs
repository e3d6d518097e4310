use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use tracing::debug;
use weather_core::{
    Config, Coordinates, Dashboard, Geolocator, Presenter, UnitSystem,
    geo::{FixedGeolocator, IpGeolocator},
};

use crate::presenter::{JsonPresenter, TerminalPresenter};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default location and units.
    Configure,

    /// Show current conditions and the forecast once.
    Show {
        /// Place name; defaults to the configured location.
        location: Option<String>,

        /// Use the device location instead of a place name.
        #[arg(long, conflicts_with = "location")]
        here: bool,

        /// Print the view model as JSON.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        opts: DashboardOpts,
    },

    /// Interactive dashboard: search, use your location, switch units.
    Interactive {
        #[command(flatten)]
        opts: DashboardOpts,
    },
}

#[derive(Debug, Args)]
pub struct DashboardOpts {
    /// "metric" or "imperial"; overrides the configured units.
    #[arg(long, value_parser = parse_units)]
    units: Option<UnitSystem>,

    /// Latitude reported as the device location.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude reported as the device location.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

impl DashboardOpts {
    fn geolocator(&self) -> anyhow::Result<Arc<dyn Geolocator>> {
        let geolocator: Arc<dyn Geolocator> = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Arc::new(FixedGeolocator(Coordinates::new(lat, lon))),
            _ => Arc::new(IpGeolocator::new()?),
        };
        Ok(geolocator)
    }

    fn dashboard(&self, presenter: Arc<dyn Presenter>) -> anyhow::Result<Dashboard> {
        let mut config = Config::load()?;
        if let Some(units) = self.units {
            config.units = units;
        }
        debug!(location = %config.default_location, units = %config.units, "loaded configuration");

        let dashboard = Dashboard::from_config(&config, presenter)?;
        Ok(dashboard.with_geolocator(self.geolocator()?))
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Search,
    CurrentLocation,
    SwitchUnits,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 5] =
        [Action::Search, Action::CurrentLocation, Action::SwitchUnits, Action::Refresh, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search for a location",
            Action::CurrentLocation => "Use my current location",
            Action::SwitchUnits => "Switch units",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

fn other_units(units: UnitSystem) -> UnitSystem {
    match units {
        UnitSystem::Metric => UnitSystem::Imperial,
        UnitSystem::Imperial => UnitSystem::Metric,
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, here, json, opts } => {
                let presenter: Arc<dyn Presenter> = if json {
                    Arc::new(JsonPresenter)
                } else {
                    Arc::new(TerminalPresenter::default())
                };
                let dashboard = opts.dashboard(presenter)?;

                let outcome = if here {
                    dashboard.use_current_location().await
                } else if let Some(location) = location {
                    dashboard.search(&location).await
                } else {
                    dashboard.startup().await
                };
                outcome?;
                Ok(())
            }
            Command::Interactive { opts } => {
                let dashboard = opts.dashboard(Arc::new(TerminalPresenter::interactive()))?;
                interactive(&dashboard).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;
    let location = Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()
        .context("Location prompt cancelled")?;
    let cursor = UnitSystem::all().iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Units:", UnitSystem::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Units prompt cancelled")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_location = location.trim().to_string();
    config.units = units;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// `None` when the user pressed Esc or Ctrl-C.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Failed actions were already shown as notices, so the loop carries on.
async fn interactive(dashboard: &Dashboard) -> anyhow::Result<()> {
    let _ = dashboard.startup().await;

    loop {
        let action = answered(Select::new("What next?", Action::ALL.to_vec()).prompt())?
            .unwrap_or(Action::Quit);
        match action {
            Action::Search => {
                // Cancelling the search goes back to the menu.
                if let Some(text) = answered(Text::new("Location:").prompt())? {
                    let _ = dashboard.search(&text).await;
                }
            }
            Action::CurrentLocation => {
                let _ = dashboard.use_current_location().await;
            }
            Action::SwitchUnits => {
                let next = other_units(dashboard.state().units());
                let _ = dashboard.switch_units(next).await;
            }
            Action::Refresh => {
                let city = dashboard.state().last_city().to_string();
                let _ = dashboard.search(&city).await;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}
