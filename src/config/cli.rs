use crate::domain::model::GeoPoint;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "parking-sync")]
#[command(about = "Live parking occupancy on a map, refreshed while the view is active")]
pub struct CliConfig {
    #[arg(long, default_value = "http://127.0.0.1:8080/")]
    pub base_url: String,

    #[arg(long, default_value = "api/parking/lots")]
    pub lots_path: String,

    #[arg(long, default_value = "api/parking/slots")]
    pub slots_path: String,

    #[arg(long, default_value = "5")]
    pub poll_interval_secs: u64,

    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,

    #[arg(long, default_value = "48.8566", allow_hyphen_values = true)]
    pub default_latitude: f64,

    #[arg(long, default_value = "2.3522", allow_hyphen_values = true)]
    pub default_longitude: f64,

    #[arg(long, default_value = "12.0")]
    pub home_zoom: f64,

    #[arg(long, default_value = "15.0")]
    pub focus_zoom: f64,

    #[arg(long, help = "Stop after this many seconds instead of waiting for Ctrl-C")]
    pub run_for_secs: Option<u64>,

    #[arg(long, help = "Load settings from a TOML file instead of the flags above")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lots_path(&self) -> &str {
        &self.lots_path
    }

    fn slots_path(&self) -> &str {
        &self.slots_path
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn default_position(&self) -> GeoPoint {
        GeoPoint::new(self.default_latitude, self.default_longitude)
    }

    fn home_zoom(&self) -> f64 {
        self.home_zoom
    }

    fn focus_zoom(&self) -> f64 {
        self.focus_zoom
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_non_empty_string("lots_path", &self.lots_path)?;
        validation::validate_non_empty_string("slots_path", &self.slots_path)?;
        validation::validate_positive_number("poll_interval_secs", self.poll_interval_secs as usize, 1)?;
        validation::validate_positive_number("request_timeout_secs", self.request_timeout_secs as usize, 1)?;
        validation::validate_latitude("default_latitude", self.default_latitude)?;
        validation::validate_longitude("default_longitude", self.default_longitude)?;
        validation::validate_range("home_zoom", self.home_zoom, 1.0, 22.0)?;
        validation::validate_range("focus_zoom", self.focus_zoom, 1.0, 22.0)?;
        Ok(())
    }
}
