use crate::adapters::http::{DEFAULT_LOTS_PATH, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SLOTS_PATH};
use crate::core::reconciler::{FOCUS_ZOOM, HOME_ZOOM};
use crate::core::scheduler::DEFAULT_POLL_INTERVAL;
use crate::domain::model::{GeoPoint, DEFAULT_POSITION};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ParkingError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub polling: Option<PollingConfig>,
    pub map: Option<MapConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub lots_path: Option<String>,
    pub slots_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub default_latitude: Option<f64>,
    pub default_longitude: Option<f64>,
    pub home_zoom: Option<f64>,
    pub focus_zoom: Option<f64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ParkingError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ParkingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PARKING_API_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ParkingError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.base_url", &self.service.base_url)?;
        validation::validate_non_empty_string("service.lots_path", self.lots_path())?;
        validation::validate_non_empty_string("service.slots_path", self.slots_path())?;

        if let Some(timeout) = self.service.timeout_seconds {
            validation::validate_positive_number("service.timeout_seconds", timeout as usize, 1)?;
        }

        if let Some(interval) = self.polling.as_ref().and_then(|p| p.interval_seconds) {
            validation::validate_positive_number("polling.interval_seconds", interval as usize, 1)?;
        }

        let position = self.default_position();
        validation::validate_latitude("map.default_latitude", position.latitude)?;
        validation::validate_longitude("map.default_longitude", position.longitude)?;
        validation::validate_range("map.home_zoom", self.home_zoom(), 1.0, 22.0)?;
        validation::validate_range("map.focus_zoom", self.focus_zoom(), 1.0, 22.0)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.service.base_url
    }

    fn lots_path(&self) -> &str {
        self.service.lots_path.as_deref().unwrap_or(DEFAULT_LOTS_PATH)
    }

    fn slots_path(&self) -> &str {
        self.service.slots_path.as_deref().unwrap_or(DEFAULT_SLOTS_PATH)
    }

    fn poll_interval(&self) -> Duration {
        self.polling
            .as_ref()
            .and_then(|p| p.interval_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    fn request_timeout(&self) -> Duration {
        self.service
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    fn default_position(&self) -> GeoPoint {
        let map = self.map.as_ref();
        GeoPoint::new(
            map.and_then(|m| m.default_latitude)
                .unwrap_or(DEFAULT_POSITION.latitude),
            map.and_then(|m| m.default_longitude)
                .unwrap_or(DEFAULT_POSITION.longitude),
        )
    }

    fn home_zoom(&self) -> f64 {
        self.map.as_ref().and_then(|m| m.home_zoom).unwrap_or(HOME_ZOOM)
    }

    fn focus_zoom(&self) -> f64 {
        self.map.as_ref().and_then(|m| m.focus_zoom).unwrap_or(FOCUS_ZOOM)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
