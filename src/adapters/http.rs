use crate::domain::model::{Facility, GeoPoint, Slot, DEFAULT_POSITION};
use crate::domain::ports::{ConfigProvider, FacilityRepository};
use crate::utils::error::{ParkingError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_LOTS_PATH: &str = "api/parking/lots";
pub const DEFAULT_SLOTS_PATH: &str = "api/parking/slots";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
struct FacilityRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl FacilityRecord {
    fn into_facility(self, fallback: GeoPoint) -> Facility {
        let position = GeoPoint::new(
            self.latitude.unwrap_or(fallback.latitude),
            self.longitude.unwrap_or(fallback.longitude),
        );
        let facility = Facility::new(self.id, self.name, position);
        match self.address {
            Some(address) => facility.with_address(address),
            None => facility,
        }
    }
}

/// Remote parking service client. The underlying HTTP client is built on first
/// use and shared by every later request made through this repository.
pub struct HttpFacilityRepository {
    lots_url: Url,
    slots_url: Url,
    timeout: Duration,
    default_position: GeoPoint,
    client: OnceLock<Client>,
}

impl HttpFacilityRepository {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_paths(base_url, DEFAULT_LOTS_PATH, DEFAULT_SLOTS_PATH)
    }

    pub fn with_paths(base_url: &str, lots_path: &str, slots_path: &str) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            lots_url: join_endpoint(&base, "lots_path", lots_path)?,
            slots_url: join_endpoint(&base, "slots_path", slots_path)?,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            default_position: DEFAULT_POSITION,
            client: OnceLock::new(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Ok(
            Self::with_paths(config.base_url(), config.lots_path(), config.slots_path())?
                .with_timeout(config.request_timeout())
                .with_default_position(config.default_position()),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_position(mut self, position: GeoPoint) -> Self {
        self.default_position = position;
        self
    }

    pub fn lots_url(&self) -> &Url {
        &self.lots_url
    }

    pub fn slots_url(&self) -> &Url {
        &self.slots_url
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = Client::builder().timeout(self.timeout).build()?;
        tracing::debug!("HTTP client initialized (timeout {:?})", self.timeout);
        Ok(self.client.get_or_init(|| built))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client()?.get(url.clone()).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(ParkingError::HttpStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ParkingError::Parse {
            endpoint: url.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl FacilityRepository for HttpFacilityRepository {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>> {
        let records: Vec<FacilityRecord> = self.get_json(&self.lots_url).await?;
        Ok(records
            .into_iter()
            .map(|record| record.into_facility(self.default_position))
            .collect())
    }

    async fn fetch_slots(&self) -> Result<Vec<Slot>> {
        self.get_json(&self.slots_url).await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    crate::utils::validation::validate_url("base_url", base_url)?;
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).map_err(|e| ParkingError::InvalidConfigValueError {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn join_endpoint(base: &Url, field: &str, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ParkingError::InvalidConfigValueError {
            field: field.to_string(),
            value: path.to_string(),
            reason: e.to_string(),
        })
}
