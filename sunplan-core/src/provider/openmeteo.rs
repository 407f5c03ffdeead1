use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    Config,
    model::{Forecast, ForecastRequest, HourlyForecast, Location},
    provider::{ProviderId, group_by_local_date},
};

use super::{ForecastProvider, truncate_body};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("sunplan/", env!("CARGO_PKG_VERSION"));
const MAX_FORECAST_DAYS: u8 = 16;

/// Open-Meteo hourly forecast; free and keyless.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoProvider {
    pub fn new() -> Result<Self> {
        Self::with_urls(FORECAST_URL, GEOCODING_URL)
    }

    /// Point the provider at other endpoints (mirrors, test servers).
    pub fn with_urls(forecast_url: impl Into<String>, geocoding_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self {
            http,
            forecast_url: forecast_url.into(),
            geocoding_url: geocoding_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider_cfg = config.provider_config(ProviderId::OpenMeteo);
        let forecast_url = provider_cfg
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| FORECAST_URL.to_string());
        let geocoding_url = provider_cfg
            .and_then(|c| c.geocoding_url.clone())
            .unwrap_or_else(|| GEOCODING_URL.to_string());

        Self::with_urls(forecast_url, geocoding_url)
    }

    /// Resolve a city name to coordinates. `Ok(None)` when nothing matches.
    pub async fn geocode(&self, city: &str) -> Result<Option<Location>> {
        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[("name", city), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmGeocodeResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        let location = parsed.results.into_iter().next().map(|r| {
            let name = match r.country.filter(|c| !c.is_empty()) {
                Some(country) => format!("{}, {}", r.name, country),
                None => r.name,
            };
            Location {
                latitude: r.latitude,
                longitude: r.longitude,
                name: Some(name),
            }
        });

        debug!(city, found = location.is_some(), "Geocoded city");
        Ok(location)
    }

    async fn fetch_hourly(&self, request: &ForecastRequest) -> Result<OmForecastResponse> {
        let days = request.days.clamp(1, MAX_FORECAST_DAYS);

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", request.location.latitude.to_string()),
                ("longitude", request.location.longitude.to_string()),
                ("hourly", "uv_index,temperature_2m,weather_code".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", days.to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (hourly forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    timezone: Option<String>,
    hourly: OmHourly,
}

#[derive(Debug, Deserialize)]
struct OmGeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmGeocodeResponse {
    #[serde(default)]
    results: Vec<OmGeocodeResult>,
}

impl OmHourly {
    /// Zip the column arrays into rows; short columns leave gaps as `None`.
    fn into_hours(self) -> Vec<HourlyForecast> {
        self.time
            .into_iter()
            .enumerate()
            .map(|(i, time)| HourlyForecast {
                time,
                uv: self.uv_index.get(i).copied().flatten(),
                condition: self
                    .weather_code
                    .get(i)
                    .copied()
                    .flatten()
                    .map(describe_weather_code)
                    .unwrap_or("Unknown")
                    .to_string(),
                temp_c: self.temperature_2m.get(i).copied().flatten(),
            })
            .collect()
    }
}

/// Text for a WMO weather code as reported by Open-Meteo.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing Rime Fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Dense Freezing Drizzle",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",
        71 => "Slight Snow",
        73 => "Moderate Snow",
        75 => "Heavy Snow",
        77 => "Snow Grains",
        80 => "Slight Rain Showers",
        81 => "Moderate Rain Showers",
        82 => "Violent Rain Showers",
        85 => "Slight Snow Showers",
        86 => "Heavy Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with Slight Hail",
        99 => "Thunderstorm with Heavy Hail",
        _ => "Unknown",
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn forecast(&self, request: &ForecastRequest) -> Result<Forecast> {
        let parsed = self.fetch_hourly(request).await?;
        let timezone = parsed.timezone.unwrap_or_default();
        let days = group_by_local_date(parsed.hourly.into_hours());

        info!(
            days = days.len(),
            timezone = %timezone,
            location = %request.location.display_name(),
            "Fetched Open-Meteo forecast"
        );

        Ok(Forecast {
            provider: ProviderId::OpenMeteo.to_string(),
            location_name: request.location.display_name(),
            days,
        })
    }
}
