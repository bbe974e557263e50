use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{CurrentConditions, GeocodeResult};

use super::{CurrentWeatherProvider, GeocodeProvider, ProviderError};

/// Default Open-Meteo geocoding endpoint.
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
/// Default Open-Meteo forecast endpoint.
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Per-request timeout for both endpoints.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Open-Meteo client implementing both provider traits. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteo {
    pub fn new() -> Self {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL)
    }

    /// Point the client at alternative endpoints (used by tests).
    pub fn with_endpoints(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }
}

impl Default for OpenMeteo {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    /// Absent when the query matched nothing.
    results: Option<Vec<GeoCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current: &'a str,
    temperature_unit: &'a str,
    wind_speed_unit: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    time: Option<String>,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[async_trait]
impl GeocodeProvider for OpenMeteo {
    async fn resolve(&self, name: &str) -> Result<Option<GeocodeResult>, ProviderError> {
        let res = self
            .http
            .get(&self.geocoding_url)
            .timeout(HTTP_TIMEOUT)
            .query(&[("name", name), ("count", "1"), ("format", "json")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Transport(anyhow!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GeoResponse = serde_json::from_str(&body)
            .context("failed to parse geocoding JSON")
            .map_err(ProviderError::Decode)?;

        let Some(mut candidates) = parsed.results else {
            return Ok(None);
        };
        if candidates.is_empty() {
            return Ok(None);
        }

        let first = candidates.remove(0);
        Ok(Some(GeocodeResult {
            latitude: first.latitude,
            longitude: first.longitude,
            name: first.name,
            country: first.country,
        }))
    }
}

#[async_trait]
impl CurrentWeatherProvider for OpenMeteo {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, ProviderError> {
        let res = self
            .http
            .get(&self.forecast_url)
            .timeout(HTTP_TIMEOUT)
            .query(&ForecastQuery {
                latitude,
                longitude,
                current: "temperature_2m,relative_humidity_2m,apparent_temperature,\
                          weather_code,wind_speed_10m",
                temperature_unit: "celsius",
                wind_speed_unit: "kmh",
            })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Transport(anyhow!(
                "weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .context("failed to parse current-weather JSON")
            .map_err(ProviderError::Decode)?;

        let observed_at = parsed
            .current
            .time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok());

        Ok(CurrentConditions {
            temperature_c: parsed.current.temperature_2m,
            feels_like_c: parsed.current.apparent_temperature,
            humidity_pct: parsed.current.relative_humidity_2m,
            wind_kmh: parsed.current.wind_speed_10m,
            code: parsed.current.weather_code,
            observed_at,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary; byte 200 may fall inside a multibyte char.
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}
