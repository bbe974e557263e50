use chrono::NaiveDateTime;
use thiserror::Error;

/// A trimmed, non-empty city name as typed by the user.
///
/// Construction goes through [`CityQuery::parse`], which rejects empty and
/// whitespace-only input before any network activity happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Trim `raw` and wrap it; returns `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geocoded location: coordinates plus the resolved display name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Canonical place name returned by the geocoder.
    pub name: String,
    /// Country name; empty when the geocoder omits it.
    pub country: String,
}

/// Current conditions as reported by a weather provider, before they are
/// attached to a resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_kmh: f64,
    /// WMO weather code; interpreted via [`crate::wmo::lookup`].
    pub code: i32,
    /// Provider-local observation time, when the payload carries one.
    pub observed_at: Option<NaiveDateTime>,
}

/// Terminal success payload of one fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    /// "Name, Country", with the separator dropped when country is empty.
    pub location: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_kmh: f64,
    pub code: i32,
    pub observed_at: Option<NaiveDateTime>,
}

impl WeatherReading {
    pub fn from_parts(place: &GeocodeResult, conditions: CurrentConditions) -> Self {
        Self {
            location: format_location(&place.name, &place.country),
            temperature_c: conditions.temperature_c,
            feels_like_c: conditions.feels_like_c,
            humidity_pct: conditions.humidity_pct,
            wind_kmh: conditions.wind_kmh,
            code: conditions.code,
            observed_at: conditions.observed_at,
        }
    }
}

fn format_location(name: &str, country: &str) -> String {
    if country.is_empty() {
        name.to_string()
    } else {
        format!("{name}, {country}")
    }
}

/// Why a fetch cycle ended without a reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The geocoder resolved the query to no location.
    #[error("city '{city}' not found")]
    NotFound { city: String },

    /// Timeout, connection failure, or non-2xx status at either provider.
    #[error("network failure")]
    Network,

    /// Malformed payload, missing field, or any other surprise.
    #[error("unexpected failure")]
    Unexpected,
}

/// The single source of truth rendered by the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Succeeded(WeatherReading),
    Failed(FetchError),
}

impl FetchState {
    /// Whether this state ends a fetch cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Succeeded(_) | FetchState::Failed(_))
    }
}
