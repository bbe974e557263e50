use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{CurrentConditions, GeocodeResult};

pub mod open_meteo;

/// How a provider call went wrong, from the orchestrator's point of view.
///
/// The payload is an `anyhow::Error` so implementations can attach whatever
/// context they have; the orchestrator only branches on the variant.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Timeout, connection failure, or non-2xx status.
    #[error("transport failure")]
    Transport(#[source] anyhow::Error),

    /// The response body did not match the expected shape.
    #[error("malformed provider response")]
    Decode(#[source] anyhow::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.into())
        } else {
            ProviderError::Transport(err.into())
        }
    }
}

/// Resolves a city name to coordinates.
///
/// `Ok(None)` means the provider answered but found no matching location;
/// that is an in-contract answer, not an error.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    async fn resolve(&self, name: &str) -> Result<Option<GeocodeResult>, ProviderError>;
}

/// Fetches current conditions for a coordinate pair.
#[async_trait]
pub trait CurrentWeatherProvider: Send + Sync + Debug {
    async fn current(&self, latitude: f64, longitude: f64)
        -> Result<CurrentConditions, ProviderError>;
}
