//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Shared domain models (queries, readings, fetch states)
//! - Abstraction over the geocoding and current-weather providers
//! - The fetch orchestrator that drives one city lookup at a time
//! - The WMO weather-code catalog
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod wmo;

pub use model::{CityQuery, CurrentConditions, FetchError, FetchState, GeocodeResult, WeatherReading};
pub use orchestrator::FetchOrchestrator;
pub use provider::{CurrentWeatherProvider, GeocodeProvider, ProviderError};
