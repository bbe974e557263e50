//! The fetch orchestrator: one live city lookup at a time.
//!
//! Each `submit` starts an independent cycle tagged with a generation id.
//! A cycle geocodes the query, chains the weather call on the result, and
//! emits exactly one terminal [`FetchState`] — unless a newer submit has
//! superseded it, in which case its result is discarded silently. In-flight
//! calls are never aborted; staleness is decided at the emission gate.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::model::{CityQuery, FetchError, FetchState, WeatherReading};
use crate::provider::{CurrentWeatherProvider, GeocodeProvider, ProviderError};

/// Upper bound on each of the two provider calls within a cycle.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives city lookups and publishes an ordered stream of [`FetchState`]
/// transitions to its subscribers.
#[derive(Debug)]
pub struct FetchOrchestrator {
    geocoder: Arc<dyn GeocodeProvider>,
    weather: Arc<dyn CurrentWeatherProvider>,
    shared: Arc<Mutex<Shared>>,
}

/// The only mutable state shared between cycles. Generation bump + Loading
/// emission, and generation check + terminal emission, each happen under one
/// lock acquisition, which is what makes supersession race-free.
#[derive(Debug)]
struct Shared {
    generation: u64,
    latest: FetchState,
    sinks: Vec<mpsc::UnboundedSender<FetchState>>,
}

impl FetchOrchestrator {
    pub fn new(
        geocoder: Arc<dyn GeocodeProvider>,
        weather: Arc<dyn CurrentWeatherProvider>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                latest: FetchState::Idle,
                sinks: Vec::new(),
            })),
        }
    }

    /// Register an observer. Transitions arrive in emission order; the
    /// channel is unbounded so a slow consumer never blocks an emission.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<FetchState> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.shared).sinks.push(tx);
        rx
    }

    /// The most recently emitted state, `Idle` before the first submit.
    pub fn state(&self) -> FetchState {
        lock(&self.shared).latest.clone()
    }

    /// Start a fetch cycle for `raw`. Empty or whitespace-only input causes
    /// no state change. Must be called from within a tokio runtime.
    pub fn submit(&self, raw: &str) {
        let Some(query) = CityQuery::parse(raw) else {
            return;
        };

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            broadcast(&mut shared, FetchState::Loading);
            shared.generation
        };
        tracing::debug!(generation, city = %query, "starting fetch cycle");

        let geocoder = Arc::clone(&self.geocoder);
        let weather = Arc::clone(&self.weather);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let state = match run_cycle(&*geocoder, &*weather, &query).await {
                Ok(reading) => FetchState::Succeeded(reading),
                Err(err) => FetchState::Failed(err),
            };

            let mut guard = lock(&shared);
            if guard.generation == generation {
                broadcast(&mut guard, state);
            } else {
                tracing::debug!(generation, current = guard.generation, "discarding stale result");
            }
        });
    }
}

/// Run the two chained provider calls and normalize the outcome.
async fn run_cycle(
    geocoder: &dyn GeocodeProvider,
    weather: &dyn CurrentWeatherProvider,
    query: &CityQuery,
) -> Result<WeatherReading, FetchError> {
    let place = match timeout(CALL_TIMEOUT, geocoder.resolve(query.as_str())).await {
        Ok(Ok(Some(place))) => place,
        Ok(Ok(None)) => {
            return Err(FetchError::NotFound { city: query.to_string() });
        }
        Ok(Err(err)) => return Err(classify(err)),
        Err(_) => {
            tracing::warn!(city = %query, "geocoding call timed out");
            return Err(FetchError::Network);
        }
    };

    match timeout(CALL_TIMEOUT, weather.current(place.latitude, place.longitude)).await {
        Ok(Ok(conditions)) => Ok(WeatherReading::from_parts(&place, conditions)),
        Ok(Err(err)) => Err(classify(err)),
        Err(_) => {
            tracing::warn!(city = %query, "weather call timed out");
            Err(FetchError::Network)
        }
    }
}

fn classify(err: ProviderError) -> FetchError {
    match err {
        ProviderError::Transport(source) => {
            tracing::warn!(error = %source, "provider transport failure");
            FetchError::Network
        }
        ProviderError::Decode(source) => {
            tracing::warn!(error = %source, "provider returned malformed payload");
            FetchError::Unexpected
        }
    }
}

/// Record `state` as latest and fan it out, dropping closed sinks.
fn broadcast(shared: &mut Shared, state: FetchState) {
    shared.latest = state.clone();
    shared.sinks.retain(|tx| tx.send(state.clone()).is_ok());
}

fn lock(shared: &Arc<Mutex<Shared>>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
