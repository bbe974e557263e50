use std::sync::Arc;

use clap::Parser;
use inquire::Text;
use tokio::sync::mpsc::UnboundedReceiver;

use skycast_core::provider::open_meteo::OpenMeteo;
use skycast_core::{FetchError, FetchOrchestrator, FetchState, wmo};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather for a city")]
pub struct Cli {
    /// City name. When omitted, prompts interactively; empty input exits.
    pub city: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let provider = Arc::new(OpenMeteo::new());
        let orchestrator = FetchOrchestrator::new(provider.clone(), provider);
        let mut states = orchestrator.subscribe();

        render(&orchestrator.state());
        match self.city {
            Some(city) => run_once(&orchestrator, &mut states, &city).await,
            None => loop {
                let city = match Text::new("City:").prompt() {
                    Ok(city) => city,
                    // Esc or closed input ends the session.
                    Err(_) => break,
                };
                if city.trim().is_empty() {
                    break;
                }
                run_once(&orchestrator, &mut states, &city).await;
            },
        }

        Ok(())
    }
}

/// Submit one city and render states until the cycle ends. Blank input must
/// return immediately: `submit` emits nothing for it, so waiting would hang.
async fn run_once(
    orchestrator: &FetchOrchestrator,
    states: &mut UnboundedReceiver<FetchState>,
    city: &str,
) {
    if city.trim().is_empty() {
        eprintln!("No city given.");
        return;
    }
    orchestrator.submit(city);
    render_until_terminal(states).await;
}

async fn render_until_terminal(states: &mut UnboundedReceiver<FetchState>) {
    while let Some(state) = states.recv().await {
        render(&state);
        if state.is_terminal() {
            break;
        }
    }
}

fn render(state: &FetchState) {
    match state {
        FetchState::Idle => println!("Ready for input."),
        FetchState::Loading => println!("Scanning network..."),
        FetchState::Succeeded(reading) => {
            let entry = wmo::lookup(reading.code);
            println!();
            println!("  {}  {}", entry.glyph, reading.location);
            println!("  {}°C  {}", reading.temperature_c.round() as i32, entry.description);
            println!(
                "  Feels like: {}°C | Humidity: {}%",
                reading.feels_like_c.round() as i32,
                reading.humidity_pct,
            );
            println!("  Wind: {} km/h", reading.wind_kmh);
            if let Some(observed_at) = reading.observed_at {
                println!("  Observed at {}", observed_at.format("%Y-%m-%d %H:%M"));
            }
            println!();
        }
        FetchState::Failed(error) => {
            let message = match error {
                FetchError::NotFound { city } => format!("City '{city}' not found."),
                FetchError::Network => "Network Error: Please check your connection.".to_string(),
                FetchError::Unexpected => "An unexpected error occurred.".to_string(),
            };
            println!("⚠️  {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn blank_one_shot_city_returns_instead_of_waiting() {
        // Unroutable endpoints: no request may ever be issued for blank input.
        let provider = Arc::new(OpenMeteo::with_endpoints(
            "http://127.0.0.1:9/v1/search",
            "http://127.0.0.1:9/v1/forecast",
        ));
        let orchestrator = FetchOrchestrator::new(provider.clone(), provider);
        let mut states = orchestrator.subscribe();

        tokio::time::timeout(
            Duration::from_secs(1),
            run_once(&orchestrator, &mut states, "   \t "),
        )
        .await
        .expect("blank input must finish without waiting for a state");

        assert_eq!(orchestrator.state(), FetchState::Idle);
    }
}
