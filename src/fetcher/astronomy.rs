use std::sync::Arc;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::HealthState;
use crate::config::{Config, Location};
use crate::display::DisplaySink;
use crate::error::Result;
use crate::fetcher::get_json;
use crate::format::{format_hour_minute, moon_phase_text};
use crate::types::{AstronomySnapshot, Slot};

const DAILY_FIELDS: &str = "sunrise,sunset,moonphase";

#[derive(Debug, Deserialize)]
struct AstronomyResponse {
    daily: AstronomyDaily,
}

#[derive(Debug, Deserialize)]
struct AstronomyDaily {
    sunrise: Vec<Option<String>>,
    sunset: Vec<Option<String>>,
    #[serde(default)]
    moonphase: Vec<Option<f64>>,
}

impl From<AstronomyResponse> for AstronomySnapshot {
    fn from(resp: AstronomyResponse) -> Self {
        let d = resp.daily;
        let text_at = |v: &[Option<String>], i: usize| v.get(i).cloned().flatten();
        let num_at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();
        Self {
            sunrise: [text_at(&d.sunrise, 0), text_at(&d.sunrise, 1)],
            sunset: [text_at(&d.sunset, 0), text_at(&d.sunset, 1)],
            moon_phase: [num_at(&d.moonphase, 0), num_at(&d.moonphase, 1)],
        }
    }
}

/// Sunrise/sunset for today and tomorrow and today's moon phase. A failed
/// cycle writes nothing.
pub struct AstronomyFetcher {
    client: reqwest::Client,
    url: String,
    location: Location,
    sink: Arc<dyn DisplaySink>,
    health: Arc<HealthState>,
}

impl AstronomyFetcher {
    pub fn new(
        cfg: &Config,
        client: reqwest::Client,
        sink: Arc<dyn DisplaySink>,
        health: Arc<HealthState>,
    ) -> Self {
        Self {
            client,
            url: cfg.weather_url.clone(),
            location: cfg.location.clone(),
            sink,
            health,
        }
    }

    pub async fn refresh(&self) {
        match self.fetch().await {
            Ok(snapshot) => {
                self.health.astronomy.record_ok();
                publish(&snapshot, self.location.timezone, self.sink.as_ref());
                info!(
                    sunrise = ?snapshot.sunrise[0],
                    sunset = ?snapshot.sunset[0],
                    "Astronomy refreshed",
                );
            }
            Err(e) => {
                self.health.astronomy.record_error();
                error!("Astronomy fetch failed, keeping previous values: {e}");
            }
        }
    }

    pub async fn fetch(&self) -> Result<AstronomySnapshot> {
        let query = [
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", self.location.timezone_name().to_string()),
        ];
        let resp: AstronomyResponse = get_json(&self.client, &self.url, &query).await?;
        Ok(resp.into())
    }
}

/// Tomorrow's moon phase is fetched but has no slot.
pub fn publish(snapshot: &AstronomySnapshot, tz: Tz, sink: &dyn DisplaySink) {
    sink.set(Slot::SunriseToday, format_hour_minute(snapshot.sunrise[0].as_deref(), tz));
    sink.set(Slot::SunsetToday, format_hour_minute(snapshot.sunset[0].as_deref(), tz));
    sink.set(Slot::MoonPhaseToday, moon_phase_text(snapshot.moon_phase[0]).to_string());

    sink.set(Slot::SunriseTomorrow, format_hour_minute(snapshot.sunrise[1].as_deref(), tz));
    sink.set(Slot::SunsetTomorrow, format_hour_minute(snapshot.sunset[1].as_deref(), tz));
}
