use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use crate::api::HealthState;
use crate::config::{Config, Location, PLACEHOLDER};
use crate::display::DisplaySink;
use crate::error::Result;
use crate::fetcher::get_json;
use crate::format::{compass, format_rounded, round_half_up, weather_code_text};
use crate::types::{DailyForecast, Slot, WeatherSnapshot};

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,pressure_msl,wind_speed_10m,wind_gusts_10m,wind_direction_10m";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,wind_speed_10m_max,wind_gusts_10m_max,weathercode";

// ---------------------------------------------------------------------------
// Open-Meteo payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
    daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    pressure_msl: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
    wind_gusts_10m_max: Vec<Option<f64>>,
    #[serde(rename = "weathercode", alias = "weather_code")]
    weather_code: Vec<Option<f64>>,
}

impl DailySeries {
    fn day(&self, idx: usize) -> DailyForecast {
        let at = |series: &[Option<f64>]| series.get(idx).copied().flatten();
        DailyForecast {
            temperature_max: at(&self.temperature_2m_max),
            temperature_min: at(&self.temperature_2m_min),
            wind_speed_max: at(&self.wind_speed_10m_max),
            wind_gusts_max: at(&self.wind_gusts_10m_max),
            weather_code: at(&self.weather_code),
        }
    }
}

impl From<ForecastResponse> for WeatherSnapshot {
    fn from(resp: ForecastResponse) -> Self {
        let c = resp.current;
        Self {
            temperature: c.temperature_2m,
            humidity: c.relative_humidity_2m,
            pressure: c.pressure_msl,
            wind_speed: c.wind_speed_10m,
            wind_gusts: c.wind_gusts_10m,
            wind_direction: c.wind_direction_10m,
            days: [resp.daily.day(0), resp.daily.day(1)],
        }
    }
}

// ---------------------------------------------------------------------------
// WeatherFetcher
// ---------------------------------------------------------------------------

/// Current conditions plus today's and tomorrow's forecast. A failed cycle
/// writes nothing, so every slot keeps the last good value.
pub struct WeatherFetcher {
    client: reqwest::Client,
    url: String,
    location: Location,
    sink: Arc<dyn DisplaySink>,
    health: Arc<HealthState>,
}

impl WeatherFetcher {
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
                self.health.weather.record_ok();
                publish(&snapshot, self.sink.as_ref());
                info!(
                    temperature = ?snapshot.temperature,
                    wind_direction = ?snapshot.wind_direction,
                    "Weather refreshed",
                );
            }
            Err(e) => {
                self.health.weather.record_error();
                error!("Weather fetch failed, keeping previous values: {e}");
            }
        }
    }

    pub async fn fetch(&self) -> Result<WeatherSnapshot> {
        let query = [
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", self.location.timezone_name().to_string()),
        ];
        let resp: ForecastResponse = get_json(&self.client, &self.url, &query).await?;
        Ok(resp.into())
    }
}

/// Writes every weather slot from a snapshot.
pub fn publish(snapshot: &WeatherSnapshot, sink: &dyn DisplaySink) {
    sink.set(Slot::Temperature, format_rounded(snapshot.temperature, "°C"));
    sink.set(Slot::Humidity, format_rounded(snapshot.humidity, "%"));
    sink.set(Slot::Pressure, format_rounded(snapshot.pressure, "hPa"));
    sink.set(Slot::Wind, format_rounded(snapshot.wind_speed, "km/h"));
    sink.set(Slot::Gusts, format_rounded(snapshot.wind_gusts, "km/h"));
    sink.set(Slot::WindDirection, compass(snapshot.wind_direction));

    let [today, tomorrow] = &snapshot.days;
    sink.set(Slot::ForecastNow, weather_code_text(today.weather_code).to_string());
    sink.set(
        Slot::MinMaxTomorrow,
        format_min_max(tomorrow.temperature_min, tomorrow.temperature_max),
    );
    sink.set(Slot::WindMaxTomorrow, format_rounded(tomorrow.wind_speed_max, "km/h"));
    sink.set(Slot::GustsMaxTomorrow, format_rounded(tomorrow.wind_gusts_max, "km/h"));
    sink.set(Slot::ForecastTomorrow, weather_code_text(tomorrow.weather_code).to_string());
}

/// `"12 / 21 °C"`; either side falls back to the placeholder on its own.
fn format_min_max(min: Option<f64>, max: Option<f64>) -> String {
    let whole = |v: Option<f64>| match v.filter(|x| x.is_finite()) {
        Some(x) => (round_half_up(x) as i64).to_string(),
        None => PLACEHOLDER.to_string(),
    };
    format!("{} / {} °C", whole(min), whole(max))
}
