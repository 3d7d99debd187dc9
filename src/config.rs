use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{AppError, Result};

pub const WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const KP_INDEX_URL: &str = "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json";
pub const XRAY_FLUX_URL: &str = "https://services.swpc.noaa.gov/json/goes/primary/xrays-1-day.json";

pub const DEFAULT_LATITUDE: f64 = -34.77;
pub const DEFAULT_LONGITUDE: f64 = -58.17;
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// Weather and space-weather refresh period (milliseconds). 15 minutes.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 15 * 60 * 1000;

/// Clock driver period (milliseconds).
pub const CLOCK_INTERVAL_MS: u64 = 1000;

/// Per-request timeout for the upstream feeds (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Shown in a numeric slot when the value is missing or not finite.
pub const PLACEHOLDER: &str = "--";

/// Shown when a lookup or a whole feed has nothing to offer.
pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
}

impl Location {
    /// IANA name as sent to Open-Meteo (`timezone=` query parameter).
    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub location: Location,
    /// Weather / space-weather re-fetch period (REFRESH_INTERVAL_MS)
    pub refresh_interval: Duration,
    pub weather_url: String,
    pub kp_index_url: String,
    pub xray_flux_url: String,
    pub http_timeout: Duration,
    pub log_level: String,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: Location {
                latitude: DEFAULT_LATITUDE,
                longitude: DEFAULT_LONGITUDE,
                timezone: chrono_tz::America::Argentina::Buenos_Aires,
            },
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            weather_url: WEATHER_API_URL.to_string(),
            kp_index_url: KP_INDEX_URL.to_string(),
            xray_flux_url: XRAY_FLUX_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_level: "info".to_string(),
            api_port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let latitude = parse_or("LATITUDE", &lookup, defaults.location.latitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Config(format!(
                "LATITUDE must be within [-90, 90], got {latitude}"
            )));
        }
        let longitude = parse_or("LONGITUDE", &lookup, defaults.location.longitude)?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Config(format!(
                "LONGITUDE must be within [-180, 180], got {longitude}"
            )));
        }

        let timezone = match lookup("TIMEZONE") {
            Some(name) => Tz::from_str(name.trim()).map_err(|_| {
                AppError::Config(format!("TIMEZONE is not a known IANA zone: {name}"))
            })?,
            None => defaults.location.timezone,
        };

        let refresh_ms: u64 = parse_or("REFRESH_INTERVAL_MS", &lookup, DEFAULT_REFRESH_INTERVAL_MS)?;
        if refresh_ms == 0 {
            return Err(AppError::Config(
                "REFRESH_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_or("HTTP_TIMEOUT_SECS", &lookup, DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            location: Location {
                latitude,
                longitude,
                timezone,
            },
            refresh_interval: Duration::from_millis(refresh_ms),
            weather_url: lookup("WEATHER_API_URL").unwrap_or(defaults.weather_url),
            kp_index_url: lookup("KP_INDEX_URL").unwrap_or(defaults.kp_index_url),
            xray_flux_url: lookup("XRAY_FLUX_URL").unwrap_or(defaults.xray_flux_url),
            http_timeout: Duration::from_secs(timeout_secs),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            api_port: parse_or("API_PORT", &lookup, defaults.api_port)?,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}
