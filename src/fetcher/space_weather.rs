use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::HealthState;
use crate::config::{Config, NO_DATA, PLACEHOLDER};
use crate::display::DisplaySink;
use crate::error::Result;
use crate::fetcher::get_json;
use crate::propagation::{a_index_proxy, all_band_statuses, estimate_muf, estimate_windows, sfi_proxy};
use crate::types::{Slot, SpaceWeatherSnapshot};

/// Kp, solar-flux proxy, MUF, band list and operating windows from the NOAA
/// SWPC feeds. A failed cycle resets the index slots to the placeholder.
pub struct SpaceWeatherFetcher {
    client: reqwest::Client,
    kp_index_url: String,
    xray_flux_url: String,
    sink: Arc<dyn DisplaySink>,
    health: Arc<HealthState>,
}

impl SpaceWeatherFetcher {
    pub fn new(
        cfg: &Config,
        client: reqwest::Client,
        sink: Arc<dyn DisplaySink>,
        health: Arc<HealthState>,
    ) -> Self {
        Self {
            client,
            kp_index_url: cfg.kp_index_url.clone(),
            xray_flux_url: cfg.xray_flux_url.clone(),
            sink,
            health,
        }
    }

    pub async fn refresh(&self) {
        match self.fetch().await {
            Ok(snapshot) => {
                self.health.space_weather.record_ok();
                publish(&snapshot, self.sink.as_ref());
                info!(
                    kp = snapshot.kp,
                    xray_flux = snapshot.xray_flux,
                    sfi = snapshot.sfi,
                    a_index = snapshot.a_index,
                    muf_mhz = snapshot.muf_mhz,
                    "Space weather refreshed: MUF {:.1} MHz",
                    snapshot.muf_mhz,
                );
            }
            Err(e) => {
                self.health.space_weather.record_error();
                error!("Space weather fetch failed, showing placeholders: {e}");
                publish_unavailable(self.sink.as_ref());
            }
        }
    }

    /// Both feeds must answer; either failing fails the cycle.
    pub async fn fetch(&self) -> Result<SpaceWeatherSnapshot> {
        let (kp_series, flux_series) = tokio::try_join!(
            get_json::<Value>(&self.client, &self.kp_index_url, &[]),
            get_json::<Value>(&self.client, &self.xray_flux_url, &[]),
        )?;

        let kp = latest_number(&kp_series, "kp_index");
        let flux = latest_number(&flux_series, "flux");
        debug!(kp, flux, "Latest space weather readings");
        Ok(derive(kp, flux))
    }
}

/// Numeric `field` of the last element of a JSON array. Numeric strings are
/// accepted; anything else (non-array, empty, missing, null) is NaN.
pub fn latest_number(series: &Value, field: &str) -> f64 {
    series
        .as_array()
        .and_then(|a| a.last())
        .and_then(|entry| entry.get(field))
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .unwrap_or(f64::NAN)
}

/// Every derived value for one cycle. The MUF is computed from the proxy SFI
/// and the raw Kp, so a missing Kp falls back to the estimator's default.
pub fn derive(kp: f64, xray_flux: f64) -> SpaceWeatherSnapshot {
    let sfi = sfi_proxy(xray_flux);
    let a_index = a_index_proxy(kp);
    let muf_mhz = estimate_muf(sfi, kp);
    SpaceWeatherSnapshot {
        kp,
        xray_flux,
        sfi,
        a_index,
        muf_mhz,
        bands: all_band_statuses(sfi, kp),
        windows: estimate_windows(muf_mhz, kp),
    }
}

fn number_or_placeholder(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        PLACEHOLDER.to_string()
    }
}

pub fn publish(snapshot: &SpaceWeatherSnapshot, sink: &dyn DisplaySink) {
    sink.set(Slot::KIndex, number_or_placeholder(snapshot.kp));
    sink.set(Slot::SolarFlux, number_or_placeholder(snapshot.sfi));
    sink.set(Slot::AIndex, number_or_placeholder(snapshot.a_index));
    sink.set(Slot::Muf, format!("{:.1} MHz", snapshot.muf_mhz));

    let lines = snapshot
        .bands
        .iter()
        .map(|(band, status)| format!("{}: {status}", band.label()))
        .collect();
    sink.replace_list(Slot::BandsList, lines);

    sink.set(Slot::Windows, snapshot.windows.clone());
}

/// Failure fallback. The band list is left as it was.
pub fn publish_unavailable(sink: &dyn DisplaySink) {
    for slot in [Slot::KIndex, Slot::SolarFlux, Slot::AIndex, Slot::Muf] {
        sink.set(slot, PLACEHOLDER.to_string());
    }
    sink.set(Slot::Windows, NO_DATA.to_string());
}
