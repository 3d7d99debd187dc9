use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::api::HealthState;
use crate::clock::ClockDriver;
use crate::config::{Config, CLOCK_INTERVAL_MS};
use crate::display::DisplaySink;
use crate::fetcher::{AstronomyFetcher, SpaceWeatherFetcher, WeatherFetcher};
use crate::scheduler::Scheduler;

/// Starts the clock, runs all three fetchers once, and keeps weather and
/// space weather on the refresh interval. Astronomy is fetched at startup only.
pub fn start(
    cfg: &Config,
    client: reqwest::Client,
    sink: Arc<dyn DisplaySink>,
    health: Arc<HealthState>,
) -> Scheduler {
    let mut scheduler = Scheduler::new();

    let clock = ClockDriver::new(cfg.location.timezone, Arc::clone(&sink));
    scheduler.spawn_periodic(
        "clock",
        Duration::from_millis(CLOCK_INTERVAL_MS),
        move || {
            clock.tick(Utc::now());
            std::future::ready(())
        },
    );

    let weather = Arc::new(WeatherFetcher::new(
        cfg,
        client.clone(),
        Arc::clone(&sink),
        Arc::clone(&health),
    ));
    scheduler.spawn_periodic("weather", cfg.refresh_interval, move || {
        let weather = Arc::clone(&weather);
        async move { weather.refresh().await }
    });

    let space_weather = Arc::new(SpaceWeatherFetcher::new(
        cfg,
        client.clone(),
        Arc::clone(&sink),
        Arc::clone(&health),
    ));
    scheduler.spawn_periodic(
        "space_weather",
        cfg.refresh_interval,
        move || {
            let space_weather = Arc::clone(&space_weather);
            async move { space_weather.refresh().await }
        },
    );

    let astronomy = AstronomyFetcher::new(cfg, client, sink, health);
    scheduler.spawn_once("astronomy", async move { astronomy.refresh().await });

    info!(
        latitude = cfg.location.latitude,
        longitude = cfg.location.longitude,
        timezone = cfg.location.timezone_name(),
        refresh_secs = cfg.refresh_interval.as_secs(),
        "Dashboard started with {} tasks",
        scheduler.task_count(),
    );
    scheduler
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::SlotStore;
    use crate::fetcher::testing;
    use crate::types::Slot;
    use axum::extract::State;
    use axum::{routing::get, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Hits {
        forecast: Arc<AtomicUsize>,
        astronomy: Arc<AtomicUsize>,
        kp: Arc<AtomicUsize>,
    }

    async fn upstream(hits: Hits) -> String {
        let router = Router::new()
            .route(
                "/v1/forecast",
                get(
                    |State(hits): State<Hits>,
                     axum::extract::Query(q): axum::extract::Query<std::collections::HashMap<String, String>>| async move {
                        hits.forecast.fetch_add(1, Ordering::SeqCst);
                        if q.get("daily").is_some_and(|d| d.contains("sunrise")) {
                            hits.astronomy.fetch_add(1, Ordering::SeqCst);
                            Json(json!({"daily": {
                                "sunrise": ["2025-03-14T07:12", "2025-03-15T07:13"],
                                "sunset": ["2025-03-14T19:31", "2025-03-15T19:29"],
                                "moonphase": [0.25, 0.28]
                            }}))
                        } else {
                            Json(json!({
                                "current": {"temperature_2m": 18.4, "relative_humidity_2m": 63,
                                            "pressure_msl": 1013.0, "wind_speed_10m": 10.0,
                                            "wind_gusts_10m": 20.0, "wind_direction_10m": 68},
                                "daily": {"temperature_2m_max": [24.0, 21.0], "temperature_2m_min": [15.0, 12.0],
                                          "wind_speed_10m_max": [20.0, 26.0], "wind_gusts_10m_max": [41.0, 52.0],
                                          "weathercode": [0, 3]}
                            }))
                        }
                    },
                ),
            )
            .route(
                "/kp",
                get(|State(hits): State<Hits>| async move {
                    hits.kp.fetch_add(1, Ordering::SeqCst);
                    Json(json!([{"kp_index": 2}]))
                }),
            )
            .route("/xray", get(|| async { Json(json!([{"flux": 0.03}])) }))
            .with_state(hits);
        testing::serve(router).await
    }

    fn config_for(base: &str, refresh: Duration) -> Config {
        Config {
            weather_url: format!("{base}/v1/forecast"),
            kp_index_url: format!("{base}/kp"),
            xray_flux_url: format!("{base}/xray"),
            refresh_interval: refresh,
            ..Config::default()
        }
    }

    async fn wait_for(store: &SlotStore, slots: &[Slot]) {
        for _ in 0..100 {
            if slots.iter().all(|s| store.get(*s).is_some()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("slots never populated: {slots:?}");
    }

    #[tokio::test]
    async fn startup_populates_every_feed() {
        let base = upstream(Hits::default()).await;
        let store = SlotStore::new();
        let health = Arc::new(HealthState::new());
        let scheduler = start(
            &config_for(&base, Duration::from_secs(900)),
            testing::client(),
            store.clone(),
            Arc::clone(&health),
        );
        assert_eq!(scheduler.task_count(), 4);

        wait_for(
            &store,
            &[Slot::DateUtc, Slot::ForecastTomorrow, Slot::Windows, Slot::SunsetTomorrow],
        )
        .await;
        assert_eq!(store.text(Slot::Temperature).as_deref(), Some("18 °C"));
        assert_eq!(store.text(Slot::MoonPhaseToday).as_deref(), Some("first quarter"));
        assert_eq!(store.text(Slot::KIndex).as_deref(), Some("2"));
        assert!(health.report().astronomy.last_ok_ns.is_some());

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn only_weather_and_space_weather_repeat() {
        let hits = Hits::default();
        let base = upstream(hits.clone()).await;
        let store = SlotStore::new();
        let scheduler = start(
            &config_for(&base, Duration::from_millis(50)),
            testing::client(),
            store.clone(),
            Arc::new(HealthState::new()),
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.shutdown().await;

        assert!(hits.kp.load(Ordering::SeqCst) >= 3);
        assert!(hits.forecast.load(Ordering::SeqCst) >= 4);
        assert_eq!(hits.astronomy.load(Ordering::SeqCst), 1);
        assert_eq!(store.text(Slot::SunriseTomorrow).as_deref(), Some("07:13"));

        let after = hits.kp.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.kp.load(Ordering::SeqCst), after);
    }
}
