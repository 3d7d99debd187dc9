//! Pure conversions from raw upstream values to display strings.
//!
//! Every function here is total: missing or non-finite input yields the
//! placeholder rather than an error.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::{NO_DATA, PLACEHOLDER};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2` and `2.5` becomes `3`.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// `Some(18.4), "°C"` → `"18 °C"`.
pub fn format_rounded(value: Option<f64>, unit: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{} {unit}", round_half_up(v) as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// 16-point compass label plus the rounded degrees, e.g. `"ENE (68°)"`.
pub fn compass(degrees: Option<f64>) -> String {
    let Some(deg) = degrees.filter(|d| d.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let normalized = deg.rem_euclid(360.0);
    let idx = round_half_up(normalized / 22.5) as usize % COMPASS_POINTS.len();
    format!("{} ({}°)", COMPASS_POINTS[idx], round_half_up(deg) as i64)
}

/// WMO weather interpretation code → short description.
pub fn weather_code_text(code: Option<f64>) -> &'static str {
    let Some(code) = code.filter(|c| c.is_finite() && c.fract() == 0.0) else {
        return NO_DATA;
    };
    match code as i64 {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "drizzle",
        55 => "dense drizzle",
        61 => "light rain",
        63 => "rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "freezing rain",
        71 => "light snow",
        73 => "snow",
        75 => "heavy snow",
        80 => "light rain showers",
        81 => "rain showers",
        82 => "violent rain showers",
        95 => "thunderstorm",
        96 => "thunderstorm with hail",
        99 => "severe thunderstorm with hail",
        _ => NO_DATA,
    }
}

/// Moon-phase fraction of the synodic cycle (0 = new, 0.5 = full) → label.
/// The quarter points are exact matches; everything between falls into the
/// crescent/gibbous bucket that follows it.
pub fn moon_phase_text(fraction: Option<f64>) -> &'static str {
    let Some(p) = fraction.filter(|p| p.is_finite()) else {
        return PLACEHOLDER;
    };
    if p == 0.0 {
        "new moon"
    } else if p < 0.25 {
        "waxing crescent"
    } else if p == 0.25 {
        "first quarter"
    } else if p < 0.5 {
        "waxing gibbous"
    } else if p == 0.5 {
        "full moon"
    } else if p < 0.75 {
        "waning gibbous"
    } else if p == 0.75 {
        "last quarter"
    } else {
        "waning crescent"
    }
}

/// `HH:MM` (24h) for an upstream timestamp.
///
/// Offset-less timestamps (`2024-07-15T05:30`) are already local to the
/// requested timezone and are shown as-is; RFC 3339 timestamps are converted
/// into `tz`.
pub fn format_hour_minute(iso: Option<&str>, tz: Tz) -> String {
    let Some(raw) = iso.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&tz).format("%H:%M").to_string();
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// The four clock strings derived from a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    pub local_time: String,
    pub local_date: String,
    pub utc_time: String,
    pub utc_date: String,
}

impl ClockReading {
    pub fn at(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = tz.from_utc_datetime(&now.naive_utc());
        Self {
            local_time: local.format("%H:%M:%S").to_string(),
            local_date: local.format("%d/%m/%Y").to_string(),
            utc_time: now.format("%H:%M:%S").to_string(),
            utc_date: now.format("%d/%m/%Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(18.4), 18.0);
        assert_eq!(round_half_up(18.5), 19.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn rounded_values_carry_their_unit() {
        assert_eq!(format_rounded(Some(18.4), "°C"), "18 °C");
        assert_eq!(format_rounded(Some(63.0), "%"), "63 %");
        assert_eq!(format_rounded(Some(1013.25), "hPa"), "1013 hPa");
        assert_eq!(format_rounded(Some(-0.4), "°C"), "0 °C");
    }

    #[test]
    fn missing_or_non_finite_values_use_placeholder() {
        assert_eq!(format_rounded(None, "km/h"), "--");
        assert_eq!(format_rounded(Some(f64::NAN), "km/h"), "--");
        assert_eq!(format_rounded(Some(f64::INFINITY), "km/h"), "--");
    }

    #[test]
    fn compass_labels() {
        assert_eq!(compass(Some(68.0)), "ENE (68°)");
        assert_eq!(compass(Some(0.0)), "N (0°)");
        assert_eq!(compass(Some(350.0)), "N (350°)");
        assert_eq!(compass(Some(180.0)), "S (180°)");
        assert_eq!(compass(Some(11.24)), "N (11°)");
        assert_eq!(compass(Some(11.25)), "NNE (11°)");
        assert_eq!(compass(Some(292.5)), "WNW (293°)");
        assert_eq!(compass(Some(315.0)), "NW (315°)");
        assert_eq!(compass(None), "--");
    }

    #[test]
    fn compass_is_total_over_a_full_turn() {
        let mut d = 0.0;
        while d < 360.0 {
            let label = compass(Some(d));
            let (point, rest) = label.split_once(' ').unwrap();
            assert!(COMPASS_POINTS.contains(&point), "{label}");
            assert_eq!(rest, format!("({}°)", round_half_up(d) as i64));
            d += 0.25;
        }
    }

    #[test]
    fn compass_wraps_out_of_range_degrees() {
        assert_eq!(compass(Some(-90.0)), "W (-90°)");
        assert_eq!(compass(Some(450.0)), "E (450°)");
    }

    #[test]
    fn weather_codes() {
        assert_eq!(weather_code_text(Some(0.0)), "clear sky");
        assert_eq!(weather_code_text(Some(3.0)), "overcast");
        assert_eq!(weather_code_text(Some(99.0)), "severe thunderstorm with hail");
        assert_eq!(weather_code_text(Some(4.0)), "no data");
        assert_eq!(weather_code_text(Some(3.5)), "no data");
        assert_eq!(weather_code_text(None), "no data");
    }

    #[test]
    fn moon_phase_boundaries_are_exact() {
        assert_eq!(moon_phase_text(Some(0.0)), "new moon");
        assert_eq!(moon_phase_text(Some(0.1)), "waxing crescent");
        assert_eq!(moon_phase_text(Some(0.25)), "first quarter");
        assert_eq!(moon_phase_text(Some(0.2500001)), "waxing gibbous");
        assert_eq!(moon_phase_text(Some(0.5)), "full moon");
        assert_eq!(moon_phase_text(Some(0.6)), "waning gibbous");
        assert_eq!(moon_phase_text(Some(0.75)), "last quarter");
        assert_eq!(moon_phase_text(Some(0.9)), "waning crescent");
        assert_eq!(moon_phase_text(None), "--");
        assert_eq!(moon_phase_text(Some(f64::NAN)), "--");
    }

    #[test]
    fn moon_phase_partitions_unit_interval_into_eight_labels() {
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..1000 {
            seen.insert(moon_phase_text(Some(i as f64 / 1000.0)));
        }
        assert_eq!(seen.len(), 8);
        assert!(!seen.contains("--"));
    }

    #[test]
    fn hour_minute_from_local_timestamp() {
        let tz = chrono_tz::America::Argentina::Buenos_Aires;
        assert_eq!(format_hour_minute(Some("2024-07-15T07:58"), tz), "07:58");
        assert_eq!(format_hour_minute(Some("2024-07-15T18:04:30"), tz), "18:04");
    }

    #[test]
    fn hour_minute_converts_offset_timestamps() {
        let tz = chrono_tz::America::Argentina::Buenos_Aires;
        assert_eq!(format_hour_minute(Some("2024-07-15T10:58:00Z"), tz), "07:58");
    }

    #[test]
    fn hour_minute_placeholders() {
        let tz = chrono_tz::UTC;
        assert_eq!(format_hour_minute(None, tz), "--");
        assert_eq!(format_hour_minute(Some(""), tz), "--");
        assert_eq!(format_hour_minute(Some("sunrise"), tz), "--");
    }

    #[test]
    fn clock_reading_uses_zone_and_utc() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 1, 5, 9).unwrap();
        let reading = ClockReading::at(now, chrono_tz::America::Argentina::Buenos_Aires);
        assert_eq!(reading.local_time, "22:05:09");
        assert_eq!(reading.local_date, "01/01/2025");
        assert_eq!(reading.utc_time, "01:05:09");
        assert_eq!(reading.utc_date, "02/01/2025");
    }
}
