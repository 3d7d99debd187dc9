//! Rule-of-thumb HF propagation estimates from two inputs: a solar-flux proxy
//! and the planetary K-index. None of these are ionospheric models.

use crate::format::round_half_up;

pub const DEFAULT_SFI: f64 = 100.0;
pub const DEFAULT_KP: f64 = 2.0;
pub const DEFAULT_A_INDEX: f64 = 8.0;

pub const WINDOWS_SEPARATOR: &str = " — ";

/// HF band groups shown in the band list, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Mid,
    High,
    TenMeters,
    SixMeters,
}

impl Band {
    pub const ALL: [Band; 5] = [
        Band::Low,
        Band::Mid,
        Band::High,
        Band::TenMeters,
        Band::SixMeters,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "HF low (160/80 m)",
            Band::Mid => "HF mid (40/30 m)",
            Band::High => "HF high (20/17/15 m)",
            Band::TenMeters => "10 m",
            Band::SixMeters => "6 m",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
            Band::TenMeters => "10m",
            Band::SixMeters => "6m",
        };
        write!(f, "{s}")
    }
}

fn or_default(v: f64, default: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

/// Solar-flux-index stand-in from the latest GOES X-ray flux (W/m²).
pub fn sfi_proxy(xray_flux: f64) -> f64 {
    if xray_flux.is_finite() {
        round_half_up(90.0 + xray_flux * 1200.0)
    } else {
        DEFAULT_SFI
    }
}

/// Linear A-index stand-in: `3 * Kp`.
pub fn a_index_proxy(kp: f64) -> f64 {
    if kp.is_finite() {
        round_half_up(kp * 3.0)
    } else {
        DEFAULT_A_INDEX
    }
}

/// Maximum usable frequency estimate in MHz. Rises with SFI, falls with Kp; the
/// Kp penalty never drops below 0.7.
pub fn estimate_muf(sfi: f64, kp: f64) -> f64 {
    let sfi = or_default(sfi, DEFAULT_SFI);
    let kp = or_default(kp, DEFAULT_KP);
    let factor = 0.08 * sfi + 0.5;
    let penalty = (1.0 - kp * 0.06).max(0.7);
    3.0 * factor * penalty
}

pub fn band_status(band: Band, sfi: f64, kp: f64) -> &'static str {
    let sfi = or_default(sfi, DEFAULT_SFI);
    let kp = or_default(kp, DEFAULT_KP);
    let good = sfi >= 120.0 && kp <= 3.0;
    let fair = sfi >= 80.0 && kp <= 5.0;

    match band {
        Band::Low if kp <= 4.0 => "open (night/local)",
        Band::Low => "noisy",
        Band::Mid if good => "good",
        Band::Mid if fair => "acceptable",
        Band::Mid => "weak",
        Band::High if good => "good",
        Band::High if fair => "variable",
        Band::High => "partially closed",
        Band::TenMeters if sfi >= 100.0 && kp <= 3.0 => "daytime openings",
        Band::TenMeters => "sporadic",
        Band::SixMeters if kp <= 3.0 => "possible sporadic-E/TEP",
        Band::SixMeters => "sporadic",
    }
}

/// Status of every band group, in display order.
pub fn all_band_statuses(sfi: f64, kp: f64) -> Vec<(Band, &'static str)> {
    Band::ALL
        .iter()
        .map(|&band| (band, band_status(band, sfi, kp)))
        .collect()
}

/// Operating-window advice. A NaN Kp never counts as geomagnetically active.
pub fn estimate_windows(muf: f64, kp: f64) -> String {
    let mut notes = Vec::new();
    if muf > 18.0 {
        notes.push("20 m daytime, short 17/15 m windows");
    }
    if muf > 24.0 {
        notes.push("10 m possible around midday");
    }
    if kp >= 5.0 {
        notes.push("geomagnetically active, noisy HF");
    }
    if notes.is_empty() {
        notes.push("standard windows by local time");
    }
    notes.join(WINDOWS_SEPARATOR)
}
