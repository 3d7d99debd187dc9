use serde::Serialize;

// ---------------------------------------------------------------------------
// Display slots
// ---------------------------------------------------------------------------

/// Named display slot. The kebab-case name is the stable identifier used by the
/// HTTP API and the terminal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Temperature,
    Humidity,
    Pressure,
    Wind,
    Gusts,
    WindDirection,
    ForecastNow,
    MinMaxTomorrow,
    WindMaxTomorrow,
    GustsMaxTomorrow,
    ForecastTomorrow,
    SunriseToday,
    SunsetToday,
    MoonPhaseToday,
    SunriseTomorrow,
    SunsetTomorrow,
    KIndex,
    SolarFlux,
    AIndex,
    Muf,
    BandsList,
    Windows,
    TimeLocal,
    DateLocal,
    TimeUtc,
    DateUtc,
}

impl Slot {
    pub const ALL: [Slot; 26] = [
        Slot::Temperature,
        Slot::Humidity,
        Slot::Pressure,
        Slot::Wind,
        Slot::Gusts,
        Slot::WindDirection,
        Slot::ForecastNow,
        Slot::MinMaxTomorrow,
        Slot::WindMaxTomorrow,
        Slot::GustsMaxTomorrow,
        Slot::ForecastTomorrow,
        Slot::SunriseToday,
        Slot::SunsetToday,
        Slot::MoonPhaseToday,
        Slot::SunriseTomorrow,
        Slot::SunsetTomorrow,
        Slot::KIndex,
        Slot::SolarFlux,
        Slot::AIndex,
        Slot::Muf,
        Slot::BandsList,
        Slot::Windows,
        Slot::TimeLocal,
        Slot::DateLocal,
        Slot::TimeUtc,
        Slot::DateUtc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Temperature => "temp",
            Slot::Humidity => "humidity",
            Slot::Pressure => "pressure",
            Slot::Wind => "wind",
            Slot::Gusts => "gusts",
            Slot::WindDirection => "wind-dir",
            Slot::ForecastNow => "forecast-now",
            Slot::MinMaxTomorrow => "minmax",
            Slot::WindMaxTomorrow => "wind-max-tomorrow",
            Slot::GustsMaxTomorrow => "gusts-max-tomorrow",
            Slot::ForecastTomorrow => "forecast-tomorrow",
            Slot::SunriseToday => "sunrise-today",
            Slot::SunsetToday => "sunset-today",
            Slot::MoonPhaseToday => "moonphase-today",
            Slot::SunriseTomorrow => "sunrise-tomorrow",
            Slot::SunsetTomorrow => "sunset-tomorrow",
            Slot::KIndex => "kp",
            Slot::SolarFlux => "sfi",
            Slot::AIndex => "a-index",
            Slot::Muf => "muf",
            Slot::BandsList => "bands-list",
            Slot::Windows => "windows",
            Slot::TimeLocal => "time-local",
            Slot::DateLocal => "date-local",
            Slot::TimeUtc => "time-utc",
            Slot::DateUtc => "date-utc",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Current content of a slot: plain text, or a list that is replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    List(Vec<String>),
}

// ---------------------------------------------------------------------------
// Snapshots: one per fetch, fully replacing the previous cycle
// ---------------------------------------------------------------------------

/// Raw weather values; `None` wherever the upstream sent null or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub wind_direction: Option<f64>,
    /// Index 0 = today, 1 = tomorrow.
    pub days: [DailyForecast; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecast {
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub weather_code: Option<f64>,
}

/// Latest space-weather readings plus everything derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceWeatherSnapshot {
    /// Planetary K-index; NaN when the feed had no usable value.
    pub kp: f64,
    /// Latest X-ray flux (W/m²); NaN when unusable.
    pub xray_flux: f64,
    pub sfi: f64,
    pub a_index: f64,
    pub muf_mhz: f64,
    pub bands: Vec<(crate::propagation::Band, &'static str)>,
    pub windows: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstronomySnapshot {
    pub sunrise: [Option<String>; 2],
    pub sunset: [Option<String>; 2],
    pub moon_phase: [Option<f64>; 2],
}
