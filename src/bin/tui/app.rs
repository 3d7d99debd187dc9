use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

pub const PLACEHOLDER: &str = "--";

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

/// A slot is either a line of text or, for the band list, several lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SlotEntry {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedStatus {
    pub last_ok_ns: Option<u64>,
    pub last_error_ns: Option<u64>,
    pub failures: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    pub uptime_secs: u64,
    pub weather: FeedStatus,
    pub space_weather: FeedStatus,
    pub astronomy: FeedStatus,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub slots: BTreeMap<String, SlotEntry>,
    pub health: HealthResponse,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            slots: BTreeMap::new(),
            health: HealthResponse::default(),
            base_url,
        }
    }

    /// Text of slot `name`, or the placeholder when unset. A list is joined.
    pub fn text(&self, name: &str) -> String {
        match self.slots.get(name) {
            Some(SlotEntry::Text(s)) => s.clone(),
            Some(SlotEntry::List(items)) => items.join(", "),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Lines of slot `name`; a text slot yields one line, an unset slot none.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.slots.get(name) {
            Some(SlotEntry::List(items)) => items.clone(),
            Some(SlotEntry::Text(s)) => vec![s.clone()],
            None => Vec::new(),
        }
    }

    /// Slots are required; health is best-effort and keeps its last value.
    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let slots_url = format!("{}/slots", self.base_url);
        let health_url = format!("{}/health", self.base_url);

        let (slots_res, health_res) = tokio::join!(
            client.get(&slots_url).send(),
            client.get(&health_url).send(),
        );

        let slots_resp = match slots_res.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };

        match slots_resp.json::<BTreeMap<String, SlotEntry>>().await {
            Ok(slots) => {
                self.slots = slots;
                self.status = ConnectionStatus::Connected;
            }
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
                return;
            }
        }

        if let Ok(h) = health_res {
            if let Ok(health) = h.json::<HealthResponse>().await {
                self.health = health;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// How long ago `ns` was, relative to `now_ns`, e.g. "42s", "7m", "3h".
pub fn format_age(ns: Option<u64>, now_ns: u64) -> String {
    let Some(ns) = ns else {
        return "never".to_string();
    };
    let secs = now_ns.saturating_sub(ns) / 1_000_000_000;
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        _ => format!("{}h", secs / 3600),
    }
}

/// A feed is stale when its last success is missing or older than its last error.
pub fn is_stale(feed: &FeedStatus) -> bool {
    match (feed.last_ok_ns, feed.last_error_ns) {
        (None, _) => true,
        (Some(ok), Some(err)) => err > ok,
        (Some(_), None) => false,
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
