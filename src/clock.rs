use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::display::DisplaySink;
use crate::format::ClockReading;
use crate::types::Slot;

/// Writes local and UTC time/date once per tick. Time retrieval cannot fail,
/// so there is no error path.
pub struct ClockDriver {
    timezone: Tz,
    sink: Arc<dyn DisplaySink>,
}

impl ClockDriver {
    pub fn new(timezone: Tz, sink: Arc<dyn DisplaySink>) -> Self {
        Self { timezone, sink }
    }

    /// One tick: sample the instant once and derive all four strings from it.
    pub fn tick(&self, now: DateTime<Utc>) {
        let reading = ClockReading::at(now, self.timezone);
        self.sink.set(Slot::TimeLocal, reading.local_time);
        self.sink.set(Slot::DateLocal, reading.local_date);
        self.sink.set(Slot::TimeUtc, reading.utc_time);
        self.sink.set(Slot::DateUtc, reading.utc_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{RecordingSink, SlotStore};
    use chrono::TimeZone;

    #[test]
    fn tick_writes_four_slots_from_one_instant() {
        let sink = RecordingSink::new();
        let clock = ClockDriver::new(chrono_tz::Asia::Tokyo, sink.clone());
        clock.tick(Utc.with_ymd_and_hms(2025, 12, 31, 16, 30, 0).unwrap());

        assert_eq!(sink.calls().len(), 4);
        assert_eq!(sink.last_text(Slot::TimeLocal).as_deref(), Some("01:30:00"));
        assert_eq!(sink.last_text(Slot::DateLocal).as_deref(), Some("01/01/2026"));
        assert_eq!(sink.last_text(Slot::TimeUtc).as_deref(), Some("16:30:00"));
        assert_eq!(sink.last_text(Slot::DateUtc).as_deref(), Some("31/12/2025"));
    }

    #[test]
    fn missing_slots_are_ignored() {
        let store = SlotStore::with_slots([Slot::TimeUtc]);
        let clock = ClockDriver::new(chrono_tz::UTC, store.clone());
        clock.tick(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 5).unwrap());
        assert_eq!(store.text(Slot::TimeUtc).as_deref(), Some("08:00:05"));
        assert_eq!(store.get(Slot::TimeLocal), None);
    }
}
