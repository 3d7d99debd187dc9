use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::types::{Slot, SlotValue};

/// Destination for formatted display text. Writing to a slot the sink does not
/// render is a silent no-op, never an error.
pub trait DisplaySink: Send + Sync {
    fn set(&self, slot: Slot, value: String);

    /// Replaces the whole list held by `slot` (previous entries are dropped).
    fn replace_list(&self, slot: Slot, items: Vec<String>);
}

// ---------------------------------------------------------------------------
// SlotStore: in-memory sink read by the HTTP API
// ---------------------------------------------------------------------------

pub struct SlotStore {
    /// slot → latest value; slots never written are absent
    values: DashMap<Slot, SlotValue>,
    /// slots this store renders; writes to anything else are dropped
    registered: HashSet<Slot>,
}

impl SlotStore {
    /// Store rendering every known slot.
    pub fn new() -> Arc<Self> {
        Self::with_slots(Slot::ALL)
    }

    pub fn with_slots(slots: impl IntoIterator<Item = Slot>) -> Arc<Self> {
        Arc::new(Self {
            values: DashMap::new(),
            registered: slots.into_iter().collect(),
        })
    }

    pub fn get(&self, slot: Slot) -> Option<SlotValue> {
        self.values.get(&slot).map(|v| v.value().clone())
    }

    pub fn text(&self, slot: Slot) -> Option<String> {
        match self.get(slot)? {
            SlotValue::Text(s) => Some(s),
            SlotValue::List(_) => None,
        }
    }

    /// Every written slot keyed by its stable name, sorted for stable output.
    pub fn snapshot(&self) -> BTreeMap<&'static str, SlotValue> {
        self.values
            .iter()
            .map(|entry| (entry.key().name(), entry.value().clone()))
            .collect()
    }

    fn write(&self, slot: Slot, value: SlotValue) {
        if !self.registered.contains(&slot) {
            trace!(slot = %slot, "write to unregistered slot ignored");
            return;
        }
        self.values.insert(slot, value);
    }
}

impl DisplaySink for SlotStore {
    fn set(&self, slot: Slot, value: String) {
        self.write(slot, SlotValue::Text(value));
    }

    fn replace_list(&self, slot: Slot, items: Vec<String>) {
        self.write(slot, SlotValue::List(items));
    }
}

// ---------------------------------------------------------------------------
// RecordingSink: test double that keeps every write in order
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    calls: std::sync::Mutex<Vec<(Slot, SlotValue)>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<(Slot, SlotValue)> {
        self.calls.lock().unwrap().clone()
    }

    /// Most recent text written to `slot`.
    pub fn last_text(&self, slot: Slot) -> Option<String> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|(s, v)| match v {
                SlotValue::Text(t) if s == slot => Some(t),
                _ => None,
            })
    }
}

#[cfg(test)]
impl DisplaySink for RecordingSink {
    fn set(&self, slot: Slot, value: String) {
        self.calls.lock().unwrap().push((slot, SlotValue::Text(value)));
    }

    fn replace_list(&self, slot: Slot, items: Vec<String>) {
        self.calls.lock().unwrap().push((slot, SlotValue::List(items)));
    }
}
