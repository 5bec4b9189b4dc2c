//! In-memory state source.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::StateSource;
use crate::constants::CALENDAR_OFF_STATE;

/// Entity states held in memory. Unknown entities read as `"off"`.
///
/// Clones share the same map, so a host (or a test) can keep one clone to flip
/// states while the service owns another.
#[derive(Debug, Clone, Default)]
pub struct StaticStateSource {
    states: Arc<Mutex<HashMap<String, String>>>,
}

impl StaticStateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, entity_id: &str, state: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(entity_id.to_string(), state.to_string());
    }
}

impl StateSource for StaticStateSource {
    fn get_state(&self, entity_id: &str) -> Result<String> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        Ok(states
            .get(entity_id)
            .cloned()
            .unwrap_or_else(|| CALENDAR_OFF_STATE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let source = StaticStateSource::new();
        let handle = source.clone();
        assert_eq!(source.get_state("calendar.holidays").unwrap(), "off");

        handle.set("calendar.holidays", "on");
        assert_eq!(source.get_state("calendar.holidays").unwrap(), "on");
    }
}
