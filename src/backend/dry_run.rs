//! Actuator that logs commands instead of sending them.

use anyhow::Result;

use super::LightActuator;

/// Logs every command and remembers the last brightness it was asked for.
#[derive(Debug, Default)]
pub struct DryRunActuator {
    last_brightness: Option<u8>,
}

impl DryRunActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last brightness commanded, `None` after a turn-off or before any command.
    pub fn last_brightness(&self) -> Option<u8> {
        self.last_brightness
    }
}

impl LightActuator for DryRunActuator {
    fn set_brightness(&mut self, entity: &str, brightness: u8) -> Result<()> {
        log_decorated!("[dry run] {entity} → brightness {brightness}");
        self.last_brightness = Some(brightness);
        Ok(())
    }

    fn turn_off(&mut self, entity: &str) -> Result<()> {
        log_decorated!("[dry run] {entity} → off");
        self.last_brightness = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Dry run"
    }
}
