//! Actuator that records every command for later inspection.

use anyhow::Result;
use std::sync::{Arc, Mutex};

use super::LightActuator;

/// A command as received by the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    Brightness(u8),
    Off,
}

/// Clones share one command log, so a test can keep a handle after boxing the actuator.
#[derive(Debug, Default, Clone)]
pub struct RecordingActuator {
    commands: Arc<Mutex<Vec<LightCommand>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<LightCommand> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Brightness levels in the order they were commanded.
    pub fn brightness_levels(&self) -> Vec<u8> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                LightCommand::Brightness(level) => Some(level),
                LightCommand::Off => None,
            })
            .collect()
    }

    fn push(&self, command: LightCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }
}

impl LightActuator for RecordingActuator {
    fn set_brightness(&mut self, _entity: &str, brightness: u8) -> Result<()> {
        self.push(LightCommand::Brightness(brightness));
        Ok(())
    }

    fn turn_off(&mut self, _entity: &str) -> Result<()> {
        self.push(LightCommand::Off);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Recording"
    }
}
