//! Collaborator interfaces for the light and the home-automation state bus.
//!
//! The scheduler never talks to hardware directly. It issues brightness and off
//! commands through a [`LightActuator`] and reads calendar state through a
//! [`StateSource`]. The host wires in real implementations; this module ships a
//! logging [`DryRunActuator`] and an in-memory [`StaticStateSource`] so the service can
//! run without a live system.
//!
//! Failures are returned as errors and never retried here. The service loop logs them
//! and keeps its timers armed, so a flaky light misses one tick rather than the morning.

use anyhow::Result;

pub mod dry_run;
#[cfg(any(test, feature = "testing-support"))]
pub mod recording;
pub mod static_state;

pub use dry_run::DryRunActuator;
#[cfg(any(test, feature = "testing-support"))]
pub use recording::{LightCommand, RecordingActuator};
pub use static_state::StaticStateSource;

/// Applies brightness commands to a physical light.
#[cfg_attr(test, mockall::automock)]
pub trait LightActuator: Send {
    /// Turn the light on at `brightness` (0..=255).
    fn set_brightness(&mut self, entity: &str, brightness: u8) -> Result<()>;

    /// Turn the light off.
    fn turn_off(&mut self, entity: &str) -> Result<()>;

    /// Human-readable name for logs (e.g. "Home Assistant", "Dry run").
    fn name(&self) -> &'static str;
}

/// Read-only view of entity states on the home-automation bus.
#[cfg_attr(test, mockall::automock)]
pub trait StateSource: Send {
    /// Current state string of `entity_id` (e.g. `"on"`, `"off"`).
    fn get_state(&self, entity_id: &str) -> Result<String>;
}
