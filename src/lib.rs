//! # wakeup-light
//!
//! Sunrise-style wake-up light scheduler for a single smart light.
//!
//! On each configured weekday the light fades from off to a maximum brightness between a
//! start and an end time, holds, and is switched off at a turn-off time. A calendar
//! entity can cancel the ramp for a whole day (holidays, days off).
//!
//! ## Architecture
//!
//! - **Entry Point**: [`WakeupLight`] builds and runs the single-threaded event loop
//! - **Controller**: [`core::Controller`] is the phase state machine with its timers
//! - **Schedule**: `schedule` resolves today's window and computes ramp brightness
//! - **Exceptions**: `exception` caches the daily "skip today" calendar check
//! - **Backends**: `backend` defines the light and state-bus traits
//! - **Configuration**: `config` loads `wakeup-light.toml`
//! - **Infrastructure**: logging and the real/simulated clock

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod backend;
pub mod config;
pub mod constants;
pub mod core;
pub mod exception;
pub mod schedule;
pub mod service;
pub mod time_source;

pub use crate::config::SchedulerConfig;
pub use crate::core::{Controller, Phase};
pub use crate::service::{Command, ServiceHandle, WakeupLight};
