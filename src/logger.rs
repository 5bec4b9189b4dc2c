//! Structured logging with box-drawing output.
//!
//! Every message the scheduler emits goes through the macros in this module so the
//! service log reads as one continuous tree:
//!
//! ```text
//! ┏ wakeup-light v0.3.0 ━━╸
//! ┃
//! ┣ Controlling light.bedroom
//! ┃   Max brightness: 254
//! ┃
//! ┣ Ramp starting in 20 minutes 0 seconds
//! ```
//!
//! The logger can be silenced at runtime, and when the service runs against a
//! simulated clock each line is prefixed with the simulated wall time.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::time_source::TimeSource;

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Clock used for `[HH:MM:SS]` prefixes while simulating
static SIMULATED_CLOCK: RwLock<Option<Arc<dyn TimeSource>>> = RwLock::new(None);

/// Logging interface behind the formatting macros.
///
/// ## Conventions
///
/// - `log_block_start!` opens a new conceptual block (phase change, startup, refresh).
///   It prints a spacer pipe `┃` followed by `┣ message`.
/// - `log_decorated!` continues the current block with `┣ message`.
/// - `log_indented!` prints nested details as `┃   message`.
/// - `log_pipe!` inserts a lone `┃`, used before `log_warning!`/`log_error!` when they
///   start a block of their own.
/// - `log_version!` and `log_end!` frame the whole service run.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route timestamp prefixes through a simulated clock. Passing a real clock
    /// clears the prefix.
    pub fn set_clock(clock: Arc<dyn TimeSource>) {
        if let Ok(mut guard) = SIMULATED_CLOCK.write() {
            *guard = if clock.is_simulated() {
                Some(clock)
            } else {
                None
            };
        }
    }

    /// Timestamp prefix for the current line, empty outside simulation.
    pub fn get_timestamp_prefix() -> String {
        match SIMULATED_CLOCK.read() {
            Ok(guard) => match guard.as_ref() {
                Some(clock) => format!("[{}] ", clock.now().format("%H:%M:%S")),
                None => String::new(),
            },
            Err(_) => String::new(),
        }
    }
}

// Needed by the exported macros
pub fn write_output(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Log a message that continues the current block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┃   {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┃   {expr}\n"));
        }
    }};
}

/// Log a lone pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Log the first line of a new block.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log the service header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("{prefix}┏ wakeup-light v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

/// Log a warning in yellow.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {expr}\n"));
        }
    }};
}

/// Log an error in red.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {expr}\n"));
        }
    }};
}

/// Log an informational message in green.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {expr}\n"));
        }
    }};
}

/// Log an operational detail, only meaningful with debug output enabled.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::logger::write_output(&format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {expr}\n"));
        }
    }};
}
