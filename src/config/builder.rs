//! Default configuration file creation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::schedule::WEEK;

/// Write a commented default `wakeup-light.toml` to `path`.
///
/// Weekdays ramp with the default window, weekends stay dark.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let mut builder = ConfigBuilder::new()
        .add_section("Light")
        .add_setting(
            "entity",
            "\"light.bedroom\"",
            "Entity id of the light to ramp",
        )
        .add_setting(
            "max_brightness",
            &DEFAULT_MAX_BRIGHTNESS.to_string(),
            &format!("Brightness at the end of the ramp ({MINIMUM_MAX_BRIGHTNESS}-255)"),
        )
        .add_setting(
            "adjust_frequency",
            &DEFAULT_ADJUST_FREQUENCY.to_string(),
            &format!(
                "Seconds between brightness updates ({MINIMUM_ADJUST_FREQUENCY}-{MAXIMUM_ADJUST_FREQUENCY})"
            ),
        )
        .add_section("Exceptions")
        .add_commented_setting(
            "calendar",
            "\"holidays\"",
            "Skip days with an active calendar.<name> event",
        );

    for (index, weekday) in WEEK.iter().enumerate() {
        let active = index < 5;
        builder = builder
            .add_table(&format!("days.{}", weekday_key(*weekday)))
            .add_setting("active", &active.to_string(), "Ramp on this day")
            .add_setting("start", &format!("\"{DEFAULT_START}\""), "Ramp begins (HH:MM)")
            .add_setting("end", &format!("\"{DEFAULT_END}\""), "Full brightness reached")
            .add_setting(
                "turnoff",
                &format!("\"{DEFAULT_TURNOFF}\""),
                "Light switched off",
            );
    }

    let content = builder.build();
    fs::write(path, format!("{content}\n"))
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", path.display());
    Ok(())
}

fn weekday_key(weekday: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;
    match weekday {
        Mon => "monday",
        Tue => "tuesday",
        Wed => "wednesday",
        Thu => "thursday",
        Fri => "friday",
        Sat => "saturday",
        Sun => "sunday",
    }
}

/// Builds TOML text with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Table(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_table(mut self, name: &str) -> Self {
        self.entries.push(ConfigEntry::Table(format!("[{name}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("#{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) | ConfigEntry::Table(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
