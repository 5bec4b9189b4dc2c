use super::validation::validate_config;
use super::*;
use crate::constants::test_constants::*;
use crate::constants::{MAXIMUM_ADJUST_FREQUENCY, MINIMUM_ADJUST_FREQUENCY};
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn create_test_config(
    entity: Option<&str>,
    max_brightness: Option<u32>,
    adjust_frequency: Option<u64>,
    calendar: Option<&str>,
) -> Config {
    let mut days = BTreeMap::new();
    days.insert(
        "monday".to_string(),
        DayEntry {
            active: Some(true),
            start: Some(TEST_START.to_string()),
            end: Some(TEST_END.to_string()),
            turnoff: Some(TEST_TURNOFF.to_string()),
            ..Default::default()
        },
    );
    Config {
        entity: entity.map(|s| s.to_string()),
        max_brightness,
        adjust_frequency,
        calendar: calendar.map(|s| s.to_string()),
        days,
    }
}

fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("wakeup-light.toml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

#[test]
fn test_config_validation_basic() {
    let config = create_test_config(Some(TEST_ENTITY), Some(200), Some(30), Some("holidays"));
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_validation_requires_entity() {
    for entity in [None, Some(""), Some("   ")] {
        let config = create_test_config(entity, None, None, None);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("entity must be set"));
    }
}

#[test]
fn test_config_validation_max_brightness_range() {
    let mut config = create_test_config(Some(TEST_ENTITY), Some(1), None, None);
    assert!(validate_config(&config).is_ok());

    config.max_brightness = Some(255);
    assert!(validate_config(&config).is_ok());

    config.max_brightness = Some(0);
    assert!(validate_config(&config).is_err());

    config.max_brightness = Some(256);
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("max_brightness (256)"));
}

#[test]
fn test_config_validation_adjust_frequency_range() {
    let mut config = create_test_config(
        Some(TEST_ENTITY),
        None,
        Some(MINIMUM_ADJUST_FREQUENCY),
        None,
    );
    assert!(validate_config(&config).is_ok());

    config.adjust_frequency = Some(MAXIMUM_ADJUST_FREQUENCY);
    assert!(validate_config(&config).is_ok());

    config.adjust_frequency = Some(0);
    assert!(validate_config(&config).is_err());

    config.adjust_frequency = Some(MAXIMUM_ADJUST_FREQUENCY + 1);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_validation_calendar_name() {
    let config = create_test_config(Some(TEST_ENTITY), None, None, Some(""));
    assert!(validate_config(&config).is_err());

    let config = create_test_config(Some(TEST_ENTITY), None, None, Some("calendar.holidays"));
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("bare name"));
}

#[test]
fn test_defaults_applied() {
    let config = create_test_config(Some(TEST_ENTITY), None, None, None);
    let scheduler = SchedulerConfig::from_config(&config).unwrap();

    assert_eq!(scheduler.entity, TEST_ENTITY);
    assert_eq!(scheduler.max_brightness, 254);
    assert_eq!(scheduler.adjust_frequency(), Duration::seconds(60));
    assert_eq!(scheduler.calendar, None);
}

#[test]
fn test_day_entry_defaults() {
    let entry = DayEntry {
        active: Some(true),
        ..Default::default()
    };
    let day = entry.to_day_config().unwrap();
    assert!(day.active());
    assert_eq!(day.start().to_string(), "06:20");
    assert_eq!(day.end().to_string(), "06:40");
    assert_eq!(day.turnoff().to_string(), "06:50");

    // Without `active` a day never ramps
    let day = DayEntry::default().to_day_config().unwrap();
    assert!(!day.active());
}

#[test]
fn test_defective_days_become_inactive() {
    let (_dir, path) = write_config(
        r#"
entity = "light.bedroom"

[days.monday]
active = true
start = "6h20"

[days.tuesday]
active = true
start = "06:45"
end = "06:40"

[days.funday]
active = true

[days.wednesday]
active = true
"#,
    );

    let config = load_from_path(&path).unwrap();
    let week = config.week_schedule();

    assert_eq!(week.day(Weekday::Mon), None);
    assert_eq!(week.day(Weekday::Tue), None);
    assert!(week.day(Weekday::Wed).unwrap().active());
    let active: Vec<_> = week.active_days().map(|(wd, _)| wd).collect();
    assert_eq!(active, vec![Weekday::Wed]);
}

#[test]
fn test_load_from_path_full_config() {
    let (_dir, path) = write_config(
        r#"
entity = "light.bedroom"
max_brightness = 200
freq = 30
calendar = "holidays"

[days.friday]
active = true
start = "07:00"
end = "07:30"
turnoff = "08:00"
"#,
    );

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.adjust_frequency, Some(30));

    let scheduler = SchedulerConfig::from_config(&config).unwrap();
    assert_eq!(scheduler.max_brightness, 200);
    assert_eq!(scheduler.adjust_frequency(), Duration::seconds(30));
    assert_eq!(scheduler.calendar.as_deref(), Some("holidays"));

    let friday = scheduler.week.day(Weekday::Fri).unwrap();
    assert_eq!(friday.start().to_string(), "07:00");
    assert_eq!(friday.turnoff().to_string(), "08:00");
}

#[test]
fn test_load_from_path_rejects_invalid_values() {
    let (_dir, path) = write_config("entity = \"light.bedroom\"\nmax_brightness = 900\n");
    assert!(load_from_path(&path).is_err());

    let (_dir, path) = write_config("entity = \"light.bedroom\"\nmax_brightness = \"bright\"\n");
    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_load_from_path_missing_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("nope.toml");
    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(!path.exists());
}

#[test]
fn test_default_config_round_trips() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("wakeup-light.toml");

    create_default_config(&path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[days.monday]"));
    assert!(content.contains("#calendar = \"holidays\""));

    let config = load_from_path(&path).unwrap();
    let scheduler = SchedulerConfig::from_config(&config).unwrap();
    assert_eq!(scheduler.entity, "light.bedroom");
    assert_eq!(scheduler.calendar, None);
    assert_eq!(scheduler.week.active_days().count(), 5);
    assert!(!scheduler.week.day(Weekday::Sat).unwrap().active());
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir
        .path()
        .join("wakeup-light")
        .join("wakeup-light.toml");

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = load();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    if let Err(e) = &result {
        eprintln!("load() failed: {:?}", e);
    }
    assert!(result.is_ok());
    assert!(config_path.exists());
}

#[test]
fn test_with_adjust_frequency_rejects_out_of_range() {
    let scheduler = SchedulerConfig::new(TEST_ENTITY, WeekSchedule::new());

    for secs in [0, -60, MAXIMUM_ADJUST_FREQUENCY as i64 + 1] {
        let err = scheduler
            .clone()
            .with_adjust_frequency(Duration::seconds(secs))
            .unwrap_err();
        assert!(err.to_string().contains("adjust_frequency"));
    }

    // Sub-second intervals are below the minimum too
    assert!(
        scheduler
            .clone()
            .with_adjust_frequency(Duration::milliseconds(500))
            .is_err()
    );

    let scheduler = scheduler
        .with_adjust_frequency(Duration::seconds(MINIMUM_ADJUST_FREQUENCY as i64))
        .unwrap();
    assert_eq!(scheduler.adjust_frequency(), Duration::seconds(1));
}

#[test]
fn test_day_with_unknown_key_stays_inactive() {
    let (_dir, path) = write_config(
        r#"
entity = "light.bedroom"

[days.monday]
active = true
strat = "07:00"

[days.tuesday]
active = true
start = "07:00"
"#,
    );

    let config = load_from_path(&path).unwrap();
    let err = config.days["monday"].to_day_config().unwrap_err();
    assert!(err.to_string().contains("strat"));

    let week = config.week_schedule();
    assert_eq!(week.day(Weekday::Mon), None);
    assert_eq!(week.day(Weekday::Tue).unwrap().start().to_string(), "07:00");
}
