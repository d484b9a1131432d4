// Tests for configuration loading, defaults, and corruption fallback.
use dayslip::config::Config;
use dayslip::context::{AppContext, TestContext};
use dayslip::model::Priority;
use std::fs;

#[test]
fn missing_file_yields_defaults() {
    let ctx = TestContext::new();
    let config = Config::load_or_default(&ctx);

    assert_eq!(config.printer_port, "COM4");
    assert_eq!(config.printer_baudrate, 9600);
    assert_eq!(config.schedules, vec!["08:00", "12:00", "18:00"]);
    assert!(config.task_priorities.is_empty());
    assert!(!config.auto_start);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    fs::write(&path, "this is { not [ valid toml").unwrap();

    // load() reports the parse error...
    assert!(Config::load(&ctx).is_err());
    // ...but startup resolution silently reverts to defaults.
    let config = Config::load_or_default(&ctx);
    assert_eq!(config.printer_port, "COM4");
}

#[test]
fn missing_keys_take_documented_defaults() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    fs::write(&path, "printer_port = \"/dev/rfcomm0\"\n").unwrap();

    let config = Config::load(&ctx).unwrap();
    assert_eq!(config.printer_port, "/dev/rfcomm0");
    // Everything else keeps its default.
    assert_eq!(config.printer_baudrate, 9600);
    assert_eq!(config.schedules.len(), 3);
    assert_eq!(config.fetch_timeout_secs, 30);
}

#[test]
fn save_and_reload_roundtrip() {
    let ctx = TestContext::new();

    let mut config = Config::default();
    config.printer_port = "/dev/rfcomm1".to_string();
    config.schedules = vec!["07:30".to_string()];
    config
        .task_priorities
        .insert("task-1".to_string(), Priority::High);
    config.auto_start = true;
    config.save(&ctx).unwrap();

    let reloaded = Config::load(&ctx).unwrap();
    assert_eq!(reloaded.printer_port, "/dev/rfcomm1");
    assert_eq!(reloaded.schedules, vec!["07:30"]);
    assert_eq!(reloaded.priority_for("task-1"), Priority::High);
    assert!(reloaded.auto_start);
}

#[test]
fn priority_lookup_defaults_to_normal() {
    let config = Config::default();
    assert_eq!(config.priority_for("unknown-task"), Priority::Normal);
}
