// Tests for the pure report formatter.
use chrono::{Local, NaiveDate, TimeZone};
use dayslip::model::{Event, EventStart, Priority, TaskItem};
use dayslip::render::{PAPER_WIDTH, render};
use std::collections::HashMap;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn timed_event(title: &str, hour: u32, minute: u32) -> Event {
    Event::new(
        Some(title.to_string()),
        EventStart::At(Local.with_ymd_and_hms(2026, 8, 7, hour, minute, 0).unwrap()),
    )
}

fn task(id: &str, title: &str, list: &str) -> TaskItem {
    TaskItem::new(
        id.to_string(),
        Some(title.to_string()),
        Some(list.to_string()),
    )
}

#[test]
fn concrete_scenario() {
    // events = [Standup @ 09:00 local], tasks = [Buy milk in the primary list]
    let events = vec![timed_event("Standup", 9, 0)];
    let tasks = vec![task("t1", "Buy milk", "My Tasks")];

    let lines = render(day(), &events, &tasks, &HashMap::new());

    assert!(lines.contains(&"1. 09:00 AM - Standup".to_string()));
    assert!(lines.contains(&"1. [ ] Buy milk".to_string()));
    assert!(lines.contains(&"Events: 1 | Tasks: 1".to_string()));
    assert!(!lines.iter().any(|l| l.contains("List:")));
}

#[test]
fn footer_counts_match_input_lengths() {
    let events = vec![
        timed_event("A", 9, 0),
        timed_event("B", 10, 30),
        timed_event("C", 14, 0),
    ];
    let tasks = vec![task("1", "One", "My Tasks"), task("2", "Two", "My Tasks")];

    let lines = render(day(), &events, &tasks, &HashMap::new());
    assert!(lines.contains(&"Events: 3 | Tasks: 2".to_string()));
}

#[test]
fn empty_sections_render_fixed_lines() {
    let lines = render(day(), &[], &[], &HashMap::new());
    assert!(lines.contains(&"No events today".to_string()));
    assert!(lines.contains(&"No pending tasks".to_string()));
    assert!(lines.contains(&"Events: 0 | Tasks: 0".to_string()));
    // No numbered entries at all.
    assert!(!lines.iter().any(|l| l.starts_with("1.")));
}

#[test]
fn list_annotation_only_for_non_primary_lists() {
    let tasks = vec![
        task("a", "Primary task", "My Tasks"),
        task("b", "Errand", "Groceries"),
    ];
    let lines = render(day(), &[], &tasks, &HashMap::new());

    assert!(lines.contains(&"    List: Groceries".to_string()));
    // Exactly one annotation: the primary-list task carries none.
    assert_eq!(lines.iter().filter(|l| l.contains("List:")).count(), 1);
}

#[test]
fn high_priority_marker_comes_from_overrides() {
    let tasks = vec![task("urgent", "Pay rent", "My Tasks")];
    let mut overrides = HashMap::new();
    overrides.insert("urgent".to_string(), Priority::High);

    let lines = render(day(), &[], &tasks, &overrides);
    assert!(lines.contains(&"1. [ ] !!! Pay rent".to_string()));

    // Without the override the same task renders unmarked.
    let lines = render(day(), &[], &tasks, &HashMap::new());
    assert!(lines.contains(&"1. [ ] Pay rent".to_string()));
}

#[test]
fn render_is_deterministic() {
    let events = vec![
        timed_event("Standup", 9, 0),
        Event::new(Some("Offsite".to_string()), EventStart::AllDay(day())),
    ];
    let tasks = vec![task("a", "One", "My Tasks"), task("b", "Two", "Work")];
    let mut overrides = HashMap::new();
    overrides.insert("b".to_string(), Priority::High);

    let first = render(day(), &events, &tasks, &overrides);
    let second = render(day(), &events, &tasks, &overrides);
    assert_eq!(first, second);
}

#[test]
fn header_and_separators() {
    let lines = render(day(), &[], &[], &HashMap::new());
    assert!(lines.contains(&"DAILY SCHEDULE".to_string()));
    assert!(lines.contains(&"Friday 07 August 2026".to_string()));
    assert!(lines.iter().filter(|l| *l == &"-".repeat(32)).count() >= 4);
}

#[test]
fn lines_never_exceed_paper_width() {
    let events = vec![timed_event(
        "A very long event title that would wrap on thirty-two column paper",
        9,
        0,
    )];
    let tasks = vec![task(
        "x",
        "An equally long task title that must be clipped to the device width",
        "A rather verbose task list name",
    )];
    let lines = render(day(), &events, &tasks, &HashMap::new());
    for line in &lines {
        assert!(
            line.chars().count() <= PAPER_WIDTH,
            "line too wide: {:?}",
            line
        );
    }
}

#[test]
fn untitled_event_placeholder() {
    let events = vec![Event::new(None, EventStart::AllDay(day()))];
    let lines = render(day(), &events, &[], &HashMap::new());
    assert!(lines.contains(&"1. ALL DAY - Untitled Event".to_string()));
}
