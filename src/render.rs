// File: src/render.rs
//! Pure report formatter.
//!
//! `render` turns (date, events, tasks, priority overrides) into the exact
//! sequence of lines the printer receives. It is deterministic (same inputs,
//! same bytes) and never panics: malformed records were already degraded to
//! placeholder values when the models were built.

use crate::model::{Event, PRIMARY_LIST, Priority, TaskItem};
use chrono::NaiveDate;
use std::collections::HashMap;
use unicode_width::UnicodeWidthChar;

/// Printable width of the receipt paper, in display columns.
pub const PAPER_WIDTH: usize = 32;

/// Blank lines fed after the footer so the report clears the tear bar.
const FEED_LINES: usize = 5;

fn separator() -> String {
    "-".repeat(PAPER_WIDTH)
}

/// Truncate a line to the paper width, counting display columns rather
/// than chars so wide glyphs do not wrap mid-line.
fn clip(line: String) -> String {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        width += c.width().unwrap_or(0);
        if width > PAPER_WIDTH {
            return line[..i].to_string();
        }
    }
    line
}

fn push(lines: &mut Vec<String>, line: String) {
    lines.push(clip(line));
}

/// Render the daily report. Event order and task order are preserved as
/// given; tasks are not re-sorted.
pub fn render(
    today: NaiveDate,
    events: &[Event],
    tasks: &[TaskItem],
    priorities: &HashMap<String, Priority>,
) -> Vec<String> {
    let mut lines = Vec::new();

    // Header
    lines.push(String::new());
    push(&mut lines, "DAILY SCHEDULE".to_string());
    lines.push(separator());
    push(&mut lines, today.format("%A %d %B %Y").to_string());
    lines.push(separator());

    // Events section
    lines.push(String::new());
    push(&mut lines, "EVENTS:".to_string());
    lines.push(separator());
    if events.is_empty() {
        push(&mut lines, "No events today".to_string());
    } else {
        for (i, event) in events.iter().enumerate() {
            push(
                &mut lines,
                format!("{}. {} - {}", i + 1, event.start.format_time(), event.title),
            );
        }
    }

    // Tasks section
    lines.push(String::new());
    push(&mut lines, "TASKS:".to_string());
    lines.push(separator());
    if tasks.is_empty() {
        push(&mut lines, "No pending tasks".to_string());
    } else {
        for (i, task) in tasks.iter().enumerate() {
            let priority = priorities.get(&task.id).copied().unwrap_or_default();
            push(
                &mut lines,
                format!("{}. [ ] {}{}", i + 1, priority.marker(), task.title),
            );
            if task.list_name != PRIMARY_LIST {
                push(&mut lines, format!("    List: {}", task.list_name));
            }
        }
    }

    // Footer
    lines.push(separator());
    push(
        &mut lines,
        format!("Events: {} | Tasks: {}", events.len(), tasks.len()),
    );
    for _ in 0..FEED_LINES {
        lines.push(String::new());
    }

    lines
}
