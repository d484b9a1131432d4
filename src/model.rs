// File: src/model.rs
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The primary/default task list name. Tasks belonging to it are printed
/// without a "List:" annotation.
pub const PRIMARY_LIST: &str = "My Tasks";

pub const UNTITLED_EVENT: &str = "Untitled Event";
pub const UNTITLED_TASK: &str = "Untitled Task";

// --- DATE TYPES ---

/// Start of a calendar event: either a date-only ("all day") marker or a
/// precise timestamp.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventStart {
    AllDay(NaiveDate),
    At(DateTime<Local>),
}

impl EventStart {
    /// Display time for the report: "ALL DAY" or a 12-hour clock.
    pub fn format_time(&self) -> String {
        match self {
            EventStart::AllDay(_) => "ALL DAY".to_string(),
            EventStart::At(dt) => dt.format("%I:%M %p").to_string(),
        }
    }
}

/// A calendar event as fetched from the provider. Immutable once fetched.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub start: EventStart,
}

impl Event {
    pub fn new(title: Option<String>, start: EventStart) -> Self {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => UNTITLED_EVENT.to_string(),
        };
        Self { title, start }
    }
}

/// A to-do item as fetched from the provider, tagged with the name of the
/// list it came from. Immutable once fetched.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub list_name: String,
}

impl TaskItem {
    pub fn new(id: String, title: Option<String>, list_name: Option<String>) -> Self {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => UNTITLED_TASK.to_string(),
        };
        Self {
            id,
            title,
            list_name: list_name.unwrap_or_else(|| PRIMARY_LIST.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Marker printed directly before a task title.
    pub fn marker(&self) -> &'static str {
        match self {
            Priority::Normal => "",
            Priority::High => "!!! ",
        }
    }
}

/// Terminal result of one print job. Exactly one is produced per job and
/// delivered to whoever observes the runner (log panel, console, caller).
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub success: bool,
    pub message: String,
}

impl JobOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
