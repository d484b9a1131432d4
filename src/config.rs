// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::Priority;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

fn default_printer_port() -> String {
    "COM4".to_string()
}
fn default_printer_baudrate() -> u32 {
    9600
}
fn default_schedules() -> Vec<String> {
    vec![
        "08:00".to_string(),
        "12:00".to_string(),
        "18:00".to_string(),
    ]
}
fn default_fetch_timeout() -> u64 {
    30
}
fn default_print_timeout() -> u64 {
    5
}
fn default_calendar_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}
fn default_tasks_url() -> String {
    "https://tasks.googleapis.com/tasks/v1".to_string()
}
fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_printer_port")]
    pub printer_port: String,
    #[serde(default = "default_printer_baudrate")]
    pub printer_baudrate: u32,

    /// Daily trigger times as "HH:MM". Duplicates and out-of-order entries
    /// are tolerated; the scheduler de-duplicates by minute.
    #[serde(default = "default_schedules")]
    pub schedules: Vec<String>,

    /// Per-task priority overrides, keyed by the provider-assigned task id.
    /// Tasks without an entry are Normal.
    #[serde(default)]
    pub task_priorities: HashMap<String, Priority>,

    #[serde(default)]
    pub auto_start: bool,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_print_timeout")]
    pub print_timeout_secs: u64,

    #[serde(default = "default_calendar_url")]
    pub calendar_url: String,
    #[serde(default = "default_tasks_url")]
    pub tasks_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            printer_port: default_printer_port(),
            printer_baudrate: default_printer_baudrate(),
            schedules: default_schedules(),
            task_priorities: HashMap::new(),
            auto_start: false,
            fetch_timeout_secs: default_fetch_timeout(),
            print_timeout_secs: default_print_timeout(),
            calendar_url: default_calendar_url(),
            tasks_url: default_tasks_url(),
            token_url: default_token_url(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        // Read the file with contextualized error (covers permission/IO issues).
        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        // Parse TOML with contextualized error (covers syntax issues).
        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Load the configuration, falling back entirely to defaults when the
    /// file is missing, unreadable or malformed. Startup never fails on a
    /// corrupt config; the problem is logged instead.
    pub fn load_or_default(ctx: &dyn AppContext) -> Self {
        match Self::load(ctx) {
            Ok(config) => config,
            Err(e) => {
                if !e.to_string().contains("Config file not found") {
                    log::warn!("Using default configuration: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&path, toml_str).map_err(|e| {
            anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e)
        })?;
        Ok(())
    }

    /// Get the config file path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Resolve the priority for a task id against the override map.
    pub fn priority_for(&self, task_id: &str) -> Priority {
        self.task_priorities
            .get(task_id)
            .copied()
            .unwrap_or_default()
    }
}
