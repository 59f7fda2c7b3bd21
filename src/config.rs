//! Tuning constants for the cooking simulation and the session guard.
//!
//! Every field has a default matching the shipped minigame; the browser glue
//! may override any subset from a JSON object passed to `init_cooking`.

use serde::Deserialize;

use crate::error::CookingError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookingConfig {
    /// Period of the repeating tick task, in milliseconds.
    pub tick_ms: u32,
    /// Fire level a fresh cook starts with.
    pub start_fire: f64,
    /// Passive fire loss per tick.
    pub fire_decay: f64,
    /// Progress only accrues while fire is strictly above this.
    pub heat_threshold: f64,
    /// Progress gained per tick at fire == 100.
    pub progress_rate: f64,
    pub scorch_threshold: f64,
    pub scorch_penalty: f64,
    pub chill_penalty: f64,
    /// Once progress reaches this the under-heat penalty stops applying.
    pub chill_grace_progress: f64,
    /// Minimum final quality for the dish to yield its result item.
    pub success_quality: f64,
    pub start_guard_ms: u32,
    pub close_guard_ms: u32,
    pub open_guard_ms: u32,
    /// Delay before a resolved session dismisses the UI; `None` keeps it open.
    pub auto_close_ms: Option<u32>,
    pub log_level: String,
}

impl Default for CookingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            start_fire: 30.0,
            fire_decay: 0.2,
            heat_threshold: 20.0,
            progress_rate: 0.8,
            scorch_threshold: 80.0,
            scorch_penalty: 0.3,
            chill_penalty: 0.1,
            chill_grace_progress: 80.0,
            success_quality: 30.0,
            start_guard_ms: 1000,
            close_guard_ms: 200,
            open_guard_ms: 500,
            auto_close_ms: Some(1000),
            log_level: "info".to_string(),
        }
    }
}

impl CookingConfig {
    pub fn from_json(raw: &str) -> Result<Self, CookingError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parsed `log_level`, falling back to `Info` for unrecognised names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
