//! Command and state-publication protocol between the session engine and
//! its external collaborators.

use serde::{Deserialize, Serialize};

use crate::domain::WorkoutId;

/// Closed set of control commands accepted by the session engine.
///
/// Only `Start` carries a payload. Commands invalid for the current phase
/// are ignored by the engine, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionCommand {
    Start { workout_id: WorkoutId },
    Pause,
    Resume,
    Cancel,
}

impl SessionCommand {
    /// Parse the action-string form used by presentation surfaces:
    /// `start:<id>`, `pause`, `resume`, `cancel`. Anything else is
    /// malformed and yields `None`.
    pub fn parse_action(action: &str) -> Option<Self> {
        let action = action.trim();
        if let Some(raw_id) = action.strip_prefix("start:") {
            let id = raw_id.trim().parse::<i64>().ok()?;
            return Some(Self::Start {
                workout_id: WorkoutId(id),
            });
        }
        match action {
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    /// Stable name for logging.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
        }
    }
}

/// Published session phase. `Uninitialized` sessions never publish, so it
/// has no representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Running,
    Paused,
    Expired,
}

/// One immutable published view of session state.
///
/// `remaining_millis` is the raw countdown value at publish time;
/// `whole_second_remaining_millis` is the last whole-second boundary
/// crossed, which is what second-granular displays show regardless of
/// tick cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub remaining_millis: u64,
    pub whole_second_remaining_millis: u64,
    pub repetitions_remaining: u32,
    pub workout_name: String,
}

/// Format a millisecond countdown as `HH:MM:SS` for display.
pub fn format_countdown(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
