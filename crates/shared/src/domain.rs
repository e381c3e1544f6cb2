use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkoutId(pub i64);

impl std::fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable workout definition resolved from the store.
///
/// `exercise_duration_millis` is the countdown length of a single
/// repetition; a session runs `repetitions` of them back to back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub id: WorkoutId,
    pub name: String,
    pub exercise_duration_millis: u64,
    pub repetitions: u32,
}

impl WorkoutDefinition {
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.exercise_duration_millis == 0 {
            return Err(DefinitionError::ZeroDuration { id: self.id });
        }
        if self.repetitions == 0 {
            return Err(DefinitionError::ZeroRepetitions { id: self.id });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("workout {id} has zero exercise duration")]
    ZeroDuration { id: WorkoutId },
    #[error("workout {id} has zero repetitions")]
    ZeroRepetitions { id: WorkoutId },
}
