use thiserror::Error;

use crate::domain::WorkoutId;

/// Failures surfaced by a workout store lookup.
///
/// The engine only distinguishes "the id does not exist" (recovered
/// locally, session stays unbound) from "the backend broke".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workout {id} not found")]
    NotFound { id: WorkoutId },
    #[error("workout store backend failure")]
    Backend(#[from] anyhow::Error),
}
