//! The session state machine.
//!
//! `SessionEngine` owns its state exclusively and is only ever driven from
//! the control task, so it needs no locking. Every method returns the
//! snapshot to publish, if the transition is observable; invalid commands
//! for the current phase return `None` and change nothing, since duplicate
//! button presses and command/tick races are expected traffic.

use shared::{
    domain::WorkoutDefinition,
    protocol::{SessionPhase, SessionSnapshot},
};
use tracing::debug;

const WHOLE_SECOND_MILLIS: u64 = 1_000;

/// Engine-internal phase. `Uninitialized` never appears in a published
/// snapshot; it maps onto the "no active session" presentation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Uninitialized,
    Running,
    Paused,
    Expired,
}

pub struct SessionEngine {
    definition: Option<WorkoutDefinition>,
    phase: EnginePhase,
    remaining_millis: u64,
    /// Repetitions completed so far, 0-based.
    repetition_index: u32,
    /// Last second-aligned remaining value shown to observers.
    last_whole_second_mark: u64,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            definition: None,
            phase: EnginePhase::Uninitialized,
            remaining_millis: 0,
            repetition_index: 0,
            last_whole_second_mark: 0,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == EnginePhase::Running
    }

    /// Whether a `Start` command should restart in place instead of
    /// performing a store lookup. `Cancel` drops the binding; natural
    /// expiry keeps it.
    pub fn definition_bound(&self) -> bool {
        self.definition.is_some()
    }

    pub fn remaining_millis(&self) -> u64 {
        self.remaining_millis
    }

    /// Bind a freshly resolved definition and start the first repetition.
    /// Ignored if a session is already bound.
    pub fn bind(&mut self, definition: WorkoutDefinition) -> Option<SessionSnapshot> {
        if self.definition.is_some() {
            return None;
        }
        debug!(
            workout_id = definition.id.0,
            workout = %definition.name,
            "binding workout definition"
        );
        self.remaining_millis = definition.exercise_duration_millis;
        self.last_whole_second_mark = definition.exercise_duration_millis;
        self.repetition_index = 0;
        self.phase = EnginePhase::Running;
        self.definition = Some(definition);
        Some(self.snapshot())
    }

    /// `Start` while a definition is already bound: restart the countdown
    /// from the full duration without a store round trip.
    pub fn restart(&mut self) -> Option<SessionSnapshot> {
        let definition = self.definition.as_ref()?;
        self.remaining_millis = definition.exercise_duration_millis;
        self.last_whole_second_mark = definition.exercise_duration_millis;
        if self.phase == EnginePhase::Expired {
            self.repetition_index = 0;
        }
        self.phase = EnginePhase::Running;
        Some(self.snapshot())
    }

    /// Valid only while `Running`; otherwise a silent no-op.
    pub fn pause(&mut self) -> Option<SessionSnapshot> {
        if self.phase != EnginePhase::Running {
            return None;
        }
        self.phase = EnginePhase::Paused;
        Some(self.snapshot())
    }

    /// Valid only while `Paused`. The countdown continues from the stored
    /// remaining time; elapsed pause time is never subtracted.
    pub fn resume(&mut self) -> Option<SessionSnapshot> {
        if self.phase != EnginePhase::Paused {
            return None;
        }
        self.phase = EnginePhase::Running;
        // Re-anchor the second mark so the next boundary is one whole
        // second below the value the display resumes at.
        self.last_whole_second_mark = self.remaining_millis;
        Some(self.snapshot())
    }

    /// Terminal reset from any bound phase. Publishes the idle/cancelled
    /// snapshot (nominal duration and repetition count), then drops the
    /// binding so the next `Start` re-fetches the definition.
    pub fn cancel(&mut self) -> Option<SessionSnapshot> {
        let definition = self.definition.take()?;
        let was_expired = self.phase == EnginePhase::Expired;
        self.phase = EnginePhase::Uninitialized;
        self.remaining_millis = 0;
        self.last_whole_second_mark = 0;
        self.repetition_index = 0;
        if was_expired {
            // The expiry snapshot already shows the nominal workout;
            // nothing observable changes.
            return None;
        }
        Some(SessionSnapshot {
            phase: SessionPhase::Expired,
            remaining_millis: definition.exercise_duration_millis,
            whole_second_remaining_millis: definition.exercise_duration_millis,
            repetitions_remaining: definition.repetitions,
            workout_name: definition.name,
        })
    }

    /// Consume one clock tick worth of elapsed time. Only meaningful while
    /// `Running`; ticks in any other phase are dropped.
    ///
    /// Publishes at second granularity: a snapshot is produced when the
    /// countdown crosses a whole-second boundary, when a repetition rolls
    /// over, and when the final repetition expires, never once per raw
    /// tick.
    pub fn on_tick(&mut self, elapsed_millis: u64) -> Option<SessionSnapshot> {
        if self.phase != EnginePhase::Running {
            return None;
        }
        let definition = self.definition.as_ref()?;

        self.remaining_millis = self.remaining_millis.saturating_sub(elapsed_millis);

        if self.remaining_millis == 0 {
            self.repetition_index += 1;
            if self.repetition_index < definition.repetitions {
                // Rollover: next repetition starts immediately.
                self.remaining_millis = definition.exercise_duration_millis;
                self.last_whole_second_mark = definition.exercise_duration_millis;
                debug!(
                    repetition = self.repetition_index,
                    of = definition.repetitions,
                    "repetition rollover"
                );
                return Some(self.snapshot());
            }
            // Final repetition done: terminal until a fresh Start. The
            // post-expiry display shows the nominal workout, not zeros.
            self.phase = EnginePhase::Expired;
            self.remaining_millis = definition.exercise_duration_millis;
            self.last_whole_second_mark = definition.exercise_duration_millis;
            debug!("session expired");
            return Some(self.snapshot());
        }

        let mut crossed = false;
        while self.last_whole_second_mark >= WHOLE_SECOND_MILLIS
            && self.remaining_millis <= self.last_whole_second_mark - WHOLE_SECOND_MILLIS
        {
            self.last_whole_second_mark -= WHOLE_SECOND_MILLIS;
            crossed = true;
        }
        if crossed {
            return Some(self.snapshot());
        }
        None
    }

    fn snapshot(&self) -> SessionSnapshot {
        let definition = self
            .definition
            .as_ref()
            .expect("snapshot requires a bound definition");
        let phase = match self.phase {
            EnginePhase::Running => SessionPhase::Running,
            EnginePhase::Paused => SessionPhase::Paused,
            EnginePhase::Expired => SessionPhase::Expired,
            EnginePhase::Uninitialized => unreachable!("unbound sessions never publish"),
        };
        let repetitions_remaining = if self.phase == EnginePhase::Expired {
            definition.repetitions
        } else {
            definition.repetitions - self.repetition_index
        };
        SessionSnapshot {
            phase,
            remaining_millis: self.remaining_millis,
            whole_second_remaining_millis: self.last_whole_second_mark,
            repetitions_remaining,
            workout_name: definition.name.clone(),
        }
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
