use super::*;
use shared::domain::{WorkoutDefinition, WorkoutId};

fn definition(duration: u64, repetitions: u32) -> WorkoutDefinition {
    WorkoutDefinition {
        id: WorkoutId(1),
        name: "Push Ups".to_string(),
        exercise_duration_millis: duration,
        repetitions,
    }
}

fn running_engine(duration: u64, repetitions: u32) -> SessionEngine {
    let mut engine = SessionEngine::new();
    engine.bind(definition(duration, repetitions)).expect("bind publishes");
    engine
}

#[test]
fn bind_starts_first_repetition() {
    let mut engine = SessionEngine::new();

    let snapshot = engine.bind(definition(3_000, 2)).expect("snapshot");
    assert_eq!(snapshot.phase, SessionPhase::Running);
    assert_eq!(snapshot.remaining_millis, 3_000);
    assert_eq!(snapshot.whole_second_remaining_millis, 3_000);
    assert_eq!(snapshot.repetitions_remaining, 2);
    assert_eq!(snapshot.workout_name, "Push Ups");
    assert!(engine.definition_bound());
}

#[test]
fn bind_is_ignored_while_bound() {
    let mut engine = running_engine(3_000, 2);
    assert!(engine.bind(definition(9_000, 9)).is_none());
    assert_eq!(engine.remaining_millis(), 3_000);
}

#[test]
fn scenario_two_repetitions_roll_over_then_expire() {
    let mut engine = running_engine(3_000, 2);

    // First repetition: two second-boundary crossings, then rollover.
    let s = engine.on_tick(1_000).expect("crossing");
    assert_eq!(s.whole_second_remaining_millis, 2_000);
    let s = engine.on_tick(1_000).expect("crossing");
    assert_eq!(s.whole_second_remaining_millis, 1_000);

    let rollover = engine.on_tick(1_000).expect("rollover");
    assert_eq!(rollover.phase, SessionPhase::Running);
    assert_eq!(rollover.remaining_millis, 3_000);
    assert_eq!(rollover.repetitions_remaining, 1);

    // Second repetition runs to expiry.
    engine.on_tick(1_000).expect("crossing");
    engine.on_tick(1_000).expect("crossing");
    let expired = engine.on_tick(1_000).expect("expiry");
    assert_eq!(expired.phase, SessionPhase::Expired);
    assert_eq!(expired.remaining_millis, 3_000);
    assert_eq!(expired.repetitions_remaining, 2);
    assert_eq!(engine.phase(), EnginePhase::Expired);
}

#[test]
fn remaining_is_non_increasing_and_never_negative() {
    let mut engine = running_engine(5_000, 1);
    let mut last = engine.remaining_millis();

    for _ in 0..20 {
        engine.on_tick(777);
        let now = engine.remaining_millis();
        if engine.phase() == EnginePhase::Running {
            assert!(now <= last);
        }
        last = now;
    }
    assert_eq!(engine.phase(), EnginePhase::Expired);
}

#[test]
fn sub_second_ticks_publish_once_per_boundary() {
    let mut engine = running_engine(3_000, 1);

    // 250ms ticks: three silent ticks, then the 2000 boundary.
    assert!(engine.on_tick(250).is_none());
    assert!(engine.on_tick(250).is_none());
    assert!(engine.on_tick(250).is_none());
    let s = engine.on_tick(250).expect("boundary");
    assert_eq!(s.whole_second_remaining_millis, 2_000);
    assert_eq!(s.remaining_millis, 2_000);
}

#[test]
fn oversized_tick_lowers_mark_to_last_boundary_crossed() {
    let mut engine = running_engine(10_000, 1);

    // Boundaries 9000, 8000 and 7000 were all crossed in one tick; the
    // display lands on the last one crossed.
    let s = engine.on_tick(3_400).expect("boundary");
    assert_eq!(s.remaining_millis, 6_600);
    assert_eq!(s.whole_second_remaining_millis, 7_000);
}

#[test]
fn pause_then_resume_keeps_remaining_unchanged() {
    let mut engine = running_engine(5_000, 1);
    engine.on_tick(1_000).expect("boundary");
    engine.on_tick(1_000).expect("boundary");
    assert_eq!(engine.remaining_millis(), 3_000);

    let paused = engine.pause().expect("pause publishes");
    assert_eq!(paused.phase, SessionPhase::Paused);
    assert_eq!(paused.remaining_millis, 3_000);

    let resumed = engine.resume().expect("resume publishes");
    assert_eq!(resumed.phase, SessionPhase::Running);
    assert_eq!(resumed.remaining_millis, 3_000);
}

#[test]
fn phase_invalid_commands_publish_nothing() {
    let mut engine = SessionEngine::new();
    assert!(engine.pause().is_none());
    assert!(engine.resume().is_none());
    assert!(engine.cancel().is_none());
    assert!(engine.on_tick(1_000).is_none());

    let mut engine = running_engine(3_000, 1);
    assert!(engine.resume().is_none(), "resume while running");

    engine.pause().expect("pause");
    assert!(engine.pause().is_none(), "pause while paused");
    assert!(engine.on_tick(1_000).is_none(), "tick while paused");
    assert_eq!(engine.remaining_millis(), 3_000);
}

#[test]
fn pause_while_expired_publishes_nothing() {
    let mut engine = running_engine(1_000, 1);
    engine.on_tick(1_000).expect("expiry");

    assert!(engine.pause().is_none());
    assert_eq!(engine.phase(), EnginePhase::Expired);
}

#[test]
fn cancel_resets_and_unbinds() {
    let mut engine = running_engine(3_000, 2);
    engine.on_tick(1_000).expect("boundary");

    let cancelled = engine.cancel().expect("cancel publishes");
    assert_eq!(cancelled.phase, SessionPhase::Expired);
    assert_eq!(cancelled.remaining_millis, 3_000);
    assert_eq!(cancelled.repetitions_remaining, 2);

    assert!(!engine.definition_bound(), "next start must re-fetch");
    assert_eq!(engine.phase(), EnginePhase::Uninitialized);
}

#[test]
fn cancel_after_expiry_unbinds_without_publishing() {
    let mut engine = running_engine(1_000, 1);
    engine.on_tick(1_000).expect("expiry");

    assert!(engine.cancel().is_none(), "expiry snapshot already shows nominal state");
    assert!(!engine.definition_bound());
}

#[test]
fn restart_after_expiry_runs_again_without_lookup() {
    let mut engine = running_engine(2_000, 2);
    for _ in 0..4 {
        engine.on_tick(1_000);
    }
    assert_eq!(engine.phase(), EnginePhase::Expired);

    let restarted = engine.restart().expect("restart publishes");
    assert_eq!(restarted.phase, SessionPhase::Running);
    assert_eq!(restarted.remaining_millis, 2_000);
    assert_eq!(restarted.repetitions_remaining, 2);

    // The restarted session counts repetitions from scratch.
    engine.on_tick(1_000).expect("boundary");
    let rollover = engine.on_tick(1_000).expect("rollover");
    assert_eq!(rollover.repetitions_remaining, 1);
}

#[test]
fn restart_mid_session_resets_current_repetition_only() {
    let mut engine = running_engine(3_000, 3);
    for _ in 0..3 {
        engine.on_tick(1_000);
    }
    // One repetition completed, second one in progress.
    engine.on_tick(1_000).expect("boundary");

    let restarted = engine.restart().expect("restart publishes");
    assert_eq!(restarted.remaining_millis, 3_000);
    assert_eq!(restarted.repetitions_remaining, 2);
}

#[test]
fn resume_reanchors_second_mark_to_stored_remaining() {
    let mut engine = running_engine(5_000, 1);
    assert!(engine.on_tick(600).is_none());
    let s = engine.on_tick(600).expect("boundary at 4000");
    assert_eq!(s.whole_second_remaining_millis, 4_000);
    assert_eq!(engine.remaining_millis(), 3_800);

    engine.pause().expect("pause");
    let resumed = engine.resume().expect("resume");
    assert_eq!(resumed.whole_second_remaining_millis, 3_800);

    // Next boundary is a full second below the resume point.
    assert!(engine.on_tick(600).is_none());
    let s = engine.on_tick(600).expect("boundary");
    assert_eq!(s.whole_second_remaining_millis, 2_800);
    assert_eq!(s.remaining_millis, 2_600);
}
