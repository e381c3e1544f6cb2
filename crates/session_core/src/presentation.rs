//! Bridges the state bus to a presentation surface.
//!
//! Each snapshot is turned into a fresh, immutable [`PresentationView`];
//! a previously rendered view is never mutated in place. The two action
//! buttons carry the action strings a surface feeds back into
//! [`crate::CommandRouter::dispatch_action`], closing the
//! state → render → button → command → state loop.

use shared::protocol::{format_countdown, SessionPhase, SessionSnapshot};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::bus::StateSubscriber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: &'static str,
    /// Action-string form of the command this button emits.
    pub action: &'static str,
}

/// Immutable render description for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationView {
    pub title: String,
    pub countdown: String,
    pub repetitions_remaining: u32,
    pub phase: SessionPhase,
    pub primary: ActionButton,
    pub secondary: ActionButton,
}

impl PresentationView {
    /// Build the view for a snapshot. The primary button toggles between
    /// pausing and resuming; the secondary always cancels.
    pub fn for_snapshot(snapshot: &SessionSnapshot) -> Self {
        let primary = match snapshot.phase {
            SessionPhase::Running => ActionButton {
                label: "Pause",
                action: "pause",
            },
            SessionPhase::Paused | SessionPhase::Expired => ActionButton {
                label: "Resume",
                action: "resume",
            },
        };
        Self {
            title: snapshot.workout_name.clone(),
            countdown: format_countdown(snapshot.whole_second_remaining_millis),
            repetitions_remaining: snapshot.repetitions_remaining,
            phase: snapshot.phase,
            primary,
            secondary: ActionButton {
                label: "Cancel",
                action: "cancel",
            },
        }
    }
}

/// Renders views; implemented by the app's presentation surface.
pub trait PresentationSink: Send {
    fn render(&mut self, view: &PresentationView);
}

/// Subscribes once per session lifetime and renders every observed
/// snapshot until the session's bus is gone.
pub struct PresentationSynchronizer<S: PresentationSink> {
    subscriber: StateSubscriber,
    sink: S,
}

impl<S: PresentationSink> PresentationSynchronizer<S> {
    pub fn new(subscriber: StateSubscriber, sink: S) -> Self {
        Self { subscriber, sink }
    }

    pub async fn run(mut self) {
        let mut snapshots = self.subscriber.into_stream();
        while let Some(value) = snapshots.next().await {
            // The stream yields the current bus value first; before any
            // session has published that value is empty.
            if let Some(snapshot) = value {
                let view = PresentationView::for_snapshot(&snapshot);
                self.sink.render(&view);
            }
        }
        debug!("presentation synchronizer stopped");
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
