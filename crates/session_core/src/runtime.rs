//! The session control task.
//!
//! One tokio task owns the [`SessionEngine`] and its [`SessionClock`];
//! commands and tick delivery are multiplexed onto it through a biased
//! `select!`, so within any dispatch cycle commands are processed before
//! the clock. A `Pause` or `Cancel` racing a natural expiry wins.

use std::{sync::Arc, time::Duration};

use shared::{domain::WorkoutDefinition, error::StoreError, protocol::SessionCommand};
use storage::WorkoutStore;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    bus::{StateBus, StateSubscriber},
    clock::SessionClock,
    engine::SessionEngine,
    router::CommandRouter,
};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Clock period; the engine decrements by this amount per tick.
    pub tick_interval: Duration,
    /// Depth of the serialized command queue.
    pub command_queue_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            command_queue_depth: 32,
        }
    }
}

pub(crate) enum ControlMessage {
    Command(SessionCommand),
    DefinitionResolved {
        generation: u64,
        result: Result<WorkoutDefinition, StoreError>,
    },
    Shutdown,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The control task died without running its teardown path; the tick
    /// stream can no longer be guaranteed stopped, so the session must be
    /// discarded by its owner.
    #[error("session control task failed")]
    ControlTaskFailed(#[source] tokio::task::JoinError),
}

pub struct SessionRuntime;

impl SessionRuntime {
    /// Spawn the control task for one session. The bus is moved in; take
    /// subscribers from the returned handle (or beforehand).
    pub fn spawn(
        store: Arc<dyn WorkoutStore>,
        bus: StateBus,
        config: RuntimeConfig,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::channel(config.command_queue_depth);
        let router = CommandRouter::new(tx.clone());
        let subscriber = bus.subscribe();
        let task = tokio::spawn(run_control_loop(store, bus, rx, tx, config));
        SessionHandle {
            router,
            subscriber,
            task,
        }
    }
}

pub struct SessionHandle {
    router: CommandRouter,
    subscriber: StateSubscriber,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn router(&self) -> CommandRouter {
        self.router.clone()
    }

    pub fn subscribe(&self) -> StateSubscriber {
        self.subscriber.clone()
    }

    /// Stop the control task and wait for its teardown to finish. When
    /// this returns `Ok`, the clock is stopped and no further tick or
    /// snapshot will be produced.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        // A send failure just means the task already exited on its own.
        self.router.send_control(ControlMessage::Shutdown).await;
        self.task.await.map_err(SessionError::ControlTaskFailed)
    }
}

struct ControlState {
    engine: SessionEngine,
    clock: SessionClock,
    bus: StateBus,
    store: Arc<dyn WorkoutStore>,
    tx: mpsc::Sender<ControlMessage>,
    config: RuntimeConfig,
    /// Distinguishes the lookup a resolution belongs to; stale results
    /// (superseded by a Cancel or a newer Start) are discarded.
    lookup_generation: u64,
    lookup_in_flight: bool,
}

async fn run_control_loop(
    store: Arc<dyn WorkoutStore>,
    bus: StateBus,
    mut rx: mpsc::Receiver<ControlMessage>,
    tx: mpsc::Sender<ControlMessage>,
    config: RuntimeConfig,
) {
    let mut state = ControlState {
        engine: SessionEngine::new(),
        clock: SessionClock::new(),
        bus,
        store,
        tx,
        config,
        lookup_generation: 0,
        lookup_in_flight: false,
    };

    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => {
                match msg {
                    None | Some(ControlMessage::Shutdown) => break,
                    Some(ControlMessage::Command(command)) => state.on_command(command),
                    Some(ControlMessage::DefinitionResolved { generation, result }) => {
                        state.on_resolved(generation, result);
                    }
                }
            }
            _ = state.clock.tick() => state.on_clock_tick(),
        }
        state.sync_clock();
    }

    // Teardown: stop the clock on every exit path. The clock lives on
    // this task, so after this line no tick can ever be delivered.
    state.clock.stop();
    debug!("session control task stopped");
}

impl ControlState {
    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { workout_id } => {
                if self.engine.definition_bound() {
                    // Restart without a store round trip.
                    let snapshot = self.engine.restart();
                    self.publish(snapshot);
                } else if self.lookup_in_flight {
                    debug!(workout_id = workout_id.0, "lookup already in flight, ignoring start");
                } else {
                    self.lookup_generation += 1;
                    self.lookup_in_flight = true;
                    let generation = self.lookup_generation;
                    let store = Arc::clone(&self.store);
                    let tx = self.tx.clone();
                    debug!(workout_id = workout_id.0, "resolving workout definition");
                    tokio::spawn(async move {
                        let result = store.lookup(workout_id).await;
                        // Send failure means the control task is gone.
                        let _ = tx
                            .send(ControlMessage::DefinitionResolved { generation, result })
                            .await;
                    });
                }
            }
            SessionCommand::Pause => {
                let snapshot = self.engine.pause();
                self.publish(snapshot);
            }
            SessionCommand::Resume => {
                let snapshot = self.engine.resume();
                self.publish(snapshot);
            }
            SessionCommand::Cancel => {
                // A cancel also invalidates any lookup still in flight.
                self.lookup_in_flight = false;
                let snapshot = self.engine.cancel();
                self.publish(snapshot);
            }
        }
    }

    fn on_resolved(
        &mut self,
        generation: u64,
        result: Result<WorkoutDefinition, StoreError>,
    ) {
        if !self.lookup_in_flight || generation != self.lookup_generation {
            debug!("discarding stale workout lookup result");
            return;
        }
        self.lookup_in_flight = false;
        match result {
            Ok(definition) => {
                if let Err(err) = definition.validate() {
                    warn!(%err, "resolved workout definition is invalid");
                    return;
                }
                let snapshot = self.engine.bind(definition);
                self.publish(snapshot);
            }
            Err(StoreError::NotFound { id }) => {
                // Recovered locally: session stays unbound and nothing is
                // published, so the presentation surface keeps showing no
                // active session.
                warn!(workout_id = id.0, "workout not found, session not started");
            }
            Err(err) => {
                warn!(%err, "workout lookup failed, session not started");
            }
        }
    }

    fn on_clock_tick(&mut self) {
        let elapsed = self.config.tick_interval.as_millis() as u64;
        let snapshot = self.engine.on_tick(elapsed);
        self.publish(snapshot);
    }

    /// Reconcile the clock with the engine phase. `start` is a no-op while
    /// running and `stop` is idempotent, so calling this after every step
    /// is safe and keeps exactly one tick stream alive while `Running`.
    fn sync_clock(&mut self) {
        if self.engine.is_running() {
            self.clock.start(self.config.tick_interval);
        } else {
            self.clock.stop();
        }
    }

    fn publish(&self, snapshot: Option<shared::protocol::SessionSnapshot>) {
        if let Some(snapshot) = snapshot {
            self.bus.publish(snapshot);
        }
    }
}
