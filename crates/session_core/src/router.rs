//! Serialization point for commands from concurrent producers.
//!
//! Every producer holds a clone of the router; all commands funnel into
//! the control task's single-consumer queue, so they are applied one at a
//! time in arrival order with no interleaving of effects.

use shared::protocol::SessionCommand;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::runtime::ControlMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("session command queue is full")]
    QueueFull,
    #[error("session control task is no longer running")]
    Closed,
}

#[derive(Clone)]
pub struct CommandRouter {
    tx: mpsc::Sender<ControlMessage>,
}

impl CommandRouter {
    pub(crate) fn new(tx: mpsc::Sender<ControlMessage>) -> Self {
        Self { tx }
    }

    pub(crate) async fn send_control(&self, message: ControlMessage) {
        let _ = self.tx.send(message).await;
    }

    /// Queue a command for the control task.
    pub fn dispatch(&self, command: SessionCommand) -> Result<(), DispatchError> {
        let name = command.action_name();
        match self.tx.try_send(ControlMessage::Command(command)) {
            Ok(()) => {
                debug!(command = name, "queued session command");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(DispatchError::Closed),
        }
    }

    /// Queue a command given in its action-string form. Unknown or
    /// malformed actions are dropped silently; the command set is closed
    /// and stray input is not an error.
    pub fn dispatch_action(&self, action: &str) {
        match SessionCommand::parse_action(action) {
            Some(command) => {
                if let Err(err) = self.dispatch(command) {
                    warn!(action, %err, "failed to queue session command");
                }
            }
            None => debug!(action, "dropping unknown session action"),
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
