//! Latest-value broadcast of session snapshots.
//!
//! One writer (the control task), any number of subscribers. Late
//! subscribers observe the latest snapshot immediately; a slow subscriber
//! may skip intermediate values but always lands on the newest one. There
//! is deliberately no global instance; the bus is constructed by whoever
//! owns the session and handed to every consumer explicitly.

use shared::protocol::SessionSnapshot;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub struct StateBus {
    tx: watch::Sender<Option<SessionSnapshot>>,
}

impl StateBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Publish a snapshot, superseding the previous one for all
    /// subscribers.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    pub fn subscribe(&self) -> StateSubscriber {
        StateSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    /// The most recently published snapshot, `None` until a session has
    /// published at least once.
    pub fn latest(&self) -> Option<SessionSnapshot> {
        self.tx.borrow().clone()
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct StateSubscriber {
    rx: watch::Receiver<Option<SessionSnapshot>>,
}

impl StateSubscriber {
    pub fn latest(&self) -> Option<SessionSnapshot> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot. Returns `None` once the bus
    /// has been dropped and no further snapshot can arrive.
    pub async fn next(&mut self) -> Option<SessionSnapshot> {
        loop {
            self.rx.changed().await.ok()?;
            let value = self.rx.borrow_and_update().clone();
            if value.is_some() {
                return value;
            }
        }
    }

    /// Stream view; yields the current value first, then every update.
    pub fn into_stream(self) -> WatchStream<Option<SessionSnapshot>> {
        WatchStream::new(self.rx)
    }
}
