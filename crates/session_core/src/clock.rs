//! Periodic tick source owned by the session control task.
//!
//! Because the clock lives on the same task that consumes its ticks,
//! `stop` is a real synchronization barrier: once it returns, no further
//! tick can be observed, not merely "no new tick is scheduled".

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct SessionClock {
    interval: Option<Interval>,
    period: Duration,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            interval: None,
            period: Duration::ZERO,
        }
    }

    /// Start ticking every `period`. No-op while already running, so a
    /// second `start` can never create a duplicate tick stream.
    pub fn start(&mut self, period: Duration) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.period = period;
    }

    /// Idempotent stop. Dropping the interval on the consuming task
    /// guarantees no tick is delivered after this returns.
    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Period of the active tick stream, `Duration::ZERO` when stopped.
    pub fn period(&self) -> Duration {
        if self.is_running() {
            self.period
        } else {
            Duration::ZERO
        }
    }

    /// Resolves on the next tick; pends forever while stopped. Cancel-safe,
    /// so it can sit in a `select!` arm next to the command queue.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
