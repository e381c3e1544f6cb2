//! Single-session workout countdown engine.
//!
//! The engine's state lives on one control task; commands from any number
//! of producers are serialized through [`CommandRouter`], ticks come from
//! the task-owned [`SessionClock`], and every observable state change is
//! published as a [`shared::protocol::SessionSnapshot`] on the [`StateBus`].

pub mod bus;
pub mod clock;
pub mod engine;
pub mod presentation;
pub mod router;
pub mod runtime;

pub use bus::{StateBus, StateSubscriber};
pub use clock::SessionClock;
pub use engine::{EnginePhase, SessionEngine};
pub use presentation::{ActionButton, PresentationSink, PresentationSynchronizer, PresentationView};
pub use router::{CommandRouter, DispatchError};
pub use runtime::{RuntimeConfig, SessionError, SessionHandle, SessionRuntime};
