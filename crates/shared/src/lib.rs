//! Shared domain and protocol types for the workout session workspace.

pub mod domain;
pub mod error;
pub mod protocol;
