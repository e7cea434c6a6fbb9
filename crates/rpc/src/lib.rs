//! HookGate RPC - CLI orchestrator
//!
//! This crate provides the CLI binary, the application context that
//! replays the journal on start, and a shared service handle over it.

pub mod commands;
pub mod context;
pub mod service;

pub use context::{AppContext, CommitError};
pub use service::GateService;
