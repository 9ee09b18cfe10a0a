//! Shared types used across all apiary crates: errors, the gateway intent
//! set, the handler trait and registry, and the process-level fault channel.

pub mod error;
pub mod fault;
pub mod gateway;
pub mod handler;
pub mod intents;
pub mod registry;

pub use error::{Error, Result};
pub use fault::{Fault, FaultMonitor, FaultSink};
pub use gateway::Gateway;
pub use handler::BotHandler;
pub use intents::{IntentFlag, IntentSet};
pub use registry::{HandlerRegistry, READY_EVENT};
