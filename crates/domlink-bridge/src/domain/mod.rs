//! Domain layer for domlink-bridge.
//!
//! The domain layer contains pure types that have no dependencies on I/O, a
//! DOM binding, or an async runtime.
//!
//! # What belongs in the domain layer?
//!
//! - Configuration structures
//! - The record of one observed update (what the observers are told)
//!
//! # What does NOT belong here?
//!
//! - Any `web_sys`, `tokio`, or file types
//! - Anything that could block or fail due to external state

pub mod config;
pub mod events;

// Re-export so callers can write `domain::BridgeConfig`.
pub use config::BridgeConfig;
pub use events::{Direction, ObservedUpdate};
