//! Observed traffic records.
//!
//! Each time the handler applies an inbound update or originates an outbound
//! value, an observer is told `(channel, value)`.  When notifications travel
//! over a queue instead of a direct call, they are carried as
//! [`ObservedUpdate`] values.
//!
//! # JSON shape
//!
//! ```json
//! {"direction":"rx","channel":"lights.info","value":"50%"}
//! {"direction":"tx","channel":"hdmi.disable","value":"1"}
//! ```

use serde::{Deserialize, Serialize};

/// Which observer port a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// An inbound update was applied (`on_receive`).
    Rx,
    /// The handler produced a value for an external sender (`on_transmit`).
    Tx,
}

/// One observer notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedUpdate {
    pub direction: Direction,
    pub channel: String,
    pub value: String,
}

impl ObservedUpdate {
    /// Builds an inbound (`rx`) record.
    pub fn received(channel: &str, value: &str) -> Self {
        Self {
            direction: Direction::Rx,
            channel: channel.to_string(),
            value: value.to_string(),
        }
    }

    /// Builds an outbound (`tx`) record.
    pub fn transmitted(channel: &str, value: &str) -> Self {
        Self {
            direction: Direction::Tx,
            channel: channel.to_string(),
            value: value.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
