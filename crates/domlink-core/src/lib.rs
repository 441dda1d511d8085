//! # domlink-core
//!
//! Shared library for domlink containing the channel routing model, the typed
//! value parser, and the textual update codec used by harnesses.
//!
//! This crate has zero dependencies on a render surface, a DOM binding, or a
//! network transport.  The bridge crate (`domlink-bridge`) builds the actual
//! dispatch component on top of it.
//!
//! # Architecture overview (for beginners)
//!
//! An automation feed publishes *channels*: named data points such as
//! `laptop.active` or `lights.info`, each carrying a raw string value.  A web
//! page wants to reflect those values visually: show some text, hide a panel,
//! grey out a button, recolour a label.  domlink sits between the two.
//!
//! This crate (`domlink-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Which element a channel controls and *how* (the
//!   [`Strategy`]), and how a raw string becomes a typed visual [`Effect`].
//!
//! - **`protocol`** – How a single update is written down as text
//!   (`channel=value` or a small JSON object), so test harnesses and pipes can
//!   feed the bridge without a real transport.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `domlink_core::RouteTable` instead of `domlink_core::domain::route::RouteTable`.
pub use domain::channel::{ChannelError, ChannelName};
pub use domain::route::{Polarity, Route, RouteError, RouteTable, Strategy, VisibilityMode};
pub use domain::value::{Effect, StyleMap, ValueError};
pub use protocol::update::{parse_update_line, InboundUpdate, ProtocolError};
