//! Application layer for domlink-bridge.
//!
//! The application layer holds the dispatch logic: it knows *what* to do with
//! an update, and reaches the outside world only through two ports.
//!
//! # Responsibilities
//!
//! - Resolving a channel to its route and parsing the value (`dom_handler`)
//! - Describing the render surface the handler mutates (`surface`)
//! - Describing where rx/tx notifications go (`observer`)
//!
//! # What does NOT belong here?
//!
//! - `web_sys` calls (that is infrastructure)
//! - Reading route files (infrastructure)
//! - Spawning tasks or reading stdin (the binary)

pub mod dom_handler;
pub mod observer;
pub mod surface;

// Re-export so callers can write `application::DomHandler`.
pub use dom_handler::{DomHandler, HandlerState, UpdateError};
pub use observer::{CallbackObserver, NoopObserver, QueueObserver, UpdateObserver};
pub use surface::{ElementHandle, RenderSurface, SurfaceError};
