//! Infrastructure layer for domlink-bridge.
//!
//! The infrastructure layer implements the application's ports and does all
//! I/O.
//!
//! # Responsibilities
//!
//! - An in-memory render surface for the harness and tests (`memory_surface`)
//! - A browser render surface over `web_sys` (`web_surface`, `web` feature)
//! - Loading route tables from TOML files (`route_file`)
//!
//! # What does NOT belong here?
//!
//! - Dispatch decisions (that is the application layer)
//! - Configuration parsing from the command line (that is done in `main.rs`)

pub mod memory_surface;
pub mod route_file;
#[cfg(feature = "web")]
pub mod web_surface;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use memory_surface::{ElementState, MemorySurface};
pub use route_file::{load_route_file, parse_route_file, RouteFileError};
#[cfg(feature = "web")]
pub use web_surface::WebSurface;
