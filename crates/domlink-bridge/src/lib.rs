//! domlink-bridge library crate.
//!
//! This crate applies channel feed updates (`laptop.active = "1"`) to the
//! elements of a render surface, and reports the traffic it sees to two
//! observer ports.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Channel feed / harness  (channel, raw value)
//!         ↓
//! [domlink-bridge]
//!   ├── domain/           Pure types: BridgeConfig, ObservedUpdate
//!   ├── application/      DomHandler + the RenderSurface and UpdateObserver ports
//!   └── infrastructure/
//!         ├── memory_surface/ In-memory render surface (harness, tests)
//!         ├── web_surface/    web-sys render surface (`web` feature)
//!         └── route_file/     TOML route tables
//!         ↓
//! Render surface  (elements resolved by id)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no DOM).
//! - `application` depends on `domain` and `domlink-core` only; the render
//!   surface is reached exclusively through the [`application::RenderSurface`]
//!   trait, never through a global `document`.
//! - `infrastructure` implements the ports and does the file and DOM work.
//!
//! # For beginners: why this structure?
//!
//! The dispatch rules (which channel drives which element, how `"1"` is read)
//! are the interesting part.  Keeping them behind a trait-shaped render surface
//! means every rule can be unit tested against an in-memory fake, and the same
//! handler runs unchanged against a real browser document.

/// Domain layer: configuration and observed-traffic types (no I/O).
pub mod domain;

/// Application layer: the DomHandler dispatch component and its ports.
pub mod application;

/// Infrastructure layer: render surface implementations and route files.
pub mod infrastructure;
