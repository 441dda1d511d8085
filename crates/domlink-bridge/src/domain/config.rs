//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for runtime settings.  It
//! can be built from CLI arguments (the harness binary) or from defaults
//! (tests and embedders).
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the library) makes the handler easy to embed.  The
//! binary is responsible for populating it from CLI args or environment
//! variables.

use std::path::PathBuf;

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use domlink_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert!(!cfg.debug);
/// assert_eq!(cfg.queue_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Emit per-update diagnostics (unknown channels, malformed values,
    /// applied effects).
    pub debug: bool,

    /// TOML route file.  `None` uses the stock route table.
    pub routes_path: Option<PathBuf>,

    /// Capacity of the bounded queue that carries observer notifications to
    /// the printer task.
    pub queue_capacity: usize,
}

impl Default for BridgeConfig {
    /// | Field          | Default |
    /// |----------------|---------|
    /// | debug          | `false` |
    /// | routes_path    | `None`  |
    /// | queue_capacity | `64`    |
    fn default() -> Self {
        Self {
            debug: false,
            routes_path: None,
            queue_capacity: 64,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
