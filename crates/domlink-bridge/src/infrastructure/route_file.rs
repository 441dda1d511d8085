//! TOML route files.
//!
//! A route file replaces the stock route table when a page uses different
//! channels or element ids.  One `[[route]]` table per channel:
//!
//! ```toml
//! [[route]]
//! channel = "laptop.active"
//! target = "laptop"
//! strategy = "set_enabled"
//! polarity = "inverted"
//!
//! [[route]]
//! channel = "conference.invisible"
//! target = "conference"
//! strategy = "set_visibility"
//! visibility = "invisible"
//!
//! [[route]]
//! channel = "lights.info"
//! target = "lights-info"
//! strategy = "set_text"
//! ```
//!
//! # Field rules
//!
//! | Field        | Required | Values                                                      |
//! |--------------|----------|-------------------------------------------------------------|
//! | `channel`    | yes      | non-empty channel name, unique in the file                  |
//! | `target`     | yes      | non-empty element id                                        |
//! | `strategy`   | yes      | `set_text`, `set_visibility`, `set_style`, `set_enabled`    |
//! | `polarity`   | no       | `direct` (default), `inverted`; boolean strategies only     |
//! | `visibility` | no       | `hidden` (default), `invisible`; `set_visibility` only      |
//!
//! Unknown keys are rejected so a typo (`polarty`) fails loudly instead of
//! silently using the default.

use std::path::{Path, PathBuf};

use domlink_core::{ChannelName, Polarity, Route, RouteError, RouteTable, Strategy, VisibilityMode};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Error type for route file operations.
#[derive(Debug, Error)]
pub enum RouteFileError {
    /// The file could not be read.
    #[error("I/O error reading route file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse route file TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The routes are inconsistent (duplicate channel, empty name, ...).
    #[error("invalid route: {0}")]
    Route(#[from] RouteError),

    /// A field was given for a strategy it does not apply to.
    #[error("route for channel {channel}: `{field}` does not apply to strategy {strategy}")]
    FieldNotApplicable {
        channel: String,
        field: &'static str,
        strategy: &'static str,
    },
}

// ── File schema types ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    #[serde(default, rename = "route")]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteEntry {
    channel: String,
    target: String,
    strategy: StrategyName,
    #[serde(default)]
    polarity: Option<Polarity>,
    #[serde(default)]
    visibility: Option<VisibilityMode>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyName {
    SetText,
    SetVisibility,
    SetStyle,
    SetEnabled,
}

impl StrategyName {
    fn as_str(self) -> &'static str {
        match self {
            StrategyName::SetText => "set_text",
            StrategyName::SetVisibility => "set_visibility",
            StrategyName::SetStyle => "set_style",
            StrategyName::SetEnabled => "set_enabled",
        }
    }
}

impl RouteEntry {
    fn into_route(self) -> Result<Route, RouteFileError> {
        let not_applicable = |field| RouteFileError::FieldNotApplicable {
            channel: self.channel.clone(),
            field,
            strategy: self.strategy.as_str(),
        };

        let strategy = match self.strategy {
            StrategyName::SetText => Strategy::SetText,
            StrategyName::SetStyle => Strategy::SetStyle,
            StrategyName::SetEnabled => Strategy::SetEnabled,
            StrategyName::SetVisibility => {
                Strategy::SetVisibility(self.visibility.unwrap_or_default())
            }
        };

        if self.visibility.is_some() && !matches!(strategy, Strategy::SetVisibility(_)) {
            return Err(not_applicable("visibility"));
        }
        if self.polarity.is_some() && !strategy.is_boolean() {
            return Err(not_applicable("polarity"));
        }

        let channel = ChannelName::new(self.channel.as_str()).map_err(|_| RouteError::EmptyChannel)?;
        Ok(Route::new(channel, self.target, strategy).with_polarity(self.polarity.unwrap_or_default()))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses route file text into a [`RouteTable`].
///
/// # Errors
///
/// Returns [`RouteFileError`] on TOML syntax errors, unknown keys, fields
/// that do not apply to the chosen strategy, or an inconsistent table.
pub fn parse_route_file(text: &str) -> Result<RouteTable, RouteFileError> {
    let file: RouteFile = toml::from_str(text)?;
    let routes = file
        .routes
        .into_iter()
        .map(RouteEntry::into_route)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RouteTable::from_routes(routes)?)
}

/// Reads and parses a route file from disk.
///
/// # Errors
///
/// Returns [`RouteFileError::Io`] if the file cannot be read, otherwise see
/// [`parse_route_file`].
pub fn load_route_file(path: &Path) -> Result<RouteTable, RouteFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| RouteFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_route_file(&text)?;
    info!(path = %path.display(), routes = table.len(), "route file loaded");
    Ok(table)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
