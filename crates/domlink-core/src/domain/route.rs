//! Routes: which element a channel controls, and how.
//!
//! A [`Route`] ties one [`ChannelName`] to one element id and one
//! [`Strategy`].  The [`RouteTable`] is built once at start-up and is
//! read-only afterwards.
//!
//! # Polarity (for beginners)
//!
//! Boolean channels send `"1"` or `"0"`, but what `"1"` *means* is decided by
//! the channel's name in the feed, not by a global rule:
//!
//! ```text
//! hdmi.disable   "1"  → the HDMI button is disabled     (Polarity::Direct)
//! laptop.active  "1"  → the laptop button is enabled    (Polarity::Inverted)
//! ```
//!
//! Each boolean route therefore carries its own [`Polarity`].  The strategy
//! names the *negative* state it controls (hidden, invisible, disabled), and
//! `Direct` means `"1"` switches that negative state on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::channel::ChannelName;
use super::value::{parse_flag, Effect, StyleMap, ValueError};

/// Errors that can occur while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Two routes were declared for the same channel.
    #[error("duplicate route for channel {0}")]
    DuplicateChannel(ChannelName),

    /// A route declared an empty channel name.
    #[error("route channel name must not be empty")]
    EmptyChannel,

    /// A route declared an empty target element id.
    #[error("route for channel {0} has an empty target element id")]
    EmptyTarget(ChannelName),
}

/// How a visibility channel hides its element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// Removed from layout (`display: none`).
    #[default]
    Hidden,
    /// Not painted but still occupies space (`visibility: hidden`).
    Invisible,
}

/// Whether `"1"` switches a boolean route's negative state on or off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// `"1"` = hidden / invisible / disabled.
    #[default]
    Direct,
    /// `"1"` = shown / enabled.
    Inverted,
}

impl Polarity {
    /// Converts a literal flag into "is the negative state active?".
    pub fn apply(self, flag: bool) -> bool {
        match self {
            Polarity::Direct => flag,
            Polarity::Inverted => !flag,
        }
    }
}

/// The closed set of ways a raw value becomes a visual mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "mode", rename_all = "snake_case")]
pub enum Strategy {
    /// Set the element's text content to the value verbatim.
    SetText,
    /// Toggle the element's visibility from a `"1"`/`"0"` flag.
    SetVisibility(VisibilityMode),
    /// Apply a JSON object of inline style properties.
    SetStyle,
    /// Toggle the element's disabled presentation from a `"1"`/`"0"` flag.
    SetEnabled,
}

impl Strategy {
    /// `true` for strategies whose values are `"1"`/`"0"` flags.
    pub fn is_boolean(self) -> bool {
        matches!(self, Strategy::SetVisibility(_) | Strategy::SetEnabled)
    }
}

/// One channel → element association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// The channel this route answers to.
    pub channel: ChannelName,
    /// Stable id of the element in the render surface.
    pub target: String,
    /// How values are applied.
    pub strategy: Strategy,
    /// Flag polarity; ignored by non-boolean strategies.
    pub polarity: Polarity,
}

impl Route {
    /// Creates a route with [`Polarity::Direct`].
    pub fn new(channel: ChannelName, target: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            channel,
            target: target.into(),
            strategy,
            polarity: Polarity::Direct,
        }
    }

    /// Returns the same route with the given polarity.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Parses `raw` into the effect this route should apply.
    ///
    /// The whole value is parsed before anything is returned; an error means
    /// nothing should be mutated.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when `raw` does not fit the route's strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use domlink_core::{ChannelName, Effect, Polarity, Route, Strategy};
    ///
    /// let route = Route::new(ChannelName::new("laptop.active").unwrap(), "laptop", Strategy::SetEnabled)
    ///     .with_polarity(Polarity::Inverted);
    /// // "1" on an inverted enablement channel means "enabled".
    /// assert_eq!(route.effect_for("1").unwrap(), Effect::Disabled(false));
    /// ```
    pub fn effect_for(&self, raw: &str) -> Result<Effect, ValueError> {
        match self.strategy {
            Strategy::SetText => Ok(Effect::Text(raw.to_string())),
            Strategy::SetVisibility(mode) => {
                let active = self.polarity.apply(parse_flag(raw)?);
                Ok(match mode {
                    VisibilityMode::Hidden => Effect::Hidden(active),
                    VisibilityMode::Invisible => Effect::Invisible(active),
                })
            }
            Strategy::SetEnabled => Ok(Effect::Disabled(self.polarity.apply(parse_flag(raw)?))),
            Strategy::SetStyle => StyleMap::parse(raw).map(Effect::Style),
        }
    }
}

/// The static channel → route table.
///
/// Backed by a `BTreeMap` so iteration order (and therefore diagnostic
/// output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<ChannelName, Route>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a list of routes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DuplicateChannel`] if two routes share a channel,
    /// or [`RouteError::EmptyTarget`] if a route has a blank element id.
    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Result<Self, RouteError> {
        let mut table = Self::new();
        for route in routes {
            table.insert(route)?;
        }
        debug!(routes = table.len(), "route table built");
        Ok(table)
    }

    /// Adds a route.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::from_routes`].
    pub fn insert(&mut self, route: Route) -> Result<(), RouteError> {
        if route.target.trim().is_empty() {
            return Err(RouteError::EmptyTarget(route.channel));
        }
        if self.routes.contains_key(&route.channel) {
            return Err(RouteError::DuplicateChannel(route.channel));
        }
        self.routes.insert(route.channel.clone(), route);
        Ok(())
    }

    /// Looks up the route for a channel.
    pub fn get(&self, channel: &str) -> Option<&Route> {
        self.routes.get(channel)
    }

    /// Iterates over all routes in channel-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// `true` when no routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The route table for the stock control page.
    ///
    /// | Channel                | Element       | Strategy                 | Polarity |
    /// |------------------------|---------------|--------------------------|----------|
    /// | `laptop.active`        | `laptop`      | SetEnabled               | Inverted |
    /// | `hdmi.disable`         | `hdmi`        | SetEnabled               | Direct   |
    /// | `computer.hidden`      | `computer`    | SetVisibility(Hidden)    | Direct   |
    /// | `conference.invisible` | `conference`  | SetVisibility(Invisible) | Direct   |
    /// | `lights.info`          | `lights-info` | SetText                  | –        |
    /// | `lights.off.style`     | `lights-off`  | SetStyle                 | –        |
    pub fn default_routes() -> Self {
        // The names below are compile-time constants that satisfy
        // ChannelName's non-empty rule, so building the table cannot fail.
        let route = |channel: &str, target: &str, strategy| Route {
            channel: ChannelName(channel.to_string()),
            target: target.to_string(),
            strategy,
            polarity: Polarity::Direct,
        };

        let routes = [
            route("laptop.active", "laptop", Strategy::SetEnabled)
                .with_polarity(Polarity::Inverted),
            route("hdmi.disable", "hdmi", Strategy::SetEnabled),
            route(
                "computer.hidden",
                "computer",
                Strategy::SetVisibility(VisibilityMode::Hidden),
            ),
            route(
                "conference.invisible",
                "conference",
                Strategy::SetVisibility(VisibilityMode::Invisible),
            ),
            route("lights.info", "lights-info", Strategy::SetText),
            route("lights.off.style", "lights-off", Strategy::SetStyle),
        ];

        Self {
            routes: routes
                .into_iter()
                .map(|r| (r.channel.clone(), r))
                .collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
