//! Conversion of raw channel values into typed visual effects.
//!
//! Every channel value arrives as an untyped string.  What that string *means*
//! depends entirely on the route it is delivered to: `"1"` is a flag for a
//! visibility channel, literal text for a text channel, and invalid JSON for a
//! style channel.  The functions here never guess a type from the value's
//! shape; the caller always says which interpretation to use.
//!
//! # Flags
//!
//! Boolean channels use exactly `"1"` and `"0"`.  Surrounding ASCII
//! whitespace is ignored (feeds sometimes append a newline); anything else,
//! including `"true"` and `""`, is rejected.
//!
//! # Style objects
//!
//! Style channels carry a JSON object of CSS property → value pairs:
//!
//! ```json
//! { "color": "red", "font-weight": "bold" }
//! ```
//!
//! Numbers and booleans are accepted and rendered using their JSON text
//! (`{"opacity": 0.5}` sets `opacity` to `0.5`).  `null`, arrays, and nested
//! objects have no CSS meaning and are rejected.  The whole object is
//! validated before anything is returned, so a caller can never end up
//! applying half of a malformed value.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors produced when a raw value does not fit its strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A boolean channel received something other than `"1"` or `"0"`.
    #[error("expected \"1\" or \"0\", got {0:?}")]
    NotAFlag(String),

    /// A style channel received text that is not valid JSON.
    #[error("invalid style JSON: {0}")]
    InvalidJson(String),

    /// A style channel received valid JSON that is not an object.
    #[error("style value must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A style property had a value that cannot be written as CSS text.
    #[error("unsupported value for style property {property:?}: {kind}")]
    UnsupportedStyleValue {
        property: String,
        kind: &'static str,
    },

    /// A style object contained an empty property name.
    #[error("style property name must not be empty")]
    EmptyStyleProperty,
}

/// The typed visual change produced by parsing a raw value for a route.
///
/// Boolean variants carry the *resulting state* after polarity has been
/// applied: `Hidden(true)` always means "the element must be hidden",
/// regardless of whether the feed sent `"1"` or `"0"` to get there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", content = "value", rename_all = "snake_case")]
pub enum Effect {
    /// Replace the element's text content.
    Text(String),
    /// Remove the element from layout (`true`) or restore it (`false`).
    Hidden(bool),
    /// Hide the element but keep its box (`true`) or show it (`false`).
    Invisible(bool),
    /// Put the element into its disabled presentation (`true`) or enable it.
    Disabled(bool),
    /// Set each listed inline style property.
    Style(StyleMap),
}

/// An ordered list of inline style declarations parsed from a JSON object.
///
/// Keys are unique.  Iteration order follows the parsed object's key order as
/// reported by `serde_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleMap(Vec<(String, String)>);

impl StyleMap {
    /// Parses a JSON object string into a style map.
    ///
    /// # Errors
    ///
    /// - [`ValueError::InvalidJson`] when `raw` is not valid JSON.
    /// - [`ValueError::NotAnObject`] when the JSON is not an object.
    /// - [`ValueError::EmptyStyleProperty`] for an empty key.
    /// - [`ValueError::UnsupportedStyleValue`] for `null`, array, or object values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use domlink_core::StyleMap;
    ///
    /// let style = StyleMap::parse(r#"{ "color": "red", "font-weight": "bold" }"#).unwrap();
    /// assert_eq!(style.get("color"), Some("red"));
    /// assert_eq!(style.len(), 2);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ValueError::InvalidJson(e.to_string()))?;

        let object = match value {
            Value::Object(map) => map,
            other => return Err(ValueError::NotAnObject(json_kind(&other))),
        };

        let mut declarations = Vec::with_capacity(object.len());
        for (property, value) in object {
            if property.trim().is_empty() {
                return Err(ValueError::EmptyStyleProperty);
            }
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ValueError::UnsupportedStyleValue {
                        property,
                        kind: json_kind(&other),
                    })
                }
            };
            declarations.push((property, text));
        }

        Ok(Self(declarations))
    }

    /// Looks up the value for a single property.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(property, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for `{}`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses a `"1"` / `"0"` flag.
///
/// Returns the literal flag value; polarity is applied by the caller.
///
/// # Errors
///
/// Returns [`ValueError::NotAFlag`] for anything other than `"1"` or `"0"`
/// (after trimming ASCII whitespace).
pub fn parse_flag(raw: &str) -> Result<bool, ValueError> {
    match raw.trim_matches(|c: char| c.is_ascii_whitespace()) {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(ValueError::NotAFlag(raw.to_string())),
    }
}

/// Human-readable JSON type name for error messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
