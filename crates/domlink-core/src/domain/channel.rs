//! Channel names.
//!
//! A channel name is conventionally `<subject>.<attribute>` (for example
//! `lights.off.style`), but the dots are a naming convention only.  domlink
//! never splits a channel name; it is an opaque key into the route table.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string cannot be used as a channel name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel name was empty (or whitespace only).
    #[error("channel name must not be empty")]
    Empty,
}

/// An immutable, non-empty channel name.
///
/// `ChannelName` implements `Borrow<str>` so a `HashMap<ChannelName, _>` can
/// be queried with a plain `&str` without allocating.
///
/// # Examples
///
/// ```rust
/// use domlink_core::ChannelName;
///
/// let name = ChannelName::new("laptop.active").unwrap();
/// assert_eq!(name.as_str(), "laptop.active");
/// assert!(ChannelName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(pub(crate) String);

impl ChannelName {
    /// Creates a channel name, rejecting empty or whitespace-only input.
    ///
    /// Surrounding whitespace is significant: `" a.b"` and `"a.b"` are
    /// different channels.  Only an entirely blank name is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Empty`] for a blank name.
    pub fn new(name: impl Into<String>) -> Result<Self, ChannelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ChannelError::Empty);
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChannelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = ChannelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
