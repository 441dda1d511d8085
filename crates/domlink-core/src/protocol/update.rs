//! Textual encoding of a single inbound update.
//!
//! Harnesses, pipes and test fixtures describe updates one per line.  Two
//! forms are accepted:
//!
//! ```text
//! lights.info=50%
//! {"channel": "lights.off.style", "value": "{\"color\":\"red\"}"}
//! ```
//!
//! The `channel=value` form splits at the **first** `=`, so values may
//! themselves contain `=` characters; the value may be empty.  A line whose
//! first non-blank character is `{` is parsed as the JSON form, which is
//! convenient when the value is itself JSON.  Blank lines and lines whose
//! first non-blank character is `#` are skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::channel::{ChannelError, ChannelName};

/// Errors that can occur while decoding an update line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The channel part of the line was empty.
    #[error("update line has an empty channel name")]
    EmptyChannel,

    /// A `channel=value` line had no `=`.
    #[error("update line {0:?} has no '=' separator")]
    MissingSeparator(String),

    /// A JSON-form line could not be decoded.
    #[error("invalid JSON update line: {0}")]
    InvalidJson(String),
}

impl From<ChannelError> for ProtocolError {
    fn from(_: ChannelError) -> Self {
        ProtocolError::EmptyChannel
    }
}

/// An ephemeral `(channel, raw value)` pair as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub channel: ChannelName,
    /// Raw, uninterpreted value.  Missing in JSON form means empty.
    #[serde(default)]
    pub value: String,
}

impl InboundUpdate {
    /// Creates an update from a channel name and raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyChannel`] for a blank channel.
    pub fn new(channel: &str, value: impl Into<String>) -> Result<Self, ProtocolError> {
        Ok(Self {
            channel: ChannelName::new(channel)?,
            value: value.into(),
        })
    }
}

/// Wire shape of the JSON form.  The channel is validated separately so a
/// blank name reports [`ProtocolError::EmptyChannel`] like the `=` form does.
#[derive(Deserialize)]
struct JsonLine {
    channel: String,
    #[serde(default)]
    value: String,
}

/// Decodes one update line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.  Only a single
/// trailing `\n` / `\r\n` is stripped from the value; other whitespace in the
/// value is preserved because text channels display it verbatim.  The channel
/// name is trimmed.
///
/// # Errors
///
/// Returns [`ProtocolError`] when the line is neither a valid
/// `channel=value` pair nor a valid JSON update object.
///
/// # Examples
///
/// ```rust
/// use domlink_core::parse_update_line;
///
/// let update = parse_update_line("lights.info=100%").unwrap().unwrap();
/// assert_eq!(update.channel.as_str(), "lights.info");
/// assert_eq!(update.value, "100%");
///
/// assert!(parse_update_line("# comment").unwrap().is_none());
/// ```
pub fn parse_update_line(line: &str) -> Result<Option<InboundUpdate>, ProtocolError> {
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);

    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    if trimmed.starts_with('{') {
        let raw: JsonLine = serde_json::from_str(trimmed)
            .map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        return InboundUpdate::new(&raw.channel, raw.value).map(Some);
    }

    let (channel, value) = line
        .split_once('=')
        .ok_or_else(|| ProtocolError::MissingSeparator(line.to_string()))?;

    InboundUpdate::new(channel.trim(), value).map(Some)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_line() {
        let update = parse_update_line("laptop.active=1").unwrap().unwrap();
        assert_eq!(update.channel.as_str(), "laptop.active");
        assert_eq!(update.value, "1");
    }

    #[test]
    fn test_value_may_contain_equals_sign() {
        let update = parse_update_line("lights.info=a=b").unwrap().unwrap();
        assert_eq!(update.value, "a=b");
    }

    #[test]
    fn test_value_may_be_empty() {
        let update = parse_update_line("lights.info=").unwrap().unwrap();
        assert_eq!(update.value, "");
    }

    #[test]
    fn test_trailing_crlf_is_stripped_but_inner_spaces_kept() {
        let update = parse_update_line("lights.info= 50 % \r\n").unwrap().unwrap();
        assert_eq!(update.value, " 50 % ");
    }

    #[test]
    fn test_channel_is_trimmed() {
        let update = parse_update_line("  hdmi.disable =0").unwrap().unwrap();
        assert_eq!(update.channel.as_str(), "hdmi.disable");
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_update_line(""), Ok(None));
        assert_eq!(parse_update_line("   \n"), Ok(None));
        assert_eq!(parse_update_line("# lights.info=1"), Ok(None));
    }

    #[test]
    fn test_missing_separator_is_error() {
        assert_eq!(
            parse_update_line("lights.info"),
            Err(ProtocolError::MissingSeparator("lights.info".to_string()))
        );
    }

    #[test]
    fn test_empty_channel_is_error() {
        assert_eq!(parse_update_line("=1"), Err(ProtocolError::EmptyChannel));
    }

    #[test]
    fn test_json_line_with_json_value() {
        // Arrange: a style value is itself JSON, so the JSON form is handy
        let line = r#"{"channel":"lights.off.style","value":"{\"color\":\"red\"}"}"#;

        // Act
        let update = parse_update_line(line).unwrap().unwrap();

        // Assert
        assert_eq!(update.channel.as_str(), "lights.off.style");
        assert_eq!(update.value, r#"{"color":"red"}"#);
    }

    #[test]
    fn test_json_line_without_value_means_empty() {
        let update = parse_update_line(r#"{"channel":"lights.info"}"#).unwrap().unwrap();
        assert_eq!(update.value, "");
    }

    #[test]
    fn test_json_line_with_empty_channel_is_error() {
        assert_eq!(
            parse_update_line(r#"{"channel":"","value":"1"}"#),
            Err(ProtocolError::EmptyChannel)
        );
        assert_eq!(
            parse_update_line(r#"{"channel":"   "}"#),
            Err(ProtocolError::EmptyChannel)
        );
    }

    #[test]
    fn test_json_line_without_channel_is_invalid_json() {
        let result = parse_update_line(r#"{"value":"1"}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidJson(_))));
    }

    #[test]
    fn test_malformed_json_line_is_error() {
        let result = parse_update_line(r#"{"channel": "#);
        assert!(matches!(result, Err(ProtocolError::InvalidJson(_))));
    }
}
