//! Protocol module containing the textual update line codec.

pub mod update;

pub use update::{parse_update_line, InboundUpdate, ProtocolError};
