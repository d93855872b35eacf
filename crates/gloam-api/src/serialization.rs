//! Message encoding
//!
//! Messages travel as one JSON document per text frame or line.

use serde::Serialize;
use thiserror::Error;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Encode an outbound message as JSON text
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Append the line terminator used on line-framed transports
pub fn frame_line(mut text: String) -> String {
    text.push('\n');
    text
}

/// Strip the line terminator from a received line
pub fn unframe_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Action, ClientMessage};

    #[test]
    fn test_encode_action() {
        let text = encode(&ClientMessage::Action(Action::Fire)).unwrap();
        assert_eq!(text, r#"{"type":"action","data":"fire"}"#);
    }

    #[test]
    fn test_line_framing() {
        let framed = frame_line("{}".to_string());
        assert_eq!(framed, "{}\n");
        assert_eq!(unframe_line("{}\r\n"), "{}");
        assert_eq!(unframe_line("{}"), "{}");
    }
}
