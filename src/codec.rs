//! Wire format for state-update messages.
//!
//! Every consumed sample produces one text frame of the form
//! `{"type":"update","x":<x>,"y":0}`.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Position payload of an update message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub x: i32,
    pub y: i32,
}

/// Messages understood by the remote consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "update")]
    Update(UpdatePayload),
}

impl OutboundMessage {
    /// Single-axis update; `y` is always 0
    #[must_use]
    pub const fn update(x: i32) -> Self {
        Self::Update(UpdatePayload { x, y: 0 })
    }

    /// Horizontal position carried by the message
    #[must_use]
    pub const fn x(&self) -> i32 {
        match self {
            Self::Update(payload) => payload.x,
        }
    }
}

/// Encode a smoothed value into its text frame
///
/// # Errors
///
/// Returns a codec error if serialization fails.
pub fn encode(x: i32) -> Result<String> {
    encode_message(&OutboundMessage::update(x))
}

/// Encode an arbitrary message
///
/// # Errors
///
/// Returns a codec error if serialization fails.
pub fn encode_message(message: &OutboundMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a text frame back into a message
///
/// # Errors
///
/// Returns a codec error for malformed JSON or an unknown message type.
pub fn decode(text: &str) -> Result<OutboundMessage> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_encode_exact_form() {
        assert_eq!(encode(-3).unwrap(), r#"{"type":"update","x":-3,"y":0}"#);
        assert_eq!(encode(0).unwrap(), r#"{"type":"update","x":0,"y":0}"#);
        assert_eq!(encode(417).unwrap(), r#"{"type":"update","x":417,"y":0}"#);
    }

    #[test]
    fn test_encode_extremes() {
        assert_eq!(
            encode(i32::MIN).unwrap(),
            r#"{"type":"update","x":-2147483648,"y":0}"#
        );
        assert_eq!(
            encode(i32::MAX).unwrap(),
            r#"{"type":"update","x":2147483647,"y":0}"#
        );
    }

    #[test]
    fn test_decode_inverse() {
        let message = decode(&encode(-250).unwrap()).unwrap();
        assert_eq!(message, OutboundMessage::update(-250));
        assert_eq!(message.x(), -250);
    }

    #[test]
    fn test_decode_accepts_whitespace() {
        let message = decode(r#"{ "type": "update", "x": 12, "y": 0 }"#).unwrap();
        assert_eq!(message.x(), 12);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("not json"), Err(Error::Codec(_))));
        assert!(matches!(
            decode(r#"{"type":"refresh","x":1,"y":0}"#),
            Err(Error::Codec(_))
        ));
        assert!(matches!(decode(r#"{"type":"update","x":1}"#), Err(Error::Codec(_))));
    }
}
