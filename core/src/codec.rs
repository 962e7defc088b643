//! Message codec: raw transport payloads to [`UpdateEvent`]s.
//!
//! Decoding is fail-open. [`decode`] and [`decode_str`] never return an
//! error: malformed payloads and unknown message types both come back as
//! `None`, so transport noise cannot interrupt the session. Callers that
//! want to know *why* a payload was dropped (for logging or metrics) use
//! [`try_decode`], which separates "not for us" (`Ok(None)`) from
//! "broken" (`Err`).
//!
//! # Example
//!
//! ```
//! use session_view_core::codec;
//! use session_view_core::event::UpdateEvent;
//!
//! let payload = br#"{"type":"tutor_state","data":{"mode":"quiz"}}"#;
//! match codec::decode(payload) {
//!     Some(UpdateEvent::Tutor(tutor)) => assert_eq!(tutor.mode, "quiz"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//!
//! assert_eq!(codec::decode(b"not json"), None);
//! assert_eq!(codec::decode(br#"{"type":"unknown","data":{}}"#), None);
//! ```

use crate::event::{MessageType, UpdateEvent, WireMessage, WireOrder, WireTutor};
use crate::state::OrderState;
use serde_json::Value;
use thiserror::Error;

/// Why a payload could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Payload bytes are not UTF-8.
    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload is not JSON.
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(String),

    /// Envelope has no string `type` field.
    #[error("Message has no string `type` field")]
    MissingType,

    /// Recognized message without a `data` object.
    #[error("Message `{0}` has no `data` object")]
    MissingData(MessageType),

    /// `data` does not match the shape of its message type.
    #[error("Invalid `data` for `{message_type}`: {reason}")]
    InvalidData {
        /// The declared message type
        message_type: MessageType,
        /// What was wrong with it
        reason: String,
    },

    /// Failed to serialize an outgoing message.
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

/// Decode a payload, reporting why it was rejected.
///
/// Returns `Ok(None)` when the payload is well-formed but its `type` is not
/// one the view tracks.
///
/// # Errors
///
/// Returns a [`CodecError`] when the payload is not UTF-8, not JSON, has no
/// `type`, or carries `data` that does not fit the declared type.
pub fn try_decode(payload: &[u8]) -> Result<Option<UpdateEvent>, CodecError> {
    let text = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
    try_decode_str(text)
}

/// String form of [`try_decode`].
///
/// # Errors
///
/// Same as [`try_decode`], minus the UTF-8 check.
pub fn try_decode_str(payload: &str) -> Result<Option<UpdateEvent>, CodecError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| CodecError::InvalidJson(e.to_string()))?;

    let message_type = match value.get("type").and_then(Value::as_str) {
        Some(raw) => match MessageType::from_wire(raw) {
            Some(message_type) => message_type,
            None => return Ok(None),
        },
        None => return Err(CodecError::MissingType),
    };

    let data = match value.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => return Err(CodecError::MissingData(message_type)),
    };

    let invalid = |e: serde_json::Error| CodecError::InvalidData {
        message_type,
        reason: e.to_string(),
    };

    let event = match message_type {
        MessageType::OrderState | MessageType::FinalOrder => {
            let wire: WireOrder = serde_json::from_value(data.clone()).map_err(invalid)?;
            UpdateEvent::Order(wire.into_state())
        }
        MessageType::TutorState => {
            let wire: WireTutor = serde_json::from_value(data.clone()).map_err(invalid)?;
            UpdateEvent::Tutor(wire.into_state())
        }
    };

    Ok(Some(event))
}

/// Decode a byte payload; anything unusable yields `None`.
#[must_use]
pub fn decode(payload: &[u8]) -> Option<UpdateEvent> {
    try_decode(payload).unwrap_or_else(|e| {
        tracing::debug!(error = %e, bytes = payload.len(), "Dropping undecodable payload");
        None
    })
}

/// Decode a string payload; anything unusable yields `None`.
#[must_use]
pub fn decode_str(payload: &str) -> Option<UpdateEvent> {
    try_decode_str(payload).unwrap_or_else(|e| {
        tracing::debug!(error = %e, bytes = payload.len(), "Dropping undecodable payload");
        None
    })
}

/// Encode an event in the wire envelope.
///
/// Order events are tagged `order_state`, tutor events `tutor_state`.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode(event: &UpdateEvent) -> Result<Vec<u8>, CodecError> {
    match event {
        UpdateEvent::Order(order) => encode_order(MessageType::OrderState, order),
        UpdateEvent::Tutor(tutor) => encode_message(MessageType::TutorState, &WireTutor::from(tutor)),
    }
}

/// Encode a finished order as a `final_order` message.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_final_order(order: &OrderState) -> Result<Vec<u8>, CodecError> {
    encode_order(MessageType::FinalOrder, order)
}

fn encode_order(message_type: MessageType, order: &OrderState) -> Result<Vec<u8>, CodecError> {
    encode_message(message_type, &WireOrder::from(order))
}

fn encode_message<T: serde::Serialize>(
    message_type: MessageType,
    data: &T,
) -> Result<Vec<u8>, CodecError> {
    let data = serde_json::to_value(data).map_err(|e| CodecError::Encode(e.to_string()))?;
    let message = WireMessage {
        message_type: message_type.as_str().to_string(),
        data,
    };
    serde_json::to_vec(&message).map_err(|e| CodecError::Encode(e.to_string()))
}
