//! Update events and the wire format they travel in.
//!
//! Both channels (record-store polling and push transports) carry the same
//! JSON envelope:
//!
//! ```text
//! { "type": "order_state" | "tutor_state" | "final_order", "data": { ... } }
//! ```
//!
//! The `Wire*` types mirror that envelope and keep absent fields as `None`.
//! [`UpdateEvent`] is the normalized, typed form handed to the projector.

use crate::state::{OrderState, StateKind, TutorState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded notification that one state kind should be replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Replace the order slot.
    Order(OrderState),
    /// Replace the tutor slot.
    Tutor(TutorState),
}

impl UpdateEvent {
    /// The slot this event replaces.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Order(_) => StateKind::Order,
            Self::Tutor(_) => StateKind::Tutor,
        }
    }
}

impl From<OrderState> for UpdateEvent {
    fn from(order: OrderState) -> Self {
        Self::Order(order)
    }
}

impl From<TutorState> for UpdateEvent {
    fn from(tutor: TutorState) -> Self {
        Self::Tutor(tutor)
    }
}

/// The recognized values of the envelope's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Incremental order update pushed while the order is being taken.
    OrderState,
    /// Tutor mode/concept update.
    TutorState,
    /// The finished order. Same shape as [`MessageType::OrderState`].
    FinalOrder,
}

impl MessageType {
    /// Parse a wire `type` value. Unknown values yield `None`.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "order_state" => Some(Self::OrderState),
            "tutor_state" => Some(Self::TutorState),
            "final_order" => Some(Self::FinalOrder),
            _ => None,
        }
    }

    /// The wire `type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderState => "order_state",
            Self::TutorState => "tutor_state",
            Self::FinalOrder => "final_order",
        }
    }

    /// Which snapshot slot messages of this type update.
    #[must_use]
    pub const fn kind(self) -> StateKind {
        match self {
            Self::OrderState | Self::FinalOrder => StateKind::Order,
            Self::TutorState => StateKind::Tutor,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The message envelope as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Discriminator, see [`MessageType`].
    #[serde(rename = "type")]
    pub message_type: String,
    /// Payload object; its shape depends on `message_type`.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Order payload as sent on the wire. Absent fields stay `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    /// Drink type.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub drink_type: Option<String>,
    /// Cup size.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Milk choice.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub milk: Option<String>,
    /// Extras, in request order.
    #[serde(default, deserialize_with = "lenient::string_list", skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<String>>,
    /// Customer name.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WireOrder {
    /// Normalize into the display form, defaulting absent fields to empty.
    #[must_use]
    pub fn into_state(self) -> OrderState {
        OrderState {
            drink_type: self.drink_type.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            milk: self.milk.unwrap_or_default(),
            extras: self.extras.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        }
    }
}

impl From<&OrderState> for WireOrder {
    fn from(order: &OrderState) -> Self {
        Self {
            drink_type: Some(order.drink_type.clone()),
            size: Some(order.size.clone()),
            milk: Some(order.milk.clone()),
            extras: Some(order.extras.clone()),
            name: Some(order.name.clone()),
        }
    }
}

/// Tutor payload as sent on the wire. Absent fields stay `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTutor {
    /// Learning mode.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Concept being taught.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

impl WireTutor {
    /// Normalize into the display form, defaulting absent fields to empty.
    #[must_use]
    pub fn into_state(self) -> TutorState {
        TutorState {
            mode: self.mode.unwrap_or_default(),
            concept: self.concept.unwrap_or_default(),
        }
    }
}

impl From<&TutorState> for WireTutor {
    fn from(tutor: &TutorState) -> Self {
        Self {
            mode: Some(tutor.mode.clone()),
            concept: Some(tutor.concept.clone()),
        }
    }
}

/// Tolerant field deserializers.
///
/// Scalars are stringified and `null` counts as absent. Objects and arrays
/// where a string is expected are rejected.
mod lenient {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    fn scalar(value: Value) -> Result<Option<String>, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Array(_) => Err("expected a string, found an array"),
            Value::Object(_) => Err("expected a string, found an object"),
        }
    }

    pub(super) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        scalar(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub(super) fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| scalar(item).transpose())
                .collect::<Result<Vec<_>, _>>()
                .map(Some)
                .map_err(D::Error::custom),
            other => scalar(other)
                .map(|single| single.map(|s| vec![s]))
                .map_err(D::Error::custom),
        }
    }
}
