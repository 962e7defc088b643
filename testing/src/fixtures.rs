//! Canned orders, tutor states and wire messages.

#![allow(clippy::unwrap_used)] // Encoding fixed fixtures cannot fail

use session_view_core::codec;
use session_view_core::{OrderState, TutorState, UpdateEvent};

/// The complete order from the reference scenario.
#[must_use]
pub fn latte_order() -> OrderState {
    OrderState {
        drink_type: "latte".into(),
        size: "M".into(),
        milk: "oat".into(),
        extras: vec!["vanilla".into()],
        name: "Ana".into(),
    }
}

/// An order with only the customer name filled in.
#[must_use]
pub fn order_named(name: &str) -> OrderState {
    OrderState {
        name: name.into(),
        ..OrderState::default()
    }
}

/// A tutor state.
#[must_use]
pub fn tutor(mode: &str, concept: &str) -> TutorState {
    TutorState {
        mode: mode.into(),
        concept: concept.into(),
    }
}

/// `order_state` message for `order`, as a string.
#[must_use]
pub fn order_message(order: &OrderState) -> String {
    message(&UpdateEvent::Order(order.clone()))
}

/// `tutor_state` message for `tutor`, as a string.
#[must_use]
pub fn tutor_message(tutor: &TutorState) -> String {
    message(&UpdateEvent::Tutor(tutor.clone()))
}

/// `final_order` message for `order`, as a string.
#[must_use]
pub fn final_order_message(order: &OrderState) -> String {
    String::from_utf8(codec::encode_final_order(order).unwrap()).unwrap()
}

fn message(event: &UpdateEvent) -> String {
    String::from_utf8(codec::encode(event).unwrap()).unwrap()
}
