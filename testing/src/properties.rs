//! proptest strategies for model types.

use proptest::prelude::*;
use session_view_core::{OrderState, TutorState, UpdateEvent};

/// Short printable strings, including empty ones.
pub fn field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}"
}

/// Any order, complete or not.
pub fn order() -> impl Strategy<Value = OrderState> {
    (
        field(),
        field(),
        field(),
        prop::collection::vec(field(), 0..4),
        field(),
    )
        .prop_map(|(drink_type, size, milk, extras, name)| OrderState {
            drink_type,
            size,
            milk,
            extras,
            name,
        })
}

/// Any tutor state.
pub fn tutor() -> impl Strategy<Value = TutorState> {
    (field(), field()).prop_map(|(mode, concept)| TutorState { mode, concept })
}

/// Any update event.
pub fn update_event() -> impl Strategy<Value = UpdateEvent> {
    prop_oneof![
        order().prop_map(UpdateEvent::Order),
        tutor().prop_map(UpdateEvent::Tutor),
    ]
}
