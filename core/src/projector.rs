//! State projection: folding update events into a [`Snapshot`].
//!
//! # Overview
//!
//! A projector is the read side of the session. Channel adapters produce
//! [`UpdateEvent`]s independently; the projector is the single place they
//! are applied, in arrival order, and the only owner of the resulting view.
//!
//! ## Rules
//!
//! - **Last write wins**: each event replaces the whole slot for its kind.
//!   Fields are never merged.
//! - **Arrival order**: there is no timestamp or sequence number on the
//!   wire, so the most recently *applied* event is the current one.
//! - **No reset**: once a slot is set it stays set for the lifetime of the
//!   projector.
//!
//! ```text
//! poll tick ──┐
//!             ├──► UpdateEvent ──► StateProjector::apply ──► Snapshot ──► render
//! push msg  ──┘
//! ```
//!
//! # Example
//!
//! ```
//! use session_view_core::event::UpdateEvent;
//! use session_view_core::projector::{Projector, StateProjector};
//! use session_view_core::state::TutorState;
//!
//! let mut projector = StateProjector::new();
//! assert!(projector.snapshot().tutor.is_none());
//!
//! let explain = TutorState { mode: "explain".into(), concept: String::new() };
//! let quiz = TutorState { mode: "quiz".into(), concept: String::new() };
//! projector.apply(UpdateEvent::Tutor(explain));
//! projector.apply(UpdateEvent::Tutor(quiz));
//!
//! assert_eq!(projector.snapshot().tutor.as_ref().map(|t| t.mode.as_str()), Some("quiz"));
//! ```

use crate::event::UpdateEvent;
use crate::state::Snapshot;

/// Something that folds events into a read-only view.
///
/// `apply` runs synchronously and to completion, so a caller that owns the
/// projector never observes a half-applied event.
pub trait Projector {
    /// The event type this projector consumes.
    type Event;

    /// The view it exposes.
    type View;

    /// Projector name, used in logs.
    fn name(&self) -> &str;

    /// Apply one event.
    ///
    /// Returns `true` if the view changed. Re-applying the event that
    /// produced the current view returns `false`.
    fn apply(&mut self, event: Self::Event) -> bool;

    /// Current view.
    fn snapshot(&self) -> &Self::View;
}

/// Projects order and tutor updates into a [`Snapshot`].
#[derive(Clone, Debug, Default)]
pub struct StateProjector {
    snapshot: Snapshot,
}

impl StateProjector {
    /// A projector with both slots unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshot: Snapshot::empty(),
        }
    }

    /// A projector seeded with an existing snapshot.
    #[must_use]
    pub const fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Consume the projector and return its snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }
}

impl Projector for StateProjector {
    type Event = UpdateEvent;
    type View = Snapshot;

    fn name(&self) -> &'static str {
        "session_state"
    }

    fn apply(&mut self, event: UpdateEvent) -> bool {
        match event {
            UpdateEvent::Order(order) => replace(&mut self.snapshot.order, order),
            UpdateEvent::Tutor(tutor) => replace(&mut self.snapshot.tutor, tutor),
        }
    }

    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        return false;
    }
    *slot = Some(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{OrderState, StateKind, TutorState};

    fn order(drink: &str) -> OrderState {
        OrderState {
            drink_type: drink.into(),
            ..OrderState::default()
        }
    }

    #[test]
    fn test_apply_sets_slot_from_unset() {
        let mut projector = StateProjector::new();
        assert!(projector.apply(UpdateEvent::Order(order("latte"))));
        assert!(projector.snapshot().is_set(StateKind::Order));
        assert!(!projector.snapshot().is_set(StateKind::Tutor));
    }

    #[test]
    fn test_last_write_wins_per_kind() {
        let mut projector = StateProjector::new();
        projector.apply(UpdateEvent::Order(order("latte")));
        projector.apply(UpdateEvent::Tutor(TutorState {
            mode: "explain".into(),
            concept: "variables".into(),
        }));
        projector.apply(UpdateEvent::Order(order("mocha")));

        let snapshot = projector.snapshot();
        assert_eq!(snapshot.order, Some(order("mocha")));
        assert_eq!(
            snapshot.tutor.as_ref().map(|t| t.concept.as_str()),
            Some("variables")
        );
    }

    #[test]
    fn test_replacement_is_wholesale() {
        let mut projector = StateProjector::new();
        projector.apply(UpdateEvent::Order(OrderState {
            drink_type: "latte".into(),
            size: "L".into(),
            milk: "whole".into(),
            extras: vec!["caramel".into()],
            name: "Bo".into(),
        }));
        projector.apply(UpdateEvent::Order(order("espresso")));

        // Fields missing from the second event are not carried over.
        assert_eq!(projector.snapshot().order, Some(order("espresso")));
    }

    #[test]
    fn test_reapplying_same_event_is_a_no_op() {
        let mut projector = StateProjector::new();
        let event = UpdateEvent::Order(order("latte"));

        assert!(projector.apply(event.clone()));
        let after_first = projector.snapshot().clone();
        assert!(!projector.apply(event));
        assert_eq!(projector.snapshot(), &after_first);
    }

    #[test]
    fn test_empty_order_still_sets_slot() {
        let mut projector = StateProjector::new();
        assert!(projector.apply(UpdateEvent::Order(OrderState::default())));
        assert_eq!(projector.snapshot().order, Some(OrderState::default()));
    }

    #[test]
    fn test_seeded_projector() {
        let seeded = Snapshot {
            order: Some(order("latte")),
            tutor: None,
        };
        let projector = StateProjector::from_snapshot(seeded.clone());
        assert_eq!(projector.name(), "session_state");
        assert_eq!(projector.into_snapshot(), seeded);
    }
}
