//! Display state tracked by the session view.
//!
//! Two kinds of state are projected: the order being assembled by the
//! barista agent ([`OrderState`]) and the tutor agent's learning status
//! ([`TutorState`]). The [`Snapshot`] holds the latest value of each, or
//! `None` while nothing has been received for that kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two state slots held by a [`Snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// The order being assembled.
    Order,
    /// The tutor agent's mode and concept.
    Tutor,
}

impl StateKind {
    /// Stable lowercase name, used as a metrics label and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Tutor => "tutor",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A drink order as displayed to the customer.
///
/// Every field defaults to empty. The wire format keeps absent fields
/// distinct (see [`crate::event::WireOrder`]); this type is the normalized
/// display form, so an absent field and an empty one look the same here.
///
/// The JSON field names match the records written by the ordering agent
/// (`drinkType`, `size`, `milk`, `extras`, `name`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderState {
    /// Drink, e.g. `"latte"`.
    pub drink_type: String,
    /// Cup size.
    pub size: String,
    /// Milk choice.
    pub milk: String,
    /// Extras in the order they were requested.
    pub extras: Vec<String>,
    /// Customer name for the cup.
    pub name: String,
}

impl OrderState {
    /// Whether every required field is filled in.
    ///
    /// Drink type, size, milk and name must be non-blank; extras are
    /// optional.
    ///
    /// # Examples
    ///
    /// ```
    /// use session_view_core::state::OrderState;
    ///
    /// let mut order = OrderState {
    ///     drink_type: "latte".into(),
    ///     size: "M".into(),
    ///     milk: "oat".into(),
    ///     extras: vec![],
    ///     name: "Ana".into(),
    /// };
    /// assert!(order.is_complete());
    ///
    /// order.name = "  ".into();
    /// assert!(!order.is_complete());
    /// ```
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.drink_type, &self.size, &self.milk, &self.name]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// The tutor agent's current learning status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorState {
    /// Learning mode, e.g. `"explain"` or `"quiz"`.
    pub mode: String,
    /// Concept being taught.
    pub concept: String,
}

impl TutorState {
    /// True when neither mode nor concept is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mode.is_empty() && self.concept.is_empty()
    }
}

/// The latest known value of each state kind.
///
/// A slot is `None` until the first update of its kind arrives and never
/// returns to `None` afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Latest order, if any update has arrived.
    pub order: Option<OrderState>,
    /// Latest tutor status, if any update has arrived.
    pub tutor: Option<TutorState>,
}

impl Snapshot {
    /// An empty snapshot: both slots unset.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            order: None,
            tutor: None,
        }
    }

    /// Whether the slot for `kind` has received a value.
    #[must_use]
    pub const fn is_set(&self, kind: StateKind) -> bool {
        match kind {
            StateKind::Order => self.order.is_some(),
            StateKind::Tutor => self.tutor.is_some(),
        }
    }
}
