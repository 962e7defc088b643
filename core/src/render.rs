//! Text rendering of a [`Snapshot`].
//!
//! Renderers are pure: they format what the projector holds and nothing
//! more. An unset slot renders nothing. Empty fields inside a set slot get a
//! placeholder.

use crate::state::{OrderState, Snapshot, TutorState};
use std::fmt;

/// Placeholder for an empty order field.
pub const EMPTY_FIELD: &str = "-";

/// Placeholder for an empty extras list.
pub const NO_EXTRAS: &str = "None";

/// Placeholder for an empty tutor field.
pub const NOT_SELECTED: &str = "Not selected";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// The order summary panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSummaryView {
    /// `(label, value)` rows in display order.
    pub rows: Vec<(&'static str, String)>,
    /// Whether all required order fields are present.
    pub complete: bool,
}

impl OrderSummaryView {
    /// Build the panel for an order.
    #[must_use]
    pub fn new(order: &OrderState) -> Self {
        let extras = if order.extras.is_empty() {
            NO_EXTRAS.to_string()
        } else {
            order.extras.join(", ")
        };

        Self {
            rows: vec![
                ("Drink", or_placeholder(&order.drink_type, EMPTY_FIELD).to_string()),
                ("Size", or_placeholder(&order.size, EMPTY_FIELD).to_string()),
                ("Milk", or_placeholder(&order.milk, EMPTY_FIELD).to_string()),
                ("Extras", extras),
                ("Name", or_placeholder(&order.name, EMPTY_FIELD).to_string()),
            ],
            complete: order.is_complete(),
        }
    }

    /// Panel for the snapshot's order, or `None` while it is unset.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        snapshot.order.as_ref().map(Self::new)
    }

    /// Value of the row with the given label.
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for OrderSummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.complete { "Order Summary (complete)" } else { "Order Summary" };
        writeln!(f, "{title}")?;
        for (label, value) in &self.rows {
            writeln!(f, "  {:<8}{value}", format!("{label}:"))?;
        }
        Ok(())
    }
}

/// The tutor status panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TutorStatusView {
    /// Mode, or the placeholder.
    pub mode: String,
    /// Concept, or the placeholder.
    pub concept: String,
}

impl TutorStatusView {
    /// Build the panel, or `None` when the tutor has neither mode nor concept.
    #[must_use]
    pub fn new(tutor: &TutorState) -> Option<Self> {
        if tutor.is_empty() {
            return None;
        }
        Some(Self {
            mode: or_placeholder(&tutor.mode, NOT_SELECTED).to_string(),
            concept: or_placeholder(&tutor.concept, NOT_SELECTED).to_string(),
        })
    }

    /// Panel for the snapshot's tutor state, or `None` while unset or empty.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        snapshot.tutor.as_ref().and_then(Self::new)
    }
}

impl fmt::Display for TutorStatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Learning Status")?;
        writeln!(f, "  Mode:    {}", self.mode)?;
        writeln!(f, "  Concept: {}", self.concept)
    }
}

/// Render every visible panel. Empty string when nothing is set.
#[must_use]
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if let Some(tutor) = TutorStatusView::from_snapshot(snapshot) {
        out.push_str(&tutor.to_string());
    }
    if let Some(order) = OrderSummaryView::from_snapshot(snapshot) {
        out.push_str(&order.to_string());
    }
    out
}
