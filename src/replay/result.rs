//! Per-order outcomes recorded for each replayed phase.

use std::cmp::Ordering;

use crate::board::order::{Location, Order};
use crate::board::province::{Power, Province};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResultKind {
    Success,
    Failure,
    ValidationFailure,
    /// `None` until matched against the transcript's dislodgement block.
    Dislodged { retreats: Option<Vec<Location>> },
    /// Dislodged with nowhere to go.
    Destroyed,
    /// The moderator replaced the power's orders with this one.
    Substituted { replacement: Order },
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResult {
    pub power: Power,
    /// The order this result is about, if any.
    pub order: Option<Order>,
    pub kind: ResultKind,
    pub message: String,
}

impl OrderResult {
    pub fn new(power: Power, order: Option<Order>, kind: ResultKind, message: impl Into<String>) -> Self {
        OrderResult {
            power,
            order,
            kind,
            message: message.into(),
        }
    }

    pub fn for_order(order: Order, kind: ResultKind, message: impl Into<String>) -> Self {
        OrderResult::new(order.power(), Some(order), kind, message)
    }

    pub fn note(power: Power, message: impl Into<String>) -> Self {
        OrderResult::new(power, None, ResultKind::Note, message)
    }

    /// Province of the unit the result is about.
    pub fn source(&self) -> Option<Province> {
        self.order.and_then(|o| o.source())
    }

    /// A dislodgement not yet matched against retreat options.
    pub fn is_unmatched_dislodgement(&self) -> bool {
        matches!(self.kind, ResultKind::Dislodged { retreats: None })
    }

    pub fn is_dislodgement(&self) -> bool {
        matches!(self.kind, ResultKind::Dislodged { .. } | ResultKind::Destroyed)
    }
}

/// Display order: by power, then message.
impl Ord for OrderResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.power
            .cmp(&other.power)
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl PartialOrd for OrderResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_power_then_message() {
        let mut results = vec![
            OrderResult::note(Power::Turkey, "a"),
            OrderResult::note(Power::Austria, "zz"),
            OrderResult::note(Power::Austria, "b"),
        ];
        results.sort();
        let keys: Vec<_> = results.iter().map(|r| (r.power, r.message.as_str())).collect();
        assert_eq!(
            keys,
            vec![(Power::Austria, "b"), (Power::Austria, "zz"), (Power::Turkey, "a")]
        );
    }

    #[test]
    fn dislodgement_predicates() {
        let marker = OrderResult::new(
            Power::Austria,
            None,
            ResultKind::Dislodged { retreats: None },
            "dislodged",
        );
        assert!(marker.is_unmatched_dislodgement());
        assert!(marker.is_dislodgement());
        let matched = OrderResult::new(
            Power::Austria,
            None,
            ResultKind::Dislodged {
                retreats: Some(Vec::new()),
            },
            "dislodged",
        );
        assert!(!matched.is_unmatched_dislodgement());
        assert!(OrderResult::new(Power::Austria, None, ResultKind::Destroyed, "x").is_dislodgement());
    }
}
