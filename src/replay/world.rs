//! Turn states and the reconstructed world.

use serde::Serialize;

use super::result::OrderResult;
use crate::board::order::Order;
use crate::board::province::{Power, PROVINCE_COUNT};
use crate::board::state::{Phase, Position};
use crate::board::variant::Variant;
use crate::protocol::{encode_dfen, format_order};
use crate::rules::RuleOptions;
use crate::transcript::GameInfo;

/// Everything known about one phase of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub phase: Phase,
    /// The board as the phase opened.
    pub position: Position,
    /// Orders in transcript order, which groups them by power.
    pub orders: Vec<Order>,
    pub results: Vec<OrderResult>,
    pub resolved: bool,
    pub ended: bool,
    pub sc_owner_changed: bool,
}

impl TurnState {
    /// A phase waiting for orders.
    pub fn unresolved(phase: Phase, position: Position) -> Self {
        TurnState {
            phase,
            position,
            orders: Vec::new(),
            results: Vec::new(),
            resolved: false,
            ended: false,
            sc_owner_changed: false,
        }
    }

    /// Powers that issued orders, in order of first appearance.
    pub fn powers(&self) -> Vec<Power> {
        let mut powers = Vec::new();
        for order in &self.orders {
            if !powers.contains(&order.power()) {
                powers.push(order.power());
            }
        }
        powers
    }

    pub fn orders_of(&self, power: Power) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.power() == power)
    }

    /// Results sorted for display: by power, then message.
    pub fn sorted_results(&self) -> Vec<&OrderResult> {
        let mut results: Vec<&OrderResult> = self.results.iter().collect();
        results.sort();
        results
    }
}

/// A reconstructed game: its turn history plus game-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub info: GameInfo,
    pub variant: Variant,
    pub options: RuleOptions,
    /// Home power of each supply center, fixed for the whole game.
    pub home_roster: [Option<Power>; PROVINCE_COUNT],
    pub turns: Vec<TurnState>,
    /// The board after the last resolved phase.
    pub final_position: Position,
}

impl World {
    /// The latest turn state: the unresolved phase if there is one.
    pub fn current(&self) -> Option<&TurnState> {
        self.turns.last()
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current().map(|t| t.phase)
    }

    pub fn last_resolved(&self) -> Option<&TurnState> {
        self.turns.iter().rev().find(|t| t.resolved)
    }

    pub fn is_ended(&self) -> bool {
        self.turns.last().is_some_and(|t| t.ended)
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            judge: self.info.judge.clone(),
            game: self.info.game.clone(),
            variant: self.variant.name(),
            wings: self.options.wings,
            turns: self.turns.iter().map(TurnSummary::from).collect(),
        }
    }
}

/// Serializable view of a turn state.
#[derive(Debug, Clone, Serialize)]
pub struct TurnSummary {
    pub phase: String,
    pub dfen: String,
    pub orders: Vec<String>,
    pub results: Vec<String>,
    pub resolved: bool,
    pub ended: bool,
    pub sc_owner_changed: bool,
}

impl From<&TurnState> for TurnSummary {
    fn from(turn: &TurnState) -> Self {
        TurnSummary {
            phase: turn.phase.to_string(),
            dfen: encode_dfen(turn.phase, &turn.position),
            orders: turn.orders.iter().map(format_order).collect(),
            results: turn
                .sorted_results()
                .into_iter()
                .map(|r| format!("{}: {}", r.power.name(), r.message))
                .collect(),
            resolved: turn.resolved,
            ended: turn.ended,
            sc_owner_changed: turn.sc_owner_changed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub judge: Option<String>,
    pub game: Option<String>,
    pub variant: &'static str,
    pub wings: bool,
    pub turns: Vec<TurnSummary>,
}
