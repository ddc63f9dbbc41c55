//! End-of-game scoring.

use crate::board::province::{Power, ALL_POWERS};
use crate::board::state::Position;

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solo(Power),
    /// Shared among the listed survivors, in standard power order.
    Draw(Vec<Power>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictoryConditions {
    pub centers_needed: usize,
}

impl Default for VictoryConditions {
    fn default() -> Self {
        VictoryConditions { centers_needed: 18 }
    }
}

impl VictoryConditions {
    pub fn new(centers_needed: usize) -> Self {
        VictoryConditions { centers_needed }
    }

    /// Scores a final position. The largest power at or above the threshold
    /// wins; ties go to the earlier power in standard order.
    pub fn evaluate(&self, position: &Position) -> Outcome {
        let mut leader: Option<(Power, usize)> = None;
        for power in ALL_POWERS {
            let centers = position.centers_of(power);
            if centers >= self.centers_needed && leader.map_or(true, |(_, best)| centers > best) {
                leader = Some((power, centers));
            }
        }
        match leader {
            Some((power, _)) => Outcome::Solo(power),
            None => Outcome::Draw(position.survivors()),
        }
    }

    /// One line per outcome, as appended to the final phase's results.
    pub fn describe(outcome: &Outcome) -> Vec<(Power, String)> {
        match outcome {
            Outcome::Solo(p) => vec![(*p, format!("{} has won a solo victory.", p.name()))],
            Outcome::Draw(powers) => powers
                .iter()
                .map(|p| (*p, format!("{} shares in a draw.", p.name())))
                .collect(),
        }
    }
}
