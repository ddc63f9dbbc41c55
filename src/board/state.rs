//! Phase identifiers and per-phase board snapshots.
//!
//! A [`Position`] holds everything a replayed phase knows about the board:
//! active and dislodged units, who last stood where, supply-center control
//! and the home-center roster.

use std::fmt;

use super::province::{Power, Province, ALL_POWERS, ALL_PROVINCES, POWER_COUNT, PROVINCE_COUNT};
use super::unit::Unit;

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    /// Returns the single-character DFEN abbreviation.
    pub const fn dfen_char(self) -> char {
        match self {
            Season::Spring => 's',
            Season::Fall => 'f',
        }
    }

    /// Parses a season from its single-character DFEN abbreviation.
    pub fn from_dfen_char(c: char) -> Option<Season> {
        match c {
            's' => Some(Season::Spring),
            'f' => Some(Season::Fall),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Fall => "Fall",
        }
    }

    /// Parses a season name as printed by moderators. Summer folds into
    /// Spring, Autumn and Winter into Fall.
    pub fn lookup(text: &str) -> Option<Season> {
        match text.trim().to_ascii_lowercase().as_str() {
            "spring" | "summer" => Some(Season::Spring),
            "fall" | "autumn" | "winter" => Some(Season::Fall),
            _ => None,
        }
    }
}

/// The kind of phase within a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseType {
    Movement,
    Retreat,
    Adjustment,
}

impl PhaseType {
    /// Returns the single-character DFEN abbreviation.
    pub const fn dfen_char(self) -> char {
        match self {
            PhaseType::Movement => 'm',
            PhaseType::Retreat => 'r',
            PhaseType::Adjustment => 'b',
        }
    }

    /// Parses a phase type from its single-character DFEN abbreviation.
    pub fn from_dfen_char(c: char) -> Option<PhaseType> {
        match c {
            'm' => Some(PhaseType::Movement),
            'r' => Some(PhaseType::Retreat),
            'b' => Some(PhaseType::Adjustment),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PhaseType::Movement => "Movement",
            PhaseType::Retreat => "Retreat",
            PhaseType::Adjustment => "Adjustment",
        }
    }

    /// Accepts singular and plural spellings ("Retreats", "adjustments").
    pub fn lookup(text: &str) -> Option<PhaseType> {
        let key = text.trim().to_ascii_lowercase();
        match key.trim_end_matches('s') {
            "movement" => Some(PhaseType::Movement),
            "retreat" => Some(PhaseType::Retreat),
            "adjustment" | "build" => Some(PhaseType::Adjustment),
            _ => None,
        }
    }
}

/// A single game phase. Ordered by year, then season, then phase type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase {
    pub year: u16,
    pub season: Season,
    pub kind: PhaseType,
}

impl Phase {
    pub const fn new(year: u16, season: Season, kind: PhaseType) -> Self {
        Phase { year, season, kind }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.season.name(), self.year, self.kind.name())
    }
}

/// Complete board snapshot for one phase.
///
/// Uses fixed-size arrays indexed by `Province as usize`, so a province can
/// never hold more than one active and one dislodged unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub units: [Option<Unit>; PROVINCE_COUNT],
    pub dislodged: [Option<Unit>; PROVINCE_COUNT],
    /// Power whose unit last stood on each province.
    pub last_occupier: [Option<Power>; PROVINCE_COUNT],
    /// Supply-center owner; None if not a center or if neutral.
    pub sc_owner: [Option<Power>; PROVINCE_COUNT],
    /// Home power of each supply center.
    pub sc_home: [Option<Power>; PROVINCE_COUNT],
    pub eliminated: [bool; POWER_COUNT],
}

impl Default for Position {
    fn default() -> Self {
        Position::empty()
    }
}

impl Position {
    /// Creates an empty board with no units, ownership or home roster.
    pub fn empty() -> Self {
        Position {
            units: [None; PROVINCE_COUNT],
            dislodged: [None; PROVINCE_COUNT],
            last_occupier: [None; PROVINCE_COUNT],
            sc_owner: [None; PROVINCE_COUNT],
            sc_home: [None; PROVINCE_COUNT],
            eliminated: [false; POWER_COUNT],
        }
    }

    /// Home roster taken from the map's home-center table.
    pub fn map_home_roster() -> [Option<Power>; PROVINCE_COUNT] {
        let mut roster = [None; PROVINCE_COUNT];
        for prov in ALL_PROVINCES {
            roster[prov as usize] = prov.home_power();
        }
        roster
    }

    pub fn unit_at(&self, province: Province) -> Option<Unit> {
        self.units[province as usize]
    }

    pub fn dislodged_at(&self, province: Province) -> Option<Unit> {
        self.dislodged[province as usize]
    }

    /// Places an active unit unless the province already holds one.
    /// Returns false when the earlier occupant wins.
    pub fn place_unit(&mut self, province: Province, unit: Unit) -> bool {
        let slot = &mut self.units[province as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(unit);
        true
    }

    /// Marks a unit dislodged unless the province already holds one.
    pub fn place_dislodged(&mut self, province: Province, unit: Unit) -> bool {
        let slot = &mut self.dislodged[province as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(unit);
        true
    }

    pub fn remove_unit(&mut self, province: Province) -> Option<Unit> {
        self.units[province as usize].take()
    }

    pub fn remove_dislodged(&mut self, province: Province) -> Option<Unit> {
        self.dislodged[province as usize].take()
    }

    pub fn clear_dislodged(&mut self) {
        self.dislodged = [None; PROVINCE_COUNT];
    }

    pub fn set_sc_owner(&mut self, province: Province, owner: Option<Power>) {
        self.sc_owner[province as usize] = owner;
    }

    pub fn unit_count(&self) -> usize {
        self.units.iter().flatten().count()
    }

    pub fn dislodged_count(&self) -> usize {
        self.dislodged.iter().flatten().count()
    }

    /// Active units owned by `power`.
    pub fn units_of(&self, power: Power) -> usize {
        self.units.iter().flatten().filter(|u| u.power == power).count()
    }

    /// Supply centers owned by `power`.
    pub fn centers_of(&self, power: Power) -> usize {
        self.sc_owner.iter().filter(|o| **o == Some(power)).count()
    }

    /// Copies each active unit's owner into the last-occupier history.
    pub fn record_occupiers(&mut self) {
        for (idx, unit) in self.units.iter().enumerate() {
            if let Some(u) = unit {
                self.last_occupier[idx] = Some(u.power);
            }
        }
    }

    /// A power with no units (active or dislodged) and no centers is out.
    pub fn recompute_eliminations(&mut self) {
        for power in ALL_POWERS {
            let units = self.units_of(power)
                + self.dislodged.iter().flatten().filter(|u| u.power == power).count();
            self.eliminated[power.index()] = units == 0 && self.centers_of(power) == 0;
        }
    }

    pub fn is_eliminated(&self, power: Power) -> bool {
        self.eliminated[power.index()]
    }

    /// Powers still in the game, in standard order.
    pub fn survivors(&self) -> Vec<Power> {
        ALL_POWERS
            .iter()
            .copied()
            .filter(|p| !self.is_eliminated(*p))
            .collect()
    }
}
