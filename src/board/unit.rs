//! Unit types and ownership.
//!
//! Armies and fleets are always available; wings only exist when the
//! `wings` rule option is on.

use super::province::{Coast, LookupError, Power, ProvinceType};

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitType {
    Army,
    Fleet,
    Wing,
}

impl UnitType {
    /// Returns the single-character board-notation abbreviation.
    pub const fn dui_char(self) -> char {
        match self {
            UnitType::Army => 'a',
            UnitType::Fleet => 'f',
            UnitType::Wing => 'w',
        }
    }

    /// Returns the uppercase abbreviation used in order notation.
    pub const fn dson_char(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
            UnitType::Wing => 'W',
        }
    }

    /// Returns the capitalised name used in transcripts.
    pub const fn name(self) -> &'static str {
        match self {
            UnitType::Army => "Army",
            UnitType::Fleet => "Fleet",
            UnitType::Wing => "Wing",
        }
    }

    /// Parses a unit type from its single-character board-notation abbreviation.
    pub fn from_dui_char(c: char) -> Option<UnitType> {
        match c {
            'a' => Some(UnitType::Army),
            'f' => Some(UnitType::Fleet),
            'w' => Some(UnitType::Wing),
            _ => None,
        }
    }

    /// Parses a unit type from its uppercase order-notation abbreviation.
    pub fn from_dson_char(c: char) -> Option<UnitType> {
        match c {
            'A' => Some(UnitType::Army),
            'F' => Some(UnitType::Fleet),
            'W' => Some(UnitType::Wing),
            _ => None,
        }
    }

    /// Parses "Army", "fleet", "A", "W" and the like.
    pub fn lookup(text: &str) -> Result<UnitType, LookupError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "army" | "a" => Ok(UnitType::Army),
            "fleet" | "f" => Ok(UnitType::Fleet),
            "wing" | "w" => Ok(UnitType::Wing),
            _ => Err(LookupError::UnknownUnitType(text.to_string())),
        }
    }

    /// Returns whether this unit type may stand in a province of the given terrain.
    pub const fn can_occupy(self, prov_type: ProvinceType) -> bool {
        !matches!(
            (self, prov_type),
            (UnitType::Army, ProvinceType::Sea) | (UnitType::Fleet, ProvinceType::Land)
        )
    }
}

/// A unit standing on (or dislodged from) a province.
///
/// The province itself is the index of the array holding the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub unit_type: UnitType,
    pub power: Power,
    pub coast: Coast,
}

impl Unit {
    pub fn new(power: Power, unit_type: UnitType, coast: Coast) -> Self {
        Unit {
            unit_type,
            power,
            coast,
        }
    }
}
