//! Order types for all three phase kinds.
//!
//! Every order names the power that issued it. Unit references inside an
//! order (the ordered unit, a supported unit) carry only type and location:
//! transcripts never say who owns a supported unit.

use super::province::{Coast, Power, Province};
use super::unit::UnitType;

/// A location on the board: a province with an optional coast specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub province: Province,
    pub coast: Coast,
}

impl Location {
    /// Creates a location without a coast.
    pub fn new(province: Province) -> Self {
        Self {
            province,
            coast: Coast::None,
        }
    }

    /// Creates a location with a coast specifier.
    pub fn with_coast(province: Province, coast: Coast) -> Self {
        Self { province, coast }
    }

    /// Coast-insensitive province equality.
    pub fn same_province(&self, other: &Location) -> bool {
        self.province == other.province
    }
}

/// A unit reference in an order: the unit type and its current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderUnit {
    pub unit_type: UnitType,
    pub location: Location,
}

impl OrderUnit {
    pub fn new(unit_type: UnitType, location: Location) -> Self {
        OrderUnit {
            unit_type,
            location,
        }
    }
}

/// An order as reported by the moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    Hold {
        power: Power,
        unit: OrderUnit,
    },

    Move {
        power: Power,
        unit: OrderUnit,
        dest: Location,
    },

    SupportHold {
        power: Power,
        unit: OrderUnit,
        supported: OrderUnit,
    },

    SupportMove {
        power: Power,
        unit: OrderUnit,
        supported: OrderUnit,
        dest: Location,
    },

    Convoy {
        power: Power,
        unit: OrderUnit,
        convoyed_from: Location,
        convoyed_to: Location,
    },

    Retreat {
        power: Power,
        unit: OrderUnit,
        dest: Location,
    },

    /// Retreat-phase disband or adjustment-phase removal.
    Disband {
        power: Power,
        unit: OrderUnit,
    },

    Build {
        power: Power,
        unit: OrderUnit,
    },

    /// Voluntarily skip one build.
    Waive {
        power: Power,
    },
}

impl Order {
    /// The power that issued the order.
    pub fn power(&self) -> Power {
        match *self {
            Order::Hold { power, .. }
            | Order::Move { power, .. }
            | Order::SupportHold { power, .. }
            | Order::SupportMove { power, .. }
            | Order::Convoy { power, .. }
            | Order::Retreat { power, .. }
            | Order::Disband { power, .. }
            | Order::Build { power, .. }
            | Order::Waive { power } => power,
        }
    }

    /// The ordered unit, if the order has one (everything but Waive).
    pub fn unit(&self) -> Option<OrderUnit> {
        match *self {
            Order::Hold { unit, .. }
            | Order::Move { unit, .. }
            | Order::SupportHold { unit, .. }
            | Order::SupportMove { unit, .. }
            | Order::Convoy { unit, .. }
            | Order::Retreat { unit, .. }
            | Order::Disband { unit, .. }
            | Order::Build { unit, .. } => Some(unit),
            Order::Waive { .. } => None,
        }
    }

    /// Province of the ordered unit.
    pub fn source(&self) -> Option<Province> {
        self.unit().map(|u| u.location.province)
    }

    /// Destination of a Move or Retreat.
    pub fn destination(&self) -> Option<Location> {
        match *self {
            Order::Move { dest, .. } | Order::Retreat { dest, .. } => Some(dest),
            _ => None,
        }
    }

    /// Short verb used in log lines and result messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Order::Hold { .. } => "hold",
            Order::Move { .. } => "move",
            Order::SupportHold { .. } | Order::SupportMove { .. } => "support",
            Order::Convoy { .. } => "convoy",
            Order::Retreat { .. } => "retreat",
            Order::Disband { .. } => "disband",
            Order::Build { .. } => "build",
            Order::Waive { .. } => "waive",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn army(prov: Province) -> OrderUnit {
        OrderUnit::new(UnitType::Army, Location::new(prov))
    }

    #[test]
    fn location_constructors() {
        let loc = Location::new(Province::Vie);
        assert_eq!(loc.coast, Coast::None);
        let stp = Location::with_coast(Province::Stp, Coast::North);
        assert!(stp.same_province(&Location::new(Province::Stp)));
        assert_ne!(stp, Location::new(Province::Stp));
    }

    #[test]
    fn accessors() {
        let mv = Order::Move {
            power: Power::Austria,
            unit: army(Province::Bud),
            dest: Location::new(Province::Ser),
        };
        assert_eq!(mv.power(), Power::Austria);
        assert_eq!(mv.source(), Some(Province::Bud));
        assert_eq!(mv.destination(), Some(Location::new(Province::Ser)));
        assert_eq!(mv.kind_name(), "move");

        let waive = Order::Waive {
            power: Power::Russia,
        };
        assert_eq!(waive.power(), Power::Russia);
        assert_eq!(waive.unit(), None);
        assert_eq!(waive.destination(), None);
    }

    #[test]
    fn hold_and_disband_are_distinct() {
        let unit = army(Province::Vie);
        let hold = Order::Hold {
            power: Power::Austria,
            unit,
        };
        let disband = Order::Disband {
            power: Power::Austria,
            unit,
        };
        assert_ne!(hold, disband);
    }
}
