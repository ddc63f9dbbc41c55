//! Single-order legality checks and optional rules.
//!
//! Moderators accept some orders the rulebook forbids, so validation runs in
//! one of two modes chosen per call. `Loose` only checks that an order is
//! well formed for the phase and the map; `Strict` also checks it against the
//! board.

pub mod victory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::adjacency::is_adjacent;
use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::{Coast, Power, Province, ProvinceType};
use crate::board::state::{PhaseType, Position};
use crate::board::unit::UnitType;

pub use victory::{Outcome, VictoryConditions};

/// Optional rules that change what orders are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// Wing units (air units that ignore terrain).
    pub wings: bool,
}

impl RuleOptions {
    pub fn allows(&self, unit_type: UnitType) -> bool {
        unit_type != UnitType::Wing || self.wings
    }

    /// Turns on whatever option gates `unit_type`. Never turns one off.
    pub fn enable_for(&mut self, unit_type: UnitType) -> bool {
        if unit_type == UnitType::Wing && !self.wings {
            self.wings = true;
            return true;
        }
        false
    }
}

/// How much of the rulebook a validation pass enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Strict,
    Loose,
}

/// Reasons an order is illegal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("{order} orders are not allowed in a {phase} phase")]
    WrongPhase {
        order: &'static str,
        phase: &'static str,
    },

    #[error("{0} units are not enabled")]
    UnitTypeDisabled(&'static str),

    #[error("a {unit} cannot stand in {province}")]
    BadTerrain {
        unit: &'static str,
        province: &'static str,
    },

    #[error("{province} has no {coast} coast")]
    BadCoast {
        province: &'static str,
        coast: &'static str,
    },

    #[error("{power} has no {unit} in {province}")]
    NoUnit {
        power: &'static str,
        unit: &'static str,
        province: &'static str,
    },

    #[error("{from} is not adjacent to {to}")]
    NotAdjacent {
        from: &'static str,
        to: &'static str,
    },

    #[error("no unit in {0} to support or convoy")]
    NoTarget(&'static str),

    #[error("a unit in {from} cannot reach {to} to support it")]
    CannotSupport {
        from: &'static str,
        to: &'static str,
    },

    #[error("only fleets at sea may convoy, not the unit in {0}")]
    BadConvoy(&'static str),

    #[error("{power} has no dislodged {unit} in {province}")]
    NotDislodged {
        power: &'static str,
        unit: &'static str,
        province: &'static str,
    },

    #[error("{0} is occupied")]
    Occupied(&'static str),

    #[error("{province} is not a home center of {power}")]
    NotHomeCenter {
        power: &'static str,
        province: &'static str,
    },

    #[error("{province} is not owned by {power}")]
    NotOwned {
        power: &'static str,
        province: &'static str,
    },
}

fn allowed_in_phase(order: &Order, phase: PhaseType) -> bool {
    match phase {
        PhaseType::Movement => matches!(
            order,
            Order::Hold { .. }
                | Order::Move { .. }
                | Order::SupportHold { .. }
                | Order::SupportMove { .. }
                | Order::Convoy { .. }
        ),
        PhaseType::Retreat => matches!(order, Order::Retreat { .. } | Order::Disband { .. }),
        PhaseType::Adjustment => matches!(
            order,
            Order::Build { .. } | Order::Disband { .. } | Order::Waive { .. }
        ),
    }
}

fn check_location(loc: &Location, unit_type: UnitType) -> Result<(), OrderError> {
    let prov = loc.province;
    if loc.coast != Coast::None && !prov.coasts().contains(&loc.coast) {
        return Err(OrderError::BadCoast {
            province: prov.name(),
            coast: loc.coast.abbr(),
        });
    }
    if !unit_type.can_occupy(prov.province_type()) {
        return Err(OrderError::BadTerrain {
            unit: unit_type.name(),
            province: prov.name(),
        });
    }
    Ok(())
}

/// Checks that don't look at the board.
fn check_form(order: &Order, phase: PhaseType, options: &RuleOptions) -> Result<(), OrderError> {
    if !allowed_in_phase(order, phase) {
        return Err(OrderError::WrongPhase {
            order: order.kind_name(),
            phase: phase.name(),
        });
    }
    let Some(unit) = order.unit() else {
        return Ok(());
    };
    if !options.allows(unit.unit_type) {
        return Err(OrderError::UnitTypeDisabled(unit.unit_type.name()));
    }
    check_location(&unit.location, unit.unit_type)?;
    if let Some(dest) = order.destination() {
        check_location(&dest, unit.unit_type)?;
    }
    match order {
        Order::SupportHold { supported, .. } | Order::SupportMove { supported, .. } => {
            if !options.allows(supported.unit_type) {
                return Err(OrderError::UnitTypeDisabled(supported.unit_type.name()));
            }
            check_location(&supported.location, supported.unit_type)
        }
        Order::Convoy {
            convoyed_from,
            convoyed_to,
            ..
        } => {
            check_location(convoyed_from, UnitType::Army)?;
            check_location(convoyed_to, UnitType::Army)
        }
        _ => Ok(()),
    }
}

/// The power's own unit of the declared type at the order's source.
/// Coasts are not compared; transcripts often leave them out.
fn own_unit(
    layer: &[Option<crate::board::unit::Unit>],
    power: Power,
    unit: &OrderUnit,
) -> Option<Coast> {
    layer[unit.location.province as usize]
        .filter(|u| u.power == power && u.unit_type == unit.unit_type)
        .map(|u| u.coast)
}

fn source_coast(declared: Coast, actual: Coast) -> Coast {
    if declared == Coast::None {
        actual
    } else {
        declared
    }
}

/// Armies may be convoyed between any two coastal provinces.
fn convoyable(unit_type: UnitType, from: Province, to: Province) -> bool {
    unit_type == UnitType::Army
        && from.province_type() == ProvinceType::Coastal
        && to.province_type() == ProvinceType::Coastal
}

fn check_board(order: &Order, position: &Position) -> Result<(), OrderError> {
    let power = order.power();
    let no_unit = |unit: &OrderUnit| OrderError::NoUnit {
        power: power.name(),
        unit: unit.unit_type.name(),
        province: unit.location.province.name(),
    };

    match *order {
        Order::Waive { .. } => Ok(()),

        Order::Build { unit, .. } => {
            let prov = unit.location.province;
            if position.sc_home[prov as usize] != Some(power) {
                return Err(OrderError::NotHomeCenter {
                    power: power.name(),
                    province: prov.name(),
                });
            }
            if position.sc_owner[prov as usize] != Some(power) {
                return Err(OrderError::NotOwned {
                    power: power.name(),
                    province: prov.name(),
                });
            }
            if position.unit_at(prov).is_some() {
                return Err(OrderError::Occupied(prov.name()));
            }
            Ok(())
        }

        Order::Retreat { unit, dest, .. } => {
            let actual = own_unit(&position.dislodged, power, &unit).ok_or(OrderError::NotDislodged {
                power: power.name(),
                unit: unit.unit_type.name(),
                province: unit.location.province.name(),
            })?;
            let from = unit.location.province;
            if !is_adjacent(
                from,
                source_coast(unit.location.coast, actual),
                dest.province,
                dest.coast,
                unit.unit_type,
            ) {
                return Err(OrderError::NotAdjacent {
                    from: from.name(),
                    to: dest.province.name(),
                });
            }
            if position.unit_at(dest.province).is_some() {
                return Err(OrderError::Occupied(dest.province.name()));
            }
            Ok(())
        }

        Order::Disband { unit, .. } => {
            let found = own_unit(&position.units, power, &unit)
                .or_else(|| own_unit(&position.dislodged, power, &unit));
            found.map(|_| ()).ok_or_else(|| no_unit(&unit))
        }

        Order::Hold { unit, .. } => own_unit(&position.units, power, &unit)
            .map(|_| ())
            .ok_or_else(|| no_unit(&unit)),

        Order::Move { unit, dest, .. } => {
            let actual = own_unit(&position.units, power, &unit).ok_or_else(|| no_unit(&unit))?;
            let from = unit.location.province;
            let adjacent = is_adjacent(
                from,
                source_coast(unit.location.coast, actual),
                dest.province,
                dest.coast,
                unit.unit_type,
            );
            if adjacent || convoyable(unit.unit_type, from, dest.province) {
                Ok(())
            } else {
                Err(OrderError::NotAdjacent {
                    from: from.name(),
                    to: dest.province.name(),
                })
            }
        }

        Order::SupportHold { unit, supported, .. } | Order::SupportMove { unit, supported, .. } => {
            let actual = own_unit(&position.units, power, &unit).ok_or_else(|| no_unit(&unit))?;
            let target_prov = supported.location.province;
            if position.unit_at(target_prov).is_none() {
                return Err(OrderError::NoTarget(target_prov.name()));
            }
            let reach = match *order {
                Order::SupportMove { dest, .. } => dest.province,
                _ => target_prov,
            };
            let from = unit.location.province;
            if is_adjacent(
                from,
                source_coast(unit.location.coast, actual),
                reach,
                Coast::None,
                unit.unit_type,
            ) {
                Ok(())
            } else {
                Err(OrderError::CannotSupport {
                    from: from.name(),
                    to: reach.name(),
                })
            }
        }

        Order::Convoy {
            unit,
            convoyed_from,
            ..
        } => {
            own_unit(&position.units, power, &unit).ok_or_else(|| no_unit(&unit))?;
            let from = unit.location.province;
            if unit.unit_type != UnitType::Fleet || from.province_type() != ProvinceType::Sea {
                return Err(OrderError::BadConvoy(from.name()));
            }
            match position.unit_at(convoyed_from.province) {
                Some(u) if u.unit_type == UnitType::Army => Ok(()),
                _ => Err(OrderError::NoTarget(convoyed_from.province.name())),
            }
        }
    }
}

/// Checks one order against the phase, rule options and (in strict mode)
/// the board the phase started from.
pub fn validate(
    order: &Order,
    phase: PhaseType,
    position: &Position,
    options: &RuleOptions,
    mode: ValidationMode,
) -> Result<(), OrderError> {
    check_form(order, phase, options)?;
    match mode {
        ValidationMode::Strict => check_board(order, position),
        ValidationMode::Loose => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit::Unit;
    use crate::board::variant::STANDARD_OPENING;
    use crate::protocol::{parse_dfen, parse_order};

    fn opening() -> Position {
        parse_dfen(STANDARD_OPENING).expect("opening").1
    }

    fn strict(text: &str, phase: PhaseType, pos: &Position) -> Result<(), OrderError> {
        let order = parse_order(text).expect(text);
        validate(&order, phase, pos, &RuleOptions::default(), ValidationMode::Strict)
    }

    fn loose(text: &str, phase: PhaseType, pos: &Position) -> Result<(), OrderError> {
        let order = parse_order(text).expect(text);
        validate(&order, phase, pos, &RuleOptions::default(), ValidationMode::Loose)
    }

    #[test]
    fn legal_opening_orders() {
        let pos = opening();
        let m = PhaseType::Movement;
        assert_eq!(strict("A: A vie - gal", m, &pos), Ok(()));
        assert_eq!(strict("R: F stp/sc - bot", m, &pos), Ok(()));
        assert_eq!(strict("T: F ank H", m, &pos), Ok(()));
        assert_eq!(strict("I: A ven S A rom - apu", m, &pos), Ok(()));
        assert_eq!(strict("G: A mun S A ber H", m, &pos), Ok(()));
        // Army coast to coast is convoyable.
        assert_eq!(strict("E: A lvp - nwy", m, &pos), Ok(()));
    }

    #[test]
    fn strict_rejects_board_violations() {
        let pos = opening();
        let m = PhaseType::Movement;
        assert!(matches!(strict("A: A gal H", m, &pos), Err(OrderError::NoUnit { .. })));
        assert!(matches!(strict("G: A mun - bur", m, &pos), Ok(())));
        assert!(matches!(strict("A: A vie - ven", m, &pos), Err(OrderError::NotAdjacent { .. })));
        assert!(matches!(strict("A: F tri - vie", m, &pos), Err(OrderError::BadTerrain { .. })));
        assert!(matches!(
            strict("I: A ven S A tri - mun", m, &pos),
            Err(OrderError::CannotSupport { .. })
        ));
        assert!(matches!(strict("I: F nap C A rom - tun", m, &pos), Err(OrderError::BadConvoy(_))));
    }

    #[test]
    fn loose_accepts_well_formed_violations() {
        let pos = opening();
        let m = PhaseType::Movement;
        assert_eq!(loose("A: A gal H", m, &pos), Ok(()));
        assert_eq!(loose("A: A vie - ven", m, &pos), Ok(()));
        // Terrain and phase checks still apply.
        assert!(loose("A: F tri - vie", m, &pos).is_err());
        assert!(matches!(
            loose("A: A vie R boh", m, &pos),
            Err(OrderError::WrongPhase { .. })
        ));
    }

    #[test]
    fn coast_must_belong_to_province() {
        let pos = opening();
        assert!(matches!(
            loose("T: F con - bul/nc", PhaseType::Movement, &pos),
            Err(OrderError::BadCoast { .. })
        ));
    }

    #[test]
    fn retreat_rules() {
        let mut pos = opening();
        pos.remove_unit(Province::Ser);
        pos.place_dislodged(Province::Ser, Unit::new(Power::Austria, UnitType::Army, Coast::None));
        let r = PhaseType::Retreat;
        assert_eq!(strict("A: A ser R alb", r, &pos), Ok(()));
        assert_eq!(strict("A: A ser D", r, &pos), Ok(()));
        assert!(matches!(strict("A: A ser R bud", r, &pos), Err(OrderError::Occupied(_))));
        assert!(matches!(strict("A: A ser R mos", r, &pos), Err(OrderError::NotAdjacent { .. })));
        assert!(matches!(strict("T: A ser R alb", r, &pos), Err(OrderError::NotDislodged { .. })));
    }

    #[test]
    fn adjustment_rules() {
        let mut pos = opening();
        pos.remove_unit(Province::Vie);
        let b = PhaseType::Adjustment;
        assert_eq!(strict("A: A vie B", b, &pos), Ok(()));
        assert_eq!(strict("R: W", b, &pos), Ok(()));
        assert!(matches!(strict("A: A bud B", b, &pos), Err(OrderError::Occupied(_))));
        assert!(matches!(strict("G: A vie B", b, &pos), Err(OrderError::NotHomeCenter { .. })));
        pos.set_sc_owner(Province::Vie, Some(Power::Russia));
        assert!(matches!(strict("A: A vie B", b, &pos), Err(OrderError::NotOwned { .. })));
        assert_eq!(strict("A: A bud D", b, &pos), Ok(()));
    }

    #[test]
    fn wings_need_the_option() {
        let pos = opening();
        let order = parse_order("G: W kie - hol").expect("parses");
        let mut options = RuleOptions::default();
        assert!(matches!(
            validate(&order, PhaseType::Movement, &pos, &options, ValidationMode::Loose),
            Err(OrderError::UnitTypeDisabled(_))
        ));
        assert!(options.enable_for(UnitType::Wing));
        assert!(!options.enable_for(UnitType::Wing));
        assert_eq!(
            validate(&order, PhaseType::Movement, &pos, &options, ValidationMode::Loose),
            Ok(())
        );
    }
}
