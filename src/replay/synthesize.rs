//! Position Synthesizer.
//!
//! Lays out the units of one phase from the phase's orders, their results
//! and the position the phase started from. The same phase can be laid out
//! two ways: as it looked when the phase opened ([`PlacementPolicy::Viewing`])
//! or as it stands once the results are applied ([`PlacementPolicy::Final`]),
//! which seeds the following phase.

use log::{debug, warn};

use super::error::ReplayError;
use super::resolver::Resolved;
use super::result::{OrderResult, ResultKind};
use crate::board::adjacency::fleet_coasts_to;
use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::{Coast, LookupError, Power, Province, PROVINCE_COUNT};
use crate::board::state::{Phase, PhaseType, Position};
use crate::board::unit::{Unit, UnitType};
use crate::transcript::{parse_location, OwnershipEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementPolicy {
    /// Start-of-phase layout, kept in the phase's turn state.
    Viewing,
    /// End-of-phase layout, the seed of the next phase.
    Final,
}

/// What happened to one order's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Stays,
    Moved(Location),
    Dislodged,
    Removed,
    Built,
}

fn fate(order: &Order, results: &[OrderResult]) -> Fate {
    let mine = || results.iter().filter(|r| r.order.as_ref() == Some(order));
    if mine().any(OrderResult::is_dislodgement) {
        return Fate::Dislodged;
    }
    let succeeded = mine().any(|r| matches!(r.kind, ResultKind::Success | ResultKind::Substituted { .. }))
        && !mine().any(|r| r.kind == ResultKind::Failure);
    if !succeeded {
        return Fate::Stays;
    }
    match *order {
        Order::Move { dest, .. } | Order::Retreat { dest, .. } => Fate::Moved(dest),
        Order::Disband { .. } => Fate::Removed,
        Order::Build { .. } => Fate::Built,
        _ => Fate::Stays,
    }
}

/// The unit an order refers to: the seed's unit when it matches, otherwise
/// one built from the order itself.
fn subject_unit(order: &Order, unit: OrderUnit, layer: &[Option<Unit>]) -> Unit {
    match layer[unit.location.province as usize] {
        Some(u) if u.power == order.power() && u.unit_type == unit.unit_type => u,
        _ => Unit::new(order.power(), unit.unit_type, unit.location.coast),
    }
}

/// Coast a fleet ends up on after moving to `dest`.
fn arrival_coast(unit: &Unit, from: Province, dest: Location) -> Coast {
    if unit.unit_type != UnitType::Fleet || dest.coast != Coast::None || !dest.province.has_coasts() {
        return dest.coast;
    }
    match fleet_coasts_to(from, unit.coast, dest.province).as_slice() {
        [only] => *only,
        _ => Coast::None,
    }
}

fn place(pos: &mut Position, prov: Province, unit: Unit) {
    if !pos.place_unit(prov, unit) {
        warn!("{} already occupied; dropping {:?}", prov.abbr(), unit);
    }
}

/// Orders whose units this phase accounts for: the roster first, then any
/// order that only appears in the results (dislodged units without orders).
fn subjects(resolved: &Resolved) -> Vec<Order> {
    let mut subjects: Vec<Order> = Vec::new();
    let extra = resolved.results.iter().filter_map(|r| r.order);
    for order in resolved.orders.iter().copied().chain(extra) {
        if order.unit().is_some() && !subjects.iter().any(|o| o.source() == order.source()) {
            subjects.push(order);
        }
    }
    subjects
}

fn movement(seed: &Position, resolved: &Resolved, policy: PlacementPolicy) -> Position {
    let mut pos = seed.clone();
    pos.clear_dislodged();
    let subjects = subjects(resolved);
    for order in &subjects {
        if let Some(prov) = order.source() {
            pos.remove_unit(prov);
        }
    }
    let unordered = pos.unit_count();
    if unordered > 0 {
        debug!("{unordered} units without orders carried forward");
    }

    for order in &subjects {
        let Some(ou) = order.unit() else { continue };
        let src = ou.location.province;
        let unit = subject_unit(order, ou, &seed.units);
        match (policy, fate(order, &resolved.results)) {
            (PlacementPolicy::Viewing, _) => place(&mut pos, src, unit),
            (PlacementPolicy::Final, Fate::Dislodged) => {
                if !pos.place_dislodged(src, unit) {
                    warn!("{} already holds a dislodged unit", src.abbr());
                }
            }
            (PlacementPolicy::Final, Fate::Moved(dest)) => {
                let coast = arrival_coast(&unit, src, dest);
                place(&mut pos, dest.province, Unit { coast, ..unit });
            }
            (PlacementPolicy::Final, _) => place(&mut pos, src, unit),
        }
    }
    pos
}

fn retreat(seed: &Position, resolved: &Resolved, policy: PlacementPolicy) -> Position {
    let mut pos = seed.clone();
    if policy == PlacementPolicy::Viewing {
        return pos;
    }
    for order in &resolved.orders {
        let Some(ou) = order.unit() else { continue };
        let src = ou.location.province;
        match fate(order, &resolved.results) {
            Fate::Moved(dest) => {
                let unit = pos
                    .remove_dislodged(src)
                    .unwrap_or_else(|| subject_unit(order, ou, &seed.dislodged));
                let coast = arrival_coast(&unit, src, dest);
                place(&mut pos, dest.province, Unit { coast, ..unit });
            }
            Fate::Removed => {
                pos.remove_dislodged(src);
            }
            _ => {}
        }
    }
    let unresolved = pos.dislodged_count();
    if unresolved > 0 {
        debug!("{unresolved} dislodged units did not retreat and are disbanded");
    }
    pos.clear_dislodged();
    pos
}

fn adjustment(seed: &Position, resolved: &Resolved, policy: PlacementPolicy) -> Position {
    let mut pos = seed.clone();
    pos.clear_dislodged();
    if policy == PlacementPolicy::Viewing {
        return pos;
    }
    for order in &resolved.orders {
        let Some(ou) = order.unit() else { continue };
        let src = ou.location.province;
        match fate(order, &resolved.results) {
            Fate::Built => place(&mut pos, src, Unit::new(order.power(), ou.unit_type, ou.location.coast)),
            Fate::Removed => {
                if pos.remove_unit(src).is_none() {
                    warn!("no unit to remove in {}", src.abbr());
                }
            }
            _ => {}
        }
    }
    pos
}

/// Lays out one phase under `policy`. Ownership is handled separately by
/// [`apply_ownership`].
pub fn synthesize(kind: PhaseType, seed: &Position, resolved: &Resolved, policy: PlacementPolicy) -> Position {
    let mut pos = match kind {
        PhaseType::Movement => movement(seed, resolved, policy),
        PhaseType::Retreat => retreat(seed, resolved, policy),
        PhaseType::Adjustment => adjustment(seed, resolved, policy),
    };
    pos.record_occupiers();
    pos
}

/// Replaces supply-center ownership with the block's entries; centers not
/// listed become neutral. Returns whether anything changed.
pub fn apply_ownership(phase: Phase, pos: &mut Position, entries: &[OwnershipEntry]) -> Result<bool, ReplayError> {
    let mut owners: [Option<Power>; PROVINCE_COUNT] = [None; PROVINCE_COUNT];
    for entry in entries {
        let fail = |cause: LookupError| ReplayError::OwnershipReference {
            phase,
            entry: format!("{}: {}", entry.power, entry.provinces.join(", ")),
            cause,
        };
        let power = Power::lookup(&entry.power).map_err(fail)?;
        for name in &entry.provinces {
            let prov = parse_location(name).map_err(fail)?.province;
            if !prov.is_supply_center() {
                return Err(fail(LookupError::NotASupplyCenter(name.clone())));
            }
            owners[prov as usize] = Some(power);
        }
    }
    let changed = owners != pos.sc_owner;
    pos.sc_owner = owners;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::Power;
    use crate::board::state::Season;
    use crate::board::variant::STANDARD_OPENING;
    use crate::protocol::{parse_dfen, parse_order};

    fn opening() -> Position {
        parse_dfen(STANDARD_OPENING).expect("opening").1
    }

    fn resolved(entries: &[(&str, ResultKind)]) -> Resolved {
        let mut r = Resolved::default();
        for (text, kind) in entries {
            let order = parse_order(text).expect(text);
            if !r.orders.contains(&order) {
                r.orders.push(order);
            }
            r.results.push(OrderResult::for_order(order, kind.clone(), *text));
        }
        r
    }

    #[test]
    fn movement_viewing_and_final() {
        let seed = opening();
        let r = resolved(&[
            ("A: A bud - ser", ResultKind::Success),
            ("A: A vie - gal", ResultKind::Failure),
            ("R: A war - gal", ResultKind::Failure),
        ]);
        let viewing = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Viewing);
        let fin = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Final);
        assert_eq!(viewing.units, seed.units);
        assert!(fin.unit_at(Province::Bud).is_none());
        assert_eq!(fin.unit_at(Province::Ser).map(|u| u.power), Some(Power::Austria));
        assert_eq!(fin.unit_at(Province::Vie).map(|u| u.power), Some(Power::Austria));
        assert_eq!(viewing.unit_count(), fin.unit_count());
        assert_eq!(fin.last_occupier[Province::Ser as usize], Some(Power::Austria));
    }

    #[test]
    fn dislodged_units_move_layers() {
        let mut seed = opening();
        seed.place_unit(Province::Ser, Unit::new(Power::Austria, UnitType::Army, Coast::None));
        seed.remove_unit(Province::Bud);
        seed.place_unit(Province::Bul, Unit::new(Power::Turkey, UnitType::Army, Coast::None));
        let r = resolved(&[
            ("A: A ser H", ResultKind::Dislodged { retreats: Some(vec![]) }),
            ("T: A bul - ser", ResultKind::Success),
        ]);
        let fin = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Final);
        assert_eq!(fin.unit_at(Province::Ser).map(|u| u.power), Some(Power::Turkey));
        assert_eq!(fin.dislodged_at(Province::Ser).map(|u| u.power), Some(Power::Austria));
        let viewing = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Viewing);
        assert_eq!(viewing.unit_at(Province::Ser).map(|u| u.power), Some(Power::Austria));
        assert_eq!(viewing.dislodged_count(), 0);
        assert_eq!(viewing.unit_count(), fin.unit_count() + fin.dislodged_count());
    }

    #[test]
    fn fleet_arrival_picks_the_only_coast() {
        let mut seed = opening();
        seed.remove_unit(Province::Con);
        seed.place_unit(Province::Con, Unit::new(Power::Turkey, UnitType::Fleet, Coast::None));
        let r = resolved(&[("T: F con - bul", ResultKind::Success)]);
        let fin = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Final);
        // Two coasts are reachable from Constantinople, so none is assumed.
        assert_eq!(fin.unit_at(Province::Bul).map(|u| u.coast), Some(Coast::None));
        let mut seed = opening();
        seed.place_unit(Province::Bla, Unit::new(Power::Turkey, UnitType::Fleet, Coast::None));
        let r = resolved(&[("T: F bla - bul", ResultKind::Success)]);
        let fin = synthesize(PhaseType::Movement, &seed, &r, PlacementPolicy::Final);
        assert_eq!(fin.unit_at(Province::Bul).map(|u| u.coast), Some(Coast::East));
    }

    #[test]
    fn retreat_final_clears_dislodged() {
        let mut seed = opening();
        seed.place_dislodged(Province::Vie, Unit::new(Power::Austria, UnitType::Army, Coast::None));
        seed.place_dislodged(Province::War, Unit::new(Power::Russia, UnitType::Army, Coast::None));
        let r = resolved(&[
            ("A: A vie R boh", ResultKind::Success),
            ("R: A war R pru", ResultKind::Failure),
        ]);
        let viewing = synthesize(PhaseType::Retreat, &seed, &r, PlacementPolicy::Viewing);
        assert_eq!(viewing.dislodged_count(), 2);
        let fin = synthesize(PhaseType::Retreat, &seed, &r, PlacementPolicy::Final);
        assert_eq!(fin.dislodged_count(), 0);
        assert_eq!(fin.unit_at(Province::Boh).map(|u| u.power), Some(Power::Austria));
        assert_eq!(fin.unit_count(), seed.unit_count() + 1);
    }

    #[test]
    fn retreat_disband_shows_until_final() {
        let mut seed = opening();
        seed.place_dislodged(Province::Vie, Unit::new(Power::Austria, UnitType::Army, Coast::None));
        let r = resolved(&[("A: A vie D", ResultKind::Success)]);
        let viewing = synthesize(PhaseType::Retreat, &seed, &r, PlacementPolicy::Viewing);
        assert_eq!(viewing.dislodged_at(Province::Vie).map(|u| u.power), Some(Power::Austria));
        let fin = synthesize(PhaseType::Retreat, &seed, &r, PlacementPolicy::Final);
        assert!(fin.dislodged_at(Province::Vie).is_none());
        // The active army in Vienna is untouched.
        assert_eq!(fin.unit_at(Province::Vie).map(|u| u.power), Some(Power::Austria));
        assert_eq!(fin.unit_count(), seed.unit_count());
    }

    #[test]
    fn adjustments_only_apply_when_final() {
        let mut seed = opening();
        seed.remove_unit(Province::Vie);
        let r = resolved(&[
            ("A: A vie B", ResultKind::Success),
            (
                "R: A mos D",
                ResultKind::Substituted {
                    replacement: parse_order("R: A mos D").expect("order"),
                },
            ),
            ("E: W", ResultKind::Success),
        ]);
        let viewing = synthesize(PhaseType::Adjustment, &seed, &r, PlacementPolicy::Viewing);
        assert_eq!(viewing.units, seed.units);
        let fin = synthesize(PhaseType::Adjustment, &seed, &r, PlacementPolicy::Final);
        assert!(fin.unit_at(Province::Vie).is_some());
        assert!(fin.unit_at(Province::Mos).is_none());
    }

    #[test]
    fn ownership_blocks() {
        let phase = Phase::new(1901, Season::Fall, PhaseType::Movement);
        let mut pos = opening();
        let entries = vec![OwnershipEntry {
            power: "Austria".into(),
            provinces: vec!["Budapest".into(), "Serbia".into()],
        }];
        assert_eq!(apply_ownership(phase, &mut pos, &entries), Ok(true));
        assert_eq!(pos.centers_of(Power::Austria), 2);
        assert_eq!(pos.centers_of(Power::Russia), 0);
        assert_eq!(apply_ownership(phase, &mut pos, &entries), Ok(false));

        let bad_power = vec![OwnershipEntry {
            power: "Atlantis".into(),
            provinces: vec![],
        }];
        assert!(matches!(
            apply_ownership(phase, &mut pos, &bad_power),
            Err(ReplayError::OwnershipReference { .. })
        ));
        let not_center = vec![OwnershipEntry {
            power: "Austria".into(),
            provinces: vec!["Galicia".into()],
        }];
        assert!(matches!(
            apply_ownership(phase, &mut pos, &not_center),
            Err(ReplayError::OwnershipReference {
                cause: LookupError::NotASupplyCenter(_),
                ..
            })
        ));
    }
}
