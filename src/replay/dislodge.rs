//! Dislodgement/Retreat Matcher.
//!
//! The resolver only knows that a unit was dislodged. The transcript's
//! dislodgement block says where it may go; this module joins the two and
//! turns empty option lists into destroyed units.

use log::warn;

use super::error::{LineError, ReplayError};
use super::result::{OrderResult, ResultKind};
use super::synthesize::PlacementPolicy;
use crate::board::adjacency::{fleet_coasts_to, is_adjacent};
use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::{Coast, Province};
use crate::board::state::{Phase, Position};
use crate::board::unit::UnitType;
use crate::rules::OrderError;
use crate::transcript::{parse_location, DislodgeEntry};

/// A dislodgement entry with its source province resolved.
struct Entry<'a> {
    source: Province,
    raw: &'a DislodgeEntry,
}

fn resolve_entries(phase: Phase, entries: &[DislodgeEntry]) -> Result<Vec<Entry<'_>>, ReplayError> {
    entries
        .iter()
        .map(|raw| {
            let loc = parse_location(&raw.source).map_err(|e| ReplayError::RetreatValidation {
                phase,
                candidate: raw.source.clone(),
                line: raw.line.clone(),
                cause: e.into(),
            })?;
            Ok(Entry {
                source: loc.province,
                raw,
            })
        })
        .collect()
}

/// Validated, coast-normalised retreat destinations for `unit`. A fleet
/// offered a split-coast province without a coast gets one location per
/// reachable coast.
fn retreat_options(
    phase: Phase,
    entry: &DislodgeEntry,
    unit: OrderUnit,
    src_coast: Coast,
) -> Result<Vec<Location>, ReplayError> {
    let from = unit.location.province;
    let mut options: Vec<Location> = Vec::new();
    for candidate in &entry.candidates {
        let fail = |cause: LineError| ReplayError::RetreatValidation {
            phase,
            candidate: candidate.clone(),
            line: entry.line.clone(),
            cause,
        };
        let loc = parse_location(candidate).map_err(|e| fail(e.into()))?;
        let not_adjacent = || {
            fail(
                OrderError::NotAdjacent {
                    from: from.name(),
                    to: loc.province.name(),
                }
                .into(),
            )
        };
        let found: Vec<Location> = match unit.unit_type {
            UnitType::Fleet => fleet_coasts_to(from, src_coast, loc.province)
                .into_iter()
                .filter(|c| loc.coast == Coast::None || *c == loc.coast)
                .map(|c| Location::with_coast(loc.province, c))
                .collect(),
            other if is_adjacent(from, Coast::None, loc.province, Coast::None, other) => {
                vec![Location::new(loc.province)]
            }
            _ => Vec::new(),
        };
        if found.is_empty() {
            return Err(not_adjacent());
        }
        for l in found {
            if !options.contains(&l) {
                options.push(l);
            }
        }
    }
    Ok(options)
}

fn matched_result(
    phase: Phase,
    order: Order,
    unit: OrderUnit,
    entry: &DislodgeEntry,
    seed: &Position,
    text: &str,
) -> Result<OrderResult, ReplayError> {
    let src_coast = match unit.location.coast {
        Coast::None => seed
            .unit_at(unit.location.province)
            .map_or(Coast::None, |u| u.coast),
        c => c,
    };
    let retreats = retreat_options(phase, entry, unit, src_coast)?;
    if retreats.is_empty() {
        return Ok(OrderResult::for_order(
            order,
            ResultKind::Destroyed,
            format!(
                "The {} {} in {} with no valid retreats was destroyed",
                order.power().adjective(),
                unit.unit_type.name(),
                unit.location.province.name()
            ),
        ));
    }
    let names: Vec<String> = retreats
        .iter()
        .map(|l| match l.coast {
            Coast::None => l.province.abbr().to_string(),
            c => format!("{}/{}", l.province.abbr(), c.abbr()),
        })
        .collect();
    Ok(OrderResult::for_order(
        order,
        ResultKind::Dislodged {
            retreats: Some(retreats),
        },
        format!("{text} (dislodged, may retreat to {})", names.join(", ")),
    ))
}

/// The order given to the unit in `source`, with its text as written.
fn ordered_unit(results: &[OrderResult], source: Province) -> Option<(Order, OrderUnit, String)> {
    let result = results.iter().find(|r| r.source() == Some(source) && r.order.is_some())?;
    let order = result.order?;
    let unit = order.unit()?;
    // Failures carry their annotation in trailing parentheses.
    let text = match result.kind {
        ResultKind::Failure => result
            .message
            .rsplit_once(" (")
            .map_or(result.message.as_str(), |(text, _)| text),
        _ => result.message.as_str(),
    };
    Some((order, unit, text.to_string()))
}

/// Replaces every unmatched dislodgement marker with a retreat-aware result
/// or a destruction. A marker without an entry is an error. An entry whose
/// unit has an order but no marker is matched to that order; entries for
/// units that had no order get a result of their own.
///
/// Running this on its own output changes nothing.
pub fn match_dislodgements(
    phase: Phase,
    results: Vec<OrderResult>,
    entries: &[DislodgeEntry],
    seed: &Position,
) -> Result<Vec<OrderResult>, ReplayError> {
    let entries = resolve_entries(phase, entries)?;
    let mut corrected = Vec::with_capacity(results.len());

    for result in results {
        let (Some(order), true) = (result.order, result.is_unmatched_dislodgement()) else {
            corrected.push(result);
            continue;
        };
        let Some(unit) = order.unit() else {
            corrected.push(result);
            continue;
        };
        let province = unit.location.province;
        let entry = entries
            .iter()
            .find(|e| e.source == province)
            .ok_or_else(|| ReplayError::DislodgementMatch {
                phase,
                province: province.name(),
                text: result.message.clone(),
            })?;
        let text = result.message.trim_end_matches(" (dislodged)").to_string();
        corrected.push(matched_result(phase, order, unit, entry.raw, seed, &text)?);
    }

    for entry in &entries {
        let covered = corrected
            .iter()
            .any(|r| r.is_dislodgement() && r.source() == Some(entry.source));
        if covered {
            continue;
        }
        if let Some((order, unit, text)) = ordered_unit(&corrected, entry.source) {
            warn!("{phase}: dislodged unit's order carries no dislodgement note: '{}'", entry.raw.line);
            corrected.push(matched_result(phase, order, unit, entry.raw, seed, &text)?);
            continue;
        }
        let (Some(power), Some(unit_type)) = (entry.raw.power, entry.raw.unit_type) else {
            warn!("{phase}: ignoring dislodgement entry '{}'", entry.raw.line);
            continue;
        };
        warn!("{phase}: dislodged unit without an order: '{}'", entry.raw.line);
        let coast = seed.unit_at(entry.source).map_or(Coast::None, |u| u.coast);
        let unit = OrderUnit::new(unit_type, Location::with_coast(entry.source, coast));
        let order = Order::Hold { power, unit };
        let text = format!("{} {}", unit_type.name(), entry.source.name());
        corrected.push(matched_result(phase, order, unit, entry.raw, seed, &text)?);
    }

    Ok(corrected)
}

/// Takes destroyed units off the board: from the dislodged layer when
/// finalising, from the active layer when viewing.
pub fn remove_destroyed(results: &[OrderResult], position: &mut Position, policy: PlacementPolicy) {
    for prov in results
        .iter()
        .filter(|r| r.kind == ResultKind::Destroyed)
        .filter_map(OrderResult::source)
    {
        match policy {
            PlacementPolicy::Final => position.remove_dislodged(prov),
            PlacementPolicy::Viewing => position.remove_unit(prov),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::Power;
    use crate::board::state::{PhaseType, Season};
    use crate::board::unit::Unit;
    use crate::board::variant::STANDARD_OPENING;
    use crate::protocol::parse_dfen;
    use crate::transcript::dislodgements;

    fn phase() -> Phase {
        Phase::new(1901, Season::Fall, PhaseType::Movement)
    }

    fn marker(power: Power, unit_type: UnitType, prov: Province) -> OrderResult {
        let order = Order::Hold {
            power,
            unit: OrderUnit::new(unit_type, Location::new(prov)),
        };
        OrderResult::for_order(order, ResultKind::Dislodged { retreats: None }, "x (dislodged)")
    }

    fn seed() -> Position {
        parse_dfen(STANDARD_OPENING).expect("opening").1
    }

    #[test]
    fn matches_options() {
        let entries = dislodgements(
            "The following units were dislodged:\nThe Russian Army in Warsaw can retreat to Livonia or Prussia.\n",
        );
        let out = match_dislodgements(phase(), vec![marker(Power::Russia, UnitType::Army, Province::War)], &entries, &seed())
            .expect("matches");
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].kind,
            ResultKind::Dislodged {
                retreats: Some(vec![Location::new(Province::Lvn), Location::new(Province::Pru)])
            }
        );
        assert_eq!(out[0].message, "x (dislodged, may retreat to lvn, pru)");
    }

    #[test]
    fn fleet_options_get_coasts() {
        let entries = dislodgements(
            "The following units were dislodged:\nThe French Fleet in Mid-Atlantic Ocean can retreat to Spain.\n",
        );
        let out = match_dislodgements(phase(), vec![marker(Power::France, UnitType::Fleet, Province::Mao)], &entries, &seed())
            .expect("matches");
        assert_eq!(
            out[0].kind,
            ResultKind::Dislodged {
                retreats: Some(vec![
                    Location::with_coast(Province::Spa, Coast::North),
                    Location::with_coast(Province::Spa, Coast::South)
                ])
            }
        );
    }

    #[test]
    fn empty_options_destroy() {
        let entries = dislodgements(
            "The following units were dislodged:\nThe Austrian Army in Vienna with no valid retreats was destroyed.\n",
        );
        let out = match_dislodgements(phase(), vec![marker(Power::Austria, UnitType::Army, Province::Vie)], &entries, &seed())
            .expect("matches");
        assert_eq!(out[0].kind, ResultKind::Destroyed);

        let mut pos = Position::empty();
        pos.place_dislodged(Province::Vie, Unit::new(Power::Austria, UnitType::Army, Coast::None));
        remove_destroyed(&out, &mut pos, PlacementPolicy::Final);
        assert_eq!(pos.dislodged_count(), 0);

        let mut viewing = seed();
        remove_destroyed(&out, &mut viewing, PlacementPolicy::Viewing);
        assert!(viewing.unit_at(Province::Vie).is_none());
        assert_eq!(viewing.unit_count(), 21);
    }

    #[test]
    fn missing_entry_is_an_error() {
        let err = match_dislodgements(phase(), vec![marker(Power::Austria, UnitType::Army, Province::Vie)], &[], &seed())
            .expect_err("unmatched");
        assert!(matches!(err, ReplayError::DislodgementMatch { province: "Vienna", .. }));
    }

    #[test]
    fn illegal_candidate_is_an_error() {
        let entries = dislodgements(
            "The following units were dislodged:\nThe Austrian Army in Vienna can retreat to Moscow.\n",
        );
        let err = match_dislodgements(phase(), vec![marker(Power::Austria, UnitType::Army, Province::Vie)], &entries, &seed())
            .expect_err("not adjacent");
        assert!(matches!(err, ReplayError::RetreatValidation { .. }));
    }

    #[test]
    fn entry_without_marker_attaches_to_the_units_order() {
        let order = Order::Move {
            power: Power::Austria,
            unit: OrderUnit::new(UnitType::Army, Location::new(Province::Vie)),
            dest: Location::new(Province::Gal),
        };
        let bounce = OrderResult::for_order(order, ResultKind::Failure, "Army Vienna -> Galicia (bounce)");
        let entries = dislodgements(
            "The following units were dislodged:\nThe Austrian Army in Vienna can retreat to Bohemia.\n",
        );
        let out = match_dislodgements(phase(), vec![bounce], &entries, &seed()).expect("matches");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].order, Some(order));
        assert_eq!(
            out[1].kind,
            ResultKind::Dislodged {
                retreats: Some(vec![Location::new(Province::Boh)])
            }
        );
        assert_eq!(out[1].message, "Army Vienna -> Galicia (dislodged, may retreat to boh)");
        let twice = match_dislodgements(phase(), out.clone(), &entries, &seed()).expect("again");
        assert_eq!(out, twice);
    }

    #[test]
    fn idempotent() {
        let entries = dislodgements(
            "The following units were dislodged:\n\
             The Russian Army in Warsaw can retreat to Livonia.\n\
             The Turkish Army in Smyrna with no valid retreats was destroyed.\n",
        );
        let once = match_dislodgements(phase(), vec![marker(Power::Russia, UnitType::Army, Province::War)], &entries, &seed())
            .expect("first");
        // The Turkish entry had no order and gets a result of its own.
        assert_eq!(once.len(), 2);
        assert_eq!(once[1].kind, ResultKind::Destroyed);
        let twice = match_dislodgements(phase(), once.clone(), &entries, &seed()).expect("second");
        assert_eq!(once, twice);
    }
}
