//! Order Resolver: turns a block's order lines into validated orders and
//! their reported outcomes.

use log::{info, trace};

use super::error::{LineError, ReplayError};
use super::result::{OrderResult, ResultKind};
use crate::board::order::Order;
use crate::board::state::{Phase, Position};
use crate::rules::{validate, RuleOptions, ValidationMode};
use crate::transcript::{parse_order_text, OrderLine};

/// Orders in transcript order and their results in phase order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub orders: Vec<Order>,
    pub results: Vec<OrderResult>,
}

/// Results reported by the moderator for one order.
fn reported_results(order: Order, line: &OrderLine, defaulted: bool) -> Vec<OrderResult> {
    if defaulted {
        return vec![OrderResult::for_order(
            order,
            ResultKind::Substituted { replacement: order },
            format!("{} (defaulted)", line.text),
        )];
    }
    let Some(annotation) = &line.annotation else {
        return vec![OrderResult::for_order(order, ResultKind::Success, line.text.clone())];
    };

    let mut results = Vec::new();
    let mut failures = Vec::new();
    let mut dislodged = false;
    for token in annotation.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.to_ascii_lowercase().as_str() {
            "dislodged" => dislodged = true,
            "void" => results.push(OrderResult::for_order(
                order,
                ResultKind::ValidationFailure,
                format!("{} (void)", line.text),
            )),
            _ => failures.push(token),
        }
    }
    if !failures.is_empty() {
        results.insert(
            0,
            OrderResult::for_order(
                order,
                ResultKind::Failure,
                format!("{} ({})", line.text, failures.join(", ")),
            ),
        );
    }
    if dislodged {
        results.push(OrderResult::for_order(
            order,
            ResultKind::Dislodged { retreats: None },
            format!("{} (dislodged)", line.text),
        ));
    }
    results
}

fn enable_gated_units(order: &Order, options: &mut RuleOptions) {
    let supported = match order {
        Order::SupportHold { supported, .. } | Order::SupportMove { supported, .. } => Some(*supported),
        _ => None,
    };
    for unit in order.unit().into_iter().chain(supported) {
        if options.enable_for(unit.unit_type) {
            info!("{} units seen; enabling them for the rest of the game", unit.unit_type.name());
        }
    }
}

/// Constructs and validates every line against the board the phase started
/// from. A line failing strict validation is retried once in loose mode;
/// failing both aborts the replay.
pub fn resolve_orders(
    phase: Phase,
    lines: &[OrderLine],
    position: &Position,
    options: &mut RuleOptions,
) -> Result<Resolved, ReplayError> {
    let mut resolved = Resolved::default();

    for line in lines {
        let parse_error = |cause: LineError| ReplayError::OrderParse {
            phase,
            text: format!("{}: {}", line.power.name(), line.text),
            cause,
        };
        let parsed = parse_order_text(line.power, phase.kind, &line.text).map_err(|e| parse_error(e.into()))?;
        let order = parsed.order;
        enable_gated_units(&order, options);

        let loose_note = match validate(&order, phase.kind, position, options, ValidationMode::Strict) {
            Ok(()) => None,
            Err(strict) => {
                validate(&order, phase.kind, position, options, ValidationMode::Loose)
                    .map_err(|e| parse_error(e.into()))?;
                trace!("{phase}: '{}' accepted loosely: {strict}", line.text);
                Some(OrderResult::for_order(
                    order,
                    ResultKind::ValidationFailure,
                    format!("void: {}: {strict}", line.text),
                ))
            }
        };

        resolved.orders.push(order);
        resolved.results.extend(reported_results(order, line, parsed.defaulted));
        resolved.results.extend(loose_note);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::{Power, Province};
    use crate::board::state::{PhaseType, Season};
    use crate::board::variant::STANDARD_OPENING;
    use crate::protocol::parse_dfen;
    use crate::transcript::extract_order_lines;

    fn spring() -> Phase {
        Phase::new(1901, Season::Spring, PhaseType::Movement)
    }

    fn resolve(body: &str) -> Result<Resolved, ReplayError> {
        let (_, pos) = parse_dfen(STANDARD_OPENING).expect("opening");
        let mut options = RuleOptions::default();
        resolve_orders(spring(), &extract_order_lines(body), &pos, &mut options)
    }

    #[test]
    fn plain_success() {
        let r = resolve("Austria: Army Vienna -> Galicia.\n").expect("resolves");
        assert_eq!(r.orders.len(), 1);
        assert_eq!(r.results.len(), 1);
        assert_eq!(r.results[0].kind, ResultKind::Success);
        assert_eq!(r.results[0].power, Power::Austria);
    }

    #[test]
    fn annotations_become_results() {
        let r = resolve("France: Army Paris -> Burgundy. (*bounce, dislodged*)\n").expect("resolves");
        let kinds: Vec<_> = r.results.iter().map(|r| r.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![ResultKind::Failure, ResultKind::Dislodged { retreats: None }]
        );
        assert_eq!(r.results[0].message, "Army Paris -> Burgundy (bounce)");
    }

    #[test]
    fn loose_acceptance_adds_void_note() {
        // No Austrian unit in Galicia at the start of 1901.
        let r = resolve("Austria: Army Galicia HOLD.\n").expect("accepted loosely");
        assert_eq!(r.orders.len(), 1);
        assert_eq!(r.results[0].kind, ResultKind::Success);
        assert_eq!(r.results[1].kind, ResultKind::ValidationFailure);
        assert!(r.results[1].message.starts_with("void:"));
    }

    #[test]
    fn double_failure_aborts() {
        let err = resolve("Austria: Fleet Trieste -> Vienna.\n").expect_err("fleet inland");
        match err {
            ReplayError::OrderParse { text, cause, .. } => {
                assert_eq!(text, "Austria: Fleet Trieste -> Vienna");
                assert!(matches!(cause, LineError::Rules(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            resolve("Austria: Army Vienna waltzes.\n"),
            Err(ReplayError::OrderParse {
                cause: LineError::Text(_),
                ..
            })
        ));
    }

    #[test]
    fn wings_flip_the_option_on() {
        let (_, mut pos) = parse_dfen(STANDARD_OPENING).expect("opening");
        pos.remove_unit(Province::Kie);
        let mut options = RuleOptions::default();
        let lines = extract_order_lines("Germany: Wing Kiel -> Holland.\n");
        let r = resolve_orders(spring(), &lines, &pos, &mut options).expect("loose");
        assert!(options.wings);
        assert_eq!(r.orders.len(), 1);
    }
}
