//! Order lines and the order factory.
//!
//! A moderator reports each order on its own line as
//! `<Power>: <order text>. (*annotation*)`. Order text spells provinces out
//! in full and uses `->` for movement, so it is matched with a handful of
//! patterns rather than a tokenizer.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::re;
use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::{Coast, LookupError, Power, Province};
use crate::board::state::PhaseType;
use crate::board::unit::UnitType;

/// Why a line's order text could not be turned into an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderTextError {
    #[error("unrecognized order '{0}'")]
    Unrecognized(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^\s*([A-Za-z]+)\s*:\s*(\S.*?)\s*$"));
static SECTION_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*(ownership of supply centers|the following units were dislodged)")
});
static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\(\*\s*([^*]*?)\s*\*\)"));

static PAREN_COAST_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^(.*?)\s*\(([^)]*)\)$"));
static SLASH_COAST_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^(.*?)\s*/\s*([a-z.]+)$"));
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^(army|fleet|wing|a|f|w)\s+(.+)$"));

static WAIVE_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^builds?\s+waived$"));
static BUILD_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^builds?\s+an?\s+(army|fleet|wing)\s+(?:in|at)\s+(.+)$"));
static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^defaults?\s*,?\s+removing\s+(?:the|an?)\s+(army|fleet|wing)\s+(?:in|at)\s+(.+)$")
});
static REMOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^removes?\s+(?:the|an?)\s+(army|fleet|wing)\s+(?:in|at)\s+(.+)$"));
static CONVOY_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^(.+?)\s+convoys?\s+(.+?)\s*->\s*(.+)$"));
static SUPPORT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^(.+?)\s+supports?\s+(.+)$"));
static HOLD_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^(.+?)\s+holds?$"));
static DISBAND_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^(.+?)\s+disbands?$"));

/// One order as it appears in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub power: Power,
    /// Order text with annotations and the trailing period removed.
    pub text: String,
    /// Comma-joined contents of any `(*...*)` annotations.
    pub annotation: Option<String>,
}

/// A constructed order and whether the moderator substituted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderText {
    pub order: Order,
    pub defaulted: bool,
}

fn strip_period(text: &str) -> &str {
    text.trim().trim_end_matches('.').trim_end()
}

/// Pulls every `<Power>: <order>` line out of a block body, stopping at the
/// dislodgement or ownership sub-block. Lines whose prefix is not a power
/// are prose and are skipped.
pub fn extract_order_lines(text: &str) -> Vec<OrderLine> {
    let mut lines = Vec::new();
    for line in text.lines() {
        if SECTION_END_RE.is_match(line) {
            break;
        }
        let Some(caps) = LINE_RE.captures(line) else {
            continue;
        };
        let Ok(power) = Power::lookup(&caps[1]) else {
            continue;
        };
        let body = &caps[2];
        let notes: Vec<&str> = ANNOTATION_RE
            .captures_iter(body)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .filter(|s| !s.is_empty())
            .collect();
        let stripped = ANNOTATION_RE.replace_all(body, "");
        lines.push(OrderLine {
            power,
            text: strip_period(&stripped).to_string(),
            annotation: (!notes.is_empty()).then(|| notes.join(", ")),
        });
    }
    lines
}

/// Parses "St. Petersburg (south coast)", "spa/sc", "the North Sea".
pub fn parse_location(text: &str) -> Result<Location, LookupError> {
    let text = strip_period(text);
    let text = text
        .strip_prefix("the ")
        .or_else(|| text.strip_prefix("The "))
        .unwrap_or(text);
    let (prov_text, coast) = if let Some(caps) = PAREN_COAST_RE.captures(text) {
        (caps.get(1).map_or("", |m| m.as_str()), Coast::lookup(&caps[2])?)
    } else if let Some(caps) = SLASH_COAST_RE.captures(text) {
        (caps.get(1).map_or("", |m| m.as_str()), Coast::lookup(&caps[2])?)
    } else {
        (text, Coast::None)
    };
    Ok(Location::with_coast(Province::lookup(prov_text)?, coast))
}

/// Parses "Army Vienna", "F stp/nc".
pub fn parse_unit_ref(text: &str) -> Result<OrderUnit, OrderTextError> {
    let caps = UNIT_RE
        .captures(text.trim())
        .ok_or_else(|| OrderTextError::Unrecognized(text.to_string()))?;
    Ok(OrderUnit::new(UnitType::lookup(&caps[1])?, parse_location(&caps[2])?))
}

fn typed_unit(type_text: &str, loc_text: &str) -> Result<OrderUnit, OrderTextError> {
    Ok(OrderUnit::new(UnitType::lookup(type_text)?, parse_location(loc_text)?))
}

/// Builds an order from one line's text. In a retreat phase `->` means a
/// retreat rather than a move.
pub fn parse_order_text(power: Power, phase: PhaseType, text: &str) -> Result<OrderText, OrderTextError> {
    let text = strip_period(text);
    let plain = |order| Ok(OrderText { order, defaulted: false });

    if WAIVE_RE.is_match(text) {
        return plain(Order::Waive { power });
    }
    if let Some(c) = BUILD_RE.captures(text) {
        return plain(Order::Build {
            power,
            unit: typed_unit(&c[1], &c[2])?,
        });
    }
    if let Some(c) = DEFAULT_RE.captures(text) {
        return Ok(OrderText {
            order: Order::Disband {
                power,
                unit: typed_unit(&c[1], &c[2])?,
            },
            defaulted: true,
        });
    }
    if let Some(c) = REMOVE_RE.captures(text) {
        return plain(Order::Disband {
            power,
            unit: typed_unit(&c[1], &c[2])?,
        });
    }
    if let Some(c) = CONVOY_RE.captures(text) {
        return plain(Order::Convoy {
            power,
            unit: parse_unit_ref(&c[1])?,
            convoyed_from: parse_unit_ref(&c[2])?.location,
            convoyed_to: parse_location(&c[3])?,
        });
    }
    if let Some(c) = SUPPORT_RE.captures(text) {
        let unit = parse_unit_ref(&c[1])?;
        let target = c[2].trim();
        let order = match target.split_once("->") {
            Some((supported, dest)) => Order::SupportMove {
                power,
                unit,
                supported: parse_unit_ref(supported)?,
                dest: parse_location(dest)?,
            },
            None => {
                let supported = HOLD_RE.captures(target).map_or(target, |h| h.get(1).map_or(target, |m| m.as_str()));
                Order::SupportHold {
                    power,
                    unit,
                    supported: parse_unit_ref(supported)?,
                }
            }
        };
        return plain(order);
    }
    if let Some(c) = HOLD_RE.captures(text) {
        return plain(Order::Hold {
            power,
            unit: parse_unit_ref(&c[1])?,
        });
    }
    if let Some(c) = DISBAND_RE.captures(text) {
        return plain(Order::Disband {
            power,
            unit: parse_unit_ref(&c[1])?,
        });
    }
    if text.contains("->") {
        // Convoy routes list every sea on the way; only the ends matter.
        let mut steps = text.split("->");
        let unit = parse_unit_ref(steps.next().unwrap_or_default())?;
        let dest = parse_location(steps.last().unwrap_or_default())?;
        let order = match phase {
            PhaseType::Retreat => Order::Retreat { power, unit, dest },
            _ => Order::Move { power, unit, dest },
        };
        return plain(order);
    }
    Err(OrderTextError::Unrecognized(text.to_string()))
}
