//! Sub-block extractors: dislodged units, supply-center ownership and
//! starting positions.
//!
//! Names are returned as written; resolving them against the map is left to
//! the caller so a bad name can be reported with the phase it came from.

use std::sync::LazyLock;

use regex::Regex;

use super::orders::{parse_unit_ref, OrderTextError};
use super::{re, TranscriptError};
use crate::board::order::OrderUnit;
use crate::board::province::Power;
use crate::board::unit::UnitType;

static DISLODGED_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^\s*the following units were dislodged"));
static DISLODGED_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*the\s+([a-z]+)\s+(army|fleet|wing)\s+in\s+(?:the\s+)?(.+?)\s+(?:can\s+retreat\s+to\s+(.+?)|with\s+no\s+valid\s+retreats\s+was\s+destroyed)\s*\.?\s*$")
});
static CANDIDATE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\s*,\s*|\s+or\s+"));

static OWNERSHIP_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^\s*ownership of supply centers"));
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*([A-Za-z]+)\s*:\s*(.*?)\s*\.?\s*$"));

/// One dislodged unit and the provinces it may retreat to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DislodgeEntry {
    /// Owner, from the adjective ("The Austrian Army ...").
    pub power: Option<Power>,
    pub unit_type: Option<UnitType>,
    pub source: String,
    /// Empty when the unit had no valid retreats and was destroyed.
    pub candidates: Vec<String>,
    pub line: String,
}

/// One `<Power>: <center>, <center>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipEntry {
    pub power: String,
    pub provinces: Vec<String>,
}

/// Lines of the sub-block introduced by `header`, ending at the first blank
/// line after an entry.
fn section<'a>(text: &'a str, header: &Regex) -> Option<Vec<&'a str>> {
    let mut lines = text.lines().skip_while(|l| !header.is_match(l));
    lines.next()?;
    let mut body = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if body.is_empty() {
                continue;
            }
            break;
        }
        body.push(line);
    }
    Some(body)
}

/// Reads the "The following units were dislodged:" sub-block.
pub fn dislodgements(text: &str) -> Vec<DislodgeEntry> {
    let Some(lines) = section(text, &DISLODGED_HEADER_RE) else {
        return Vec::new();
    };
    lines
        .into_iter()
        .filter_map(|line| {
            let caps = DISLODGED_RE.captures(line)?;
            let candidates = caps
                .get(4)
                .map(|m| {
                    CANDIDATE_SPLIT_RE
                        .split(m.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(DislodgeEntry {
                power: Power::lookup(&caps[1]).ok(),
                unit_type: UnitType::lookup(&caps[2]).ok(),
                source: caps[3].to_string(),
                candidates,
                line: line.trim().to_string(),
            })
        })
        .collect()
}

/// Reads the "Ownership of supply centers:" sub-block, if the block has one.
/// `Unowned` and `Neutral` entries are dropped.
pub fn ownership(text: &str) -> Option<Vec<OwnershipEntry>> {
    let lines = section(text, &OWNERSHIP_HEADER_RE)?;
    let mut entries = Vec::new();
    for line in lines {
        let Some(caps) = ENTRY_RE.captures(line) else {
            break;
        };
        let power = caps[1].to_string();
        if matches!(power.to_ascii_lowercase().as_str(), "unowned" | "neutral") {
            continue;
        }
        let provinces = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        entries.push(OwnershipEntry { power, provinces });
    }
    Some(entries)
}

/// Reads the `<Power>: <Unit> <Province>` lines of a starting-position block.
pub fn starting_units(text: &str) -> Result<Vec<(Power, OrderUnit)>, TranscriptError> {
    let mut units = Vec::new();
    for line in text.lines() {
        if OWNERSHIP_HEADER_RE.is_match(line) {
            break;
        }
        let Some(caps) = ENTRY_RE.captures(line) else {
            continue;
        };
        let Ok(power) = Power::lookup(&caps[1]) else {
            continue;
        };
        let unit = parse_unit_ref(&caps[2]).map_err(|source: OrderTextError| {
            TranscriptError::BadStartingLine {
                line: line.trim().to_string(),
                source,
            }
        })?;
        units.push((power, unit));
    }
    Ok(units)
}
