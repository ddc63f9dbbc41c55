//! DFEN board notation.
//!
//! One line describing a whole position:
//! `<year><season><phase>/<units>/<supply_centers>/<dislodged>`, e.g.
//! `1901sm/Aavie,...,Rfstp.sc/Abud,...,Nbel/-`. Empty unit lists are `-`.
//! Dislodged entries may carry a trailing `<attacker` which is ignored on
//! input and never written.

use crate::board::province::{Coast, Power, Province, ALL_POWERS, ALL_PROVINCES};
use crate::board::state::{Phase, PhaseType, Position, Season};
use crate::board::unit::{Unit, UnitType};

/// Errors that can occur during DFEN parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DfenError {
    #[error("expected 4 sections separated by '/', got {0}")]
    WrongSectionCount(usize),

    #[error("invalid phase info: '{0}'")]
    InvalidPhaseInfo(String),

    #[error("invalid power character: '{0}'")]
    InvalidPower(char),

    #[error("invalid unit type character: '{0}'")]
    InvalidUnitType(char),

    #[error("unknown province abbreviation: '{0}'")]
    UnknownProvince(String),

    #[error("invalid coast abbreviation: '{0}'")]
    InvalidCoast(String),

    #[error("duplicate {section} entry at '{province}'")]
    Duplicate {
        section: &'static str,
        province: String,
    },

    #[error("invalid {section} entry: '{entry}'")]
    InvalidEntry {
        section: &'static str,
        entry: String,
    },
}

/// Parses "vie", "stp.sc", "bul.ec".
fn parse_location(s: &str) -> Result<(Province, Coast), DfenError> {
    let (prov_str, coast) = match s.split_once('.') {
        Some((prov, coast_str)) => {
            let coast = Coast::from_abbr(coast_str)
                .filter(|c| *c != Coast::None)
                .ok_or_else(|| DfenError::InvalidCoast(coast_str.to_string()))?;
            (prov, coast)
        }
        None => (s, Coast::None),
    };
    let province = Province::from_abbr(prov_str)
        .ok_or_else(|| DfenError::UnknownProvince(prov_str.to_string()))?;
    Ok((province, coast))
}

fn parse_phase_info(s: &str) -> Result<Phase, DfenError> {
    let bad = || DfenError::InvalidPhaseInfo(s.to_string());
    let mut tail = s.chars().rev();
    let kind = tail.next().and_then(PhaseType::from_dfen_char).ok_or_else(bad)?;
    let season = tail.next().and_then(Season::from_dfen_char).ok_or_else(bad)?;
    let year_str = s.get(..s.len() - 2).ok_or_else(bad)?;
    let year = year_str.parse::<u16>().map_err(|_| bad())?;
    Ok(Phase::new(year, season, kind))
}

/// Parses `<power><unit><location>`, e.g. `Rfstp.sc`.
fn parse_unit_entry(entry: &str, section: &'static str) -> Result<(Province, Unit), DfenError> {
    let invalid = || DfenError::InvalidEntry {
        section,
        entry: entry.to_string(),
    };
    let mut chars = entry.chars();
    let power_char = chars.next().ok_or_else(invalid)?;
    let unit_char = chars.next().ok_or_else(invalid)?;
    let location = chars.as_str();
    if location.len() < 3 {
        return Err(invalid());
    }
    let power = Power::from_dui_char(power_char).ok_or(DfenError::InvalidPower(power_char))?;
    let unit_type = UnitType::from_dui_char(unit_char).ok_or(DfenError::InvalidUnitType(unit_char))?;
    let (province, coast) = parse_location(location)?;
    Ok((province, Unit::new(power, unit_type, coast)))
}

fn parse_units(s: &str, pos: &mut Position) -> Result<(), DfenError> {
    if s == "-" {
        return Ok(());
    }
    for entry in s.split(',') {
        let (province, unit) = parse_unit_entry(entry, "unit")?;
        if !pos.place_unit(province, unit) {
            return Err(DfenError::Duplicate {
                section: "unit",
                province: province.abbr().to_string(),
            });
        }
    }
    Ok(())
}

fn parse_supply_centers(s: &str, pos: &mut Position) -> Result<(), DfenError> {
    let mut seen = [false; crate::board::province::PROVINCE_COUNT];
    for entry in s.split(',') {
        let mut chars = entry.chars();
        let power_char = chars.next().ok_or_else(|| DfenError::InvalidEntry {
            section: "supply center",
            entry: entry.to_string(),
        })?;
        let prov_str = chars.as_str();
        let owner = match power_char {
            'N' => None,
            c => Some(Power::from_dui_char(c).ok_or(DfenError::InvalidPower(c))?),
        };
        let province = Province::from_abbr(prov_str)
            .filter(|p| p.is_supply_center())
            .ok_or_else(|| DfenError::UnknownProvince(prov_str.to_string()))?;
        let idx = province as usize;
        if seen[idx] {
            return Err(DfenError::Duplicate {
                section: "supply center",
                province: province.abbr().to_string(),
            });
        }
        seen[idx] = true;
        pos.set_sc_owner(province, owner);
    }
    Ok(())
}

fn parse_dislodged(s: &str, pos: &mut Position) -> Result<(), DfenError> {
    if s == "-" {
        return Ok(());
    }
    for entry in s.split(',') {
        let unit_part = entry.split_once('<').map_or(entry, |(u, _)| u);
        let (province, unit) = parse_unit_entry(unit_part, "dislodged")?;
        if !pos.place_dislodged(province, unit) {
            return Err(DfenError::Duplicate {
                section: "dislodged",
                province: province.abbr().to_string(),
            });
        }
    }
    Ok(())
}

/// Parses a DFEN string into its phase and position.
///
/// The home-center roster comes from the map, not the string.
pub fn parse_dfen(s: &str) -> Result<(Phase, Position), DfenError> {
    let sections: Vec<&str> = s.trim().split('/').collect();
    if sections.len() != 4 {
        return Err(DfenError::WrongSectionCount(sections.len()));
    }

    let phase = parse_phase_info(sections[0])?;
    let mut pos = Position::empty();
    pos.sc_home = Position::map_home_roster();

    parse_units(sections[1], &mut pos)?;
    parse_supply_centers(sections[2], &mut pos)?;
    parse_dislodged(sections[3], &mut pos)?;
    pos.record_occupiers();
    pos.recompute_eliminations();

    Ok((phase, pos))
}

fn encode_location(province: Province, coast: Coast) -> String {
    match coast {
        Coast::None => province.abbr().to_string(),
        c => format!("{}.{}", province.abbr(), c.abbr()),
    }
}

/// Units grouped by power (A, E, F, G, I, R, T), then by province index.
fn encode_unit_layer(layer: &[Option<Unit>]) -> String {
    let mut entries = Vec::new();
    for power in ALL_POWERS {
        for prov in ALL_PROVINCES {
            if let Some(u) = layer[prov as usize].filter(|u| u.power == power) {
                entries.push(format!(
                    "{}{}{}",
                    power.dui_char(),
                    u.unit_type.dui_char(),
                    encode_location(prov, u.coast)
                ));
            }
        }
    }
    if entries.is_empty() {
        "-".to_string()
    } else {
        entries.join(",")
    }
}

/// Owned centers grouped by power, neutral (`N`) centers last.
fn encode_supply_centers(pos: &Position) -> String {
    let centers = || ALL_PROVINCES.iter().copied().filter(|p| p.is_supply_center());
    let mut entries = Vec::new();
    for power in ALL_POWERS {
        for prov in centers().filter(|p| pos.sc_owner[*p as usize] == Some(power)) {
            entries.push(format!("{}{}", power.dui_char(), prov.abbr()));
        }
    }
    for prov in centers().filter(|p| pos.sc_owner[*p as usize].is_none()) {
        entries.push(format!("N{}", prov.abbr()));
    }
    entries.join(",")
}

/// Encodes a phase and position into canonical DFEN.
pub fn encode_dfen(phase: Phase, pos: &Position) -> String {
    format!(
        "{}{}{}/{}/{}/{}",
        phase.year,
        phase.season.dfen_char(),
        phase.kind.dfen_char(),
        encode_unit_layer(&pos.units),
        encode_supply_centers(pos),
        encode_unit_layer(&pos.dislodged)
    )
}
