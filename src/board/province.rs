//! Provinces, powers and coasts of the standard map.
//!
//! Provinces are enumerated alphabetically by their 3-letter abbreviation so
//! that `Province as usize` indexes the static metadata table and every
//! per-province array in [`Position`](super::state::Position).
//!
//! Transcripts spell provinces many ways ("St. Petersburg", "Gulf of Lyons",
//! "mid-atlantic"), so lookups normalise case, punctuation and spacing before
//! comparing, and fall back to an unambiguous prefix match.

use thiserror::Error;

/// The number of provinces on the standard map.
pub const PROVINCE_COUNT: usize = 75;

/// The number of supply centers on the standard map.
pub const SUPPLY_CENTER_COUNT: usize = 34;

/// Number of great powers.
pub const POWER_COUNT: usize = 7;

/// Shortest input accepted by the prefix fallback.
const MIN_PREFIX_LEN: usize = 3;

/// Errors raised when a name from a transcript does not resolve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("ambiguous province '{0}'")]
    AmbiguousProvince(String),

    #[error("unknown power '{0}'")]
    UnknownPower(String),

    #[error("unknown coast '{0}'")]
    UnknownCoast(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("'{0}' is not a supply center")]
    NotASupplyCenter(String),
}

/// A province on the standard map, in alphabetical order by abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Province {
    Adr, Aeg, Alb, Ank, Apu, Arm, Bal, Bar, Bel, Ber, Bla, Boh, Bot, Bre, Bud, Bul, Bur, Cly,
    Con, Den, Eas, Edi, Eng, Fin, Gal, Gas, Gol, Gre, Hel, Hol, Ion, Iri, Kie, Lon, Lvn, Lvp,
    Mao, Mar, Mos, Mun, Naf, Nao, Nap, Nrg, Nth, Nwy, Par, Pic, Pie, Por, Pru, Rom, Ruh, Rum,
    Ser, Sev, Sil, Ska, Smy, Spa, Stp, Swe, Syr, Tri, Tun, Tus, Tyr, Tys, Ukr, Ven, Vie, Wal,
    War, Wes, Yor,
}

/// All province variants in index order.
pub const ALL_PROVINCES: [Province; PROVINCE_COUNT] = [
    Province::Adr, Province::Aeg, Province::Alb, Province::Ank, Province::Apu, Province::Arm,
    Province::Bal, Province::Bar, Province::Bel, Province::Ber, Province::Bla, Province::Boh,
    Province::Bot, Province::Bre, Province::Bud, Province::Bul, Province::Bur, Province::Cly,
    Province::Con, Province::Den, Province::Eas, Province::Edi, Province::Eng, Province::Fin,
    Province::Gal, Province::Gas, Province::Gol, Province::Gre, Province::Hel, Province::Hol,
    Province::Ion, Province::Iri, Province::Kie, Province::Lon, Province::Lvn, Province::Lvp,
    Province::Mao, Province::Mar, Province::Mos, Province::Mun, Province::Naf, Province::Nao,
    Province::Nap, Province::Nrg, Province::Nth, Province::Nwy, Province::Par, Province::Pic,
    Province::Pie, Province::Por, Province::Pru, Province::Rom, Province::Ruh, Province::Rum,
    Province::Ser, Province::Sev, Province::Sil, Province::Ska, Province::Smy, Province::Spa,
    Province::Stp, Province::Swe, Province::Syr, Province::Tri, Province::Tun, Province::Tus,
    Province::Tyr, Province::Tys, Province::Ukr, Province::Ven, Province::Vie, Province::Wal,
    Province::War, Province::Wes, Province::Yor,
];

impl Province {
    /// Returns the 3-letter abbreviation for this province.
    pub const fn abbr(self) -> &'static str {
        PROVINCE_INFO[self as usize].abbr
    }

    /// Returns the full display name for this province.
    pub const fn name(self) -> &'static str {
        PROVINCE_INFO[self as usize].name
    }

    /// Returns the province type (Land, Sea, or Coastal).
    pub const fn province_type(self) -> ProvinceType {
        PROVINCE_INFO[self as usize].province_type
    }

    /// Returns true if this province is a supply center.
    pub const fn is_supply_center(self) -> bool {
        !matches!(PROVINCE_INFO[self as usize].center, Sc::No)
    }

    /// Returns the home power for this province, or None if neutral.
    pub const fn home_power(self) -> Option<Power> {
        match PROVINCE_INFO[self as usize].center {
            Sc::Home(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the available coasts for split-coast provinces, empty otherwise.
    pub const fn coasts(self) -> &'static [Coast] {
        PROVINCE_INFO[self as usize].coasts
    }

    /// Returns true if this province has split coasts.
    pub const fn has_coasts(self) -> bool {
        !PROVINCE_INFO[self as usize].coasts.is_empty()
    }

    /// Looks up a province by its exact 3-letter abbreviation.
    pub fn from_abbr(abbr: &str) -> Option<Province> {
        ALL_PROVINCES.iter().copied().find(|p| p.abbr() == abbr)
    }

    /// Resolves a province from free-form transcript text.
    ///
    /// Tries abbreviation, full name and aliases after normalisation, then a
    /// prefix match that must identify exactly one province.
    pub fn lookup(text: &str) -> Result<Province, LookupError> {
        let key = normalize(text);
        if key.is_empty() {
            return Err(LookupError::UnknownProvince(text.to_string()));
        }

        let exact = ALL_PROVINCES.iter().copied().find(|p| {
            let info = &PROVINCE_INFO[*p as usize];
            info.abbr == key
                || normalize(info.name) == key
                || info.aliases.iter().any(|a| *a == key)
        });
        if let Some(p) = exact {
            return Ok(p);
        }

        if key.len() < MIN_PREFIX_LEN {
            return Err(LookupError::UnknownProvince(text.to_string()));
        }
        let mut candidates = ALL_PROVINCES.iter().copied().filter(|p| {
            let info = &PROVINCE_INFO[*p as usize];
            normalize(info.name).starts_with(&key) || info.aliases.iter().any(|a| a.starts_with(&key))
        });
        match (candidates.next(), candidates.next()) {
            (Some(p), None) => Ok(p),
            (Some(_), Some(_)) => Err(LookupError::AmbiguousProvince(text.to_string())),
            _ => Err(LookupError::UnknownProvince(text.to_string())),
        }
    }
}

/// Lowercases, turns punctuation into spaces and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coast specifier for split-coast provinces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Coast {
    None,
    North,
    South,
    East,
}

impl Coast {
    /// Returns the 2-letter abbreviation (empty string for None).
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::None => "",
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
        }
    }

    /// Parses a coast from its 2-letter abbreviation.
    pub fn from_abbr(s: &str) -> Option<Coast> {
        match s {
            "" => Some(Coast::None),
            "nc" => Some(Coast::North),
            "sc" => Some(Coast::South),
            "ec" => Some(Coast::East),
            _ => Option::None,
        }
    }

    /// Parses the coast spellings moderators use: `nc`, `north coast`,
    /// `north`, `n.c.` and so on.
    pub fn lookup(text: &str) -> Result<Coast, LookupError> {
        let key = normalize(text).replace(' ', "");
        match key.as_str() {
            "nc" | "north" | "northcoast" => Ok(Coast::North),
            "sc" | "south" | "southcoast" => Ok(Coast::South),
            "ec" | "east" | "eastcoast" => Ok(Coast::East),
            _ => Err(LookupError::UnknownCoast(text.to_string())),
        }
    }
}

/// Classifies a province by terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvinceType {
    Land,
    Sea,
    Coastal,
}

/// One of the seven great powers.
///
/// The declaration order is the canonical power order used for display
/// sorting and notation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Power {
    Austria,
    England,
    France,
    Germany,
    Italy,
    Russia,
    Turkey,
}

/// All seven powers in standard order.
pub const ALL_POWERS: [Power; POWER_COUNT] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// Returns the capitalised name used in transcripts.
    pub const fn name(self) -> &'static str {
        match self {
            Power::Austria => "Austria",
            Power::England => "England",
            Power::France => "France",
            Power::Germany => "Germany",
            Power::Italy => "Italy",
            Power::Russia => "Russia",
            Power::Turkey => "Turkey",
        }
    }

    /// Returns the adjective used in dislodgement reports ("The Turkish Army ...").
    pub const fn adjective(self) -> &'static str {
        match self {
            Power::Austria => "Austrian",
            Power::England => "English",
            Power::France => "French",
            Power::Germany => "German",
            Power::Italy => "Italian",
            Power::Russia => "Russian",
            Power::Turkey => "Turkish",
        }
    }

    /// Returns the single-character notation abbreviation.
    pub const fn dui_char(self) -> char {
        match self {
            Power::Austria => 'A',
            Power::England => 'E',
            Power::France => 'F',
            Power::Germany => 'G',
            Power::Italy => 'I',
            Power::Russia => 'R',
            Power::Turkey => 'T',
        }
    }

    /// Index into per-power arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parses a power from its single-character notation abbreviation.
    pub fn from_dui_char(c: char) -> Option<Power> {
        ALL_POWERS.iter().copied().find(|p| p.dui_char() == c)
    }

    /// Resolves a power from its name or adjective, ignoring case.
    pub fn lookup(text: &str) -> Result<Power, LookupError> {
        let key = normalize(text);
        ALL_POWERS
            .iter()
            .copied()
            .find(|p| key == p.name().to_ascii_lowercase() || key == p.adjective().to_ascii_lowercase())
            .ok_or_else(|| LookupError::UnknownPower(text.to_string()))
    }
}

/// Supply-center status of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sc {
    No,
    Neutral,
    Home(Power),
}

/// Static metadata for a province.
pub struct ProvinceInfo {
    pub abbr: &'static str,
    pub name: &'static str,
    pub province_type: ProvinceType,
    pub center: Sc,
    pub coasts: &'static [Coast],
    /// Extra normalised spellings accepted by [`Province::lookup`].
    pub aliases: &'static [&'static str],
}

const fn info(
    abbr: &'static str,
    name: &'static str,
    province_type: ProvinceType,
    center: Sc,
    coasts: &'static [Coast],
    aliases: &'static [&'static str],
) -> ProvinceInfo {
    ProvinceInfo {
        abbr,
        name,
        province_type,
        center,
        coasts,
        aliases,
    }
}

const NC: Coast = Coast::North;
const SC: Coast = Coast::South;
const EC: Coast = Coast::East;

use ProvinceType::{Coastal, Land, Sea};

/// Compile-time lookup table: index by `Province as usize`.
pub static PROVINCE_INFO: [ProvinceInfo; PROVINCE_COUNT] = [
    info("adr", "Adriatic Sea", Sea, Sc::No, &[], &[]),
    info("aeg", "Aegean Sea", Sea, Sc::No, &[], &[]),
    info("alb", "Albania", Coastal, Sc::No, &[], &[]),
    info("ank", "Ankara", Coastal, Sc::Home(Power::Turkey), &[], &[]),
    info("apu", "Apulia", Coastal, Sc::No, &[], &[]),
    info("arm", "Armenia", Coastal, Sc::No, &[], &[]),
    info("bal", "Baltic Sea", Sea, Sc::No, &[], &[]),
    info("bar", "Barents Sea", Sea, Sc::No, &[], &[]),
    info("bel", "Belgium", Coastal, Sc::Neutral, &[], &[]),
    info("ber", "Berlin", Coastal, Sc::Home(Power::Germany), &[], &[]),
    info("bla", "Black Sea", Sea, Sc::No, &[], &["blk"]),
    info("boh", "Bohemia", Land, Sc::No, &[], &[]),
    info("bot", "Gulf of Bothnia", Sea, Sc::No, &[], &["gob"]),
    info("bre", "Brest", Coastal, Sc::Home(Power::France), &[], &[]),
    info("bud", "Budapest", Land, Sc::Home(Power::Austria), &[], &[]),
    info("bul", "Bulgaria", Coastal, Sc::Neutral, &[EC, SC], &[]),
    info("bur", "Burgundy", Land, Sc::No, &[], &[]),
    info("cly", "Clyde", Coastal, Sc::No, &[], &[]),
    info("con", "Constantinople", Coastal, Sc::Home(Power::Turkey), &[], &["istanbul"]),
    info("den", "Denmark", Coastal, Sc::Neutral, &[], &[]),
    info("eas", "Eastern Mediterranean", Sea, Sc::No, &[], &["eastern med", "emed"]),
    info("edi", "Edinburgh", Coastal, Sc::Home(Power::England), &[], &[]),
    info("eng", "English Channel", Sea, Sc::No, &[], &["ech"]),
    info("fin", "Finland", Coastal, Sc::No, &[], &[]),
    info("gal", "Galicia", Land, Sc::No, &[], &[]),
    info("gas", "Gascony", Coastal, Sc::No, &[], &[]),
    info("gol", "Gulf of Lyon", Sea, Sc::No, &[], &["gulf of lyons", "lyo"]),
    info("gre", "Greece", Coastal, Sc::Neutral, &[], &[]),
    info("hel", "Heligoland Bight", Sea, Sc::No, &[], &["helgoland"]),
    info("hol", "Holland", Coastal, Sc::Neutral, &[], &[]),
    info("ion", "Ionian Sea", Sea, Sc::No, &[], &[]),
    info("iri", "Irish Sea", Sea, Sc::No, &[], &[]),
    info("kie", "Kiel", Coastal, Sc::Home(Power::Germany), &[], &[]),
    info("lon", "London", Coastal, Sc::Home(Power::England), &[], &[]),
    info("lvn", "Livonia", Coastal, Sc::No, &[], &[]),
    info("lvp", "Liverpool", Coastal, Sc::Home(Power::England), &[], &["lpl"]),
    info("mao", "Mid-Atlantic Ocean", Sea, Sc::No, &[], &["mid atlantic", "mid", "mat"]),
    info("mar", "Marseilles", Coastal, Sc::Home(Power::France), &[], &[]),
    info("mos", "Moscow", Land, Sc::Home(Power::Russia), &[], &[]),
    info("mun", "Munich", Land, Sc::Home(Power::Germany), &[], &[]),
    info("naf", "North Africa", Coastal, Sc::No, &[], &[]),
    info("nao", "North Atlantic Ocean", Sea, Sc::No, &[], &["nat", "north atlantic"]),
    info("nap", "Naples", Coastal, Sc::Home(Power::Italy), &[], &[]),
    info("nrg", "Norwegian Sea", Sea, Sc::No, &[], &["nwg"]),
    info("nth", "North Sea", Sea, Sc::No, &[], &[]),
    info("nwy", "Norway", Coastal, Sc::Neutral, &[], &["nor"]),
    info("par", "Paris", Land, Sc::Home(Power::France), &[], &[]),
    info("pic", "Picardy", Coastal, Sc::No, &[], &[]),
    info("pie", "Piedmont", Coastal, Sc::No, &[], &[]),
    info("por", "Portugal", Coastal, Sc::Neutral, &[], &[]),
    info("pru", "Prussia", Coastal, Sc::No, &[], &[]),
    info("rom", "Rome", Coastal, Sc::Home(Power::Italy), &[], &[]),
    info("ruh", "Ruhr", Land, Sc::No, &[], &[]),
    info("rum", "Rumania", Coastal, Sc::Neutral, &[], &["romania"]),
    info("ser", "Serbia", Land, Sc::Neutral, &[], &[]),
    info("sev", "Sevastopol", Coastal, Sc::Home(Power::Russia), &[], &[]),
    info("sil", "Silesia", Land, Sc::No, &[], &[]),
    info("ska", "Skagerrak", Sea, Sc::No, &[], &["skagerak"]),
    info("smy", "Smyrna", Coastal, Sc::Home(Power::Turkey), &[], &[]),
    info("spa", "Spain", Coastal, Sc::Neutral, &[NC, SC], &[]),
    info("stp", "St. Petersburg", Coastal, Sc::Home(Power::Russia), &[NC, SC], &["saint petersburg", "st pete"]),
    info("swe", "Sweden", Coastal, Sc::Neutral, &[], &[]),
    info("syr", "Syria", Coastal, Sc::No, &[], &[]),
    info("tri", "Trieste", Coastal, Sc::Home(Power::Austria), &[], &[]),
    info("tun", "Tunisia", Coastal, Sc::Neutral, &[], &[]),
    info("tus", "Tuscany", Coastal, Sc::No, &[], &[]),
    info("tyr", "Tyrolia", Land, Sc::No, &[], &["tyrol"]),
    info("tys", "Tyrrhenian Sea", Sea, Sc::No, &[], &["tyn", "tyrrhenian"]),
    info("ukr", "Ukraine", Land, Sc::No, &[], &[]),
    info("ven", "Venice", Coastal, Sc::Home(Power::Italy), &[], &[]),
    info("vie", "Vienna", Land, Sc::Home(Power::Austria), &[], &[]),
    info("wal", "Wales", Coastal, Sc::No, &[], &[]),
    info("war", "Warsaw", Land, Sc::Home(Power::Russia), &[], &[]),
    info("wes", "Western Mediterranean", Sea, Sc::No, &[], &["western med", "wmed"]),
    info("yor", "Yorkshire", Coastal, Sc::No, &[], &[]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum_order() {
        for (i, p) in ALL_PROVINCES.iter().enumerate() {
            assert_eq!(*p as usize, i, "Province {:?} has wrong index", p);
            assert_eq!(format!("{:?}", p).to_lowercase(), p.abbr());
        }
    }

    #[test]
    fn supply_center_count_is_34() {
        let sc_count = ALL_PROVINCES.iter().filter(|p| p.is_supply_center()).count();
        assert_eq!(sc_count, SUPPLY_CENTER_COUNT);
    }

    #[test]
    fn home_centers_per_power() {
        let count_for = |power: Power| ALL_PROVINCES.iter().filter(|p| p.home_power() == Some(power)).count();
        assert_eq!(count_for(Power::Russia), 4);
        for power in [Power::Austria, Power::England, Power::France, Power::Germany, Power::Italy, Power::Turkey] {
            assert_eq!(count_for(power), 3, "{:?}", power);
        }
    }

    #[test]
    fn lookup_by_abbr_name_and_alias() {
        assert_eq!(Province::lookup("vie"), Ok(Province::Vie));
        assert_eq!(Province::lookup("Vienna"), Ok(Province::Vie));
        assert_eq!(Province::lookup("St. Petersburg"), Ok(Province::Stp));
        assert_eq!(Province::lookup("ST PETERSBURG"), Ok(Province::Stp));
        assert_eq!(Province::lookup("Gulf of Lyons"), Ok(Province::Gol));
        assert_eq!(Province::lookup("Mid-Atlantic Ocean"), Ok(Province::Mao));
    }

    #[test]
    fn lookup_prefix_fallback() {
        assert_eq!(Province::lookup("Tyrrhen"), Ok(Province::Tys));
        assert_eq!(Province::lookup("Constant"), Ok(Province::Con));
        assert_eq!(
            Province::lookup("North"),
            Err(LookupError::AmbiguousProvince("North".to_string()))
        );
        assert_eq!(
            Province::lookup("Atlantis"),
            Err(LookupError::UnknownProvince("Atlantis".to_string()))
        );
        assert!(Province::lookup("").is_err());
    }

    #[test]
    fn power_lookup_accepts_adjectives() {
        assert_eq!(Power::lookup("turkey"), Ok(Power::Turkey));
        assert_eq!(Power::lookup("Turkish"), Ok(Power::Turkey));
        assert_eq!(Power::lookup("ENGLISH"), Ok(Power::England));
        assert!(Power::lookup("Prussia").is_err());
        for p in ALL_POWERS {
            assert_eq!(Power::from_dui_char(p.dui_char()), Some(p));
        }
    }

    #[test]
    fn coast_spellings() {
        assert_eq!(Coast::lookup("nc"), Ok(Coast::North));
        assert_eq!(Coast::lookup("south coast"), Ok(Coast::South));
        assert_eq!(Coast::lookup("E.C."), Ok(Coast::East));
        assert!(Coast::lookup("west").is_err());
    }

    #[test]
    fn split_coast_provinces() {
        assert_eq!(Province::Bul.coasts(), &[Coast::East, Coast::South]);
        assert_eq!(Province::Spa.coasts(), &[Coast::North, Coast::South]);
        assert_eq!(Province::Stp.coasts(), &[Coast::North, Coast::South]);
        assert_eq!(ALL_PROVINCES.iter().filter(|p| p.has_coasts()).count(), 3);
    }
}
