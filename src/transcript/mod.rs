//! Moderator transcript tokenizer.
//!
//! Splits a game history into a header (judge, game, variant), an ordered
//! list of per-phase blocks and the trailing end-of-game / next-phase
//! markers. Blocks keep their raw body text; the extractors in [`orders`]
//! and [`blocks`] pull orders, dislodgements and ownership out of it.

pub mod blocks;
pub mod orders;

use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use thiserror::Error;

use crate::board::state::{Phase, PhaseType, Season};

pub use blocks::{dislodgements, ownership, starting_units, DislodgeEntry, OwnershipEntry};
pub use orders::{extract_order_lines, parse_location, parse_order_text, OrderLine, OrderText, OrderTextError};

/// Errors raised while splitting a transcript or reading its sub-blocks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("unrecognized block header '{0}'")]
    MalformedHeader(String),

    #[error("block '{0}' does not name a season and year")]
    MissingPhase(String),

    #[error("unparsable next-phase marker '{0}'")]
    BadNextPhase(String),

    #[error("bad starting-position line '{line}'")]
    BadStartingLine {
        line: String,
        #[source]
        source: OrderTextError,
    },
}

pub(crate) fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static HEADER_INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^\s*(judge|game|variant)\s*:\s*(.+?)\s*$"));
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*([a-z]+)\s+(results|orders|position)\s+for\s+([a-z]+)\s+of\s+(\d{1,4})\b")
});
static BARE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^\s*starting\s+position\s*\.?\s*$"));
static END_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)the game is over"));
static NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)the next phase of\s+'([^']*)'\s+will be\s+(.*)$"));
static NEXT_PHASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*(movement|retreats?|adjustments?)\s+for\s+([a-z]+)\s+of\s+(\d{1,4})\s*\.?\s*$")
});

/// Judge, game and variant as announced in the transcript header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub judge: Option<String>,
    pub game: Option<String>,
    pub variant: Option<String>,
}

impl GameInfo {
    /// Same moderator, game and variant (case-insensitive).
    pub fn same_game(&self, other: &GameInfo) -> bool {
        fn eq(a: &Option<String>, b: &Option<String>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            }
        }
        eq(&self.judge, &other.judge) && eq(&self.game, &other.game) && eq(&self.variant, &other.variant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Start,
    Orders(PhaseType),
}

/// One per-phase section of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBlock {
    pub kind: BlockKind,
    /// None only for a starting-position block with no season.
    pub phase: Option<Phase>,
    pub header: String,
    /// Logical lines after the header, continuations already joined.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub info: GameInfo,
    pub blocks: Vec<TurnBlock>,
    pub ended: bool,
    pub next_phase: Option<Phase>,
}

/// Joins indented continuation lines onto the line before them.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_end();
        let indented = raw.starts_with(' ') || raw.starts_with('\t');
        match lines.last_mut() {
            Some(prev) if indented && !raw.trim().is_empty() && !prev.trim().is_empty() => {
                prev.push(' ');
                prev.push_str(raw.trim());
            }
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn parse_phase(kind: PhaseType, season: &str, year: &str) -> Option<Phase> {
    let season = Season::lookup(season)?;
    let year = year.parse::<u16>().ok()?;
    Some(Phase::new(year, season, kind))
}

fn parse_header(line: &str) -> Result<Option<TurnBlock>, TranscriptError> {
    let block = |kind, phase| TurnBlock {
        kind,
        phase,
        header: line.trim().to_string(),
        text: String::new(),
    };
    if BARE_START_RE.is_match(line) {
        return Ok(Some(block(BlockKind::Start, None)));
    }
    let Some(caps) = BLOCK_RE.captures(line) else {
        return Ok(None);
    };
    let word = caps[1].to_ascii_lowercase();
    let noun = caps[2].to_ascii_lowercase();
    let (kind, phase_kind) = match (word.as_str(), noun.as_str()) {
        ("starting", "position") => (BlockKind::Start, PhaseType::Movement),
        ("movement", "results") => (BlockKind::Orders(PhaseType::Movement), PhaseType::Movement),
        ("retreat", "results" | "orders") => (BlockKind::Orders(PhaseType::Retreat), PhaseType::Retreat),
        ("adjustment", "results" | "orders") => {
            (BlockKind::Orders(PhaseType::Adjustment), PhaseType::Adjustment)
        }
        _ => return Err(TranscriptError::MalformedHeader(line.trim().to_string())),
    };
    let phase = parse_phase(phase_kind, &caps[3], &caps[4]);
    if phase.is_none() {
        return Err(TranscriptError::MissingPhase(line.trim().to_string()));
    }
    Ok(Some(block(kind, phase)))
}

fn parse_next_phase(line: &str, rest: &str) -> Result<Phase, TranscriptError> {
    let bad = || TranscriptError::BadNextPhase(line.trim().to_string());
    let caps = NEXT_PHASE_RE.captures(rest).ok_or_else(bad)?;
    let kind = PhaseType::lookup(&caps[1]).ok_or_else(bad)?;
    parse_phase(kind, &caps[2], &caps[3]).ok_or_else(bad)
}

impl Transcript {
    /// Splits raw transcript text into header, blocks and markers.
    pub fn parse(text: &str) -> Result<Transcript, TranscriptError> {
        let mut transcript = Transcript::default();
        let mut current: Option<TurnBlock> = None;

        for line in logical_lines(text) {
            if END_RE.is_match(&line) {
                transcript.ended = true;
            }
            if let Some(caps) = NEXT_RE.captures(&line) {
                transcript.next_phase = Some(parse_next_phase(&line, &caps[2])?);
                continue;
            }
            if let Some(block) = parse_header(&line)? {
                trace!("block header: {}", block.header);
                transcript.blocks.extend(current.replace(block));
                continue;
            }
            match current.as_mut() {
                Some(block) => {
                    block.text.push_str(&line);
                    block.text.push('\n');
                }
                None => {
                    if let Some(caps) = HEADER_INFO_RE.captures(&line) {
                        let value = Some(caps[2].to_string());
                        match caps[1].to_ascii_lowercase().as_str() {
                            "judge" => transcript.info.judge = value,
                            "game" => transcript.info.game = value,
                            _ => transcript.info.variant = value,
                        }
                    }
                }
            }
        }
        transcript.blocks.extend(current);

        debug!(
            "transcript: {} blocks, ended={}, next={:?}",
            transcript.blocks.len(),
            transcript.ended,
            transcript.next_phase
        );
        Ok(transcript)
    }

    /// The ordered `(phase, body)` sequence the sequencer walks. Starting
    /// positions are not order phases and come out as `None`.
    pub fn phases(&self) -> impl Iterator<Item = (Option<Phase>, &str)> {
        self.blocks.iter().map(|b| match b.kind {
            BlockKind::Orders(_) => (b.phase, b.text.as_str()),
            BlockKind::Start => (None, b.text.as_str()),
        })
    }

    pub fn has_movement(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| b.kind == BlockKind::Orders(PhaseType::Movement))
    }
}
