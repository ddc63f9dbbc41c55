//! Realpolitik history library.
//!
//! Replays play-by-moderator Diplomacy transcripts into a phase-by-phase
//! turn history. Exposes the board model, notation codecs, order rules,
//! transcript tokenizer and the reconstruction driver.

pub mod board;
pub mod config;
pub mod protocol;
pub mod replay;
pub mod rules;
pub mod transcript;
