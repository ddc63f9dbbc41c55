use thiserror::Error;

use crate::board::province::LookupError;
use crate::board::state::Phase;
use crate::protocol::DfenError;
use crate::rules::OrderError;
use crate::transcript::{OrderTextError, TranscriptError};

/// Underlying cause of a line that could not be replayed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error(transparent)]
    Text(#[from] OrderTextError),

    #[error(transparent)]
    Rules(#[from] OrderError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Everything that aborts a reconstruction. No partial history survives any
/// of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("unknown or missing variant {0:?}")]
    NoVariant(Option<String>),

    #[error("malformed transcript")]
    Malformed(#[from] TranscriptError),

    #[error("{phase} is out of order after {previous}")]
    OutOfOrder { phase: Phase, previous: Phase },

    #[error("{phase}: cannot parse order '{text}'")]
    OrderParse {
        phase: Phase,
        text: String,
        #[source]
        cause: LineError,
    },

    #[error("{phase}: no dislodgement entry for the unit in {province} ('{text}')")]
    DislodgementMatch {
        phase: Phase,
        province: &'static str,
        text: String,
    },

    #[error("{phase}: illegal retreat candidate '{candidate}' in '{line}'")]
    RetreatValidation {
        phase: Phase,
        candidate: String,
        line: String,
        #[source]
        cause: LineError,
    },

    #[error("{phase}: bad ownership entry '{entry}'")]
    OwnershipReference {
        phase: Phase,
        entry: String,
        #[source]
        cause: LookupError,
    },

    #[error("cannot build a starting position: {0}")]
    NoStartingPosition(String),

    #[error("invalid initial position")]
    InitialPosition(#[from] DfenError),
}
