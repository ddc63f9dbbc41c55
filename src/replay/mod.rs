//! History-driven state reconstruction.
//!
//! [`Reconstructor`] turns a moderator transcript into a [`World`]: one
//! [`TurnState`] per phase, each holding the board as the phase opened, the
//! orders given and the moderator's reported results.

pub mod dislodge;
pub mod error;
pub mod resolver;
pub mod result;
pub mod sequencer;
pub mod synthesize;
pub mod world;

pub use dislodge::{match_dislodgements, remove_destroyed};
pub use error::{LineError, ReplayError};
pub use resolver::{resolve_orders, Resolved};
pub use result::{OrderResult, ResultKind};
pub use sequencer::{ImportOutcome, Reconstructor};
pub use synthesize::{apply_ownership, synthesize, PlacementPolicy};
pub use world::{TurnState, TurnSummary, World, WorldSummary};
