//! Phase Sequencer.
//!
//! Drives the resolver, matcher and synthesizer over every block of a
//! transcript and assembles the turn history. Retreat and Adjustment phases
//! depend on the board left by the phases since the last Movement; those
//! phases are kept on an explicit lookback stack and re-derived, first for
//! display and then to rebuild the seed, before the dependent phase runs.
//!
//! Nothing reaches the [`World`] until the whole transcript has replayed.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::dislodge::{match_dislodgements, remove_destroyed};
use super::error::ReplayError;
use super::resolver::{resolve_orders, Resolved};
use super::result::OrderResult;
use super::synthesize::{apply_ownership, synthesize, PlacementPolicy};
use super::world::{TurnState, World};
use crate::board::state::{Phase, PhaseType, Position};
use crate::board::unit::Unit;
use crate::board::variant::Variant;
use crate::config::ReplayConfig;
use crate::protocol::parse_dfen;
use crate::rules::{RuleOptions, VictoryConditions};
use crate::transcript::{
    dislodgements, extract_order_lines, ownership, starting_units, BlockKind, GameInfo, Transcript, TurnBlock,
};

/// How a transcript relates to an already-loaded game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No game was loaded; this is a fresh reconstruction.
    NewWorld(Box<World>),
    /// The transcript starts before the loaded game's current phase.
    TryRewind,
    /// The transcript belongs to another game or lies beyond this one.
    LoadOther,
    /// The transcript resolved the loaded game's current phase.
    ThisWorld,
}

/// One phase's output under a single placement policy.
struct Derived {
    resolved: Resolved,
    position: Position,
    sc_owner_changed: bool,
}

/// Runs the full per-phase pipeline for one block body.
fn derive(
    text: &str,
    phase: Phase,
    seed: &Position,
    options: &mut RuleOptions,
    policy: PlacementPolicy,
) -> Result<Derived, ReplayError> {
    let lines = extract_order_lines(text);
    let mut resolved = resolve_orders(phase, &lines, seed, options)?;
    if phase.kind == PhaseType::Movement {
        let entries = dislodgements(text);
        resolved.results = match_dislodgements(phase, resolved.results, &entries, seed)?;
    }

    let mut position = synthesize(phase.kind, seed, &resolved, policy);
    remove_destroyed(&resolved.results, &mut position, policy);
    let mut sc_owner_changed = false;
    if policy == PlacementPolicy::Final {
        if let Some(entries) = ownership(text) {
            sc_owner_changed = apply_ownership(phase, &mut position, &entries)?;
        }
    }
    position.recompute_eliminations();

    Ok(Derived {
        resolved,
        position,
        sc_owner_changed,
    })
}

/// A phase on the lookback stack and the board it started from. `index`
/// points into [`Replay::phases`].
struct Frame {
    index: usize,
    phase: Phase,
    seed: Position,
}

/// In-progress replay of a run of blocks.
struct Replay<'a> {
    /// Order phases in transcript order, with their block bodies.
    phases: Vec<(Phase, &'a str)>,
    options: RuleOptions,
    /// Final layout of the last processed phase.
    seed: Position,
    /// Phases since the last Movement, oldest first.
    lookback: Vec<Frame>,
    /// Turn states by phase index, committed only when the run succeeds.
    staged: BTreeMap<usize, TurnState>,
    last: Option<Phase>,
}

impl<'a> Replay<'a> {
    fn new(transcript: &'a Transcript, seed: Position, options: RuleOptions, last: Option<Phase>) -> Self {
        Replay {
            phases: transcript
                .phases()
                .filter_map(|(phase, text)| phase.map(|p| (p, text)))
                .collect(),
            options,
            seed,
            lookback: Vec::new(),
            staged: BTreeMap::new(),
            last,
        }
    }

    fn run(&mut self) -> Result<(), ReplayError> {
        for index in 0..self.phases.len() {
            let phase = self.phases[index].0;
            if let Some(previous) = self.last.filter(|p| phase <= *p) {
                return Err(ReplayError::OutOfOrder { phase, previous });
            }
            self.last = Some(phase);

            match phase.kind {
                PhaseType::Movement => self.lookback.clear(),
                PhaseType::Retreat | PhaseType::Adjustment => self.rederive_lookback(phase)?,
            }
            let seed = self.seed.clone();
            self.process(index, phase, &seed)?;
            self.lookback.push(Frame { index, phase, seed });
        }
        Ok(())
    }

    /// Stages the phase's turn state (Viewing layout) and advances the seed
    /// to its Final layout.
    fn process(&mut self, index: usize, phase: Phase, seed: &Position) -> Result<(), ReplayError> {
        let text = self.phases[index].1;
        let viewing = derive(text, phase, seed, &mut self.options, PlacementPolicy::Viewing)?;
        let last = derive(text, phase, seed, &mut self.options, PlacementPolicy::Final)?;
        debug!(
            "{phase}: {} orders, {} results, {} units after",
            viewing.resolved.orders.len(),
            viewing.resolved.results.len(),
            last.position.unit_count()
        );

        self.staged.insert(
            index,
            TurnState {
                phase,
                position: viewing.position,
                orders: viewing.resolved.orders,
                results: viewing.resolved.results,
                resolved: true,
                ended: false,
                sc_owner_changed: last.sc_owner_changed,
            },
        );
        self.seed = last.position;
        Ok(())
    }

    /// Replays the lookback stack twice: under Viewing to re-stage each
    /// phase's turn state, then under Final to rebuild the seed.
    fn rederive_lookback(&mut self, next: Phase) -> Result<(), ReplayError> {
        let frames = std::mem::take(&mut self.lookback);
        let Some(first) = frames.first() else {
            return Ok(());
        };
        debug!("{next}: re-deriving {} earlier phase(s) from {}", frames.len(), first.phase);

        for frame in &frames {
            let text = self.phases[frame.index].1;
            let viewing = derive(text, frame.phase, &frame.seed, &mut self.options, PlacementPolicy::Viewing)?;
            if let Some(turn) = self.staged.get_mut(&frame.index) {
                turn.position = viewing.position;
                turn.orders = viewing.resolved.orders;
                turn.results = viewing.resolved.results;
            }
        }

        let mut seed = first.seed.clone();
        for frame in &frames {
            let text = self.phases[frame.index].1;
            seed = derive(text, frame.phase, &seed, &mut self.options, PlacementPolicy::Final)?.position;
        }
        self.seed = seed;
        self.lookback = frames;
        Ok(())
    }

    fn into_turns(self) -> (Vec<TurnState>, Position, RuleOptions, Option<Phase>) {
        (self.staged.into_values().collect(), self.seed, self.options, self.last)
    }
}

fn variant_of(info: &GameInfo) -> Result<Variant, ReplayError> {
    let name = info.variant.as_deref().ok_or(ReplayError::NoVariant(None))?;
    Variant::from_name(name).ok_or_else(|| ReplayError::NoVariant(Some(name.to_string())))
}

/// Builds a board from a starting-position block. Ownership not given by
/// the block is taken from `initial`.
fn starting_position(
    block: &TurnBlock,
    phase: Phase,
    initial: &Position,
    options: &mut RuleOptions,
) -> Result<Position, ReplayError> {
    let units = starting_units(&block.text)?;
    if units.is_empty() {
        return Err(ReplayError::NoStartingPosition(format!(
            "'{}' lists no units",
            block.header
        )));
    }

    let mut pos = Position::empty();
    pos.sc_home = initial.sc_home;
    pos.sc_owner = initial.sc_owner;
    for (power, unit) in units {
        if options.enable_for(unit.unit_type) {
            info!("{} units seen; enabling them for the rest of the game", unit.unit_type.name());
        }
        let loc = unit.location;
        if !pos.place_unit(loc.province, Unit::new(power, unit.unit_type, loc.coast)) {
            return Err(ReplayError::NoStartingPosition(format!(
                "two units in {}",
                loc.province.name()
            )));
        }
    }
    if let Some(entries) = ownership(&block.text) {
        apply_ownership(phase, &mut pos, &entries)?;
    }
    pos.record_occupiers();
    pos.recompute_eliminations();
    Ok(pos)
}

/// Closes the history: victory results when the game is over, otherwise an
/// unresolved turn state for the announced next phase.
fn conclude(
    transcript: &Transcript,
    turns: &mut Vec<TurnState>,
    final_position: &Position,
    last: Option<Phase>,
    conditions: VictoryConditions,
) -> Result<(), ReplayError> {
    if transcript.ended {
        if let Some(turn) = turns.last_mut() {
            let outcome = conditions.evaluate(final_position);
            info!("{}: game over, {outcome:?}", turn.phase);
            turn.results.extend(
                VictoryConditions::describe(&outcome)
                    .into_iter()
                    .map(|(power, message)| OrderResult::note(power, message)),
            );
            turn.ended = true;
            turn.resolved = true;
        }
        return Ok(());
    }

    if let Some(next) = transcript.next_phase {
        if let Some(previous) = last.filter(|p| next <= *p) {
            return Err(ReplayError::OutOfOrder { phase: next, previous });
        }
        turns.push(TurnState::unresolved(next, final_position.clone()));
    }
    Ok(())
}

/// Replays moderator transcripts into turn histories.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    config: ReplayConfig,
}

impl Reconstructor {
    pub fn new(config: ReplayConfig) -> Self {
        Reconstructor { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    fn conditions(&self) -> VictoryConditions {
        VictoryConditions::new(self.config.victory_centers)
    }

    /// Reconstructs a whole game from transcript text.
    pub fn reconstruct(&self, text: &str) -> Result<World, ReplayError> {
        let transcript = Transcript::parse(text)?;
        self.reconstruct_transcript(&transcript)
    }

    pub fn reconstruct_transcript(&self, transcript: &Transcript) -> Result<World, ReplayError> {
        let variant = variant_of(&transcript.info)?;
        let (default_phase, initial) = parse_dfen(&self.config.initial_position)?;
        let home_roster = initial.sc_home;
        let mut options = self.config.rules;
        let start = transcript.blocks.iter().find(|b| b.kind == BlockKind::Start);

        if !transcript.has_movement() {
            return self.starting_world(transcript, variant, start, default_phase, &initial);
        }

        let seed = match start {
            Some(block) => {
                let phase = block.phase.unwrap_or(default_phase);
                starting_position(block, phase, &initial, &mut options)?
            }
            None => initial,
        };

        let mut replay = Replay::new(transcript, seed, options, None);
        replay.run()?;
        let (mut turns, final_position, options, last) = replay.into_turns();
        conclude(transcript, &mut turns, &final_position, last, self.conditions())?;

        info!(
            "reconstructed {} turn states for game {:?}",
            turns.len(),
            transcript.info.game.as_deref().unwrap_or("?")
        );
        Ok(World {
            info: transcript.info.clone(),
            variant,
            options,
            home_roster,
            turns,
            final_position,
        })
    }

    /// A game that has not had a Movement phase yet: a single unresolved
    /// turn state built from the starting-position block.
    fn starting_world(
        &self,
        transcript: &Transcript,
        variant: Variant,
        start: Option<&TurnBlock>,
        default_phase: Phase,
        initial: &Position,
    ) -> Result<World, ReplayError> {
        let block = start.ok_or_else(|| {
            ReplayError::NoStartingPosition("no movement phase and no starting position".to_string())
        })?;
        let phase = block.phase.or(transcript.next_phase).unwrap_or(default_phase);
        let mut options = self.config.rules;
        let position = starting_position(block, phase, initial, &mut options)?;
        info!("{phase}: game starts with {} units", position.unit_count());

        Ok(World {
            info: transcript.info.clone(),
            variant,
            options,
            home_roster: initial.sc_home,
            turns: vec![TurnState::unresolved(phase, position.clone())],
            final_position: position,
        })
    }

    /// Imports a transcript against an optionally loaded game.
    ///
    /// `ThisWorld` means `world` was extended in place; every other outcome
    /// leaves it untouched.
    pub fn import(&self, world: Option<&mut World>, text: &str) -> Result<ImportOutcome, ReplayError> {
        let transcript = Transcript::parse(text)?;
        let Some(world) = world else {
            let fresh = self.reconstruct_transcript(&transcript)?;
            return Ok(ImportOutcome::NewWorld(Box::new(fresh)));
        };

        if !world.info.same_game(&transcript.info) {
            debug!("import: {:?} is a different game", transcript.info);
            return Ok(ImportOutcome::LoadOther);
        }
        let first = transcript.phases().find_map(|(phase, _)| phase);
        let (Some(first), Some(current)) = (first, world.current()) else {
            return Ok(ImportOutcome::LoadOther);
        };

        match first.cmp(&current.phase) {
            Ordering::Less => Ok(ImportOutcome::TryRewind),
            Ordering::Equal if current.resolved => Ok(ImportOutcome::TryRewind),
            Ordering::Greater => Ok(ImportOutcome::LoadOther),
            Ordering::Equal => {
                self.extend(world, &transcript)?;
                Ok(ImportOutcome::ThisWorld)
            }
        }
    }

    /// Resolves the world's pending phase (and anything after it) from
    /// `transcript`, replacing the unresolved turn state.
    fn extend(&self, world: &mut World, transcript: &Transcript) -> Result<(), ReplayError> {
        let previous = world.last_resolved().map(|t| t.phase);
        let mut replay = Replay::new(transcript, world.final_position.clone(), world.options, previous);
        replay.run()?;
        let (mut turns, final_position, options, last) = replay.into_turns();
        conclude(transcript, &mut turns, &final_position, last, self.conditions())?;

        if world.turns.last().is_some_and(|t| !t.resolved) {
            world.turns.pop();
        } else {
            warn!("import: no unresolved phase to replace");
        }
        info!("import: appending {} turn states", turns.len());
        world.turns.extend(turns);
        world.options = options;
        world.final_position = final_position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::{Power, Province};
    use crate::board::state::Season;

    const TWO_PHASES: &str = "\
Judge: USEF
Game: seq
Variant: Standard

Movement results for Spring of 1901.

Austria: Army Vienna -> Galicia.
Russia: Army Warsaw -> Galicia.  (*bounce*)

Movement results for Fall of 1901.

Austria: Army Galicia -> Bohemia.
";

    #[test]
    fn walks_blocks_in_order() {
        let world = Reconstructor::default().reconstruct(TWO_PHASES).expect("replays");
        assert_eq!(world.turns.len(), 2);
        assert!(world.turns.iter().all(|t| t.resolved && !t.ended));
        // The fall turn opens with the spring moves applied.
        assert_eq!(world.turns[1].position.unit_at(Province::Gal).map(|u| u.power), Some(Power::Austria));
        assert_eq!(world.turns[1].position.unit_at(Province::War).map(|u| u.power), Some(Power::Russia));
        assert!(world.final_position.unit_at(Province::Gal).is_none());
        assert_eq!(world.final_position.unit_at(Province::Boh).map(|u| u.power), Some(Power::Austria));
        assert_eq!(world.final_position.unit_count(), 22);
    }

    #[test]
    fn next_phase_marker_adds_unresolved_turn() {
        let text = format!("{TWO_PHASES}\nThe next phase of 'seq' will be Adjustments for Winter of 1901.\n");
        let world = Reconstructor::default().reconstruct(&text).expect("replays");
        assert_eq!(world.turns.len(), 3);
        let current = world.current().expect("current");
        assert!(!current.resolved);
        assert_eq!(current.phase, Phase::new(1901, Season::Fall, PhaseType::Adjustment));
        assert_eq!(current.position, world.final_position);
    }

    #[test]
    fn out_of_order_blocks_fail() {
        let text = "Variant: Standard\n\
                    Movement results for Fall of 1901.\n\nAustria: Army Vienna HOLD.\n\n\
                    Movement results for Spring of 1901.\n\nAustria: Army Vienna HOLD.\n";
        let err = Reconstructor::default().reconstruct(text).expect_err("out of order");
        assert_eq!(
            err,
            ReplayError::OutOfOrder {
                phase: Phase::new(1901, Season::Spring, PhaseType::Movement),
                previous: Phase::new(1901, Season::Fall, PhaseType::Movement),
            }
        );
    }

    #[test]
    fn variant_is_required() {
        let err = Reconstructor::default()
            .reconstruct("Movement results for Spring of 1901.\n")
            .expect_err("no variant");
        assert_eq!(err, ReplayError::NoVariant(None));
        let err = Reconstructor::default()
            .reconstruct("Variant: Chaos\nMovement results for Spring of 1901.\n")
            .expect_err("unknown variant");
        assert_eq!(err, ReplayError::NoVariant(Some("Chaos".to_string())));
    }
}
