#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crossroads.
//!
//! The world owns both vehicles, the stop-sign session, and the outcome of the
//! run. It changes only through [`apply`], which refuses every command once the
//! run has ended, and it is read only through the [`query`] module.

use std::ops::Range;

use crossroads_core::{
    AiPhase, Command, Direction, Event, IgnoreReason, JunctionGeometry, LossReason, Offset,
    Outcome, Position, StopSignPhase, Timestamp,
};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PLAYER_START: Position = Position::new(815.0, 210.0);
const PLAYER_START_FACING: Direction = Direction::Left;
const PLAYER_SPEED: f32 = 8.0;

const AI_START: Position = Position::new(0.0, 210.0);
const AI_SPEED_RANGE: Range<f32> = 5.0..10.0;

const DEFAULT_AI_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// How the AI vehicle's speed is chosen when the world is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiSpeed {
    /// Drawn uniformly from the supported range using the provided seed.
    Randomized {
        /// Seed for the speed draw.
        seed: u64,
    },
    /// Exactly the provided value. Intended for deterministic tests.
    Fixed(f32),
}

/// Parameters required to construct a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// Junction layout the run takes place on.
    pub geometry: JunctionGeometry,
    /// Strategy used to pick the AI vehicle's speed.
    pub ai_speed: AiSpeed,
}

impl WorldConfig {
    /// Standard junction with an AI speed drawn from `seed`.
    #[must_use]
    pub const fn seeded(seed: u64) -> Self {
        Self {
            geometry: JunctionGeometry::STANDARD,
            ai_speed: AiSpeed::Randomized { seed },
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::seeded(DEFAULT_AI_SEED)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Vehicle {
    position: Position,
    facing: Direction,
    speed: f32,
}

impl Vehicle {
    fn shift(&mut self, offset: Offset, facing: Direction) -> (Position, Position) {
        let from = self.position;
        self.position = from.translated(offset);
        self.facing = facing;
        (from, self.position)
    }
}

/// Represents the authoritative Crossroads world state.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    geometry: JunctionGeometry,
    player: Vehicle,
    ai: Vehicle,
    ai_phase: AiPhase,
    stop_sign: StopSignPhase,
    outcome: Outcome,
    now: Timestamp,
}

impl World {
    /// Creates a world with both vehicles at their starting positions.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let ai_speed = match config.ai_speed {
            AiSpeed::Randomized { seed } => {
                ChaCha8Rng::seed_from_u64(seed).gen_range(AI_SPEED_RANGE)
            }
            AiSpeed::Fixed(speed) => speed,
        };
        debug!("AI vehicle speed set to {ai_speed:.3}");

        Self {
            geometry: config.geometry,
            player: Vehicle {
                position: PLAYER_START,
                facing: PLAYER_START_FACING,
                speed: PLAYER_SPEED,
            },
            ai: Vehicle {
                position: AI_START,
                facing: AiPhase::Approach.facing(),
                speed: ai_speed,
            },
            ai_phase: AiPhase::Approach,
            stop_sign: StopSignPhase::Inactive,
            outcome: Outcome::InProgress,
            now: Timestamp::ZERO,
        }
    }

    fn end_run(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        self.outcome = outcome;
        match outcome {
            Outcome::Won => {
                info!("player crossed the junction");
                out_events.push(Event::GameWon);
            }
            Outcome::Lost(reason) => {
                info!("player lost: {reason:?}");
                out_events.push(Event::GameLost { reason });
            }
            Outcome::InProgress => {}
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world.
///
/// Once the run is won or lost every command, ticks included, is answered with
/// [`Event::CommandIgnored`] and the world stays exactly as it was.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_terminal() {
        out_events.push(Event::CommandIgnored {
            reason: IgnoreReason::Frozen,
        });
        return;
    }

    match command {
        Command::Tick { now } => {
            world.now = now;
            out_events.push(Event::TimeAdvanced { now });
        }
        Command::MovePlayer { direction } => {
            let offset = Offset::toward(direction, world.player.speed);
            let (from, to) = world.player.shift(offset, direction);
            out_events.push(Event::PlayerMoved {
                from,
                to,
                facing: direction,
            });
        }
        Command::AdvanceAi { phase, offset } => {
            let current = world.ai_phase;
            if phase.ordinal() < current.ordinal() {
                out_events.push(Event::CommandIgnored {
                    reason: IgnoreReason::AiPhaseRegression,
                });
                return;
            }

            if phase != current {
                debug!("AI phase {current:?} -> {phase:?}");
                world.ai_phase = phase;
                out_events.push(Event::AiPhaseChanged {
                    from: current,
                    to: phase,
                });
            }

            let (from, to) = world.ai.shift(offset, phase.facing());
            if !offset.is_zero() {
                out_events.push(Event::AiAdvanced { from, to, phase });
            }
        }
        Command::UpdateStopSign { phase } => {
            let current = world.stop_sign;
            if current == phase {
                return;
            }
            if current.is_cleared() {
                out_events.push(Event::CommandIgnored {
                    reason: IgnoreReason::StopSignCleared,
                });
                return;
            }

            debug!("stop sign {current:?} -> {phase:?}");
            world.stop_sign = phase;
            out_events.push(Event::StopSignChanged {
                from: current,
                to: phase,
            });
        }
        Command::DeclareLoss { reason } => world.end_run(Outcome::Lost(reason), out_events),
        Command::DeclareWin => world.end_run(Outcome::Won, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Vehicle, World};
    use crossroads_core::{
        ActorKind, ActorSnapshot, AiSnapshot, JunctionGeometry, Outcome, SimulationSnapshot,
        StopSignPhase, StopSignSnapshot, Timestamp,
    };

    /// Provides read-only access to the junction layout.
    #[must_use]
    pub fn geometry(world: &World) -> &JunctionGeometry {
        &world.geometry
    }

    /// Clock reading of the last tick the world accepted.
    #[must_use]
    pub fn now(world: &World) -> Timestamp {
        world.now
    }

    /// Terminal state of the run.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.outcome
    }

    /// Captures the player's vehicle.
    #[must_use]
    pub fn player(world: &World) -> ActorSnapshot {
        actor(ActorKind::Player, &world.player)
    }

    /// Captures the AI vehicle together with its script phase.
    #[must_use]
    pub fn ai(world: &World) -> AiSnapshot {
        AiSnapshot {
            actor: actor(ActorKind::Ai, &world.ai),
            phase: world.ai_phase,
        }
    }

    /// Captures the stop-sign session, deriving the elapsed dwell from the last tick.
    #[must_use]
    pub fn stop_sign(world: &World) -> StopSignSnapshot {
        let elapsed = match world.stop_sign {
            StopSignPhase::Timing { since } => world.now.saturating_duration_since(since),
            StopSignPhase::Inactive | StopSignPhase::Cleared => Duration::ZERO,
        };
        StopSignSnapshot {
            phase: world.stop_sign,
            elapsed,
        }
    }

    /// Captures a consistent copy of the whole world for presentation.
    #[must_use]
    pub fn snapshot(world: &World) -> SimulationSnapshot {
        SimulationSnapshot {
            now: world.now,
            player: player(world),
            ai: ai(world),
            stop_sign: stop_sign(world),
            outcome: world.outcome,
        }
    }

    fn actor(kind: ActorKind, vehicle: &Vehicle) -> ActorSnapshot {
        ActorSnapshot {
            kind,
            position: vehicle.position,
            facing: vehicle.facing,
            speed: vehicle.speed,
        }
    }
}
