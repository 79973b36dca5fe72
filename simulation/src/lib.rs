#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for Crossroads.
//!
//! [`Simulation`] owns the authoritative world together with every pure
//! system and the injected [`Clock`]. Each [`Simulation::step`] reads the clock
//! once, records the tick, and then runs the systems in a fixed order: AI
//! motion, collision, stop sign, outcome. The commands of one stage are
//! applied before the next stage looks at the world, and the step ends early
//! as soon as the run is decided.

mod scheduler;

use crossroads_core::{Clock, Command, Direction, Event, Outcome, SimulationSnapshot};
use crossroads_system_ai_motion::{AiMotion, Script};
use crossroads_system_collision::Collision;
use crossroads_system_input::InputHandler;
use crossroads_system_outcome::OutcomeResolver;
use crossroads_system_stop_sign::StopSign;
use crossroads_world::{self as world, query, World};
use log::trace;

pub use crossroads_world::{AiSpeed, WorldConfig};
pub use scheduler::{TickScheduler, MAX_TICKS_PER_FRAME, TICK_INTERVAL};

/// Stages of a tick in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    AiMotion,
    Collision,
    StopSign,
    Outcome,
}

impl Stage {
    const ORDER: [Stage; 4] = [
        Stage::AiMotion,
        Stage::Collision,
        Stage::StopSign,
        Stage::Outcome,
    ];
}

/// Owns the world, the systems that drive it, and the clock that times it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    clock: Box<dyn Clock>,
    ai_motion: AiMotion,
    collision: Collision,
    stop_sign: StopSign,
    outcome: OutcomeResolver,
    input: InputHandler,
}

impl Simulation {
    /// Creates a simulation at the start of a run.
    #[must_use]
    pub fn new(config: WorldConfig, clock: Box<dyn Clock>) -> Self {
        Self::with_script(config, Script::STANDARD, clock)
    }

    /// Creates a simulation whose AI follows the provided route.
    #[must_use]
    pub fn with_script(config: WorldConfig, script: Script, clock: Box<dyn Clock>) -> Self {
        Self {
            world: World::new(config),
            clock,
            ai_motion: AiMotion::new(script),
            collision: Collision::new(),
            stop_sign: StopSign::new(),
            outcome: OutcomeResolver::new(),
            input: InputHandler::new(),
        }
    }

    /// Advances the run by one tick using the current clock reading.
    ///
    /// Safe to call at any cadence: every timing decision uses the clock, not
    /// the number of calls. Once the run is decided this changes nothing.
    pub fn step(&mut self) -> Outcome {
        let now = self.clock.now();
        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { now }, &mut tick_events);
        log_events(&tick_events);

        for stage in Stage::ORDER {
            if self.outcome().is_terminal() {
                break;
            }

            let mut commands = Vec::new();
            self.run_stage(stage, &tick_events, &mut commands);
            let _ = self.execute(commands);
        }

        self.outcome()
    }

    /// Applies one directional key press immediately.
    ///
    /// Returns whether the player moved. Presses that would leave the playfield,
    /// and every press after the run is decided, are dropped.
    pub fn handle_key(&mut self, direction: Direction) -> bool {
        let mut commands = Vec::new();
        self.input.handle(
            direction,
            query::geometry(&self.world),
            &query::player(&self.world),
            &mut commands,
        );

        let events = self.execute(commands);
        events
            .iter()
            .any(|event| matches!(event, Event::PlayerMoved { .. }))
    }

    /// Captures a consistent copy of the run for presentation.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        query::snapshot(&self.world)
    }

    /// Terminal state of the run.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        query::outcome(&self.world)
    }

    fn run_stage(&self, stage: Stage, events: &[Event], out: &mut Vec<Command>) {
        let world = &self.world;
        match stage {
            Stage::AiMotion => self.ai_motion.handle(events, &query::ai(world), out),
            Stage::Collision => self.collision.handle(
                events,
                query::geometry(world),
                &query::player(world),
                &query::ai(world).actor,
                out,
            ),
            Stage::StopSign => self.stop_sign.handle(
                events,
                query::geometry(world),
                &query::player(world),
                &query::stop_sign(world),
                out,
            ),
            Stage::Outcome => self.outcome.handle(
                events,
                query::geometry(world),
                &query::player(world),
                query::stop_sign(world).phase,
                out,
            ),
        }
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        log_events(&events);
        events
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        trace!("{event:?}");
    }
}
