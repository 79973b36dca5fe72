#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives the AI vehicle along its scripted route.
//!
//! The route drives right to a first stopping point, waits there, drives right
//! again to a turning point, and then climbs up the screen forever. Decisions
//! depend only on the AI's position, its current phase, and the tick's clock
//! reading; the player is never consulted.

use std::time::Duration;

use crossroads_core::{
    latest_tick, AiPhase, AiSnapshot, Command, Direction, Event, Offset, Timestamp,
};

/// Waypoints and timing of the AI route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Script {
    first_stop_x: f32,
    pause: Duration,
    turn_x: f32,
}

impl Script {
    /// The route used by the standard junction.
    pub const STANDARD: Script = Script::new(200.0, Duration::from_millis(1_000), 440.0);

    /// Creates a route from its waypoints and the length of the wait.
    #[must_use]
    pub const fn new(first_stop_x: f32, pause: Duration, turn_x: f32) -> Self {
        Self {
            first_stop_x,
            pause,
            turn_x,
        }
    }

    /// x at which the AI stops for the first time.
    #[must_use]
    pub const fn first_stop_x(&self) -> f32 {
        self.first_stop_x
    }

    /// How long the AI must have waited before it drives on.
    #[must_use]
    pub const fn pause(&self) -> Duration {
        self.pause
    }

    /// x at which the AI turns upward.
    #[must_use]
    pub const fn turn_x(&self) -> f32 {
        self.turn_x
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// AI motion system that emits one `Command::AdvanceAi` per tick when the AI acts.
#[derive(Debug, Default)]
pub struct AiMotion {
    script: Script,
}

impl AiMotion {
    /// Creates a motion system following the provided route.
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self { script }
    }

    /// Consumes tick events and the AI snapshot to emit the next movement.
    pub fn handle(&self, events: &[Event], ai: &AiSnapshot, out: &mut Vec<Command>) {
        let Some(now) = latest_tick(events) else {
            return;
        };

        let (phase, offset) = self.next_motion(ai, now);
        if phase == ai.phase && offset.is_zero() {
            return;
        }

        out.push(Command::AdvanceAi { phase, offset });
    }

    fn next_motion(&self, ai: &AiSnapshot, now: Timestamp) -> (AiPhase, Offset) {
        let x = ai.actor.position.x();
        let speed = ai.actor.speed;

        match ai.phase {
            AiPhase::Approach => {
                if x < self.script.first_stop_x {
                    (AiPhase::Approach, Offset::toward(Direction::Right, speed))
                } else {
                    (AiPhase::Paused { since: now }, Offset::ZERO)
                }
            }
            AiPhase::Paused { since } => {
                if now.saturating_duration_since(since) > self.script.pause {
                    self.resume(x, speed)
                } else {
                    (ai.phase, Offset::ZERO)
                }
            }
            AiPhase::ResumeApproach => self.resume(x, speed),
            AiPhase::Ascend => (AiPhase::Ascend, Offset::toward(Direction::Up, speed)),
        }
    }

    fn resume(&self, x: f32, speed: f32) -> (AiPhase, Offset) {
        if x < self.script.turn_x {
            (
                AiPhase::ResumeApproach,
                Offset::toward(Direction::Right, speed),
            )
        } else {
            (AiPhase::Ascend, Offset::toward(Direction::Up, speed))
        }
    }
}
