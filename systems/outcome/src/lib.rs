#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that declares the win once the player crosses the goal line legally.

use crossroads_core::{
    latest_tick, ActorSnapshot, Command, Event, JunctionGeometry, StopSignPhase,
};

/// Win resolver evaluated last in each tick.
#[derive(Debug, Default)]
pub struct OutcomeResolver;

impl OutcomeResolver {
    /// Creates a new outcome resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::DeclareWin` when the player has reached the goal with the sign cleared.
    pub fn handle(
        &self,
        events: &[Event],
        geometry: &JunctionGeometry,
        player: &ActorSnapshot,
        stop_sign: StopSignPhase,
        out: &mut Vec<Command>,
    ) {
        if latest_tick(events).is_none() {
            return;
        }

        if has_won(geometry, player, stop_sign) {
            out.push(Command::DeclareWin);
        }
    }
}

/// Reports whether the player satisfies both win conditions.
#[must_use]
pub fn has_won(
    geometry: &JunctionGeometry,
    player: &ActorSnapshot,
    stop_sign: StopSignPhase,
) -> bool {
    stop_sign.is_cleared() && geometry.reached_goal(player.position.y())
}
