#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates discrete key presses into player moves.
//!
//! A press moves the player one speed increment when the resulting position
//! stays inside the playfield clamp. Rejected presses produce nothing: no
//! displacement, no facing change, no error. Collision and stop-sign rules are
//! not consulted here; they run on the next tick.

use crossroads_core::{ActorSnapshot, Command, Direction, JunctionGeometry, Offset};

/// Stateless key-press handler.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::MovePlayer` when the press keeps the player inside the clamp.
    pub fn handle(
        &self,
        direction: Direction,
        geometry: &JunctionGeometry,
        player: &ActorSnapshot,
        out: &mut Vec<Command>,
    ) {
        if accepts(direction, geometry, player) {
            out.push(Command::MovePlayer { direction });
        }
    }
}

/// Reports whether a press in `direction` would keep the player inside the clamp.
#[must_use]
pub fn accepts(
    direction: Direction,
    geometry: &JunctionGeometry,
    player: &ActorSnapshot,
) -> bool {
    let target = player
        .position
        .translated(Offset::toward(direction, player.speed));
    geometry.playfield.contains(target)
}
