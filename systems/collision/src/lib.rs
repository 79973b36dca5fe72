#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that ends the run when the player leaves the road or hits the AI.

use crossroads_core::{
    latest_tick, ActorSnapshot, Command, Event, JunctionGeometry, LossReason,
};

/// Collision and boundary checker evaluated once per tick.
#[derive(Debug, Default)]
pub struct Collision;

impl Collision {
    /// Creates a new collision system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::DeclareLoss` when the tick finds the player off-road or overlapping the AI.
    pub fn handle(
        &self,
        events: &[Event],
        geometry: &JunctionGeometry,
        player: &ActorSnapshot,
        ai: &ActorSnapshot,
        out: &mut Vec<Command>,
    ) {
        if latest_tick(events).is_none() {
            return;
        }

        if let Some(reason) = detect(geometry, player, ai) {
            out.push(Command::DeclareLoss { reason });
        }
    }
}

/// Returns the first rule the current positions break, checking the corridor first.
#[must_use]
pub fn detect(
    geometry: &JunctionGeometry,
    player: &ActorSnapshot,
    ai: &ActorSnapshot,
) -> Option<LossReason> {
    if geometry.violates_corridor(player.position) {
        return Some(LossReason::LeftCorridor);
    }

    if player.bounding_box().overlaps(&ai.bounding_box()) {
        return Some(LossReason::Collided);
    }

    None
}
