use std::time::Duration;

use crossroads_core::{Direction, ManualClock};
use crossroads_simulation::{Simulation, WorldConfig};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Action {
    Key(Direction),
    Step(u64),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => prop::sample::select(Direction::ALL.to_vec()).prop_map(Action::Key),
        2 => (0u64..400).prop_map(Action::Step),
    ]
}

proptest! {
    #[test]
    fn run_invariants_hold_for_any_input(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..400),
    ) {
        let clock = ManualClock::new();
        let mut simulation = Simulation::new(WorldConfig::seeded(seed), Box::new(clock.clone()));
        let mut previous = simulation.snapshot();

        for action in actions {
            match action {
                Action::Key(direction) => {
                    let _ = simulation.handle_key(direction);
                }
                Action::Step(millis) => {
                    clock.advance(Duration::from_millis(millis));
                    let _ = simulation.step();
                }
            }

            let current = simulation.snapshot();
            prop_assert!(!(current.won() && current.lost()));
            prop_assert!(current.ai.phase.ordinal() >= previous.ai.phase.ordinal());
            if previous.stop_sign.phase.is_cleared() {
                prop_assert!(current.stop_sign.phase.is_cleared());
            }
            if previous.outcome.is_terminal() {
                prop_assert_eq!(current, previous);
            }
            prop_assert_eq!(
                current.player.bounding_box().size(),
                current.player.facing.box_size()
            );
            prop_assert_eq!(
                current.ai.actor.bounding_box().size(),
                current.ai.actor.facing.box_size()
            );

            previous = current;
        }
    }
}
