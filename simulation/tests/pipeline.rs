use std::time::Duration;

use crossroads_core::{
    AiPhase, Direction, LossReason, ManualClock, Outcome, Position, StopSignPhase,
};
use crossroads_simulation::{AiSpeed, Simulation, WorldConfig};

fn simulation(ai_speed: f32) -> (Simulation, ManualClock) {
    let clock = ManualClock::new();
    let config = WorldConfig {
        ai_speed: AiSpeed::Fixed(ai_speed),
        ..WorldConfig::default()
    };
    (Simulation::new(config, Box::new(clock.clone())), clock)
}

fn press(simulation: &mut Simulation, direction: Direction, times: usize) {
    for _ in 0..times {
        assert!(simulation.handle_key(direction), "{direction:?} press rejected");
    }
}

fn step_after(simulation: &mut Simulation, clock: &ManualClock, millis: u64) -> Outcome {
    clock.advance(Duration::from_millis(millis));
    simulation.step()
}

#[test]
fn dwelling_then_crossing_wins() {
    let (mut simulation, clock) = simulation(5.0);

    press(&mut simulation, Direction::Left, 28);
    assert_eq!(simulation.snapshot().player.position, Position::new(591.0, 210.0));

    for _ in 0..200 {
        assert_eq!(step_after(&mut simulation, &clock, 100), Outcome::InProgress);
    }
    let snapshot = simulation.snapshot();
    assert_eq!(snapshot.stop_sign.phase, StopSignPhase::Cleared);
    assert_eq!(snapshot.ai.phase, AiPhase::Ascend);

    press(&mut simulation, Direction::Left, 9);
    assert_eq!(step_after(&mut simulation, &clock, 16), Outcome::InProgress);

    for _ in 0..36 {
        assert!(simulation.handle_key(Direction::Down));
        assert_eq!(step_after(&mut simulation, &clock, 16), Outcome::InProgress);
    }
    assert!(simulation.handle_key(Direction::Down));
    assert_eq!(simulation.snapshot().player.position, Position::new(519.0, 506.0));

    assert_eq!(step_after(&mut simulation, &clock, 16), Outcome::Won);
    let won = simulation.snapshot();
    assert!(won.won());
    assert!(!won.lost());

    for direction in Direction::ALL {
        assert!(!simulation.handle_key(direction), "{direction:?} moved a won car");
    }
    for _ in 0..4 {
        assert_eq!(step_after(&mut simulation, &clock, 250), Outcome::Won);
    }
    assert_eq!(simulation.snapshot(), won);
}

#[test]
fn leaving_the_stop_sign_early_loses_on_the_exit_tick() {
    let (mut simulation, clock) = simulation(5.0);

    press(&mut simulation, Direction::Left, 28);
    let _ = step_after(&mut simulation, &clock, 16);
    assert!(simulation.snapshot().stop_sign.phase.is_active());

    assert_eq!(step_after(&mut simulation, &clock, 500), Outcome::InProgress);
    assert_eq!(
        simulation.snapshot().stop_sign.elapsed,
        Duration::from_millis(500)
    );

    press(&mut simulation, Direction::Left, 2);
    assert_eq!(simulation.outcome(), Outcome::InProgress);
    assert_eq!(
        step_after(&mut simulation, &clock, 16),
        Outcome::Lost(LossReason::RolledStopSign)
    );
    assert_eq!(
        simulation.snapshot().stop_sign.phase,
        StopSignPhase::Inactive
    );
}

#[test]
fn boundary_loss_prevents_a_win_in_the_same_tick() {
    let (mut simulation, clock) = simulation(5.0);

    press(&mut simulation, Direction::Left, 28);
    for _ in 0..25 {
        let _ = step_after(&mut simulation, &clock, 100);
    }
    assert!(simulation.snapshot().stop_sign.phase.is_cleared());

    // Straight down from the stop sign leaves the road before reaching the goal.
    press(&mut simulation, Direction::Down, 37);
    assert!(simulation.snapshot().player.position.y() >= 505.0);

    assert_eq!(
        step_after(&mut simulation, &clock, 16),
        Outcome::Lost(LossReason::LeftCorridor)
    );
    assert!(!simulation.snapshot().won());
}

#[test]
fn decided_run_stays_frozen() {
    let (mut simulation, clock) = simulation(5.0);

    press(&mut simulation, Direction::Left, 28);
    press(&mut simulation, Direction::Up, 2);
    assert_eq!(
        step_after(&mut simulation, &clock, 16),
        Outcome::Lost(LossReason::LeftCorridor)
    );
    let frozen = simulation.snapshot();

    for direction in Direction::ALL {
        assert!(!simulation.handle_key(direction));
    }
    for _ in 0..50 {
        assert_eq!(
            step_after(&mut simulation, &clock, 250),
            Outcome::Lost(LossReason::LeftCorridor)
        );
    }

    assert_eq!(simulation.snapshot(), frozen);
}

#[test]
fn stalled_frame_is_measured_in_wall_clock_time() {
    let (mut simulation, clock) = simulation(5.0);

    press(&mut simulation, Direction::Left, 28);
    let _ = step_after(&mut simulation, &clock, 16);
    let _ = step_after(&mut simulation, &clock, 2_500);

    assert!(simulation.snapshot().stop_sign.phase.is_cleared());
}
