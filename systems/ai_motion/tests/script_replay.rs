use std::time::Duration;

use crossroads_core::{AiPhase, Clock, Command, Direction, Event, ManualClock, Position};
use crossroads_system_ai_motion::{AiMotion, Script};
use crossroads_world::{self as world, query, AiSpeed, World, WorldConfig};

const FRAME: Duration = Duration::from_millis(16);

fn fixed_world(speed: f32) -> World {
    World::new(WorldConfig {
        ai_speed: AiSpeed::Fixed(speed),
        ..WorldConfig::default()
    })
}

fn run_tick(world: &mut World, motion: &AiMotion, clock: &ManualClock) -> Vec<Event> {
    clock.advance(FRAME);
    let mut events = Vec::new();
    world::apply(world, Command::Tick { now: clock.now() }, &mut events);

    let mut commands = Vec::new();
    motion.handle(&events, &query::ai(world), &mut commands);

    let mut follow_up = Vec::new();
    for command in commands {
        world::apply(world, command, &mut follow_up);
    }
    follow_up
}

#[test]
fn route_visits_phases_in_order_and_never_returns() {
    let mut world = fixed_world(5.0);
    let motion = AiMotion::default();
    let clock = ManualClock::new();

    let mut visited = vec![query::ai(&world).phase.ordinal()];
    for _ in 0..400 {
        let _ = run_tick(&mut world, &motion, &clock);
        let ordinal = query::ai(&world).phase.ordinal();
        if visited.last() != Some(&ordinal) {
            visited.push(ordinal);
        }
    }

    assert_eq!(visited, vec![0, 1, 2, 3]);
    let ai = query::ai(&world);
    assert_eq!(ai.actor.facing, Direction::Up);
    assert!(ai.actor.position.y() < 210.0);
}

#[test]
fn ai_waits_more_than_the_script_pause_without_moving() {
    let mut world = fixed_world(8.0);
    let motion = AiMotion::default();
    let clock = ManualClock::new();

    while !matches!(query::ai(&world).phase, AiPhase::Paused { .. }) {
        let _ = run_tick(&mut world, &motion, &clock);
    }
    let AiPhase::Paused { since } = query::ai(&world).phase else {
        unreachable!("loop exits only once paused");
    };
    let parked = query::ai(&world).actor.position;
    assert_eq!(parked, Position::new(200.0, 210.0));

    let mut resumed_at = None;
    for _ in 0..200 {
        let events = run_tick(&mut world, &motion, &clock);
        if events.iter().any(|event| {
            matches!(
                event,
                Event::AiPhaseChanged {
                    to: AiPhase::ResumeApproach,
                    ..
                }
            )
        }) {
            resumed_at = Some(clock.now());
            break;
        }
        assert_eq!(query::ai(&world).actor.position, parked);
    }

    let resumed_at = resumed_at.expect("AI should resume driving");
    assert!(resumed_at.saturating_duration_since(since) > Script::STANDARD.pause());
}

#[test]
fn long_frame_completes_pause_by_wall_clock() {
    let mut world = fixed_world(10.0);
    let motion = AiMotion::default();
    let clock = ManualClock::new();

    for _ in 0..21 {
        let _ = run_tick(&mut world, &motion, &clock);
    }
    assert!(matches!(query::ai(&world).phase, AiPhase::Paused { .. }));

    // A single long frame carries the clock past the pause in one tick.
    clock.advance(Duration::from_millis(1_200));
    let _ = run_tick(&mut world, &motion, &clock);
    assert_eq!(query::ai(&world).phase, AiPhase::ResumeApproach);
}
