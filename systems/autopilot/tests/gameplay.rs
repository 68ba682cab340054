use std::collections::HashSet;

use snake_autopilot_core::{CalibrationSource, Command, Event, GameSnapshot, GameStatus, Offset};
use snake_autopilot_system_autopilot::{Autopilot, AutopilotConfig};
use snake_autopilot_world::{self as world, query, CalibrationMode, GameConfig, World};

fn seeded_world(size: u32, seed: u64) -> World {
    World::new(
        GameConfig::new(size, size)
            .expect("valid grid")
            .with_seed(seed),
    )
}

/// Runs one autopilot decision followed by a tick, returning the emitted events.
fn step(world: &mut World, autopilot: &mut Autopilot) -> Vec<Event> {
    let mut commands = Vec::new();
    autopilot.handle(&query::snapshot(world), &mut commands);
    commands.push(Command::Tick);

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn assert_well_formed(snapshot: &GameSnapshot) {
    assert!(snapshot.grid.contains(snapshot.food), "{:?} left the grid", snapshot.food);
    assert!(!snapshot.body.contains(&snapshot.food), "food spawned under the snake");
    let mut seen = HashSet::new();
    for segment in &snapshot.body {
        assert!(snapshot.grid.contains(*segment), "{segment:?} left the grid");
        assert!(seen.insert(*segment), "{segment:?} overlaps the body");
    }
    for pair in snapshot.body.windows(2) {
        assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
    }
}

#[test]
fn autopilot_game_keeps_invariants_and_scores() {
    let mut world = seeded_world(15, 42);
    let mut autopilot = Autopilot::default();

    for _ in 0..2_000 {
        let before = query::snapshot(&world);
        let events = step(&mut world, &mut autopilot);
        let after = query::snapshot(&world);

        if after.status == GameStatus::GameOver {
            assert!(events.iter().any(|event| matches!(
                event,
                Event::SnakeCollided { .. } | Event::BoardFilled
            )));
            break;
        }

        assert_well_formed(&after);
        assert!(!after.direction.reverses(before.direction));
        if after.score > before.score {
            assert_eq!(after.length(), before.length() + 1);
        } else {
            assert_eq!(after.length(), before.length());
        }
        assert_eq!(after.length(), after.score as usize + 1);
    }

    assert!(query::score(&world) >= 3, "autopilot only scored {}", query::score(&world));
    let stats = autopilot.stats();
    assert!(stats.decisions > 0);
    assert!(stats.path_decisions > 0);
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed: u64| {
        let mut world = seeded_world(12, seed);
        let mut autopilot = Autopilot::default();
        let mut log = Vec::new();
        for _ in 0..500 {
            log.extend(step(&mut world, &mut autopilot));
            if query::status(&world) == GameStatus::GameOver {
                break;
            }
        }
        (query::snapshot(&world), log)
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn length_tuning_commands_reach_the_ledger() {
    let mut world = World::new(
        GameConfig::new(20, 20)
            .expect("valid grid")
            .with_seed(3)
            .with_calibration(CalibrationMode::Faithful),
    );
    let mut autopilot = Autopilot::new(AutopilotConfig::new().with_length_tuning(true));

    let mut snapshot = query::snapshot(&world);
    let head = snapshot.head().expect("snake has a head");
    snapshot.body = (0..4).map(|offset| head.offset(Offset::new(-offset, 0))).collect();

    let mut commands = Vec::new();
    autopilot.handle(&snapshot, &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let sources: Vec<_> = query::calibration(&world)
        .records()
        .iter()
        .map(|record| record.source)
        .collect();
    assert_eq!(
        sources,
        vec![
            CalibrationSource::Engine,
            CalibrationSource::Autopilot,
            CalibrationSource::LengthTuning,
        ]
    );
    assert_eq!(query::calibration(&world).accumulated(), Offset::new(1, 0));
    assert_eq!(query::collision_offset(&world), Offset::new(1, 0));
}
