use std::time::Duration;

use glam::Vec3;
use zombie_io_core::{
    AiState, Archetype, CharacterId, CharacterKind, Command, Event, SpawnError,
};
use zombie_io_world::{self as world, query, World, WorldConfig};

fn spawn(world: &mut World, kind: CharacterKind, position: Vec3) -> CharacterId {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnCharacter { kind, position }, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::CharacterSpawned { character, .. } => Some(*character),
            _ => None,
        })
        .expect("spawn should succeed")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

#[test]
fn released_enemies_are_reacquired_with_fresh_state() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::new(2.0, 0.0, 0.0));

    let _ = run(
        &mut world,
        Command::Attack {
            attacker: enemy,
            target: player,
        },
    );
    let _ = run(
        &mut world,
        Command::SetAiState {
            character: enemy,
            state: AiState::Attacking,
        },
    );
    let _ = run(
        &mut world,
        Command::DamageCharacter {
            character: enemy,
            amount: 5,
        },
    );
    let released = run(&mut world, Command::ReleaseCharacter { character: enemy });
    assert_eq!(
        released,
        vec![Event::CharacterReleased {
            character: enemy,
            kind: CharacterKind::Enemy,
        }]
    );
    assert_eq!(query::disabled_count(&world, CharacterKind::Enemy), 1);

    let reused = spawn(&mut world, CharacterKind::Enemy, Vec3::new(-4.0, 0.0, 1.0));
    assert_eq!(reused, enemy, "disabled slot should be reused");
    assert_eq!(query::pooled_count(&world), 2);

    let snapshot = query::character(&world, reused).expect("reused enemy is active");
    assert_eq!(snapshot.health, 10);
    assert!(snapshot.attack_ready);
    assert_eq!(snapshot.ai_state, Some(AiState::Approach));
    assert_eq!(snapshot.position, Vec3::new(-4.0, 0.0, 1.0));
}

#[test]
fn acquire_never_returns_a_character_active_under_another_kind() {
    let mut world = World::new();
    let mut handed_out = Vec::new();
    for round in 0..4 {
        let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::ZERO);
        let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
        assert_ne!(enemy, player);
        handed_out.push((enemy, player));

        if round % 2 == 0 {
            let _ = run(&mut world, Command::ReleaseCharacter { character: enemy });
            let _ = run(&mut world, Command::ReleaseCharacter { character: player });
        }
    }

    let view = query::character_view(&world);
    for snapshot in view.iter() {
        let same_id = view.iter().filter(|other| other.id == snapshot.id).count();
        assert_eq!(same_id, 1, "id {:?} active twice", snapshot.id);
    }
    for (enemy, player) in handed_out {
        if let Some(snapshot) = view.get(enemy) {
            assert_eq!(snapshot.kind, CharacterKind::Enemy);
        }
        if let Some(snapshot) = view.get(player) {
            assert_eq!(snapshot.kind, CharacterKind::Player);
        }
    }
}

#[test]
fn unknown_kind_is_rejected() {
    let mut world = World::with_config(WorldConfig::new(vec![Archetype::player()], false));
    let events = run(
        &mut world,
        Command::SpawnCharacter {
            kind: CharacterKind::Enemy,
            position: Vec3::ZERO,
        },
    );

    assert_eq!(
        events,
        vec![Event::SpawnRejected {
            kind: CharacterKind::Enemy,
            reason: SpawnError::UnknownKind(CharacterKind::Enemy),
        }]
    );
    assert!(query::active_characters(&world).is_empty());
}

#[test]
fn attack_lands_once_per_cooldown_window() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::X);
    let frame = Duration::from_millis(100);

    let mut landed = 0;
    for _ in 0..10 {
        let events = run(
            &mut world,
            Command::Attack {
                attacker: enemy,
                target: player,
            },
        );
        landed += events
            .iter()
            .filter(|event| matches!(event, Event::AttackLanded { .. }))
            .count();
        let _ = run(&mut world, Command::Tick { dt: frame });
    }
    assert_eq!(landed, 1, "one hit per second of frames");

    let events = run(
        &mut world,
        Command::Attack {
            attacker: enemy,
            target: player,
        },
    );
    assert!(events.contains(&Event::AttackLanded {
        attacker: enemy,
        target: player,
        damage: 5,
    }));
    assert!(events.contains(&Event::HealthChanged {
        character: player,
        health: 40,
        max_health: 50,
    }));
}

#[test]
fn player_hit_kills_enemy_exactly_once() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::X);

    let events = run(
        &mut world,
        Command::Attack {
            attacker: player,
            target: enemy,
        },
    );
    assert_eq!(
        events,
        vec![
            Event::AttackLanded {
                attacker: player,
                target: enemy,
                damage: 5,
            },
            Event::HealthChanged {
                character: enemy,
                health: 0,
                max_health: 10,
            },
            Event::CharacterDied {
                character: enemy,
                kind: CharacterKind::Enemy,
                score_cost: 10,
            },
        ]
    );

    for _ in 0..20 {
        let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(100) });
    }
    let again = run(
        &mut world,
        Command::Attack {
            attacker: player,
            target: enemy,
        },
    );
    assert!(again.is_empty(), "dead targets cannot be attacked");
}

#[test]
fn dead_attackers_cannot_strike() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::X);
    let _ = run(
        &mut world,
        Command::DamageCharacter {
            character: enemy,
            amount: 1,
        },
    );

    let events = run(
        &mut world,
        Command::Attack {
            attacker: enemy,
            target: player,
        },
    );
    assert!(events.is_empty());
}

#[test]
fn commands_for_inactive_characters_are_ignored() {
    let mut world = World::new();
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::ZERO);
    let _ = run(&mut world, Command::ReleaseCharacter { character: enemy });

    let commands = vec![
        Command::ReleaseCharacter { character: enemy },
        Command::MoveCharacter {
            character: enemy,
            direction: Vec3::X,
            dt: Duration::from_secs(1),
        },
        Command::RotateCharacter {
            character: enemy,
            direction: Vec3::X,
            dt: Duration::from_secs(1),
        },
        Command::SetCharacterSpeed {
            character: enemy,
            speed: 2.0,
        },
        Command::DamageCharacter {
            character: enemy,
            amount: 1,
        },
        Command::SetAiState {
            character: enemy,
            state: AiState::Idle,
        },
    ];

    for command in commands {
        assert!(run(&mut world, command).is_empty());
    }
    assert_eq!(query::disabled_count(&world, CharacterKind::Enemy), 1);
}

#[test]
fn movement_follows_direction_and_speed() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);

    let events = run(
        &mut world,
        Command::MoveCharacter {
            character: player,
            direction: Vec3::Z,
            dt: Duration::from_millis(200),
        },
    );
    match events.as_slice() {
        [Event::CharacterMoved { from, to, .. }] => {
            assert_eq!(*from, Vec3::ZERO);
            assert!((*to - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        }
        other => panic!("unexpected move events: {other:?}"),
    }

    let _ = run(
        &mut world,
        Command::SetCharacterSpeed {
            character: player,
            speed: -1.0,
        },
    );
    let still = run(
        &mut world,
        Command::MoveCharacter {
            character: player,
            direction: Vec3::Z,
            dt: Duration::from_millis(200),
        },
    );
    match still.as_slice() {
        [Event::CharacterMoved { from, to, .. }] => assert_eq!(from, to),
        other => panic!("unexpected move events: {other:?}"),
    }

    assert!(run(
        &mut world,
        Command::MoveCharacter {
            character: player,
            direction: Vec3::ZERO,
            dt: Duration::from_millis(200),
        },
    )
    .is_empty());
}

#[test]
fn ai_state_changes_are_edge_triggered() {
    let mut world = World::new();
    let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
    let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::X);

    let first = run(
        &mut world,
        Command::SetAiState {
            character: enemy,
            state: AiState::Attacking,
        },
    );
    assert_eq!(
        first,
        vec![Event::AiStateChanged {
            character: enemy,
            from: AiState::Approach,
            to: AiState::Attacking,
        }]
    );

    let repeated = run(
        &mut world,
        Command::SetAiState {
            character: enemy,
            state: AiState::Attacking,
        },
    );
    assert!(repeated.is_empty());

    let player_change = run(
        &mut world,
        Command::SetAiState {
            character: player,
            state: AiState::Attacking,
        },
    );
    assert!(player_change.is_empty());
    assert_eq!(
        query::character(&world, player).and_then(|snapshot| snapshot.ai_state),
        None
    );
}
