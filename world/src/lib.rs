#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Zombie IO.

mod pool;
mod units;

use glam::Vec3;
use tracing::{debug, error};
use zombie_io_core::{
    AiState, Archetype, CharacterId, CharacterKind, CharacterSnapshot, Command, Event, SpawnError,
    WELCOME_BANNER,
};

use crate::{
    pool::CharacterPool,
    units::{Attack, DamageOutcome, Health, Movement},
};

/// Archetype registry and damage reporting policy used by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    archetypes: Vec<Archetype>,
    report_posthumous_damage: bool,
}

impl WorldConfig {
    /// Creates a new configuration from the provided archetypes.
    ///
    /// When several archetypes share a kind the first one wins.
    #[must_use]
    pub fn new(archetypes: Vec<Archetype>, report_posthumous_damage: bool) -> Self {
        Self {
            archetypes,
            report_posthumous_damage,
        }
    }

    /// Archetypes registered with the world.
    #[must_use]
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Whether damage applied to dead characters still reports a health change.
    #[must_use]
    pub const fn report_posthumous_damage(&self) -> bool {
        self.report_posthumous_damage
    }

    /// Archetype registered for the provided kind, if any.
    #[must_use]
    pub fn archetype(&self, kind: CharacterKind) -> Option<&Archetype> {
        self.archetypes.iter().find(|archetype| archetype.kind == kind)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(vec![Archetype::player(), Archetype::enemy()], false)
    }
}

/// Represents the authoritative Zombie IO world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    pool: CharacterPool,
    player: Option<CharacterId>,
}

impl World {
    /// Creates a new world with the default archetypes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a new world using the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            config,
            pool: CharacterPool::new(),
            player: None,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world
                .pool
                .tick_active(|character| character.attack.tick(dt));
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnCharacter { kind, position } => {
            let Some(archetype) = world.config.archetype(kind) else {
                let reason = SpawnError::UnknownKind(kind);
                error!(kind = ?kind, %reason, "spawn request rejected");
                out_events.push(Event::SpawnRejected { kind, reason });
                return;
            };

            let character = world.pool.acquire(archetype, position);
            if kind == CharacterKind::Player {
                world.player = Some(character);
            }
            debug!(character = character.get(), kind = ?kind, "character spawned");
            out_events.push(Event::CharacterSpawned {
                character,
                kind,
                position: planar(position),
            });
        }
        Command::ReleaseCharacter { character } => {
            let Some(kind) = world.pool.release(character) else {
                debug!(character = character.get(), "release ignored for inactive character");
                return;
            };

            if world.player == Some(character) {
                world.player = None;
            }
            out_events.push(Event::CharacterReleased { character, kind });
        }
        Command::MoveCharacter {
            character,
            direction,
            dt,
        } => {
            let Some(mover) = world.pool.active_mut(character) else {
                debug!(character = character.get(), "move ignored for inactive character");
                return;
            };

            if let Some(step) = mover.movement.displacement(direction, dt) {
                let from = mover.position;
                mover.position = planar(from + step);
                out_events.push(Event::CharacterMoved {
                    character,
                    from,
                    to: mover.position,
                });
            }
        }
        Command::RotateCharacter {
            character,
            direction,
            dt,
        } => match world.pool.active_mut(character) {
            Some(turner) => turner.movement.rotate(direction, dt),
            None => debug!(character = character.get(), "rotate ignored for inactive character"),
        },
        Command::SetCharacterSpeed { character, speed } => {
            match world.pool.active_mut(character) {
                Some(target) => target.movement.set_speed(speed),
                None => debug!(character = character.get(), "speed change ignored"),
            }
        }
        Command::Attack { attacker, target } => {
            let target_alive = world
                .pool
                .active(target)
                .map_or(false, |character| character.health.is_alive());
            if !target_alive {
                debug!(
                    attacker = attacker.get(),
                    target = target.get(),
                    "attack ignored for absent or dead target"
                );
                return;
            }

            let Some(striker) = world.pool.active_mut(attacker) else {
                debug!(attacker = attacker.get(), "attack ignored for inactive attacker");
                return;
            };
            if !striker.health.is_alive() || !striker.attack.is_ready() {
                return;
            }

            let damage = striker.attack.damage();
            striker.attack.trigger();
            out_events.push(Event::AttackLanded {
                attacker,
                target,
                damage,
            });
            inflict_damage(world, target, damage, out_events);
        }
        Command::DamageCharacter { character, amount } => {
            inflict_damage(world, character, amount, out_events);
        }
        Command::SetAiState { character, state } => {
            let Some(enemy) = world.pool.active_mut(character) else {
                debug!(character = character.get(), "state change ignored for inactive character");
                return;
            };
            let Some(from) = enemy.ai_state else {
                debug!(character = character.get(), "state change ignored for player");
                return;
            };

            if from != state {
                enemy.ai_state = Some(state);
                out_events.push(Event::AiStateChanged {
                    character,
                    from,
                    to: state,
                });
            }
        }
    }
}

fn inflict_damage(
    world: &mut World,
    character: CharacterId,
    amount: u32,
    out_events: &mut Vec<Event>,
) {
    let report_posthumous = world.config.report_posthumous_damage();
    let Some(victim) = world.pool.active_mut(character) else {
        debug!(character = character.get(), "damage ignored for inactive character");
        return;
    };

    let outcome = victim.health.apply_damage(amount);
    if outcome == DamageOutcome::AlreadyDead && !report_posthumous {
        return;
    }

    out_events.push(Event::HealthChanged {
        character,
        health: victim.health.current(),
        max_health: victim.health.max(),
    });

    if outcome == DamageOutcome::Killed {
        debug!(character = character.get(), kind = ?victim.kind, "character died");
        out_events.push(Event::CharacterDied {
            character,
            kind: victim.kind,
            score_cost: victim.score_cost,
        });
    }
}

fn planar(position: Vec3) -> Vec3 {
    Vec3::new(position.x, 0.0, position.z)
}

/// Pooled character aggregate owning its behaviour units.
#[derive(Clone, Debug)]
pub(crate) struct Character {
    id: CharacterId,
    kind: CharacterKind,
    position: Vec3,
    health: Health,
    attack: Attack,
    movement: Movement,
    ai_state: Option<AiState>,
    score_cost: u32,
}

impl Character {
    fn from_archetype(id: CharacterId, archetype: &Archetype) -> Self {
        let mut character = Self {
            id,
            kind: archetype.kind,
            position: Vec3::ZERO,
            health: Health::new(archetype.max_health, archetype.damage_taken_multiplier),
            attack: Attack::new(archetype.attack_damage, archetype.attack_cooldown),
            movement: Movement::new(archetype.speed),
            ai_state: None,
            score_cost: archetype.score_cost,
        };
        character.initialize(archetype, Vec3::ZERO);
        character
    }

    /// Restores every unit to the archetype's starting values.
    fn initialize(&mut self, archetype: &Archetype, position: Vec3) {
        self.position = planar(position);
        self.health = Health::new(archetype.max_health, archetype.damage_taken_multiplier);
        self.attack = Attack::new(archetype.attack_damage, archetype.attack_cooldown);
        self.movement = Movement::new(archetype.speed);
        self.ai_state = match archetype.kind {
            CharacterKind::Player => None,
            CharacterKind::Enemy => Some(archetype.initial_ai_state),
        };
        self.score_cost = archetype.score_cost;
    }

    fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            yaw_degrees: self.movement.yaw_degrees(),
            health: self.health.current(),
            max_health: self.health.max(),
            ai_state: self.ai_state,
            attack_ready: self.attack.is_ready(),
            speed: self.movement.speed(),
            score_cost: self.score_cost,
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use zombie_io_core::{Archetype, CharacterId, CharacterKind, CharacterSnapshot, CharacterView};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of every active character in acquisition order.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        let snapshots = world
            .pool
            .iter_active()
            .map(super::Character::snapshot)
            .collect();
        CharacterView::from_snapshots(snapshots, world.player)
    }

    /// Snapshot of a single active character.
    #[must_use]
    pub fn character(world: &World, character: CharacterId) -> Option<CharacterSnapshot> {
        world.pool.active(character).map(super::Character::snapshot)
    }

    /// Identifier of the current player, if one is active.
    #[must_use]
    pub fn player(world: &World) -> Option<CharacterId> {
        world.player
    }

    /// Archetype registered for the provided kind.
    #[must_use]
    pub fn archetype(world: &World, kind: CharacterKind) -> Option<&Archetype> {
        world.config.archetype(kind)
    }

    /// Identifiers of every active character in acquisition order.
    #[must_use]
    pub fn active_characters(world: &World) -> &[CharacterId] {
        world.pool.active_ids()
    }

    /// Reports whether the character is currently handed out by the pool.
    #[must_use]
    pub fn is_active(world: &World, character: CharacterId) -> bool {
        world.pool.is_active(character)
    }

    /// Number of released characters of the kind waiting for reuse.
    #[must_use]
    pub fn disabled_count(world: &World, kind: CharacterKind) -> usize {
        world.pool.disabled_len(kind)
    }

    /// Total number of slots the pool has ever constructed.
    #[must_use]
    pub fn pooled_count(world: &World) -> usize {
        world.pool.slot_count()
    }

    /// Remaining attack cooldown of an active character.
    #[must_use]
    pub fn attack_cooldown(world: &World, character: CharacterId) -> Option<Duration> {
        world
            .pool
            .active(character)
            .map(|active| active.attack.remaining())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn spawn(world: &mut World, kind: CharacterKind, position: Vec3) -> CharacterId {
        let mut events = Vec::new();
        apply(world, Command::SpawnCharacter { kind, position }, &mut events);
        match events.as_slice() {
            [Event::CharacterSpawned { character, .. }] => *character,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    #[test]
    fn spawned_positions_are_projected_onto_the_ground() {
        let mut world = World::new();
        let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::new(1.0, 4.0, 2.0));
        let snapshot = query::character(&world, enemy).expect("enemy active");
        assert_eq!(snapshot.position, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(snapshot.ai_state, Some(AiState::Approach));
    }

    #[test]
    fn player_reference_follows_spawn_and_release() {
        let mut world = World::new();
        let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
        assert_eq!(query::player(&world), Some(player));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ReleaseCharacter { character: player },
            &mut events,
        );
        assert_eq!(query::player(&world), None);
        assert!(query::character_view(&world).player().is_none());
    }

    #[test]
    fn posthumous_damage_is_silent_by_default() {
        let mut world = World::new();
        let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::ZERO);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DamageCharacter {
                character: enemy,
                amount: 1,
            },
            &mut events,
        );
        assert_eq!(events.len(), 2);

        events.clear();
        apply(
            &mut world,
            Command::DamageCharacter {
                character: enemy,
                amount: 1,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn posthumous_damage_can_be_reported() {
        let mut world = World::with_config(WorldConfig::new(vec![Archetype::enemy()], true));
        let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::ZERO);
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::DamageCharacter {
                    character: enemy,
                    amount: 1,
                },
                &mut events,
            );
        }

        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::CharacterDied { .. }))
            .count();
        let health_changes = events
            .iter()
            .filter(|event| matches!(event, Event::HealthChanged { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(health_changes, 2);
    }

    #[test]
    fn tick_only_advances_cooldowns() {
        let mut world = World::new();
        let player = spawn(&mut world, CharacterKind::Player, Vec3::ZERO);
        let enemy = spawn(&mut world, CharacterKind::Enemy, Vec3::X);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Attack {
                attacker: enemy,
                target: player,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );

        assert_eq!(
            query::attack_cooldown(&world, enemy),
            Some(Duration::from_millis(750))
        );
        assert_eq!(
            events.last(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(250)
            })
        );
    }
}
