#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives the enemy behaviour machine.
//!
//! Every living enemy is evaluated once per tick in pool acquisition order.
//! Approaching enemies walk and turn toward the player and switch to
//! attacking once this frame's step lands inside the engagement radius; attacking enemies strike and fall
//! back to approaching once the player leaves the disengagement radius.

use std::time::Duration;

use tracing::trace;
use zombie_io_core::{
    planar_direction, planar_distance, AiState, CharacterKind, CharacterSnapshot, CharacterView,
    Command,
};

/// Configuration parameters required to construct the enemy AI system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    engage_radius: f32,
    disengage_radius: f32,
}

impl Config {
    /// Creates a new configuration from the engagement and disengagement radii.
    ///
    /// A disengagement radius below the engagement radius is raised to it.
    #[must_use]
    pub fn new(engage_radius: f32, disengage_radius: f32) -> Self {
        let engage_radius = engage_radius.max(0.0);
        Self {
            engage_radius,
            disengage_radius: disengage_radius.max(engage_radius),
        }
    }

    /// Distance at which approaching enemies start attacking.
    #[must_use]
    pub const fn engage_radius(&self) -> f32 {
        self.engage_radius
    }

    /// Distance beyond which attacking enemies resume approaching.
    #[must_use]
    pub const fn disengage_radius(&self) -> f32 {
        self.disengage_radius
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(3.0, 3.0)
    }
}

/// Enemy behaviour system that queues movement, attack, and state commands.
#[derive(Debug)]
pub struct EnemyAi {
    config: Config,
    scratch: Vec<Command>,
}

impl EnemyAi {
    /// Creates a new enemy AI system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scratch: Vec::new(),
        }
    }

    /// Emits the commands produced by one evaluation of every living enemy.
    pub fn handle(&mut self, dt: Duration, view: &CharacterView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for enemy in view.iter() {
            if enemy.kind != CharacterKind::Enemy || !enemy.is_alive() {
                continue;
            }
            let Some(state) = enemy.ai_state else {
                continue;
            };
            let Some(target) = enemy
                .resolve_target(view)
                .and_then(|target| view.get(target))
            else {
                continue;
            };

            match state {
                AiState::Idle => {}
                AiState::Approach => self.approach(enemy, target, dt),
                AiState::Attacking => self.attack(enemy, target),
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn approach(&mut self, enemy: &CharacterSnapshot, target: &CharacterSnapshot, dt: Duration) {
        let direction = planar_direction(enemy.position, target.position);
        self.scratch.push(Command::MoveCharacter {
            character: enemy.id,
            direction,
            dt,
        });
        self.scratch.push(Command::RotateCharacter {
            character: enemy.id,
            direction,
            dt,
        });

        let stepped = enemy.position + direction * enemy.speed * dt.as_secs_f32();
        let distance = planar_distance(stepped, target.position);
        if distance <= self.config.engage_radius {
            trace!(character = enemy.id.get(), distance, "enemy engaging");
            self.scratch.push(Command::SetAiState {
                character: enemy.id,
                state: AiState::Attacking,
            });
        }
    }

    fn attack(&mut self, enemy: &CharacterSnapshot, target: &CharacterSnapshot) {
        self.scratch.push(Command::Attack {
            attacker: enemy.id,
            target: target.id,
        });

        let distance = planar_distance(enemy.position, target.position);
        if distance > self.config.disengage_radius {
            trace!(character = enemy.id.get(), distance, "enemy disengaging");
            self.scratch.push(Command::SetAiState {
                character: enemy.id,
                state: AiState::Approach,
            });
        }
    }
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
