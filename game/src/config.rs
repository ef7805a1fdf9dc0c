//! Tunable game parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zombie_io_core::{Archetype, CharacterKind};
use zombie_io_system_enemy_ai::Config as EnemyAiConfig;
use zombie_io_system_session::Config as SessionConfig;
use zombie_io_system_spawning::Config as SpawningConfig;
use zombie_io_world::WorldConfig;

/// Inconsistencies detected in a [`GameConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An archetype slot holds a template of another kind.
    #[error("the `{slot}` archetype must be of kind {expected:?}, found {found:?}")]
    ArchetypeKind {
        /// Name of the configuration field.
        slot: &'static str,
        /// Kind the slot requires.
        expected: CharacterKind,
        /// Kind found in the slot.
        found: CharacterKind,
    },
}

/// Every tunable of a match, loadable from JSON.
///
/// Missing fields fall back to their defaults, so a partial document only
/// overrides what it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of a match the player must survive to win.
    pub max_match_duration: Duration,
    /// Minimum time between two enemy spawns.
    pub spawn_interval: Duration,
    /// Smallest per-axis distance between the player and a spawned enemy.
    pub min_spawn_offset: f32,
    /// Largest per-axis distance between the player and a spawned enemy.
    pub max_spawn_offset: f32,
    /// Concurrent enemy cap at the start of a match.
    pub base_enemy_cap: usize,
    /// Cap increase applied every growth interval.
    pub enemy_cap_growth: usize,
    /// Time between two cap increases.
    pub enemy_cap_growth_interval: Duration,
    /// Distance at which enemies start attacking.
    pub engage_radius: f32,
    /// Distance beyond which attacking enemies resume approaching.
    pub disengage_radius: f32,
    /// Whether damage dealt to dead characters still reports a health change.
    pub report_posthumous_damage: bool,
    /// Seed of the spawn offset generator.
    pub rng_seed: u64,
    /// Template of the player character.
    pub player: Archetype,
    /// Template of enemy characters.
    pub enemy: Archetype,
}

impl GameConfig {
    /// Checks that each archetype slot holds a template of its own kind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (slot, archetype, expected) in [
            ("player", &self.player, CharacterKind::Player),
            ("enemy", &self.enemy, CharacterKind::Enemy),
        ] {
            if archetype.kind != expected {
                return Err(ConfigError::ArchetypeKind {
                    slot,
                    expected,
                    found: archetype.kind,
                });
            }
        }
        Ok(())
    }

    /// World configuration registering both archetypes.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig::new(
            vec![self.player.clone(), self.enemy.clone()],
            self.report_posthumous_damage,
        )
    }

    /// Spawn controller configuration.
    #[must_use]
    pub fn spawning_config(&self) -> SpawningConfig {
        SpawningConfig::new(
            self.spawn_interval,
            self.min_spawn_offset,
            self.max_spawn_offset,
            self.base_enemy_cap,
            self.enemy_cap_growth,
            self.enemy_cap_growth_interval,
            self.rng_seed,
        )
    }

    /// Enemy behaviour configuration.
    #[must_use]
    pub fn enemy_ai_config(&self) -> EnemyAiConfig {
        EnemyAiConfig::new(self.engage_radius, self.disengage_radius)
    }

    /// Session configuration.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.max_match_duration)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let spawning = SpawningConfig::default();
        let enemy_ai = EnemyAiConfig::default();
        Self {
            max_match_duration: SessionConfig::default().max_duration(),
            spawn_interval: spawning.spawn_interval(),
            min_spawn_offset: spawning.min_offset(),
            max_spawn_offset: spawning.max_offset(),
            base_enemy_cap: spawning.base_cap(),
            enemy_cap_growth: spawning.growth_per_step(),
            enemy_cap_growth_interval: spawning.growth_interval(),
            engage_radius: enemy_ai.engage_radius(),
            disengage_radius: enemy_ai.disengage_radius(),
            report_posthumous_damage: false,
            rng_seed: spawning.rng_seed(),
            player: Archetype::player(),
            enemy: Archetype::enemy(),
        }
    }
}
