#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};
use zombie_io_core::{CharacterKind, CharacterView, Command};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    min_offset: f32,
    max_offset: f32,
    base_cap: usize,
    growth_per_step: usize,
    growth_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, cap growth, and seed.
    ///
    /// Offsets are magnitudes; a reversed band is reordered.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spawn_interval: Duration,
        min_offset: f32,
        max_offset: f32,
        base_cap: usize,
        growth_per_step: usize,
        growth_interval: Duration,
        rng_seed: u64,
    ) -> Self {
        let min_offset = min_offset.abs();
        let max_offset = max_offset.abs();
        Self {
            spawn_interval,
            min_offset: min_offset.min(max_offset),
            max_offset: min_offset.max(max_offset),
            base_cap,
            growth_per_step,
            growth_interval,
            rng_seed,
        }
    }

    /// Minimum time between two spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Smallest per-axis distance from the player to a spawned enemy.
    #[must_use]
    pub const fn min_offset(&self) -> f32 {
        self.min_offset
    }

    /// Largest per-axis distance from the player to a spawned enemy.
    #[must_use]
    pub const fn max_offset(&self) -> f32 {
        self.max_offset
    }

    /// Concurrent enemy cap at the start of a match.
    #[must_use]
    pub const fn base_cap(&self) -> usize {
        self.base_cap
    }

    /// Cap increase applied every growth interval.
    #[must_use]
    pub const fn growth_per_step(&self) -> usize {
        self.growth_per_step
    }

    /// Time between two cap increases.
    #[must_use]
    pub const fn growth_interval(&self) -> Duration {
        self.growth_interval
    }

    /// Seed of the offset generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(2),
            5.0,
            15.0,
            2,
            1,
            Duration::from_secs(10),
            0x5eed_2024_0bad_f00d,
        )
    }
}

/// Pure system that emits enemy spawn commands around the player.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
    running: bool,
    elapsed: Duration,
    timer: Duration,
}

impl Spawning {
    /// Creates a new, stopped spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            running: false,
            elapsed: Duration::ZERO,
            timer: Duration::ZERO,
        }
    }

    /// Starts spawning with fresh timers.
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed = Duration::ZERO;
        self.timer = Duration::ZERO;
    }

    /// Stops spawning; timers are kept until the next start.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Reports whether the system currently emits spawns.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Time accumulated since the last start.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Concurrent enemy cap for the time elapsed since the last start.
    #[must_use]
    pub fn current_cap(&self) -> usize {
        let growth_interval = self.config.growth_interval.as_nanos();
        if growth_interval == 0 {
            return self.config.base_cap;
        }

        let steps = self.elapsed.as_nanos() / growth_interval;
        let steps = usize::try_from(steps).unwrap_or(usize::MAX);
        self.config
            .base_cap
            .saturating_add(steps.saturating_mul(self.config.growth_per_step))
    }

    /// Advances the timers and emits at most one spawn command.
    ///
    /// The interval restarts as soon as the command is emitted, so a spawn
    /// the world later rejects still uses up its interval.
    pub fn handle(&mut self, dt: Duration, view: &CharacterView, out: &mut Vec<Command>) {
        if !self.running {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        self.timer = self.timer.saturating_add(dt);

        let alive = view.alive_count(CharacterKind::Enemy);
        let cap = self.current_cap();
        if alive >= cap {
            return;
        }

        if self.timer < self.config.spawn_interval {
            return;
        }

        let Some(player) = view.player() else {
            warn!("no player to spawn enemies around");
            return;
        };

        let position = player.position + self.next_offset();
        debug!(alive, cap, x = position.x, z = position.z, "spawning enemy");
        out.push(Command::SpawnCharacter {
            kind: CharacterKind::Enemy,
            position,
        });
        self.timer = Duration::ZERO;
    }

    fn next_offset(&mut self) -> Vec3 {
        let x = self.next_axis_offset();
        let z = self.next_axis_offset();
        Vec3::new(x, 0.0, z)
    }

    fn next_axis_offset(&mut self) -> f32 {
        let magnitude = self
            .rng
            .gen_range(self.config.min_offset..=self.config.max_offset);
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}
