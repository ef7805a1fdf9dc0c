#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match lifecycle and death routing for a single game session.

use std::{collections::HashSet, time::Duration};

use thiserror::Error;
use tracing::{debug, info, warn};
use zombie_io_core::{CharacterId, CharacterKind, SessionOutcome, SpawnError};

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    max_duration: Duration,
}

impl Config {
    /// Creates a new configuration with the provided match length.
    #[must_use]
    pub const fn new(max_duration: Duration) -> Self {
        Self { max_duration }
    }

    /// Length of a match the player must survive to win.
    #[must_use]
    pub const fn max_duration(&self) -> Duration {
        self.max_duration
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(15 * 60))
    }
}

/// Lifecycle phase of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No match is running.
    Idle,
    /// A match is running.
    Active,
}

/// Requests the session refuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SessionError {
    /// A match was started while another one was running.
    #[error("a match is already active")]
    AlreadyActive,
    /// The player of a new match could not be spawned.
    #[error("the player could not be spawned: {0}")]
    PlayerSpawnRejected(#[source] SpawnError),
}

/// Follow-up the owner performs after a character death was routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathRouting {
    /// The character was not registered; nothing to do.
    Ignored,
    /// The player died and the match ended in defeat; release the character.
    Defeat,
    /// An enemy died during the match; credit the score, then release it.
    Credit {
        /// Score to add to the match.
        score_cost: u32,
    },
    /// The character died outside a running match; only release it.
    Release,
}

/// Session state machine owning the match clock and the death registry.
#[derive(Debug)]
pub struct Session {
    config: Config,
    phase: Phase,
    paused: bool,
    elapsed: Duration,
    last_outcome: Option<SessionOutcome>,
    registry: HashSet<CharacterId>,
}

impl Session {
    /// Creates an idle session.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            paused: false,
            elapsed: Duration::ZERO,
            last_outcome: None,
            registry: HashSet::new(),
        }
    }

    /// Moves the session into the active phase with a fresh clock.
    ///
    /// The death registry is cleared; the owner is expected to release any
    /// characters left over from the previous match.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase == Phase::Active {
            let error = SessionError::AlreadyActive;
            warn!(%error, "start request ignored");
            return Err(error);
        }

        self.phase = Phase::Active;
        self.paused = false;
        self.elapsed = Duration::ZERO;
        self.last_outcome = None;
        self.registry.clear();
        info!(max_duration = ?self.config.max_duration, "match started");
        Ok(())
    }

    /// Returns a freshly started match to idle without recording an outcome.
    pub fn abort(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        self.phase = Phase::Idle;
        self.paused = false;
        self.registry.clear();
        warn!("match start rolled back");
    }

    /// Flips the pause flag of a running match and returns the new value.
    ///
    /// Returns `None` when no match is running.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if self.phase != Phase::Active {
            debug!("pause toggle ignored while idle");
            return None;
        }
        self.paused = !self.paused;
        Some(self.paused)
    }

    /// Reports whether the frame step should run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Active && !self.paused
    }

    /// Advances the match clock; ends the match in victory once it expires.
    pub fn advance(&mut self, dt: Duration) -> Option<SessionOutcome> {
        if !self.is_running() {
            return None;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.config.max_duration {
            self.finish(SessionOutcome::Victory);
            return Some(SessionOutcome::Victory);
        }
        None
    }

    /// Registers a spawned character for death notifications.
    pub fn on_character_spawned(&mut self, character: CharacterId) {
        let _ = self.registry.insert(character);
    }

    /// Unregisters a character that left the arena without dying.
    pub fn on_character_released(&mut self, character: CharacterId) {
        let _ = self.registry.remove(&character);
    }

    /// Routes the death of a character and unregisters it.
    ///
    /// A player death while active ends the match in defeat. Deaths of
    /// unregistered characters are ignored so every death is handled once.
    pub fn on_character_died(
        &mut self,
        character: CharacterId,
        kind: CharacterKind,
        score_cost: u32,
    ) -> DeathRouting {
        if !self.registry.remove(&character) {
            debug!(character = character.get(), "death of unregistered character ignored");
            return DeathRouting::Ignored;
        }

        if self.phase != Phase::Active {
            return DeathRouting::Release;
        }

        match kind {
            CharacterKind::Player => {
                self.finish(SessionOutcome::Defeat);
                DeathRouting::Defeat
            }
            CharacterKind::Enemy => DeathRouting::Credit { score_cost },
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a match is running, paused or not.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Whether the running match is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time played in the current or last match.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left before the current match is won.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.config.max_duration.saturating_sub(self.elapsed)
    }

    /// Outcome of the last finished match.
    #[must_use]
    pub const fn last_outcome(&self) -> Option<SessionOutcome> {
        self.last_outcome
    }

    /// Whether the character is registered for death notifications.
    #[must_use]
    pub fn is_registered(&self, character: CharacterId) -> bool {
        self.registry.contains(&character)
    }

    /// Configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.phase = Phase::Idle;
        self.paused = false;
        self.last_outcome = Some(outcome);
        info!(outcome = ?outcome, elapsed = ?self.elapsed, "match ended");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
