#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game facade that wires the world and the pure systems into a frame loop.
//!
//! A frame runs in a fixed order: the session clock, the spawn controller,
//! the player controller, the enemy AI, and finally the attack cooldown
//! tick. Commands are applied one at a time and the deaths they cause are
//! routed before the next command runs, so a character killed earlier in a
//! frame is already back in the pool when later systems act.

mod config;

use std::time::Duration;

use glam::Vec3;
use tracing::{debug, error, info};
use zombie_io_core::{
    CharacterId, CharacterKind, CharacterSnapshot, CharacterView, Command, Event, InputSource,
    PlayerInput, ScoreStore, SessionOutcome, SpawnError,
};
use zombie_io_system_enemy_ai::EnemyAi;
use zombie_io_system_player_control::PlayerControl;
use zombie_io_system_scoring::ScoreManager;
use zombie_io_system_session::{DeathRouting, Session};
use zombie_io_system_spawning::Spawning;
use zombie_io_world::{self as world, query, World};

pub use config::{ConfigError, GameConfig};
pub use zombie_io_system_session::SessionError;

/// Owns every component of a running game.
#[derive(Debug)]
pub struct Game<S> {
    world: World,
    session: Session,
    spawning: Spawning,
    enemy_ai: EnemyAi,
    player_control: PlayerControl,
    scores: ScoreManager<S>,
}

impl<S: ScoreStore> Game<S> {
    /// Builds an idle game from the provided configuration and score store.
    ///
    /// Configurations that fail [`GameConfig::validate`] are logged; matches
    /// whose player cannot be spawned refuse to start.
    #[must_use]
    pub fn new(config: &GameConfig, store: S) -> Self {
        if let Err(error) = config.validate() {
            error!(%error, "game configuration is inconsistent");
        }
        Self {
            world: World::with_config(config.world_config()),
            session: Session::new(config.session_config()),
            spawning: Spawning::new(config.spawning_config()),
            enemy_ai: EnemyAi::new(config.enemy_ai_config()),
            player_control: PlayerControl::new(),
            scores: ScoreManager::new(store),
        }
    }

    /// Starts a new match with the player at the origin.
    ///
    /// Characters left over from a previous match are returned to the pool
    /// first. Starting while a match is running is rejected, and a match
    /// whose player cannot be spawned is rolled back to idle.
    pub fn start_game(&mut self) -> Result<Vec<Event>, SessionError> {
        self.session.start()?;

        let mut events = Vec::new();
        let leftovers: Vec<CharacterId> = query::active_characters(&self.world).to_vec();
        for character in leftovers {
            self.execute(Command::ReleaseCharacter { character }, &mut events);
        }

        let mut spawned = Vec::new();
        self.execute(
            Command::SpawnCharacter {
                kind: CharacterKind::Player,
                position: Vec3::ZERO,
            },
            &mut spawned,
        );
        if query::player(&self.world).is_none() {
            let reason = spawned
                .iter()
                .find_map(|event| match event {
                    Event::SpawnRejected { reason, .. } => Some(*reason),
                    _ => None,
                })
                .unwrap_or(SpawnError::UnknownKind(CharacterKind::Player));
            self.session.abort();
            error!(%reason, "match start aborted without a player");
            return Err(SessionError::PlayerSpawnRejected(reason));
        }

        self.scores.start_match();
        events.push(Event::MatchStarted);
        events.extend(spawned);
        self.spawning.start();
        Ok(events)
    }

    /// Pauses or resumes the running match.
    pub fn toggle_pause(&mut self) -> Vec<Event> {
        match self.session.toggle_pause() {
            Some(paused) => {
                info!(paused, "pause toggled");
                vec![Event::PauseChanged { paused }]
            }
            None => Vec::new(),
        }
    }

    /// Advances the game by one frame and returns everything that happened.
    pub fn step<I: InputSource + ?Sized>(&mut self, dt: Duration, input: &I) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.session.is_running() {
            return events;
        }

        if let Some(outcome) = self.session.advance(dt) {
            self.end_match(outcome, &mut events);
            return events;
        }

        let mut commands = Vec::new();
        let view = query::character_view(&self.world);
        self.spawning.handle(dt, &view, &mut commands);
        self.execute_all(&mut commands, &mut events);

        let input = PlayerInput::sample(input);
        let view = query::character_view(&self.world);
        self.player_control.handle(dt, &input, &view, &mut commands);
        self.execute_all(&mut commands, &mut events);

        let view = query::character_view(&self.world);
        self.enemy_ai.handle(dt, &view, &mut commands);
        self.execute_all(&mut commands, &mut events);

        if self.session.is_active() {
            self.execute(Command::Tick { dt }, &mut events);
        }
        events
    }

    /// Score of the running or last match.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.scores.match_score()
    }

    /// Best match score ever recorded.
    #[must_use]
    pub fn high_score(&self) -> i64 {
        self.scores.high_score()
    }

    /// Sum of every completed match score.
    #[must_use]
    pub fn cumulative_score(&self) -> i64 {
        self.scores.cumulative_score()
    }

    /// Whether the running or last match set a new high score.
    #[must_use]
    pub fn is_new_record(&self) -> bool {
        self.scores.is_new_record()
    }

    /// Time left before the running match is won.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.session.time_remaining()
    }

    /// Remaining health of the player, if one is active.
    #[must_use]
    pub fn player_health(&self) -> Option<u32> {
        self.player().map(|player| player.health)
    }

    /// Snapshot of the active player.
    #[must_use]
    pub fn player(&self) -> Option<CharacterSnapshot> {
        query::player(&self.world).and_then(|player| query::character(&self.world, player))
    }

    /// Whether the running match is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    /// Whether a match is running, paused or not.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Outcome of the last finished match.
    #[must_use]
    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.session.last_outcome()
    }

    /// Read-only view of every active character.
    #[must_use]
    pub fn character_view(&self) -> CharacterView {
        query::character_view(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the score manager and its store.
    #[must_use]
    pub fn scores(&self) -> &ScoreManager<S> {
        &self.scores
    }

    /// Consumes the game and returns its score store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.scores.into_store()
    }

    fn execute_all(&mut self, commands: &mut Vec<Command>, out: &mut Vec<Event>) {
        for command in commands.drain(..) {
            if !self.session.is_active() {
                debug!(?command, "match over, dropping command");
                continue;
            }
            self.execute(command, out);
        }
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut produced = Vec::new();
        world::apply(&mut self.world, command, &mut produced);
        for event in produced {
            self.route(event, out);
        }
    }

    fn route(&mut self, event: Event, out: &mut Vec<Event>) {
        let died = match &event {
            Event::CharacterSpawned { character, .. } => {
                self.session.on_character_spawned(*character);
                None
            }
            Event::CharacterReleased { character, .. } => {
                self.session.on_character_released(*character);
                None
            }
            Event::CharacterDied {
                character,
                kind,
                score_cost,
            } => Some((*character, *kind, *score_cost)),
            _ => None,
        };
        out.push(event);

        let Some((character, kind, score_cost)) = died else {
            return;
        };
        match self.session.on_character_died(character, kind, score_cost) {
            DeathRouting::Ignored => {}
            DeathRouting::Credit { score_cost } => {
                self.scores.add_score(score_cost, out);
                self.execute(Command::ReleaseCharacter { character }, out);
            }
            DeathRouting::Defeat => {
                self.end_match(SessionOutcome::Defeat, out);
                self.execute(Command::ReleaseCharacter { character }, out);
            }
            DeathRouting::Release => {
                self.execute(Command::ReleaseCharacter { character }, out);
            }
        }
    }

    fn end_match(&mut self, outcome: SessionOutcome, out: &mut Vec<Event>) {
        self.spawning.stop();
        self.scores.complete_match();
        info!(
            outcome = ?outcome,
            score = self.scores.match_score(),
            high_score = self.scores.high_score(),
            "match finished"
        );
        out.push(Event::MatchEnded {
            outcome,
            score: self.scores.match_score(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zombie_io_storage::MemoryStore;

    struct Idle;

    impl InputSource for Idle {
        fn axis(&self, _name: &str) -> f32 {
            0.0
        }

        fn button_pressed(&self, _name: &str) -> bool {
            false
        }
    }

    #[test]
    fn idle_game_ignores_steps_and_pause() {
        let mut game = Game::new(&GameConfig::default(), MemoryStore::new());
        assert!(game.step(Duration::from_secs(1), &Idle).is_empty());
        assert!(game.toggle_pause().is_empty());
        assert!(!game.is_active());
        assert_eq!(game.player_health(), None);
    }

    #[test]
    fn start_spawns_the_player_at_the_origin() {
        let mut game = Game::new(&GameConfig::default(), MemoryStore::new());
        let events = game.start_game().expect("idle game starts");

        assert_eq!(events.first(), Some(&Event::MatchStarted));
        let player = game.player().expect("player spawned");
        assert_eq!(player.position, Vec3::ZERO);
        assert_eq!(player.health, 50);
        assert_eq!(game.time_remaining(), Duration::from_secs(900));
    }
}
