#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Zombie IO engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable
//! [`CharacterView`] snapshots and submit [`Command`] values describing
//! desired mutations, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values for the session and
//! adapters to react to deterministically.

use std::time::Duration;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Zombie IO.";

/// Name of the input axis that drives sideways player movement.
pub const AXIS_HORIZONTAL: &str = "Horizontal";

/// Name of the input axis that drives forward/backward player movement.
pub const AXIS_VERTICAL: &str = "Vertical";

/// Name of the input button whose press edge triggers a player attack.
pub const BUTTON_ATTACK: &str = "Attack";

/// Persistence key holding the best match score ever recorded.
pub const HIGH_SCORE_KEY: &str = "save_score_max";

/// Persistence key holding the sum of every completed match score.
pub const CUMULATIVE_SCORE_KEY: &str = "save_current_score";

/// Unique identifier assigned to a pooled character slot.
///
/// Identifiers are stable across reuse: a slot keeps its id when it is
/// released to the pool and later acquired again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Variants of characters that can inhabit the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterKind {
    /// The single input-driven character.
    Player,
    /// AI-driven character that hunts the player.
    Enemy,
}

impl CharacterKind {
    /// Resolves the character the subject should face and attack.
    ///
    /// Players target the nearest living non-player character, scanning the
    /// view in pool acquisition order and keeping the first candidate on
    /// ties. Enemies always target the current player, alive or not.
    #[must_use]
    pub fn resolve_target(
        self,
        subject: &CharacterSnapshot,
        view: &CharacterView,
    ) -> Option<CharacterId> {
        match self {
            Self::Player => {
                let mut best: Option<(CharacterId, f32)> = None;
                for candidate in view.iter() {
                    if candidate.kind == Self::Player || !candidate.is_alive() {
                        continue;
                    }

                    let distance = planar_distance(subject.position, candidate.position);
                    if best.map_or(true, |(_, nearest)| distance < nearest) {
                        best = Some((candidate.id, distance));
                    }
                }
                best.map(|(id, _)| id)
            }
            Self::Enemy => view.player().map(|player| player.id),
        }
    }
}

/// States of the enemy behaviour machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// The enemy stands still and ignores its target.
    Idle,
    /// The enemy walks toward its target.
    Approach,
    /// The enemy is within reach and strikes its target.
    Attacking,
}

/// Result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The player survived until the match timer expired.
    Victory,
    /// The player died before the match timer expired.
    Defeat,
}

/// Template used to initialise and re-initialise pooled characters of a kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Kind of character built from the template.
    pub kind: CharacterKind,
    /// Hit points a freshly initialised character starts with.
    pub max_health: u32,
    /// Factor applied to every incoming damage amount.
    pub damage_taken_multiplier: u32,
    /// Damage dealt by a single attack.
    pub attack_damage: u32,
    /// Lock-out applied after each successful attack.
    pub attack_cooldown: Duration,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Score credited to the player when a character of this kind dies.
    pub score_cost: u32,
    /// Behaviour state assigned on (re)initialisation. Ignored for players.
    pub initial_ai_state: AiState,
}

impl Archetype {
    /// Default player template: 50 hit points, unscaled damage intake.
    #[must_use]
    pub fn player() -> Self {
        Self {
            kind: CharacterKind::Player,
            max_health: 50,
            damage_taken_multiplier: 1,
            attack_damage: 5,
            attack_cooldown: Duration::from_secs(1),
            speed: 5.0,
            score_cost: 0,
            initial_ai_state: AiState::Idle,
        }
    }

    /// Default enemy template: 10 hit points that a single standard hit removes.
    #[must_use]
    pub fn enemy() -> Self {
        Self {
            kind: CharacterKind::Enemy,
            max_health: 10,
            damage_taken_multiplier: 1000,
            attack_damage: 5,
            attack_cooldown: Duration::from_secs(1),
            speed: 3.0,
            score_cost: 10,
            initial_ai_state: AiState::Approach,
        }
    }
}

/// Reasons the world may refuse to hand out a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SpawnError {
    /// No archetype is registered for the requested kind.
    #[error("no archetype registered for character kind {0:?}")]
    UnknownKind(CharacterKind),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances attack cooldowns of every active character.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Acquires a character of the provided kind from the pool.
    SpawnCharacter {
        /// Kind of character to acquire.
        kind: CharacterKind,
        /// Position the acquired character is placed at.
        position: Vec3,
    },
    /// Returns an active character to the pool.
    ReleaseCharacter {
        /// Identifier of the character to deactivate.
        character: CharacterId,
    },
    /// Displaces a character along the heading of the provided direction.
    MoveCharacter {
        /// Identifier of the character to move.
        character: CharacterId,
        /// Desired heading; the zero vector leaves the character in place.
        direction: Vec3,
        /// Frame time used to scale the displacement.
        dt: Duration,
    },
    /// Smoothly turns a character toward the provided direction.
    RotateCharacter {
        /// Identifier of the character to turn.
        character: CharacterId,
        /// Direction to face; the zero vector keeps the current yaw.
        direction: Vec3,
        /// Frame time used by the smoothing spring.
        dt: Duration,
    },
    /// Overrides the movement speed of a character.
    SetCharacterSpeed {
        /// Identifier of the character to adjust.
        character: CharacterId,
        /// New speed; negative values are clamped to zero.
        speed: f32,
    },
    /// Requests that an attacker strike a target using its attack unit.
    Attack {
        /// Identifier of the attacking character.
        attacker: CharacterId,
        /// Identifier of the character being struck.
        target: CharacterId,
    },
    /// Applies raw damage to a character, bypassing any attack cooldown.
    DamageCharacter {
        /// Identifier of the character receiving damage.
        character: CharacterId,
        /// Damage before the receiver's intake multiplier is applied.
        amount: u32,
    },
    /// Moves an enemy's behaviour machine into a new state.
    SetAiState {
        /// Identifier of the enemy whose state changes.
        character: CharacterId,
        /// State the enemy should adopt.
        state: AiState,
    },
}

/// Events broadcast after processing commands and session transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a character was acquired from the pool.
    CharacterSpawned {
        /// Identifier of the acquired character.
        character: CharacterId,
        /// Kind of the acquired character.
        kind: CharacterKind,
        /// Position the character was placed at.
        position: Vec3,
    },
    /// Reports that a spawn request could not be satisfied.
    SpawnRejected {
        /// Kind that was requested.
        kind: CharacterKind,
        /// Specific reason the request failed.
        reason: SpawnError,
    },
    /// Confirms that a character was returned to the pool.
    CharacterReleased {
        /// Identifier of the released character.
        character: CharacterId,
        /// Kind of the released character.
        kind: CharacterKind,
    },
    /// Confirms that a character changed position.
    CharacterMoved {
        /// Identifier of the character that moved.
        character: CharacterId,
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// Confirms that an attack connected with its target.
    AttackLanded {
        /// Identifier of the attacking character.
        attacker: CharacterId,
        /// Identifier of the character that was struck.
        target: CharacterId,
        /// Damage dealt before the target's intake multiplier.
        damage: u32,
    },
    /// Reports the remaining health of a character after it took damage.
    HealthChanged {
        /// Identifier of the damaged character.
        character: CharacterId,
        /// Health after the damage was applied.
        health: u32,
        /// Maximum health of the character.
        max_health: u32,
    },
    /// Announces that a character's health reached zero.
    CharacterDied {
        /// Identifier of the character that died.
        character: CharacterId,
        /// Kind of the character that died.
        kind: CharacterKind,
        /// Score credited for the death.
        score_cost: u32,
    },
    /// Announces that an enemy's behaviour machine switched state.
    AiStateChanged {
        /// Identifier of the enemy.
        character: CharacterId,
        /// State before the transition.
        from: AiState,
        /// State after the transition.
        to: AiState,
    },
    /// Announces that a new match began.
    MatchStarted,
    /// Announces that the running match finished.
    MatchEnded {
        /// How the match ended.
        outcome: SessionOutcome,
        /// Score accumulated during the match.
        score: i64,
    },
    /// Announces that the session was paused or resumed.
    PauseChanged {
        /// Whether the session is now paused.
        paused: bool,
    },
    /// Reports the match score after it changed.
    ScoreChanged {
        /// Current match score.
        score: i64,
    },
    /// Reports that the match score set a new all-time record.
    HighScoreChanged {
        /// New persisted high score.
        score: i64,
    },
}

/// Immutable representation of a single character's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Identifier of the pooled slot.
    pub id: CharacterId,
    /// Kind of the character.
    pub kind: CharacterKind,
    /// Position on the ground plane.
    pub position: Vec3,
    /// Heading around the vertical axis in degrees.
    pub yaw_degrees: f32,
    /// Remaining hit points.
    pub health: u32,
    /// Maximum hit points.
    pub max_health: u32,
    /// Behaviour state for enemies, `None` for players.
    pub ai_state: Option<AiState>,
    /// Whether the attack unit is out of cooldown.
    pub attack_ready: bool,
    /// Current movement speed.
    pub speed: f32,
    /// Score credited when the character dies.
    pub score_cost: u32,
}

impl CharacterSnapshot {
    /// Reports whether the character still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Resolves the target of this character within the provided view.
    #[must_use]
    pub fn resolve_target(&self, view: &CharacterView) -> Option<CharacterId> {
        self.kind.resolve_target(self, view)
    }
}

/// Read-only snapshot describing every active character.
///
/// Snapshots keep the pool's acquisition order, which is also the scan
/// order used for target resolution.
#[derive(Clone, Debug, Default)]
pub struct CharacterView {
    snapshots: Vec<CharacterSnapshot>,
    player: Option<CharacterId>,
}

impl CharacterView {
    /// Creates a new character view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CharacterSnapshot>, player: Option<CharacterId>) -> Self {
        Self { snapshots, player }
    }

    /// Iterator over the captured snapshots in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of an active character.
    #[must_use]
    pub fn get(&self, character: CharacterId) -> Option<&CharacterSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == character)
    }

    /// Snapshot of the current player, if the player is active.
    #[must_use]
    pub fn player(&self) -> Option<&CharacterSnapshot> {
        self.player.and_then(|player| self.get(player))
    }

    /// Counts active characters of the provided kind that are still alive.
    #[must_use]
    pub fn alive_count(&self, kind: CharacterKind) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == kind && snapshot.is_alive())
            .count()
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Source of player intent consumed once per frame.
pub trait InputSource {
    /// Current value of a named axis, nominally within `-1.0..=1.0`.
    fn axis(&self, name: &str) -> f32;

    /// Whether the named button was pressed during this frame.
    fn button_pressed(&self, name: &str) -> bool;
}

/// Player intent sampled from an [`InputSource`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Horizontal (x) and vertical (y) movement axes clamped to `-1.0..=1.0`.
    pub movement: Vec2,
    /// Whether the attack button was pressed this frame.
    pub attack: bool,
}

impl PlayerInput {
    /// Captures the current intent from the provided source.
    #[must_use]
    pub fn sample<I: InputSource + ?Sized>(source: &I) -> Self {
        Self {
            movement: Vec2::new(
                clamp_axis(source.axis(AXIS_HORIZONTAL)),
                clamp_axis(source.axis(AXIS_VERTICAL)),
            ),
            attack: source.button_pressed(BUTTON_ATTACK),
        }
    }

    /// Movement intent projected onto the ground plane and normalised.
    #[must_use]
    pub fn planar_direction(&self) -> Vec3 {
        Vec3::new(self.movement.x, 0.0, self.movement.y).normalize_or_zero()
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Durable integer key-value storage scoped to a single player profile.
pub trait ScoreStore {
    /// Error reported when a value could not be persisted.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the value stored under `key`, or `default` when none exists.
    fn load(&self, key: &str, default: i64) -> i64;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: i64) -> Result<(), Self::Error>;
}

/// Distance between two points projected onto the ground plane.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Direction from `from` toward `to` on the ground plane, normalised.
///
/// Returns the zero vector when both points coincide.
#[must_use]
pub fn planar_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}
