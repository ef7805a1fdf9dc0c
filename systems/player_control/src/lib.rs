#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns sampled player input into world commands.

use std::time::Duration;

use tracing::trace;
use zombie_io_core::{planar_direction, CharacterView, Command, PlayerInput};

/// Player controller that moves, aims, and attacks on behalf of the input source.
#[derive(Debug, Default)]
pub struct PlayerControl {
    scratch: Vec<Command>,
}

impl PlayerControl {
    /// Creates a new player controller with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits movement, rotation, and attack commands for the living player.
    ///
    /// The player faces its nearest living enemy when one exists and the
    /// movement direction otherwise. Attacks are only issued with a target.
    pub fn handle(
        &mut self,
        dt: Duration,
        input: &PlayerInput,
        view: &CharacterView,
        out: &mut Vec<Command>,
    ) {
        let Some(player) = view.player() else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        self.scratch.clear();
        let movement = input.planar_direction();
        self.scratch.push(Command::MoveCharacter {
            character: player.id,
            direction: movement,
            dt,
        });

        let target = player
            .resolve_target(view)
            .and_then(|target| view.get(target));
        let facing = match target {
            Some(target) => planar_direction(player.position, target.position),
            None => movement,
        };
        self.scratch.push(Command::RotateCharacter {
            character: player.id,
            direction: facing,
            dt,
        });

        if let Some(target) = target.filter(|_| input.attack) {
            trace!(target = target.id.get(), "player attacking");
            self.scratch.push(Command::Attack {
                attacker: player.id,
                target: target.id,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
