//! Scripted input that plays a match from the command line.

use zombie_io_core::{
    planar_direction, planar_distance, CharacterView, InputSource, AXIS_HORIZONTAL,
    AXIS_VERTICAL, BUTTON_ATTACK,
};

/// Enemies closer than this make the autopilot back away.
const COMFORT_RADIUS: f32 = 4.0;

/// Input source that keeps its distance and swings at the nearest enemy.
#[derive(Debug)]
pub(crate) struct Autopilot {
    horizontal: f32,
    vertical: f32,
    attack: bool,
    attack_every: u32,
    frame: u32,
}

impl Autopilot {
    /// Creates an autopilot pressing attack once every `attack_every` frames.
    pub(crate) fn new(attack_every: u32) -> Self {
        Self {
            horizontal: 0.0,
            vertical: 0.0,
            attack: false,
            attack_every: attack_every.max(1),
            frame: 0,
        }
    }

    /// Decides the input of the next frame from the current arena.
    pub(crate) fn observe(&mut self, view: &CharacterView) {
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);
        self.horizontal = 0.0;
        self.vertical = 0.0;
        self.attack = false;

        let Some(player) = view.player() else {
            return;
        };
        let Some(target) = player
            .resolve_target(view)
            .and_then(|target| view.get(target))
        else {
            return;
        };

        if planar_distance(player.position, target.position) < COMFORT_RADIUS {
            let away = planar_direction(target.position, player.position);
            self.horizontal = away.x;
            self.vertical = away.z;
        }
        self.attack = frame % self.attack_every == 0;
    }
}

impl InputSource for Autopilot {
    fn axis(&self, name: &str) -> f32 {
        match name {
            AXIS_HORIZONTAL => self.horizontal,
            AXIS_VERTICAL => self.vertical,
            _ => 0.0,
        }
    }

    fn button_pressed(&self, name: &str) -> bool {
        name == BUTTON_ATTACK && self.attack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use zombie_io_core::{CharacterId, CharacterKind, CharacterSnapshot};

    fn snapshot(id: u32, kind: CharacterKind, x: f32, z: f32) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            kind,
            position: Vec3::new(x, 0.0, z),
            yaw_degrees: 0.0,
            health: 10,
            max_health: 10,
            ai_state: None,
            attack_ready: true,
            speed: 3.0,
            score_cost: 0,
        }
    }

    fn arena(enemies: &[(f32, f32)]) -> CharacterView {
        let mut snapshots = vec![snapshot(0, CharacterKind::Player, 0.0, 0.0)];
        for (index, (x, z)) in enemies.iter().enumerate() {
            snapshots.push(snapshot(index as u32 + 1, CharacterKind::Enemy, *x, *z));
        }
        CharacterView::from_snapshots(snapshots, Some(CharacterId::new(0)))
    }

    #[test]
    fn backs_away_from_a_close_enemy() {
        let mut pilot = Autopilot::new(1);
        pilot.observe(&arena(&[(10.0, 0.0), (2.0, 0.0)]));

        assert_eq!(pilot.axis(AXIS_HORIZONTAL), -1.0);
        assert_eq!(pilot.axis(AXIS_VERTICAL), 0.0);
        assert!(pilot.button_pressed(BUTTON_ATTACK));
    }

    #[test]
    fn holds_still_when_enemies_are_far() {
        let mut pilot = Autopilot::new(1);
        pilot.observe(&arena(&[(0.0, 9.0)]));

        assert_eq!(pilot.axis(AXIS_HORIZONTAL), 0.0);
        assert_eq!(pilot.axis(AXIS_VERTICAL), 0.0);
    }

    #[test]
    fn attacks_on_a_fixed_cadence_only_with_a_target() {
        let mut pilot = Autopilot::new(3);
        let view = arena(&[(6.0, 0.0)]);
        let presses: Vec<bool> = (0..6)
            .map(|_| {
                pilot.observe(&view);
                pilot.button_pressed(BUTTON_ATTACK)
            })
            .collect();
        assert_eq!(presses, vec![true, false, false, true, false, false]);

        pilot.observe(&arena(&[]));
        assert!(!pilot.button_pressed(BUTTON_ATTACK));
    }
}
