//! Health, attack, and movement units owned by every character.

use std::time::Duration;

use glam::Vec3;

/// Time constant of the critically damped yaw spring, in seconds.
const ROTATION_SMOOTH_TIME: f32 = 0.1;

/// Result of applying damage to a [`Health`] unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The unit lost health and is still alive.
    Wounded,
    /// The unit crossed from alive to dead.
    Killed,
    /// The unit was already dead; nothing changed.
    AlreadyDead,
}

/// Hit points of a character, clamped into `0..=max` on every mutation.
#[derive(Clone, Debug)]
pub(crate) struct Health {
    current: u32,
    max: u32,
    intake_multiplier: u32,
}

impl Health {
    pub(crate) fn new(max: u32, intake_multiplier: u32) -> Self {
        Self {
            current: max,
            max,
            intake_multiplier,
        }
    }

    pub(crate) fn current(&self) -> u32 {
        self.current
    }

    pub(crate) fn max(&self) -> u32 {
        self.max
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Removes `amount` scaled by the intake multiplier.
    ///
    /// Only the call that takes the unit from alive to dead reports
    /// [`DamageOutcome::Killed`].
    pub(crate) fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::AlreadyDead;
        }

        let scaled = amount.saturating_mul(self.intake_multiplier);
        self.set_current(self.current.saturating_sub(scaled));

        if self.is_alive() {
            DamageOutcome::Wounded
        } else {
            DamageOutcome::Killed
        }
    }

    fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}

/// Cooldown-gated damage dealer.
#[derive(Clone, Debug)]
pub(crate) struct Attack {
    damage: u32,
    cooldown: Duration,
    remaining: Duration,
}

impl Attack {
    pub(crate) fn new(damage: u32, cooldown: Duration) -> Self {
        Self {
            damage,
            cooldown,
            remaining: Duration::ZERO,
        }
    }

    pub(crate) fn damage(&self) -> u32 {
        self.damage
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.remaining.is_zero()
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Locks the unit for a full cooldown window after a successful hit.
    pub(crate) fn trigger(&mut self) {
        self.remaining = self.cooldown;
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }
}

/// Translates direction intents into displacement and smoothed yaw.
#[derive(Clone, Debug)]
pub(crate) struct Movement {
    speed: f32,
    yaw_degrees: f32,
    yaw_velocity: f32,
}

impl Movement {
    pub(crate) fn new(speed: f32) -> Self {
        let mut movement = Self {
            speed: 0.0,
            yaw_degrees: 0.0,
            yaw_velocity: 0.0,
        };
        movement.set_speed(speed);
        movement
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    /// Negative and NaN speeds collapse to zero.
    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Displacement for one frame along the heading of `direction`.
    ///
    /// Returns `None` when the direction has no planar component.
    pub(crate) fn displacement(&self, direction: Vec3, dt: Duration) -> Option<Vec3> {
        let heading = heading_radians(direction)?;
        let forward = Vec3::new(heading.sin(), 0.0, heading.cos());
        Some(forward * self.speed * dt.as_secs_f32())
    }

    /// Turns the yaw toward `direction`; a direction without planar component is ignored.
    pub(crate) fn rotate(&mut self, direction: Vec3, dt: Duration) {
        let Some(heading) = heading_radians(direction) else {
            return;
        };

        self.yaw_degrees = smooth_damp_angle(
            self.yaw_degrees,
            heading.to_degrees(),
            &mut self.yaw_velocity,
            ROTATION_SMOOTH_TIME,
            dt.as_secs_f32(),
        )
        .rem_euclid(360.0);
    }
}

fn heading_radians(direction: Vec3) -> Option<f32> {
    if direction.x == 0.0 && direction.z == 0.0 {
        return None;
    }
    if !direction.x.is_finite() || !direction.z.is_finite() {
        return None;
    }
    Some(direction.x.atan2(direction.z))
}

/// Signed shortest difference between two angles, in `-180.0..=180.0`.
fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Critically damped spring toward `target`, wrapping through the shortest arc.
fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let target = current + delta_angle(current, target);
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_stays_within_bounds_for_any_sequence() {
        let mut health = Health::new(50, 1);
        for amount in [0, 7, 13, 1, 60, 4, u32::MAX] {
            let _ = health.apply_damage(amount);
            assert!(health.current() <= health.max());
        }
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn death_is_reported_once() {
        let mut health = Health::new(10, 1000);
        assert_eq!(health.apply_damage(5), DamageOutcome::Killed);
        assert_eq!(health.apply_damage(5), DamageOutcome::AlreadyDead);
        assert_eq!(health.apply_damage(0), DamageOutcome::AlreadyDead);
        assert!(!health.is_alive());
    }

    #[test]
    fn intake_multiplier_saturates() {
        let mut health = Health::new(10, u32::MAX);
        assert_eq!(health.apply_damage(u32::MAX), DamageOutcome::Killed);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn attack_cooldown_clamps_at_zero() {
        let mut attack = Attack::new(5, Duration::from_secs(1));
        assert!(attack.is_ready());
        attack.trigger();
        assert!(!attack.is_ready());
        attack.tick(Duration::from_millis(600));
        assert!(!attack.is_ready());
        attack.tick(Duration::from_millis(600));
        assert!(attack.is_ready());
        assert_eq!(attack.remaining(), Duration::ZERO);
    }

    #[test]
    fn negative_speed_is_clamped() {
        let mut movement = Movement::new(-3.0);
        assert_eq!(movement.speed(), 0.0);
        movement.set_speed(f32::NAN);
        assert_eq!(movement.speed(), 0.0);
        movement.set_speed(4.5);
        assert_eq!(movement.speed(), 4.5);
    }

    #[test]
    fn displacement_follows_heading_and_scales_with_speed() {
        let movement = Movement::new(4.0);
        let step = movement
            .displacement(Vec3::new(0.0, 0.0, 2.0), Duration::from_millis(500))
            .expect("non-zero direction moves");
        assert!((step - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);

        let sideways = movement
            .displacement(Vec3::new(-1.0, 0.0, 0.0), Duration::from_secs(1))
            .expect("non-zero direction moves");
        assert!((sideways - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zero_direction_is_ignored() {
        let mut movement = Movement::new(4.0);
        assert!(movement.displacement(Vec3::ZERO, Duration::from_secs(1)).is_none());
        assert!(movement.displacement(Vec3::Y, Duration::from_secs(1)).is_none());
        movement.rotate(Vec3::ZERO, Duration::from_secs(1));
        movement.rotate(Vec3::new(f32::NAN, 0.0, 1.0), Duration::from_secs(1));
        assert_eq!(movement.yaw_degrees(), 0.0);
    }

    #[test]
    fn rotation_converges_toward_target_yaw() {
        let mut movement = Movement::new(1.0);
        let dt = Duration::from_millis(16);
        movement.rotate(Vec3::X, dt);
        let first = movement.yaw_degrees();
        assert!(first > 0.0 && first < 90.0, "partial turn expected, got {first}");

        for _ in 0..120 {
            movement.rotate(Vec3::X, dt);
        }
        assert!((movement.yaw_degrees() - 90.0).abs() < 0.5);
    }

    #[test]
    fn rotation_takes_shortest_arc() {
        let mut movement = Movement::new(1.0);
        let dt = Duration::from_millis(16);
        movement.rotate(Vec3::new(-1.0, 0.0, 0.0), dt);
        let yaw = movement.yaw_degrees();
        assert!(yaw > 270.0 && yaw < 360.0, "expected a counter-clockwise turn, got {yaw}");
    }

    #[test]
    fn delta_angle_wraps() {
        assert!((delta_angle(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((delta_angle(10.0, 350.0) + 20.0).abs() < 1e-4);
    }
}
