//! Player module: the single player entity, its weapon, and its progression.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`combat`] | Trigger acceptance, burst state machine, spread fan, ammo + reload, projectile flight |
//! | [`progression`] | Damage and healing, XP + leveling, upgrade application, upgrade level queries |
//!
//! Movement, facing, and the [`SimComponent`] wiring live here.

pub mod combat;
pub mod progression;

pub use combat::{spread_directions, Projectile, ProjectileId, WeaponTuning};
pub use progression::{DamageOutcome, SATURATED_LEVEL};

use crate::context::{Frame, SimComponent};
use crate::events::{AnimationCue, Outbox, Subject};
use crate::stats::{PlayerStats, ProgressionState, WeaponModifiers};
use bevy::math::{Vec2, Vec3};
use combat::WeaponState;

/// Read-only projection of the player handed to other components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec3,
    pub magnet_range: f32,
    pub alive: bool,
}

/// The player entity.
///
/// Owns its stats exclusively; other components only ever see a
/// [`PlayerView`].
#[derive(Debug, Clone)]
pub struct Player {
    position: Vec3,
    /// Facing angle around +Y in radians; `0` faces +Z.
    yaw: f32,
    /// Last valid ground-plane direction toward the aim point.
    aim_dir: Option<Vec3>,
    stats: PlayerStats,
    /// Stats at session start; the reference point for upgrade level queries.
    baseline: PlayerStats,
    modifiers: WeaponModifiers,
    progression: ProgressionState,
    weapon: WeaponState,
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    tuning: WeaponTuning,
    moving: bool,
    alive: bool,
}

impl Player {
    pub fn new(stats: PlayerStats, initial_next_level_xp: f32, tuning: WeaponTuning) -> Self {
        let stats = stats.fresh();
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            aim_dir: None,
            stats,
            baseline: stats,
            modifiers: WeaponModifiers::default(),
            progression: ProgressionState::new(initial_next_level_xp),
            weapon: WeaponState::default(),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            tuning,
            moving: false,
            alive: true,
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            position: self.position,
            magnet_range: self.stats.magnet_range,
            alive: self.alive,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Unit vector the player is facing.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Direction new shots travel: toward the aim point, else straight ahead.
    #[inline]
    pub fn fire_direction(&self) -> Vec3 {
        self.aim_dir.unwrap_or_else(|| self.forward())
    }

    /// Where projectiles appear.
    pub fn muzzle(&self) -> Vec3 {
        self.position + self.fire_direction() * self.tuning.muzzle_offset
    }

    #[inline]
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[inline]
    pub fn baseline(&self) -> &PlayerStats {
        &self.baseline
    }

    #[inline]
    pub fn modifiers(&self) -> &WeaponModifiers {
        &self.modifiers
    }

    #[inline]
    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Translate along the normalised input direction at MoveSpeed.
    fn step_movement(&mut self, movement: Vec2, dt: f32, outbox: &mut Outbox) {
        let dir = Vec3::new(movement.x, 0.0, movement.y).normalize_or_zero();
        self.position += dir * self.stats.move_speed * dt;

        let moving = dir != Vec3::ZERO;
        if moving != self.moving {
            self.moving = moving;
            outbox.animate(Subject::Player, AnimationCue::Moving(moving));
        }
    }

    /// Record the ground-plane direction toward the aim point.
    fn update_aim(&mut self, aim_point: Option<Vec3>) {
        let Some(point) = aim_point else {
            return;
        };
        let mut to_aim = point - self.position;
        to_aim.y = 0.0;
        if to_aim.length_squared() > 0.01 {
            self.aim_dir = Some(to_aim.normalize());
        }
    }

    /// Ease the facing angle toward the aim direction.
    fn step_rotation(&mut self) {
        let Some(dir) = self.aim_dir else {
            return;
        };
        let target = dir.x.atan2(dir.z);
        let delta = shortest_angle(target - self.yaw);
        self.yaw = wrap_angle(self.yaw + delta * self.tuning.rotation_smoothing);
    }
}

impl SimComponent for Player {
    fn on_fixed_step(&mut self, frame: &mut Frame<'_>, dt: f32) {
        if !frame.phase.is_playing() || !self.alive {
            return;
        }
        self.step_movement(frame.input.movement, dt, frame.outbox);
        self.update_aim(frame.input.aim_point);
        self.step_weapon(frame.input.fire_held, dt, frame.outbox);
        self.step_projectiles(dt);
    }

    fn on_variable_step(&mut self, frame: &mut Frame<'_>, _dt: f32) {
        if !frame.phase.is_playing() || !self.alive {
            return;
        }
        self.update_aim(frame.input.aim_point);
        self.step_rotation();
    }
}

/// Map an angle difference into `(-π, π]`.
fn shortest_angle(delta: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = delta.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

fn wrap_angle(angle: f32) -> f32 {
    shortest_angle(angle)
}
