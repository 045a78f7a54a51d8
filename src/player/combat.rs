//! Player weapon: trigger acceptance, bursts, spread, ammo, and projectiles.
//!
//! ## Per-step order
//!
//! 1. Tick the attack cooldown.
//! 2. Advance an in-flight burst (the shot after the first).
//! 3. Accept a new trigger pull if fire is held and the weapon is ready.
//! 4. Advance the reload timer.
//!
//! A burst costs a single round, taken when its last shot has left.  It
//! stops early if the magazine is empty or a reload is running when the next
//! shot is due.

use super::Player;
use crate::constants::*;
use crate::enemy::EnemyId;
use crate::events::{AnimationCue, AudioCue, HudUpdate, Outbox, Subject};
use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stable identity of a player projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u32);

/// Tunables for projectile flight and shot geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub burst_interval: f32,
    pub spread_degrees_per_level: f32,
    pub muzzle_offset: f32,
    pub rotation_smoothing: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            burst_interval: BURST_INTERVAL,
            spread_degrees_per_level: SPREAD_DEGREES_PER_LEVEL,
            muzzle_offset: MUZZLE_OFFSET,
            rotation_smoothing: ROTATION_SMOOTHING,
        }
    }
}

/// A shot in flight.
///
/// Critical hits are rolled per impact from the snapshot taken at fire time.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub critical_chance: f32,
    pub critical_multiplier: f32,
    pub piercing: bool,
    pub age: f32,
    pub lifetime: f32,
    /// Enemies already damaged; a piercing round hits each enemy once.
    struck: Vec<EnemyId>,
}

impl Projectile {
    #[inline]
    pub fn has_struck(&self, enemy: EnemyId) -> bool {
        self.struck.contains(&enemy)
    }

    pub fn mark_struck(&mut self, enemy: EnemyId) {
        self.struck.push(enemy);
    }

    /// Damage for one impact and whether it was critical.
    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, bool) {
        let critical = self.critical_chance > 0.0 && rng.gen::<f32>() < self.critical_chance;
        if critical {
            (self.damage * self.critical_multiplier, true)
        } else {
            (self.damage, false)
        }
    }

    #[inline]
    fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Remaining shots of a trigger pull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BurstState {
    pub shots_remaining: u32,
    pub time_to_next: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WeaponState {
    pub attack_timer: f32,
    pub reloading: bool,
    pub reload_elapsed: f32,
    pub burst: Option<BurstState>,
}

/// Directions of a spread fan centred on `forward`.
///
/// `1 + spread_level` projectiles share a fan of
/// `spread_level × degrees_per_level` degrees, evenly spaced, rotated about +Y.
pub fn spread_directions(forward: Vec3, spread_level: u32, degrees_per_level: f32) -> Vec<Vec3> {
    if spread_level == 0 {
        return vec![forward];
    }
    let count = spread_level + 1;
    let total = (spread_level as f32 * degrees_per_level).to_radians();
    let increment = total / (count - 1) as f32;
    let start = -total / 2.0;

    (0..count)
        .map(|i| Quat::from_rotation_y(start + i as f32 * increment) * forward)
        .collect()
}

impl Player {
    #[inline]
    pub fn is_reloading(&self) -> bool {
        self.weapon.reloading
    }

    #[inline]
    pub fn is_bursting(&self) -> bool {
        self.weapon.burst.is_some()
    }

    #[inline]
    pub fn attack_timer(&self) -> f32 {
        self.weapon.attack_timer
    }

    /// Reload progress as `(elapsed, duration)` while reloading.
    pub fn reload_progress(&self) -> Option<(f32, f32)> {
        self.weapon
            .reloading
            .then_some((self.weapon.reload_elapsed, self.stats.reload_time))
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }

    pub fn remove_projectile(&mut self, id: ProjectileId) -> Option<Projectile> {
        let index = self.projectiles.iter().position(|p| p.id == id)?;
        Some(self.projectiles.swap_remove(index))
    }

    pub(super) fn step_weapon(&mut self, fire_held: bool, dt: f32, outbox: &mut Outbox) {
        if self.weapon.attack_timer > 0.0 {
            self.weapon.attack_timer -= dt;
        }

        self.advance_burst(dt, outbox);

        if fire_held {
            self.pull_trigger(outbox);
        }

        self.advance_reload(dt, outbox);
    }

    /// Try to start a shot or burst.  Returns whether the pull was accepted.
    pub fn pull_trigger(&mut self, outbox: &mut Outbox) -> bool {
        if self.weapon.reloading
            || self.weapon.burst.is_some()
            || self.weapon.attack_timer > 0.0
            || self.stats.current_ammo == 0
        {
            return false;
        }
        self.weapon.attack_timer = self.stats.attack_delay;

        let shots = self.modifiers.shots_per_trigger();
        self.fire_shot(outbox);
        if shots == 1 {
            self.consume_round(outbox);
            return true;
        }

        self.weapon.burst = Some(BurstState {
            shots_remaining: shots - 1,
            time_to_next: self.tuning.burst_interval,
        });
        true
    }

    fn advance_burst(&mut self, dt: f32, outbox: &mut Outbox) {
        let Some(mut burst) = self.weapon.burst else {
            return;
        };
        burst.time_to_next -= dt;

        while burst.shots_remaining > 0 && burst.time_to_next <= 1e-5 {
            if self.stats.current_ammo == 0 || self.weapon.reloading {
                debug!("burst aborted with {} shots left", burst.shots_remaining);
                burst.shots_remaining = 0;
                break;
            }
            self.fire_shot(outbox);
            burst.shots_remaining -= 1;
            burst.time_to_next += self.tuning.burst_interval;
        }

        if burst.shots_remaining == 0 {
            self.weapon.burst = None;
            self.consume_round(outbox);
        } else {
            self.weapon.burst = Some(burst);
        }
    }

    /// Emit one shot: a projectile per spread direction.
    fn fire_shot(&mut self, outbox: &mut Outbox) {
        let origin = self.muzzle();
        let directions = spread_directions(
            self.fire_direction(),
            self.modifiers.spread_shot,
            self.tuning.spread_degrees_per_level,
        );

        for dir in directions {
            let id = ProjectileId(self.next_projectile_id);
            self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
            self.projectiles.push(Projectile {
                id,
                position: origin,
                velocity: dir * self.tuning.projectile_speed,
                damage: self.stats.attack_damage,
                critical_chance: self.stats.critical_chance,
                critical_multiplier: self.stats.critical_multiplier,
                piercing: self.modifiers.piercing,
                age: 0.0,
                lifetime: self.tuning.projectile_lifetime,
                struck: Vec::new(),
            });
        }

        outbox.animate(Subject::Player, AnimationCue::Shoot);
        outbox.audio(AudioCue::ShotFired);
    }

    fn consume_round(&mut self, outbox: &mut Outbox) {
        self.stats.current_ammo = self.stats.current_ammo.saturating_sub(1);
        outbox.hud(HudUpdate::Ammo {
            current: self.stats.current_ammo,
            max: self.stats.max_ammo,
        });
        if self.stats.current_ammo == 0 && !self.weapon.reloading {
            self.start_reload(outbox);
        }
    }

    fn start_reload(&mut self, outbox: &mut Outbox) {
        self.weapon.reloading = true;
        self.weapon.reload_elapsed = 0.0;
        outbox.animate(Subject::Player, AnimationCue::Reload);
        outbox.audio(AudioCue::ReloadStarted);
        debug!("reload started ({:.2}s)", self.stats.reload_time);
    }

    fn advance_reload(&mut self, dt: f32, outbox: &mut Outbox) {
        if !self.weapon.reloading {
            return;
        }
        self.weapon.reload_elapsed += dt;

        let duration = self.stats.reload_time;
        if self.weapon.reload_elapsed >= duration {
            self.weapon.reloading = false;
            self.weapon.reload_elapsed = 0.0;
            self.stats.current_ammo = self.stats.max_ammo;
            outbox.hud(HudUpdate::Ammo {
                current: self.stats.current_ammo,
                max: self.stats.max_ammo,
            });
            return;
        }

        let per_round = duration / self.stats.max_ammo as f32;
        let rounds_loaded = ((self.weapon.reload_elapsed / per_round).floor() as u32)
            .min(self.stats.max_ammo);
        outbox.hud(HudUpdate::Reloading {
            elapsed: self.weapon.reload_elapsed,
            duration,
            rounds_loaded,
            max_ammo: self.stats.max_ammo,
        });
    }

    /// Move projectiles and drop the ones past their lifetime.
    pub(super) fn step_projectiles(&mut self, dt: f32) {
        for projectile in &mut self.projectiles {
            projectile.position += projectile.velocity * dt;
            projectile.age += dt;
        }
        self.projectiles.retain(|p| !p.expired());
    }
}
