//! Player stat model: base stats, weapon modifiers, and level progression.
//!
//! These are plain data.  The only code that mutates them lives in
//! [`crate::player`]; everything else reads copies.

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Core player stats.
///
/// Invariants (restored by [`PlayerStats::sanitized`]):
/// - `0 ≤ current_hp ≤ max_hp`
/// - `0 ≤ current_ammo ≤ max_ammo`
/// - `critical_chance ∈ [0, 1]`
/// - `attack_delay ≥ MIN_ATTACK_DELAY`, `reload_time ≥ MIN_RELOAD_TIME`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub max_hp: f32,
    pub current_hp: f32,
    pub move_speed: f32,
    pub magnet_range: f32,
    pub attack_damage: f32,
    /// Seconds between accepted trigger pulls.
    pub attack_delay: f32,
    pub critical_chance: f32,
    pub critical_multiplier: f32,
    pub reload_time: f32,
    pub max_ammo: u32,
    pub current_ammo: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_hp: PLAYER_MAX_HP,
            current_hp: PLAYER_MAX_HP,
            move_speed: PLAYER_MOVE_SPEED,
            magnet_range: PLAYER_MAGNET_RANGE,
            attack_damage: PLAYER_ATTACK_DAMAGE,
            attack_delay: PLAYER_ATTACK_DELAY,
            critical_chance: PLAYER_CRITICAL_CHANCE,
            critical_multiplier: PLAYER_CRITICAL_MULTIPLIER,
            reload_time: PLAYER_RELOAD_TIME,
            max_ammo: PLAYER_MAX_AMMO,
            current_ammo: PLAYER_MAX_AMMO,
        }
    }
}

impl PlayerStats {
    /// Stats as they are at the start of a session: full health, full magazine.
    pub fn fresh(self) -> Self {
        Self {
            current_hp: self.max_hp,
            current_ammo: self.max_ammo,
            ..self
        }
        .sanitized()
    }

    /// Clamp every field back inside its invariant range.
    pub fn sanitized(mut self) -> Self {
        self.max_hp = self.max_hp.max(1.0);
        self.current_hp = self.current_hp.clamp(0.0, self.max_hp);
        self.move_speed = self.move_speed.max(0.0);
        self.magnet_range = self.magnet_range.max(0.0);
        self.attack_damage = self.attack_damage.max(0.0);
        self.attack_delay = self.attack_delay.max(MIN_ATTACK_DELAY);
        self.critical_chance = self.critical_chance.clamp(0.0, 1.0);
        self.critical_multiplier = self.critical_multiplier.max(1.0);
        self.reload_time = self.reload_time.max(MIN_RELOAD_TIME);
        self.max_ammo = self.max_ammo.max(1);
        self.current_ammo = self.current_ammo.min(self.max_ammo);
        self
    }
}

/// Weapon modifiers bought through level-up upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponModifiers {
    /// Extra sequential shots per trigger pull (cap [`BURST_SHOT_CAP`]).
    pub burst_shot: u32,
    /// Extra simultaneous projectiles per shot (cap [`SPREAD_SHOT_CAP`]).
    pub spread_shot: u32,
    /// Projectiles survive enemy contact.  Only ever goes from `false` to `true`.
    pub piercing: bool,
}

impl WeaponModifiers {
    /// Shots fired by one trigger pull.
    #[inline]
    pub fn shots_per_trigger(&self) -> u32 {
        1 + self.burst_shot
    }
}

/// Level and experience bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionState {
    /// Current level (starts at 1).
    pub level: u32,
    pub xp: f32,
    pub next_level_xp: f32,
    /// Level-up events gained but not yet resolved by an upgrade choice.
    pub pending_level_ups: u32,
}

impl ProgressionState {
    pub fn new(initial_next_level_xp: f32) -> Self {
        Self {
            level: 1,
            xp: 0.0,
            next_level_xp: initial_next_level_xp.max(1.0),
            pending_level_ups: 0,
        }
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(INITIAL_NEXT_LEVEL_XP)
    }
}

/// XP required to leave `level` once it has been reached: `L² + 20·L + 100`.
#[inline]
pub fn xp_threshold_for(level: u32) -> f32 {
    let l = level as f32;
    l * l + 20.0 * l + 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_formula_matches_known_levels() {
        assert_eq!(xp_threshold_for(2), 144.0);
        assert_eq!(xp_threshold_for(3), 169.0);
        assert_eq!(xp_threshold_for(10), 400.0);
    }

    #[test]
    fn sanitized_restores_invariants() {
        let stats = PlayerStats {
            current_hp: 999.0,
            attack_delay: 0.01,
            reload_time: 0.0,
            critical_chance: 1.7,
            current_ammo: 40,
            ..PlayerStats::default()
        }
        .sanitized();

        assert_eq!(stats.current_hp, stats.max_hp);
        assert_eq!(stats.attack_delay, MIN_ATTACK_DELAY);
        assert_eq!(stats.reload_time, MIN_RELOAD_TIME);
        assert_eq!(stats.critical_chance, 1.0);
        assert_eq!(stats.current_ammo, stats.max_ammo);
    }

    #[test]
    fn fresh_refills_health_and_ammo() {
        let stats = PlayerStats {
            current_hp: 3.0,
            current_ammo: 0,
            ..PlayerStats::default()
        }
        .fresh();
        assert_eq!(stats.current_hp, PLAYER_MAX_HP);
        assert_eq!(stats.current_ammo, PLAYER_MAX_AMMO);
    }
}
