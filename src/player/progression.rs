//! Health, experience, and upgrades.
//!
//! ## Upgrade effects
//!
//! | Kind | Effect of amount `a` | Bound |
//! |------|----------------------|-------|
//! | MaxHp | `max += a`, `current += a` | - |
//! | MoveSpeed, MagnetRange, CriticalMultiplier | `+= a` | - |
//! | AttackDamage | `×= 1 + a` | - |
//! | AttackDelay | `×= 1 − a` | `≥ MIN_ATTACK_DELAY` |
//! | ReloadTime | `×= 1 − a` | `≥ MIN_RELOAD_TIME` |
//! | CriticalChance | `+= a` | `[0, 1]` |
//! | BurstShot, SpreadShot | `+= ⌊a⌉` | cap 3 / 5 |
//! | PiercingShot | on | - |
//!
//! [`Player::upgrade_level`] inverts these against the session's starting
//! stats, which is how the offer selector tells whether an entry is capped.

use super::Player;
use crate::constants::*;
use crate::events::{AnimationCue, HudUpdate, Outbox, Subject};
use crate::stats::xp_threshold_for;
use crate::upgrade::{UpgradeKind, UpgradeOffer};
use bevy::log::{debug, info, warn};

/// Level reported for a stat pinned at its bound.  Always counts as capped.
pub const SATURATED_LEVEL: u32 = u32::MAX;

/// Result of [`Player::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player already dead, the amount was not positive, or the session is
    /// not in Playing.
    Ignored,
    Wounded,
    /// This hit brought health to zero.
    Killed,
}

impl Player {
    /// Reduce CurrentHP, never below zero.
    pub fn take_damage(&mut self, amount: f32, outbox: &mut Outbox) -> DamageOutcome {
        if !self.alive || !(amount > 0.0) {
            return DamageOutcome::Ignored;
        }

        self.stats.current_hp = (self.stats.current_hp - amount).max(0.0);
        self.emit_health(outbox);

        if self.stats.current_hp <= 0.0 {
            self.alive = false;
            self.weapon.burst = None;
            outbox.animate(Subject::Player, AnimationCue::Die);
            info!("player died at level {}", self.progression.level);
            DamageOutcome::Killed
        } else {
            outbox.animate(Subject::Player, AnimationCue::Hit);
            DamageOutcome::Wounded
        }
    }

    /// Restore CurrentHP, capped at MaxHP.
    pub fn heal(&mut self, amount: f32, outbox: &mut Outbox) {
        if !self.alive || !(amount > 0.0) {
            return;
        }
        self.stats.current_hp = (self.stats.current_hp + amount).min(self.stats.max_hp);
        self.emit_health(outbox);
    }

    /// Add experience and resolve every threshold it crosses.
    ///
    /// Returns the number of levels gained.
    pub fn gain_exp(&mut self, amount: f32, outbox: &mut Outbox) -> u32 {
        if !amount.is_finite() {
            warn!("ignoring non-finite experience grant {amount}");
            return 0;
        }
        if amount <= 0.0 {
            return 0;
        }
        let progression = &mut self.progression;
        progression.xp += amount;

        let mut gained = 0;
        while progression.xp >= progression.next_level_xp && gained < MAX_LEVELS_PER_GRANT {
            progression.xp -= progression.next_level_xp;
            progression.level += 1;
            progression.pending_level_ups += 1;
            progression.next_level_xp = xp_threshold_for(progression.level);
            gained += 1;
        }
        if progression.xp >= progression.next_level_xp {
            warn!("experience grant capped at {MAX_LEVELS_PER_GRANT} levels");
            progression.xp = 0.0;
        }

        outbox.hud(HudUpdate::Experience {
            current: progression.xp,
            next: progression.next_level_xp,
        });
        if gained > 0 {
            outbox.hud(HudUpdate::Level(progression.level));
            debug!(
                "reached level {} ({} pending)",
                progression.level, progression.pending_level_ups
            );
        }
        gained
    }

    /// Mark one pending level-up as resolved.
    pub(crate) fn resolve_level_up(&mut self) {
        self.progression.pending_level_ups = self.progression.pending_level_ups.saturating_sub(1);
    }

    pub fn apply_upgrade(&mut self, offer: &UpgradeOffer, outbox: &mut Outbox) {
        let a = offer.amount;
        let stats = &mut self.stats;
        let modifiers = &mut self.modifiers;

        match offer.kind {
            UpgradeKind::MaxHp => {
                stats.max_hp += a;
                stats.current_hp = (stats.current_hp + a).clamp(0.0, stats.max_hp);
            }
            UpgradeKind::MoveSpeed => stats.move_speed += a,
            UpgradeKind::MagnetRange => stats.magnet_range += a,
            UpgradeKind::AttackDamage => stats.attack_damage *= 1.0 + a,
            UpgradeKind::AttackDelay => {
                stats.attack_delay = (stats.attack_delay * (1.0 - a)).max(MIN_ATTACK_DELAY);
            }
            UpgradeKind::CriticalChance => {
                stats.critical_chance = (stats.critical_chance + a).clamp(0.0, 1.0);
            }
            UpgradeKind::CriticalMultiplier => stats.critical_multiplier += a,
            UpgradeKind::ReloadTime => {
                stats.reload_time = (stats.reload_time * (1.0 - a)).max(MIN_RELOAD_TIME);
            }
            UpgradeKind::BurstShot => {
                modifiers.burst_shot = (modifiers.burst_shot + whole(a)).min(BURST_SHOT_CAP);
            }
            UpgradeKind::SpreadShot => {
                modifiers.spread_shot = (modifiers.spread_shot + whole(a)).min(SPREAD_SHOT_CAP);
            }
            UpgradeKind::PiercingShot => modifiers.piercing = true,
        }

        info!("upgrade applied: {} ({:?} {:+})", offer.name, offer.kind, a);
        if offer.kind == UpgradeKind::MaxHp {
            self.emit_health(outbox);
        }
    }

    /// How many times an upgrade of `kind` with per-level `step` has been
    /// applied, derived from the current stats.
    ///
    /// Returns [`SATURATED_LEVEL`] for AttackDelay / ReloadTime at their floor
    /// and CriticalChance at 1.0.  A zero step or zero baseline yields 0.
    pub fn upgrade_level(&self, kind: UpgradeKind, step: f32) -> u32 {
        let base = &self.baseline;
        let now = &self.stats;

        match kind {
            UpgradeKind::MaxHp => additive_level(now.max_hp, base.max_hp, step),
            UpgradeKind::MoveSpeed => additive_level(now.move_speed, base.move_speed, step),
            UpgradeKind::MagnetRange => additive_level(now.magnet_range, base.magnet_range, step),
            UpgradeKind::CriticalMultiplier => {
                additive_level(now.critical_multiplier, base.critical_multiplier, step)
            }
            UpgradeKind::CriticalChance => {
                if now.critical_chance >= 1.0 {
                    SATURATED_LEVEL
                } else {
                    additive_level(now.critical_chance, base.critical_chance, step)
                }
            }
            UpgradeKind::AttackDamage => {
                ratio_level(now.attack_damage, base.attack_damage, 1.0 + step)
            }
            UpgradeKind::AttackDelay => {
                if at_floor(now.attack_delay, MIN_ATTACK_DELAY) {
                    SATURATED_LEVEL
                } else {
                    ratio_level(now.attack_delay, base.attack_delay, 1.0 - step)
                }
            }
            UpgradeKind::ReloadTime => {
                if at_floor(now.reload_time, MIN_RELOAD_TIME) {
                    SATURATED_LEVEL
                } else {
                    ratio_level(now.reload_time, base.reload_time, 1.0 - step)
                }
            }
            UpgradeKind::BurstShot => self.modifiers.burst_shot,
            UpgradeKind::SpreadShot => self.modifiers.spread_shot,
            UpgradeKind::PiercingShot => u32::from(self.modifiers.piercing),
        }
    }

    fn emit_health(&self, outbox: &mut Outbox) {
        outbox.hud(HudUpdate::Health {
            current: self.stats.current_hp,
            max: self.stats.max_hp,
        });
    }
}

#[inline]
fn whole(amount: f32) -> u32 {
    amount.round().max(0.0) as u32
}

#[inline]
fn at_floor(value: f32, floor: f32) -> bool {
    value <= floor + 1e-4
}

fn additive_level(value: f32, base: f32, step: f32) -> u32 {
    if step == 0.0 {
        return 0;
    }
    to_level((value - base) / step)
}

/// Level `n` such that `base × factor^n == value`.
fn ratio_level(value: f32, base: f32, factor: f32) -> u32 {
    if base <= 0.0 || value <= 0.0 || factor <= 0.0 || factor == 1.0 {
        return 0;
    }
    to_level((value / base).ln() / factor.ln())
}

#[inline]
fn to_level(raw: f32) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().max(0.0) as u32
}
