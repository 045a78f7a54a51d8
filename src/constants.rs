//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::GameConfig::default`] reads every
//! value from this module, and `assets/game.toml` may override any subset at
//! startup.

// ── Scheduling ────────────────────────────────────────────────────────────────

/// Fixed simulation step (seconds).  Movement, AI, and every gameplay timer
/// advance by exactly this amount per fixed step.
pub const FIXED_TIMESTEP: f32 = 0.02;

/// Maximum fixed steps executed for one rendered frame.
///
/// Caps the catch-up work after a long stall; leftover time is dropped.
pub const MAX_SUBSTEPS: u32 = 5;

// ── Player: Base Stats ────────────────────────────────────────────────────────

pub const PLAYER_MAX_HP: f32 = 150.0;
pub const PLAYER_MOVE_SPEED: f32 = 5.0;
pub const PLAYER_MAGNET_RANGE: f32 = 1.0;
pub const PLAYER_ATTACK_DAMAGE: f32 = 10.0;
pub const PLAYER_ATTACK_DELAY: f32 = 0.5;
pub const PLAYER_CRITICAL_CHANCE: f32 = 0.1;
pub const PLAYER_CRITICAL_MULTIPLIER: f32 = 1.5;
pub const PLAYER_RELOAD_TIME: f32 = 1.5;
pub const PLAYER_MAX_AMMO: u32 = 8;

/// Lowest attack delay any upgrade can reach (5 shots per second).
pub const MIN_ATTACK_DELAY: f32 = 0.2;

/// Lowest reload time any upgrade can reach.
pub const MIN_RELOAD_TIME: f32 = 0.5;

// ── Player: Weapon Modifiers ──────────────────────────────────────────────────

pub const BURST_SHOT_CAP: u32 = 3;
pub const SPREAD_SHOT_CAP: u32 = 5;

/// Total fan angle contributed by each spread level (degrees).
pub const SPREAD_DEGREES_PER_LEVEL: f32 = 20.0;

/// Delay between the shots of one burst (seconds).
pub const BURST_INTERVAL: f32 = 0.2;

pub const PROJECTILE_SPEED: f32 = 10.0;
pub const PROJECTILE_LIFETIME: f32 = 3.0;

/// Distance in front of the player at which projectiles appear.
pub const MUZZLE_OFFSET: f32 = 0.6;

/// Fraction of the remaining angle closed per frame when turning toward the aim point.
pub const ROTATION_SMOOTHING: f32 = 0.15;

/// Maximum length of the aim guide line.
pub const AIM_LINE_LENGTH: f32 = 100.0;

// ── Progression ───────────────────────────────────────────────────────────────

/// XP needed to go from level 1 to level 2.  Later thresholds follow
/// `L² + 20·L + 100` for the level just reached.
pub const INITIAL_NEXT_LEVEL_XP: f32 = 100.0;

/// Most levels a single experience grant can award.
pub const MAX_LEVELS_PER_GRANT: u32 = 1_000;

/// Offers presented per level-up.
pub const OFFERS_PER_LEVEL: usize = 3;

/// Fraction of MaxHP restored when the player declines every offer.
pub const FORFEIT_HEAL_FRACTION: f32 = 0.45;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const CHASER_MAX_HEALTH: f32 = 30.0;
pub const CHASER_MOVE_SPEED: f32 = 3.0;
pub const CHASER_CONTACT_DAMAGE: f32 = 10.0;

pub const SHOOTER_MAX_HEALTH: f32 = 20.0;
pub const SHOOTER_MOVE_SPEED: f32 = 2.5;
pub const SHOOTER_CONTACT_DAMAGE: f32 = 8.0;
pub const SHOOTER_PROJECTILE_DAMAGE: f32 = 8.0;
pub const SHOOTER_RANGE: f32 = 10.0;
/// Half-width of the distance band in which a Shooter holds position.
pub const SHOOTER_HYSTERESIS: f32 = 1.0;
/// Seconds between Shooter shots while holding position.
pub const SHOOTER_FIRE_RATE: f32 = 2.0;
pub const SHOOTER_PROJECTILE_SPEED: f32 = 10.0;
pub const SHOOTER_PROJECTILE_LIFETIME: f32 = 5.0;

pub const RUNNER_MAX_HEALTH: f32 = 15.0;
pub const RUNNER_MOVE_SPEED: f32 = 6.0;
pub const RUNNER_CONTACT_DAMAGE: f32 = 5.0;

pub const TANK_MAX_HEALTH: f32 = 500.0;
pub const TANK_MOVE_SPEED: f32 = 1.5;
pub const TANK_CONTACT_DAMAGE: f32 = 30.0;
/// Value of the single large orb every Tank drops.
pub const TANK_EXPERIENCE_REWARD: u32 = 500;

pub const REGULAR_EXPERIENCE_REWARD: u32 = 5;

// ── Experience Drops ──────────────────────────────────────────────────────────

/// Percent of non-Tank kills that drop a small orb.
pub const SMALL_ORB_PERCENT: u32 = 60;
/// Percent of non-Tank kills that drop a medium orb.
pub const MEDIUM_ORB_PERCENT: u32 = 30;

pub const SMALL_ORB_VALUE: u32 = 5;
pub const MEDIUM_ORB_VALUE: u32 = 20;
pub const LARGE_ORB_VALUE: u32 = 100;

/// Speed at which an attracted orb homes toward the player.
pub const ORB_FOLLOW_SPEED: f32 = 8.0;

// ── Spawn Director ────────────────────────────────────────────────────────────

pub const INITIAL_SPAWN_INTERVAL: f32 = 2.0;
pub const SPAWN_INTERVAL_REDUCTION_PER_MINUTE: f32 = 0.15;
/// Spawn cadence never gets faster than this.
pub const MIN_SPAWN_INTERVAL: f32 = 0.55;
pub const INITIAL_SPAWN_BATCH: u32 = 3;
pub const SPAWN_BATCH_INCREASE_PER_MINUTE: f32 = 5.0;
pub const HP_MULTIPLIER_PER_MINUTE: f32 = 0.15;

pub const TANK_SPAWN_INTERVAL: f32 = 60.0;
/// Extra health granted per previously spawned Tank.
pub const TANK_HEALTH_STEP: f32 = 200.0;

pub const SHOOTER_UNLOCK_SECS: f32 = 120.0;
pub const RUNNER_UNLOCK_SECS: f32 = 240.0;

pub const SPAWN_RADIUS_MIN: f32 = 10.0;
pub const SPAWN_RADIUS_MAX: f32 = 15.0;

// ── Contacts ──────────────────────────────────────────────────────────────────

pub const PLAYER_CONTACT_RADIUS: f32 = 0.5;
pub const ENEMY_CONTACT_RADIUS: f32 = 0.5;
pub const TANK_CONTACT_RADIUS: f32 = 1.0;
pub const PROJECTILE_CONTACT_RADIUS: f32 = 0.15;
pub const ORB_CONTACT_RADIUS: f32 = 0.25;
