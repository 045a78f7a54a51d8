//! Spawn director: wave cadence, batch size, unlocks, and health scaling.
//!
//! ## Curves (`m` = elapsed Playing minutes)
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | spawn interval | `max(min_interval, initial_interval − reduction · m)` |
//! | batch size | `initial_batch + ⌊increase · m⌋` |
//! | regular health | `base · (1 + hp_multiplier · m)` |
//! | Tank health | `base + (tanks_spawned − 1) · tank_health_step` |
//!
//! Tanks scale with how many have spawned, not with time.  Archetypes flagged
//! `ignore_health_scaling` always spawn at base health.
//!
//! The director only decides what to spawn and where.  It queues
//! [`SpawnRequest`]s on the frame and the session materialises them.

use crate::constants::*;
use crate::context::{Frame, SimComponent};
use crate::enemy::{Archetype, ArchetypeStats};
use bevy::log::{debug, info};
use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub initial_interval: f32,
    pub interval_reduction_per_minute: f32,
    pub min_interval: f32,
    pub initial_batch: u32,
    pub batch_increase_per_minute: f32,
    pub hp_multiplier_per_minute: f32,
    pub tank_interval: f32,
    pub tank_health_step: f32,
    pub shooter_unlock_secs: f32,
    pub runner_unlock_secs: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub spawn_chaser: bool,
    pub spawn_shooter: bool,
    pub spawn_runner: bool,
    pub spawn_tank: bool,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            initial_interval: INITIAL_SPAWN_INTERVAL,
            interval_reduction_per_minute: SPAWN_INTERVAL_REDUCTION_PER_MINUTE,
            min_interval: MIN_SPAWN_INTERVAL,
            initial_batch: INITIAL_SPAWN_BATCH,
            batch_increase_per_minute: SPAWN_BATCH_INCREASE_PER_MINUTE,
            hp_multiplier_per_minute: HP_MULTIPLIER_PER_MINUTE,
            tank_interval: TANK_SPAWN_INTERVAL,
            tank_health_step: TANK_HEALTH_STEP,
            shooter_unlock_secs: SHOOTER_UNLOCK_SECS,
            runner_unlock_secs: RUNNER_UNLOCK_SECS,
            radius_min: SPAWN_RADIUS_MIN,
            radius_max: SPAWN_RADIUS_MAX,
            spawn_chaser: true,
            spawn_shooter: true,
            spawn_runner: true,
            spawn_tank: true,
        }
    }
}

/// Seconds between regular batches after `minutes` of play.
pub fn spawn_interval(tuning: &SpawnTuning, minutes: f32) -> f32 {
    (tuning.initial_interval - tuning.interval_reduction_per_minute * minutes).max(tuning.min_interval)
}

/// Enemies per regular batch after `minutes` of play.
pub fn spawn_batch_size(tuning: &SpawnTuning, minutes: f32) -> u32 {
    let extra = (tuning.batch_increase_per_minute * minutes).floor().max(0.0);
    tuning.initial_batch.saturating_add(extra as u32)
}

/// Max health for a fresh enemy of `archetype`.
///
/// `tanks_spawned` already counts the Tank being spawned.
pub fn scaled_health(
    archetype: Archetype,
    stats: &ArchetypeStats,
    tuning: &SpawnTuning,
    minutes: f32,
    tanks_spawned: u32,
) -> f32 {
    let base = stats.base_max_health;
    if stats.ignore_health_scaling {
        return base;
    }
    match archetype {
        Archetype::Tank => base + tanks_spawned.saturating_sub(1) as f32 * tuning.tank_health_step,
        _ => base * (1.0 + tuning.hp_multiplier_per_minute * minutes),
    }
}

/// Non-Tank archetypes available after `elapsed_secs`.
pub fn unlocked_archetypes(tuning: &SpawnTuning, elapsed_secs: f32) -> Vec<Archetype> {
    let mut unlocked = Vec::with_capacity(3);
    if tuning.spawn_chaser {
        unlocked.push(Archetype::Chaser);
    }
    if tuning.spawn_shooter && elapsed_secs >= tuning.shooter_unlock_secs {
        unlocked.push(Archetype::Shooter);
    }
    if tuning.spawn_runner && elapsed_secs >= tuning.runner_unlock_secs {
        unlocked.push(Archetype::Runner);
    }
    unlocked
}

/// Uniform angle, uniform distance in `[radius_min, radius_max]` around `center`.
pub fn spawn_position<R: Rng + ?Sized>(center: Vec3, tuning: &SpawnTuning, rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    let radius = if tuning.radius_max > tuning.radius_min {
        rng.gen_range(tuning.radius_min..tuning.radius_max)
    } else {
        tuning.radius_min
    };
    Vec3::new(
        center.x + angle.cos() * radius,
        0.0,
        center.z + angle.sin() * radius,
    )
}

/// An enemy the director wants placed this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub archetype: Archetype,
    pub position: Vec3,
    pub max_health: f32,
}

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    tuning: SpawnTuning,
    elapsed: f32,
    /// Counts up toward the current interval.
    spawn_timer: f32,
    /// Counts down from `tank_interval`.
    tank_timer: f32,
    tanks_spawned: u32,
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self::new(SpawnTuning::default())
    }
}

impl SpawnDirector {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self {
            tuning,
            elapsed: 0.0,
            spawn_timer: 0.0,
            tank_timer: tuning.tank_interval,
            tanks_spawned: 0,
        }
    }

    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn minutes(&self) -> f32 {
        self.elapsed / 60.0
    }

    #[inline]
    pub fn tanks_spawned(&self) -> u32 {
        self.tanks_spawned
    }

    pub fn current_interval(&self) -> f32 {
        spawn_interval(&self.tuning, self.minutes())
    }

    pub fn current_batch_size(&self) -> u32 {
        spawn_batch_size(&self.tuning, self.minutes())
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.tuning);
    }

    fn spawn_batch(&mut self, frame: &mut Frame<'_>) {
        let unlocked = unlocked_archetypes(&self.tuning, self.elapsed);
        if unlocked.is_empty() {
            return;
        }
        let minutes = self.minutes();
        let count = spawn_batch_size(&self.tuning, minutes);

        for _ in 0..count {
            let archetype = unlocked[frame.rng.gen_range(0..unlocked.len())];
            let stats = frame.bestiary.get(archetype);
            let max_health = scaled_health(archetype, stats, &self.tuning, minutes, self.tanks_spawned);
            let position = spawn_position(frame.player.position, &self.tuning, frame.rng);
            frame.spawns.push(SpawnRequest {
                archetype,
                position,
                max_health,
            });
        }
        debug!("spawn batch of {count} at {:.1} min", minutes);
    }

    fn spawn_tank(&mut self, frame: &mut Frame<'_>) {
        self.tanks_spawned += 1;
        let stats = frame.bestiary.get(Archetype::Tank);
        let max_health = scaled_health(
            Archetype::Tank,
            stats,
            &self.tuning,
            self.minutes(),
            self.tanks_spawned,
        );
        let position = spawn_position(frame.player.position, &self.tuning, frame.rng);
        frame.spawns.push(SpawnRequest {
            archetype: Archetype::Tank,
            position,
            max_health,
        });
        info!("tank #{} spawned with {max_health:.0} HP", self.tanks_spawned);
    }
}

impl SimComponent for SpawnDirector {
    fn on_fixed_step(&mut self, frame: &mut Frame<'_>, dt: f32) {
        if !frame.phase.is_playing() {
            return;
        }
        self.elapsed += dt;
        self.spawn_timer += dt;
        self.tank_timer -= dt;

        if self.spawn_timer >= self.current_interval() {
            self.spawn_timer = 0.0;
            self.spawn_batch(frame);
        }

        if self.tuning.spawn_tank && self.tank_timer <= 0.0 {
            self.tank_timer = self.tuning.tank_interval;
            self.spawn_tank(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::Bestiary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn interval_shrinks_to_its_floor() {
        let tuning = SpawnTuning::default();
        assert!((spawn_interval(&tuning, 0.0) - 2.0).abs() < 1e-6);
        assert!((spawn_interval(&tuning, 4.0) - 1.4).abs() < 1e-5);
        assert!((spawn_interval(&tuning, 10.0) - 0.55).abs() < 1e-6);
        assert!((spawn_interval(&tuning, 100.0) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn batch_grows_five_per_minute() {
        let tuning = SpawnTuning::default();
        assert_eq!(spawn_batch_size(&tuning, 0.0), 3);
        assert_eq!(spawn_batch_size(&tuning, 0.19), 3);
        assert_eq!(spawn_batch_size(&tuning, 0.25), 4);
        assert_eq!(spawn_batch_size(&tuning, 2.0), 13);
    }

    #[test]
    fn tank_health_ignores_time() {
        let tuning = SpawnTuning::default();
        let tank = Bestiary::default().tank;
        assert_eq!(scaled_health(Archetype::Tank, &tank, &tuning, 0.0, 1), 500.0);
        assert_eq!(scaled_health(Archetype::Tank, &tank, &tuning, 7.0, 2), 700.0);
        assert_eq!(scaled_health(Archetype::Tank, &tank, &tuning, 30.0, 3), 900.0);
    }

    #[test]
    fn regular_health_scales_with_minutes() {
        let tuning = SpawnTuning::default();
        let chaser = Bestiary::default().chaser;
        let health = scaled_health(Archetype::Chaser, &chaser, &tuning, 2.0, 5);
        assert!((health - 30.0 * 1.3).abs() < 1e-4);

        let pinned = ArchetypeStats {
            ignore_health_scaling: true,
            ..chaser
        };
        assert_eq!(scaled_health(Archetype::Chaser, &pinned, &tuning, 9.0, 0), 30.0);
    }

    #[test]
    fn unlocks_follow_elapsed_time() {
        let tuning = SpawnTuning::default();
        assert_eq!(unlocked_archetypes(&tuning, 0.0), vec![Archetype::Chaser]);
        assert_eq!(
            unlocked_archetypes(&tuning, 120.0),
            vec![Archetype::Chaser, Archetype::Shooter]
        );
        assert_eq!(unlocked_archetypes(&tuning, 240.0).len(), 3);

        let none = SpawnTuning {
            spawn_chaser: false,
            ..tuning
        };
        assert!(unlocked_archetypes(&none, 60.0).is_empty());
    }

    #[test]
    fn spawn_positions_stay_in_ring() {
        let tuning = SpawnTuning::default();
        let mut rng = StdRng::seed_from_u64(77);
        let center = Vec3::new(3.0, 0.0, -4.0);
        for _ in 0..1_000 {
            let d = spawn_position(center, &tuning, &mut rng).distance(center);
            assert!(d >= tuning.radius_min - 1e-4 && d <= tuning.radius_max + 1e-4);
        }
    }
}
