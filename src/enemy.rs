//! Enemy archetypes, per-archetype behaviour policies, and the live roster.
//!
//! ## Archetypes
//!
//! | Archetype | Policy    | Notes |
//! |-----------|-----------|-------|
//! | Chaser    | pursue    | baseline melee |
//! | Runner    | pursue    | fast, fragile |
//! | Tank      | pursue    | slow, timer-spawned, large orb |
//! | Shooter   | skirmish  | holds a distance band and fires |
//!
//! Behaviour is chosen through [`Archetype::policy`], a plain dispatch table.
//! Every policy faces the player and moves on the ground plane only.

use crate::constants::*;
use crate::context::{Frame, SimComponent};
use crate::events::{AnimationCue, Outbox, SessionEvent, Subject};
use bevy::log::debug;
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identity of a live enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

/// Stable identity of a hostile projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Chaser,
    Shooter,
    Runner,
    Tank,
}

impl Archetype {
    /// Behaviour used every fixed step.
    pub fn policy(self) -> PolicyFn {
        match self {
            Archetype::Chaser | Archetype::Runner | Archetype::Tank => pursue,
            Archetype::Shooter => skirmish,
        }
    }
}

/// Ranged attack parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterProfile {
    pub projectile_damage: f32,
    /// Preferred distance to the player.
    pub range: f32,
    /// Half-width of the hold band around `range`.
    pub hysteresis: f32,
    /// Seconds between shots while holding.
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
}

impl Default for ShooterProfile {
    fn default() -> Self {
        Self {
            projectile_damage: SHOOTER_PROJECTILE_DAMAGE,
            range: SHOOTER_RANGE,
            hysteresis: SHOOTER_HYSTERESIS,
            fire_rate: SHOOTER_FIRE_RATE,
            projectile_speed: SHOOTER_PROJECTILE_SPEED,
            projectile_lifetime: SHOOTER_PROJECTILE_LIFETIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    pub base_max_health: f32,
    pub move_speed: f32,
    pub contact_damage: f32,
    pub experience_reward: u32,
    /// Skip the per-minute health multiplier.
    #[serde(default)]
    pub ignore_health_scaling: bool,
    #[serde(default)]
    pub shooter: Option<ShooterProfile>,
}

impl ArchetypeStats {
    fn melee(base_max_health: f32, move_speed: f32, contact_damage: f32, experience_reward: u32) -> Self {
        Self {
            base_max_health,
            move_speed,
            contact_damage,
            experience_reward,
            ignore_health_scaling: false,
            shooter: None,
        }
    }
}

/// Stats for every archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bestiary {
    pub chaser: ArchetypeStats,
    pub shooter: ArchetypeStats,
    pub runner: ArchetypeStats,
    pub tank: ArchetypeStats,
}

impl Default for Bestiary {
    fn default() -> Self {
        Self {
            chaser: ArchetypeStats::melee(
                CHASER_MAX_HEALTH,
                CHASER_MOVE_SPEED,
                CHASER_CONTACT_DAMAGE,
                REGULAR_EXPERIENCE_REWARD,
            ),
            shooter: ArchetypeStats {
                shooter: Some(ShooterProfile::default()),
                ..ArchetypeStats::melee(
                    SHOOTER_MAX_HEALTH,
                    SHOOTER_MOVE_SPEED,
                    SHOOTER_CONTACT_DAMAGE,
                    REGULAR_EXPERIENCE_REWARD,
                )
            },
            runner: ArchetypeStats::melee(
                RUNNER_MAX_HEALTH,
                RUNNER_MOVE_SPEED,
                RUNNER_CONTACT_DAMAGE,
                REGULAR_EXPERIENCE_REWARD,
            ),
            tank: ArchetypeStats::melee(
                TANK_MAX_HEALTH,
                TANK_MOVE_SPEED,
                TANK_CONTACT_DAMAGE,
                TANK_EXPERIENCE_REWARD,
            ),
        }
    }
}

impl Bestiary {
    pub fn get(&self, archetype: Archetype) -> &ArchetypeStats {
        match archetype {
            Archetype::Chaser => &self.chaser,
            Archetype::Shooter => &self.shooter,
            Archetype::Runner => &self.runner,
            Archetype::Tank => &self.tank,
        }
    }
}

// ── Live State ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub archetype: Archetype,
    pub position: Vec3,
    /// Facing angle around +Y; `0` faces +Z.
    pub yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub fire_timer: f32,
    pub moving: bool,
    /// Set while overlapping the player so contact damage lands once per touch.
    pub touching_player: bool,
}

impl Enemy {
    fn set_moving(&mut self, moving: bool, outbox: &mut Outbox) {
        if self.moving != moving {
            self.moving = moving;
            outbox.animate(Subject::Enemy(self.id), AnimationCue::Moving(moving));
        }
    }

    fn face(&mut self, dir: Vec3) {
        if dir != Vec3::ZERO {
            self.yaw = dir.x.atan2(dir.z);
        }
    }
}

/// A projectile fired by a Shooter.  Does not home.
#[derive(Debug, Clone, PartialEq)]
pub struct HostileShot {
    pub id: ShotId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub age: f32,
    pub lifetime: f32,
}

/// A shot a policy wants fired this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOrder {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub lifetime: f32,
}

/// One fixed-step decision for an enemy.
pub type PolicyFn = fn(&mut Enemy, &ArchetypeStats, Vec3, f32, &mut Outbox) -> Option<ShotOrder>;

/// Unit vector from `from` to `to` on the ground plane.
#[inline]
fn planar_direction(from: Vec3, to: Vec3) -> Vec3 {
    let mut delta = to - from;
    delta.y = 0.0;
    delta.normalize_or_zero()
}

#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let mut delta = b - a;
    delta.y = 0.0;
    delta.length()
}

/// Face the player and walk straight at it.
fn pursue(
    enemy: &mut Enemy,
    stats: &ArchetypeStats,
    target: Vec3,
    dt: f32,
    outbox: &mut Outbox,
) -> Option<ShotOrder> {
    let dir = planar_direction(enemy.position, target);
    enemy.face(dir);
    enemy.position += dir * stats.move_speed * dt;
    enemy.set_moving(dir != Vec3::ZERO, outbox);
    None
}

/// Keep to the band `range ± hysteresis`, firing while inside it.
fn skirmish(
    enemy: &mut Enemy,
    stats: &ArchetypeStats,
    target: Vec3,
    dt: f32,
    outbox: &mut Outbox,
) -> Option<ShotOrder> {
    let Some(profile) = stats.shooter else {
        return pursue(enemy, stats, target, dt, outbox);
    };

    let dir = planar_direction(enemy.position, target);
    enemy.face(dir);
    let distance = planar_distance(enemy.position, target);

    if distance < profile.range - profile.hysteresis {
        enemy.position -= dir * stats.move_speed * dt;
        enemy.set_moving(true, outbox);
        return None;
    }
    if distance > profile.range + profile.hysteresis {
        enemy.position += dir * stats.move_speed * dt;
        enemy.set_moving(true, outbox);
        return None;
    }

    enemy.set_moving(false, outbox);
    enemy.fire_timer += dt;
    if enemy.fire_timer < profile.fire_rate {
        return None;
    }
    enemy.fire_timer = 0.0;
    if dir == Vec3::ZERO {
        return None;
    }

    outbox.animate(Subject::Enemy(enemy.id), AnimationCue::Attack);
    Some(ShotOrder {
        origin: enemy.position,
        velocity: dir * profile.projectile_speed,
        damage: profile.projectile_damage,
        lifetime: profile.projectile_lifetime,
    })
}

/// What the session needs after an enemy dies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defeat {
    pub id: EnemyId,
    pub archetype: Archetype,
    pub position: Vec3,
    pub experience_reward: u32,
}

/// Every live enemy and hostile shot.
#[derive(Debug, Clone, Default)]
pub struct EnemyRoster {
    enemies: Vec<Enemy>,
    shots: Vec<HostileShot>,
    next_enemy_id: u32,
    next_shot_id: u32,
    kills: u32,
}

impl EnemyRoster {
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn shots(&self) -> &[HostileShot] {
        &self.shots
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    #[inline]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Add an enemy at full health.
    pub fn spawn(
        &mut self,
        archetype: Archetype,
        position: Vec3,
        max_health: f32,
        outbox: &mut Outbox,
    ) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let max_health = max_health.max(1.0);

        self.enemies.push(Enemy {
            id,
            archetype,
            position,
            yaw: 0.0,
            health: max_health,
            max_health,
            fire_timer: 0.0,
            moving: false,
            touching_player: false,
        });
        outbox.push(SessionEvent::EnemySpawned {
            id,
            archetype,
            position,
        });
        id
    }

    /// Apply damage; a lethal hit removes the enemy and counts the kill.
    pub fn apply_damage(
        &mut self,
        id: EnemyId,
        amount: f32,
        bestiary: &Bestiary,
        outbox: &mut Outbox,
    ) -> Option<Defeat> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let enemy = &mut self.enemies[index];
        enemy.health = (enemy.health - amount.max(0.0)).max(0.0);

        if enemy.health > 0.0 {
            outbox.animate(Subject::Enemy(id), AnimationCue::Hit);
            return None;
        }

        let enemy = self.enemies.swap_remove(index);
        self.kills += 1;
        outbox.animate(Subject::Enemy(id), AnimationCue::Die);
        outbox.push(SessionEvent::EnemyDestroyed {
            id,
            archetype: enemy.archetype,
            position: enemy.position,
        });
        debug!("{:?} {:?} destroyed (kills: {})", enemy.archetype, id, self.kills);

        Some(Defeat {
            id,
            archetype: enemy.archetype,
            position: enemy.position,
            experience_reward: bestiary.get(enemy.archetype).experience_reward,
        })
    }

    /// Contact damage owed for a new touch, `None` while already touching.
    pub fn begin_contact(&mut self, id: EnemyId, bestiary: &Bestiary) -> Option<f32> {
        let enemy = self.enemies.iter_mut().find(|e| e.id == id)?;
        if enemy.touching_player {
            return None;
        }
        enemy.touching_player = true;
        Some(bestiary.get(enemy.archetype).contact_damage)
    }

    pub fn end_contact(&mut self, id: EnemyId) {
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) {
            enemy.touching_player = false;
        }
    }

    pub fn remove_shot(&mut self, id: ShotId) -> Option<HostileShot> {
        let index = self.shots.iter().position(|s| s.id == id)?;
        Some(self.shots.swap_remove(index))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    fn fire(&mut self, order: ShotOrder) {
        let id = ShotId(self.next_shot_id);
        self.next_shot_id = self.next_shot_id.wrapping_add(1);
        self.shots.push(HostileShot {
            id,
            position: order.origin,
            velocity: order.velocity,
            damage: order.damage,
            age: 0.0,
            lifetime: order.lifetime,
        });
    }

    fn step_shots(&mut self, dt: f32) {
        for shot in &mut self.shots {
            shot.position += shot.velocity * dt;
            shot.age += dt;
        }
        self.shots.retain(|s| s.age < s.lifetime);
    }
}

impl SimComponent for EnemyRoster {
    fn on_fixed_step(&mut self, frame: &mut Frame<'_>, dt: f32) {
        if !frame.phase.is_playing() {
            return;
        }

        let target = frame.player.position;
        let mut orders = Vec::new();
        for enemy in &mut self.enemies {
            let stats = frame.bestiary.get(enemy.archetype);
            if let Some(order) = (enemy.archetype.policy())(enemy, stats, target, dt, frame.outbox) {
                orders.push(order);
            }
        }
        for order in orders {
            self.fire(order);
        }

        self.step_shots(dt);
    }
}
