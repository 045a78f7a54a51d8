//! Contacts between the player, enemies, projectiles, and orbs.
//!
//! The session resolves a list of [`Contact`]s once per fixed step.  A host
//! with its own physics reports them through
//! [`crate::context::SessionContext::report_contact`]; otherwise the built-in
//! [`OverlapDetector`] finds them with simple circle tests on the ground plane.

use crate::constants::*;
use crate::enemy::{planar_distance, Archetype, EnemyId, EnemyRoster, ShotId};
use crate::pickup::{OrbField, OrbId};
use crate::player::{Player, ProjectileId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// A player projectile overlaps an enemy.
    ProjectileEnemy {
        projectile: ProjectileId,
        enemy: EnemyId,
    },
    /// An enemy started touching the player.
    EnemyTouch { enemy: EnemyId },
    /// An enemy stopped touching the player.
    EnemyRelease { enemy: EnemyId },
    /// A hostile shot reached the player.
    ShotPlayer { shot: ShotId },
    /// The player is close enough to pick up an orb.
    OrbPlayer { orb: OrbId },
}

impl Contact {
    /// Orb pickups still count while the level-up screen is open.
    #[inline]
    pub fn is_pickup(&self) -> bool {
        matches!(self, Contact::OrbPlayer { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRadii {
    /// Run the built-in detector each fixed step.
    pub builtin: bool,
    pub player: f32,
    pub enemy: f32,
    pub tank: f32,
    pub projectile: f32,
    pub orb: f32,
}

impl Default for ContactRadii {
    fn default() -> Self {
        Self {
            builtin: true,
            player: PLAYER_CONTACT_RADIUS,
            enemy: ENEMY_CONTACT_RADIUS,
            tank: TANK_CONTACT_RADIUS,
            projectile: PROJECTILE_CONTACT_RADIUS,
            orb: ORB_CONTACT_RADIUS,
        }
    }
}

impl ContactRadii {
    #[inline]
    pub fn enemy_radius(&self, archetype: Archetype) -> f32 {
        match archetype {
            Archetype::Tank => self.tank,
            _ => self.enemy,
        }
    }
}

/// Brute-force circle overlap tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapDetector {
    pub radii: ContactRadii,
}

impl OverlapDetector {
    pub fn new(radii: ContactRadii) -> Self {
        Self { radii }
    }

    pub fn detect(&self, player: &Player, roster: &EnemyRoster, orbs: &OrbField) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let r = &self.radii;

        for projectile in player.projectiles() {
            for enemy in roster.enemies() {
                if projectile.has_struck(enemy.id) {
                    continue;
                }
                let reach = r.projectile + r.enemy_radius(enemy.archetype);
                if planar_distance(projectile.position, enemy.position) <= reach {
                    contacts.push(Contact::ProjectileEnemy {
                        projectile: projectile.id,
                        enemy: enemy.id,
                    });
                }
            }
        }

        if !player.is_alive() {
            return contacts;
        }
        let at = player.position();

        for enemy in roster.enemies() {
            let overlapping =
                planar_distance(at, enemy.position) <= r.player + r.enemy_radius(enemy.archetype);
            match (overlapping, enemy.touching_player) {
                (true, false) => contacts.push(Contact::EnemyTouch { enemy: enemy.id }),
                (false, true) => contacts.push(Contact::EnemyRelease { enemy: enemy.id }),
                _ => {}
            }
        }

        for shot in roster.shots() {
            if planar_distance(at, shot.position) <= r.player + r.projectile {
                contacts.push(Contact::ShotPlayer { shot: shot.id });
            }
        }

        for orb in orbs.orbs() {
            if planar_distance(at, orb.position) <= r.player + r.orb {
                contacts.push(Contact::OrbPlayer { orb: orb.id });
            }
        }

        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outbox;
    use crate::pickup::OrbSize;
    use crate::player::WeaponTuning;
    use crate::stats::PlayerStats;
    use bevy::math::Vec3;

    fn player() -> Player {
        Player::new(PlayerStats::default(), 100.0, WeaponTuning::default())
    }

    #[test]
    fn enemy_touch_is_reported_on_entry_and_release_on_exit() {
        let detector = OverlapDetector::default();
        let mut outbox = Outbox::default();
        let mut roster = EnemyRoster::default();
        let p = player();
        let orbs = OrbField::default();
        let id = roster.spawn(Archetype::Chaser, Vec3::new(0.8, 0.0, 0.0), 30.0, &mut outbox);

        let contacts = detector.detect(&p, &roster, &orbs);
        assert_eq!(contacts, vec![Contact::EnemyTouch { enemy: id }]);

        roster.begin_contact(id, &crate::enemy::Bestiary::default());
        assert!(detector.detect(&p, &roster, &orbs).is_empty());

        roster.enemy_mut(id).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(
            detector.detect(&p, &roster, &orbs),
            vec![Contact::EnemyRelease { enemy: id }]
        );
    }

    #[test]
    fn tank_has_a_wider_reach() {
        let detector = OverlapDetector::default();
        let mut outbox = Outbox::default();
        let mut roster = EnemyRoster::default();
        let orbs = OrbField::default();
        roster.spawn(Archetype::Chaser, Vec3::new(1.3, 0.0, 0.0), 30.0, &mut outbox);
        let tank = roster.spawn(Archetype::Tank, Vec3::new(0.0, 0.0, 1.3), 500.0, &mut outbox);

        let contacts = detector.detect(&player(), &roster, &orbs);
        assert_eq!(contacts, vec![Contact::EnemyTouch { enemy: tank }]);
    }

    #[test]
    fn nearby_orbs_are_reported() {
        let detector = OverlapDetector::default();
        let mut outbox = Outbox::default();
        let mut orbs = OrbField::default();
        let near = orbs.drop_orb(OrbSize::Small, 5, Vec3::new(0.5, 0.0, 0.0), &mut outbox);
        orbs.drop_orb(OrbSize::Small, 5, Vec3::new(3.0, 0.0, 0.0), &mut outbox);

        let contacts = detector.detect(&player(), &EnemyRoster::default(), &orbs);
        assert_eq!(contacts, vec![Contact::OrbPlayer { orb: near }]);
    }
}
