//! Experience orbs: drop rolls and magnet attraction.
//!
//! Orbs sit still until the player comes within MagnetRange, after which they
//! home in at a fixed speed and never let go.  Collection itself is a contact
//! resolved by the session.

use crate::constants::*;
use crate::context::{Frame, SimComponent};
use crate::enemy::{planar_distance, Archetype, Defeat};
use crate::events::{Outbox, SessionEvent};
use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrbId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbSize {
    Small,
    Medium,
    Large,
}

/// Drop probabilities and orb values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTable {
    pub small_percent: u32,
    pub medium_percent: u32,
    pub small_value: u32,
    pub medium_value: u32,
    pub large_value: u32,
}

impl Default for DropTable {
    fn default() -> Self {
        Self {
            small_percent: SMALL_ORB_PERCENT,
            medium_percent: MEDIUM_ORB_PERCENT,
            small_value: SMALL_ORB_VALUE,
            medium_value: MEDIUM_ORB_VALUE,
            large_value: LARGE_ORB_VALUE,
        }
    }
}

impl DropTable {
    /// Size and value of the orb left by `defeat`.
    ///
    /// Tanks always leave a large orb worth their experience reward.  Other
    /// archetypes roll `0..100` against the small and medium bands.
    pub fn roll<R: Rng + ?Sized>(&self, defeat: &Defeat, rng: &mut R) -> (OrbSize, u32) {
        if defeat.archetype == Archetype::Tank {
            return (OrbSize::Large, defeat.experience_reward);
        }
        self.size_for_roll(rng.gen_range(0..100))
    }

    /// Map a percentile roll onto a size band.
    pub fn size_for_roll(&self, roll: u32) -> (OrbSize, u32) {
        let small = self.small_percent;
        let medium = small.saturating_add(self.medium_percent);
        if roll < small {
            (OrbSize::Small, self.small_value)
        } else if roll < medium {
            (OrbSize::Medium, self.medium_value)
        } else {
            (OrbSize::Large, self.large_value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbTuning {
    pub follow_speed: f32,
}

impl Default for OrbTuning {
    fn default() -> Self {
        Self {
            follow_speed: ORB_FOLLOW_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub id: OrbId,
    pub size: OrbSize,
    pub value: u32,
    pub position: Vec3,
    /// Latched once the player enters MagnetRange.
    pub attracted: bool,
}

/// Every orb on the ground.
#[derive(Debug, Clone, Default)]
pub struct OrbField {
    orbs: Vec<Orb>,
    next_id: u32,
    tuning: OrbTuning,
}

impl OrbField {
    pub fn new(tuning: OrbTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }

    pub fn drop_orb(&mut self, size: OrbSize, value: u32, position: Vec3, outbox: &mut Outbox) -> OrbId {
        let id = OrbId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.orbs.push(Orb {
            id,
            size,
            value,
            position,
            attracted: false,
        });
        outbox.push(SessionEvent::OrbDropped {
            id,
            size,
            value,
            position,
        });
        id
    }

    /// Remove an orb, returning it if it was still on the ground.
    pub fn collect(&mut self, id: OrbId, outbox: &mut Outbox) -> Option<Orb> {
        let index = self.orbs.iter().position(|o| o.id == id)?;
        let orb = self.orbs.swap_remove(index);
        outbox.push(SessionEvent::OrbCollected {
            id,
            value: orb.value,
        });
        Some(orb)
    }

    pub fn clear(&mut self) {
        self.orbs.clear();
        self.next_id = 0;
    }
}

impl SimComponent for OrbField {
    fn on_fixed_step(&mut self, frame: &mut Frame<'_>, dt: f32) {
        if !frame.phase.is_playing() || !frame.player.alive {
            return;
        }
        let target = frame.player.position;
        let range = frame.player.magnet_range;

        for orb in &mut self.orbs {
            if !orb.attracted && planar_distance(orb.position, target) <= range {
                orb.attracted = true;
            }
            if orb.attracted {
                let to_player = target - orb.position;
                let step = self.tuning.follow_speed * dt;
                if to_player.length() <= step {
                    orb.position = target;
                } else {
                    orb.position += to_player.normalize_or_zero() * step;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn defeat(archetype: Archetype) -> Defeat {
        Defeat {
            id: EnemyId(0),
            archetype,
            position: Vec3::ZERO,
            experience_reward: if archetype == Archetype::Tank { 500 } else { 5 },
        }
    }

    #[test]
    fn roll_bands_follow_percentages() {
        let table = DropTable::default();
        assert_eq!(table.size_for_roll(0), (OrbSize::Small, 5));
        assert_eq!(table.size_for_roll(59), (OrbSize::Small, 5));
        assert_eq!(table.size_for_roll(60), (OrbSize::Medium, 20));
        assert_eq!(table.size_for_roll(89), (OrbSize::Medium, 20));
        assert_eq!(table.size_for_roll(90), (OrbSize::Large, 100));
        assert_eq!(table.size_for_roll(99), (OrbSize::Large, 100));
    }

    #[test]
    fn tanks_always_drop_large() {
        let table = DropTable::default();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            assert_eq!(table.roll(&defeat(Archetype::Tank), &mut rng), (OrbSize::Large, 500));
        }
    }

    #[test]
    fn regular_drop_distribution_is_roughly_60_30_10() {
        let table = DropTable::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut counts = [0_u32; 3];
        for _ in 0..10_000 {
            match table.roll(&defeat(Archetype::Chaser), &mut rng).0 {
                OrbSize::Small => counts[0] += 1,
                OrbSize::Medium => counts[1] += 1,
                OrbSize::Large => counts[2] += 1,
            }
        }
        assert!((5_700..6_300).contains(&counts[0]), "{counts:?}");
        assert!((2_700..3_300).contains(&counts[1]), "{counts:?}");
        assert!((800..1_200).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn collect_removes_once() {
        let mut field = OrbField::default();
        let mut outbox = Outbox::default();
        let id = field.drop_orb(OrbSize::Small, 5, Vec3::ZERO, &mut outbox);
        assert_eq!(field.collect(id, &mut outbox).map(|o| o.value), Some(5));
        assert!(field.collect(id, &mut outbox).is_none());
    }
}
