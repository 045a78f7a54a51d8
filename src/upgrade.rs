//! Upgrade catalog and the weighted offer selector.
//!
//! ## Selection
//!
//! 1. Drop every entry whose `max_level` is nonzero and already reached.
//! 2. Repeat `count` times: sum the remaining weights, draw an integer in
//!    `[0, total)`, walk the pool subtracting weights until the remainder goes
//!    negative, take that entry out of the pool.
//! 3. Stop early when the pool is empty or its total weight is 0.
//!
//! Zero-weight entries therefore stay in the pool but are never reached by
//! the walk.

use crate::constants::{BURST_SHOT_CAP, SPREAD_SHOT_CAP};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which stat or weapon modifier an upgrade changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    MaxHp,
    MoveSpeed,
    MagnetRange,
    AttackDamage,
    AttackDelay,
    CriticalChance,
    CriticalMultiplier,
    ReloadTime,
    BurstShot,
    SpreadShot,
    PiercingShot,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 11] = [
        UpgradeKind::MaxHp,
        UpgradeKind::MoveSpeed,
        UpgradeKind::MagnetRange,
        UpgradeKind::AttackDamage,
        UpgradeKind::AttackDelay,
        UpgradeKind::CriticalChance,
        UpgradeKind::CriticalMultiplier,
        UpgradeKind::ReloadTime,
        UpgradeKind::BurstShot,
        UpgradeKind::SpreadShot,
        UpgradeKind::PiercingShot,
    ];
}

/// One static catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    pub kind: UpgradeKind,
    /// Additive delta, or the fractional factor for multiplicative kinds
    /// (`0.1` means ±10 %).  Ignored for [`UpgradeKind::PiercingShot`].
    pub amount: f32,
    pub weight: u32,
    /// Highest level this upgrade can reach; `0` means unlimited.
    #[serde(default)]
    pub max_level: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl UpgradeConfig {
    pub fn new(
        kind: UpgradeKind,
        amount: f32,
        weight: u32,
        max_level: u32,
        name: &str,
        description: &str,
    ) -> Self {
        Self {
            kind,
            amount,
            weight,
            max_level,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Whether `current_level` already sits at this entry's cap.
    #[inline]
    pub fn is_maxed(&self, current_level: u32) -> bool {
        self.max_level > 0 && current_level >= self.max_level
    }
}

/// An upgrade presented to the player as a selectable card.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeOffer {
    pub kind: UpgradeKind,
    pub amount: f32,
    pub name: String,
    pub description: String,
}

impl From<&UpgradeConfig> for UpgradeOffer {
    fn from(config: &UpgradeConfig) -> Self {
        Self {
            kind: config.kind,
            amount: config.amount,
            name: config.name.clone(),
            description: config.description.clone(),
        }
    }
}

/// The live set of upgrades the selector draws from.
#[derive(Debug, Clone, Default)]
pub struct UpgradeCatalog {
    entries: Vec<UpgradeConfig>,
}

impl UpgradeCatalog {
    pub fn new(entries: Vec<UpgradeConfig>) -> Self {
        Self { entries }
    }

    /// The default catalog shipped with the game.
    pub fn standard() -> Self {
        Self::new(standard_upgrades())
    }

    pub fn entries(&self) -> &[UpgradeConfig] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still below their level cap.
    ///
    /// `level_of` reports the player's current level for an entry.
    pub fn eligible<F>(&self, level_of: F) -> Vec<&UpgradeConfig>
    where
        F: Fn(&UpgradeConfig) -> u32,
    {
        self.entries
            .iter()
            .filter(|entry| !entry.is_maxed(level_of(*entry)))
            .collect()
    }

    /// Draw up to `count` distinct offers by weight, skipping capped entries.
    pub fn select_offers<F, R>(&self, count: usize, level_of: F, rng: &mut R) -> Vec<UpgradeOffer>
    where
        F: Fn(&UpgradeConfig) -> u32,
        R: Rng + ?Sized,
    {
        let mut pool = self.eligible(level_of);
        draw_weighted(&mut pool, count, |entry| entry.weight, rng)
            .into_iter()
            .map(UpgradeOffer::from)
            .collect()
    }
}

/// Weighted sampling without replacement.
///
/// Selected items are removed from `pool` and returned in draw order.
pub fn draw_weighted<T, W, R>(pool: &mut Vec<T>, count: usize, weight: W, rng: &mut R) -> Vec<T>
where
    W: Fn(&T) -> u32,
    R: Rng + ?Sized,
{
    let mut picked = Vec::with_capacity(count.min(pool.len()));

    for _ in 0..count {
        if pool.is_empty() {
            break;
        }
        let total: u64 = pool.iter().map(|item| weight(item) as u64).sum();
        if total == 0 {
            break;
        }

        let mut remainder = rng.gen_range(0..total) as i64;
        let mut chosen = None;
        for (index, item) in pool.iter().enumerate() {
            remainder -= weight(item) as i64;
            if remainder < 0 {
                chosen = Some(index);
                break;
            }
        }

        match chosen {
            Some(index) => picked.push(pool.remove(index)),
            None => break,
        }
    }

    picked
}

fn standard_upgrades() -> Vec<UpgradeConfig> {
    use UpgradeKind::*;
    vec![
        UpgradeConfig::new(MaxHp, 20.0, 12, 15, "Vitality", "Max HP +20."),
        UpgradeConfig::new(MoveSpeed, 0.1, 8, 10, "Fleet Foot", "Move speed +0.1 m/s."),
        UpgradeConfig::new(MagnetRange, 0.5, 6, 5, "Magnetism", "Pickup magnet range +0.5 m."),
        UpgradeConfig::new(AttackDamage, 0.1, 10, 15, "Hollow Points", "Attack damage +10%."),
        UpgradeConfig::new(AttackDelay, 0.1, 10, 15, "Hair Trigger", "Attack delay -10%."),
        UpgradeConfig::new(CriticalChance, 0.06, 8, 15, "Keen Eye", "Critical chance +6%."),
        UpgradeConfig::new(
            CriticalMultiplier,
            0.25,
            6,
            10,
            "Deadly Aim",
            "Critical multiplier +0.25x.",
        ),
        UpgradeConfig::new(ReloadTime, 0.1, 8, 15, "Speed Loader", "Reload time -10%."),
        UpgradeConfig::new(
            BurstShot,
            1.0,
            3,
            BURST_SHOT_CAP,
            "Burst Fire",
            "Each trigger pull fires one more shot.",
        ),
        UpgradeConfig::new(
            SpreadShot,
            1.0,
            3,
            SPREAD_SHOT_CAP,
            "Scattershot",
            "Each shot fires one more projectile.",
        ),
        UpgradeConfig::new(
            PiercingShot,
            1.0,
            2,
            1,
            "Piercing Rounds",
            "Projectiles pass through enemies.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(kind: UpgradeKind, weight: u32, max_level: u32) -> UpgradeConfig {
        UpgradeConfig::new(kind, 1.0, weight, max_level, "test", "")
    }

    #[test]
    fn zero_weight_entry_is_never_selected() {
        let catalog = UpgradeCatalog::new(vec![
            entry(UpgradeKind::MaxHp, 10, 0),
            entry(UpgradeKind::MoveSpeed, 0, 0),
            entry(UpgradeKind::MagnetRange, 5, 0),
        ]);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let offers = catalog.select_offers(3, |_| 0, &mut rng);
            assert_eq!(offers.len(), 2, "only the two weighted entries can be drawn");
            assert!(offers.iter().all(|o| o.kind != UpgradeKind::MoveSpeed));
        }
    }

    #[test]
    fn maxed_entry_is_excluded_regardless_of_weight() {
        let catalog = UpgradeCatalog::new(vec![
            entry(UpgradeKind::BurstShot, 1_000_000, 3),
            entry(UpgradeKind::MaxHp, 1, 0),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        let level_of = |e: &UpgradeConfig| if e.kind == UpgradeKind::BurstShot { 3 } else { 0 };

        for _ in 0..100 {
            let offers = catalog.select_offers(2, level_of, &mut rng);
            assert_eq!(offers.len(), 1);
            assert_eq!(offers[0].kind, UpgradeKind::MaxHp);
        }
    }

    #[test]
    fn unlimited_entry_is_never_capped() {
        let unlimited = entry(UpgradeKind::MaxHp, 1, 0);
        assert!(!unlimited.is_maxed(u32::MAX));
    }

    #[test]
    fn offers_are_distinct() {
        let catalog = UpgradeCatalog::standard();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let offers = catalog.select_offers(3, |_| 0, &mut rng);
            assert_eq!(offers.len(), 3);
            assert_ne!(offers[0].kind, offers[1].kind);
            assert_ne!(offers[1].kind, offers[2].kind);
            assert_ne!(offers[0].kind, offers[2].kind);
        }
    }

    #[test]
    fn draw_stops_when_pool_is_exhausted() {
        let mut pool = vec![4_u32, 2];
        let mut rng = StdRng::seed_from_u64(1);
        let picked = draw_weighted(&mut pool, 5, |w| *w, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn empty_catalog_offers_nothing() {
        let catalog = UpgradeCatalog::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(catalog.select_offers(3, |_| 0, &mut rng).is_empty());
    }

    #[test]
    fn heavier_entries_are_drawn_first_more_often() {
        let catalog = UpgradeCatalog::new(vec![
            entry(UpgradeKind::MaxHp, 90, 0),
            entry(UpgradeKind::MoveSpeed, 10, 0),
        ]);
        let mut rng = StdRng::seed_from_u64(2024);
        let heavy_first = (0..2000)
            .filter(|_| catalog.select_offers(1, |_| 0, &mut rng)[0].kind == UpgradeKind::MaxHp)
            .count();
        assert!(heavy_first > 1600 && heavy_first < 1950, "got {heavy_first}");
    }
}
