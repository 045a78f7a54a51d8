//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] grouping every tunable of the
//! simulation.  At startup, [`load_game_config`] reads `assets/game.toml` and
//! overwrites the defaults with any values present in the file.  Missing keys
//! fall back to the compile-time defaults, so a minimal TOML can override just
//! the values you care about.
//!
//! ## Sections
//!
//! | Table | Type |
//! |-------|------|
//! | `[player]` | [`PlayerStats`] |
//! | `[weapon]` | [`WeaponTuning`] |
//! | `[enemies.chaser]` … `[enemies.tank]` | [`crate::enemy::ArchetypeStats`] |
//! | `[drops]` | [`DropTable`] |
//! | `[orbs]` | [`OrbTuning`] |
//! | `[spawn]` | [`SpawnTuning`] |
//! | `[contacts]` | [`ContactRadii`] |
//! | `[[upgrades]]` | [`UpgradeConfig`], replaces the whole catalog |
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::collision::ContactRadii;
use crate::constants::*;
use crate::enemy::Bestiary;
use crate::error::{ConfigError, ConfigResult};
use crate::pickup::{DropTable, OrbTuning};
use crate::player::WeaponTuning;
use crate::spawner::SpawnTuning;
use crate::stats::PlayerStats;
use crate::upgrade::{UpgradeCatalog, UpgradeConfig};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "assets/game.toml";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,

    // ── Scheduling ────────────────────────────────────────────────────────────
    pub fixed_timestep: f32,
    pub max_substeps: u32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player: PlayerStats,
    pub initial_next_level_xp: f32,
    pub weapon: WeaponTuning,

    // ── World ─────────────────────────────────────────────────────────────────
    pub enemies: Bestiary,
    pub drops: DropTable,
    pub orbs: OrbTuning,
    pub spawn: SpawnTuning,
    pub contacts: ContactRadii,

    // ── Level-Up ──────────────────────────────────────────────────────────────
    pub upgrades: Vec<UpgradeConfig>,
    pub offers_per_level: usize,
    pub forfeit_heal_fraction: f32,

    // ── Presentation ──────────────────────────────────────────────────────────
    pub aim_line_length: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fixed_timestep: FIXED_TIMESTEP,
            max_substeps: MAX_SUBSTEPS,
            player: PlayerStats::default(),
            initial_next_level_xp: INITIAL_NEXT_LEVEL_XP,
            weapon: WeaponTuning::default(),
            enemies: Bestiary::default(),
            drops: DropTable::default(),
            orbs: OrbTuning::default(),
            spawn: SpawnTuning::default(),
            contacts: ContactRadii::default(),
            upgrades: UpgradeCatalog::standard().entries().to_vec(),
            offers_per_level: OFFERS_PER_LEVEL,
            forfeit_heal_fraction: FORFEIT_HEAL_FRACTION,
            aim_line_length: AIM_LINE_LENGTH,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Every problem found in the values; empty when the config is usable
    /// as-is.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        let positive: [(&'static str, f32, &'static str); 6] = [
            ("fixed_timestep", self.fixed_timestep, "falls back to the default step"),
            ("weapon.projectile_speed", self.weapon.projectile_speed, "shots never move"),
            ("weapon.projectile_lifetime", self.weapon.projectile_lifetime, "shots vanish at once"),
            ("spawn.min_interval", self.spawn.min_interval, "raised to the default floor"),
            ("spawn.tank_interval", self.spawn.tank_interval, "raised to the default interval"),
            ("initial_next_level_xp", self.initial_next_level_xp, "raised to 1"),
        ];
        for (name, value, consequence) in positive {
            if !(value > 0.0) {
                problems.push(ConfigError::NonPositive {
                    name,
                    value,
                    consequence,
                });
            }
        }

        if self.spawn.radius_min > self.spawn.radius_max {
            problems.push(ConfigError::InvertedSpawnRadius {
                min: self.spawn.radius_min,
                max: self.spawn.radius_max,
            });
        }
        if !(self.spawn.spawn_chaser || self.spawn.spawn_shooter || self.spawn.spawn_runner) {
            problems.push(ConfigError::NoRegularArchetypes);
        }

        if self.upgrades.is_empty() {
            problems.push(ConfigError::EmptyCatalog);
        }
        for entry in self.upgrades.iter().filter(|entry| entry.weight == 0) {
            problems.push(ConfigError::ZeroWeightUpgrade {
                name: entry.name.clone(),
            });
        }

        problems
    }

    /// Copy with every value forced back into a usable range.
    pub fn sanitized(mut self) -> Self {
        if !(self.fixed_timestep > 0.0) {
            self.fixed_timestep = FIXED_TIMESTEP;
        }
        self.max_substeps = self.max_substeps.max(1);
        self.player = self.player.sanitized();
        self.initial_next_level_xp = self.initial_next_level_xp.max(1.0);
        self.forfeit_heal_fraction = self.forfeit_heal_fraction.clamp(0.0, 1.0);

        if !(self.spawn.min_interval > 0.0) {
            self.spawn.min_interval = MIN_SPAWN_INTERVAL;
        }
        if !(self.spawn.tank_interval > 0.0) {
            self.spawn.tank_interval = TANK_SPAWN_INTERVAL;
        }
        if self.spawn.radius_min > self.spawn.radius_max {
            std::mem::swap(&mut self.spawn.radius_min, &mut self.spawn.radius_max);
        }
        self.spawn.radius_min = self.spawn.radius_min.max(0.0);

        let drop_total = self.drops.small_percent.saturating_add(self.drops.medium_percent);
        if drop_total > 100 {
            self.drops.medium_percent = 100_u32.saturating_sub(self.drops.small_percent);
        }
        self
    }
}

/// PreStartup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// A missing file keeps the compiled defaults.  Parse errors are logged and
/// also keep the defaults.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    match GameConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(loaded) => {
            for problem in loaded.validate() {
                warn!("{DEFAULT_CONFIG_PATH}: {problem}");
            }
            *config = loaded;
            info!("loaded game config from {DEFAULT_CONFIG_PATH}");
        }
        Err(ConfigError::Io { .. }) => {
            info!("no {DEFAULT_CONFIG_PATH} found; using compiled defaults");
        }
        Err(e) => {
            error!("failed to parse {DEFAULT_CONFIG_PATH}: {e}; using defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upgrade::UpgradeKind;

    #[test]
    fn defaults_validate_cleanly() {
        assert!(GameConfig::default().validate().is_empty());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 42
            offers_per_level = 2

            [player]
            max_hp = 200.0

            [spawn]
            tank_interval = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.offers_per_level, 2);
        assert_eq!(config.player.max_hp, 200.0);
        assert_eq!(config.player.move_speed, PLAYER_MOVE_SPEED);
        assert_eq!(config.spawn.tank_interval, 30.0);
        assert_eq!(config.spawn.initial_batch, INITIAL_SPAWN_BATCH);
        assert_eq!(config.upgrades.len(), UpgradeKind::ALL.len());
    }

    #[test]
    fn upgrade_tables_replace_the_catalog() {
        let config = GameConfig::from_toml_str(
            r#"
            [[upgrades]]
            kind = "MaxHp"
            amount = 25.0
            weight = 4
            name = "Thick Skin"

            [[upgrades]]
            kind = "PiercingShot"
            amount = 1.0
            weight = 0
            max_level = 1
            name = "Drill"
            "#,
        )
        .unwrap();

        assert_eq!(config.upgrades.len(), 2);
        assert_eq!(config.upgrades[0].max_level, 0);
        let problems = config.validate();
        assert!(matches!(
            problems.as_slice(),
            [ConfigError::ZeroWeightUpgrade { name }] if name == "Drill"
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = GameConfig::from_toml_str("fixed_timestep = \"fast\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = GameConfig::load("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn sanitized_repairs_bad_values() {
        let mut config = GameConfig {
            fixed_timestep: 0.0,
            max_substeps: 0,
            ..GameConfig::default()
        };
        config.spawn.radius_min = 20.0;
        config.spawn.radius_max = 5.0;
        config.drops.small_percent = 80;

        assert!(!config.validate().is_empty());
        let fixed = config.sanitized();
        assert_eq!(fixed.fixed_timestep, FIXED_TIMESTEP);
        assert_eq!(fixed.max_substeps, 1);
        assert!(fixed.spawn.radius_min <= fixed.spawn.radius_max);
        assert_eq!(fixed.drops.medium_percent, 20);
    }
}
