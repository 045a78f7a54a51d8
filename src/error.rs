//! Configuration error types.
//!
//! Nothing in the running simulation is fatal.  Problems found while loading or
//! validating [`crate::config::GameConfig`] are reported through
//! [`ConfigError`]; the session logs each one and disables or repairs the
//! dependent feature instead of aborting.
//!
//! ## Usage
//!
//! ```rust
//! use holdout::config::GameConfig;
//!
//! let config = GameConfig::default();
//! for problem in config.validate() {
//!     eprintln!("config: {problem}");
//! }
//! ```

use thiserror::Error;

/// Everything that can be wrong with a game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No upgrade entries are configured; every level-up offers an empty list.
    #[error("upgrade catalog is empty; level-ups will offer no upgrades")]
    EmptyCatalog,

    /// A catalog entry can never be drawn.
    #[error("upgrade '{name}' has zero weight and will never be offered")]
    ZeroWeightUpgrade { name: String },

    /// A setting that must be strictly positive is not.
    #[error("{name} = {value} must be positive; {consequence}")]
    NonPositive {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The rejected value.
        value: f32,
        /// What the session does instead.
        consequence: &'static str,
    },

    /// `spawn.radius_min` is larger than `spawn.radius_max`.
    #[error("spawn radius range is inverted (min {min} > max {max}); bounds will be swapped")]
    InvertedSpawnRadius { min: f32, max: f32 },

    /// Chaser, Shooter and Runner are all toggled off.
    #[error("no regular archetype is enabled; only tanks will spawn")]
    NoRegularArchetypes,
}

/// Convenience alias: a `Result` using [`ConfigError`] as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;
