//! Holdout: simulation core of a top-down survival shooter.
//!
//! The core is plain Rust driven by [`context::SessionContext`]; the
//! [`simulation::SessionPlugin`] hosts it inside a Bevy app.  Rendering,
//! audio, and UI live in the host and listen for [`events::SessionEvent`]s.

pub mod collision;
pub mod config;
pub mod constants;
pub mod context;
pub mod enemy;
pub mod error;
pub mod events;
pub mod input;
pub mod pickup;
pub mod player;
pub mod session;
pub mod simulation;
pub mod spawner;
pub mod stats;
pub mod testing;
pub mod upgrade;
