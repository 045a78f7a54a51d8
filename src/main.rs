use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use holdout::config::{self, GameConfig};
use holdout::simulation::{self, SessionPlugin};
use holdout::testing::{self, Scenario, ScenarioConfig};
use std::env;
use std::time::Duration;

/// Simulated seconds per frame in scenario runs.
const SCENARIO_FRAME_SECS: f64 = 0.02;

fn main() {
    // Headless scenario selection; defaults to the soak run
    let scenario_name = env::var("HOLDOUT_SCENARIO").unwrap_or_else(|_| "soak".to_string());
    let scenario = Scenario::from_name(&scenario_name).unwrap_or_else(|| {
        eprintln!("unknown scenario '{scenario_name}', running soak");
        Scenario::Soak
    });

    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        StatesPlugin,
        LogPlugin::default(),
    ))
    // Every frame advances the clock by the same amount so runs are
    // reproducible for a fixed seed.
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        SCENARIO_FRAME_SECS,
    )))
    // Compiled defaults; load_game_config overwrites them from
    // assets/game.toml (if present) before the session is installed.
    .insert_resource(GameConfig::default())
    .add_systems(PreStartup, config::load_game_config)
    .add_plugins(SessionPlugin)
    .insert_resource(ScenarioConfig::new(scenario))
    .add_systems(PostStartup, testing::setup_scenario_system)
    .add_systems(
        Update,
        testing::autopilot_system.before(simulation::keyboard_input_system),
    )
    .add_systems(
        PostUpdate,
        (
            testing::scenario_observer_system,
            testing::scenario_report_system,
        )
            .chain(),
    );

    println!("Running scenario: {}", scenario.name());
    app.run();
}
