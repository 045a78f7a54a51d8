//! Headless scenarios driven by a simple autopilot.
//!
//! Selected with `HOLDOUT_SCENARIO=<name>` (see `main.rs`).  Each scenario
//! starts a session, lets [`autopilot_system`] play it for `frame_limit`
//! frames, prints a report, and exits.
//!
//! | Scenario | Setup | Passes when |
//! |----------|-------|-------------|
//! | `soak` | fresh session | the session survives or ends cleanly, and at least one enemy spawned |
//! | `level_rush` | 2 000 XP granted up front | every pending level-up is resolved |

use crate::context::SessionContext;
use crate::enemy::planar_distance;
use crate::events::SessionEvent;
use crate::input::InputFrame;
use crate::session::SessionPhase;
use crate::simulation::{HostInput, SessionCommand, SessionMessage};
use bevy::math::Vec2;
use bevy::prelude::*;

/// Enemies closer than this make the autopilot back off.
const KITE_DISTANCE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Soak,
    LevelRush,
}

impl Scenario {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "soak" => Some(Scenario::Soak),
            "level_rush" => Some(Scenario::LevelRush),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Soak => "soak",
            Scenario::LevelRush => "level_rush",
        }
    }

    pub fn frame_limit(self) -> u32 {
        match self {
            // Five minutes at 50 fps: past both unlocks and four tanks.
            Scenario::Soak => 15_000,
            Scenario::LevelRush => 600,
        }
    }
}

/// Scenario bookkeeping.
#[derive(Resource, Debug, Clone)]
pub struct ScenarioConfig {
    pub scenario: Scenario,
    pub frame_limit: u32,
    pub frame_count: u32,
    pub enemies_spawned: u32,
    pub upgrades_taken: u32,
    pub game_over_frame: Option<u32>,
}

impl ScenarioConfig {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            frame_limit: scenario.frame_limit(),
            frame_count: 0,
            enemies_spawned: 0,
            upgrades_taken: 0,
            game_over_frame: None,
        }
    }
}

/// PostStartup system: begin the session and apply scenario-specific setup.
pub fn setup_scenario_system(config: Res<ScenarioConfig>, mut context: ResMut<SessionContext>) {
    if !context.start_session() {
        warn!("scenario {}: session already running", config.scenario.name());
    }
    if config.scenario == Scenario::LevelRush {
        let levels = context.grant_experience(2_000.0);
        info!("level_rush: granted 2000 XP ({levels} levels)");
    }
    info!("scenario {} ready", config.scenario.name());
}

/// Input the autopilot would give for the current state.
///
/// Aims and fires at the nearest enemy, backs away from it when it is close,
/// and otherwise strafes around it.
pub fn autopilot_input(context: &SessionContext) -> InputFrame {
    let origin = context.player().position();
    let nearest = context
        .roster()
        .enemies()
        .iter()
        .min_by(|a, b| {
            planar_distance(origin, a.position).total_cmp(&planar_distance(origin, b.position))
        });

    let Some(target) = nearest else {
        return InputFrame::default();
    };

    let away = Vec2::new(origin.x - target.position.x, origin.z - target.position.z)
        .normalize_or_zero();
    let movement = if planar_distance(origin, target.position) < KITE_DISTANCE {
        away
    } else {
        away.perp()
    };

    InputFrame {
        movement,
        aim_point: Some(target.position),
        fire_held: true,
        pause_requested: false,
    }
}

/// Drive the player and always take the first upgrade card.
pub fn autopilot_system(
    context: Res<SessionContext>,
    mut input: ResMut<HostInput>,
    mut commands: MessageWriter<SessionCommand>,
) {
    match context.phase() {
        SessionPhase::Playing => input.0 = autopilot_input(&context),
        SessionPhase::LevelUp => {
            if context.offers().is_empty() {
                commands.write(SessionCommand::ForfeitUpgrade);
            } else {
                commands.write(SessionCommand::ChooseUpgrade(0));
            }
        }
        _ => input.0 = InputFrame::default(),
    }
}

/// Count frames and session events.
pub fn scenario_observer_system(
    mut config: ResMut<ScenarioConfig>,
    mut messages: MessageReader<SessionMessage>,
) {
    config.frame_count += 1;
    let frame = config.frame_count;
    for SessionMessage(event) in messages.read() {
        match event {
            SessionEvent::EnemySpawned { .. } => config.enemies_spawned += 1,
            SessionEvent::OffersHidden => config.upgrades_taken += 1,
            SessionEvent::PhaseChanged {
                to: SessionPhase::GameOver,
                ..
            } => config.game_over_frame = Some(frame),
            _ => {}
        }
    }
}

/// Print the report and exit once the frame limit is reached.
pub fn scenario_report_system(
    config: Res<ScenarioConfig>,
    context: Res<SessionContext>,
    mut exit: MessageWriter<AppExit>,
) {
    if config.frame_count < config.frame_limit {
        return;
    }

    let progression = context.player().progression();
    let stats = context.player().stats();
    info!("test: {}", config.scenario.name());
    info!("frames: {}", config.frame_count);
    info!(
        "play time: {}",
        crate::events::format_play_time(context.play_time() as u32)
    );
    info!(
        "level {} ({} upgrades taken, {} pending)",
        progression.level, config.upgrades_taken, progression.pending_level_ups
    );
    info!(
        "kills {}, enemies spawned {}, tanks {}",
        context.kills(),
        config.enemies_spawned,
        context.director().tanks_spawned()
    );
    info!("hp {:.0}/{:.0}", stats.current_hp, stats.max_hp);
    if let Some(frame) = config.game_over_frame {
        info!("game over at frame {frame}");
    }

    let pass = match config.scenario {
        Scenario::Soak => config.enemies_spawned > 0,
        Scenario::LevelRush => {
            progression.pending_level_ups == 0 && config.upgrades_taken > 0
        }
    };
    if pass {
        info!("PASS: {}", config.scenario.name());
        exit.write(AppExit::Success);
    } else {
        error!("FAIL: {}", config.scenario.name());
        exit.write(AppExit::error());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::enemy::Archetype;
    use bevy::math::Vec3;

    #[test]
    fn scenario_names_round_trip() {
        for scenario in [Scenario::Soak, Scenario::LevelRush] {
            assert_eq!(Scenario::from_name(scenario.name()), Some(scenario));
        }
        assert_eq!(Scenario::from_name("nope"), None);
    }

    #[test]
    fn autopilot_idles_without_enemies() {
        let context = SessionContext::new(GameConfig::default());
        assert_eq!(autopilot_input(&context), InputFrame::default());
    }

    #[test]
    fn autopilot_backs_away_from_close_enemies() {
        let mut context = SessionContext::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        });
        context.start_session();
        context.spawn_enemy(Archetype::Chaser, Vec3::new(3.0, 0.0, 0.0));
        context.spawn_enemy(Archetype::Chaser, Vec3::new(0.0, 0.0, 12.0));

        let input = autopilot_input(&context);
        assert!(input.fire_held);
        assert_eq!(input.aim_point, Some(Vec3::new(3.0, 0.0, 0.0)));
        assert!(input.movement.x < 0.0);
    }
}
