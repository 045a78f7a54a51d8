//! Headless tests for [`SessionPlugin`].
//!
//! These tests use [`MinimalPlugins`] with no window, input devices, or
//! rendering, so they run fast and deterministically in CI.  Fixed steps are
//! driven by running the `FixedUpdate` schedule by hand.
//!
//! Covered scenarios:
//! 1. The context is installed at startup in `Ready`.
//! 2. `SessionCommand::Start` begins play and the `State` mirror follows.
//! 3. `FixedUpdate` advances the session clock.
//! 4. `HostInput` moves the player.
//! 5. Pause stops the clock and shows the stats panel.
//! 6. Upgrade choice and reported contacts go through commands.
//! 7. `Quit` requests app exit.

use bevy::math::Vec3;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use holdout::collision::{Contact, ContactRadii};
use holdout::config::GameConfig;
use holdout::context::SessionContext;
use holdout::enemy::Archetype;
use holdout::events::{HudUpdate, SessionEvent};
use holdout::input::InputFrame;
use holdout::session::SessionPhase;
use holdout::simulation::{HostInput, SessionCommand, SessionMessage, SessionPlugin};
use holdout::spawner::SpawnTuning;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every event forwarded to the ECS so far.
#[derive(Resource, Default)]
struct Captured(Vec<SessionEvent>);

fn capture_system(mut messages: MessageReader<SessionMessage>, mut captured: ResMut<Captured>) {
    captured
        .0
        .extend(messages.read().map(|message| message.0.clone()));
}

fn quiet_config() -> GameConfig {
    GameConfig {
        seed: Some(5),
        spawn: SpawnTuning {
            spawn_chaser: false,
            spawn_shooter: false,
            spawn_runner: false,
            spawn_tank: false,
            ..SpawnTuning::default()
        },
        ..GameConfig::default()
    }
}

/// Build a headless app with the session installed (one frame already run).
fn session_app(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(config);
    app.add_plugins(SessionPlugin);
    app.init_resource::<Captured>();
    app.add_systems(PostUpdate, capture_system);
    app.update();
    app
}

fn send(app: &mut App, command: SessionCommand) {
    app.world_mut().write_message(command);
    app.update();
}

fn fixed_steps(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn context(app: &App) -> &SessionContext {
    app.world().resource::<SessionContext>()
}

fn captured(app: &App) -> &[SessionEvent] {
    &app.world().resource::<Captured>().0
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The plugin builds the context at startup and both phases read Ready.
#[test]
fn context_is_installed_in_ready() {
    let app = session_app(quiet_config());
    assert_eq!(context(&app).phase(), SessionPhase::Ready);
    assert_eq!(
        *app.world().resource::<State<SessionPhase>>().get(),
        SessionPhase::Ready
    );
}

/// `Start` begins play, forwards the HUD, and the `State` mirror follows a frame later.
#[test]
fn start_command_begins_play_and_mirrors_state() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);
    assert_eq!(context(&app).phase(), SessionPhase::Playing);

    let events = captured(&app);
    assert!(events.contains(&SessionEvent::PhaseChanged {
        from: SessionPhase::Ready,
        to: SessionPhase::Playing,
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::Hud(HudUpdate::Health { .. }))));

    // NextState is applied on the following StateTransition pass.
    app.update();
    assert_eq!(
        *app.world().resource::<State<SessionPhase>>().get(),
        SessionPhase::Playing
    );
}

/// Fifty fixed ticks add one second of play time.
#[test]
fn fixed_update_advances_the_session_clock() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);
    let before = context(&app).play_time();

    fixed_steps(&mut app, 50);
    assert!(context(&app).play_time() - before >= 0.99);
}

/// Movement written to `HostInput` reaches the core on the next fixed steps.
#[test]
fn host_input_moves_the_player() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);

    app.world_mut().resource_mut::<HostInput>().0 = InputFrame {
        movement: Vec2::new(1.0, 0.0),
        ..InputFrame::default()
    };
    app.update();
    fixed_steps(&mut app, 10);

    let position = context(&app).player().position();
    assert!(position.x > 0.9, "moved to {position:?}");
    assert_eq!(position.y, 0.0);
}

/// Pausing freezes the clock and shows the stats panel until toggled back.
#[test]
fn pause_command_stops_the_clock() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);
    send(&mut app, SessionCommand::TogglePause);
    assert_eq!(context(&app).phase(), SessionPhase::Paused);
    assert!(captured(&app)
        .iter()
        .any(|e| matches!(e, SessionEvent::StatsPanel(_))));

    let frozen = context(&app).play_time();
    fixed_steps(&mut app, 20);
    assert_eq!(context(&app).play_time(), frozen);

    send(&mut app, SessionCommand::TogglePause);
    assert_eq!(context(&app).phase(), SessionPhase::Playing);
}

/// Picking a card hides the offers and returns to Playing.
#[test]
fn choose_upgrade_command_resumes_play() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);

    app.world_mut()
        .resource_mut::<SessionContext>()
        .grant_experience(100.0);
    app.update();
    assert_eq!(context(&app).phase(), SessionPhase::LevelUp);
    assert!(captured(&app)
        .iter()
        .any(|e| matches!(e, SessionEvent::OffersPresented(offers) if offers.len() == 3)));

    send(&mut app, SessionCommand::ChooseUpgrade(0));
    assert_eq!(context(&app).phase(), SessionPhase::Playing);
    assert!(captured(&app).contains(&SessionEvent::OffersHidden));
}

/// A contact reported by the host deals its damage on the next fixed step.
#[test]
fn reported_contact_damages_the_player() {
    let mut app = session_app(GameConfig {
        contacts: ContactRadii {
            builtin: false,
            ..ContactRadii::default()
        },
        ..quiet_config()
    });
    send(&mut app, SessionCommand::Start);

    let enemy = app
        .world_mut()
        .resource_mut::<SessionContext>()
        .spawn_enemy(Archetype::Chaser, Vec3::new(20.0, 0.0, 0.0));
    send(&mut app, SessionCommand::ReportContact(Contact::EnemyTouch { enemy }));
    fixed_steps(&mut app, 1);

    let stats = context(&app).player().stats();
    assert_eq!(stats.current_hp, stats.max_hp - 10.0);
}

/// `Quit` resets the session and asks the app to exit cleanly.
#[test]
fn quit_command_requests_app_exit() {
    let mut app = session_app(quiet_config());
    send(&mut app, SessionCommand::Start);
    assert!(app.should_exit().is_none());

    send(&mut app, SessionCommand::Quit);
    assert_eq!(app.should_exit(), Some(AppExit::Success));
    assert_eq!(context(&app).phase(), SessionPhase::Ready);
}
