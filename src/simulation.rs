//! Bevy host for the session core.
//!
//! [`SessionPlugin`] owns a single [`SessionContext`] resource and wires it
//! into the schedule:
//!
//! | Schedule | System | Job |
//! |----------|--------|-----|
//! | `Startup` | [`install_session_system`] | build the context from [`GameConfig`] |
//! | `FixedUpdate` | [`session_fixed_step_system`] | one fixed step per Bevy fixed tick |
//! | `Update` | [`keyboard_input_system`] | fill [`HostInput`] from WASD / mouse / Escape |
//! | `Update` | [`session_command_system`] | apply [`SessionCommand`]s from menus and UI |
//! | `Update` | [`session_frame_system`] | pause handling + variable step |
//! | `Update` | [`forward_session_events_system`] | outbox → [`SessionMessage`] |
//! | `Update` | [`sync_phase_system`] | mirror the phase into `State<SessionPhase>` |
//! | `Update` | [`exit_on_quit_system`] | `QuitRequested` → [`AppExit`] |
//!
//! The `Update` systems run chained in the order above.
//!
//! `State<SessionPhase>` is a read-only mirror for `run_if(in_state(..))`
//! gating in presentation plugins.  Setting `NextState<SessionPhase>`
//! directly does not change the session; send a [`SessionCommand`] instead.
//!
//! The host app must provide `StatesPlugin` (included in `DefaultPlugins`).

use crate::collision::Contact;
use crate::config::GameConfig;
use crate::constants::FIXED_TIMESTEP;
use crate::context::SessionContext;
use crate::events::SessionEvent;
use crate::input::InputFrame;
use crate::session::SessionPhase;
use bevy::app::AppExit;
use bevy::input::ButtonInput;
use bevy::prelude::*;

/// A core event forwarded to the ECS.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct SessionMessage(pub SessionEvent);

/// Requests from menus, overlays, and upgrade cards.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Start,
    Restart,
    ReturnToMenu,
    Quit,
    TogglePause,
    ChooseUpgrade(usize),
    ForfeitUpgrade,
    ReportContact(Contact),
}

/// Input gathered this frame.  Written by [`keyboard_input_system`] when a
/// keyboard is present; other hosts and tests may write it directly.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct HostInput(pub InputFrame);

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<HostInput>()
            .init_state::<SessionPhase>()
            .add_message::<SessionMessage>()
            .add_message::<SessionCommand>()
            .insert_resource(Time::<Fixed>::from_seconds(FIXED_TIMESTEP as f64))
            .add_systems(Startup, install_session_system)
            .add_systems(
                FixedUpdate,
                session_fixed_step_system.run_if(resource_exists::<SessionContext>),
            )
            .add_systems(
                Update,
                (
                    keyboard_input_system,
                    session_command_system,
                    session_frame_system,
                    forward_session_events_system,
                    sync_phase_system,
                    exit_on_quit_system,
                )
                    .chain()
                    .run_if(resource_exists::<SessionContext>),
            );
    }
}

/// Build the session from the (possibly file-loaded) config.
pub fn install_session_system(mut commands: Commands, config: Res<GameConfig>) {
    let context = SessionContext::new(config.clone());
    let step = context.config().fixed_timestep;
    commands.insert_resource(Time::<Fixed>::from_seconds(step as f64));
    commands.insert_resource(context);
    info!("session installed (fixed step {step:.3}s)");
}

pub fn session_fixed_step_system(time: Res<Time<Fixed>>, mut context: ResMut<SessionContext>) {
    context.step_fixed(time.timestep().as_secs_f32());
}

/// WASD movement, left-click fire, Escape pause.  Cursor picking is left to
/// the presentation layer, which fills `aim_point`.
pub fn keyboard_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    mut input: ResMut<HostInput>,
) {
    let Some(keys) = keys else {
        return;
    };

    let mut movement = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        movement.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        movement.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        movement.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        movement.x -= 1.0;
    }
    input.0.movement = movement;

    if keys.just_pressed(KeyCode::Escape) {
        input.0.pause_requested = true;
    }
    if let Some(mouse) = mouse {
        input.0.fire_held = mouse.pressed(MouseButton::Left);
    }
}

pub fn session_command_system(
    mut commands: MessageReader<SessionCommand>,
    mut context: ResMut<SessionContext>,
) {
    for command in commands.read() {
        match *command {
            SessionCommand::Start => {
                context.start_session();
            }
            SessionCommand::Restart => context.restart_session(),
            SessionCommand::ReturnToMenu => context.return_to_menu(),
            SessionCommand::Quit => context.quit(),
            SessionCommand::TogglePause => context.request_pause(),
            SessionCommand::ChooseUpgrade(index) => {
                context.choose_upgrade(index);
            }
            SessionCommand::ForfeitUpgrade => {
                context.forfeit_upgrade();
            }
            SessionCommand::ReportContact(contact) => context.report_contact(contact),
        }
    }
}

/// Hand this frame's input to the core, then run the variable step.
pub fn session_frame_system(
    time: Res<Time>,
    mut input: ResMut<HostInput>,
    mut context: ResMut<SessionContext>,
) {
    context.set_input(input.0);
    input.0.pause_requested = false;
    context.begin_frame();
    context.step_variable(time.delta_secs());
}

pub fn forward_session_events_system(
    mut context: ResMut<SessionContext>,
    mut writer: MessageWriter<SessionMessage>,
) {
    for event in context.drain_events() {
        writer.write(SessionMessage(event));
    }
}

pub fn sync_phase_system(
    context: Res<SessionContext>,
    state: Res<State<SessionPhase>>,
    mut next_state: ResMut<NextState<SessionPhase>>,
) {
    if *state.get() != context.phase() {
        next_state.set(context.phase());
    }
}

pub fn exit_on_quit_system(
    mut messages: MessageReader<SessionMessage>,
    mut exit: MessageWriter<AppExit>,
) {
    if messages
        .read()
        .any(|message| message.0 == SessionEvent::QuitRequested)
    {
        exit.write(AppExit::Success);
    }
}
