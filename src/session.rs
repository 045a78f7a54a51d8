//! Session phase state machine.
//!
//! ## Phases
//!
//! | Phase      | Simulation | Left by |
//! |------------|------------|---------|
//! | `Ready`    | frozen     | session start |
//! | `Playing`  | running    | pause, level-up, death |
//! | `Paused`   | frozen     | pause toggle |
//! | `LevelUp`  | frozen     | upgrade chosen / forfeited |
//! | `GameOver` | frozen     | restart or menu (full reset) |
//!
//! Every component checks [`SessionPhase::is_playing`] before advancing a
//! timer or making an AI decision, so entering any other phase freezes the
//! whole core in place.  `GameOver` is terminal for the session.
//!
//! The machine only validates and records transitions.  Showing overlays is
//! up to the host, which learns about each change through
//! [`crate::events::SessionEvent::PhaseChanged`].

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Ready,
    Playing,
    Paused,
    LevelUp,
    GameOver,
}

impl SessionPhase {
    #[inline]
    pub fn is_playing(self) -> bool {
        self == SessionPhase::Playing
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == SessionPhase::GameOver
    }
}

/// A transition that actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: SessionPhase,
    pub to: SessionPhase,
}

/// Holds the current phase and applies the allowed transitions.
///
/// Each method returns `Some(change)` when the transition is legal from the
/// current phase and `None` (leaving the phase untouched) otherwise.
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: SessionPhase,
}

impl PhaseMachine {
    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// `Ready → Playing`.
    pub fn start(&mut self) -> Option<PhaseChange> {
        self.transition(SessionPhase::Ready, SessionPhase::Playing)
    }

    /// `Playing ⇄ Paused`.  Ignored in every other phase.
    pub fn toggle_pause(&mut self) -> Option<PhaseChange> {
        match self.phase {
            SessionPhase::Playing => self.set(SessionPhase::Paused),
            SessionPhase::Paused => self.set(SessionPhase::Playing),
            _ => None,
        }
    }

    /// `Playing → LevelUp`.
    pub fn enter_level_up(&mut self) -> Option<PhaseChange> {
        self.transition(SessionPhase::Playing, SessionPhase::LevelUp)
    }

    /// `LevelUp → Playing`.
    pub fn leave_level_up(&mut self) -> Option<PhaseChange> {
        self.transition(SessionPhase::LevelUp, SessionPhase::Playing)
    }

    /// `Playing → GameOver`.  Happens at most once per session.
    pub fn game_over(&mut self) -> Option<PhaseChange> {
        self.transition(SessionPhase::Playing, SessionPhase::GameOver)
    }

    /// Unconditional reset used by the session lifecycle commands.
    pub fn reset(&mut self) -> Option<PhaseChange> {
        if self.phase == SessionPhase::Ready {
            return None;
        }
        self.set(SessionPhase::Ready)
    }

    fn transition(&mut self, from: SessionPhase, to: SessionPhase) -> Option<PhaseChange> {
        if self.phase != from {
            return None;
        }
        self.set(to)
    }

    fn set(&mut self, to: SessionPhase) -> Option<PhaseChange> {
        let from = self.phase;
        self.phase = to;
        Some(PhaseChange { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> PhaseMachine {
        let mut machine = PhaseMachine::default();
        machine.start();
        machine
    }

    #[test]
    fn starts_ready_and_enters_playing_once() {
        let mut machine = PhaseMachine::default();
        assert_eq!(machine.phase(), SessionPhase::Ready);
        assert!(machine.start().is_some());
        assert_eq!(machine.phase(), SessionPhase::Playing);
        assert!(machine.start().is_none());
    }

    #[test]
    fn pause_toggles_only_between_playing_and_paused() {
        let mut machine = playing();
        assert_eq!(
            machine.toggle_pause(),
            Some(PhaseChange {
                from: SessionPhase::Playing,
                to: SessionPhase::Paused
            })
        );
        assert!(machine.toggle_pause().is_some());
        assert_eq!(machine.phase(), SessionPhase::Playing);

        machine.enter_level_up();
        assert!(machine.toggle_pause().is_none());
        assert_eq!(machine.phase(), SessionPhase::LevelUp);
    }

    #[test]
    fn pause_is_ignored_after_game_over() {
        let mut machine = playing();
        assert!(machine.game_over().is_some());
        assert!(machine.toggle_pause().is_none());
        assert!(machine.game_over().is_none(), "game over fires exactly once");
        assert!(machine.enter_level_up().is_none());
        assert_eq!(machine.phase(), SessionPhase::GameOver);
    }

    #[test]
    fn level_up_requires_playing() {
        let mut machine = PhaseMachine::default();
        assert!(machine.enter_level_up().is_none());
        machine.start();
        machine.toggle_pause();
        assert!(machine.enter_level_up().is_none());
    }

    #[test]
    fn game_over_only_ends_active_play() {
        let mut machine = playing();
        machine.enter_level_up();
        assert!(machine.game_over().is_none());
        assert_eq!(machine.phase(), SessionPhase::LevelUp);

        machine.leave_level_up();
        machine.toggle_pause();
        assert!(machine.game_over().is_none());
        assert_eq!(machine.phase(), SessionPhase::Paused);
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut machine = playing();
        machine.game_over();
        assert!(machine.reset().is_some());
        assert_eq!(machine.phase(), SessionPhase::Ready);
        assert!(machine.reset().is_none());
    }
}
