//! Semantic events emitted by the core for presentation and audio hosts.
//!
//! The core never touches widgets, animators, or audio sources.  It pushes
//! [`SessionEvent`]s into an [`Outbox`]; the host drains them once per frame
//! and decides how each one is shown or heard.

use crate::enemy::{Archetype, EnemyId};
use crate::pickup::{OrbId, OrbSize};
use crate::session::SessionPhase;
use crate::stats::{PlayerStats, WeaponModifiers};
use crate::upgrade::UpgradeOffer;
use bevy::math::Vec3;

/// Who an animation cue is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Player,
    Enemy(EnemyId),
}

/// Animation intents.  The host maps them onto whatever rig it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCue {
    /// Locomotion started (`true`) or stopped (`false`).
    Moving(bool),
    Shoot,
    Reload,
    Hit,
    Die,
    /// Enemy ranged attack.
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    ShotFired,
    ReloadStarted,
}

/// Values for the heads-up display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HudUpdate {
    Health { current: f32, max: f32 },
    Ammo { current: u32, max: u32 },
    /// Emitted every fixed step while a reload is running.
    Reloading { elapsed: f32, duration: f32, rounds_loaded: u32, max_ammo: u32 },
    Experience { current: f32, next: f32 },
    Level(u32),
    Kills(u32),
    /// Whole seconds of Playing time; see [`format_play_time`].
    PlayTime { seconds: u32 },
}

/// Snapshot shown on the pause screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub stats: PlayerStats,
    pub modifiers: WeaponModifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { from: SessionPhase, to: SessionPhase },
    Hud(HudUpdate),
    /// Cards to render during LevelUp, possibly empty.
    OffersPresented(Vec<UpgradeOffer>),
    OffersHidden,
    StatsPanel(StatsSnapshot),
    Animation { subject: Subject, cue: AnimationCue },
    Audio(AudioCue),
    EnemySpawned { id: EnemyId, archetype: Archetype, position: Vec3 },
    EnemyDestroyed { id: EnemyId, archetype: Archetype, position: Vec3 },
    OrbDropped { id: OrbId, size: OrbSize, value: u32, position: Vec3 },
    OrbCollected { id: OrbId, value: u32 },
    QuitRequested,
}

/// FIFO buffer of events awaiting the host.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<SessionEvent>,
}

impl Outbox {
    #[inline]
    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn hud(&mut self, update: HudUpdate) {
        self.events.push(SessionEvent::Hud(update));
    }

    #[inline]
    pub fn animate(&mut self, subject: Subject, cue: AnimationCue) {
        self.events.push(SessionEvent::Animation { subject, cue });
    }

    #[inline]
    pub fn audio(&mut self, cue: AudioCue) {
        self.events.push(SessionEvent::Audio(cue));
    }

    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// `mm:ss` rendering of a play time.
pub fn format_play_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
