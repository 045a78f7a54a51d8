//! The session context: owns every component and drives the step loop.
//!
//! ## Fixed step order
//!
//! | # | Stage | Notes |
//! |---|-------|-------|
//! | 1 | [`Player`] | movement, trigger, burst, reload, projectile flight |
//! | 2 | [`SpawnDirector`] | queues [`SpawnRequest`]s |
//! | 3 | [`EnemyRoster`] | policies, hostile shot flight |
//! | 4 | [`OrbField`] | magnet attraction |
//! | 5 | spawns | queued requests become enemies |
//! | 6 | contacts | host-reported first, then the built-in detector |
//!
//! The variable step (once per rendered frame, Playing only) eases the
//! player's facing, rebuilds the aim line, and refreshes the play-time HUD.
//!
//! Nothing advances outside `Playing`.  Once a contact opens the level-up
//! screen only pickups resolve for the rest of the step, and resolution stops
//! at the first contact that ends the session.

use crate::collision::{Contact, OverlapDetector};
use crate::config::GameConfig;
use crate::enemy::{Archetype, Bestiary, Defeat, EnemyId, EnemyRoster};
use crate::events::{HudUpdate, Outbox, SessionEvent, StatsSnapshot};
use crate::input::{AimLine, InputFrame, ObstructionQuery, OpenField};
use crate::pickup::{OrbField, OrbId, OrbSize};
use crate::player::{DamageOutcome, Player, PlayerView, ProjectileId};
use crate::session::{PhaseChange, PhaseMachine, SessionPhase};
use crate::spawner::{scaled_health, SpawnDirector, SpawnRequest};
use crate::upgrade::{UpgradeCatalog, UpgradeKind, UpgradeOffer};
use bevy::log::{debug, info, warn};
use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Per-step view handed to every [`SimComponent`].
pub struct Frame<'a> {
    pub phase: SessionPhase,
    pub input: &'a InputFrame,
    pub player: PlayerView,
    pub bestiary: &'a Bestiary,
    pub rng: &'a mut StdRng,
    pub outbox: &'a mut Outbox,
    pub spawns: &'a mut Vec<SpawnRequest>,
}

/// A participant in the step loop.
pub trait SimComponent {
    fn on_fixed_step(&mut self, frame: &mut Frame<'_>, dt: f32);

    fn on_variable_step(&mut self, _frame: &mut Frame<'_>, _dt: f32) {}
}

#[derive(Resource)]
pub struct SessionContext {
    config: GameConfig,
    phase: PhaseMachine,
    player: Player,
    roster: EnemyRoster,
    orbs: OrbField,
    director: SpawnDirector,
    detector: OverlapDetector,
    catalog: UpgradeCatalog,
    rng: StdRng,
    outbox: Outbox,
    input: InputFrame,
    spawn_queue: Vec<SpawnRequest>,
    reported: Vec<Contact>,
    offers: Vec<UpgradeOffer>,
    accumulator: f32,
    last_play_second: Option<u32>,
    obstruction: Box<dyn ObstructionQuery>,
    aim_line: Option<AimLine>,
    fixed_steps: u64,
}

impl SessionContext {
    pub fn new(config: GameConfig) -> Self {
        let config = config.sanitized();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            phase: PhaseMachine::default(),
            player: new_player(&config),
            roster: EnemyRoster::default(),
            orbs: OrbField::new(config.orbs),
            director: SpawnDirector::new(config.spawn),
            detector: OverlapDetector::new(config.contacts),
            catalog: UpgradeCatalog::new(config.upgrades.clone()),
            rng,
            outbox: Outbox::default(),
            input: InputFrame::default(),
            spawn_queue: Vec::new(),
            reported: Vec::new(),
            offers: Vec::new(),
            accumulator: 0.0,
            last_play_second: None,
            obstruction: Box::new(OpenField),
            aim_line: None,
            fixed_steps: 0,
            config,
        }
    }

    /// Replace the collaborator used to clamp the aim line.
    pub fn with_obstruction(mut self, query: impl ObstructionQuery + 'static) -> Self {
        self.obstruction = Box::new(query);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase.phase()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct access for hosts that place the player themselves.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn roster(&self) -> &EnemyRoster {
        &self.roster
    }

    pub fn orbs(&self) -> &OrbField {
        &self.orbs
    }

    pub fn director(&self) -> &SpawnDirector {
        &self.director
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    /// Offers on screen while in LevelUp.
    pub fn offers(&self) -> &[UpgradeOffer] {
        &self.offers
    }

    #[inline]
    pub fn kills(&self) -> u32 {
        self.roster.kills()
    }

    /// Seconds spent in Playing this session.
    #[inline]
    pub fn play_time(&self) -> f32 {
        self.director.elapsed()
    }

    pub fn aim_line(&self) -> Option<AimLine> {
        self.aim_line
    }

    #[inline]
    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            stats: *self.player.stats(),
            modifiers: *self.player.modifiers(),
        }
    }

    /// Current level of the catalog entry for `kind`, using its step.
    pub fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.catalog
            .entries()
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| self.player.upgrade_level(kind, entry.amount))
            .unwrap_or(0)
    }

    // ── Host Interface ────────────────────────────────────────────────────────

    /// Store this frame's input.  A pause request stays latched until consumed.
    pub fn set_input(&mut self, input: InputFrame) {
        let pause_requested = self.input.pause_requested || input.pause_requested;
        self.input = InputFrame {
            pause_requested,
            ..input
        };
    }

    pub fn request_pause(&mut self) {
        self.input.pause_requested = true;
    }

    /// Queue a contact found by the host's own physics for the next fixed step.
    pub fn report_contact(&mut self, contact: Contact) {
        self.reported.push(contact);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.outbox.drain()
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &SessionEvent> {
        self.outbox.iter()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// `Ready → Playing`.
    pub fn start_session(&mut self) -> bool {
        let change = self.phase.start();
        if !self.apply_phase(change) {
            return false;
        }
        self.emit_full_hud();
        info!("session started");
        true
    }

    /// Throw the session away and start a fresh one.
    pub fn restart_session(&mut self) {
        self.reset_world();
        let change = self.phase.reset();
        self.apply_phase(change);
        self.start_session();
    }

    /// Throw the session away and wait in Ready.
    pub fn return_to_menu(&mut self) {
        self.reset_world();
        let change = self.phase.reset();
        self.apply_phase(change);
    }

    pub fn quit(&mut self) {
        self.return_to_menu();
        self.outbox.push(SessionEvent::QuitRequested);
        info!("quit requested");
    }

    // ── Stepping ──────────────────────────────────────────────────────────────

    /// Toggle pause if one was requested since the last frame.
    pub fn begin_frame(&mut self) {
        if std::mem::take(&mut self.input.pause_requested) {
            self.toggle_pause();
        }
    }

    /// Run one rendered frame: pause handling, as many fixed steps as
    /// `frame_dt` covers (up to `max_substeps`), then the variable step.
    ///
    /// Returns the number of fixed steps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.begin_frame();
        if !self.phase().is_playing() {
            self.accumulator = 0.0;
            return 0;
        }

        let dt = self.config.fixed_timestep;
        self.accumulator += frame_dt.max(0.0);

        let mut steps = 0;
        while self.accumulator >= dt && steps < self.config.max_substeps {
            self.step_fixed(dt);
            self.accumulator -= dt;
            steps += 1;
            if !self.phase().is_playing() {
                self.accumulator = 0.0;
                break;
            }
        }
        if self.accumulator >= dt {
            debug!("dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        self.step_variable(frame_dt);
        steps
    }

    /// One fixed simulation step.  No-op outside Playing.
    pub fn step_fixed(&mut self, dt: f32) {
        if !self.phase().is_playing() {
            return;
        }
        self.fixed_steps += 1;

        {
            let mut frame = Frame {
                phase: self.phase.phase(),
                input: &self.input,
                player: self.player.view(),
                bestiary: &self.config.enemies,
                rng: &mut self.rng,
                outbox: &mut self.outbox,
                spawns: &mut self.spawn_queue,
            };
            self.player.on_fixed_step(&mut frame, dt);
            frame.player = self.player.view();
            self.director.on_fixed_step(&mut frame, dt);
            self.roster.on_fixed_step(&mut frame, dt);
            self.orbs.on_fixed_step(&mut frame, dt);
        }

        self.materialise_spawns();
        self.resolve_contacts();
    }

    /// Per-frame presentation work.  No-op outside Playing.
    pub fn step_variable(&mut self, dt: f32) {
        if !self.phase().is_playing() {
            return;
        }

        {
            let mut frame = Frame {
                phase: self.phase.phase(),
                input: &self.input,
                player: self.player.view(),
                bestiary: &self.config.enemies,
                rng: &mut self.rng,
                outbox: &mut self.outbox,
                spawns: &mut self.spawn_queue,
            };
            self.player.on_variable_step(&mut frame, dt);
        }

        self.aim_line = self.input.aim_point.and_then(|target| {
            AimLine::toward(
                self.player.muzzle(),
                target,
                self.config.aim_line_length,
                self.obstruction.as_ref(),
            )
        });

        let seconds = self.play_time().floor() as u32;
        if self.last_play_second != Some(seconds) {
            self.last_play_second = Some(seconds);
            self.outbox.hud(HudUpdate::PlayTime { seconds });
        }
    }

    // ── Gameplay Operations ───────────────────────────────────────────────────

    /// Add an enemy now, with health scaled for the current session time.
    pub fn spawn_enemy(&mut self, archetype: Archetype, position: Vec3) -> EnemyId {
        let stats = self.config.enemies.get(archetype);
        let max_health = scaled_health(
            archetype,
            stats,
            self.director.tuning(),
            self.director.minutes(),
            self.director.tanks_spawned().max(1),
        );
        self.roster.spawn(archetype, position, max_health, &mut self.outbox)
    }

    /// Drop an experience orb now.
    pub fn drop_orb(&mut self, size: OrbSize, value: u32, position: Vec3) -> OrbId {
        self.orbs.drop_orb(size, value, position, &mut self.outbox)
    }

    /// Damage the player, ending the session on a lethal hit.
    ///
    /// Ignored outside Playing.
    pub fn damage_player(&mut self, amount: f32) -> DamageOutcome {
        if !self.phase().is_playing() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.player.take_damage(amount, &mut self.outbox);
        if outcome == DamageOutcome::Killed {
            self.hide_offers();
            let change = self.phase.game_over();
            if self.apply_phase(change) {
                info!(
                    "game over after {:.1}s with {} kills",
                    self.play_time(),
                    self.kills()
                );
            }
        }
        outcome
    }

    /// Grant experience; crossing a threshold opens the level-up screen.
    ///
    /// Returns the number of levels gained.
    pub fn grant_experience(&mut self, amount: f32) -> u32 {
        if self.phase().is_terminal() {
            return 0;
        }
        let gained = self.player.gain_exp(amount, &mut self.outbox);
        if gained > 0 && self.phase() != SessionPhase::LevelUp {
            self.enter_level_up();
        }
        gained
    }

    /// Apply the offer at `index` and leave LevelUp.
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        if self.phase() != SessionPhase::LevelUp {
            return false;
        }
        let Some(offer) = self.offers.get(index).cloned() else {
            warn!("upgrade index {index} out of range ({} offers)", self.offers.len());
            return false;
        };
        self.player.apply_upgrade(&offer, &mut self.outbox);
        self.finish_level_up();
        true
    }

    /// Decline every offer in exchange for a partial heal.
    pub fn forfeit_upgrade(&mut self) -> bool {
        if self.phase() != SessionPhase::LevelUp {
            return false;
        }
        let heal = self.player.stats().max_hp * self.config.forfeit_heal_fraction;
        self.player.heal(heal, &mut self.outbox);
        info!("upgrade forfeited for {heal:.0} HP");
        self.finish_level_up();
        true
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn toggle_pause(&mut self) {
        let change = self.phase.toggle_pause();
        if !self.apply_phase(change) {
            return;
        }
        match self.phase() {
            SessionPhase::Paused => {
                let snapshot = self.stats_snapshot();
                self.outbox.push(SessionEvent::StatsPanel(snapshot));
            }
            SessionPhase::Playing if self.player.progression().pending_level_ups > 0 => {
                self.enter_level_up();
            }
            _ => {}
        }
    }

    fn enter_level_up(&mut self) {
        let change = self.phase.enter_level_up();
        if !self.apply_phase(change) {
            return;
        }

        let player = &self.player;
        self.offers = self.catalog.select_offers(
            self.config.offers_per_level,
            |entry| player.upgrade_level(entry.kind, entry.amount),
            &mut self.rng,
        );
        if self.offers.is_empty() {
            info!("no upgrades left to offer");
        }
        self.outbox
            .push(SessionEvent::OffersPresented(self.offers.clone()));
    }

    fn finish_level_up(&mut self) {
        self.hide_offers();
        self.player.resolve_level_up();
        let change = self.phase.leave_level_up();
        self.apply_phase(change);

        if self.player.progression().pending_level_ups > 0 {
            self.enter_level_up();
        }
    }

    fn hide_offers(&mut self) {
        if self.phase() == SessionPhase::LevelUp {
            self.offers.clear();
            self.outbox.push(SessionEvent::OffersHidden);
        }
    }

    fn apply_phase(&mut self, change: Option<PhaseChange>) -> bool {
        let Some(PhaseChange { from, to }) = change else {
            return false;
        };
        debug!("phase {from:?} -> {to:?}");
        self.outbox.push(SessionEvent::PhaseChanged { from, to });
        true
    }

    fn materialise_spawns(&mut self) {
        for request in self.spawn_queue.drain(..) {
            self.roster.spawn(
                request.archetype,
                request.position,
                request.max_health,
                &mut self.outbox,
            );
        }
    }

    fn resolve_contacts(&mut self) {
        let mut contacts = std::mem::take(&mut self.reported);
        let host_count = contacts.len();
        if self.detector.radii.builtin {
            contacts.extend(self.detector.detect(&self.player, &self.roster, &self.orbs));
        }

        for (index, contact) in contacts.into_iter().enumerate() {
            match self.phase() {
                SessionPhase::Playing => {}
                SessionPhase::LevelUp => {
                    // Reported contacts wait for play; detected ones are found again.
                    if contact.is_pickup() {
                        self.resolve_contact(contact);
                    } else if index < host_count {
                        self.reported.push(contact);
                    }
                    continue;
                }
                _ => break,
            }
            self.resolve_contact(contact);
        }
    }

    fn resolve_contact(&mut self, contact: Contact) {
        match contact {
            Contact::ProjectileEnemy { projectile, enemy } => {
                self.resolve_projectile_hit(projectile, enemy);
            }
            Contact::EnemyTouch { enemy } => {
                if let Some(damage) = self.roster.begin_contact(enemy, &self.config.enemies) {
                    self.damage_player(damage);
                }
            }
            Contact::EnemyRelease { enemy } => self.roster.end_contact(enemy),
            Contact::ShotPlayer { shot } => {
                if let Some(shot) = self.roster.remove_shot(shot) {
                    self.damage_player(shot.damage);
                }
            }
            Contact::OrbPlayer { orb } => {
                if let Some(orb) = self.orbs.collect(orb, &mut self.outbox) {
                    self.grant_experience(orb.value as f32);
                }
            }
        }
    }

    fn resolve_projectile_hit(&mut self, projectile_id: ProjectileId, enemy: EnemyId) {
        if self.roster.get(enemy).is_none() {
            return;
        }
        let Some(projectile) = self.player.projectile_mut(projectile_id) else {
            return;
        };
        if projectile.has_struck(enemy) {
            return;
        }

        let (damage, critical) = projectile.roll_damage(&mut self.rng);
        let piercing = projectile.piercing;
        if piercing {
            projectile.mark_struck(enemy);
        } else {
            self.player.remove_projectile(projectile_id);
        }
        if critical {
            debug!("critical hit on {enemy:?} for {damage:.1}");
        }

        if let Some(defeat) =
            self.roster
                .apply_damage(enemy, damage, &self.config.enemies, &mut self.outbox)
        {
            self.on_enemy_defeated(defeat);
        }
    }

    fn on_enemy_defeated(&mut self, defeat: Defeat) {
        let (size, value) = self.config.drops.roll(&defeat, &mut self.rng);
        self.orbs
            .drop_orb(size, value, defeat.position, &mut self.outbox);
        self.outbox.hud(HudUpdate::Kills(self.roster.kills()));
    }

    fn emit_full_hud(&mut self) {
        let stats = *self.player.stats();
        let progression = *self.player.progression();
        self.outbox.hud(HudUpdate::Health {
            current: stats.current_hp,
            max: stats.max_hp,
        });
        self.outbox.hud(HudUpdate::Ammo {
            current: stats.current_ammo,
            max: stats.max_ammo,
        });
        self.outbox.hud(HudUpdate::Experience {
            current: progression.xp,
            next: progression.next_level_xp,
        });
        self.outbox.hud(HudUpdate::Level(progression.level));
        self.outbox.hud(HudUpdate::Kills(self.roster.kills()));
        self.outbox.hud(HudUpdate::PlayTime { seconds: 0 });
        self.last_play_second = Some(0);
    }

    fn reset_world(&mut self) {
        self.hide_offers();
        self.player = new_player(&self.config);
        self.roster.clear();
        self.orbs.clear();
        self.director.reset();
        self.spawn_queue.clear();
        self.reported.clear();
        self.offers.clear();
        self.input = InputFrame::default();
        self.accumulator = 0.0;
        self.last_play_second = None;
        self.aim_line = None;
    }
}

fn new_player(config: &GameConfig) -> Player {
    Player::new(config.player, config.initial_next_level_xp, config.weapon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawner::SpawnTuning;

    /// Seeded config with spawning switched off.
    fn quiet_config() -> GameConfig {
        GameConfig {
            seed: Some(7),
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

    fn playing() -> SessionContext {
        let mut ctx = SessionContext::new(quiet_config());
        assert!(ctx.start_session());
        ctx.drain_events();
        ctx
    }

    #[test]
    fn nothing_advances_before_start() {
        let mut ctx = SessionContext::new(quiet_config());
        assert_eq!(ctx.advance(1.0), 0);
        assert_eq!(ctx.play_time(), 0.0);
    }

    #[test]
    fn advance_caps_substeps() {
        let mut ctx = playing();
        assert_eq!(ctx.advance(10.0), ctx.config().max_substeps);
        assert_eq!(ctx.advance(0.05), 2);
    }

    #[test]
    fn pause_freezes_play_time_and_shows_stats() {
        let mut ctx = playing();
        ctx.advance(0.1);
        let before = ctx.play_time();

        ctx.request_pause();
        ctx.advance(0.1);
        assert_eq!(ctx.phase(), SessionPhase::Paused);
        assert_eq!(ctx.play_time(), before);
        assert!(ctx
            .pending_events()
            .any(|e| matches!(e, SessionEvent::StatsPanel(_))));

        ctx.request_pause();
        ctx.advance(0.1);
        assert_eq!(ctx.phase(), SessionPhase::Playing);
        assert!(ctx.play_time() > before);
    }

    #[test]
    fn level_up_presents_offers_and_choice_resumes() {
        let mut ctx = playing();
        assert_eq!(ctx.grant_experience(100.0), 1);
        assert_eq!(ctx.phase(), SessionPhase::LevelUp);
        assert_eq!(ctx.offers().len(), 3);

        assert!(!ctx.choose_upgrade(7));
        assert!(ctx.choose_upgrade(0));
        assert_eq!(ctx.phase(), SessionPhase::Playing);
        assert!(ctx.offers().is_empty());
        assert_eq!(ctx.player().progression().pending_level_ups, 0);
    }

    #[test]
    fn multiple_levels_chain_level_up_screens() {
        let mut ctx = playing();
        assert_eq!(ctx.grant_experience(244.0), 2);
        assert!(ctx.forfeit_upgrade());
        assert_eq!(ctx.phase(), SessionPhase::LevelUp, "second level still pending");
        assert!(ctx.choose_upgrade(1));
        assert_eq!(ctx.phase(), SessionPhase::Playing);
    }

    #[test]
    fn forfeit_heals_a_fraction_of_max_hp() {
        let mut ctx = playing();
        ctx.damage_player(100.0);
        ctx.grant_experience(100.0);
        assert!(ctx.forfeit_upgrade());
        let stats = ctx.player().stats();
        assert!((stats.current_hp - (50.0 + 0.45 * stats.max_hp)).abs() < 1e-3);
    }

    #[test]
    fn lethal_damage_ends_the_session_once() {
        let mut ctx = playing();
        assert_eq!(ctx.damage_player(1_000.0), DamageOutcome::Killed);
        assert_eq!(ctx.phase(), SessionPhase::GameOver);
        assert_eq!(ctx.damage_player(5.0), DamageOutcome::Ignored);

        let game_overs = ctx
            .drain_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    SessionEvent::PhaseChanged {
                        to: SessionPhase::GameOver,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(ctx.advance(1.0), 0);
    }

    #[test]
    fn restart_resets_world_and_plays() {
        let mut ctx = playing();
        ctx.spawn_enemy(Archetype::Chaser, Vec3::new(8.0, 0.0, 0.0));
        ctx.grant_experience(50.0);
        ctx.damage_player(1_000.0);

        ctx.restart_session();
        assert_eq!(ctx.phase(), SessionPhase::Playing);
        assert!(ctx.roster().is_empty());
        assert_eq!(ctx.player().progression().xp, 0.0);
        assert_eq!(ctx.player().stats().current_hp, ctx.player().stats().max_hp);
    }

    #[test]
    fn quit_requests_exit_from_ready() {
        let mut ctx = playing();
        ctx.quit();
        assert_eq!(ctx.phase(), SessionPhase::Ready);
        assert!(ctx
            .drain_events()
            .contains(&SessionEvent::QuitRequested));
    }

    #[test]
    fn projectile_kill_drops_an_orb() {
        let mut ctx = playing();
        let id = ctx.spawn_enemy(Archetype::Chaser, Vec3::new(0.0, 0.0, 6.0));
        ctx.set_input(InputFrame {
            aim_point: Some(Vec3::new(0.0, 0.0, 6.0)),
            fire_held: true,
            ..InputFrame::default()
        });
        for _ in 0..120 {
            ctx.advance(0.02);
            if ctx.roster().get(id).is_none() {
                break;
            }
        }
        assert!(ctx.roster().get(id).is_none());
        assert_eq!(ctx.kills(), 1);
        assert!(ctx
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::OrbDropped { .. })));
    }

    /// Blocks every ray that crosses `x = self.0`.
    struct WallAtX(f32);

    impl ObstructionQuery for WallAtX {
        fn closest_obstruction(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<Vec3> {
            if dir.x <= 0.0 {
                return None;
            }
            let t = (self.0 - origin.x) / dir.x;
            (t >= 0.0 && t <= max_dist).then(|| origin + dir * t)
        }
    }

    #[test]
    fn aim_line_stops_at_the_first_obstruction() {
        let mut ctx = SessionContext::new(quiet_config()).with_obstruction(WallAtX(4.0));
        ctx.start_session();
        ctx.set_input(InputFrame {
            aim_point: Some(Vec3::new(50.0, 0.0, 0.0)),
            ..InputFrame::default()
        });
        ctx.advance(0.02);

        let line = ctx.aim_line().unwrap();
        assert!((line.end.x - 4.0).abs() < 1e-4);
        assert!(line.start.x > 0.0, "starts at the muzzle");
    }

    #[test]
    fn reported_contact_is_resolved_next_step() {
        let mut ctx = SessionContext::new(GameConfig {
            contacts: crate::collision::ContactRadii {
                builtin: false,
                ..Default::default()
            },
            ..quiet_config()
        });
        ctx.start_session();
        let id = ctx.spawn_enemy(Archetype::Chaser, Vec3::new(20.0, 0.0, 0.0));

        ctx.report_contact(Contact::EnemyTouch { enemy: id });
        ctx.step_fixed(0.02);
        let hp = ctx.player().stats().current_hp;
        assert_eq!(hp, ctx.player().stats().max_hp - 10.0);

        ctx.report_contact(Contact::EnemyTouch { enemy: id });
        ctx.step_fixed(0.02);
        assert_eq!(ctx.player().stats().current_hp, hp, "still touching");
    }
}
