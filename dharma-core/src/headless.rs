//! Headless game interface for programmatic use.
//!
//! This module provides a simplified interface for running a journey without
//! any presentation layer. It's designed for:
//! - Integration tests that script a whole playthrough
//! - Bots and scripted sessions
//! - Replaying a seeded run
//!
//! # Example
//!
//! ```no_run
//! use dharma_core::headless::{HeadlessGame, PlayerEvent};
//! use dharma_core::config::GameConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut game = HeadlessGame::new(GameConfig::default().with_seed(7));
//!     game.send(PlayerEvent::BeginJourney)?;
//!     game.send(PlayerEvent::StartLevel(1))?;
//!     game.send(PlayerEvent::EnterHub)?;
//!
//!     let response = game.send(PlayerEvent::SelectMission)?;
//!     println!("{:?} -> {}", response.launch, response.phase);
//!     println!("HP: {}/{}", game.current_hp(), game.max_hp());
//!     Ok(())
//! }
//! ```

use crate::combat::{CombatAction, LogEntry};
use crate::config::{ConfigError, GameConfig};
use crate::content::Campaign;
use crate::dice::{DamageRoller, SeededRoller};
use crate::progression::{
    Effect, GamePhase, MissionLaunch, ProgressionController, ProgressionError, SubOutcome,
};
use crate::world::{ChoiceEffect, PlayerCharacter, Reward};
use std::path::Path;
use thiserror::Error;

/// Errors surfaced to the caller. Gameplay-level invalid actions are not
/// errors; see [`Response::ignored`].
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Progression error: {0}")]
    Progression(#[from] ProgressionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// A discrete event from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    BeginJourney,
    StartLevel(u32),
    EnterHub,
    SelectMission,
    Attack,
    Defend,
    UseItem,
    Flee,
    /// Only needed when auto-settle is off.
    Settle,
    CompleteSubInteraction {
        outcome: SubOutcome,
        bonus: Option<Reward>,
    },
    Choose(ChoiceEffect),
    SearchClue,
    DisarmTrap,
    UnlockSkill(String),
    ContinueToNextLevel,
    FinishJourney,
    RetryLevel,
    ReturnToTitle,
    NewJourney,
}

/// What an event did.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub effects: Vec<Effect>,
    /// Combat log lines produced by this event.
    pub log: Vec<LogEntry>,
    pub launch: Option<MissionLaunch>,
    pub phase: GamePhase,
    /// The event was not valid in the current state and changed nothing.
    pub ignored: bool,
}

/// A full game session driven by [`PlayerEvent`]s.
pub struct HeadlessGame {
    controller: ProgressionController,
    roller: Box<dyn DamageRoller>,
    auto_settle: bool,
}

impl HeadlessGame {
    /// Start a session on the standard campaign.
    pub fn new(config: GameConfig) -> Self {
        Self::with_campaign(config, Campaign::standard())
    }

    pub fn with_campaign(config: GameConfig, campaign: Campaign) -> Self {
        let roller = match config.seed {
            Some(seed) => SeededRoller::from_seed(seed),
            None => SeededRoller::from_entropy(),
        };
        Self {
            controller: ProgressionController::with_campaign(config, campaign),
            roller: Box::new(roller),
            auto_settle: true,
        }
    }

    /// Load a TOML config file and start a session.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let config = GameConfig::load(path)?;
        Ok(Self::new(config))
    }

    /// Replace the roller, e.g. with a scripted one.
    pub fn with_roller(mut self, roller: Box<dyn DamageRoller>) -> Self {
        self.roller = roller;
        self
    }

    /// When off, every combat exchange must be followed by
    /// [`PlayerEvent::Settle`].
    pub fn with_auto_settle(mut self, auto_settle: bool) -> Self {
        self.auto_settle = auto_settle;
        self
    }

    /// Apply one event.
    pub fn send(&mut self, event: PlayerEvent) -> Result<Response, GameError> {
        let mut response = Response::default();
        match self.dispatch(event.clone(), &mut response) {
            Ok(()) => {}
            Err(err) if is_recoverable(&err) => {
                tracing::debug!(?event, error = %err, "event ignored");
                response.ignored = true;
            }
            Err(err) => return Err(err.into()),
        }
        response.phase = self.controller.phase();
        Ok(response)
    }

    fn dispatch(
        &mut self,
        event: PlayerEvent,
        response: &mut Response,
    ) -> Result<(), ProgressionError> {
        let ctrl = &mut self.controller;
        match event {
            PlayerEvent::BeginJourney => response.effects = ctrl.begin_journey()?,
            PlayerEvent::StartLevel(level_id) => response.effects = ctrl.start_level(level_id)?,
            PlayerEvent::EnterHub => response.effects = ctrl.enter_hub()?,
            PlayerEvent::SelectMission => {
                let launch = ctrl.begin_mission()?;
                if matches!(launch, MissionLaunch::Combat(_)) {
                    if let Some(encounter) = ctrl.encounter() {
                        response.log = encounter.log().to_vec();
                    }
                }
                response.launch = Some(launch);
            }
            PlayerEvent::Attack => self.combat(CombatAction::Attack, response)?,
            PlayerEvent::Defend => self.combat(CombatAction::Defend, response)?,
            PlayerEvent::UseItem => self.combat(CombatAction::UseItem, response)?,
            PlayerEvent::Flee => self.combat(CombatAction::Flee, response)?,
            PlayerEvent::Settle => ctrl.settle_combat()?,
            PlayerEvent::CompleteSubInteraction { outcome, bonus } => {
                response.effects = ctrl.complete_sub_interaction(outcome, bonus)?
            }
            PlayerEvent::Choose(choice) => response.effects = ctrl.apply_choice(choice)?,
            PlayerEvent::SearchClue => {
                ctrl.search_clue()?;
            }
            PlayerEvent::DisarmTrap => {
                ctrl.disarm_trap()?;
            }
            PlayerEvent::UnlockSkill(skill_id) => match ctrl.unlock_skill(&skill_id) {
                Ok(effects) => response.effects = effects,
                Err(reason) => {
                    tracing::debug!(skill_id = %skill_id, %reason, "skill unlock ignored");
                    response.ignored = true;
                }
            },
            PlayerEvent::ContinueToNextLevel => {
                let level_id = ctrl.current_level_id();
                response.effects = ctrl.unlock_next_level(level_id)?
            }
            PlayerEvent::FinishJourney => response.effects = ctrl.finish_journey()?,
            PlayerEvent::RetryLevel => response.effects = ctrl.retry_level()?,
            PlayerEvent::ReturnToTitle => response.effects = ctrl.return_to_title(),
            PlayerEvent::NewJourney => response.effects = ctrl.new_journey(),
        }
        Ok(())
    }

    fn combat(
        &mut self,
        action: CombatAction,
        response: &mut Response,
    ) -> Result<(), ProgressionError> {
        let step = self.controller.combat_action(action, self.roller.as_mut())?;
        response.log = step.resolution.log;
        response.effects = step.effects;
        let animating = self
            .controller
            .encounter()
            .is_some_and(|e| e.phase() == crate::combat::CombatPhase::Animating);
        if self.auto_settle && animating {
            self.controller.settle_combat()?;
        }
        Ok(())
    }

    // ========================================================================
    // State queries
    // ========================================================================

    pub fn controller(&self) -> &ProgressionController {
        &self.controller
    }

    pub fn player(&self) -> &PlayerCharacter {
        self.controller.player()
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    /// Hp inside the active encounter, otherwise the player's.
    pub fn current_hp(&self) -> i32 {
        match self.controller.encounter() {
            Some(encounter) => encounter.player().stats.hp,
            None => self.player().stats.hp,
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.player().stats.max_hp
    }

    pub fn in_combat(&self) -> bool {
        self.controller.encounter().is_some()
    }

    pub fn enemy_hp(&self) -> Option<(i32, i32)> {
        self.controller
            .encounter()
            .map(|e| (e.enemy().hp, e.enemy().max_hp))
    }

    /// The running encounter's full log.
    pub fn combat_log(&self) -> &[LogEntry] {
        self.controller.encounter().map(|e| e.log()).unwrap_or(&[])
    }
}

/// Invalid gameplay actions are no-ops; broken invariants are not.
fn is_recoverable(err: &ProgressionError) -> bool {
    matches!(
        err,
        ProgressionError::Combat(_)
            | ProgressionError::NotInPhase { .. }
            | ProgressionError::NoActiveEncounter
            | ProgressionError::ResourcesIncomplete { .. }
    )
}
