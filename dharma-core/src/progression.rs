//! Mission and level progression.
//!
//! The [`ProgressionController`] is the single owner of persistent game
//! state: the player, skill tree, level/mission completion flags, the
//! unlocked set, and the mission pointer. Every mutation goes through a
//! named operation that returns the [`Effect`]s it applied.

use crate::combat::{CombatAction, Encounter, Outcome, Rejected, Resolution};
use crate::config::GameConfig;
use crate::content::Campaign;
use crate::dice::DamageRoller;
use crate::world::{
    ChoiceEffect, Enemy, Level, Mission, MissionProgress, MissionType, PlayerCharacter, Reward,
    Skill,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors from progression operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("level {level_id} is not unlocked")]
    InvalidLevelState { level_id: u32 },

    #[error("unknown level: {0}")]
    UnknownLevel(u32),

    #[error("level {level_id} has no mission {index}")]
    UnknownMission { level_id: u32, index: usize },

    #[error("level {level_id} has no boss for its combat mission")]
    NoEnemy { level_id: u32 },

    #[error("resources not gathered ({clues_found} clues, {traps_disarmed} traps)")]
    ResourcesIncomplete { clues_found: u32, traps_disarmed: u32 },

    #[error("no active encounter")]
    NoActiveEncounter,

    #[error("expected phase {expected}, found {actual}")]
    NotInPhase { expected: GamePhase, actual: GamePhase },

    #[error("combat: {0}")]
    Combat(#[from] Rejected),
}

/// Why a skill unlock did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillRejected {
    #[error("skill already unlocked")]
    AlreadyUnlocked,

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("skill costs {cost} xp, player has {available}")]
    InsufficientXp { cost: u32, available: u32 },
}

/// Non-combat mission interactions, run by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubInteraction {
    Dialogue,
    Puzzle,
    Choice,
    Stealth,
    Escort,
    Resource,
}

impl SubInteraction {
    /// `None` for combat and boss missions.
    pub fn for_mission(mission_type: MissionType) -> Option<Self> {
        match mission_type {
            MissionType::Dialogue => Some(SubInteraction::Dialogue),
            MissionType::Puzzle => Some(SubInteraction::Puzzle),
            MissionType::Choice => Some(SubInteraction::Choice),
            MissionType::Stealth => Some(SubInteraction::Stealth),
            MissionType::Escort => Some(SubInteraction::Escort),
            MissionType::Resource => Some(SubInteraction::Resource),
            MissionType::Combat | MissionType::Boss => None,
        }
    }
}

/// How a sub-interaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubOutcome {
    Success,
    Failure,
    Fled,
}

/// What `begin_mission` launched.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionLaunch {
    Combat(Enemy),
    SubInteraction(SubInteraction),
}

/// Top-level game state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Title,
    LevelMap,
    LevelIntro,
    MissionHub,
    InSubInteraction(SubInteraction),
    InCombat,
    LevelComplete,
    GameOver,
    FinalVictory,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Title => f.write_str("title"),
            GamePhase::LevelMap => f.write_str("level map"),
            GamePhase::LevelIntro => f.write_str("level intro"),
            GamePhase::MissionHub => f.write_str("mission hub"),
            GamePhase::InSubInteraction(kind) => write!(f, "{kind:?} interaction"),
            GamePhase::InCombat => f.write_str("combat"),
            GamePhase::LevelComplete => f.write_str("level complete"),
            GamePhase::GameOver => f.write_str("game over"),
            GamePhase::FinalVictory => f.write_str("final victory"),
        }
    }
}

/// Narrative ending chosen by final karma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    Enlightened,
    Righteous,
    Wanderer,
    Fallen,
}

impl Ending {
    pub fn from_karma(karma: i32) -> Self {
        match karma {
            k if k >= 150 => Ending::Enlightened,
            k if k >= 50 => Ending::Righteous,
            k if k >= 0 => Ending::Wanderer,
            _ => Ending::Fallen,
        }
    }
}

/// A state change applied by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    XpGained { amount: u32, new_total: u32 },
    XpSpent { amount: u32, new_total: u32 },
    LevelChanged { old: u32, new: u32 },
    KarmaChanged { delta: i32, new_total: i32 },
    GoldGained { amount: u32, new_total: u32 },
    ItemGained { item_id: String },
    HpRestored { new_current: i32 },
    CombatConcluded { victory: bool },
    MissionCompleted { level_id: u32, index: usize },
    MissionAdvanced { level_id: u32, index: usize },
    LevelCompleted { level_id: u32 },
    LevelUnlocked { level_id: u32 },
    SkillUnlocked { skill_id: String },
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Result of one combat action routed through the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatStep {
    pub resolution: Resolution,
    /// Non-empty once the encounter has ended and been applied.
    pub effects: Vec<Effect>,
}

/// Owns the player and all progression state for one session.
#[derive(Debug, Clone)]
pub struct ProgressionController {
    campaign: Campaign,
    config: GameConfig,
    player: PlayerCharacter,
    skills: Vec<Skill>,
    levels: Vec<Level>,
    unlocked: BTreeSet<u32>,
    /// Levels whose final mission has been completed at least once.
    cleared: BTreeSet<u32>,
    current_level: u32,
    mission_index: usize,
    progress: MissionProgress,
    phase: GamePhase,
    encounter: Option<Encounter>,
}

impl ProgressionController {
    /// A controller over the standard campaign.
    pub fn new(config: GameConfig) -> Self {
        Self::with_campaign(config, Campaign::standard())
    }

    /// A controller over custom content. `campaign` is kept for resets.
    pub fn with_campaign(config: GameConfig, campaign: Campaign) -> Self {
        let first = config.progression.first_level_id;
        let mut player = campaign.player.clone();
        player.recompute_level(&config.progression);
        Self {
            player,
            skills: campaign.skills.clone(),
            levels: campaign.levels.clone(),
            unlocked: BTreeSet::from([first]),
            cleared: BTreeSet::new(),
            current_level: first,
            mission_index: 0,
            progress: MissionProgress::default(),
            phase: GamePhase::Title,
            encounter: None,
            campaign,
            config,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The persistent player. Combat works on a copy until victory.
    pub fn player(&self) -> &PlayerCharacter {
        &self.player
    }

    /// Current screen-level phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The skill catalog with its unlocked flags.
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// All levels with their live mission completion flags.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Look up a level by id.
    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    /// The level most recently entered with `start_level`.
    pub fn current_level(&self) -> Option<&Level> {
        self.level(self.current_level)
    }

    pub fn current_level_id(&self) -> u32 {
        self.current_level
    }

    /// Index of the current mission within the current level.
    pub fn mission_index(&self) -> usize {
        self.mission_index
    }

    /// The mission `begin_mission` would launch.
    pub fn current_mission(&self) -> Option<&Mission> {
        self.current_level()
            .and_then(|l| l.missions.get(self.mission_index))
    }

    /// Transient counters of the running mission.
    pub fn progress(&self) -> &MissionProgress {
        &self.progress
    }

    /// Ids of every level that may be started.
    pub fn unlocked_levels(&self) -> &BTreeSet<u32> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        self.unlocked.contains(&level_id)
    }

    /// The running encounter, only present while `InCombat`.
    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    /// The ending the current karma would earn.
    pub fn ending(&self) -> Ending {
        Ending::from_karma(self.player.karma)
    }

    // ========================================================================
    // Journey
    // ========================================================================

    /// Leave the title screen.
    pub fn begin_journey(&mut self) -> Result<Vec<Effect>, ProgressionError> {
        self.expect_phase(GamePhase::Title)?;
        let mut effects = Vec::new();
        self.set_phase(GamePhase::LevelMap, &mut effects);
        Ok(effects)
    }

    /// Enter an unlocked level with a fresh mission list and counters.
    pub fn start_level(&mut self, level_id: u32) -> Result<Vec<Effect>, ProgressionError> {
        if matches!(self.phase, GamePhase::InCombat | GamePhase::InSubInteraction(_)) {
            return Err(ProgressionError::NotInPhase {
                expected: GamePhase::LevelMap,
                actual: self.phase,
            });
        }
        let index = self.level_index(level_id)?;
        if !self.unlocked.contains(&level_id) {
            return Err(ProgressionError::InvalidLevelState { level_id });
        }

        self.levels[index].reset_missions();
        self.current_level = level_id;
        self.mission_index = 0;
        self.progress.reset();
        tracing::info!(level_id, "level started");

        let mut effects = Vec::new();
        self.set_phase(GamePhase::LevelIntro, &mut effects);
        Ok(effects)
    }

    /// Dismiss the level intro.
    pub fn enter_hub(&mut self) -> Result<Vec<Effect>, ProgressionError> {
        self.expect_phase(GamePhase::LevelIntro)?;
        let mut effects = Vec::new();
        self.set_phase(GamePhase::MissionHub, &mut effects);
        Ok(effects)
    }

    /// Launch the current mission according to its type.
    pub fn begin_mission(&mut self) -> Result<MissionLaunch, ProgressionError> {
        self.expect_phase(GamePhase::MissionHub)?;
        let level_id = self.current_level;
        let mission_type = self
            .current_mission()
            .map(|m| m.mission_type)
            .ok_or(ProgressionError::UnknownMission {
                level_id,
                index: self.mission_index,
            })?;

        let mut effects = Vec::new();
        match SubInteraction::for_mission(mission_type) {
            Some(kind) => {
                tracing::debug!(
                    level_id,
                    index = self.mission_index,
                    ?kind,
                    "sub-interaction launched"
                );
                self.set_phase(GamePhase::InSubInteraction(kind), &mut effects);
                Ok(MissionLaunch::SubInteraction(kind))
            }
            None => {
                let Some(boss) = self.current_level().and_then(|l| l.boss.clone()) else {
                    tracing::warn!(level_id, "combat mission in a level without a boss");
                    return Err(ProgressionError::NoEnemy { level_id });
                };
                let mut encounter = Encounter::with_config(
                    self.player.clone(),
                    boss.clone(),
                    self.config.combat.clone(),
                    self.config.progression.clone(),
                );
                encounter.begin()?;
                self.encounter = Some(encounter);
                self.set_phase(GamePhase::InCombat, &mut effects);
                Ok(MissionLaunch::Combat(boss))
            }
        }
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Submit an action to the active encounter. A terminal outcome is
    /// applied before this returns.
    pub fn combat_action<R: DamageRoller + ?Sized>(
        &mut self,
        action: CombatAction,
        rng: &mut R,
    ) -> Result<CombatStep, ProgressionError> {
        let encounter = self
            .encounter
            .as_mut()
            .ok_or(ProgressionError::NoActiveEncounter)?;
        let resolution = encounter.act(action, rng)?;
        let over = encounter.is_over();

        let effects = if over { self.conclude_encounter()? } else { Vec::new() };
        Ok(CombatStep { resolution, effects })
    }

    /// Presentation of the last exchange finished.
    pub fn settle_combat(&mut self) -> Result<(), ProgressionError> {
        let encounter = self
            .encounter
            .as_mut()
            .ok_or(ProgressionError::NoActiveEncounter)?;
        encounter.settle()?;
        Ok(())
    }

    fn conclude_encounter(&mut self) -> Result<Vec<Effect>, ProgressionError> {
        let outcome = self
            .encounter
            .take()
            .and_then(Encounter::into_outcome)
            .ok_or(ProgressionError::NoActiveEncounter)?;

        let mut effects = Vec::new();
        match outcome {
            Outcome::Victory(updated) => {
                let old_level = self.player.stats.level;
                self.player = updated;
                self.player.recompute_level(&self.config.progression);
                effects.push(Effect::CombatConcluded { victory: true });
                self.push_level_change(old_level, &mut effects);

                let (level_id, index) = (self.current_level, self.mission_index);
                effects.extend(self.complete_mission(level_id, index)?);
                effects.extend(self.advance_mission(level_id)?);
            }
            Outcome::Defeat => {
                effects.push(Effect::CombatConcluded { victory: false });
                tracing::info!(level_id = self.current_level, "game over");
                self.set_phase(GamePhase::GameOver, &mut effects);
            }
            Outcome::Fled => {
                tracing::debug!("fled back to mission hub");
                self.set_phase(GamePhase::MissionHub, &mut effects);
            }
        }
        Ok(effects)
    }

    // ========================================================================
    // Missions
    // ========================================================================

    /// Mark a mission completed and grant its reward. Repeated calls on a
    /// completed mission change nothing. Missions of locked levels are
    /// rejected with `InvalidLevelState`.
    pub fn complete_mission(
        &mut self,
        level_id: u32,
        index: usize,
    ) -> Result<Vec<Effect>, ProgressionError> {
        let level_index = self.level_index(level_id)?;
        if !self.unlocked.contains(&level_id) {
            return Err(ProgressionError::InvalidLevelState { level_id });
        }
        let level = &mut self.levels[level_index];
        let is_last = index + 1 == level.missions.len();
        let mission = level
            .missions
            .get_mut(index)
            .ok_or(ProgressionError::UnknownMission { level_id, index })?;
        if mission.completed {
            tracing::debug!(level_id, index, "mission already completed");
            return Ok(Vec::new());
        }

        mission.completed = true;
        let reward = mission.reward.clone();
        tracing::info!(level_id, index, mission = %mission.id, xp = reward.xp, "mission completed");

        let mut effects = vec![Effect::MissionCompleted { level_id, index }];
        if is_last {
            self.cleared.insert(level_id);
        }
        effects.extend(self.grant(&reward));
        Ok(effects)
    }

    /// Move the mission pointer forward, or signal level completion at the
    /// end of the list.
    pub fn advance_mission(&mut self, level_id: u32) -> Result<Vec<Effect>, ProgressionError> {
        let level_index = self.level_index(level_id)?;
        if level_id != self.current_level {
            return Err(ProgressionError::InvalidLevelState { level_id });
        }

        let mut effects = Vec::new();
        let next = self.mission_index + 1;
        if next >= self.levels[level_index].missions.len() {
            tracing::info!(level_id, "level complete");
            effects.push(Effect::LevelCompleted { level_id });
            self.set_phase(GamePhase::LevelComplete, &mut effects);
        } else {
            self.mission_index = next;
            self.progress.reset();
            tracing::debug!(level_id, index = next, "mission advanced");
            effects.push(Effect::MissionAdvanced { level_id, index: next });
            self.set_phase(GamePhase::MissionHub, &mut effects);
        }
        Ok(effects)
    }

    /// Unlock the level after `level_id`. Requires `level_id` to be
    /// unlocked and its final mission to have been completed.
    pub fn unlock_next_level(&mut self, level_id: u32) -> Result<Vec<Effect>, ProgressionError> {
        self.level_index(level_id)?;
        if !self.unlocked.contains(&level_id) || !self.cleared.contains(&level_id) {
            return Err(ProgressionError::InvalidLevelState { level_id });
        }

        let mut effects = Vec::new();
        let next = level_id + 1;
        if self.level(next).is_some() && self.unlocked.insert(next) {
            tracing::info!(level_id = next, "level unlocked");
            effects.push(Effect::LevelUnlocked { level_id: next });
        }
        if self.phase == GamePhase::LevelComplete {
            self.set_phase(GamePhase::LevelMap, &mut effects);
        }
        Ok(effects)
    }

    /// Complete the journey after the last level.
    pub fn finish_journey(&mut self) -> Result<Vec<Effect>, ProgressionError> {
        self.expect_phase(GamePhase::LevelComplete)?;
        if self.level(self.current_level + 1).is_some() {
            return Err(ProgressionError::InvalidLevelState {
                level_id: self.current_level,
            });
        }
        tracing::info!(karma = self.player.karma, ending = ?self.ending(), "journey complete");
        let mut effects = Vec::new();
        self.set_phase(GamePhase::FinalVictory, &mut effects);
        Ok(effects)
    }

    // ========================================================================
    // Sub-interactions
    // ========================================================================

    /// Report how the running sub-interaction ended. Success completes and
    /// advances the mission after applying `bonus`; anything else returns
    /// to the hub with no state change.
    pub fn complete_sub_interaction(
        &mut self,
        outcome: SubOutcome,
        bonus: Option<Reward>,
    ) -> Result<Vec<Effect>, ProgressionError> {
        let kind = self.active_sub_interaction()?;
        let mut effects = Vec::new();

        if outcome != SubOutcome::Success {
            tracing::debug!(?kind, ?outcome, "sub-interaction abandoned");
            self.set_phase(GamePhase::MissionHub, &mut effects);
            return Ok(effects);
        }

        if kind == SubInteraction::Resource && !self.progress.resources_gathered() {
            return Err(ProgressionError::ResourcesIncomplete {
                clues_found: self.progress.clues_found,
                traps_disarmed: self.progress.traps_disarmed,
            });
        }

        if let Some(bonus) = bonus {
            effects.extend(self.grant(&bonus));
        }
        let (level_id, index) = (self.current_level, self.mission_index);
        effects.extend(self.complete_mission(level_id, index)?);
        effects.extend(self.advance_mission(level_id)?);
        Ok(effects)
    }

    /// Apply the consequences of one choice option.
    pub fn apply_choice(&mut self, choice: ChoiceEffect) -> Result<Vec<Effect>, ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Choice))?;
        let mut effects = self.award_xp(choice.xp, choice.karma.max(0) as u32, choice.gold);
        if choice.karma < 0 {
            effects.extend(self.penalize_karma(choice.karma.unsigned_abs()));
        }
        self.progress.choice_index += 1;
        Ok(effects)
    }

    /// Returns the clue count after the search.
    pub fn search_clue(&mut self) -> Result<u32, ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Resource))?;
        self.progress.clues_found =
            (self.progress.clues_found + 1).min(MissionProgress::TOTAL_CLUES);
        Ok(self.progress.clues_found)
    }

    /// Returns the disarmed-trap count.
    pub fn disarm_trap(&mut self) -> Result<u32, ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Resource))?;
        self.progress.traps_disarmed =
            (self.progress.traps_disarmed + 1).min(MissionProgress::TOTAL_TRAPS);
        Ok(self.progress.traps_disarmed)
    }

    pub fn advance_dialogue(&mut self, npc: usize) -> Result<usize, ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Dialogue))?;
        if npc != self.progress.dialogue_npc {
            self.progress.dialogue_npc = npc;
            self.progress.dialogue_step = 0;
        }
        self.progress.dialogue_step += 1;
        Ok(self.progress.dialogue_step)
    }

    /// Record an answer to the current puzzle question.
    pub fn answer_puzzle(&mut self, answer: usize) -> Result<(), ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Puzzle))?;
        self.progress.puzzle_answered = Some(answer);
        Ok(())
    }

    pub fn next_puzzle(&mut self) -> Result<usize, ProgressionError> {
        self.expect_phase(GamePhase::InSubInteraction(SubInteraction::Puzzle))?;
        self.progress.puzzle_index += 1;
        self.progress.puzzle_answered = None;
        Ok(self.progress.puzzle_index)
    }

    // ========================================================================
    // Rewards and skills
    // ========================================================================

    /// Add experience, karma and gold, then recompute the player level.
    pub fn award_xp(&mut self, xp: u32, karma: u32, gold: u32) -> Vec<Effect> {
        let mut effects = Vec::new();
        let old_level = self.player.stats.level;

        self.player.gain_xp(xp, &self.config.progression);
        if xp > 0 {
            effects.push(Effect::XpGained {
                amount: xp,
                new_total: self.player.stats.xp,
            });
        }
        if karma > 0 {
            let karma = i32::try_from(karma).unwrap_or(i32::MAX);
            self.player.karma = self.player.karma.saturating_add(karma);
            effects.push(Effect::KarmaChanged {
                delta: karma,
                new_total: self.player.karma,
            });
        }
        if gold > 0 {
            self.player.gold = self.player.gold.saturating_add(gold);
            effects.push(Effect::GoldGained {
                amount: gold,
                new_total: self.player.gold,
            });
        }
        self.push_level_change(old_level, &mut effects);
        effects
    }

    /// The only path that lowers karma.
    pub fn penalize_karma(&mut self, amount: u32) -> Vec<Effect> {
        if amount == 0 {
            return Vec::new();
        }
        let delta = -i32::try_from(amount).unwrap_or(i32::MAX);
        self.player.karma = self.player.karma.saturating_add(delta);
        tracing::debug!(delta, karma = self.player.karma, "karma penalized");
        vec![Effect::KarmaChanged {
            delta,
            new_total: self.player.karma,
        }]
    }

    /// Spend xp on a skill. Nothing changes when the unlock is rejected.
    pub fn unlock_skill(&mut self, skill_id: &str) -> Result<Vec<Effect>, SkillRejected> {
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.id == skill_id)
            .ok_or_else(|| SkillRejected::UnknownSkill(skill_id.to_string()))?;
        if skill.unlocked {
            return Err(SkillRejected::AlreadyUnlocked);
        }
        let available = self.player.stats.xp;
        if available < skill.cost {
            return Err(SkillRejected::InsufficientXp {
                cost: skill.cost,
                available,
            });
        }

        let old_level = self.player.stats.level;
        skill.unlocked = true;
        let cost = skill.cost;
        self.player.spend_xp(cost, &self.config.progression);
        self.player.skills.insert(skill_id.to_string());
        tracing::info!(skill_id, cost, xp = self.player.stats.xp, "skill unlocked");

        let mut effects = vec![
            Effect::SkillUnlocked {
                skill_id: skill_id.to_string(),
            },
            Effect::XpSpent {
                amount: cost,
                new_total: self.player.stats.xp,
            },
        ];
        self.push_level_change(old_level, &mut effects);
        Ok(effects)
    }

    // ========================================================================
    // Game over and reset
    // ========================================================================

    /// Replay the current level from its first mission at full hp.
    pub fn retry_level(&mut self) -> Result<Vec<Effect>, ProgressionError> {
        self.expect_phase(GamePhase::GameOver)?;
        let index = self.level_index(self.current_level)?;
        self.levels[index].reset_missions();
        self.mission_index = 0;
        self.progress.reset();
        self.encounter = None;
        self.player.stats.restore_full();
        tracing::info!(level_id = self.current_level, "level retried");

        let mut effects = vec![Effect::HpRestored {
            new_current: self.player.stats.hp,
        }];
        self.set_phase(GamePhase::MissionHub, &mut effects);
        Ok(effects)
    }

    /// Full reset back to the title screen.
    pub fn return_to_title(&mut self) -> Vec<Effect> {
        let from = self.phase;
        *self = Self::with_campaign(self.config.clone(), self.campaign.clone());
        tracing::info!("returned to title");
        if from == GamePhase::Title {
            Vec::new()
        } else {
            vec![Effect::PhaseChanged {
                from,
                to: GamePhase::Title,
            }]
        }
    }

    /// Start over from scratch and go straight to the level map.
    pub fn new_journey(&mut self) -> Vec<Effect> {
        let mut effects = self.return_to_title();
        tracing::info!("new journey");
        self.set_phase(GamePhase::LevelMap, &mut effects);
        effects
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn grant(&mut self, reward: &Reward) -> Vec<Effect> {
        let mut effects = self.award_xp(reward.xp, reward.karma.max(0) as u32, reward.gold);
        if reward.karma < 0 {
            effects.extend(self.penalize_karma(reward.karma.unsigned_abs()));
        }
        if let Some(item) = &reward.item {
            self.player.inventory.add_item(item.clone());
            effects.push(Effect::ItemGained {
                item_id: item.id.clone(),
            });
        }
        effects
    }

    fn push_level_change(&self, old: u32, effects: &mut Vec<Effect>) {
        let new = self.player.stats.level;
        if new != old {
            tracing::info!(old, new, "player level changed");
            effects.push(Effect::LevelChanged { old, new });
        }
    }

    fn level_index(&self, level_id: u32) -> Result<usize, ProgressionError> {
        self.levels
            .iter()
            .position(|l| l.id == level_id)
            .ok_or(ProgressionError::UnknownLevel(level_id))
    }

    fn active_sub_interaction(&self) -> Result<SubInteraction, ProgressionError> {
        match self.phase {
            GamePhase::InSubInteraction(kind) => Ok(kind),
            actual => Err(ProgressionError::NotInPhase {
                expected: GamePhase::MissionHub,
                actual,
            }),
        }
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), ProgressionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ProgressionError::NotInPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn set_phase(&mut self, to: GamePhase, effects: &mut Vec<Effect>) {
        let from = self.phase;
        if from != to {
            self.phase = to;
            effects.push(Effect::PhaseChanged { from, to });
        }
    }
}
