//! Turn-based combat engine.
//!
//! An [`Encounter`] is a small state machine over one fight:
//!
//! ```text
//! Intro -> PlayerTurn -> Animating -> PlayerTurn -> ... -> Victory | Defeat | Fled
//! ```
//!
//! The player submits a [`CombatAction`]; the engine resolves the action and
//! the enemy's reply in one step and returns a [`Resolution`] describing what
//! happened (events for the caller's bookkeeping, log lines for display).
//! Pacing is left to the presentation layer: after a non-terminal exchange
//! the encounter sits in `Animating` and ignores input until [`Encounter::settle`]
//! is called.
//!
//! Ordering within an exchange is always attack, check, then retaliate. A
//! finishing blow never gives the enemy a counter-turn.

use crate::config::{CombatConfig, ProgressionConfig};
use crate::dice::DamageRoller;
use crate::world::{Enemy, PlayerCharacter, SpecialEffect};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// One player decision per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    Attack,
    Defend,
    UseItem,
    Flee,
}

/// Encounter state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatPhase {
    /// Enemy reveal; no actions accepted.
    Intro,
    PlayerTurn,
    /// A turn has resolved and is being presented; input is blocked.
    Animating,
    Victory,
    Defeat,
    Fled,
}

impl CombatPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CombatPhase::Victory | CombatPhase::Defeat | CombatPhase::Fled)
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self, CombatPhase::PlayerTurn)
    }
}

impl fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CombatPhase::Intro => "intro",
            CombatPhase::PlayerTurn => "player turn",
            CombatPhase::Animating => "animating",
            CombatPhase::Victory => "victory",
            CombatPhase::Defeat => "defeat",
            CombatPhase::Fled => "fled",
        };
        f.write_str(name)
    }
}

/// Terminal result handed back to the progression controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The player snapshot with victory rewards already applied.
    Victory(PlayerCharacter),
    Defeat,
    Fled,
}

impl Outcome {
    pub fn phase(&self) -> CombatPhase {
        match self {
            Outcome::Victory(_) => CombatPhase::Victory,
            Outcome::Defeat => CombatPhase::Defeat,
            Outcome::Fled => CombatPhase::Fled,
        }
    }
}

/// Resource an action needed but could not get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    HealingItem,
    ItemCooldown,
}

/// Why an action was ignored. The encounter is unchanged when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("action not accepted during {phase}")]
    InvalidAction { phase: CombatPhase },

    #[error("insufficient resource: {0:?}")]
    InsufficientResource(Resource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Player,
    Enemy,
    System,
    Special,
}

/// A line in the combat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub kind: LogKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfflictionKind {
    Poison,
    Burn,
}

/// Damage-over-time status on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affliction {
    pub kind: AfflictionKind,
    pub damage: i32,
    pub turns_left: u32,
}

/// State changes produced by resolving an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    EncounterStarted { enemy_id: String },
    PlayerAttacked { roll: i32, damage: i32, enemy_hp: i32 },
    PlayerBraced,
    ItemUsed { item_id: String, healed: i32, player_hp: i32 },
    SpecialArmed,
    SpecialTriggered { ability: String, effect: SpecialEffect },
    AfflictionTicked { kind: AfflictionKind, damage: i32, turns_left: u32, player_hp: i32 },
    EnemyAttacked { roll: i32, base_damage: i32, damage: i32, blocked: bool, player_hp: i32 },
    PhaseChanged { from: CombatPhase, to: CombatPhase },
}

/// The result of resolving one step of an encounter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub events: Vec<CombatEvent>,
    pub log: Vec<LogEntry>,
}

impl Resolution {
    fn event(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}

/// Per-encounter flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterStatus {
    pub blocking: bool,
    pub affliction: Option<Affliction>,
    /// Armed when enemy hp first drops below the threshold; fires on the
    /// enemy's next turn.
    pub special_pending: bool,
    pub special_used: bool,
    pub item_used: bool,
    /// Completed enemy turns.
    pub turn: u32,
}

/// One fight between the player and an enemy.
#[derive(Debug, Clone)]
pub struct Encounter {
    id: Uuid,
    player: PlayerCharacter,
    enemy: Enemy,
    phase: CombatPhase,
    status: EncounterStatus,
    log: Vec<LogEntry>,
    outcome: Option<Outcome>,
    config: CombatConfig,
    curve: ProgressionConfig,
}

impl Encounter {
    /// Start an encounter with default balance.
    pub fn new(player: PlayerCharacter, enemy: Enemy) -> Self {
        Self::with_config(player, enemy, CombatConfig::default(), ProgressionConfig::default())
    }

    pub fn with_config(
        player: PlayerCharacter,
        mut enemy: Enemy,
        config: CombatConfig,
        curve: ProgressionConfig,
    ) -> Self {
        // fresh instance from the template
        enemy.hp = enemy.max_hp;
        Self {
            id: Uuid::new_v4(),
            player,
            enemy,
            phase: CombatPhase::Intro,
            status: EncounterStatus::default(),
            log: Vec::new(),
            outcome: None,
            config,
            curve,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// The player's in-fight state.
    pub fn player(&self) -> &PlayerCharacter {
        &self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn status(&self) -> &EncounterStatus {
        &self.status
    }

    /// Full log so far.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether UseItem would currently be accepted.
    pub fn can_use_item(&self) -> bool {
        !self.status.item_used && self.player.inventory.has_unused_healing()
    }

    /// Finish the intro and hand control to the player.
    pub fn begin(&mut self) -> Result<Resolution, Rejected> {
        if self.phase != CombatPhase::Intro {
            return Err(Rejected::InvalidAction { phase: self.phase });
        }
        let mut res = Resolution::default();
        res.event(CombatEvent::EncounterStarted {
            enemy_id: self.enemy.id.clone(),
        });
        if !self.enemy.dialogue.intro.is_empty() {
            let intro = self.enemy.dialogue.intro.clone();
            self.push_log(&mut res, LogKind::Enemy, intro);
        }
        self.push_log(&mut res, LogKind::System, "Combat begins! Choose your action.".to_string());
        self.transition(&mut res, CombatPhase::PlayerTurn);
        tracing::debug!(encounter = %self.id, enemy = %self.enemy.id, "encounter started");
        Ok(res)
    }

    /// Presentation finished; accept input again.
    pub fn settle(&mut self) -> Result<(), Rejected> {
        if self.phase != CombatPhase::Animating {
            return Err(Rejected::InvalidAction { phase: self.phase });
        }
        self.phase = CombatPhase::PlayerTurn;
        Ok(())
    }

    /// Resolve one player action and, unless it ends the fight, the enemy's
    /// reply.
    pub fn act<R: DamageRoller + ?Sized>(
        &mut self,
        action: CombatAction,
        rng: &mut R,
    ) -> Result<Resolution, Rejected> {
        if !self.phase.accepts_input() {
            tracing::debug!(?action, phase = %self.phase, "combat action ignored");
            return Err(Rejected::InvalidAction { phase: self.phase });
        }

        let mut res = Resolution::default();
        match action {
            CombatAction::Attack => self.resolve_attack(rng, &mut res),
            CombatAction::Defend => self.resolve_defend(rng, &mut res),
            CombatAction::UseItem => self.resolve_use_item(rng, &mut res)?,
            CombatAction::Flee => self.resolve_flee(&mut res),
        }
        self.log.extend(res.log.iter().cloned());
        Ok(res)
    }

    fn resolve_attack<R: DamageRoller + ?Sized>(&mut self, rng: &mut R, res: &mut Resolution) {
        let roll = self.config.player_roll.clamp(rng.roll(self.config.player_roll));
        let damage = (self.player.stats.attack + roll).max(self.config.min_player_damage);
        self.enemy.hp = (self.enemy.hp - damage).max(0);

        res.event(CombatEvent::PlayerAttacked {
            roll,
            damage,
            enemy_hp: self.enemy.hp,
        });
        let line = format!("You strike {} for {} damage!", self.enemy.name, damage);
        res.log.push(self.entry(LogKind::Player, line));
        tracing::debug!(damage, enemy_hp = self.enemy.hp, "player attack");

        if self.enemy.hp == 0 {
            self.resolve_victory(res);
            return;
        }

        if !self.status.special_used && !self.status.special_pending && self.below_threshold() {
            self.status.special_pending = true;
            res.event(CombatEvent::SpecialArmed);
        }
        self.resolve_enemy_turn(rng, res);
    }

    fn resolve_defend<R: DamageRoller + ?Sized>(&mut self, rng: &mut R, res: &mut Resolution) {
        self.status.blocking = true;
        res.event(CombatEvent::PlayerBraced);
        res.log.push(self.entry(
            LogKind::Player,
            "You brace yourself, raising your guard...".to_string(),
        ));
        self.resolve_enemy_turn(rng, res);
    }

    fn resolve_use_item<R: DamageRoller + ?Sized>(
        &mut self,
        rng: &mut R,
        res: &mut Resolution,
    ) -> Result<(), Rejected> {
        if self.status.item_used {
            return Err(Rejected::InsufficientResource(Resource::ItemCooldown));
        }
        let index = self
            .player
            .inventory
            .first_unused_healing()
            .ok_or(Rejected::InsufficientResource(Resource::HealingItem))?;

        self.player.inventory.mark_used(index);
        self.status.item_used = true;
        let healed = self.player.stats.heal(self.config.heal_amount);
        let item = &self.player.inventory.items[index];

        res.event(CombatEvent::ItemUsed {
            item_id: item.id.clone(),
            healed,
            player_hp: self.player.stats.hp,
        });
        let line = format!("You use {} and restore {} HP!", item.name, healed);
        res.log.push(self.entry(LogKind::Player, line));
        self.resolve_enemy_turn(rng, res);
        Ok(())
    }

    fn resolve_flee(&mut self, res: &mut Resolution) {
        res.log.push(self.entry(LogKind::System, "You retreat from the battle.".to_string()));
        self.outcome = Some(Outcome::Fled);
        self.transition(res, CombatPhase::Fled);
        tracing::info!(encounter = %self.id, "encounter fled");
    }

    fn resolve_enemy_turn<R: DamageRoller + ?Sized>(&mut self, rng: &mut R, res: &mut Resolution) {
        let mut multiplier = 1.0;

        if self.status.special_pending {
            self.status.special_pending = false;
            self.status.special_used = true;
            let special = self.enemy.special.clone();
            res.event(CombatEvent::SpecialTriggered {
                ability: special.name.clone(),
                effect: special.effect.clone(),
            });
            let line = format!("{} uses {}!", self.enemy.name, special.name);
            res.log.push(self.entry(LogKind::Special, line));

            match special.effect {
                SpecialEffect::Poison { turns } => {
                    self.status.affliction = Some(Affliction {
                        kind: AfflictionKind::Poison,
                        damage: self.config.poison_damage,
                        turns_left: turns,
                    });
                }
                SpecialEffect::Burn { damage, turns } => {
                    self.status.affliction = Some(Affliction {
                        kind: AfflictionKind::Burn,
                        damage: damage.max(0),
                        turns_left: turns,
                    });
                }
                SpecialEffect::Empower { multiplier: m } => multiplier = m.max(0.0),
                SpecialEffect::Announce => {}
            }
        }

        if let Some(mut affliction) = self.status.affliction.filter(|a| a.turns_left > 0) {
            self.player.stats.take_damage(affliction.damage);
            affliction.turns_left -= 1;
            self.status.affliction = (affliction.turns_left > 0).then_some(affliction);
            res.event(CombatEvent::AfflictionTicked {
                kind: affliction.kind,
                damage: affliction.damage,
                turns_left: affliction.turns_left,
                player_hp: self.player.stats.hp,
            });
            let label = match affliction.kind {
                AfflictionKind::Poison => "Poison",
                AfflictionKind::Burn => "Fire",
            };
            let line = format!(
                "{} deals {} damage! ({} turns left)",
                label, affliction.damage, affliction.turns_left
            );
            res.log.push(self.entry(LogKind::Enemy, line));
        }

        let roll = self.config.enemy_roll.clamp(rng.roll(self.config.enemy_roll));
        let base_damage = scale_floor(self.enemy.attack.saturating_add(roll), multiplier).max(0);
        let blocked = self.status.blocking;
        let damage = if blocked {
            scale_floor(base_damage, self.config.block_multiplier)
        } else {
            base_damage
        };
        self.status.blocking = false;
        self.player.stats.take_damage(damage);
        self.status.turn += 1;

        res.event(CombatEvent::EnemyAttacked {
            roll,
            base_damage,
            damage,
            blocked,
            player_hp: self.player.stats.hp,
        });
        let line = if blocked {
            format!(
                "Your shield absorbs most of {}'s strike! Only {} damage!",
                self.enemy.name, damage
            )
        } else {
            format!("{} attacks for {} damage!", self.enemy.name, damage)
        };
        res.log.push(self.entry(LogKind::Enemy, line));
        tracing::debug!(damage, blocked, player_hp = self.player.stats.hp, "enemy attack");

        if self.player.stats.is_defeated() {
            let line = format!("You have been defeated by {}...", self.enemy.name);
            res.log.push(self.entry(LogKind::System, line));
            self.outcome = Some(Outcome::Defeat);
            self.transition(res, CombatPhase::Defeat);
            tracing::info!(encounter = %self.id, enemy = %self.enemy.id, "encounter lost");
        } else {
            self.transition(res, CombatPhase::Animating);
        }
    }

    fn resolve_victory(&mut self, res: &mut Resolution) {
        if !self.enemy.dialogue.defeat.is_empty() {
            let line = self.enemy.dialogue.defeat.clone();
            res.log.push(self.entry(LogKind::Enemy, line));
        }
        let line = format!("Victory! {} has been defeated!", self.enemy.name);
        res.log.push(self.entry(LogKind::System, line));

        let mut updated = self.player.clone();
        let rewards = &self.enemy.rewards;
        updated.stats.heal(self.config.victory_heal);
        updated.gain_xp(rewards.xp, &self.curve);
        updated.karma += rewards.karma;
        if let Some(item) = &rewards.item {
            updated.inventory.add_item(item.clone());
        }

        tracing::info!(
            encounter = %self.id,
            enemy = %self.enemy.id,
            xp = rewards.xp,
            karma = rewards.karma,
            "encounter won"
        );
        self.outcome = Some(Outcome::Victory(updated));
        self.transition(res, CombatPhase::Victory);
    }

    fn below_threshold(&self) -> bool {
        (self.enemy.hp as f64) < self.enemy.max_hp as f64 * self.config.special_threshold
    }

    fn entry(&self, kind: LogKind, text: String) -> LogEntry {
        LogEntry {
            turn: self.status.turn + 1,
            kind,
            text,
        }
    }

    fn push_log(&mut self, res: &mut Resolution, kind: LogKind, text: String) {
        let entry = self.entry(kind, text);
        self.log.push(entry.clone());
        res.log.push(entry);
    }

    fn transition(&mut self, res: &mut Resolution, to: CombatPhase) {
        let from = self.phase;
        self.phase = to;
        res.event(CombatEvent::PhaseChanged { from, to });
    }
}

/// `floor(value * multiplier)` computed in thousandths so that e.g.
/// `15 * 0.35` is exactly 5. Saturates at the `i32` bounds.
fn scale_floor(value: i32, multiplier: f64) -> i32 {
    let thousandths = (multiplier * 1000.0).round() as i64;
    let scaled = i64::from(value).saturating_mul(thousandths).div_euclid(1000);
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Everything an encounter produced when driven to the end.
#[derive(Debug, Clone)]
pub struct EncounterReport {
    /// `None` if the actions ran out before the fight ended.
    pub outcome: Option<Outcome>,
    /// The full encounter log, intro lines included.
    pub log: Vec<LogEntry>,
    /// Events from `begin` and every accepted action, in order.
    pub events: Vec<CombatEvent>,
    /// Actions that were skipped and why.
    pub rejected: Vec<(CombatAction, Rejected)>,
}

/// Drive an encounter with a sequence of actions, skipping the animation
/// pauses. Rejected actions are recorded and skipped.
pub fn resolve_encounter<R, I>(
    player: PlayerCharacter,
    enemy: Enemy,
    config: &CombatConfig,
    curve: &ProgressionConfig,
    rng: &mut R,
    actions: I,
) -> EncounterReport
where
    R: DamageRoller + ?Sized,
    I: IntoIterator<Item = CombatAction>,
{
    let mut encounter = Encounter::with_config(player, enemy, config.clone(), curve.clone());
    let mut events = Vec::new();
    let mut rejected = Vec::new();

    if let Ok(res) = encounter.begin() {
        events.extend(res.events);
    }

    for action in actions {
        if encounter.is_over() {
            break;
        }
        match encounter.act(action, rng) {
            Ok(res) => events.extend(res.events),
            Err(reason) => rejected.push((action, reason)),
        }
        if encounter.phase() == CombatPhase::Animating {
            let _ = encounter.settle();
        }
    }

    let log = encounter.log().to_vec();
    EncounterReport {
        outcome: encounter.into_outcome(),
        log,
        events,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::RollRange;
    use crate::testing::{sample_enemy, sample_player, FixedRoller, ScriptedRoller};
    use crate::world::{Item, ItemKind, Reward, SpecialAbility};

    fn started(player: PlayerCharacter, enemy: Enemy) -> Encounter {
        let mut encounter = Encounter::new(player, enemy);
        encounter.begin().unwrap();
        encounter
    }

    #[test]
    fn test_intro_blocks_actions() {
        let mut encounter = Encounter::new(sample_player(), sample_enemy());
        let mut rng = FixedRoller::new(0);
        assert_eq!(
            encounter.act(CombatAction::Attack, &mut rng),
            Err(Rejected::InvalidAction {
                phase: CombatPhase::Intro
            })
        );
        assert_eq!(encounter.enemy().hp, encounter.enemy().max_hp);
        encounter.begin().unwrap();
        assert_eq!(encounter.phase(), CombatPhase::PlayerTurn);
        assert!(encounter.begin().is_err());
    }

    #[test]
    fn test_attack_damage_and_floor() {
        let mut player = sample_player();
        player.stats.attack = 22;
        let mut encounter = started(player, sample_enemy());
        let mut rng = FixedRoller::new(3);

        let res = encounter.act(CombatAction::Attack, &mut rng).unwrap();
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::PlayerAttacked { damage: 25, .. })));

        let mut weak = sample_player();
        weak.stats.attack = -20;
        let mut encounter = started(weak, sample_enemy());
        let res = encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::PlayerAttacked { damage: 5, .. })));
    }

    #[test]
    fn test_animating_blocks_until_settled() {
        let mut encounter = started(sample_player(), sample_enemy());
        let mut rng = FixedRoller::new(0);
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        assert_eq!(encounter.phase(), CombatPhase::Animating);
        assert_eq!(
            encounter.act(CombatAction::Attack, &mut rng),
            Err(Rejected::InvalidAction {
                phase: CombatPhase::Animating
            })
        );
        encounter.settle().unwrap();
        assert_eq!(encounter.phase(), CombatPhase::PlayerTurn);
        assert!(encounter.settle().is_err());
    }

    #[test]
    fn test_five_attacks_defeat_ninety_hp() {
        let mut player = sample_player();
        player.stats.attack = 22;
        let enemy = Enemy::new("dummy", "Dummy", 90, 1);
        let mut encounter = started(player, enemy);
        let mut rng = FixedRoller::new(0);

        let expected = [68, 46, 24, 2, 0];
        for hp in expected {
            encounter.act(CombatAction::Attack, &mut rng).unwrap();
            assert_eq!(encounter.enemy().hp, hp);
            if !encounter.is_over() {
                encounter.settle().unwrap();
            }
        }
        assert_eq!(encounter.phase(), CombatPhase::Victory);
    }

    #[test]
    fn test_finishing_blow_has_no_retaliation() {
        let mut encounter = started(sample_player(), Enemy::new("frail", "Frail", 10, 50));
        let hp_before = encounter.player().stats.hp;
        let res = encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert!(!res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::EnemyAttacked { .. })));
        match encounter.outcome() {
            Some(Outcome::Victory(player)) => {
                assert_eq!(player.stats.hp, (hp_before + 20).min(player.stats.max_hp))
            }
            other => panic!("expected victory, got {other:?}"),
        }
    }

    #[test]
    fn test_block_scenario() {
        let mut player = sample_player();
        player.stats.max_hp = 120;
        player.stats.hp = 100;
        let enemy = Enemy::new("guard", "Guard", 200, 15);
        let mut encounter = started(player, enemy);

        encounter.act(CombatAction::Defend, &mut FixedRoller::new(0)).unwrap();
        assert_eq!(encounter.player().stats.hp, 95);
        assert!(!encounter.status().blocking);

        // block lasts exactly one enemy turn
        encounter.settle().unwrap();
        encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert_eq!(encounter.player().stats.hp, 80);
    }

    #[test]
    fn test_enemy_damage_never_negative() {
        let mut encounter = started(sample_player(), Enemy::new("gnat", "Gnat", 500, 1));
        let hp = encounter.player().stats.hp;
        encounter.act(CombatAction::Defend, &mut FixedRoller::new(-3)).unwrap();
        assert_eq!(encounter.player().stats.hp, hp);
    }

    #[test]
    fn test_use_item_once_per_encounter() {
        let mut player = sample_player();
        player.stats.hp = 50;
        player.inventory.add_item(Item::new("healing_herb", "Herb", ItemKind::Healing));
        player.inventory.add_item(Item::new("healing_herb", "Herb", ItemKind::Healing));
        let mut encounter = started(player, Enemy::new("gnat", "Gnat", 500, 0));
        let mut rng = FixedRoller::new(-3);

        encounter.act(CombatAction::UseItem, &mut rng).unwrap();
        assert_eq!(encounter.player().stats.hp, 80);
        encounter.settle().unwrap();

        assert_eq!(
            encounter.act(CombatAction::UseItem, &mut rng),
            Err(Rejected::InsufficientResource(Resource::ItemCooldown))
        );
        assert_eq!(encounter.player().stats.hp, 80);
        assert_eq!(encounter.phase(), CombatPhase::PlayerTurn);
        let used = encounter.player().inventory.items.iter().filter(|i| i.used).count();
        assert_eq!(used, 1);
    }

    #[test]
    fn test_use_item_caps_at_max_hp() {
        let mut player = sample_player();
        player.stats.hp = player.stats.max_hp - 5;
        player.inventory.add_item(Item::new("healing_herb", "Herb", ItemKind::Healing));
        let mut encounter = started(player, Enemy::new("gnat", "Gnat", 500, 0));
        let res = encounter.act(CombatAction::UseItem, &mut FixedRoller::new(-3)).unwrap();
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::ItemUsed { healed: 5, .. })));
        assert_eq!(encounter.player().stats.hp, encounter.player().stats.max_hp);
    }

    #[test]
    fn test_use_item_without_healing_item() {
        let mut encounter = started(sample_player(), sample_enemy());
        assert!(!encounter.can_use_item());
        assert_eq!(
            encounter.act(CombatAction::UseItem, &mut FixedRoller::new(0)),
            Err(Rejected::InsufficientResource(Resource::HealingItem))
        );
        assert_eq!(encounter.phase(), CombatPhase::PlayerTurn);
    }

    #[test]
    fn test_flee_keeps_no_changes() {
        let mut encounter = started(sample_player(), sample_enemy());
        let mut rng = FixedRoller::new(4);
        encounter.act(CombatAction::Attack, &mut rng).unwrap();
        encounter.settle().unwrap();
        encounter.act(CombatAction::Flee, &mut rng).unwrap();
        assert_eq!(encounter.phase(), CombatPhase::Fled);
        assert_eq!(encounter.outcome(), Some(&Outcome::Fled));
        assert!(encounter.act(CombatAction::Attack, &mut rng).is_err());
    }

    #[test]
    fn test_defeat_is_terminal() {
        let mut player = sample_player();
        player.stats.hp = 10;
        let mut encounter = started(player, Enemy::new("brute", "Brute", 500, 40));
        encounter.act(CombatAction::Defend, &mut FixedRoller::new(0)).unwrap();
        assert_eq!(encounter.player().stats.hp, 0);
        assert_eq!(encounter.phase(), CombatPhase::Defeat);
        assert_eq!(encounter.outcome(), Some(&Outcome::Defeat));
        assert!(encounter.settle().is_err());
    }

    #[test]
    fn test_poison_special_fires_once() {
        let wave = SpecialAbility::new("Poison Wave", SpecialEffect::Poison { turns: 3 });
        let enemy = Enemy::new("naga", "Naga", 100, 0).with_special(wave, 4);
        let mut player = sample_player();
        player.stats.attack = 65;
        let mut encounter = started(player, enemy);
        let mut rng = FixedRoller::new(0);
        let hp = encounter.player().stats.hp;

        // 100 -> 35, below 40%
        let res = encounter.act(CombatAction::Attack, &mut rng).unwrap();
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::SpecialTriggered { .. })));
        assert_eq!(encounter.player().stats.hp, hp - 8);
        assert_eq!(encounter.status().affliction.map(|a| a.turns_left), Some(2));

        encounter.settle().unwrap();
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        encounter.settle().unwrap();
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        encounter.settle().unwrap();
        assert_eq!(encounter.player().stats.hp, hp - 24);
        assert!(encounter.status().affliction.is_none());

        let res = encounter.act(CombatAction::Defend, &mut rng).unwrap();
        assert!(!res.events.iter().any(|e| matches!(
            e,
            CombatEvent::SpecialTriggered { .. } | CombatEvent::AfflictionTicked { .. }
        )));
        assert_eq!(encounter.player().stats.hp, hp - 24);
    }

    #[test]
    fn test_special_not_armed_above_threshold() {
        let wave = SpecialAbility::new("Poison Wave", SpecialEffect::Poison { turns: 3 });
        let enemy = Enemy::new("naga", "Naga", 100, 0).with_special(wave, 4);
        let mut player = sample_player();
        player.stats.attack = 60;
        let mut encounter = started(player, enemy);
        // 100 -> 40, exactly 40% is not below
        let res = encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert!(!res
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::SpecialArmed)));
        assert!(!encounter.status().special_used);
    }

    #[test]
    fn test_empower_doubles_firing_turn() {
        let fury = SpecialAbility::new("Fury Strike", SpecialEffect::Empower { multiplier: 2.0 });
        let enemy = Enemy::new("ash", "Ashwatthama", 100, 10).with_special(fury, 3);
        let mut player = sample_player();
        player.stats.attack = 70;
        let mut encounter = started(player, enemy);
        let hp = encounter.player().stats.hp;
        let mut rng = FixedRoller::new(0);

        encounter.act(CombatAction::Attack, &mut rng).unwrap();
        assert_eq!(encounter.player().stats.hp, hp - 20);
        encounter.settle().unwrap();
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        // floor(10 * 0.35)
        assert_eq!(encounter.player().stats.hp, hp - 23);
    }

    #[test]
    fn test_configured_poison_and_block() {
        let config = CombatConfig::default()
            .with_poison_damage(3)
            .with_block_multiplier(0.5)
            .with_enemy_roll(RollRange::new(0, 0));
        let wave = SpecialAbility::new("Poison Wave", SpecialEffect::Poison { turns: 2 });
        let enemy = Enemy::new("naga", "Naga", 100, 10).with_special(wave, 4);
        let mut player = sample_player();
        player.stats.attack = 65;
        let mut encounter =
            Encounter::with_config(player, enemy, config, ProgressionConfig::default());
        encounter.begin().unwrap();
        let hp = encounter.player().stats.hp;
        let mut rng = FixedRoller::new(0);

        encounter.act(CombatAction::Attack, &mut rng).unwrap();
        assert_eq!(encounter.player().stats.hp, hp - 13);
        encounter.settle().unwrap();
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        assert_eq!(encounter.player().stats.hp, hp - 21);
    }

    #[test]
    fn test_burn_uses_own_damage() {
        let enemy = Enemy::new("ravan", "Ravan Das", 100, 0).with_special(
            SpecialAbility::new("Hellfire", SpecialEffect::Burn { damage: 10, turns: 3 }),
            5,
        );
        let mut player = sample_player();
        player.stats.attack = 70;
        let mut encounter = started(player, enemy);
        let hp = encounter.player().stats.hp;
        encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert_eq!(encounter.player().stats.hp, hp - 10);
    }

    #[test]
    fn test_victory_rewards() {
        let mut player = sample_player();
        player.stats.hp = 40;
        player.stats.xp = 150;
        player.karma = 3;
        let relic = Item::new("drona_boon", "Drona's Boon", ItemKind::Relic);
        let enemy = Enemy::new("frail", "Frail", 5, 0)
            .with_rewards(Reward::new(200).with_karma(20).with_gold(100).with_item(relic.clone()));
        let mut encounter = started(player.clone(), enemy);
        encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();

        let Some(Outcome::Victory(updated)) = encounter.into_outcome() else {
            panic!("expected victory");
        };
        assert_eq!(updated.stats.hp, 60);
        assert_eq!(updated.stats.xp, 350);
        assert_eq!(updated.stats.level, 2);
        assert_eq!(updated.karma, 23);
        assert_eq!(updated.gold, player.gold);
        assert_eq!(updated.inventory.items.last(), Some(&relic));
    }

    #[test]
    fn test_resolve_encounter_skips_rejected() {
        let mut player = sample_player();
        player.stats.attack = 50;
        let mut rng = ScriptedRoller::new(vec![0, 0, 0, 0]);
        let report = resolve_encounter(
            player,
            Enemy::new("dummy", "Dummy", 90, 1),
            &CombatConfig::default(),
            &ProgressionConfig::default(),
            &mut rng,
            [CombatAction::UseItem, CombatAction::Attack, CombatAction::Attack, CombatAction::Flee],
        );
        assert!(matches!(report.outcome, Some(Outcome::Victory(_))));
        assert_eq!(report.rejected.len(), 1);
        assert!(report.log.iter().any(|l| l.kind == LogKind::System));
    }

    #[test]
    fn test_scale_floor() {
        assert_eq!(scale_floor(15, 0.35), 5);
        assert_eq!(scale_floor(20, 0.35), 7);
        assert_eq!(scale_floor(100, 0.35), 35);
        assert_eq!(scale_floor(21, 2.0), 42);
        assert_eq!(scale_floor(0, 0.35), 0);
        assert_eq!(scale_floor(i32::MAX, 1e17), i32::MAX);
        assert_eq!(scale_floor(-40, 1e17), i32::MIN);
    }

    #[test]
    fn test_huge_empower_defeats_without_overflow() {
        let rage = SpecialAbility::new("Endless Rage", SpecialEffect::Empower { multiplier: 1e17 });
        let enemy = Enemy::new("asura", "Asura", 100, 10).with_special(rage, 0);
        let mut player = sample_player();
        player.stats.attack = 70;
        let mut encounter = started(player, enemy);

        let res = encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
        assert!(res.events.iter().any(|e| matches!(
            e,
            CombatEvent::EnemyAttacked { damage: i32::MAX, .. }
        )));
        assert_eq!(encounter.player().stats.hp, 0);
        assert_eq!(encounter.phase(), CombatPhase::Defeat);
    }
}
