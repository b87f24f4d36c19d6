//! Game data model: the player aggregate, enemies, missions, levels, skills.

use crate::config::ProgressionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Stats
// ============================================================================

/// Combat and experience statistics.
///
/// `hp` stays within `0..=max_hp`; `level` is derived from `xp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp: u32,
    pub level: u32,
}

impl Stats {
    pub fn new(max_hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            attack,
            defense,
            xp: 0,
            level: 1,
        }
    }

    /// Apply damage, flooring hp at zero. Negative amounts deal nothing.
    pub fn take_damage(&mut self, amount: i32) -> DamageResult {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        debug_assert!(self.hp >= 0 && self.hp <= self.max_hp);
        DamageResult {
            damage_taken: before - self.hp,
            dropped_to_zero: self.hp == 0,
        }
    }

    /// Heal up to `max_hp`, returning the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - old
    }

    pub fn restore_full(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32).max(0.0)
    }
}

/// Result of taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageResult {
    pub damage_taken: i32,
    pub dropped_to_zero: bool,
}

// ============================================================================
// Items and Inventory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Healing,
    Key,
    Relic,
    Token,
    Map,
}

/// An inventory entry. Duplicates are separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub effect: String,
    #[serde(default)]
    pub used: bool,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            effect: String::new(),
            used: false,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }

    pub fn is_unused_healing(&self) -> bool {
        self.kind == ItemKind::Healing && !self.used
    }
}

/// Ordered item list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn count(&self, id: &str) -> usize {
        self.items.iter().filter(|i| i.id == id).count()
    }

    /// Index of the first healing item not yet used.
    pub fn first_unused_healing(&self) -> Option<usize> {
        self.items.iter().position(Item::is_unused_healing)
    }

    pub fn has_unused_healing(&self) -> bool {
        self.first_unused_healing().is_some()
    }

    /// Mark the entry at `index` used. Returns false if it was already used
    /// or out of range.
    pub fn mark_used(&mut self, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(item) if !item.used => {
                item.used = true;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Rewards
// ============================================================================

/// A bundle granted on mission completion or victory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u32,
    #[serde(default)]
    pub karma: i32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub item: Option<Item>,
}

impl Reward {
    pub fn new(xp: u32) -> Self {
        Self {
            xp,
            ..Default::default()
        }
    }

    pub fn with_karma(mut self, karma: i32) -> Self {
        self.karma = karma;
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }
}

/// Outcome of picking one option in a choice scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEffect {
    pub xp: u32,
    /// Negative values go through the karma penalty path.
    pub karma: i32,
    pub gold: u32,
}

impl ChoiceEffect {
    pub const fn new(xp: u32, karma: i32, gold: u32) -> Self {
        Self { xp, karma, gold }
    }
}

// ============================================================================
// Player Character
// ============================================================================

/// The player aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub id: String,
    pub name: String,
    pub title: String,
    pub archetype: String,
    pub stats: Stats,
    /// Unbounded; negative values are allowed.
    pub karma: i32,
    pub gold: u32,
    pub inventory: Inventory,
    /// Ids of unlocked skills.
    pub skills: BTreeSet<String>,
}

impl PlayerCharacter {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: Stats) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            archetype: String::new(),
            stats,
            karma: 0,
            gold: 0,
            inventory: Inventory::default(),
            skills: BTreeSet::new(),
        }
    }

    /// Add experience and recompute level.
    pub fn gain_xp(&mut self, amount: u32, curve: &ProgressionConfig) {
        self.stats.xp = self.stats.xp.saturating_add(amount);
        self.recompute_level(curve);
    }

    /// Spend experience. Returns false (and changes nothing) when the
    /// player holds less than `amount`.
    pub fn spend_xp(&mut self, amount: u32, curve: &ProgressionConfig) -> bool {
        if self.stats.xp < amount {
            return false;
        }
        self.stats.xp -= amount;
        self.recompute_level(curve);
        true
    }

    pub fn recompute_level(&mut self, curve: &ProgressionConfig) {
        self.stats.level = curve.level_for_xp(self.stats.xp);
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.skills.contains(skill_id)
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// What an enemy's special ability does when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialEffect {
    /// Poison status: fixed damage on each enemy turn.
    Poison { turns: u32 },
    /// Damage-over-time with its own per-turn damage.
    Burn { damage: i32, turns: u32 },
    /// Multiplies the attack made on the turn the ability fires.
    Empower { multiplier: f64 },
    /// Flavour only.
    Announce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub name: String,
    pub description: String,
    pub effect: SpecialEffect,
}

impl SpecialAbility {
    pub fn new(name: impl Into<String>, effect: SpecialEffect) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            effect,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDialogue {
    pub intro: String,
    pub taunt: String,
    pub defeat: String,
}

/// Immutable enemy template. Each encounter works on its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Reset to `max_hp` when an encounter starts.
    pub hp: i32,
    pub max_hp: i32,
    /// Base damage before the enemy roll.
    pub attack: i32,
    /// Carried for display; damage formulas ignore it.
    pub defense: i32,
    /// Fires once when hp drops below the special threshold.
    pub special: SpecialAbility,
    /// Content metadata; the engine does not count it down.
    pub special_cooldown: u32,
    /// Granted to the player on victory.
    pub rewards: Reward,
    pub dialogue: EnemyDialogue,
}

impl Enemy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: i32, attack: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            hp: max_hp,
            max_hp,
            attack,
            defense: 0,
            special: SpecialAbility::new("None", SpecialEffect::Announce),
            special_cooldown: 0,
            rewards: Reward::default(),
            dialogue: EnemyDialogue::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_special(mut self, special: SpecialAbility, cooldown: u32) -> Self {
        self.special = special;
        self.special_cooldown = cooldown;
        self
    }

    pub fn with_rewards(mut self, rewards: Reward) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_dialogue(
        mut self,
        intro: impl Into<String>,
        taunt: impl Into<String>,
        defeat: impl Into<String>,
    ) -> Self {
        self.dialogue = EnemyDialogue {
            intro: intro.into(),
            taunt: taunt.into(),
            defeat: defeat.into(),
        };
        self
    }
}

// ============================================================================
// Missions and Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionType {
    Combat,
    Choice,
    Puzzle,
    Dialogue,
    Stealth,
    Escort,
    Resource,
    Boss,
}

impl MissionType {
    pub fn name(&self) -> &'static str {
        match self {
            MissionType::Combat => "combat",
            MissionType::Choice => "choice",
            MissionType::Puzzle => "puzzle",
            MissionType::Dialogue => "dialogue",
            MissionType::Stealth => "stealth",
            MissionType::Escort => "escort",
            MissionType::Resource => "resource",
            MissionType::Boss => "boss",
        }
    }

    /// Whether this mission is resolved by the combat engine.
    pub fn is_combat(&self) -> bool {
        matches!(self, MissionType::Combat | MissionType::Boss)
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single objective within a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    /// One-line goal shown in the mission hub.
    pub objective: String,
    /// Decides which sub-interaction `begin_mission` launches.
    pub mission_type: MissionType,
    /// Flips false -> true exactly once.
    pub completed: bool,
    /// Granted once, when `completed` flips.
    pub reward: Reward,
    /// Rank from 1 (easy) to 5 (boss).
    pub difficulty: u8,
}

impl Mission {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        mission_type: MissionType,
        reward: Reward,
        difficulty: u8,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            objective: String::new(),
            mission_type,
            completed: false,
            reward,
            difficulty,
        }
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = objective.into();
        self
    }
}

/// A named character the player can talk to. Read-only content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Lines stepped through by `advance_dialogue`.
    pub dialogues: Vec<String>,
}

impl Npc {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            dialogues: Vec::new(),
        }
    }

    pub fn with_dialogues(mut self, lines: &[&str]) -> Self {
        self.dialogues = lines.iter().map(|l| l.to_string()).collect();
        self
    }
}

/// One chapter of the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Levels unlock in id order.
    pub id: u32,
    pub title: String,
    pub region: String,
    /// Played in order; the last one completing clears the level.
    pub missions: Vec<Mission>,
    /// Fought by both `combat` and `boss` missions.
    pub boss: Option<Enemy>,
    pub npcs: Vec<Npc>,
    /// Display text only; unlocking is driven by the controller.
    pub unlock_condition: String,
    pub completion_message: String,
}

impl Level {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            region: String::new(),
            missions: Vec::new(),
            boss: None,
            npcs: Vec::new(),
            unlock_condition: String::new(),
            completion_message: String::new(),
        }
    }

    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }

    pub fn is_complete(&self) -> bool {
        !self.missions.is_empty() && self.missions.iter().all(|m| m.completed)
    }

    /// Clear completion flags (fresh copy for a replay).
    pub fn reset_missions(&mut self) {
        for mission in &mut self.missions {
            mission.completed = false;
        }
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Skill tree entry bought with experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Experience spent to unlock.
    pub cost: u32,
    /// Flips false -> true exactly once.
    pub unlocked: bool,
    /// Short summary of the bonus, e.g. `+25% first strike damage`.
    pub effect: String,
}

impl Skill {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            cost,
            unlocked: false,
            effect: String::new(),
        }
    }

    pub fn with_effect(
        mut self,
        description: impl Into<String>,
        effect: impl Into<String>,
    ) -> Self {
        self.description = description.into();
        self.effect = effect.into();
        self
    }
}

// ============================================================================
// Mission Progress
// ============================================================================

/// Per-mission transient counters for the sub-interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub dialogue_step: usize,
    pub dialogue_npc: usize,
    pub puzzle_index: usize,
    pub puzzle_answered: Option<usize>,
    pub choice_index: usize,
    pub clues_found: u32,
    pub traps_disarmed: u32,
}

impl MissionProgress {
    pub const TOTAL_CLUES: u32 = 3;
    pub const TOTAL_TRAPS: u32 = 5;

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn resources_gathered(&self) -> bool {
        self.clues_found >= Self::TOTAL_CLUES && self.traps_disarmed >= Self::TOTAL_TRAPS
    }
}
