//! Testing utilities for combat and progression.
//!
//! This module provides tools for deterministic tests:
//! - `FixedRoller` and `ScriptedRoller` to pin damage rolls
//! - Sample player, enemy and campaign fixtures
//! - `CombatHarness` for scripted encounters
//! - Assertion helpers for verifying game state

use crate::combat::{CombatAction, CombatEvent, CombatPhase, Encounter, Rejected, Resolution};
use crate::content::Campaign;
use crate::dice::{DamageRoller, RollRange};
use crate::progression::{GamePhase, ProgressionController};
use crate::world::{
    Enemy, Item, ItemKind, Level, Mission, MissionType, PlayerCharacter, Reward, Skill, Stats,
};
use std::collections::VecDeque;

/// A roller that always returns the same offset, clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRoller {
    value: i32,
}

impl FixedRoller {
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl DamageRoller for FixedRoller {
    fn roll(&mut self, range: RollRange) -> i32 {
        range.clamp(self.value)
    }
}

/// A roller that replays queued offsets, then falls back to a fixed value.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    queue: VecDeque<i32>,
    fallback: i32,
    /// Ranges requested so far, in order.
    pub requests: Vec<RollRange>,
}

impl ScriptedRoller {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback: 0,
            requests: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: i32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn push(&mut self, value: i32) {
        self.queue.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DamageRoller for ScriptedRoller {
    fn roll(&mut self, range: RollRange) -> i32 {
        self.requests.push(range);
        let value = self.queue.pop_front().unwrap_or(self.fallback);
        range.clamp(value)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// 100/100 hp, attack 20, no healing items.
pub fn sample_player() -> PlayerCharacter {
    let mut player = PlayerCharacter::new("tester", "Tester", Stats::new(100, 20, 5));
    player.archetype = "Archer".to_string();
    player
}

pub fn sample_healer() -> PlayerCharacter {
    let mut player = sample_player();
    for _ in 0..2 {
        player
            .inventory
            .add_item(Item::new("healing_herb", "Herb", ItemKind::Healing));
    }
    player
}

/// 60 hp, attack 8.
pub fn sample_enemy() -> Enemy {
    Enemy::new("bandit", "Bandit", 60, 8)
        .with_title("Roadside Bandit")
        .with_rewards(Reward::new(50).with_karma(5))
        .with_dialogue("Your purse or your life!", "Ha!", "Mercy!")
}

fn sample_level(id: u32, missions: Vec<Mission>, boss: Enemy) -> Level {
    let mut level = Level::new(id, format!("Test Level {id}"));
    level.missions = missions;
    level.boss = Some(boss);
    level
}

/// Two small levels and three skills around `sample_player`.
///
/// Level 1 runs dialogue, resource, choice, then a boss (60 hp, attack 5).
/// Level 2 runs dialogue then combat.
pub fn sample_campaign() -> Campaign {
    let trophy = Item::new("trophy", "Trophy", ItemKind::Relic);
    let first = sample_level(
        1,
        vec![
            Mission::new(
                "t1_1",
                "Talk",
                MissionType::Dialogue,
                Reward::new(30).with_karma(5).with_gold(10),
                1,
            ),
            Mission::new("t1_2", "Gather", MissionType::Resource, Reward::new(40).with_gold(20), 2),
            Mission::new("t1_3", "Decide", MissionType::Choice, Reward::new(50).with_karma(10), 2),
            Mission::new(
                "t1_4",
                "Boss",
                MissionType::Boss,
                Reward::new(100).with_karma(10).with_item(trophy),
                3,
            ),
        ],
        Enemy::new("warden", "Warden", 60, 5).with_rewards(Reward::new(100).with_karma(10)),
    );
    let second = sample_level(
        2,
        vec![
            Mission::new("t2_1", "Scout", MissionType::Dialogue, Reward::new(20), 1),
            Mission::new("t2_2", "Fight", MissionType::Combat, Reward::new(80).with_karma(5), 3),
        ],
        Enemy::new("champion", "Champion", 80, 10).with_rewards(Reward::new(150)),
    );
    let skills = vec![
        Skill::new("focus", "Focus", 50),
        Skill::new("parry", "Parry", 50),
        Skill::new("sentinel", "Sentinel", 120),
    ];
    Campaign::new(sample_player(), vec![first, second], skills)
}

// ============================================================================
// Combat Harness
// ============================================================================

/// Drives an encounter with a scripted roller, settling after every
/// exchange so tests can submit actions back to back.
pub struct CombatHarness {
    pub encounter: Encounter,
    pub roller: ScriptedRoller,
}

impl CombatHarness {
    /// Start an encounter past its intro.
    pub fn new(player: PlayerCharacter, enemy: Enemy) -> Self {
        let mut encounter = Encounter::new(player, enemy);
        // a fresh encounter is always in Intro
        let _ = encounter.begin();
        Self {
            encounter,
            roller: ScriptedRoller::default(),
        }
    }

    /// Queue roll offsets for upcoming actions.
    pub fn expect_rolls(&mut self, rolls: &[i32]) -> &mut Self {
        for roll in rolls {
            self.roller.push(*roll);
        }
        self
    }

    pub fn act(&mut self, action: CombatAction) -> Result<Resolution, Rejected> {
        let res = self.encounter.act(action, &mut self.roller)?;
        if self.encounter.phase() == CombatPhase::Animating {
            self.encounter.settle()?;
        }
        Ok(res)
    }

    pub fn player_hp(&self) -> (i32, i32) {
        let stats = &self.encounter.player().stats;
        (stats.hp, stats.max_hp)
    }

    pub fn enemy_hp(&self) -> i32 {
        self.encounter.enemy().hp
    }

    pub fn phase(&self) -> CombatPhase {
        self.encounter.phase()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(player: &PlayerCharacter, current: i32, max: i32) {
    let (actual_current, actual_max) = (player.stats.hp, player.stats.max_hp);
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert an encounter has ended in the given phase.
#[track_caller]
pub fn assert_outcome(encounter: &Encounter, expected: CombatPhase) {
    let actual = encounter.outcome().map(|o| o.phase());
    assert_eq!(
        actual,
        Some(expected),
        "Expected encounter to end in {expected}, got {actual:?}"
    );
}

/// Assert the enemy did not attack during this resolution.
#[track_caller]
pub fn assert_no_retaliation(resolution: &Resolution) {
    assert!(
        !resolution
            .events
            .iter()
            .any(|e| matches!(
                e,
                CombatEvent::EnemyAttacked { .. } | CombatEvent::AfflictionTicked { .. }
            )),
        "Expected no enemy turn, got {:?}",
        resolution.events
    );
}

#[track_caller]
pub fn assert_phase(controller: &ProgressionController, expected: GamePhase) {
    assert_eq!(
        controller.phase(),
        expected,
        "Expected phase {expected}, got {}",
        controller.phase()
    );
}
