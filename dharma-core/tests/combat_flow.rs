//! Combat engine tests against the public API.
//!
//! Run with: `cargo test -p dharma-core --test combat_flow`

use dharma_core::combat::{
    resolve_encounter, CombatAction, CombatEvent, CombatPhase, Encounter, Outcome,
};
use dharma_core::config::{CombatConfig, ProgressionConfig};
use dharma_core::content::{find_level, PLAYER_CHARACTER};
use dharma_core::dice::{RollRange, SeededRoller};
use dharma_core::testing::{
    assert_hp, assert_no_retaliation, assert_outcome, sample_enemy, sample_healer, sample_player,
    CombatHarness, FixedRoller, ScriptedRoller,
};
use dharma_core::world::{Enemy, SpecialAbility, SpecialEffect};
use proptest::prelude::*;

// =============================================================================
// Worked scenarios
// =============================================================================

#[test]
fn test_attack_scenario_ninety_hp() {
    let mut player = sample_player();
    player.stats.attack = 22;
    let mut harness = CombatHarness::new(player, Enemy::new("target", "Target", 90, 2));

    for _ in 0..4 {
        harness.act(CombatAction::Attack).unwrap();
        assert_eq!(harness.phase(), CombatPhase::PlayerTurn);
    }
    assert_eq!(harness.enemy_hp(), 2);
    let res = harness.act(CombatAction::Attack).unwrap();
    assert_no_retaliation(&res);
    assert_eq!(harness.enemy_hp(), 0);
    assert_outcome(&harness.encounter, CombatPhase::Victory);
}

#[test]
fn test_block_scenario() {
    let mut player = sample_player();
    player.stats.max_hp = 120;
    player.stats.hp = 100;
    let mut harness = CombatHarness::new(player, Enemy::new("guard", "Guard", 300, 15));

    harness.act(CombatAction::Defend).unwrap();
    assert_hp(harness.encounter.player(), 95, 120);
}

#[test]
fn test_flee_scenario() {
    let player = sample_healer();
    let mut harness = CombatHarness::new(player.clone(), sample_enemy());
    harness.expect_rolls(&[10, 4, 0, 4]);
    harness.act(CombatAction::Attack).unwrap();
    harness.act(CombatAction::UseItem).unwrap();
    harness.act(CombatAction::Flee).unwrap();

    assert_outcome(&harness.encounter, CombatPhase::Fled);
    assert_eq!(harness.encounter.outcome(), Some(&Outcome::Fled));
    // the pre-encounter snapshot is untouched
    assert_hp(&player, 100, 100);
}

#[test]
fn test_heal_once_per_encounter() {
    let mut player = sample_healer();
    player.stats.hp = 30;
    let mut harness = CombatHarness::new(player, Enemy::new("gnat", "Gnat", 500, 0));
    harness.roller = ScriptedRoller::default().with_fallback(-3);

    harness.act(CombatAction::UseItem).unwrap();
    assert_eq!(harness.player_hp().0, 60);
    assert!(harness.act(CombatAction::UseItem).is_err());
    assert_eq!(harness.player_hp().0, 60);
    assert!(!harness.encounter.can_use_item());
}

#[test]
fn test_victory_snapshot_marks_item_used() {
    let mut player = sample_healer();
    player.stats.hp = 50;
    let mut harness = CombatHarness::new(player, Enemy::new("frail", "Frail", 30, 0));
    harness.act(CombatAction::UseItem).unwrap();
    harness.act(CombatAction::Attack).unwrap();
    harness.act(CombatAction::Attack).unwrap();

    let Some(Outcome::Victory(updated)) = harness.encounter.outcome().cloned() else {
        panic!("expected victory, got {:?}", harness.phase());
    };
    assert_eq!(updated.inventory.items.iter().filter(|i| i.used).count(), 1);
    assert!(updated.inventory.has_unused_healing());
}

// =============================================================================
// Content bosses
// =============================================================================

#[test]
fn test_kaliya_poison_wave() {
    let boss = find_level(2).and_then(|l| l.boss.clone()).unwrap();
    let mut player = PLAYER_CHARACTER.clone();
    player.stats.attack = 80;
    let mut encounter = Encounter::new(player, boss);
    encounter.begin().unwrap();

    // 130 -> 50, below 52
    let res = encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
    let fired: Vec<_> = res
        .events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::SpecialTriggered { ability, .. } => Some(ability.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fired, vec!["Poison Wave"]);
    // poison 8 + attack 24
    assert_eq!(encounter.player().stats.hp, 120 - 32);
}

#[test]
fn test_every_boss_fight_terminates() {
    let curve = ProgressionConfig::default();
    for level_id in 1..=4 {
        let boss = find_level(level_id).and_then(|l| l.boss.clone()).unwrap();
        let mut rng = SeededRoller::from_seed(level_id as u64);
        let report = resolve_encounter(
            PLAYER_CHARACTER.clone(),
            boss,
            &CombatConfig::default(),
            &curve,
            &mut rng,
            std::iter::repeat(CombatAction::Attack).take(100),
        );
        let outcome = report.outcome.expect("fight should end within 100 attacks");
        println!("level {level_id}: {:?} after {} log lines", outcome.phase(), report.log.len());
        assert!(outcome.phase().is_terminal());
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_attack_damage_formula(attack in -10i32..60, enemy_hp in 1i32..400, roll in 0i32..=10) {
        let mut player = sample_player();
        player.stats.attack = attack;
        let mut encounter = Encounter::new(player, Enemy::new("foe", "Foe", enemy_hp, 0));
        encounter.begin().unwrap();
        encounter.act(CombatAction::Attack, &mut FixedRoller::new(roll)).unwrap();

        let expected = (enemy_hp - (attack + roll).max(5)).max(0);
        prop_assert_eq!(encounter.enemy().hp, expected);
    }

    #[test]
    fn prop_hp_stays_in_bounds(
        seed in any::<u64>(),
        actions in prop::collection::vec(0u8..3, 1..40),
    ) {
        let mut encounter = Encounter::new(sample_healer(), sample_enemy());
        encounter.begin().unwrap();
        let mut rng = SeededRoller::from_seed(seed);
        for choice in actions {
            let action = match choice {
                0 => CombatAction::Attack,
                1 => CombatAction::Defend,
                _ => CombatAction::UseItem,
            };
            let _ = encounter.act(action, &mut rng);
            let stats = &encounter.player().stats;
            prop_assert!(stats.hp >= 0 && stats.hp <= stats.max_hp);
            prop_assert!(encounter.enemy().hp >= 0);
            if encounter.is_over() {
                break;
            }
            let _ = encounter.settle();
        }
    }

    #[test]
    fn prop_defend_only_reduces_next_hit(attack in 0i32..80, roll in -3i32..=4) {
        let mut player = sample_player();
        player.stats.max_hp = 10_000;
        player.stats.hp = 10_000;
        let mut encounter = Encounter::new(player, Enemy::new("foe", "Foe", 100_000, attack));
        encounter.begin().unwrap();
        let mut rng = FixedRoller::new(roll);
        let base = (attack + roll).max(0);

        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        prop_assert_eq!(encounter.player().stats.hp, 10_000 - base * 35 / 100);
        encounter.settle().unwrap();
        encounter.act(CombatAction::Defend, &mut rng).unwrap();
        encounter.settle().unwrap();
        let before = encounter.player().stats.hp;
        encounter.act(CombatAction::Attack, &mut rng).unwrap();
        prop_assert_eq!(encounter.player().stats.hp, before - base);
    }

    #[test]
    fn prop_enemy_roll_in_range(seed in any::<u64>()) {
        let range = CombatConfig::default().enemy_roll;
        let mut rng = SeededRoller::from_seed(seed);
        let value = dharma_core::dice::DamageRoller::roll(&mut rng, range);
        prop_assert!(range.contains(value));
        prop_assert_eq!(range, RollRange::new(-3, 4));
    }
}

#[test]
fn test_special_with_custom_threshold() {
    let enemy = Enemy::new("naga", "Naga", 100, 0)
        .with_special(SpecialAbility::new("Bite", SpecialEffect::Poison { turns: 1 }), 0);
    let config = CombatConfig {
        special_threshold: 0.9,
        ..CombatConfig::default()
    };
    let mut encounter =
        Encounter::with_config(sample_player(), enemy, config, ProgressionConfig::default());
    encounter.begin().unwrap();
    encounter.act(CombatAction::Attack, &mut FixedRoller::new(0)).unwrap();
    assert!(encounter.status().special_used);
    assert!(encounter.status().affliction.is_none());
}
