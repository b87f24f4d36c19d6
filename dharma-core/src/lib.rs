//! Combat and progression engine for Dharma Warriors.
//!
//! This crate provides:
//! - A turn-based combat engine with an injectable damage roller
//! - A mission/level progression controller that owns all game state
//! - Static content tables for the four-level campaign
//! - A headless event facade for scripted play
//!
//! # Quick Start
//!
//! ```
//! use dharma_core::{CombatAction, Encounter, SeededRoller};
//! use dharma_core::content::{find_level, PLAYER_CHARACTER};
//!
//! let boss = find_level(1).and_then(|l| l.boss.clone()).unwrap();
//! let mut encounter = Encounter::new(PLAYER_CHARACTER.clone(), boss);
//! let mut rng = SeededRoller::from_seed(7);
//!
//! encounter.begin().unwrap();
//! while !encounter.is_over() {
//!     encounter.act(CombatAction::Attack, &mut rng).unwrap();
//!     let _ = encounter.settle();
//! }
//! println!("{:?}", encounter.phase());
//! ```

pub mod combat;
pub mod config;
pub mod content;
pub mod dice;
pub mod headless;
pub mod progression;
pub mod testing;
pub mod world;

// Primary public API
pub use combat::{
    resolve_encounter, CombatAction, CombatEvent, CombatPhase, Encounter, LogEntry, LogKind,
    Outcome, Rejected, Resolution,
};
pub use config::{CombatConfig, ConfigError, GameConfig, ProgressionConfig};
pub use dice::{DamageRoller, RollRange, SeededRoller};
pub use headless::{GameError, HeadlessGame, PlayerEvent, Response};
pub use progression::{
    Effect, Ending, GamePhase, MissionLaunch, ProgressionController, ProgressionError,
    SkillRejected, SubInteraction, SubOutcome,
};
pub use testing::{CombatHarness, FixedRoller, ScriptedRoller};
pub use world::{Enemy, Level, Mission, MissionType, PlayerCharacter, Reward, Skill, Stats};
