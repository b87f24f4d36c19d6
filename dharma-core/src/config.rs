//! Tunable constants for combat and progression.
//!
//! Defaults reproduce the shipped balance. A TOML file may override any
//! subset of fields:
//!
//! ```toml
//! seed = 42
//!
//! [combat]
//! heal_amount = 25
//!
//! [progression]
//! xp_per_level = 250
//! ```

use crate::dice::RollRange;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Combat formula constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CombatConfig {
    /// Floor applied to every player attack.
    pub min_player_damage: i32,
    /// Offset added to the player's attack stat.
    pub player_roll: RollRange,
    /// Offset added to the enemy's attack stat.
    pub enemy_roll: RollRange,
    /// Multiplier on the enemy attack that follows a Defend.
    pub block_multiplier: f64,
    /// Hp restored by a healing item.
    pub heal_amount: i32,
    /// Damage dealt by each poison tick.
    pub poison_damage: i32,
    /// Fraction of max hp below which the enemy special arms.
    pub special_threshold: f64,
    /// Hp restored to the player after a victory.
    pub victory_heal: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            min_player_damage: 5,
            player_roll: RollRange::new(0, 10),
            enemy_roll: RollRange::new(-3, 4),
            block_multiplier: 0.35,
            heal_amount: 30,
            poison_damage: 8,
            special_threshold: 0.40,
            victory_heal: 20,
        }
    }
}

impl CombatConfig {
    pub fn with_heal_amount(mut self, amount: i32) -> Self {
        self.heal_amount = amount;
        self
    }

    pub fn with_block_multiplier(mut self, multiplier: f64) -> Self {
        self.block_multiplier = multiplier;
        self
    }

    pub fn with_poison_damage(mut self, damage: i32) -> Self {
        self.poison_damage = damage;
        self
    }

    pub fn with_player_roll(mut self, range: RollRange) -> Self {
        self.player_roll = range;
        self
    }

    pub fn with_enemy_roll(mut self, range: RollRange) -> Self {
        self.enemy_roll = range;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.block_multiplier) {
            return Err(ConfigError::Invalid(format!(
                "block_multiplier must be within 0..=1, got {}",
                self.block_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.special_threshold) {
            return Err(ConfigError::Invalid(format!(
                "special_threshold must be within 0..=1, got {}",
                self.special_threshold
            )));
        }
        if !self.player_roll.is_valid() || !self.enemy_roll.is_valid() {
            return Err(ConfigError::Invalid("roll range low exceeds high".to_string()));
        }
        if self.min_player_damage < 0
            || self.heal_amount < 0
            || self.poison_damage < 0
            || self.victory_heal < 0
        {
            return Err(ConfigError::Invalid("amounts must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Experience curve constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressionConfig {
    pub xp_per_level: u32,
    /// Level id unlocked at the start of a journey.
    pub first_level_id: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: 200,
            first_level_id: 1,
        }
    }
}

impl ProgressionConfig {
    /// `floor(xp / xp_per_level) + 1`.
    pub fn level_for_xp(&self, xp: u32) -> u32 {
        xp / self.xp_per_level.max(1) + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.xp_per_level == 0 {
            return Err(ConfigError::Invalid("xp_per_level must be positive".to_string()));
        }
        Ok(())
    }
}

/// Top-level configuration for a game session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub progression: ProgressionConfig,
    /// Fixed seed for the combat roller; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.progression.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.combat.heal_amount, 30);
        assert_eq!(config.combat.poison_damage, 8);
        assert_eq!(config.combat.enemy_roll, RollRange::new(-3, 4));
        assert_eq!(config.progression.xp_per_level, 200);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 9

            [combat]
            heal_amount = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.combat.heal_amount, 25);
        assert_eq!(config.combat.poison_damage, 8);
        assert_eq!(config.progression, ProgressionConfig::default());
    }

    #[test]
    fn test_roll_range_table() {
        let config = GameConfig::from_toml_str(
            r#"
            [combat]
            player_roll = { low = 1, high = 6 }
            "#,
        )
        .unwrap();
        assert_eq!(config.combat.player_roll, RollRange::new(1, 6));
    }

    #[test]
    fn test_rejects_bad_multiplier() {
        let err = GameConfig::from_toml_str("[combat]\nblock_multiplier = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_xp_per_level() {
        let err = GameConfig::from_toml_str("[progression]\nxp_per_level = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = GameConfig::from_toml_str("[combat\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_level_for_xp() {
        let progression = ProgressionConfig::default();
        assert_eq!(progression.level_for_xp(0), 1);
        assert_eq!(progression.level_for_xp(199), 1);
        assert_eq!(progression.level_for_xp(200), 2);
        assert_eq!(progression.level_for_xp(650), 4);
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::default()
            .with_seed(3)
            .with_combat(CombatConfig::default().with_heal_amount(10));
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.combat.heal_amount, 10);
    }

    #[test]
    fn test_combat_builders_validate() {
        let combat = CombatConfig::default()
            .with_poison_damage(3)
            .with_enemy_roll(RollRange::new(0, 0))
            .with_block_multiplier(0.5);
        assert_eq!(combat.poison_damage, 3);
        assert_eq!(combat.enemy_roll, RollRange::new(0, 0));
        assert!(combat.validate().is_ok());

        let inverted = CombatConfig::default().with_enemy_roll(RollRange::new(4, -3));
        assert!(matches!(inverted.validate(), Err(ConfigError::Invalid(_))));
        let heavy = CombatConfig::default().with_block_multiplier(1.5);
        assert!(matches!(heavy.validate(), Err(ConfigError::Invalid(_))));
    }
}
