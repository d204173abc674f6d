use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const DEFAULT_WIDTH: usize = 4;
pub const DEFAULT_HEIGHT: usize = 4;
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.2;
pub const DEFAULT_WIN_VALUE: u32 = 2048;

pub const INITIAL_SPAWN_COUNT: usize = 2;
pub const TURN_SPAWN_COUNT: usize = 1;

/// When the game is declared lost, checked right after blocks are spawned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossRule {
    /// Lost once at most one free cell remains.
    #[default]
    FreeCells,
    /// Lost once no direction would move any block.
    NoMovesLeft,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Probability that a spawned block has value 4 instead of 2.
    pub four_probability: f64,
    /// Reaching this value wins the game. `None` plays until lost.
    pub win_value: Option<u32>,
    pub loss_rule: LossRule,
    pub spawn_on_noop: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            win_value: Some(DEFAULT_WIN_VALUE),
            loss_rule: LossRule::default(),
            spawn_on_noop: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "board must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }

        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidConfig(format!(
                "four_probability must lie in [0, 1], got {}",
                self.four_probability
            )));
        }

        if let Some(win_value) = self.win_value.filter(|&v| v < 4 || !v.is_power_of_two()) {
            return Err(GameError::InvalidConfig(format!(
                "win_value must be a power of two of at least 4, got {win_value}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let configs = [
            GameConfig {
                width: 0,
                ..GameConfig::default()
            },
            GameConfig {
                four_probability: 1.5,
                ..GameConfig::default()
            },
            GameConfig {
                four_probability: f64::NAN,
                ..GameConfig::default()
            },
            GameConfig {
                win_value: Some(100),
                ..GameConfig::default()
            },
        ];

        for config in configs {
            assert!(
                matches!(config.validate(), Err(GameError::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "width": 5, "loss_rule": "no_moves_left" }"#).unwrap();

        assert_eq!(config.width, 5);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.loss_rule, LossRule::NoMovesLeft);
        assert_eq!(config.win_value, Some(DEFAULT_WIN_VALUE));
    }

    #[test]
    fn null_win_value_disables_winning() {
        let config: GameConfig = serde_json::from_str(r#"{ "win_value": null }"#).unwrap();

        assert_eq!(config.win_value, None);
    }
}
