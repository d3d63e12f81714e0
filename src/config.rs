use std::collections::HashSet;
use std::path::Path;

use crate::engine::{Color, DEFAULT_CAPACITY};
use crate::error::ConfigError;
use crate::solver::SolverConfig;

/// Immutable game parameters, loadable from TOML.
///
/// Passed explicitly to the generator, solver and presentation layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tokens per full tube.
    pub capacity: usize,
    /// Colors in the order they are handed out; a board with `c` colors uses the first `c`.
    pub palette: Vec<Color>,
    /// Smallest tube count picked when none is requested.
    pub min_tubes: usize,
    /// Largest tube count picked when none is requested.
    pub max_tubes: usize,
    /// Empty tubes appended to every generated board.
    pub empty_tubes: usize,
    /// Full layout restarts before generation gives up.
    pub generation_attempts: usize,
    pub solver: SolverConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            capacity: DEFAULT_CAPACITY,
            palette: Color::ALL.to_vec(),
            min_tubes: 5,
            max_tubes: 9,
            empty_tubes: 2,
            generation_attempts: 100,
            solver: SolverConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GameConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Number of colors a board with `tube_count` tubes uses.
    pub fn color_count(&self, tube_count: usize) -> usize {
        tube_count.saturating_sub(self.empty_tubes)
    }

    /// Validate that all configuration values are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 {
            return Err(ConfigError::Validation("capacity must be at least 2".into()));
        }
        if self.min_tubes > self.max_tubes {
            return Err(ConfigError::Validation(format!(
                "min_tubes ({}) must not exceed max_tubes ({})",
                self.min_tubes, self.max_tubes
            )));
        }
        if self.min_tubes <= self.empty_tubes {
            return Err(ConfigError::Validation(format!(
                "min_tubes ({}) must leave room for colors beside {} empty tubes",
                self.min_tubes, self.empty_tubes
            )));
        }
        if self.color_count(self.max_tubes) > self.palette.len() {
            return Err(ConfigError::Validation(format!(
                "max_tubes ({}) needs {} colors but the palette has {}",
                self.max_tubes,
                self.color_count(self.max_tubes),
                self.palette.len()
            )));
        }
        let distinct: HashSet<Color> = self.palette.iter().copied().collect();
        if distinct.len() != self.palette.len() {
            return Err(ConfigError::Validation("palette contains duplicate colors".into()));
        }
        if self.generation_attempts == 0 {
            return Err(ConfigError::Validation("generation_attempts must be > 0".into()));
        }
        if self.solver.max_states == Some(0) {
            return Err(ConfigError::Validation("solver.max_states must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 4);
        assert_eq!(config.palette.len(), 7);
        assert_eq!(config.color_count(9), 7);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            max_tubes = 6
            palette = ["red", "blue", "yellow", "white"]

            [solver]
            max_states = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.max_tubes, 6);
        assert_eq!(config.min_tubes, 5);
        assert_eq!(config.palette[1], Color::Blue);
        assert_eq!(config.solver.max_states, Some(5000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_inconsistent_values() {
        let cases = [
            GameConfig {
                capacity: 1,
                ..GameConfig::default()
            },
            GameConfig {
                min_tubes: 8,
                max_tubes: 6,
                ..GameConfig::default()
            },
            GameConfig {
                min_tubes: 2,
                ..GameConfig::default()
            },
            GameConfig {
                max_tubes: 10,
                ..GameConfig::default()
            },
            GameConfig {
                palette: vec![
                    Color::Red,
                    Color::Red,
                    Color::Blue,
                    Color::Green,
                    Color::Cyan,
                    Color::White,
                    Color::Yellow,
                ],
                ..GameConfig::default()
            },
            GameConfig {
                generation_attempts: 0,
                ..GameConfig::default()
            },
            GameConfig {
                solver: SolverConfig {
                    max_states: Some(0),
                },
                ..GameConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "expected validation failure for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = Path::new("definitely/not/here/color_sort.toml");
        assert_eq!(GameConfig::load_or_default(path).unwrap(), GameConfig::default());
        assert!(matches!(
            GameConfig::load(path),
            Err(ConfigError::FileRead { .. })
        ));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let path = std::env::temp_dir().join(format!("color_sort_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "capacity = \"four\"").unwrap();
        let result = GameConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
