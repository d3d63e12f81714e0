use std::path::PathBuf;

/// Errors raised while producing a new starting board.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("cannot generate {requested} tubes (supported range is {min}..={max})")]
    TubeCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// Every restart produced a layout with a pre-sorted tube. This means the
    /// color/capacity parameters cannot yield a playable board.
    #[error("board generation gave up after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Errors raised while reading a player's move such as `3-5` or `3 -> 5`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoveError {
    #[error("expected two tube numbers, found {0}")]
    WrongArity(usize),

    #[error("'{0}' is not a tube number")]
    NotANumber(String),

    #[error("tube numbers start at 1")]
    ZeroIndex,
}

/// Errors raised while reading a board from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("unrecognized color '{color}' in tube {tube}")]
    UnknownColor { color: char, tube: usize },

    #[error("tube {tube} holds {len} tokens but capacity is {capacity}")]
    TubeOverCapacity {
        tube: usize,
        len: usize,
        capacity: usize,
    },

    #[error("board has no tubes")]
    Empty,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_error_display() {
        let err = GenerateError::TubeCountOutOfRange {
            requested: 12,
            min: 3,
            max: 9,
        };
        assert_eq!(
            err.to_string(),
            "cannot generate 12 tubes (supported range is 3..=9)"
        );
        let err = GenerateError::Exhausted { attempts: 100 };
        assert_eq!(err.to_string(), "board generation gave up after 100 attempts");
        let err = GenerateError::from(ConfigError::Validation(
            "capacity must be at least 2".into(),
        ));
        assert_eq!(
            err.to_string(),
            "invalid generator configuration: config validation error: capacity must be at least 2"
        );
    }

    #[test]
    fn test_parse_move_error_display() {
        assert_eq!(
            ParseMoveError::WrongArity(3).to_string(),
            "expected two tube numbers, found 3"
        );
        assert_eq!(
            ParseMoveError::NotANumber("x".to_string()).to_string(),
            "'x' is not a tube number"
        );
    }

    #[test]
    fn test_board_parse_error_display() {
        let err = BoardParseError::TubeOverCapacity {
            tube: 2,
            len: 5,
            capacity: 4,
        };
        assert_eq!(err.to_string(), "tube 2 holds 5 tokens but capacity is 4");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("capacity must be at least 2".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: capacity must be at least 2"
        );
    }
}
