use qcbingo_core::board::{validate_board_size, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use qcbingo_core::compatibility::CompatibilityRules;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: String,
        value: String,
    },
}

/// Which compatibility table the session starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesPreset {
    Builtin,
    Permissive,
}

impl RulesPreset {
    pub fn rules(self) -> CompatibilityRules {
        match self {
            RulesPreset::Builtin => CompatibilityRules::builtin(),
            RulesPreset::Permissive => CompatibilityRules::permissive(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Board size (default: `5`).
    pub board_size: usize,
    /// Compatibility table preset (default: `builtin`).
    pub rules: RulesPreset,
    /// Validator id used by `mark` actions that do not name one (default: `qc`).
    pub validator_id: String,
    /// Log output format (default: `text`).
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            rules: RulesPreset::Builtin,
            validator_id: "qc".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default   |
    /// |----------------------|-----------|
    /// | `BINGO_BOARD_SIZE`   | `5`       |
    /// | `BINGO_RULES`        | `builtin` |
    /// | `BINGO_VALIDATOR_ID` | `qc`      |
    /// | `LOG_FORMAT`         | `text`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let board_size = match lookup("BINGO_BOARD_SIZE") {
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|size| validate_board_size(*size).is_ok());
                parsed.ok_or(ConfigError::Invalid {
                    key: "BINGO_BOARD_SIZE",
                    expected: format!("a board size between 1 and {MAX_BOARD_SIZE}"),
                    value: raw,
                })?
            }
            None => defaults.board_size,
        };

        let rules = match lookup("BINGO_RULES").as_deref().map(str::trim) {
            None | Some("builtin") => RulesPreset::Builtin,
            Some("permissive") => RulesPreset::Permissive,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "BINGO_RULES",
                    expected: "'builtin' or 'permissive'".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let validator_id = lookup("BINGO_VALIDATOR_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.validator_id);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    expected: "'text' or 'json'".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            board_size,
            rules,
            validator_id,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.board_size, 5);
    }

    #[test]
    fn reads_all_keys() {
        let config = CliConfig::from_lookup(lookup(&[
            ("BINGO_BOARD_SIZE", "3"),
            ("BINGO_RULES", "permissive"),
            ("BINGO_VALIDATOR_ID", "sup2"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.board_size, 3);
        assert_eq!(config.rules, RulesPreset::Permissive);
        assert_eq!(config.validator_id, "sup2");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_board_size_is_an_error() {
        for raw in ["0", "abc", "99"] {
            assert_matches!(
                CliConfig::from_lookup(lookup(&[("BINGO_BOARD_SIZE", raw)])),
                Err(ConfigError::Invalid { key: "BINGO_BOARD_SIZE", .. })
            );
        }
    }

    #[test]
    fn board_size_error_names_the_limit() {
        let err = CliConfig::from_lookup(lookup(&[("BINGO_BOARD_SIZE", "99")])).unwrap_err();
        assert!(err
            .to_string()
            .contains(&format!("between 1 and {MAX_BOARD_SIZE}")));
    }

    #[test]
    fn unknown_rules_preset_is_an_error() {
        assert_matches!(
            CliConfig::from_lookup(lookup(&[("BINGO_RULES", "strict")])),
            Err(ConfigError::Invalid { key: "BINGO_RULES", .. })
        );
    }

    #[test]
    fn blank_validator_falls_back_to_default() {
        let config = CliConfig::from_lookup(lookup(&[("BINGO_VALIDATOR_ID", "  ")])).unwrap();
        assert_eq!(config.validator_id, "qc");
    }
}
