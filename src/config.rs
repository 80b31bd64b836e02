//! # Practice Settings
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults ([`PracticeConfig::default`])
//! 2. An optional YAML settings file
//! 3. Command-line flags
//!
//! Files and flags are both expressed as a [`RawConfig`] of optional fields and
//! laid over the current settings with [`PracticeConfig::apply`].
//!
//! ## Settings file
//! ```yaml
//! elements: 1, flat 3, 5      # or a YAML list
//! keys: [C, F, Bb]
//! plays-per-key: 2
//! delay: 3.0
//! octave: 4
//! tone-name-delay: 1.0
//! repeat-keys: false
//! seed: 7
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::degree::{unique_degrees, CanonicalDegree};
use crate::error::PracticeError;
use crate::key::{resolve, KeyContext};

pub const DEFAULT_PLAYS_PER_KEY: u32 = 1;
pub const DEFAULT_DELAY_SEC: f64 = 3.0;
pub const DEFAULT_OCTAVE: i32 = 4;
pub const DEFAULT_TONE_NAME_DELAY_SEC: f64 = 1.0;
pub const TONE_DURATION_SEC: f64 = 0.5;
pub const TONE_AMPLITUDE: f64 = 0.3;
pub const ANNOUNCE_DELAY_SEC: f64 = 2.0;

/// One list item; YAML reads a bare `3` as a number
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Token {
    Text(String),
    Number(u64),
}

impl Token {
    fn into_string(self) -> String {
        match self {
            Token::Text(s) => s.trim().to_string(),
            Token::Number(n) => n.to_string(),
        }
    }
}

/// Comma-separated string, single number, or YAML list
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TokenList {
    Csv(String),
    Single(u64),
    List(Vec<Token>),
}

impl TokenList {
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            TokenList::Csv(s) => split_tokens(&s),
            TokenList::Single(n) => vec![n.to_string()],
            TokenList::List(items) => items
                .into_iter()
                .map(Token::into_string)
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Raw settings for YAML deserialization and command-line overlay
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RawConfig {
    pub elements: Option<TokenList>,
    #[serde(alias = "root-notes")]
    pub keys: Option<TokenList>,
    #[serde(alias = "plays-per-root")]
    pub plays_per_key: Option<i64>,
    pub delay: Option<f64>,
    pub octave: Option<i32>,
    pub tone_name_delay: Option<f64>,
    pub tone_duration: Option<f64>,
    pub tone_amplitude: Option<f64>,
    pub announce_delay: Option<f64>,
    pub repeat_keys: Option<bool>,
    pub seed: Option<u64>,
}

/// Fully resolved run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeConfig {
    pub elements: Vec<String>,
    pub keys: Vec<String>,
    pub plays_per_key: u32,
    pub delay: f64,
    pub octave: i32,
    pub tone_name_delay: f64,
    pub tone_duration: f64,
    pub tone_amplitude: f64,
    pub announce_delay: f64,
    pub repeat_keys: bool,
    pub seed: Option<u64>,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            keys: Vec::new(),
            plays_per_key: DEFAULT_PLAYS_PER_KEY,
            delay: DEFAULT_DELAY_SEC,
            octave: DEFAULT_OCTAVE,
            tone_name_delay: DEFAULT_TONE_NAME_DELAY_SEC,
            tone_duration: TONE_DURATION_SEC,
            tone_amplitude: TONE_AMPLITUDE,
            announce_delay: ANNOUNCE_DELAY_SEC,
            repeat_keys: false,
            seed: None,
        }
    }
}

/// Waits used by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub tone_duration: Duration,
    pub tone_name_delay: Duration,
    pub cycle_delay: Duration,
    pub announce_delay: Duration,
}

/// Split a comma-separated list, trimming items and dropping empties
pub fn split_tokens(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl PracticeConfig {
    /// Parse a YAML settings file body over the defaults
    pub fn from_yaml(content: &str) -> Result<Self, PracticeError> {
        let raw: RawConfig = serde_yaml::from_str(content)
            .map_err(|e| PracticeError::ConfigError(format!("Invalid settings YAML: {}", e)))?;
        let mut config = Self::default();
        config.apply(raw);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PracticeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PracticeError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Lay `raw` over these settings, clamping values into their valid ranges
    pub fn apply(&mut self, raw: RawConfig) {
        if let Some(elements) = raw.elements {
            self.elements = elements.into_tokens();
        }
        if let Some(keys) = raw.keys {
            self.keys = keys.into_tokens();
        }
        if let Some(plays) = raw.plays_per_key {
            self.plays_per_key = u32::try_from(plays.max(1)).unwrap_or(u32::MAX);
        }
        if let Some(delay) = raw.delay {
            self.delay = non_negative(delay);
        }
        if let Some(octave) = raw.octave {
            self.octave = octave;
        }
        if let Some(delay) = raw.tone_name_delay {
            self.tone_name_delay = non_negative(delay);
        }
        if let Some(duration) = raw.tone_duration {
            self.tone_duration = non_negative(duration);
        }
        if let Some(amplitude) = raw.tone_amplitude {
            self.tone_amplitude = non_negative(amplitude).min(1.0);
        }
        if let Some(delay) = raw.announce_delay {
            self.announce_delay = non_negative(delay);
        }
        if let Some(repeat) = raw.repeat_keys {
            self.repeat_keys = repeat;
        }
        if raw.seed.is_some() {
            self.seed = raw.seed;
        }
    }

    /// Normalize and deduplicate every element. Fails on the first bad token.
    pub fn degrees(&self) -> Result<Vec<CanonicalDegree>, PracticeError> {
        if self.elements.is_empty() {
            return Err(PracticeError::ConfigError(
                "no scale degrees given".to_string(),
            ));
        }
        unique_degrees(&self.elements)
    }

    /// Resolve every key in order. Fails on the first bad token.
    pub fn resolved_keys(&self) -> Result<Vec<KeyContext>, PracticeError> {
        if self.keys.is_empty() {
            return Err(PracticeError::ConfigError("no keys given".to_string()));
        }
        self.keys
            .iter()
            .map(|token| resolve(token, self.octave))
            .collect()
    }

    pub fn timing(&self) -> Timing {
        Timing {
            tone_duration: Duration::from_secs_f64(non_negative(self.tone_duration)),
            tone_name_delay: Duration::from_secs_f64(non_negative(self.tone_name_delay)),
            cycle_delay: Duration::from_secs_f64(non_negative(self.delay)),
            announce_delay: Duration::from_secs_f64(non_negative(self.announce_delay)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PracticeConfig::default();
        assert_eq!(config.plays_per_key, 1);
        assert_eq!(config.delay, 3.0);
        assert_eq!(config.octave, 4);
        assert_eq!(config.tone_name_delay, 1.0);
        assert!(!config.repeat_keys);
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens(" 1, flat 3 ,,5 "), vec!["1", "flat 3", "5"]);
        assert!(split_tokens(" , ").is_empty());
    }

    #[test]
    fn test_yaml_csv_and_list_forms() {
        let config = PracticeConfig::from_yaml(
            "elements: 1, flat 3, 5\nkeys: [C, ' F ', Bb]\nplays-per-key: 2\n",
        )
        .unwrap();
        assert_eq!(config.elements, vec!["1", "flat 3", "5"]);
        assert_eq!(config.keys, vec!["C", "F", "Bb"]);
        assert_eq!(config.plays_per_key, 2);
        assert_eq!(config.delay, DEFAULT_DELAY_SEC);
    }

    #[test]
    fn test_yaml_numeric_items() {
        let config = PracticeConfig::from_yaml("elements: [1, b3, 5]\nkeys: C\n").unwrap();
        assert_eq!(config.elements, vec!["1", "b3", "5"]);
        let config = PracticeConfig::from_yaml("elements: 7\n").unwrap();
        assert_eq!(config.elements, vec!["7"]);
    }

    #[test]
    fn test_yaml_aliases_from_root_note_naming() {
        let config =
            PracticeConfig::from_yaml("elements: [b7]\nroot-notes: Db, F#\nplays-per-root: 3\n")
                .unwrap();
        assert_eq!(config.keys, vec!["Db", "F#"]);
        assert_eq!(config.plays_per_key, 3);
    }

    #[test]
    fn test_clamping() {
        let mut config = PracticeConfig::default();
        config.apply(RawConfig {
            plays_per_key: Some(0),
            delay: Some(-2.0),
            tone_name_delay: Some(-0.5),
            tone_amplitude: Some(4.0),
            ..Default::default()
        });
        assert_eq!(config.plays_per_key, 1);
        assert_eq!(config.delay, 0.0);
        assert_eq!(config.tone_name_delay, 0.0);
        assert_eq!(config.tone_amplitude, 1.0);
    }

    #[test]
    fn test_later_layer_wins() {
        let mut config = PracticeConfig::from_yaml("keys: C\ndelay: 5.0\noctave: 3\n").unwrap();
        config.apply(RawConfig {
            delay: Some(1.5),
            ..Default::default()
        });
        assert_eq!(config.delay, 1.5);
        assert_eq!(config.octave, 3);
        assert_eq!(config.keys, vec!["C"]);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let result = PracticeConfig::from_yaml("plays-per-key: [1, 2");
        assert!(matches!(result, Err(PracticeError::ConfigError(_))));
    }

    #[test]
    fn test_empty_lists_are_config_errors() {
        let config = PracticeConfig::default();
        assert!(matches!(config.degrees(), Err(PracticeError::ConfigError(_))));
        assert!(matches!(config.resolved_keys(), Err(PracticeError::ConfigError(_))));
    }

    #[test]
    fn test_keys_resolve_in_octave() {
        let mut config = PracticeConfig::default();
        config.apply(RawConfig {
            keys: Some(TokenList::Csv("C, Bb".to_string())),
            octave: Some(3),
            ..Default::default()
        });
        let keys = config.resolved_keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].root_midi(), 58);
    }

    #[test]
    fn test_bad_key_fails_before_anything_else() {
        let mut config = PracticeConfig::default();
        config.keys = vec!["C".to_string(), "X".to_string()];
        assert!(matches!(
            config.resolved_keys(),
            Err(PracticeError::InvalidKeyError { token }) if token == "X"
        ));
    }

    #[test]
    fn test_timing() {
        let timing = PracticeConfig::default().timing();
        assert_eq!(timing.tone_duration, Duration::from_millis(500));
        assert_eq!(timing.tone_name_delay, Duration::from_secs(1));
        assert_eq!(timing.cycle_delay, Duration::from_secs(3));
        assert_eq!(timing.announce_delay, Duration::from_secs(2));
    }
}
