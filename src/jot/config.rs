use crate::error::{JotError, Result};
use crate::limits::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_NOTE_COUNT, DEFAULT_MAX_TOTAL_SIZE};
use crate::names::{
    DEFAULT_ALPHABET, DEFAULT_MAX_PATH_LENGTH, DEFAULT_MIN_LEN, MAX_GENERATED_LEN,
};
use crate::sweep::{DEFAULT_INACTIVITY_DAYS, DEFAULT_INTERVAL_HOURS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SAVE_DIR: &str = "notes";
const DEFAULT_BACKUP_DIR: &str = "backup";

/// Configuration for jot, stored in `<home>/config.json`.
///
/// Missing keys take their defaults. Zero or empty values are treated as
/// unset, so a hand-edited `"maxNoteCount": 0` does not lock out all writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct JotConfig {
    /// Active tier, relative to the home directory unless absolute.
    pub save_dir: String,
    /// Backup tier, relative to the home directory unless absolute.
    pub backup_dir: String,
    /// Starting length for generated names.
    pub note_name_len: usize,
    /// Alphabet for generated names.
    pub note_chars: String,
    /// Days of inactivity before a partition is swept.
    pub backup_days: u32,
    pub sweep_interval_hours: u64,
    pub max_file_size: u64,
    /// Longest accepted note name, in bytes.
    pub max_path_length: usize,
    pub max_total_size: u64,
    pub max_note_count: usize,
}

impl Default for JotConfig {
    fn default() -> Self {
        Self {
            save_dir: DEFAULT_SAVE_DIR.to_string(),
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
            note_name_len: DEFAULT_MIN_LEN,
            note_chars: DEFAULT_ALPHABET.to_string(),
            backup_days: DEFAULT_INACTIVITY_DAYS,
            sweep_interval_hours: DEFAULT_INTERVAL_HOURS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_note_count: DEFAULT_MAX_NOTE_COUNT,
        }
    }
}

impl JotConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(JotError::Io)?;
        let config: JotConfig = serde_json::from_str(&content)
            .map_err(|e| JotError::Config(format!("{}: {}", config_path.display(), e)))?;
        Ok(config.normalized())
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(JotError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(JotError::Serialization)?;
        fs::write(config_path, content).map_err(JotError::Io)?;
        Ok(())
    }

    /// Replaces zero and empty values with defaults.
    ///
    /// `note_name_len` is capped at both [`MAX_GENERATED_LEN`] and
    /// `max_path_length`, so generated names always pass the safe-name check.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let max_path_length = non_zero(self.max_path_length, defaults.max_path_length);
        let note_name_len = non_zero(self.note_name_len, defaults.note_name_len)
            .min(MAX_GENERATED_LEN)
            .min(max_path_length);
        Self {
            save_dir: non_empty(self.save_dir, defaults.save_dir),
            backup_dir: non_empty(self.backup_dir, defaults.backup_dir),
            note_name_len,
            note_chars: non_empty(self.note_chars, defaults.note_chars),
            backup_days: non_zero(self.backup_days, defaults.backup_days),
            sweep_interval_hours: non_zero(self.sweep_interval_hours, defaults.sweep_interval_hours),
            max_file_size: non_zero(self.max_file_size, defaults.max_file_size),
            max_path_length,
            max_total_size: non_zero(self.max_total_size, defaults.max_total_size),
            max_note_count: non_zero(self.max_note_count, defaults.max_note_count),
        }
    }
}

fn non_empty(value: String, default: String) -> String {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn non_zero<T: Default + PartialEq>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_missing() {
        let tmp = TempDir::new().unwrap();
        let config = JotConfig::load(tmp.path()).unwrap();
        assert_eq!(config, JotConfig::default());
        assert_eq!(config.note_name_len, 3);
        assert_eq!(config.backup_days, 7);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let config = JotConfig {
            note_name_len: 5,
            max_note_count: 42,
            ..JotConfig::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(JotConfig::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn reads_camel_case_keys_and_fills_gaps() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"{"noteNameLen": 4, "maxNoteCount": 0, "noteChars": "", "backupDays": 2}"#,
        )
        .unwrap();

        let config = JotConfig::load(tmp.path()).unwrap();
        assert_eq!(config.note_name_len, 4);
        assert_eq!(config.backup_days, 2);
        assert_eq!(config.max_note_count, DEFAULT_MAX_NOTE_COUNT);
        assert_eq!(config.note_chars, DEFAULT_ALPHABET);
    }

    #[test]
    fn note_name_len_is_capped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), r#"{"noteNameLen": 50}"#).unwrap();
        let config = JotConfig::load(tmp.path()).unwrap();
        assert_eq!(config.note_name_len, MAX_GENERATED_LEN);

        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"{"noteNameLen": 10, "maxPathLength": 6}"#,
        )
        .unwrap();
        let config = JotConfig::load(tmp.path()).unwrap();
        assert_eq!(config.note_name_len, 6);
        assert_eq!(config.max_path_length, 6);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "{oops").unwrap();
        assert!(matches!(
            JotConfig::load(tmp.path()),
            Err(JotError::Config(_))
        ));
    }
}
