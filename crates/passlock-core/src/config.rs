//! Lock configuration persistence
//!
//! Loads and saves the options a lock screen is presented with: passcode
//! length, biometric behavior, cancellation and the optional lockout policy.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lockout::LockoutPolicy;
use crate::strings::DisplayStrings;
use crate::DEFAULT_PASSCODE_LENGTH;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory under the platform config dir
const CONFIG_DIR_NAME: &str = "passlock";

/// Options a lock screen is presented with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasscodeLockConfiguration {
    /// Number of signs in a passcode
    #[serde(default = "default_passcode_length")]
    pub passcode_length: usize,

    /// Ask for biometrics as soon as the lock is presented
    #[serde(default)]
    pub request_biometrics_immediately: bool,

    /// Whether the biometric shortcut may be offered at all
    #[serde(default = "default_true")]
    pub biometrics_allowed: bool,

    /// Whether the plain enter mode may be cancelled
    #[serde(default = "default_true")]
    pub allow_cancellation: bool,

    /// Attempt limit for the verifying states (None = unlimited retry)
    #[serde(default)]
    pub lockout: Option<LockoutPolicy>,

    /// Overrides for displayed strings
    #[serde(default)]
    pub strings: DisplayStrings,
}

fn default_passcode_length() -> usize {
    DEFAULT_PASSCODE_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for PasscodeLockConfiguration {
    fn default() -> Self {
        Self {
            passcode_length: DEFAULT_PASSCODE_LENGTH,
            request_biometrics_immediately: false,
            biometrics_allowed: true,
            allow_cancellation: true,
            lockout: None,
            strings: DisplayStrings::default(),
        }
    }
}

impl PasscodeLockConfiguration {
    /// Configuration with a custom passcode length
    pub fn with_length(passcode_length: usize) -> Self {
        Self {
            passcode_length,
            ..Default::default()
        }
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passcode_length == 0 {
            return Err(ConfigError::InvalidPasscodeLength(self.passcode_length));
        }
        Ok(())
    }

    /// Default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Passcode length must be at least 1 (got {0})")]
    InvalidPasscodeLength(usize),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = PasscodeLockConfiguration::default();
        assert_eq!(config.passcode_length, 4);
        assert!(!config.request_biometrics_immediately);
        assert!(config.biometrics_allowed);
        assert!(config.allow_cancellation);
        assert!(config.lockout.is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PasscodeLockConfiguration =
            serde_json::from_str(r#"{"passcode_length": 6}"#).unwrap();
        assert_eq!(config.passcode_length, 6);
        assert!(config.biometrics_allowed);
        assert_eq!(config.strings, DisplayStrings::default());
    }

    #[test]
    fn test_zero_length_rejected() {
        let config = PasscodeLockConfiguration::with_length(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPasscodeLength(0))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = PasscodeLockConfiguration {
            passcode_length: 6,
            request_biometrics_immediately: true,
            lockout: Some(LockoutPolicy::strict()),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = PasscodeLockConfiguration::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = tempdir().unwrap();
        let loaded = PasscodeLockConfiguration::load(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, PasscodeLockConfiguration::default());
    }

    #[test]
    fn test_load_rejects_invalid_length() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"passcode_length": 0}"#).unwrap();

        assert!(matches!(
            PasscodeLockConfiguration::load(&path),
            Err(ConfigError::InvalidPasscodeLength(0))
        ));
    }
}
