use std::collections::TryReserveError;

use thiserror::Error;

use crate::settings::SettingKind;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Setting {setting} holds {expected} values, got a {found} value")]
    KindMismatch {
        setting: &'static str,
        expected: SettingKind,
        found: SettingKind,
    },

    #[error("Failed to allocate {len} bytes for setting {setting}")]
    Allocation {
        setting: &'static str,
        len: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config file: {0}")]
    InvalidFile(String),
}
