use std::collections::TryReserveError;
use std::fmt;
use std::sync::Arc;

use crate::settings::{DefaultValue, SettingKind};

/// A memoized setting value.
///
/// Strings are shared immutable buffers: the table keeps one reference and
/// every reader gets its own clone, so replacing an entry never frees memory a
/// reader still holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Str(Arc<str>),
    Int(i64),
    Bool(bool),
}

impl ConfigValue {
    /// Zero-equivalent stored in unset entries.
    pub fn zero(kind: SettingKind) -> Self {
        match kind {
            SettingKind::Str => ConfigValue::Str(Arc::from("")),
            SettingKind::Int => ConfigValue::Int(0),
            SettingKind::Bool => ConfigValue::Bool(false),
        }
    }

    pub fn kind(&self) -> SettingKind {
        match self {
            ConfigValue::Str(_) => SettingKind::Str,
            ConfigValue::Int(_) => SettingKind::Int,
            ConfigValue::Bool(_) => SettingKind::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(Arc::from(value))
    }
}

impl From<DefaultValue> for ConfigValue {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Str(s) => ConfigValue::from(s),
            DefaultValue::Int(i) => ConfigValue::Int(i),
            DefaultValue::Bool(b) => ConfigValue::Bool(b),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => write!(f, "{s:?}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Copies `value` into a fresh shared buffer.
///
/// Lengths the allocator rejects up front are reported as an error. The final
/// move into the `Arc` allocates again and, like every `Arc` constructor on
/// stable Rust, aborts if memory runs out at that point.
pub(crate) fn share_str(value: &str) -> Result<Arc<str>, TryReserveError> {
    let mut staged = stage(value.len())?;
    staged.push_str(value);
    Ok(Arc::from(staged))
}

fn stage(len: usize) -> Result<String, TryReserveError> {
    let mut staged = String::new();
    staged.try_reserve_exact(len)?;
    Ok(staged)
}

/// One slot of the table.
///
/// When `is_set` is false `value` is the zero of its type and carries no
/// meaning; readers fall back to the compiled-in default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry<T> {
    pub value: T,
    pub is_set: bool,
}

impl<T> ConfigEntry<T> {
    pub fn unset(zero: T) -> Self {
        Self {
            value: zero,
            is_set: false,
        }
    }

    pub fn set(value: T) -> Self {
        Self {
            value,
            is_set: true,
        }
    }

    /// The value, or `None` while the entry has never been set.
    pub fn get(&self) -> Option<&T> {
        self.is_set.then_some(&self.value)
    }

    pub fn into_parts(self) -> (T, bool) {
        (self.value, self.is_set)
    }
}
