use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ConfigError, Result};
use crate::settings::{DefaultValue, SETTINGS, SettingDef, SettingRef};
use crate::value::{ConfigEntry, ConfigValue};

/// Memoized values of every recognized setting, behind one mutex.
///
/// Each read or write is its own short critical section. Nothing but the
/// assignment itself (and the release of the replaced string) runs under the
/// lock; values are always produced before it is taken.
pub struct ConfigTable {
    settings: &'static [SettingDef],
    entries: Mutex<Vec<ConfigEntry<ConfigValue>>>,
}

impl ConfigTable {
    /// A table over the default catalogue, with every entry unset.
    pub fn new() -> Self {
        Self::with_settings(&SETTINGS)
    }

    pub fn with_settings(settings: &'static [SettingDef]) -> Self {
        let entries = settings
            .iter()
            .map(|def| ConfigEntry::unset(ConfigValue::zero(def.kind())))
            .collect();
        Self {
            settings,
            entries: Mutex::new(entries),
        }
    }

    pub fn settings(&self) -> &'static [SettingDef] {
        self.settings
    }

    pub fn def<S: SettingRef>(&self, setting: S) -> Option<&'static SettingDef> {
        setting.slot(self.settings).map(|slot| &self.settings[slot])
    }

    /// Copies out the value and the "is set" flag of one entry.
    ///
    /// Returns `None` only when `setting` does not name a slot of this table.
    pub fn get<S: SettingRef>(&self, setting: S) -> Option<ConfigEntry<ConfigValue>> {
        let slot = setting.slot(self.settings)?;
        let entries = self.lock();
        Some(entries[slot].clone())
    }

    /// Stores `value` and marks the entry as set.
    pub fn set<S: SettingRef>(&self, setting: S, value: ConfigValue) -> Result<()> {
        let slot = self.resolve(&setting)?;
        self.update_with(slot, |_| Ok(value))
    }

    /// Replaces one entry with the value produced by `produce`.
    ///
    /// `produce` runs before the lock is taken. If it fails the entry is left
    /// exactly as it was. The previous value is released while the lock is
    /// still held.
    pub fn update_with<F>(&self, slot: usize, produce: F) -> Result<()>
    where
        F: FnOnce(&'static SettingDef) -> Result<ConfigValue>,
    {
        let def = self
            .settings
            .get(slot)
            .ok_or_else(|| ConfigError::UnknownSetting(format!("slot {slot}")))?;
        let value = produce(def)?;
        if value.kind() != def.kind() {
            return Err(ConfigError::KindMismatch {
                setting: def.getter,
                expected: def.kind(),
                found: value.kind(),
            });
        }

        let mut entries = self.lock();
        let entry = &mut entries[slot];
        let previous = std::mem::replace(&mut entry.value, value);
        entry.is_set = true;
        drop(previous);
        drop(entries);
        Ok(())
    }

    /// Current string value, or the compiled-in default while unset.
    pub fn string<S: SettingRef>(&self, setting: S) -> Option<Arc<str>> {
        match self.effective(setting)? {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Current integer value, or the compiled-in default while unset.
    pub fn int<S: SettingRef>(&self, setting: S) -> Option<i64> {
        self.effective(setting)?.as_int()
    }

    /// Current boolean value, or the compiled-in default while unset.
    pub fn boolean<S: SettingRef>(&self, setting: S) -> Option<bool> {
        self.effective(setting)?.as_bool()
    }

    /// Copies every entry out under a single lock acquisition.
    pub fn snapshot(&self) -> Vec<(&'static SettingDef, ConfigEntry<ConfigValue>)> {
        let entries = self.lock().clone();
        self.settings.iter().zip(entries).collect()
    }

    fn effective<S: SettingRef>(&self, setting: S) -> Option<ConfigValue> {
        let slot = setting.slot(self.settings)?;
        let entry = self.get(slot)?;
        if entry.is_set {
            Some(entry.value)
        } else {
            Some(default_value(&self.settings[slot].default))
        }
    }

    fn resolve<S: SettingRef>(&self, setting: &S) -> Result<usize> {
        setting
            .slot(self.settings)
            .ok_or_else(|| ConfigError::UnknownSetting("setting is not part of this table".into()))
    }

    // Writers never leave an entry half-updated, so a poisoned lock still
    // guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<ConfigEntry<ConfigValue>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        matches!(
            self.entries.try_lock(),
            Err(std::sync::TryLockError::WouldBlock)
        )
    }
}

impl Default for ConfigTable {
    fn default() -> Self {
        Self::new()
    }
}

fn default_value(default: &DefaultValue) -> ConfigValue {
    ConfigValue::from(*default)
}
