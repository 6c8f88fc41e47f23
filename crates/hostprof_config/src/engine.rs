use crate::error::{ConfigError, Result};
use crate::settings::{DefaultValue, SettingDef};
use crate::source::ConfigSource;
use crate::store::ConfigTable;
use crate::trigger::{OnVersionChange, ReloadOutcome, ReloadPolicy, ReloadTrigger};
use crate::value::{ConfigValue, share_str};

/// Populates a [`ConfigTable`] from a [`ConfigSource`].
///
/// Every setting is derived outside the table lock and then stored in its own
/// critical section, so a concurrent reader may see some settings from before
/// a reload and some from after it, but never a half-written entry.
pub struct Memoizer<'a> {
    table: &'a ConfigTable,
    source: &'a dyn ConfigSource,
    policy: Box<dyn ReloadPolicy + 'a>,
}

impl<'a> Memoizer<'a> {
    pub fn new(table: &'a ConfigTable, source: &'a dyn ConfigSource) -> Self {
        Self {
            table,
            source,
            policy: Box::new(OnVersionChange),
        }
    }

    pub fn with_policy(mut self, policy: impl ReloadPolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn table(&self) -> &'a ConfigTable {
        self.table
    }

    /// Reads every setting once.
    ///
    /// Meant to run during single-threaded startup. Calling it again behaves
    /// like [`reload`](Self::reload).
    pub fn initialize(&self) -> Result<()> {
        tracing::debug!(
            settings = self.table.settings().len(),
            source = self.source.name(),
            "memoizing configuration"
        );
        self.populate()
    }

    /// Re-derives every setting and overwrites the table entry by entry.
    pub fn reload(&self) -> Result<()> {
        tracing::debug!(source = self.source.name(), "reloading configuration");
        self.populate()
    }

    /// Reloads if the policy says the trigger makes the memoized values stale.
    pub fn reload_on_trigger(&self, trigger: &ReloadTrigger) -> Result<ReloadOutcome> {
        if !self.policy.should_reload(trigger) {
            tracing::debug!(?trigger, "configuration reload skipped");
            return Ok(ReloadOutcome::Skipped);
        }
        tracing::info!(?trigger, "reloading configuration");
        self.reload()?;
        Ok(ReloadOutcome::Reloaded)
    }

    fn populate(&self) -> Result<()> {
        for slot in 0..self.table.settings().len() {
            self.table.update_with(slot, |def| resolve(self.source, def))?;
        }
        Ok(())
    }
}

/// Looks `def` up in `source`, falling back to its compiled-in default.
pub fn resolve(source: &dyn ConfigSource, def: &SettingDef) -> Result<ConfigValue> {
    let value = match def.default {
        DefaultValue::Str(default) => {
            let found = source.get_string_config(def.env);
            let text = found.as_deref().unwrap_or(default);
            let shared = share_str(text).map_err(|err| ConfigError::Allocation {
                setting: def.getter,
                len: text.len(),
                source: err,
            })?;
            ConfigValue::Str(shared)
        }
        DefaultValue::Int(default) => {
            ConfigValue::Int(source.get_int_config(def.env).unwrap_or(default))
        }
        DefaultValue::Bool(default) => {
            ConfigValue::Bool(source.get_bool_config(def.env).unwrap_or(default))
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::settings::{SETTINGS, SettingId};
    use crate::source::MapSource;
    use crate::trigger::NeverReload;

    /// Fails the test if the table is locked while a value is looked up.
    struct LockProbe<'t> {
        table: &'t ConfigTable,
        lookups: AtomicUsize,
    }

    impl ConfigSource for LockProbe<'_> {
        fn raw(&self, _key: &str) -> Option<String> {
            assert!(!self.table.is_locked(), "source called under the table lock");
            self.lookups.fetch_add(1, Ordering::Relaxed);
            None
        }

        fn name(&self) -> &str {
            "probe"
        }
    }

    #[test]
    fn initialize_sets_every_entry() {
        let table = ConfigTable::new();
        let source = MapSource::from_pairs(
            "test",
            [("DD_AGENT_HOST", "agent.internal"), ("DD_TRACE_DEBUG", "yes")],
        );
        Memoizer::new(&table, &source).initialize().unwrap();

        for (def, entry) in table.snapshot() {
            assert!(entry.is_set, "{} not set", def.getter);
        }
        assert_eq!(table.string(SettingId::AgentHost).as_deref(), Some("agent.internal"));
        assert_eq!(table.boolean(SettingId::TraceDebug), Some(true));
        assert_eq!(table.int(SettingId::TraceAgentPort), Some(8126));
    }

    #[test]
    fn unparsable_values_use_default() {
        let table = ConfigTable::new();
        let source = MapSource::from_pairs(
            "test",
            [("DD_TRACE_AGENT_PORT", "http"), ("DD_TRACE_ENABLED", "sometimes")],
        );
        Memoizer::new(&table, &source).initialize().unwrap();
        assert_eq!(table.int(SettingId::TraceAgentPort), Some(8126));
        assert_eq!(table.boolean(SettingId::TraceEnabled), Some(true));
    }

    #[test]
    fn source_is_never_called_under_lock() {
        let table = ConfigTable::new();
        let probe = LockProbe {
            table: &table,
            lookups: AtomicUsize::new(0),
        };
        let memoizer = Memoizer::new(&table, &probe);
        memoizer.initialize().unwrap();
        memoizer.reload().unwrap();
        assert_eq!(probe.lookups.load(Ordering::Relaxed), 2 * SETTINGS.len());
    }

    #[test]
    fn skipped_trigger_keeps_values() {
        let table = ConfigTable::new();
        let source = MapSource::from_pairs("test", [("DD_ENV", "staging")]);
        let memoizer = Memoizer::new(&table, &source).with_policy(NeverReload);
        memoizer.initialize().unwrap();

        source.set("DD_ENV", "prod");
        let outcome = memoizer.reload_on_trigger(&ReloadTrigger::Manual).unwrap();
        assert_eq!(outcome, ReloadOutcome::Skipped);
        assert_eq!(table.string(SettingId::Env).as_deref(), Some("staging"));
    }

    #[test]
    fn version_change_reloads() {
        let table = ConfigTable::new();
        let source = MapSource::from_pairs("test", [("DD_VERSION", "1.0")]);
        let memoizer = Memoizer::new(&table, &source);
        memoizer.initialize().unwrap();

        source.set("DD_VERSION", "1.1");
        let same = ReloadTrigger::VersionChange {
            previous: Some("1.0".into()),
            current: "1.0".into(),
        };
        assert_eq!(memoizer.reload_on_trigger(&same).unwrap(), ReloadOutcome::Skipped);
        assert_eq!(table.string(SettingId::Version).as_deref(), Some("1.0"));

        let changed = ReloadTrigger::VersionChange {
            previous: Some("1.0".into()),
            current: "1.1".into(),
        };
        assert_eq!(
            memoizer.reload_on_trigger(&changed).unwrap(),
            ReloadOutcome::Reloaded
        );
        assert_eq!(table.string(SettingId::Version).as_deref(), Some("1.1"));
    }
}
