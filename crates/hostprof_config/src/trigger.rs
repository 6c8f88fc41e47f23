/// Why the host suspects the memoized configuration is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadTrigger {
    /// The host observed a version transition, e.g. a new application
    /// version picked up by a long-lived worker.
    VersionChange {
        previous: Option<String>,
        current: String,
    },
    /// An operator asked for a reload.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded,
    Skipped,
}

/// Decides whether a trigger warrants a reload.
pub trait ReloadPolicy: Send + Sync {
    fn should_reload(&self, trigger: &ReloadTrigger) -> bool;
}

impl<F> ReloadPolicy for F
where
    F: Fn(&ReloadTrigger) -> bool + Send + Sync,
{
    fn should_reload(&self, trigger: &ReloadTrigger) -> bool {
        self(trigger)
    }
}

/// Reloads on manual triggers and on versions that actually differ.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnVersionChange;

impl ReloadPolicy for OnVersionChange {
    fn should_reload(&self, trigger: &ReloadTrigger) -> bool {
        match trigger {
            ReloadTrigger::VersionChange { previous, current } => {
                previous.as_deref() != Some(current.as_str())
            }
            ReloadTrigger::Manual => true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NeverReload;

impl ReloadPolicy for NeverReload {
    fn should_reload(&self, _: &ReloadTrigger) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysReload;

impl ReloadPolicy for AlwaysReload {
    fn should_reload(&self, _: &ReloadTrigger) -> bool {
        true
    }
}
