//! Memoized extension configuration.
//!
//! [`ConfigTable`] holds the current value of every recognized setting and
//! [`Memoizer`] fills it from a [`ConfigSource`], once at startup and again
//! whenever the host reports that the configuration may be stale.

mod engine;
mod error;
mod file;
mod settings;
mod source;
mod store;
mod trigger;
mod value;

pub use engine::{Memoizer, resolve};
pub use error::{ConfigError, Result};
pub use file::FileSource;
pub use settings::{DefaultValue, SETTINGS, SettingDef, SettingId, SettingKind, SettingRef};
pub use source::{ConfigSource, EnvSource, Layered, MapSource, parse_bool, parse_int};
pub use store::ConfigTable;
pub use trigger::{AlwaysReload, NeverReload, OnVersionChange, ReloadOutcome, ReloadPolicy, ReloadTrigger};
pub use value::{ConfigEntry, ConfigValue};
