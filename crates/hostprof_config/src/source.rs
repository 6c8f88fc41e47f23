use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::settings::SettingKind;

/// Where setting values come from.
///
/// Implementors only provide [`raw`](ConfigSource::raw). The typed lookups
/// return `None` for "not set", which includes values that do not parse.
pub trait ConfigSource: Send + Sync {
    /// Raw value for an environment key, if this source has one.
    fn raw(&self, key: &str) -> Option<String>;

    /// Short label used when reporting where a value came from.
    fn name(&self) -> &str;

    /// Name of the source that answers for `key` when read as `kind`.
    ///
    /// Agrees with the typed lookups: a value that does not parse as `kind`
    /// has no origin.
    fn origin(&self, key: &str, kind: SettingKind) -> Option<&str> {
        let answers = match kind {
            SettingKind::Str => self.get_string_config(key).is_some(),
            SettingKind::Int => self.get_int_config(key).is_some(),
            SettingKind::Bool => self.get_bool_config(key).is_some(),
        };
        answers.then(|| self.name())
    }

    fn get_string_config(&self, key: &str) -> Option<String> {
        self.raw(key)
    }

    fn get_int_config(&self, key: &str) -> Option<i64> {
        parse_int(&self.raw(key)?)
    }

    fn get_bool_config(&self, key: &str) -> Option<bool> {
        parse_bool(&self.raw(key)?)
    }
}

pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn raw(&self, key: &str) -> Option<String> {
        (**self).raw(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn origin(&self, key: &str, kind: SettingKind) -> Option<&str> {
        (**self).origin(key, kind)
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for Box<S> {
    fn raw(&self, key: &str) -> Option<String> {
        (**self).raw(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn origin(&self, key: &str, kind: SettingKind) -> Option<&str> {
        (**self).origin(key, kind)
    }
}

/// Reads the process environment. Empty variables count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }

    fn name(&self) -> &str {
        "env"
    }
}

/// In-memory key/value source. Values can be changed between reloads.
#[derive(Debug, Default)]
pub struct MapSource {
    name: String,
    values: RwLock<IndexMap<String, String>>,
}

impl MapSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(IndexMap::new()),
        }
    }

    pub fn from_pairs<K, V, I>(name: impl Into<String>, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            name: name.into(),
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl ConfigSource for MapSource {
    fn raw(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Asks each layer in order; the first one holding a parsable value wins.
#[derive(Default)]
pub struct Layered {
    layers: Vec<Box<dyn ConfigSource>>,
}

impl Layered {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Adds a layer with lower precedence than every layer added before.
    pub fn with(mut self, layer: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn first<T>(&self, lookup: impl Fn(&dyn ConfigSource) -> Option<T>) -> Option<T> {
        self.layers.iter().find_map(|layer| lookup(layer.as_ref()))
    }
}

impl ConfigSource for Layered {
    fn raw(&self, key: &str) -> Option<String> {
        self.first(|layer| layer.raw(key))
    }

    fn name(&self) -> &str {
        "layered"
    }

    fn origin(&self, key: &str, kind: SettingKind) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.origin(key, kind))
    }

    // A layer whose value does not parse must not hide a valid one below it.
    fn get_int_config(&self, key: &str) -> Option<i64> {
        self.first(|layer| layer.get_int_config(key))
    }

    fn get_bool_config(&self, key: &str) -> Option<bool> {
        self.first(|layer| layer.get_bool_config(key))
    }
}
