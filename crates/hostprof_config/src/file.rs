use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::{ConfigError, Result};
use crate::settings::{SETTINGS, SettingDef, SettingKind};
use crate::source::{ConfigSource, parse_bool, parse_int};

/// Configuration layer read from a YAML file.
///
/// The file is a flat mapping from environment key to scalar:
///
/// ```yaml
/// DD_AGENT_HOST: agent.internal
/// DD_TRACE_AGENT_PORT: 8126
/// DD_PROFILING_ENABLED: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FileSource {
    #[serde(deserialize_with = "scalars")]
    values: IndexMap<String, String>,
    /// File the values were read from, if any.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut source = Self::parse(&std::fs::read_to_string(path)?)?;
        source.path = Some(path.canonicalize()?);
        Ok(source)
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let source: FileSource = serde_yaml::from_str(yaml)?;
        source.validate(&SETTINGS)?;
        Ok(source)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that every recognized key holds a value of the right type.
    /// Unrecognized keys are kept but reported.
    pub fn validate(&self, settings: &[SettingDef]) -> Result<()> {
        for (key, value) in self.values.iter() {
            if key.is_empty() {
                return Err(ConfigError::InvalidFile("Keys must not be empty".to_string()));
            }

            let Some(def) = settings.iter().find(|def| def.env == key.as_str()) else {
                tracing::warn!("ignoring unknown setting {key} in config file");
                continue;
            };

            let valid = match def.kind() {
                SettingKind::Str => true,
                SettingKind::Int => parse_int(value).is_some(),
                SettingKind::Bool => parse_bool(value).is_some(),
            };
            if !valid {
                return Err(ConfigError::InvalidFile(format!(
                    "{key} expects {} value, got {value:?}",
                    def.kind()
                )));
            }
        }
        Ok(())
    }
}

/// Reads a flat mapping, turning scalars into their string form and dropping
/// null entries.
fn scalars<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    let mut values = IndexMap::with_capacity(raw.len());
    for (key, value) in raw {
        let text = match value {
            Value::Null => continue,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
                return Err(<D::Error as serde::de::Error>::custom(format!(
                    "{key} must be a scalar value"
                )));
            }
        };
        values.insert(key, text);
    }
    Ok(values)
}

impl ConfigSource for FileSource {
    fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn name(&self) -> &str {
        "file"
    }
}
