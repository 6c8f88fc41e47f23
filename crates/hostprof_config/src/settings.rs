//! The catalogue of recognized settings.
//!
//! [`SETTINGS`] is the only place where a setting is declared. Both
//! [`Memoizer::initialize`](crate::Memoizer::initialize) and
//! [`Memoizer::reload`](crate::Memoizer::reload) walk it in declaration order.

use std::fmt;

/// Compiled-in default of a setting. Its variant also fixes the setting's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Str,
    Int,
    Bool,
}

impl DefaultValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            DefaultValue::Str(_) => SettingKind::Str,
            DefaultValue::Int(_) => SettingKind::Int,
            DefaultValue::Bool(_) => SettingKind::Bool,
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingKind::Str => "string",
            SettingKind::Int => "integer",
            SettingKind::Bool => "boolean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDef {
    /// Name of the memoized getter, e.g. `get_dd_agent_host`.
    pub getter: &'static str,
    /// Environment variable the value is read from.
    pub env: &'static str,
    pub default: DefaultValue,
}

impl SettingDef {
    pub const fn new(getter: &'static str, env: &'static str, default: DefaultValue) -> Self {
        Self {
            getter,
            env,
            default,
        }
    }

    pub fn kind(&self) -> SettingKind {
        self.default.kind()
    }

    /// Matches either the getter name or the environment key.
    pub fn is_named(&self, name: &str) -> bool {
        self.getter == name || self.env == name
    }
}

/// Settings memoized by the extension, in declaration order.
pub static SETTINGS: [SettingDef; SettingId::COUNT] = [
    SettingDef::new("get_dd_agent_host", "DD_AGENT_HOST", DefaultValue::Str("localhost")),
    SettingDef::new("get_dd_trace_agent_port", "DD_TRACE_AGENT_PORT", DefaultValue::Int(8126)),
    SettingDef::new("get_dd_service", "DD_SERVICE", DefaultValue::Str("")),
    SettingDef::new("get_dd_env", "DD_ENV", DefaultValue::Str("")),
    SettingDef::new("get_dd_version", "DD_VERSION", DefaultValue::Str("")),
    SettingDef::new("get_dd_trace_enabled", "DD_TRACE_ENABLED", DefaultValue::Bool(true)),
    SettingDef::new("get_dd_trace_debug", "DD_TRACE_DEBUG", DefaultValue::Bool(false)),
    SettingDef::new(
        "get_dd_distributed_tracing",
        "DD_DISTRIBUTED_TRACING",
        DefaultValue::Bool(true),
    ),
    SettingDef::new(
        "get_dd_trace_agent_timeout",
        "DD_TRACE_AGENT_TIMEOUT",
        DefaultValue::Int(500),
    ),
    SettingDef::new(
        "get_dd_trace_agent_connect_timeout",
        "DD_TRACE_AGENT_CONNECT_TIMEOUT",
        DefaultValue::Int(100),
    ),
    SettingDef::new(
        "get_dd_trace_spans_limit",
        "DD_TRACE_SPANS_LIMIT",
        DefaultValue::Int(1000),
    ),
    SettingDef::new(
        "get_dd_integrations_disabled",
        "DD_INTEGRATIONS_DISABLED",
        DefaultValue::Str(""),
    ),
    SettingDef::new(
        "get_dd_profiling_enabled",
        "DD_PROFILING_ENABLED",
        DefaultValue::Bool(true),
    ),
    SettingDef::new(
        "get_dd_profiling_experimental_timeline_enabled",
        "DD_PROFILING_EXPERIMENTAL_TIMELINE_ENABLED",
        DefaultValue::Bool(false),
    ),
    SettingDef::new(
        "get_dd_profiling_log_level",
        "DD_PROFILING_LOG_LEVEL",
        DefaultValue::Str("off"),
    ),
];

/// Typed handle into [`SETTINGS`]. The discriminant is the setting's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingId {
    AgentHost,
    TraceAgentPort,
    Service,
    Env,
    Version,
    TraceEnabled,
    TraceDebug,
    DistributedTracing,
    TraceAgentTimeout,
    TraceAgentConnectTimeout,
    TraceSpansLimit,
    IntegrationsDisabled,
    ProfilingEnabled,
    ProfilingExperimentalTimelineEnabled,
    ProfilingLogLevel,
}

impl SettingId {
    pub const COUNT: usize = 15;

    pub const ALL: [SettingId; SettingId::COUNT] = [
        SettingId::AgentHost,
        SettingId::TraceAgentPort,
        SettingId::Service,
        SettingId::Env,
        SettingId::Version,
        SettingId::TraceEnabled,
        SettingId::TraceDebug,
        SettingId::DistributedTracing,
        SettingId::TraceAgentTimeout,
        SettingId::TraceAgentConnectTimeout,
        SettingId::TraceSpansLimit,
        SettingId::IntegrationsDisabled,
        SettingId::ProfilingEnabled,
        SettingId::ProfilingExperimentalTimelineEnabled,
        SettingId::ProfilingLogLevel,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static SettingDef {
        &SETTINGS[self.index()]
    }

    /// Resolves either a getter name (`get_dd_agent_host`) or an environment
    /// key (`DD_AGENT_HOST`).
    pub fn lookup(name: &str) -> Option<SettingId> {
        SETTINGS
            .iter()
            .position(|def| def.is_named(name))
            .map(|index| SettingId::ALL[index])
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().getter)
    }
}

/// Anything that can name a slot of a settings table.
pub trait SettingRef {
    fn slot(&self, settings: &[SettingDef]) -> Option<usize>;
}

impl SettingRef for SettingId {
    fn slot(&self, settings: &[SettingDef]) -> Option<usize> {
        let index = self.index();
        // The id only addresses the default catalogue.
        match settings.get(index) {
            Some(def) if def.getter == self.def().getter => Some(index),
            _ => None,
        }
    }
}

impl SettingRef for &str {
    fn slot(&self, settings: &[SettingDef]) -> Option<usize> {
        settings.iter().position(|def| def.is_named(self))
    }
}

impl SettingRef for usize {
    fn slot(&self, settings: &[SettingDef]) -> Option<usize> {
        (*self < settings.len()).then_some(*self)
    }
}
