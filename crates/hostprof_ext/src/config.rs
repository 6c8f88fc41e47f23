/// Names the extension looks for while starting up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Registry name of the companion tracer module.
    pub companion_module: String,
    /// Symbol the companion exports to hand out the current span ids.
    pub context_symbol: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            companion_module: "ddtrace".to_string(),
            context_symbol: "ddtrace_get_profiling_context".to_string(),
        }
    }
}

/// What the host knows about this extension when it calls startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: String,
}

impl Default for ExtensionInfo {
    fn default() -> Self {
        Self {
            name: "datadog-profiling".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
