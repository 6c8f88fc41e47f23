use std::collections::HashMap;

use crate::context::ContextSupplier;

/// Opaque reference to a module in the host's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(usize);

/// Symbol a module exports to other extensions.
#[derive(Debug, Clone, Copy)]
pub enum Export {
    ProfilingContext(ContextSupplier),
}

#[derive(Debug, Clone)]
pub struct ModuleEntry {
    name: Vec<u8>,
    version: String,
    exports: HashMap<String, Export>,
}

impl ModuleEntry {
    pub fn new(name: impl Into<Vec<u8>>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            exports: HashMap::new(),
        }
    }

    pub fn with_export(mut self, symbol: impl Into<String>, export: Export) -> Self {
        self.exports.insert(symbol.into(), export);
        self
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn symbol(&self, name: &str) -> Option<Export> {
        self.exports.get(name).copied()
    }
}

/// The host's table of loaded modules.
pub trait ModuleRegistry: Send + Sync {
    /// Finds a module by its exact name bytes. The name need not be UTF-8.
    fn lookup_module(&self, name: &[u8]) -> Option<ModuleHandle>;

    fn module(&self, handle: ModuleHandle) -> Option<&ModuleEntry>;
}

/// Registry populated up front, the way the host has finished loading
/// modules before any extension starts up.
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    modules: Vec<ModuleEntry>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: ModuleEntry) -> ModuleHandle {
        self.modules.push(module);
        ModuleHandle(self.modules.len() - 1)
    }

    pub fn with(mut self, module: ModuleEntry) -> Self {
        self.register(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleRegistry for StaticRegistry {
    fn lookup_module(&self, name: &[u8]) -> Option<ModuleHandle> {
        self.modules
            .iter()
            .position(|module| module.name == name)
            .map(ModuleHandle)
    }

    fn module(&self, handle: ModuleHandle) -> Option<&ModuleEntry> {
        self.modules.get(handle.0)
    }
}
