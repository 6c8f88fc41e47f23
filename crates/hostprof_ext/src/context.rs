use std::sync::OnceLock;

/// Correlation ids of the span the current host thread is executing.
///
/// Shared with the tracer's own definition, keep the layout in sync.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProfilingContext {
    pub local_root_span_id: u64,
    pub span_id: u64,
}

/// Entry point exported by the companion tracer module.
pub type ContextSupplier = fn() -> ProfilingContext;

/// Used when the companion module or its entry point is missing.
pub fn zero_context() -> ProfilingContext {
    ProfilingContext::default()
}

/// Holds the resolved [`ContextSupplier`].
///
/// Written once during startup and only read afterwards.
#[derive(Debug, Default)]
pub struct ContextSlot {
    supplier: OnceLock<ContextSupplier>,
}

impl ContextSlot {
    pub const fn new() -> Self {
        Self {
            supplier: OnceLock::new(),
        }
    }

    /// Stores `supplier` unless one was already stored. Returns whether it was
    /// stored.
    pub fn install(&self, supplier: ContextSupplier) -> bool {
        self.supplier.set(supplier).is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.supplier.get().is_some()
    }

    pub fn supplier(&self) -> ContextSupplier {
        self.supplier.get().copied().unwrap_or(zero_context)
    }

    pub fn get(&self) -> ProfilingContext {
        (self.supplier())()
    }
}
