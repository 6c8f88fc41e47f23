use std::ptr::NonNull;
use std::sync::atomic::AtomicBool;

use crate::handlers::FunctionTable;
use crate::interrupt::current_thread_interrupt;
use crate::registry::{ModuleRegistry, StaticRegistry};

/// Services the embedding host provides to the extension.
pub trait Host: Send + Sync {
    fn module_registry(&self) -> &dyn ModuleRegistry;

    fn function_table(&self) -> &FunctionTable;

    /// Interrupt flag of the calling host thread.
    fn vm_interrupt_address(&self) -> NonNull<AtomicBool>;
}

/// Host whose registry and function table live in this process.
#[derive(Debug, Default)]
pub struct InProcessHost {
    registry: StaticRegistry,
    functions: FunctionTable,
}

impl InProcessHost {
    pub fn new(registry: StaticRegistry, functions: FunctionTable) -> Self {
        Self {
            registry,
            functions,
        }
    }
}

impl Host for InProcessHost {
    fn module_registry(&self) -> &dyn ModuleRegistry {
        &self.registry
    }

    fn function_table(&self) -> &FunctionTable {
        &self.functions
    }

    fn vm_interrupt_address(&self) -> NonNull<AtomicBool> {
        current_thread_interrupt()
    }
}
