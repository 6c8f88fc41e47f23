use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use hostprof_config::{
    ConfigSource, ConfigTable, Memoizer, OnVersionChange, ReloadOutcome, ReloadPolicy,
    ReloadTrigger,
};

use crate::build_id;
use crate::config::{ExtensionConfig, ExtensionInfo};
use crate::context::{ContextSlot, ContextSupplier, ProfilingContext, zero_context};
use crate::error::{HostError, HostResult};
use crate::frame::{CallFrame, get_call_argument};
use crate::handlers::{HandlerDescriptor, InternalHandler};
use crate::host::Host;
use crate::registry::{Export, ModuleHandle};
use crate::value::{HostValue, copy_bytes_into_host_string};

/// Entry points the host calls into.
pub trait HostAbi {
    /// One-time setup, run by the host before it dispatches any request.
    fn startup(&self, extension: &ExtensionInfo) -> HostResult<()>;

    fn install_function_handler(&self, descriptor: HandlerDescriptor<'_>);

    fn extension_build_id(&self) -> &'static str;

    fn module_build_id(&self) -> &'static str;

    fn lookup_module(&self, name: &[u8]) -> Option<ModuleHandle>;

    fn vm_interrupt_address(&self) -> NonNull<AtomicBool>;

    fn copy_bytes_into_host_string<'d>(
        &self,
        dest: &'d mut MaybeUninit<HostValue>,
        bytes: &[u8],
        persistent: bool,
    ) -> &'d mut HostValue;

    fn get_call_argument<'f>(&self, frame: &'f CallFrame, n: u32) -> Option<&'f HostValue>;

    /// Current span ids from the companion tracer, or zeros without one.
    fn profiling_context(&self) -> ProfilingContext;
}

/// The profiling extension as seen from the host.
pub struct ProfilerExtension<H> {
    host: H,
    config: ExtensionConfig,
    table: Arc<ConfigTable>,
    source: Box<dyn ConfigSource>,
    policy: Box<dyn ReloadPolicy>,
    context: ContextSlot,
}

impl<H: Host> ProfilerExtension<H> {
    pub fn new(host: H, source: impl ConfigSource + 'static) -> Self {
        Self {
            host,
            config: ExtensionConfig::default(),
            table: Arc::new(ConfigTable::new()),
            source: Box::new(source),
            policy: Box::new(OnVersionChange),
            context: ContextSlot::new(),
        }
    }

    pub fn with_config(mut self, config: ExtensionConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing table instead of a private one.
    pub fn with_table(mut self, table: Arc<ConfigTable>) -> Self {
        self.table = table;
        self
    }

    pub fn with_policy(mut self, policy: impl ReloadPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn table(&self) -> &Arc<ConfigTable> {
        &self.table
    }

    pub fn context_resolved(&self) -> bool {
        self.context.is_resolved()
    }

    /// Called by the host when it notices the application version changed.
    pub fn on_version_change(
        &self,
        previous: Option<&str>,
        current: &str,
    ) -> HostResult<ReloadOutcome> {
        let trigger = ReloadTrigger::VersionChange {
            previous: previous.map(str::to_string),
            current: current.to_string(),
        };
        Ok(self.memoizer().reload_on_trigger(&trigger)?)
    }

    /// Puts back a handler saved by [`HostAbi::install_function_handler`].
    pub fn restore_function_handler(&self, name: &[u8], handler: InternalHandler) -> HostResult<()> {
        if self.host.function_table().restore(name, handler) {
            Ok(())
        } else {
            Err(HostError::UnknownFunction(
                String::from_utf8_lossy(name).into_owned(),
            ))
        }
    }

    fn memoizer(&self) -> Memoizer<'_> {
        let policy = &self.policy;
        Memoizer::new(&self.table, self.source.as_ref())
            .with_policy(move |trigger: &ReloadTrigger| policy.should_reload(trigger))
    }

    fn resolve_context_supplier(&self) -> ContextSupplier {
        let registry = self.host.module_registry();
        let companion = &self.config.companion_module;
        let Some(handle) = registry.lookup_module(companion.as_bytes()) else {
            tracing::debug!("{companion} is not loaded; span ids will be zero");
            return zero_context;
        };
        let Some(module) = registry.module(handle) else {
            tracing::debug!("{companion} has a stale registry handle");
            return zero_context;
        };
        match module.symbol(&self.config.context_symbol) {
            Some(Export::ProfilingContext(supplier)) => supplier,
            None => {
                tracing::debug!(
                    version = module.version(),
                    "{companion} does not export {}",
                    self.config.context_symbol
                );
                zero_context
            }
        }
    }
}

impl<H: Host> HostAbi for ProfilerExtension<H> {
    fn startup(&self, extension: &ExtensionInfo) -> HostResult<()> {
        tracing::debug!(
            name = %extension.name,
            version = %extension.version,
            "starting extension"
        );
        if !self.context.install(self.resolve_context_supplier()) {
            tracing::debug!("profiling context supplier already resolved");
        }
        self.memoizer().initialize()?;
        Ok(())
    }

    fn install_function_handler(&self, descriptor: HandlerDescriptor<'_>) {
        let name = descriptor.name;
        if !self.host.function_table().install(descriptor) {
            tracing::debug!(
                "cannot wrap {}: no such function",
                String::from_utf8_lossy(name)
            );
        }
    }

    fn extension_build_id(&self) -> &'static str {
        build_id::extension_build_id()
    }

    fn module_build_id(&self) -> &'static str {
        build_id::module_build_id()
    }

    fn lookup_module(&self, name: &[u8]) -> Option<ModuleHandle> {
        self.host.module_registry().lookup_module(name)
    }

    fn vm_interrupt_address(&self) -> NonNull<AtomicBool> {
        self.host.vm_interrupt_address()
    }

    fn copy_bytes_into_host_string<'d>(
        &self,
        dest: &'d mut MaybeUninit<HostValue>,
        bytes: &[u8],
        persistent: bool,
    ) -> &'d mut HostValue {
        copy_bytes_into_host_string(dest, bytes, persistent)
    }

    fn get_call_argument<'f>(&self, frame: &'f CallFrame, n: u32) -> Option<&'f HostValue> {
        get_call_argument(frame, n)
    }

    fn profiling_context(&self) -> ProfilingContext {
        self.context.get()
    }
}
