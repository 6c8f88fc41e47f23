//! Boundary between the profiling extension and the host runtime embedding it.
//!
//! The host drives the extension through [`HostAbi`]; the extension reaches
//! back into the host through [`Host`]. Configuration memoization lives in
//! `hostprof_config` and knows nothing about either trait.

mod build_id;
mod config;
mod context;
mod error;
mod extension;
mod frame;
mod handlers;
mod host;
mod interrupt;
mod registry;
mod value;

pub use build_id::{EXTENSION_API_NO, MODULE_API_NO, extension_build_id, module_build_id};
pub use config::{ExtensionConfig, ExtensionInfo};
pub use context::{ContextSlot, ContextSupplier, ProfilingContext, zero_context};
pub use error::{HostError, HostResult};
pub use extension::{HostAbi, ProfilerExtension};
pub use frame::{CallFrame, get_call_argument};
pub use handlers::{FunctionTable, HandlerDescriptor, InternalHandler};
pub use host::{Host, InProcessHost};
pub use interrupt::current_thread_interrupt;
pub use registry::{Export, ModuleEntry, ModuleHandle, ModuleRegistry, StaticRegistry};
pub use value::{HostString, HostValue, copy_bytes_into_host_string};
