use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::frame::CallFrame;
use crate::value::HostValue;

/// Implementation of a host-internal function: reads its arguments from the
/// frame and writes its result into the return slot.
pub type InternalHandler = fn(&CallFrame, &mut HostValue);

/// Request to replace the handler of one host function.
pub struct HandlerDescriptor<'a> {
    pub name: &'a [u8],
    /// Receives the handler that was installed before.
    pub old_handler: &'a mut Option<InternalHandler>,
    pub new_handler: InternalHandler,
}

/// Dispatch table of the host's internal functions, keyed by name.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: RwLock<HashMap<Vec<u8>, InternalHandler>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<Vec<u8>>, handler: InternalHandler) {
        self.write().insert(name.into(), handler);
    }

    pub fn handler(&self, name: &[u8]) -> Option<InternalHandler> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Swaps in `descriptor.new_handler` and stores the previous one in
    /// `descriptor.old_handler`. Returns false, leaving the slot untouched,
    /// when the function does not exist.
    pub fn install(&self, descriptor: HandlerDescriptor<'_>) -> bool {
        let mut functions = self.write();
        let Some(current) = functions.get_mut(descriptor.name) else {
            return false;
        };
        *descriptor.old_handler = Some(std::mem::replace(current, descriptor.new_handler));
        true
    }

    /// Puts back a handler saved by [`install`](Self::install).
    pub fn restore(&self, name: &[u8], handler: InternalHandler) -> bool {
        match self.write().get_mut(name) {
            Some(current) => {
                *current = handler;
                true
            }
            None => false,
        }
    }

    /// Runs the current handler of `name` on `frame`.
    pub fn call(&self, name: &[u8], frame: &CallFrame) -> Option<HostValue> {
        // Copy the pointer out so the handler can reenter the table.
        let handler = self.handler(name)?;
        let mut ret = HostValue::Null;
        handler(frame, &mut ret);
        Some(ret)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Vec<u8>, InternalHandler>> {
        self.functions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
