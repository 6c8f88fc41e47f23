use std::ptr::NonNull;
use std::sync::atomic::AtomicBool;

thread_local! {
    static VM_INTERRUPT: AtomicBool = const { AtomicBool::new(false) };
}

/// Address of the calling thread's VM interrupt flag.
///
/// The engine checks the flag between opcodes; storing `true` asks the
/// thread to stop at its next safe point. The pointer stays valid for the
/// life of the calling thread and must only be shared with code that runs
/// while that thread is alive.
pub fn current_thread_interrupt() -> NonNull<AtomicBool> {
    VM_INTERRUPT.with(|flag| NonNull::from(flag))
}
