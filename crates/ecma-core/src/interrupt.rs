use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cross-thread cancellation flag for a running evaluation.
///
/// The interpreter polls the flag at loop back-edges and calls; once set, the
/// evaluation unwinds with an uncatchable `InternalError`.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a pending request, returning whether one was set.
    pub fn reset(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_between_clones_and_threads() {
        let handle = InterruptHandle::new();
        let remote = handle.clone();
        std::thread::spawn(move || remote.interrupt()).join().unwrap();
        assert!(handle.is_interrupted());
        assert!(handle.reset());
        assert!(!handle.is_interrupted());
    }
}
