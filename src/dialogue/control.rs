use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Busy flag for one UI control (a send or regenerate button)
///
/// At most one request per control is outstanding. The flag clears when the
/// guard drops, including when the request future is dropped mid-flight.
#[derive(Debug, Clone, Default)]
pub struct ControlFlag {
    busy: Arc<AtomicBool>,
}

impl ControlFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the control busy, or `None` if it already is
    pub fn try_acquire(&self) -> Option<ControlGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ControlGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

#[derive(Debug)]
pub struct ControlGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
