//! Cooperative interrupts
//!
//! The worker polls a [`ShutdownNotifier`] between CFA edges. Resource-limit
//! interrupts are temporary and can be reset before the next partition;
//! external shutdown is sticky.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

const NONE: u8 = 0;
const TEMPORARY: u8 = 1;
const EXTERNAL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    /// A resource limit of the current partition was hit
    ResourceLimit,
    /// Shutdown requested from outside; never retried
    External,
}

impl fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptKind::ResourceLimit => write!(f, "resource limit"),
            InterruptKind::External => write!(f, "external shutdown"),
        }
    }
}

/// Shared interrupt flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownNotifier {
    state: Arc<AtomicU8>,
    reason: Arc<Mutex<Option<String>>>,
}

impl ShutdownNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a temporary (resource-limit) interrupt. Has no effect after
    /// an external shutdown.
    pub fn request_temporary(&self, reason: impl Into<String>) {
        if self
            .state
            .compare_exchange(NONE, TEMPORARY, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.lock() = Some(reason.into());
        }
    }

    /// Request an external shutdown; overrides a temporary interrupt
    pub fn request_external(&self, reason: impl Into<String>) {
        self.state.store(EXTERNAL, Ordering::SeqCst);
        *self.reason.lock() = Some(reason.into());
    }

    pub fn requested(&self) -> Option<InterruptKind> {
        match self.state.load(Ordering::SeqCst) {
            TEMPORARY => Some(InterruptKind::ResourceLimit),
            EXTERNAL => Some(InterruptKind::External),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        self.requested() == Some(InterruptKind::External)
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    /// Clear a temporary interrupt; external shutdown stays
    pub fn reset_temporary(&self) {
        if self
            .state
            .compare_exchange(TEMPORARY, NONE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.lock() = None;
        }
    }
}
