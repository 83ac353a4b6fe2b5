//! Scoped global pointer listeners.
//!
//! A gesture listens for pointer-move and pointer-up on the whole window, not
//! just the overlay element, so the pointer can leave the element mid-drag.
//! [`PointerCapture`] owns that registration and releases it when dropped.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle for one attached listener pair.
pub type ListenerId = u64;

/// The view layer that owns global pointer listeners.
pub trait PointerHost: Send + Sync {
    /// Attach pointer-move and pointer-up listeners.
    fn attach(&self) -> ListenerId;

    /// Detach the listeners registered under `id`.
    fn detach(&self, id: ListenerId);
}

/// Listener registration held for the lifetime of a gesture.
pub struct PointerCapture {
    host: Arc<dyn PointerHost>,
    id: ListenerId,
}

impl PointerCapture {
    pub fn acquire(host: Arc<dyn PointerHost>) -> Self {
        let id = host.attach();
        tracing::trace!(listener = id, "Pointer listeners attached");
        Self { host, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.host.detach(self.id);
        tracing::trace!(listener = self.id, "Pointer listeners detached");
    }
}

impl std::fmt::Debug for PointerCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerCapture").field("id", &self.id).finish()
    }
}

/// Host that only counts registrations. Used headless and in tests to prove
/// every gesture releases what it attached.
#[derive(Debug, Default)]
pub struct CountingPointerHost {
    next_id: AtomicU64,
    attached: AtomicUsize,
    total: AtomicUsize,
}

impl CountingPointerHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Listener pairs currently attached.
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Listener pairs ever attached.
    pub fn total_attached(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl PointerHost for CountingPointerHost {
    fn attach(&self) -> ListenerId {
        self.attached.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn detach(&self, _id: ListenerId) {
        self.attached.fetch_sub(1, Ordering::SeqCst);
    }
}
