use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::server::{
    model::fetch::EndpointId,
    service::{source::window::SlidingWindow, upstream::Upstream},
};

/// State kept for one upstream endpoint.
pub struct EndpointRecord {
    pub id: EndpointId,
    pub(crate) upstream: Arc<dyn Upstream>,
    window: Mutex<SlidingWindow>,
    available: AtomicBool,
}

impl EndpointRecord {
    /// Creates a record that starts out available.
    pub fn new(id: EndpointId, upstream: Arc<dyn Upstream>, window: SlidingWindow) -> Self {
        Self {
            id,
            upstream,
            window: Mutex::new(window),
            available: AtomicBool::new(true),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Updates availability and reports whether it changed.
    pub(crate) fn set_available(&self, available: bool) -> bool {
        self.available.swap(available, Ordering::SeqCst) != available
    }

    pub(crate) fn window(&self) -> MutexGuard<'_, SlidingWindow> {
        // Never held across an await or a panic point.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
