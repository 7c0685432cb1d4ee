use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{trace, warn};

/// Request queued for the commit context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// The visibility intent changed.
    Reconcile,
    /// Back or backdrop asked to dismiss the modal.
    Dismiss,
}

/// Cloneable handle to a modal's visibility intent.
///
/// Safe to use from callbacks and back handlers: it never touches the controller directly, it
/// only records the intent and queues a request that the next dispatch picks up.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    visible: Arc<AtomicBool>,
    requests: async_channel::Sender<Request>,
}

impl ModalHandle {
    pub(super) fn new(requests: async_channel::Sender<Request>) -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(false)),
            requests,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub fn set_visible(&self, visible: bool) {
        let prev = self.visible.swap(visible, Ordering::AcqRel);
        if prev != visible {
            trace!("visibility intent changed to {visible}");
            self.send(Request::Reconcile);
        }
    }

    /// Asks to dismiss the modal. Returns `false` if it is not meant to be visible.
    pub fn request_dismiss(&self) -> bool {
        if !self.is_visible() {
            return false;
        }

        self.send(Request::Dismiss);
        true
    }

    fn send(&self, request: Request) {
        if let Err(err) = self.requests.send_blocking(request) {
            warn!("error sending modal request: {err:?}");
        }
    }
}
