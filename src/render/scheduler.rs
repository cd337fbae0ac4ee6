use std::{cell::Cell, rc::Rc};

/// Re-render requests raised by async completions.
///
/// The engine never renders by itself. Executor callbacks store their
/// result and call [`request`](RenderScheduler::request); the host checks
/// [`take`](RenderScheduler::take) and polls its hooks again.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    requested: Rc<Cell<usize>>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.set(self.requested.get() + 1);
    }

    /// Requests raised since the last `take`.
    pub fn pending(&self) -> usize {
        self.requested.get()
    }

    /// Clears outstanding requests, returning whether there were any.
    pub fn take(&self) -> bool {
        self.requested.replace(0) > 0
    }
}
