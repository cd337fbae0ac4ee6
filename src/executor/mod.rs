//! The remote graph executor, seen from the client.
//!
//! The executor is an opaque collaborator: it resolves nodes to values,
//! refines partial types, lowers composite ops and runs mutation actions.
//! Everything it returns arrives asynchronously, either as pushes to an
//! [`Observer`] or as a settled [`Promise`].
use serde_json::Value as Json;

use crate::diagnostics::ExecutorError;
use crate::graph::node::Node;

pub mod manual;
pub mod promise;

pub use manual::ManualExecutor;
pub use promise::{Promise, Resolver, pending};

/// Receives every value (or failure) the executor pushes for a subscription.
pub type Observer = Box<dyn FnMut(Result<Json, ExecutorError>)>;

pub trait Executor {
    /// Opens a push-based subscription to `node`'s value. The subscription
    /// stays open until the returned handle is dropped.
    fn subscribe(&self, node: &Node, observer: Observer) -> Subscription;

    /// Returns `node` with its partial type annotations filled in.
    fn refine_node(&self, node: &Node) -> Promise<Node>;

    /// Returns `node` with every generated or composite op lowered into
    /// primitive ops.
    fn expand_all(&self, node: &Node) -> Promise<Node>;

    /// Runs a mutation call and returns its raw result.
    fn action(&self, call: &Node) -> Promise<Json>;
}

/// Handle to an open subscription. Dropping it unsubscribes.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with nothing to release.
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("open", &self.unsubscribe.is_some())
            .finish()
    }
}
