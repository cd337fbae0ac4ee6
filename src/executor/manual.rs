use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value as Json;

use crate::diagnostics::ExecutorError;
use crate::executor::{Executor, Observer, Promise, Resolver, Subscription, pending};
use crate::graph::node::Node;

struct Request<T> {
    node: Node,
    resolver: Resolver<T>,
}

impl<T: Clone + 'static> Request<T> {
    fn open(node: &Node, requests: &mut Vec<Request<T>>) -> Promise<T> {
        let (promise, resolver) = pending();
        requests.push(Request {
            node: node.clone(),
            resolver,
        });
        promise
    }
}

struct Entry {
    node: Node,
    observer: Rc<RefCell<Observer>>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    opened: usize,
    active: IndexMap<u64, Entry>,
    refinements: Vec<Request<Node>>,
    expansions: Vec<Request<Node>>,
    actions: Vec<Request<Json>>,
}

/// In-process executor driven by hand.
///
/// Records every subscription and request it receives; the host decides
/// when (and in what order) values are pushed and requests settle. Clones
/// share the same state.
#[derive(Clone, Default)]
pub struct ManualExecutor {
    state: Rc<RefCell<State>>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions currently open.
    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().active.len()
    }

    /// Subscriptions ever opened.
    pub fn subscriptions_opened(&self) -> usize {
        self.state.borrow().opened
    }

    /// Nodes with an open subscription, oldest first.
    pub fn subscribed_nodes(&self) -> Vec<Node> {
        self.state
            .borrow()
            .active
            .values()
            .map(|entry| entry.node.clone())
            .collect()
    }

    /// Pushes `value` to every open subscription on a node equal to `node`.
    /// Returns the number of observers reached.
    pub fn emit(&self, node: &Node, value: Json) -> usize {
        self.push(node, Ok(value))
    }

    /// Pushes a failure to every open subscription on `node`.
    pub fn fail(&self, node: &Node, error: ExecutorError) -> usize {
        self.push(node, Err(error))
    }

    fn push(&self, node: &Node, outcome: Result<Json, ExecutorError>) -> usize {
        let observers: Vec<_> = self
            .state
            .borrow()
            .active
            .values()
            .filter(|entry| entry.node == *node)
            .map(|entry| Rc::clone(&entry.observer))
            .collect();
        for observer in &observers {
            (observer.borrow_mut())(outcome.clone());
        }
        observers.len()
    }

    pub fn refinements(&self) -> Vec<Node> {
        self.state.borrow().refinements.iter().map(|r| r.node.clone()).collect()
    }

    pub fn expansions(&self) -> Vec<Node> {
        self.state.borrow().expansions.iter().map(|r| r.node.clone()).collect()
    }

    /// Every action call received, in order.
    pub fn actions(&self) -> Vec<Node> {
        self.state.borrow().actions.iter().map(|r| r.node.clone()).collect()
    }

    /// Settles the `index`-th refinement request. Returns `false` if there is
    /// no such request or it has already settled.
    pub fn resolve_refinement(&self, index: usize, outcome: Result<Node, ExecutorError>) -> bool {
        let resolver = self.state.borrow().refinements.get(index).map(|r| r.resolver.clone());
        resolver.is_some_and(|resolver| resolver.settle(outcome))
    }

    pub fn resolve_expansion(&self, index: usize, outcome: Result<Node, ExecutorError>) -> bool {
        let resolver = self.state.borrow().expansions.get(index).map(|r| r.resolver.clone());
        resolver.is_some_and(|resolver| resolver.settle(outcome))
    }

    pub fn resolve_action(&self, index: usize, outcome: Result<Json, ExecutorError>) -> bool {
        let resolver = self.state.borrow().actions.get(index).map(|r| r.resolver.clone());
        resolver.is_some_and(|resolver| resolver.settle(outcome))
    }

    /// Rejects every unsettled request with [`ExecutorError::Dropped`].
    pub fn abandon_requests(&self) -> usize {
        let (nodes, json) = {
            let state = self.state.borrow();
            let nodes: Vec<_> = state
                .refinements
                .iter()
                .chain(&state.expansions)
                .map(|r| r.resolver.clone())
                .collect();
            let json: Vec<_> = state.actions.iter().map(|r| r.resolver.clone()).collect();
            (nodes, json)
        };
        let mut dropped = 0;
        for resolver in nodes {
            dropped += resolver.reject(ExecutorError::Dropped) as usize;
        }
        for resolver in json {
            dropped += resolver.reject(ExecutorError::Dropped) as usize;
        }
        dropped
    }
}

impl Executor for ManualExecutor {
    fn subscribe(&self, node: &Node, observer: Observer) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.opened += 1;
            state.active.insert(
                id,
                Entry {
                    node: node.clone(),
                    observer: Rc::new(RefCell::new(observer)),
                },
            );
            id
        };
        debug!("subscription {} opened for {}", id, node);

        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().active.shift_remove(&id);
                debug!("subscription {} closed", id);
            }
        })
    }

    fn refine_node(&self, node: &Node) -> Promise<Node> {
        Request::open(node, &mut self.state.borrow_mut().refinements)
    }

    fn expand_all(&self, node: &Node) -> Promise<Node> {
        Request::open(node, &mut self.state.borrow_mut().expansions)
    }

    fn action(&self, call: &Node) -> Promise<Json> {
        Request::open(call, &mut self.state.borrow_mut().actions)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::json;

    use crate::diagnostics::ExecutorError;
    use crate::executor::{Executor, ManualExecutor};
    use crate::graph::{node::Node, ops, types::Type};

    #[test]
    fn emissions_reach_matching_subscriptions_only() {
        let executor = ManualExecutor::new();
        let a = ops::get("a", Type::Int);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = executor.subscribe(&a, Box::new(move |v| sink.borrow_mut().push(v)));

        assert_eq!(executor.emit(&ops::get("a", Type::Int), json!(1)), 1);
        assert_eq!(executor.emit(&ops::get("b", Type::Int), json!(2)), 0);
        assert_eq!(*seen.borrow(), vec![Ok(json!(1))]);
    }

    #[test]
    fn dropping_the_handle_closes_the_subscription() {
        let executor = ManualExecutor::new();
        let sub = executor.subscribe(&Node::void(), Box::new(|_| {}));
        assert_eq!(executor.active_subscriptions(), 1);
        drop(sub);
        assert_eq!(executor.active_subscriptions(), 0);
        assert_eq!(executor.subscriptions_opened(), 1);
    }

    #[test]
    fn requests_settle_in_any_order() {
        let executor = ManualExecutor::new();
        let first = executor.refine_node(&ops::get("a", Type::Unknown));
        let second = executor.refine_node(&ops::get("b", Type::Unknown));

        assert!(executor.resolve_refinement(1, Ok(ops::get("b", Type::Int))));
        assert!(!first.is_settled());
        assert!(second.is_settled());
        assert!(!executor.resolve_refinement(1, Ok(Node::void())));

        assert_eq!(executor.abandon_requests(), 1);
        assert_eq!(first.poll(), Some(Err(ExecutorError::Dropped)));
    }
}
