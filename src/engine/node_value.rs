use std::{cell::RefCell, rc::Rc};

use log::debug;

use crate::diagnostics::GraphError;
use crate::engine::Loaded;
use crate::eval::evaluate_locally;
use crate::executor::{Observer, Subscription};
use crate::graph::{
    collect_free_vars,
    node::{Node, NodeKind},
    value::Value,
};
use crate::memo::{Memo, shape_eq};
use crate::render::RenderContext;
use crate::stack::{Stack, dereference_all_vars};

/// Most recent push from the executor, tagged with the node it answers.
struct Observed {
    node: Node,
    result: Result<Value, GraphError>,
}

/// An open subscription and the node it was opened for.
struct Session {
    node: Node,
    _subscription: Subscription,
}

/// Live `{loading, result}` view of a node.
///
/// One `NodeValue` belongs to one mount point. Each render calls
/// [`poll`](NodeValue::poll) with the node to show; the hook opens a
/// subscription only when the node cannot be resolved on the client, and
/// swaps it whenever the resolved node changes identity. Dropping the hook
/// closes its subscription.
pub struct NodeValue {
    memo: Memo<Node>,
    local: Option<(Node, Node)>,
    session: Option<Session>,
    observed: Rc<RefCell<Option<Observed>>>,
}

impl Default for NodeValue {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeValue {
    pub fn new() -> Self {
        Self {
            memo: Memo::new(),
            local: None,
            session: None,
            observed: Rc::new(RefCell::new(None)),
        }
    }

    pub fn poll(&mut self, cx: &RenderContext, node: &Node) -> Result<Loaded<Value>, GraphError> {
        let resolved = self.resolve(cx, node);

        if let NodeKind::Const(value) = resolved.kind() {
            self.close_session();
            if !value.conforms_to(resolved.ty()) {
                return Err(GraphError::TypeMismatch {
                    expected: resolved.ty().clone(),
                    found: value.type_name().to_string(),
                });
            }
            return finish(cx, Loaded::ready(value.clone()));
        }

        let free = collect_free_vars(&resolved);
        if !free.is_empty() {
            self.close_session();
            return Err(GraphError::UnresolvedReference { vars: free });
        }

        if resolved.is_void() {
            self.close_session();
            return Ok(Loaded::pending(Value::None));
        }

        self.open_session(cx, &resolved);

        let observed = self.observed.borrow();
        let Some(observed) = observed.as_ref() else {
            return Ok(Loaded::pending(Value::None));
        };
        let current = observed.node.ptr_eq(&resolved);
        match &observed.result {
            Err(err) if current => Err(err.clone()),
            Err(_) => Ok(Loaded::pending(Value::None)),
            Ok(value) => finish(
                cx,
                Loaded {
                    loading: !current,
                    result: value.clone(),
                },
            ),
        }
    }

    /// The node the last poll resolved to, after dereferencing, memoization
    /// and local evaluation.
    pub fn resolved_node(&self) -> Option<&Node> {
        match &self.local {
            Some((_, reduced)) => Some(reduced),
            None => self.memo.current(),
        }
    }

    /// Whether a subscription is currently open.
    pub fn is_subscribed(&self) -> bool {
        self.session.is_some()
    }

    fn resolve(&mut self, cx: &RenderContext, node: &Node) -> Node {
        let dereferenced = dereference_all_vars(node, cx.stack());
        let canonical = cx.intern(&dereferenced.node);
        let memoized = self.memo.memoize_by(canonical, shape_eq);

        if !cx.config().local_eval {
            self.local = None;
            return memoized;
        }
        if let Some((input, reduced)) = &self.local {
            if input.ptr_eq(&memoized) {
                return reduced.clone();
            }
        }
        let reduced = cx.intern(&evaluate_locally(&memoized, &Stack::empty()));
        self.local = Some((memoized, reduced.clone()));
        reduced
    }

    fn open_session(&mut self, cx: &RenderContext, node: &Node) {
        if let Some(session) = &self.session {
            if session.node.ptr_eq(node) {
                return;
            }
        }
        // Release the previous subscription before opening the next one.
        self.close_session();

        let slot = Rc::downgrade(&self.observed);
        let target = node.clone();
        let scheduler = cx.scheduler().clone();
        let observer: Observer = Box::new(move |outcome| {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let result = match outcome {
                Ok(json) => Value::from_json(&json, target.ty()).map_err(GraphError::from),
                Err(err) => Err(GraphError::remote(&target, err)),
            };
            *slot.borrow_mut() = Some(Observed {
                node: target.clone(),
                result,
            });
            scheduler.request();
        });

        debug!("subscribing to {}", node);
        self.session = Some(Session {
            node: node.clone(),
            _subscription: cx.executor().subscribe(node, observer),
        });
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("unsubscribing from {}", session.node);
        }
    }
}

/// Raises the empty-optional signal for a settled absent value inside an
/// optional scope.
fn finish(cx: &RenderContext, loaded: Loaded<Value>) -> Result<Loaded<Value>, GraphError> {
    if cx.in_optional_scope() && !loaded.loading && loaded.result.is_none() {
        return Err(GraphError::EmptyOptional);
    }
    Ok(loaded)
}
