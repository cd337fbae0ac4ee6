//! Expansion and type refinement.
//!
//! Both ask the executor for a richer version of the same node and share one
//! hook, [`Refined`]. Every request bumps a generation counter; a response
//! is committed only if its generation is still the latest, so a slow answer
//! for an old input can never overwrite the answer for a newer one.
use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use log::debug;

use crate::diagnostics::GraphError;
use crate::engine::Loaded;
use crate::executor::{Executor, Promise};
use crate::graph::{node::Node, visit::contains_output};
use crate::render::RenderContext;
use crate::stack::dereference_all_vars;

/// One kind of round trip that enriches a node.
pub trait Refinement {
    const LABEL: &'static str;

    /// `false` when the node is already as rich as the executor could make it.
    fn is_needed(node: &Node) -> bool;

    fn request(executor: &dyn Executor, node: &Node) -> Promise<Node>;
}

/// Lowers generated or composite ops into primitive ones.
pub struct Expand;

impl Refinement for Expand {
    const LABEL: &'static str = "expansion";

    fn is_needed(node: &Node) -> bool {
        contains_output(node)
    }

    fn request(executor: &dyn Executor, node: &Node) -> Promise<Node> {
        executor.expand_all(node)
    }
}

/// Fills in a partially known result type.
pub struct ServerType;

impl Refinement for ServerType {
    const LABEL: &'static str = "type refinement";

    fn is_needed(node: &Node) -> bool {
        node.ty().is_partial()
    }

    fn request(executor: &dyn Executor, node: &Node) -> Promise<Node> {
        executor.refine_node(node)
    }
}

pub type ExpandedNode = Refined<Expand>;
pub type NodeWithServerType = Refined<ServerType>;

struct Committed {
    input: Node,
    result: Result<Node, GraphError>,
}

#[derive(Default)]
struct Shared {
    generation: u64,
    committed: Option<Committed>,
}

pub struct Refined<R: Refinement> {
    input: Option<Node>,
    shared: Rc<RefCell<Shared>>,
    _kind: PhantomData<R>,
}

impl<R: Refinement> Default for Refined<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Refinement> Refined<R> {
    pub fn new() -> Self {
        Self {
            input: None,
            shared: Rc::new(RefCell::new(Shared::default())),
            _kind: PhantomData,
        }
    }

    pub fn poll(&mut self, cx: &RenderContext, node: &Node) -> Result<Loaded<Node>, GraphError> {
        let input = cx.intern(&dereference_all_vars(node, cx.stack()).node);

        if !R::is_needed(&input) {
            if !self.is_current(&input) {
                // Nothing to ask for; anything still in flight is stale.
                self.shared.borrow_mut().generation += 1;
                self.input = Some(input.clone());
            }
            return Ok(Loaded::ready(input));
        }

        if !self.is_current(&input) {
            self.input = Some(input.clone());
            self.request(cx, &input);
        }

        let shared = self.shared.borrow();
        match &shared.committed {
            Some(committed) if committed.input.ptr_eq(&input) => match &committed.result {
                Ok(refined) => Ok(Loaded::ready(refined.clone())),
                Err(err) => Err(err.clone()),
            },
            Some(Committed {
                result: Ok(previous),
                ..
            }) => Ok(Loaded::pending(previous.clone())),
            _ => Ok(Loaded::pending(input)),
        }
    }

    fn is_current(&self, input: &Node) -> bool {
        self.input.as_ref().is_some_and(|current| current.ptr_eq(input))
    }

    fn request(&self, cx: &RenderContext, input: &Node) {
        let generation = {
            let mut shared = self.shared.borrow_mut();
            shared.generation += 1;
            shared.generation
        };
        debug!("requesting {} of {}", R::LABEL, input);

        let shared = Rc::downgrade(&self.shared);
        let scheduler = cx.scheduler().clone();
        let input = input.clone();
        R::request(cx.executor(), &input).then(move |outcome| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut shared = shared.borrow_mut();
            if shared.generation != generation {
                debug!("discarding stale {} of {}", R::LABEL, input);
                return;
            }
            let result = outcome.map_err(|err| GraphError::remote(&input, err));
            shared.committed = Some(Committed { input, result });
            drop(shared);
            scheduler.request();
        });
    }
}
