//! Client-side partial evaluator.
//!
//! Rewrites the graph bottom-up, reducing sub-graphs whose inputs are
//! already literals, so the client does not pay a round trip for work it can
//! do itself. This is an allow-list, not an interpreter: only the cheap
//! structural ops in [`LOCALLY_REDUCIBLE`](crate::graph::ops::LOCALLY_REDUCIBLE) are ever reduced, and each
//! of them is pure and total over its input types. Everything else stays an
//! `Output` with reduced arguments, for the remote executor to resolve.
use std::mem;

use log::trace;

use crate::graph::{
    fold::{self, NodeFolder},
    node::{Node, OpCall},
    value::FunctionLiteral,
};
use crate::stack::Stack;

mod reduce;

pub use reduce::reduce;

struct LocalEvaluator {
    stack: Stack,
}

impl NodeFolder for LocalEvaluator {
    fn fold_var(&mut self, node: &Node, name: &str) -> Node {
        let binding = match self.stack.resolve_binding(name) {
            Some(binding) if !binding.is_unbound_param() => binding.clone(),
            _ => return node.clone(),
        };
        let saved = mem::replace(&mut self.stack, binding.stack.clone());
        let resolved = self.fold_node(&binding.value);
        self.stack = saved;
        resolved
    }

    fn fold_function_body(&mut self, lit: &FunctionLiteral) -> Node {
        let scope = lit
            .params
            .iter()
            .fold(self.stack.clone(), |stack, (name, ty)| {
                stack.bind_param(name, ty.clone())
            });
        let saved = mem::replace(&mut self.stack, scope);
        let body = self.fold_node(&lit.body);
        self.stack = saved;
        body
    }

    fn fold_output(&mut self, node: &Node, call: &OpCall) -> Node {
        // Fold children first (bottom-up)
        let folded = fold::fold_output(self, node, call);
        match reduce(&folded) {
            Some(reduced) => {
                trace!("reduced {} locally to {}", call.name, reduced);
                reduced
            }
            None => folded,
        }
    }
}

/// Reduces what the client can compute from literals alone.
///
/// A `Var` is replaced by its (recursively evaluated) binding; a function
/// literal has its body evaluated with its parameters bound to the
/// unbound-parameter sentinel; an `Output` is reduced only when its op is on
/// the allow-list and its arguments reduced to non-function literals
/// (`execute` instead takes a zero-parameter function literal and yields its
/// body).
pub fn evaluate_locally(node: &Node, stack: &Stack) -> Node {
    let mut evaluator = LocalEvaluator {
        stack: stack.clone(),
    };
    evaluator.fold_node(node)
}

#[cfg(test)]
mod eval_test;
