use std::{collections::HashSet, mem};

use crate::graph::{
    fold::{self, NodeFolder},
    node::Node,
    value::FunctionLiteral,
};
use crate::stack::{Binding, Stack};

/// A graph with every resolvable variable inlined.
#[derive(Debug, Clone)]
pub struct Dereferenced {
    pub node: Node,
    /// Only the frames the rewrite actually consumed, in order of first use.
    /// Keeps memoization keys small.
    pub used: Stack,
}

/// Inlines `Var` references.
///
/// A variable is replaced by its binding's value, itself dereferenced
/// against the stack that value closed over. Variables with no binding, or
/// bound to the unbound-parameter sentinel, or shadowed by a parameter of an
/// enclosing function literal, are left in place.
struct Dereferencer {
    stack: Stack,
    params: Vec<HashSet<String>>,
    used: Vec<(String, Binding)>,
}

impl Dereferencer {
    fn is_param(&self, name: &str) -> bool {
        self.params.iter().rev().any(|scope| scope.contains(name))
    }

    fn record_use(&mut self, name: &str, binding: &Binding) {
        if !self.used.iter().any(|(used, _)| used == name) {
            self.used.push((name.to_string(), binding.clone()));
        }
    }
}

impl NodeFolder for Dereferencer {
    fn fold_var(&mut self, node: &Node, name: &str) -> Node {
        if self.is_param(name) {
            return node.clone();
        }
        let binding = match self.stack.resolve_binding(name) {
            Some(binding) if !binding.is_unbound_param() => binding.clone(),
            _ => return node.clone(),
        };
        self.record_use(name, &binding);

        // The bound value is lexically outside any function literal we are
        // currently inside of.
        let saved_stack = mem::replace(&mut self.stack, binding.stack.clone());
        let saved_params = mem::take(&mut self.params);
        let resolved = self.fold_node(&binding.value);
        self.stack = saved_stack;
        self.params = saved_params;
        resolved
    }

    fn fold_function_body(&mut self, lit: &FunctionLiteral) -> Node {
        self.params
            .push(lit.params.iter().map(|(name, _)| name.clone()).collect());
        let body = fold::fold_node(self, &lit.body);
        self.params.pop();
        body
    }
}

/// Inlines every variable of `node` resolvable against `stack`.
///
/// Dereferencing an already dereferenced node returns the same `Rc`.
pub fn dereference_all_vars(node: &Node, stack: &Stack) -> Dereferenced {
    let mut dereferencer = Dereferencer {
        stack: stack.clone(),
        params: Vec::new(),
        used: Vec::new(),
    };
    let node = dereferencer.fold_node(node);
    let used = dereferencer
        .used
        .into_iter()
        .rev()
        .fold(Stack::empty(), |acc, (name, binding)| acc.push(&name, binding));
    Dereferenced { node, used }
}

#[cfg(test)]
#[path = "deref_test.rs"]
mod deref_test;
