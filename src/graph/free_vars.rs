use std::collections::HashSet;

use indexmap::IndexSet;

use crate::graph::{
    node::Node,
    value::FunctionLiteral,
    visit::{self, NodeVisitor},
};

/// Collects free variables: `Var` names not bound by an enclosing function
/// literal parameter.
struct FreeVarCollector<'g> {
    scopes: Vec<HashSet<&'g str>>,
    free: IndexSet<String>,
}

impl<'g> FreeVarCollector<'g> {
    fn new() -> Self {
        Self {
            scopes: Vec::new(),
            free: IndexSet::new(),
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains(name))
    }
}

impl<'g> NodeVisitor<'g> for FreeVarCollector<'g> {
    fn visit_var(&mut self, _node: &'g Node, name: &'g str) {
        if !self.is_bound(name) {
            self.free.insert(name.to_string());
        }
    }

    fn visit_function(&mut self, lit: &'g FunctionLiteral) {
        self.scopes
            .push(lit.params.iter().map(|(name, _)| name.as_str()).collect());
        visit::walk_function(self, lit);
        self.scopes.pop();
    }
}

/// Free variable names in first-occurrence order, each listed once.
pub fn collect_free_vars(node: &Node) -> Vec<String> {
    let mut collector = FreeVarCollector::new();
    collector.visit_node(node);
    collector.free.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use crate::graph::{
        free_vars::collect_free_vars,
        node::Node,
        ops,
        types::Type,
        value::Value,
    };

    #[test]
    fn collects_each_unbound_name_once() {
        let node = Node::output(
            "add",
            Type::Int,
            [
                ("lhs", Node::var("x", Type::Int)),
                ("rhs", ops::pick(Node::var("y", Type::Unknown), "a", Type::Int)),
                ("extra", Node::var("x", Type::Int)),
            ],
        );
        assert_eq!(collect_free_vars(&node), vec!["x", "y"]);
    }

    #[test]
    fn function_parameters_are_not_free() {
        let body = Node::output(
            "add",
            Type::Int,
            [("lhs", Node::var("row", Type::Int)), ("rhs", Node::var("offset", Type::Int))],
        );
        let lambda = Node::literal(Value::function(vec![("row".into(), Type::Int)], body));
        assert_eq!(collect_free_vars(&lambda), vec!["offset"]);
    }

    #[test]
    fn literal_graph_has_no_free_vars() {
        let node = ops::index(Node::literal(Value::list([Value::Int(1)])), 0);
        assert!(collect_free_vars(&node).is_empty());
    }
}
