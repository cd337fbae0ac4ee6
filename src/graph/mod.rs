//! Node Model: the tagged-variant representation of graph expressions.
//!
//! # Persistence Invariant
//! Graphs are persistent. A node never changes after construction; edits
//! build new nodes that share untouched children with the old ones. This is
//! what makes identity-based memoization sound: if two renders hold the
//! same `Rc`, they hold the same graph.
pub mod fold;
pub mod free_vars;
pub mod node;
pub mod ops;
pub mod types;
pub mod value;
pub mod visit;
pub mod wire;

pub use fold::{NodeFolder, fold_const, fold_node, fold_output};
pub use free_vars::collect_free_vars;
pub use node::{Node, NodeKind, OpCall, WeakNode};
pub use types::Type;
pub use value::{DecodeError, FunctionLiteral, Value};
pub use visit::{NodeVisitor, contains_output, walk_function, walk_node, walk_output};
