//! The consumer-facing primitives.
//!
//! Each primitive is a hook: a state object owned by one mount point and
//! polled once per render with the node to show. Polling never blocks. A
//! hook that is waiting on the executor reports `loading` and asks the
//! [`RenderScheduler`](crate::render::RenderScheduler) for another render
//! when its answer arrives.
pub mod each;
pub mod mutation;
pub mod node_value;
pub mod refine;

pub use each::Each;
pub use mutation::{
    MakeMutation, Mutation, MutationStyle, MutationTarget, RootUpdate, use_make_mutation,
    use_mutation,
};
pub use node_value::NodeValue;
pub use refine::{Expand, ExpandedNode, NodeWithServerType, Refined, Refinement, ServerType};

/// A result and whether it is still being fetched for the current input.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub loading: bool,
    pub result: T,
}

impl<T> Loaded<T> {
    pub fn ready(result: T) -> Self {
        Self {
            loading: false,
            result,
        }
    }

    pub fn pending(result: T) -> Self {
        Self {
            loading: true,
            result,
        }
    }
}
