use crate::diagnostics::GraphError;
use crate::engine::{Loaded, NodeValue};
use crate::graph::{node::Node, ops, value::Value};
use crate::render::RenderContext;

/// Turns a list-typed node into one `index(list, i)` node per element.
///
/// The length comes from a `count` subscription. Until it arrives, the hook
/// yields `each_prefetch` index nodes so the first rows can start loading
/// alongside the count.
#[derive(Default)]
pub struct Each {
    count: NodeValue,
}

impl Each {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, cx: &RenderContext, list: &Node) -> Result<Loaded<Vec<Node>>, GraphError> {
        // An absent count means an empty list, not an empty optional.
        let count = self.count.poll(&cx.required_scope(), &ops::count(list.clone()))?;
        let len = match (&count.result, count.loading) {
            (_, true) => cx.config().each_prefetch,
            (Value::Int(n), false) => usize::try_from(*n).unwrap_or(0),
            _ => 0,
        };
        Ok(Loaded {
            loading: count.loading,
            result: (0..len).map(|i| ops::index(list.clone(), i as i64)).collect(),
        })
    }
}
