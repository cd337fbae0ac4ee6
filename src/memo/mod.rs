//! Structural memoization.
//!
//! Two tools give structurally identical graph fragments the same identity
//! across renders:
//! - [`Memo`] is a one-slot cache owned by a mount point. It hands back the
//!   previous render's value when the new one compares equal.
//! - [`NodeInterner`] canonicalizes nodes by content hash, so identity also
//!   agrees across mount points sharing a render context.
//!
//! Neither can return wrong data; the worst case of a miss is an extra
//! resubscription.
pub mod hash;
pub mod interner;

pub use hash::{content_hash, to_hex};
pub use interner::NodeInterner;

use crate::graph::node::Node;

/// One-slot cache returning the previous value when the new one is equal.
#[derive(Debug)]
pub struct Memo<T> {
    current: Option<T>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if `eq(cached, &value)`, else caches and
    /// returns `value`.
    pub fn memoize_by(&mut self, value: T, eq: impl Fn(&T, &T) -> bool) -> T {
        match &self.current {
            Some(cached) if eq(cached, &value) => cached.clone(),
            _ => {
                self.current = Some(value.clone());
                value
            }
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

impl<T: Clone + PartialEq> Memo<T> {
    pub fn memoize(&mut self, value: T) -> T {
        self.memoize_by(value, |a, b| a == b)
    }
}

/// Comparator for [`Memo::memoize_by`] that treats nodes differing only in
/// their type annotations as equal.
pub fn shape_eq(a: &Node, b: &Node) -> bool {
    a.same_shape(b)
}
