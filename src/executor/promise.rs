use std::{cell::RefCell, fmt, mem, rc::Rc};

use crate::diagnostics::ExecutorError;

type Waiter<T, E> = Box<dyn FnOnce(Result<T, E>)>;

struct State<T, E> {
    outcome: Option<Result<T, E>>,
    waiters: Vec<Waiter<T, E>>,
}

/// Single-threaded one-shot completion cell.
///
/// A promise is settled at most once through its [`Resolver`]; later
/// settlements are ignored. Callbacks registered with [`Promise::then`] run
/// on settlement, or immediately if the promise has already settled.
pub struct Promise<T, E = ExecutorError> {
    state: Rc<RefCell<State<T, E>>>,
}

/// Settling half of a [`Promise`].
pub struct Resolver<T, E = ExecutorError> {
    state: Rc<RefCell<State<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

pub fn pending<T, E>() -> (Promise<T, E>, Resolver<T, E>) {
    let state = Rc::new(RefCell::new(State {
        outcome: None,
        waiters: Vec::new(),
    }));
    (
        Promise {
            state: Rc::clone(&state),
        },
        Resolver { state },
    )
}

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    pub fn settled(outcome: Result<T, E>) -> Self {
        let (promise, resolver) = pending();
        resolver.settle(outcome);
        promise
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().outcome.is_some()
    }

    /// The outcome, if settled.
    pub fn poll(&self) -> Option<Result<T, E>> {
        self.state.borrow().outcome.clone()
    }

    pub fn then(&self, waiter: impl FnOnce(Result<T, E>) + 'static) {
        let settled = self.state.borrow().outcome.clone();
        match settled {
            Some(outcome) => waiter(outcome),
            None => self.state.borrow_mut().waiters.push(Box::new(waiter)),
        }
    }

    /// A promise settled with `f` applied to this one's outcome.
    pub fn map<U, F>(&self, f: impl FnOnce(Result<T, E>) -> Result<U, F> + 'static) -> Promise<U, F>
    where
        U: Clone + 'static,
        F: Clone + 'static,
    {
        let (promise, resolver) = pending();
        self.then(move |outcome| {
            resolver.settle(f(outcome));
        });
        promise
    }

    pub fn ptr_eq(&self, other: &Promise<T, E>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Resolver<T, E> {
    /// Settles the promise. Returns `false` if it had already settled.
    pub fn settle(&self, outcome: Result<T, E>) -> bool {
        let waiters = {
            let mut state = self.state.borrow_mut();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome.clone());
            mem::take(&mut state.waiters)
        };
        // Waiters run with the cell released so they may poll or chain.
        for waiter in waiters {
            waiter(outcome.clone());
        }
        true
    }

    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().outcome.is_some()
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settled = self.state.borrow().outcome.is_some();
        f.debug_struct("Promise").field("settled", &settled).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn waiters_run_once_on_settlement() {
        let (promise, resolver) = pending::<i32, String>();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        promise.then(move |outcome| sink.borrow_mut().push(outcome));

        assert!(!promise.is_settled());
        assert!(resolver.resolve(1));
        assert!(!resolver.resolve(2));
        assert_eq!(*seen.borrow(), vec![Ok(1)]);
        assert_eq!(promise.poll(), Some(Ok(1)));
    }

    #[test]
    fn then_after_settlement_runs_immediately() {
        let promise = Promise::<i32, String>::settled(Err("boom".into()));
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        promise.then(move |outcome| *sink.borrow_mut() = Some(outcome));
        assert_eq!(*seen.borrow(), Some(Err("boom".to_string())));
    }

    #[test]
    fn waiters_may_reenter_the_promise() {
        let (promise, resolver) = pending::<i32, String>();
        let inner = promise.clone();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        promise.then(move |_| *sink.borrow_mut() = inner.poll());
        resolver.resolve(7);
        assert_eq!(*seen.borrow(), Some(Ok(7)));
    }

    #[test]
    fn map_chains_outcomes() {
        let (promise, resolver) = pending::<i32, String>();
        let doubled = promise.map(|outcome| outcome.map(|v| v * 2));
        resolver.resolve(21);
        assert_eq!(doubled.poll(), Some(Ok::<_, String>(42)));
    }
}
