use std::cell::RefCell;
use std::rc::{Rc, Weak};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Mount-point lifetime container. A reactive region registers its teardown
/// (node `stop()`, pending timers) as disposers on the scope that mounted it;
/// disposing the scope tears down children first, then runs the disposers in
/// registration order. Dropping the last handle to an undisposed scope runs
/// the same teardown.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

#[derive(Default)]
struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
}

impl ScopeInner {
    fn teardown(&self) {
        for child in std::mem::take(&mut *self.children.borrow_mut()) {
            child.dispose();
        }
        for disposer in std::mem::take(&mut *self.disposers.borrow_mut()) {
            disposer();
        }
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with this scope current, restoring the previous current scope
    /// afterwards (including on unwind).
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    /// A child scope torn down before this one.
    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    pub fn dispose(self) {
        self.inner.teardown();
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    })
}

/// Register cleanup against the current scope; runs at its teardown. Outside
/// any scope the cleanup has no owner and is dropped with a warning.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    match current_scope() {
        Some(scope) => scope.add_disposer(f),
        None => log::warn!("on_cleanup called outside a scope; cleanup will never run"),
    }
}
