//! Pull-based reactive root: one mounted node plus the scope that owns it.

use std::cell::RefCell;
use std::rc::Rc;

use rewire_core::{ReactiveNode, Scope};

/// Owns a [`ReactiveNode`] and the [`Scope`] tying it to its mount point.
///
/// The host calls [`render`](Root::render) once per frame: the computation
/// re-executes only if some subscribed key changed since the last frame,
/// otherwise the cached value is returned. However many invalidations arrive
/// between frames, the next `render` runs the computation once.
///
/// [`unmount`](Root::unmount) (or dropping the root) disposes the scope,
/// which stops the node and synchronously releases every store subscription.
pub struct Root<T> {
    scope: Scope,
    node: Rc<ReactiveNode<T>>,
    last: RefCell<Option<T>>,
}

impl<T: Clone + 'static> Root<T> {
    pub fn mount(compute: impl Fn() -> T + 'static) -> Self {
        let node = Rc::new(ReactiveNode::new(compute));
        let scope = Scope::new();
        let n = node.clone();
        scope.add_disposer(move || n.stop());
        Self {
            scope,
            node,
            last: RefCell::new(None),
        }
    }

    /// Host signal fired when any dependency changes. Optional; hosts may
    /// poll [`is_dirty`](Root::is_dirty) instead.
    pub fn on_invalidate(&self, f: impl Fn() + 'static) {
        self.node.on_invalidate(f);
    }

    pub fn is_dirty(&self) -> bool {
        self.node.is_dirty()
    }

    pub fn render(&self) -> T {
        let cached = self.last.borrow().clone();
        match cached {
            Some(value) if !self.node.is_dirty() => value,
            _ => {
                log::trace!("root: re-executing");
                let value = self.scope.run(|| self.node.execute());
                *self.last.borrow_mut() = Some(value.clone());
                value
            }
        }
    }

    /// The scope nested regions should hang their cleanup on.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn unmount(self) {
        self.scope.dispose();
    }
}
