use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::HashSet;
use std::rc::Rc;

use crate::store::{StoreId, Subscription};
use crate::track::{AccessList, Dep, TrackGuard};

struct ActiveSub {
    dep: Dep,
    sub: Subscription,
}

/// A re-executable computation whose re-execution is driven by version bumps
/// on the store keys it read last time.
///
/// Each [`execute`](ReactiveNode::execute) runs the computation inside a
/// fresh tracking session, then reconciles subscriptions against the captured
/// access list: keys no longer read are unsubscribed, newly read keys are
/// subscribed, survivors are left alone. The dependency set is therefore
/// always exact and current — never a union across executions.
///
/// Notifications set a dirty flag and fire the host's `on_invalidate`
/// callback; they never re-execute the node directly. Several notifications
/// arriving before the host gets around to re-executing coalesce into one
/// dirty state. If the computation panics, the tracking session is still torn
/// down (guard drop) and the panic propagates to the host untouched.
pub struct ReactiveNode<T> {
    compute: Box<dyn Fn() -> T>,
    subs: RefCell<HashMap<(StoreId, String), ActiveSub>>,
    dep_order: RefCell<Vec<(StoreId, String)>>,
    dirty: Rc<Cell<bool>>,
    invalidate: Rc<RefCell<Option<Box<dyn Fn()>>>>,
}

impl<T> ReactiveNode<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        Self {
            compute: Box::new(compute),
            subs: RefCell::new(HashMap::new()),
            dep_order: RefCell::new(Vec::new()),
            // Never executed yet, so the first render is always due.
            dirty: Rc::new(Cell::new(true)),
            invalidate: Rc::new(RefCell::new(None)),
        }
    }

    /// Install the host's invalidation signal. Fired (after the dirty flag is
    /// set) every time a subscribed key's version bumps.
    pub fn on_invalidate(&self, f: impl Fn() + 'static) {
        *self.invalidate.borrow_mut() = Some(Box::new(f));
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Run the computation under tracking, reconcile subscriptions, clear the
    /// dirty flag, and return the computed value.
    pub fn execute(&self) -> T {
        let guard = TrackGuard::begin();
        // Cleared up front: a computation that writes one of its own
        // currently-subscribed keys re-dirties itself, and that invalidation
        // must survive this execution.
        self.dirty.set(false);
        // A panic here drops `guard`, which pops the session before unwinding
        // continues — later unrelated reads land in no stale list.
        let value = (self.compute)();
        let reads = guard.finish();
        self.reconcile(reads);
        value
    }

    /// Release every active subscription. Idempotent; also run on drop so an
    /// unmounted node synchronously stops observing the store.
    pub fn stop(&self) {
        let subs = std::mem::take(&mut *self.subs.borrow_mut());
        for (_, active) in subs {
            active.dep.store.unsubscribe(active.sub);
        }
        self.dep_order.borrow_mut().clear();
        self.dirty.set(false);
    }

    /// Current dependency set, in first-access order. For hosts and tests.
    pub fn dependencies(&self) -> Vec<(StoreId, String)> {
        self.dep_order.borrow().clone()
    }

    fn reconcile(&self, reads: AccessList) {
        let mut subs = self.subs.borrow_mut();

        let fresh: HashSet<(StoreId, String)> = reads
            .iter()
            .map(|d| (d.store.id(), d.key.clone()))
            .collect();

        // removed = old − new
        let dropped: Vec<(StoreId, String)> = subs
            .keys()
            .filter(|ident| !fresh.contains(*ident))
            .cloned()
            .collect();
        for ident in dropped {
            if let Some(active) = subs.remove(&ident) {
                active.dep.store.unsubscribe(active.sub);
            }
        }

        // added = new − old; survivors keep their existing subscription.
        for dep in &reads {
            let ident = (dep.store.id(), dep.key.clone());
            if subs.contains_key(&ident) {
                continue;
            }
            let dirty = self.dirty.clone();
            let invalidate = self.invalidate.clone();
            let sub = dep.store.subscribe(&dep.key, move || {
                dirty.set(true);
                if let Some(f) = invalidate.borrow().as_ref() {
                    f();
                }
            });
            subs.insert(ident, ActiveSub { dep: dep.clone(), sub });
        }

        log::debug!("node reconciled to {} dependency(ies)", subs.len());
        *self.dep_order.borrow_mut() = reads
            .iter()
            .map(|d| (d.store.id(), d.key.clone()))
            .collect();
    }
}

impl<T> Drop for ReactiveNode<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
