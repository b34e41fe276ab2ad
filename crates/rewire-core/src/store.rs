use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::track;
use crate::value::{Value, ValueError, decode, encode};

slotmap::new_key_type! {
    struct SubSlot;
}

/// Identifies a store instance so dependency entries from different stores
/// (state store vs. dataset store) never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

thread_local! {
    static NEXT_STORE_ID: Cell<u64> = const { Cell::new(1) };
}

struct Entry {
    value: Value,
    version: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    subs: HashMap<String, SlotMap<SubSlot, Rc<dyn Fn()>>>,
    batch_depth: usize,
    pending: Vec<String>,
}

/// Token returned by [`Store::subscribe`]; hand it back to
/// [`Store::unsubscribe`] to release the callback.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    slot: SubSlot,
}

/// A key-version store: string keys mapped to `(value, version)` pairs with
/// per-key push subscriptions.
///
/// Cloning a `Store` clones the handle, not the contents. Versions start at
/// 0 (never written) and bump strictly on every write; subscribers are
/// notified after the write commits. Reads made inside a tracking session
/// are recorded as dependencies of that session.
///
/// Stores are passed explicitly to whatever needs them. Multiple independent
/// stores may coexist with identical contracts; there is no ambient lookup.
#[derive(Clone)]
pub struct Store {
    id: StoreId,
    inner: Rc<RefCell<Inner>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let id = NEXT_STORE_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            StoreId(id)
        });
        Self {
            id,
            inner: Rc::new(RefCell::new(Inner::default())),
        }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Bulk-seed entries at version 1, without a notification pass. Keys that
    /// already exist are skipped so version monotonicity holds.
    pub fn initialize(&self, snapshot: impl IntoIterator<Item = (String, Value)>) {
        let mut inner = self.inner.borrow_mut();
        for (key, value) in snapshot {
            if inner.entries.contains_key(&key) {
                log::warn!("initialize: key `{key}` already present; skipping");
                continue;
            }
            inner.entries.insert(key, Entry { value, version: 1 });
        }
    }

    /// Read the current value. Absent keys read as `None` — and are still
    /// recorded as dependencies, so a node that read an absent key re-executes
    /// once the key is first written.
    pub fn read(&self, key: &str) -> Option<Value> {
        track::record(self, key);
        self.inner.borrow().entries.get(key).map(|e| e.value.clone())
    }

    /// Read and decode as `T`.
    pub fn read_as<T: Clone + 'static>(&self, key: &str) -> Result<T, ValueError> {
        match self.read(key) {
            Some(value) => decode(key, &value),
            None => Err(ValueError::Missing(key.to_owned())),
        }
    }

    /// Write an opaque value: bump the key's version, commit, then notify
    /// that key's subscribers. Synchronous; visible to the next read.
    pub fn write_value(&self, key: &str, value: Value) {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.entries.get_mut(key) {
                Some(entry) => {
                    entry.version += 1;
                    entry.value = value;
                }
                None => {
                    inner.entries.insert(key.to_owned(), Entry { value, version: 1 });
                }
            }
            if inner.batch_depth > 0 {
                if !inner.pending.iter().any(|k| k == key) {
                    inner.pending.push(key.to_owned());
                }
                return;
            }
        }
        self.notify(key);
    }

    /// Typed write convenience.
    pub fn write<T: 'static>(&self, key: &str, value: T) {
        self.write_value(key, encode(value));
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// 0 if the key has never been written.
    pub fn get_version(&self, key: &str) -> u64 {
        self.inner.borrow().entries.get(key).map_or(0, |e| e.version)
    }

    /// Defer notifications for the duration of `f`, then run one coalesced
    /// pass: at most one callback invocation per written key, post-commit
    /// versions. Nests; only the outermost batch flushes.
    ///
    /// If `f` panics the depth is still unwound (guard drop), so later writes
    /// notify normally. The panicked batch's own pending notifications are
    /// discarded rather than delivered mid-unwind.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        struct BatchGuard<'a> {
            store: &'a Store,
        }
        impl Drop for BatchGuard<'_> {
            fn drop(&mut self) {
                let flush = {
                    let mut inner = self.store.inner.borrow_mut();
                    inner.batch_depth -= 1;
                    if inner.batch_depth == 0 {
                        std::mem::take(&mut inner.pending)
                    } else {
                        Vec::new()
                    }
                };
                if flush.is_empty() {
                    return;
                }
                if std::thread::panicking() {
                    log::warn!(
                        "batch unwound; discarding {} pending notification(s)",
                        flush.len()
                    );
                    return;
                }
                for key in flush {
                    self.store.notify(&key);
                }
            }
        }

        self.inner.borrow_mut().batch_depth += 1;
        let _guard = BatchGuard { store: self };
        f()
    }

    pub fn subscribe(&self, key: &str, callback: impl Fn() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let slot = inner
            .subs
            .entry(key.to_owned())
            .or_insert_with(SlotMap::with_key)
            .insert(Rc::new(callback));
        Subscription {
            key: key.to_owned(),
            slot,
        }
    }

    pub fn unsubscribe(&self, sub: Subscription) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slots) = inner.subs.get_mut(&sub.key) {
            slots.remove(sub.slot);
            if slots.is_empty() {
                inner.subs.remove(&sub.key);
            }
        }
    }

    /// Live subscriber count for one key. Exposed so hosts (and tests) can
    /// verify teardown released everything.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner.borrow().subs.get(key).map_or(0, SlotMap::len)
    }

    fn notify(&self, key: &str) {
        // Clone the callbacks out before invoking: a subscriber may write
        // back into this store, which re-borrows the inner cell.
        let callbacks: Vec<Rc<dyn Fn()>> = {
            let inner = self.inner.borrow();
            match inner.subs.get(key) {
                Some(slots) => slots.values().cloned().collect(),
                None => return,
            }
        };
        log::trace!("store {:?}: notifying {} subscriber(s) of `{key}`", self.id, callbacks.len());
        for cb in callbacks {
            cb();
        }
    }
}
