use std::cell::{Cell, RefCell};

use smallvec::SmallVec;

use crate::store::{Store, StoreId};

/// One recorded read: the store it hit and the key it asked for. Holding the
/// store handle lets a node subscribe later without any ambient registry.
#[derive(Clone)]
pub struct Dep {
    pub store: Store,
    pub key: String,
}

impl Dep {
    pub fn ident(&self) -> (StoreId, &str) {
        (self.store.id(), &self.key)
    }
}

/// Ordered, de-duplicated list of reads captured by one session.
pub type AccessList = SmallVec<[Dep; 8]>;

struct Session {
    id: u64,
    reads: AccessList,
}

thread_local! {
    static SESSIONS: RefCell<Vec<Session>> = const { RefCell::new(Vec::new()) };
    static NEXT_SESSION_ID: Cell<u64> = const { Cell::new(1) };
}

/// RAII tracking session. Sessions form a strict stack: reads are recorded
/// into the innermost session only, which is what keeps a nested node's
/// dependencies out of its parent's set.
///
/// Call [`finish`](TrackGuard::finish) to pop the session and take its access
/// list. If the guard is dropped instead (the tracked computation panicked),
/// the session is popped and discarded so no stale list captures later
/// unrelated reads.
pub struct TrackGuard {
    id: u64,
    finished: bool,
}

impl TrackGuard {
    pub fn begin() -> Self {
        let id = NEXT_SESSION_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        SESSIONS.with(|s| {
            s.borrow_mut().push(Session {
                id,
                reads: AccessList::new(),
            });
        });
        TrackGuard { id, finished: false }
    }

    /// Pop this session and return what it observed.
    pub fn finish(mut self) -> AccessList {
        self.finished = true;
        pop_session(self.id).unwrap_or_default()
    }
}

impl Drop for TrackGuard {
    fn drop(&mut self) {
        if !self.finished {
            pop_session(self.id);
        }
    }
}

fn pop_session(id: u64) -> Option<AccessList> {
    SESSIONS.with(|s| {
        let mut stack = s.borrow_mut();
        // Guards live on the call stack, so the finishing guard is the top.
        debug_assert_eq!(stack.last().map(|s| s.id), Some(id), "tracking sessions finished out of order");
        match stack.pop() {
            Some(session) if session.id == id => Some(session.reads),
            Some(session) => {
                log::warn!("tracking session {} finished while {} was innermost; discarding both", id, session.id);
                None
            }
            None => None,
        }
    })
}

/// True while any tracking session is active on this thread.
pub fn is_tracking() -> bool {
    SESSIONS.with(|s| !s.borrow().is_empty())
}

/// Called by `Store::read`. Appends `(store, key)` to the innermost session,
/// preserving first-access order and dropping duplicates. A no-op outside a
/// session: untracked reads are valid, they just capture nothing.
pub(crate) fn record(store: &Store, key: &str) {
    SESSIONS.with(|s| {
        let mut stack = s.borrow_mut();
        let Some(top) = stack.last_mut() else {
            return;
        };
        let seen = top
            .reads
            .iter()
            .any(|d| d.store.id() == store.id() && d.key == key);
        if !seen {
            top.reads.push(Dep {
                store: store.clone(),
                key: key.to_owned(),
            });
        }
    });
}
