//! Visibility/loading state for virtualized list rows.
//!
//! The same pattern as the reactive core, one level simpler: a manager owned
//! by one virtualized-list instance tracks per-row load status, debounces the
//! `Loading → Loaded` transition against a [`Clock`], and bounds its own
//! memory by evicting the oldest records. The host drives time by calling
//! [`RowStateManager::tick`] each frame, the way a scroll container advances
//! its inertia.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use rewire_core::clock::{Clock, SystemClock};
use web_time::{Duration, Instant};

pub type RowKey = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowStatus {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Error,
}

/// Row-loading failure, carried as data. Nothing in this module returns
/// `Err`; an errored row is a terminal status the host chooses how to show.
#[derive(Clone, Debug, PartialEq)]
pub struct RowError {
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct RowRecord {
    pub status: RowStatus,
    pub load_start: Option<Instant>,
    pub error: Option<RowError>,
}

/// What happens when a row that has been `Loaded` before scrolls back into
/// view. `Instant` skips the skeleton (no second debounce); `Debounce`
/// repeats the full loading cycle every time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    #[default]
    Instant,
    Debounce,
}

#[derive(Clone, Copy, Debug)]
pub struct RowManagerConfig {
    /// Records beyond this are evicted oldest-first, whatever their status.
    pub max_tracked: usize,
    pub reload: ReloadPolicy,
}

impl Default for RowManagerConfig {
    fn default() -> Self {
        Self {
            max_tracked: 1000,
            reload: ReloadPolicy::default(),
        }
    }
}

pub type ListenerId = u64;

struct Timer {
    key: RowKey,
    deadline: Instant,
}

pub struct RowStateManager {
    config: RowManagerConfig,
    clock: Rc<dyn Clock>,
    records: RefCell<HashMap<RowKey, RowRecord>>,
    /// Insertion order, mirrors `records` keys exactly. Eviction source.
    order: RefCell<VecDeque<RowKey>>,
    timers: RefCell<Vec<Timer>>,
    loaded_before: RefCell<HashSet<RowKey>>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
    next_listener: Cell<ListenerId>,
}

impl RowStateManager {
    pub fn new(config: RowManagerConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: RowManagerConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            records: RefCell::new(HashMap::new()),
            order: RefCell::new(VecDeque::new()),
            timers: RefCell::new(Vec::new()),
            loaded_before: RefCell::new(HashSet::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        }
    }

    /// Current record, or a default `Unloaded` one. Never inserts.
    pub fn state_of(&self, key: &str) -> RowRecord {
        self.records.borrow().get(key).cloned().unwrap_or_default()
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.state_of(key).status == RowStatus::Loaded
    }

    /// Sticky: set the first time a row reaches `Loaded`, kept across unload
    /// cycles, dropped only on capacity eviction.
    pub fn has_loaded_before(&self, key: &str) -> bool {
        self.loaded_before.borrow().contains(key)
    }

    pub fn tracked_count(&self) -> usize {
        self.records.borrow().len()
    }

    /// Rows entered the viewport. Cancels any pending completion timer for
    /// them; under `ReloadPolicy::Instant` a previously loaded row goes
    /// straight back to `Loaded`.
    pub fn mark_loading(&self, keys: &[RowKey]) {
        if keys.is_empty() {
            return;
        }
        let now = self.clock.now();
        for key in keys {
            self.cancel_timer(key);
            let instant_reload = self.config.reload == ReloadPolicy::Instant
                && self.loaded_before.borrow().contains(key);
            let record = if instant_reload {
                RowRecord {
                    status: RowStatus::Loaded,
                    load_start: None,
                    error: None,
                }
            } else {
                RowRecord {
                    status: RowStatus::Loading,
                    load_start: Some(now),
                    error: None,
                }
            };
            self.upsert(key, record);
        }
        self.notify();
    }

    /// Arm the debounced `Loading → Loaded` transition. Replaces any timer
    /// already armed for the key; fires from [`tick`](Self::tick). Notifies
    /// like every other mutating operation, even though the visible row state
    /// only changes when the timer fires.
    pub fn schedule_loaded(&self, key: &str, delay: Duration) {
        let deadline = self.clock.now() + delay;
        {
            let mut timers = self.timers.borrow_mut();
            timers.retain(|t| t.key != key);
            timers.push(Timer {
                key: key.to_owned(),
                deadline,
            });
        }
        self.notify();
    }

    /// Rows left the viewport before (or after) completing: pending timers
    /// are cancelled and the records dropped. The loaded-before flag stays,
    /// so `ReloadPolicy::Instant` can skip the skeleton on re-entry.
    pub fn mark_unloaded(&self, keys: &[RowKey]) {
        if keys.is_empty() {
            return;
        }
        {
            let mut records = self.records.borrow_mut();
            let mut order = self.order.borrow_mut();
            for key in keys {
                self.cancel_timer(key);
                records.remove(key);
                order.retain(|k| k != key);
            }
        }
        self.notify();
    }

    pub fn mark_error(&self, keys: &[RowKey], error: RowError) {
        if keys.is_empty() {
            return;
        }
        for key in keys {
            self.cancel_timer(key);
            self.upsert(
                key,
                RowRecord {
                    status: RowStatus::Error,
                    load_start: None,
                    error: Some(error.clone()),
                },
            );
        }
        self.notify();
    }

    /// Fire every timer whose deadline has passed. Rows still `Loading`
    /// become `Loaded` and their sticky flag is set; anything else (the row
    /// was unloaded, errored, or evicted meanwhile) is ignored.
    pub fn tick(&self) {
        let now = self.clock.now();
        let due: Vec<RowKey> = {
            let mut timers = self.timers.borrow_mut();
            let (fire, keep): (Vec<Timer>, Vec<Timer>) =
                timers.drain(..).partition(|t| t.deadline <= now);
            *timers = keep;
            fire.into_iter().map(|t| t.key).collect()
        };
        if due.is_empty() {
            return;
        }
        let mut changed = false;
        {
            let mut records = self.records.borrow_mut();
            for key in due {
                let Some(record) = records.get_mut(&key) else {
                    continue;
                };
                if record.status != RowStatus::Loading {
                    continue;
                }
                record.status = RowStatus::Loaded;
                record.error = None;
                self.loaded_before.borrow_mut().insert(key);
                changed = true;
            }
        }
        if changed {
            self.notify();
        }
    }

    /// Payload-less change signal; the host re-reads whatever rows it shows.
    pub fn subscribe(&self, f: impl Fn() + 'static) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    fn upsert(&self, key: &str, record: RowRecord) {
        let mut records = self.records.borrow_mut();
        let mut order = self.order.borrow_mut();
        if records.insert(key.to_owned(), record).is_none() {
            order.push_back(key.to_owned());
        }
        // Capacity: drop oldest-inserted records, and with them any armed
        // timer, so no stale callback can mutate an evicted key.
        while records.len() > self.config.max_tracked {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            log::debug!("row manager: evicting `{oldest}` at capacity {}", self.config.max_tracked);
            records.remove(&oldest);
            self.cancel_timer(&oldest);
            self.loaded_before.borrow_mut().remove(&oldest);
        }
    }

    fn cancel_timer(&self, key: &str) {
        self.timers.borrow_mut().retain(|t| t.key != key);
    }

    fn notify(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for f in listeners {
            f();
        }
    }
}
