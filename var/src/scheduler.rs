use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// The timing capability used by `batch`, `debounce` and `throttle`.
///
/// Hosts back this with their event loop (timers + animation frames). Cancelling an unknown or
/// already-run task is a no-op.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now(&self) -> u64;
    /// Runs `task` once `delay_ms` milliseconds have elapsed.
    fn after(&self, delay_ms: u64, task: Task) -> TaskId;
    /// Runs `task` on the next animation frame.
    fn next_frame(&self, task: Task) -> TaskId;
    fn cancel(&self, id: TaskId);
}

/// A virtual-clock scheduler.
///
/// Nothing runs until the owner calls [`ManualScheduler::advance`] or
/// [`ManualScheduler::run_frame`], which makes time-based combinators deterministic in tests and
/// lets hosts drive them from a tick loop.
pub struct ManualScheduler {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<(u64, u64), Task>>,
    frames: RefCell<Vec<(u64, Task)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            next_id: Cell::new(0),
            timers: RefCell::new(BTreeMap::new()),
            frames: RefCell::new(Vec::new()),
        }
    }

    fn fresh_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Moves the clock forward, running every timer that falls due, in due order.
    ///
    /// Timers scheduled by running tasks are run as well if they fall due before the new time.
    pub fn advance(&self, delta_ms: u64) {
        let target = self.now_ms.get().saturating_add(delta_ms);
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers.keys().next().copied().filter(|(at, _)| *at <= target);
                due.and_then(|key| timers.remove(&key).map(|task| (key.0, task)))
            };
            let Some((at, task)) = next else {
                break;
            };
            if at > self.now_ms.get() {
                self.now_ms.set(at);
            }
            vtrace!(at, "ManualScheduler: timer fired");
            task();
        }
        self.now_ms.set(target);
    }

    /// Runs the callbacks queued for the next frame. Callbacks queued while running wait for the
    /// following frame. Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let frame = core::mem::take(&mut *self.frames.borrow_mut());
        let n = frame.len();
        for (_, task) in frame {
            task();
        }
        n
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> u64 {
        self.now_ms.get()
    }

    fn after(&self, delay_ms: u64, task: Task) -> TaskId {
        let id = self.fresh_id();
        let at = self.now_ms.get().saturating_add(delay_ms);
        self.timers.borrow_mut().insert((at, id), task);
        TaskId(id)
    }

    fn next_frame(&self, task: Task) -> TaskId {
        let id = self.fresh_id();
        self.frames.borrow_mut().push((id, task));
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) {
        let removed = {
            let mut timers = self.timers.borrow_mut();
            let key = timers.keys().find(|(_, tid)| *tid == id.0).copied();
            key.and_then(|key| timers.remove(&key))
        };
        if removed.is_some() {
            return;
        }
        let removed = {
            let mut frames = self.frames.borrow_mut();
            let pos = frames.iter().position(|(tid, _)| *tid == id.0);
            pos.map(|pos| frames.remove(pos))
        };
        // Dropped outside the borrow: a task's captures may reach back into the scheduler.
        drop(removed);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now_ms", &self.now_ms.get())
            .field("pending_timers", &self.pending_timers())
            .field("pending_frames", &self.pending_frames())
            .finish()
    }
}
