//! Timer seam between the session and whatever drives it.
//!
//! The browser build arms real `setInterval` / `setTimeout` callbacks (see
//! `web::WebScheduler`); native hosts and tests use [`ManualScheduler`], which
//! fires tasks against a virtual millisecond clock.

use crate::error::CookingError;
use crate::session::Session;

/// Work a timer hands back to [`Session::run_task`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// One simulation step while cooking.
    Tick,
    /// Clears the re-entrancy guard.
    ReleaseGuard,
    /// Dismisses the UI after a resolved session.
    AutoClose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub i32);

pub trait Scheduler {
    fn arm_interval(&mut self, period_ms: u32, task: Task) -> Result<TaskHandle, CookingError>;
    fn arm_timeout(&mut self, delay_ms: u32, task: Task) -> Result<TaskHandle, CookingError>;
    /// Cancelling an already fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TaskHandle);
}

// --- Virtual clock ------------------------------------------------------------

#[derive(Clone, Debug)]
struct Pending {
    handle: TaskHandle,
    due_ms: u64,
    period_ms: Option<u64>,
    task: Task,
}

/// Deterministic scheduler: nothing fires until the clock is advanced.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_handle: i32,
    pending: Vec<Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_armed(&self, task: Task) -> bool {
        self.pending.iter().any(|p| p.task == task)
    }

    pub fn armed_count(&self, task: Task) -> usize {
        self.pending.iter().filter(|p| p.task == task).count()
    }

    /// Removes and returns the earliest task due at or before `until_ms`,
    /// moving the clock to its due time. Intervals are re-queued.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Task> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.handle.0))
            .map(|(i, _)| i)?;
        let Pending { due_ms, period_ms, task, .. } = self.pending[idx];
        self.now_ms = due_ms;
        match period_ms {
            Some(period) => self.pending[idx].due_ms += period,
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(task)
    }

    fn push(&mut self, delay_ms: u32, period_ms: Option<u64>, task: Task) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.pending.push(Pending { handle, due_ms: self.now_ms + delay_ms as u64, period_ms, task });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn arm_interval(&mut self, period_ms: u32, task: Task) -> Result<TaskHandle, CookingError> {
        // A zero period would never let the clock move forward.
        let period = period_ms.max(1);
        Ok(self.push(period, Some(period as u64), task))
    }

    fn arm_timeout(&mut self, delay_ms: u32, task: Task) -> Result<TaskHandle, CookingError> {
        Ok(self.push(delay_ms, None, task))
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}

impl Session<ManualScheduler> {
    /// Advances virtual time by `ms`, running every task that comes due in order.
    pub fn run_for(&mut self, ms: u64) {
        let until = self.scheduler().now_ms() + ms;
        while let Some(task) = self.scheduler_mut().pop_due(until) {
            self.run_task(task);
        }
        self.scheduler_mut().now_ms = until;
    }
}
