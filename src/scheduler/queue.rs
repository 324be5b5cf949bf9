//! Deferred task queue
//!
//! Tasks are due at a point on the host's millisecond clock and run in
//! (due time, scheduling order) order when the host polls. Cancelling a task
//! removes it from the queue, so cancelled work can never fire.

use crate::scheduler::CancellationToken;
use std::collections::BTreeMap;

/// Unique identifier for a scheduled task, increasing in scheduling order
pub type TaskId = u64;

/// Handle to a scheduled task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    due_ms: u64,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }
}

#[derive(Debug)]
struct Entry<T> {
    payload: T,
    token: CancellationToken,
}

/// Queue of deferred tasks ordered by due time
#[derive(Debug)]
pub struct DeferredQueue<T> {
    tasks: BTreeMap<(u64, TaskId), Entry<T>>,
    next_id: TaskId,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` to run `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, payload: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;

        let due_ms = now_ms.saturating_add(delay_ms);
        let token = CancellationToken::new();
        self.tasks.insert(
            (due_ms, id),
            Entry {
                payload,
                token: token.clone(),
            },
        );

        TaskHandle { id, due_ms, token }
    }

    /// Cancel a task. Returns `true` if it was still queued.
    pub fn cancel(&mut self, handle: &TaskHandle) -> bool {
        handle.token.cancel();
        self.tasks.remove(&(handle.due_ms, handle.id)).is_some()
    }

    /// Cancel every queued task. Returns how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        for entry in self.tasks.values() {
            entry.token.cancel();
        }
        self.tasks.clear();
        count
    }

    /// Remove and return the earliest task due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskId, T)> {
        loop {
            let entry = self.tasks.first_entry()?;
            if entry.key().0 > now_ms {
                return None;
            }
            let ((_, id), task) = entry.remove_entry();
            if !task.token.is_cancelled() {
                return Some((id, task.payload));
            }
        }
    }

    /// Due time of the earliest queued task
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.keys().next().map(|&(due, _)| due)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
