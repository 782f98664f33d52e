use crate::grid::Position;
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Simulated time, in the same units as the expiry delay (milliseconds for the CLI).
pub type Tick = u64;

/// Lifetime of a temporary obstacle before it reverts to free terrain.
pub const DEFAULT_EXPIRY_DELAY: Tick = 5000;

/// Deferred work the coordinator hands to the timer facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Revert the cell to `Free` if it is still a temporary block.
    Expire(Position),
    /// Re-run the search after an expiry changed the terrain.
    Recompute,
}

/// Timer facility owned by the host event loop.
///
/// The coordinator only ever schedules tasks and drains the ones that are due;
/// there is no cancellation. Stale tasks are expected to be harmless when they run.
pub trait Scheduler {
    /// Current time of the facility's clock.
    fn now(&self) -> Tick;

    /// Queue `task` to become due `delay` units from now.
    fn schedule_after(&mut self, delay: Tick, task: Task);

    /// Pop the earliest task due at or before `until`, moving the clock to its due time.
    fn pop_due(&mut self, until: Tick) -> Option<(Tick, Task)>;

    /// Move the clock forward to `to`. Never moves it backwards.
    fn advance_clock(&mut self, to: Tick);
}

/// Heap entry ordered by due time, then by scheduling order.
/// We implement `Ord` in reverse to make the `BinaryHeap` a min-heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerEntry {
    due: Tick,
    sequence: u64,
    task: Task,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Virtual-clock timer queue used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Tick,
    next_sequence: u64,
    queue: BinaryHeap<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that have been scheduled but not yet popped.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Tick> {
        self.queue.peek().map(|entry| entry.due)
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Tick {
        self.now
    }

    fn schedule_after(&mut self, delay: Tick, task: Task) {
        let entry = TimerEntry {
            due: self.now.saturating_add(delay),
            sequence: self.next_sequence,
            task,
        };
        self.next_sequence += 1;
        self.queue.push(entry);
    }

    fn pop_due(&mut self, until: Tick) -> Option<(Tick, Task)> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.task))
    }

    fn advance_clock(&mut self, to: Tick) {
        self.now = self.now.max(to);
    }
}

/// Registers expiry checks for temporary obstacles on the host timer facility.
///
/// Every `TemporaryBlock` placement goes through here, whether it came from
/// random generation or a manual edit.
#[derive(Debug)]
pub struct ObstacleScheduler<S> {
    timers: S,
    delay: Tick,
}

impl<S: Scheduler> ObstacleScheduler<S> {
    pub fn new(timers: S, delay: Tick) -> Self {
        ObstacleScheduler { timers, delay }
    }

    pub fn delay(&self) -> Tick {
        self.delay
    }

    /// Schedule one expiry check for `position`. Repeated placements on the
    /// same cell each get their own check.
    pub fn register_expiry(&mut self, position: Position) {
        debug!(
            "temporary block at {} expires at t={}",
            position,
            self.timers.now().saturating_add(self.delay)
        );
        self.timers.schedule_after(self.delay, Task::Expire(position));
    }

    pub fn timers(&self) -> &S {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut S {
        &mut self.timers
    }
}
