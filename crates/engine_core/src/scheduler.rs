//! Frame-driven task scheduler.
//!
//! Every transient timer in the game (light flicker, fades, ramps) is a task
//! here and advances only when the frame loop calls [`Scheduler::tick`], so
//! nothing mutates shared state from a second clock.

use crate::error::EngineError;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// When a task fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Fire once after `delay` seconds.
    Once { delay: f32 },
    /// Fire every `interval` seconds, `repeats` times (forever when `None`).
    Every { interval: f32, repeats: Option<u32> },
    /// Fire every tick for `duration` seconds with normalized progress.
    /// The final firing always carries progress 1.0.
    Span { duration: f32 },
}

/// One task firing produced by [`Scheduler::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct Firing<T> {
    pub id: TaskId,
    pub task: T,
    /// `Span`: elapsed / duration. `Every`: fraction of repeats done (0.0 when unbounded). `Once`: 1.0.
    pub progress: f32,
    /// True on the firing that retires the task.
    pub last: bool,
}

#[derive(Debug)]
struct Entry<T> {
    id: TaskId,
    task: T,
    cadence: Cadence,
    elapsed: f32,
    fired: u32,
}

/// Owns all pending tasks; ticked once per frame from the frame clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task. It is first considered on the next `tick`.
    pub fn schedule(&mut self, cadence: Cadence, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            task,
            cadence,
            elapsed: 0.0,
            fired: 0,
        });
        id
    }

    /// Remove a pending task and hand it back.
    pub fn cancel(&mut self, id: TaskId) -> Result<T, EngineError> {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            log::debug!("Cancel of {:?} missed: not pending", id);
            return Err(EngineError::UnknownTask(id));
        };
        log::trace!("Cancelled {:?}", id);
        Ok(self.entries.remove(index).task)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending tasks in insertion order.
    pub fn pending(&self) -> impl Iterator<Item = (TaskId, &T)> {
        self.entries.iter().map(|e| (e.id, &e.task))
    }

    /// Advance every task by `dt` and collect this frame's firings in insertion order.
    pub fn tick(&mut self, dt: f32) -> Vec<Firing<T>> {
        let mut firings = Vec::new();
        let dt = dt.max(0.0);

        self.entries.retain_mut(|entry| {
            entry.elapsed += dt;
            match entry.cadence {
                Cadence::Once { delay } => {
                    if entry.elapsed >= delay {
                        firings.push(Firing {
                            id: entry.id,
                            task: entry.task.clone(),
                            progress: 1.0,
                            last: true,
                        });
                        return false;
                    }
                    true
                }
                Cadence::Every { interval, repeats } => {
                    loop {
                        if interval > 0.0 {
                            if entry.elapsed < interval {
                                return true;
                            }
                            entry.elapsed -= interval;
                        }
                        entry.fired += 1;
                        let last = repeats.map_or(false, |r| entry.fired >= r);
                        let progress = match repeats {
                            Some(r) if r > 0 => entry.fired as f32 / r as f32,
                            _ => 0.0,
                        };
                        firings.push(Firing {
                            id: entry.id,
                            task: entry.task.clone(),
                            progress,
                            last,
                        });
                        if last {
                            return false;
                        }
                        if interval <= 0.0 {
                            return true;
                        }
                    }
                }
                Cadence::Span { duration } => {
                    let progress = if duration <= 0.0 {
                        1.0
                    } else {
                        (entry.elapsed / duration).min(1.0)
                    };
                    let last = progress >= 1.0;
                    firings.push(Firing {
                        id: entry.id,
                        task: entry.task.clone(),
                        progress,
                        last,
                    });
                    !last
                }
            }
        });

        let retired = firings.iter().filter(|f| f.last).count();
        if retired > 0 {
            log::trace!("Scheduler retired {} task(s), {} pending", retired, self.entries.len());
        }
        firings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_after_delay_then_retires() {
        let mut s = Scheduler::new();
        let id = s.schedule(Cadence::Once { delay: 1.0 }, "boom");
        assert!(s.tick(0.5).is_empty());
        let firings = s.tick(0.5);
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].id, id);
        assert!(firings[0].last);
        assert!(s.is_empty());
    }

    #[test]
    fn every_catches_up_on_long_frames() {
        let mut s = Scheduler::new();
        s.schedule(Cadence::Every { interval: 0.1, repeats: Some(5) }, 'f');
        // 0.35s covers three intervals.
        let firings = s.tick(0.35);
        assert_eq!(firings.len(), 3);
        assert!(firings.iter().all(|f| !f.last));
        let firings = s.tick(1.0);
        assert_eq!(firings.len(), 2);
        assert!(firings[1].last);
        assert!((firings[1].progress - 1.0).abs() < 1e-6);
        assert!(s.is_empty());
    }

    #[test]
    fn every_without_repeats_never_retires() {
        let mut s = Scheduler::new();
        s.schedule(Cadence::Every { interval: 0.5, repeats: None }, ());
        for _ in 0..20 {
            s.tick(0.5);
        }
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn span_progress_is_monotonic_and_ends_at_one() {
        let mut s = Scheduler::new();
        s.schedule(Cadence::Span { duration: 1.0 }, 0u8);
        let mut last_progress = 0.0;
        let mut finished = false;
        for _ in 0..10 {
            for f in s.tick(0.3) {
                assert!(f.progress >= last_progress);
                last_progress = f.progress;
                if f.last {
                    assert_eq!(f.progress, 1.0);
                    finished = true;
                }
            }
        }
        assert!(finished);
        assert!(s.is_empty());
    }

    #[test]
    fn zero_duration_span_completes_immediately() {
        let mut s = Scheduler::new();
        s.schedule(Cadence::Span { duration: 0.0 }, ());
        let firings = s.tick(0.0);
        assert_eq!(firings.len(), 1);
        assert!(firings[0].last);
    }

    #[test]
    fn retired_tasks_cannot_be_cancelled() {
        let mut s = Scheduler::new();
        let once = s.schedule(Cadence::Once { delay: 0.5 }, "once");
        let firings = s.tick(0.5);
        assert!(firings[0].last);
        assert!(!s.contains(once));
        assert_eq!(s.cancel(once), Err(EngineError::UnknownTask(once)));
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut s = Scheduler::new();
        let keep = s.schedule(Cadence::Once { delay: 1.0 }, 1);
        let dropped = s.schedule(Cadence::Once { delay: 1.0 }, 2);
        assert_eq!(s.cancel(dropped), Ok(2));
        assert_eq!(s.cancel(dropped), Err(EngineError::UnknownTask(dropped)));
        assert!(s.contains(keep));
        let firings = s.tick(1.0);
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].task, 1);
    }
}
