//! Deferred follow-ups for unacknowledged host changes
//!
//! The host never confirms a scroll synchronously. When navigation crosses a
//! page boundary we ask the host to scroll and leave a follow-up behind that
//! selects the target entity once the host had time to apply it.
//!
//! Follow-ups are data, not closures, and there is exactly one slot per
//! window: scheduling again replaces whatever was pending, so the newest
//! navigation command always wins. Time comes from a [`Clock`], which lets
//! tests step it by hand.

use crate::types::WindowId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall-clock time based on [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-stepped clock for tests and offline simulation
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Action to run once the host had time to catch up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Select the entity at an absolute collection position
    ///
    /// Idempotent: firing it twice, or after the host already selected the
    /// target, changes nothing.
    SelectPosition(usize),
    /// Select slot `index` of whichever track is selected when this fires
    SelectSlotOfSelectedTrack(usize),
    /// Enter the selected group track
    EnterGroup,
}

#[derive(Debug)]
struct Pending {
    deadline: Duration,
    /// Tie-break for identical deadlines: scheduling order
    sequence: u64,
    follow_up: FollowUp,
}

#[derive(Debug, Default)]
struct SchedulerState {
    pending: HashMap<WindowId, Pending>,
    next_sequence: u64,
}

/// Single-slot-per-window deferred action queue
///
/// Cheap to clone; all clones share one queue. Follow-ups are only ever run
/// by whoever calls [`take_due`](Self::take_due), on that caller's thread.
#[derive(Clone)]
pub struct FollowUpScheduler {
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<SchedulerState>>,
}

impl std::fmt::Debug for FollowUpScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowUpScheduler")
            .field("pending", &self.lock().pending.len())
            .finish()
    }
}

impl FollowUpScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// Scheduler driven by the system clock
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `follow_up` for `window` after `delay`
    ///
    /// Replaces any follow-up still pending for the same window.
    pub fn schedule(&self, window: WindowId, delay: Duration, follow_up: FollowUp) {
        let deadline = self.clock.now() + delay;
        let mut state = self.lock();
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let replaced = state.pending.insert(
            window,
            Pending {
                deadline,
                sequence,
                follow_up: follow_up.clone(),
            },
        );
        match replaced {
            Some(old) => log::debug!(
                "FollowUp: {:?} for {} supersedes {:?}",
                follow_up,
                window,
                old.follow_up
            ),
            None => log::debug!("FollowUp: {:?} for {} in {:?}", follow_up, window, delay),
        }
    }

    /// Follow-up currently pending for `window`
    pub fn pending(&self, window: WindowId) -> Option<FollowUp> {
        self.lock().pending.get(&window).map(|p| p.follow_up.clone())
    }

    /// Remove and return every due follow-up, earliest first
    pub fn take_due(&self) -> Vec<(WindowId, FollowUp)> {
        let now = self.clock.now();
        let mut state = self.lock();

        let due_windows: Vec<WindowId> = state
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(w, _)| *w)
            .collect();
        let mut due: Vec<(WindowId, Pending)> = due_windows
            .into_iter()
            .filter_map(|w| state.pending.remove(&w).map(|p| (w, p)))
            .collect();

        due.sort_by_key(|(_, p)| (p.deadline, p.sequence));
        due.into_iter().map(|(w, p)| (w, p.follow_up)).collect()
    }

    /// Time until the earliest pending follow-up (zero if already due)
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.lock()
            .pending
            .values()
            .map(|p| p.deadline.saturating_sub(now))
            .min()
    }

    pub fn is_idle(&self) -> bool {
        self.lock().pending.is_empty()
    }
}
