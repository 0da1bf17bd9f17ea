//! Resettable one-shot timer backed by a tokio task.
//!
//! A [`DebounceTimer`] owns a task that sleeps until the current deadline and
//! then hands the most recent payload to its callback, exactly once. Until
//! that moment the deadline can be pushed back any number of times.
//!
//! # Phases
//!
//! ```text
//!            reset              deadline elapsed
//!   Idle ───────────► Armed ─────────────────────► Firing ──► (task ends)
//!    ▲                 │  ▲
//!    └──── stop ───────┘  └── reset (deadline moves)
//!
//!   Idle / Armed ── close ──► Closed ──► (task ends)
//! ```
//!
//! The phase lives behind a small lock that is never held across an await.
//! The firing decision and [`reset`](DebounceTimer::reset) both take it, so a
//! reset racing an elapsed deadline either wins (the firing is cancelled and
//! the deadline moves) or loses (the callback has started and the reset is a
//! no-op returning `false`).

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};

/// Lifecycle phase of a [`DebounceTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Created or stopped; the deadline is effectively infinite.
    Idle,
    /// Waiting for the deadline.
    Armed,
    /// The deadline elapsed and the callback has started.
    Firing,
    /// Closed before firing; the callback will never run.
    Closed,
}

enum Phase<T> {
    Idle,
    Armed { deadline: Instant, payload: T },
    Firing,
    Closed,
}

struct Shared<T> {
    phase: Mutex<Phase<T>>,
    wake: Notify,
}

impl<T> Shared<T> {
    /// Next wait for the driver task: `None` to stop, `Some(None)` to wait
    /// for a reset, `Some(Some(at))` to sleep until `at`.
    fn next_wait(&self) -> Option<Option<Instant>> {
        match &*self.phase.lock() {
            Phase::Idle => Some(None),
            Phase::Armed { deadline, .. } => Some(Some(*deadline)),
            Phase::Firing | Phase::Closed => None,
        }
    }

    /// Moves an expired timer to `Firing` and takes its payload.
    fn take_expired(&self, now: Instant) -> Option<T> {
        let mut phase = self.phase.lock();
        match &*phase {
            Phase::Armed { deadline, .. } if *deadline <= now => {}
            _ => return None,
        }
        match std::mem::replace(&mut *phase, Phase::Firing) {
            Phase::Armed { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// A one-shot timer whose deadline can be reset until it fires.
///
/// Cloning yields another handle to the same timer.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use war_watcher::DebounceTimer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, rx) = tokio::sync::oneshot::channel();
/// let timer = DebounceTimer::spawn(move |value: u32| async move {
///     let _ = tx.send(value);
/// });
///
/// timer.reset(1, Instant::now() + Duration::from_millis(10));
/// timer.reset(2, Instant::now() + Duration::from_millis(10));
///
/// assert_eq!(rx.await.unwrap(), 2);
/// # }
/// ```
pub struct DebounceTimer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for DebounceTimer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for DebounceTimer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceTimer")
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Send + 'static> DebounceTimer<T> {
    /// Creates an idle timer and spawns its driver task.
    ///
    /// `on_fire` runs on the driver task with the payload of the last
    /// [`reset`](Self::reset) once that reset's deadline elapses.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(on_fire: F) -> Self
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            phase: Mutex::new(Phase::Idle),
            wake: Notify::new(),
        });

        tokio::spawn(drive(Arc::clone(&shared), on_fire));

        Self { shared }
    }
}

impl<T> DebounceTimer<T> {
    /// Arms the timer, or moves its deadline, replacing the payload.
    ///
    /// Returns `false` without effect if the timer is already firing or
    /// has been closed.
    pub fn reset(&self, payload: T, deadline: Instant) -> bool {
        {
            let mut phase = self.shared.phase.lock();
            if matches!(*phase, Phase::Firing | Phase::Closed) {
                return false;
            }
            *phase = Phase::Armed { deadline, payload };
        }
        self.shared.wake.notify_one();
        true
    }

    /// Disarms a pending timer, returning it to the idle phase.
    ///
    /// Returns `false` if the timer is firing or closed.
    pub fn stop(&self) -> bool {
        {
            let mut phase = self.shared.phase.lock();
            if matches!(*phase, Phase::Firing | Phase::Closed) {
                return false;
            }
            *phase = Phase::Idle;
        }
        self.shared.wake.notify_one();
        true
    }

    /// Shuts the timer down so its task exits without firing.
    ///
    /// A callback that has already started runs to completion. Returns
    /// `false` in that case.
    pub fn close(&self) -> bool {
        {
            let mut phase = self.shared.phase.lock();
            match *phase {
                Phase::Firing => return false,
                Phase::Closed => return true,
                Phase::Idle | Phase::Armed { .. } => *phase = Phase::Closed,
            }
        }
        self.shared.wake.notify_one();
        true
    }

    /// Returns the current phase.
    #[must_use]
    pub fn state(&self) -> TimerState {
        match &*self.shared.phase.lock() {
            Phase::Idle => TimerState::Idle,
            Phase::Armed { .. } => TimerState::Armed,
            Phase::Firing => TimerState::Firing,
            Phase::Closed => TimerState::Closed,
        }
    }

    /// Returns `true` if both handles refer to the same timer.
    #[must_use]
    pub fn same_timer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

async fn drive<T, F, Fut>(shared: Arc<Shared<T>>, on_fire: F)
where
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let payload = loop {
        match shared.next_wait() {
            None => return,
            Some(None) => shared.wake.notified().await,
            Some(Some(deadline)) => {
                tokio::select! {
                    () = shared.wake.notified() => continue,
                    () = sleep_until(deadline) => {}
                }
                if let Some(payload) = shared.take_expired(Instant::now()) {
                    break payload;
                }
            }
        }
    };

    on_fire(payload).await;
}
