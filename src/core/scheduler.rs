use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Scheduled,
    Running,
}

struct SchedulerShared {
    generation: AtomicU64,
    state: Mutex<SchedulerState>,
}

impl SchedulerShared {
    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a transition only if `generation` has not been retired by `stop()`.
    fn transition(&self, generation: u64, to: SchedulerState) -> bool {
        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *state = to;
        true
    }
}

/// Handed to every cycle. Results may only be applied while the ticket is current.
#[derive(Clone)]
pub struct CycleTicket {
    generation: u64,
    shared: Arc<SchedulerShared>,
}

impl CycleTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.shared.generation.load(Ordering::SeqCst) == self.generation
    }
}

impl std::fmt::Debug for CycleTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleTicket")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}

/// Fixed-delay poller: one immediate cycle on `start()`, then one cycle per
/// interval measured from the end of the previous cycle.
pub struct PollScheduler {
    interval: Duration,
    shared: Arc<SchedulerShared>,
    cancel: Option<CancellationToken>,
    active: Option<JoinHandle<()>>,
    draining: Vec<JoinHandle<()>>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shared: Arc::new(SchedulerShared {
                generation: AtomicU64::new(0),
                state: Mutex::new(SchedulerState::Stopped),
            }),
            cancel: None,
            active: None,
            draining: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.lock_state()
    }

    /// Ticket for the current generation, for cycles run outside the timer.
    pub fn ticket(&self) -> CycleTicket {
        CycleTicket {
            generation: self.shared.generation.load(Ordering::SeqCst),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of scheduler tasks that have not exited yet, including ones
    /// still finishing a discarded cycle after `stop()`.
    pub fn live_tasks(&mut self) -> usize {
        self.draining.retain(|handle| !handle.is_finished());
        self.draining.len() + usize::from(self.active.as_ref().is_some_and(|h| !h.is_finished()))
    }

    /// Returns false when already scheduled or running.
    pub fn start<F, Fut>(&mut self, cycle: F) -> bool
    where
        F: Fn(CycleTicket) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = {
            let mut state = self.shared.lock_state();
            if *state != SchedulerState::Stopped {
                tracing::debug!("Poll scheduler already active, ignoring start");
                return false;
            }
            *state = SchedulerState::Scheduled;
            self.shared.generation.load(Ordering::SeqCst)
        };

        self.draining.retain(|handle| !handle.is_finished());

        let token = CancellationToken::new();
        let ticket = CycleTicket {
            generation,
            shared: Arc::clone(&self.shared),
        };
        let interval = self.interval;
        let cancelled = token.clone();

        tracing::info!(
            generation,
            interval_ms = interval.as_millis() as u64,
            "Poll scheduler started"
        );

        self.active = Some(tokio::spawn(async move {
            loop {
                if !ticket.shared.transition(generation, SchedulerState::Running) {
                    break;
                }
                cycle(ticket.clone()).await;
                if !ticket.shared.transition(generation, SchedulerState::Scheduled) {
                    break;
                }

                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::debug!(generation, "Poll loop exited");
        }));
        self.cancel = Some(token);
        true
    }

    /// Cancels the pending timer and retires the current generation. A cycle
    /// already in flight runs to completion but its ticket is no longer current.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.lock_state();
            if *state == SchedulerState::Stopped {
                return;
            }
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            *state = SchedulerState::Stopped;
        }

        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        if let Some(handle) = self.active.take() {
            self.draining.push(handle);
        }
        tracing::info!("Poll scheduler stopped");
    }

    /// Stops and waits for every scheduler task, including discarded cycles.
    pub async fn shutdown(&mut self) {
        self.stop();
        for handle in self.draining.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("Poll task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
