use crate::core::merge::merge;
use crate::core::reconciler::{AnnotationReconciler, ViewportSettings};
use crate::core::scheduler::{CycleTicket, PollScheduler, SchedulerState, DEFAULT_POLL_INTERVAL};
use crate::domain::model::Notice;
use crate::domain::ports::{ConfigProvider, FacilityRepository, MapSurface, Notifier};
use crate::utils::error::{ParkingError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Activated,
    Deactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Applied {
        facilities: usize,
        slots: usize,
        first_cycle: bool,
    },
    /// The scheduler was stopped while the cycle was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub viewport: ViewportSettings,
}

impl ControllerSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            viewport: ViewportSettings {
                home: config.default_position(),
                home_zoom: config.home_zoom(),
                focus_zoom: config.focus_zoom(),
            },
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            viewport: ViewportSettings::default(),
        }
    }
}

struct ViewState<M: MapSurface> {
    reconciler: AnnotationReconciler<M>,
    first_cycle_pending: bool,
}

struct CyclePipeline<R, M: MapSurface, N> {
    repository: R,
    notifier: N,
    view: Mutex<ViewState<M>>,
    /// Held for a whole cycle so scheduled and manual cycles never overlap.
    cycle_gate: tokio::sync::Mutex<()>,
}

impl<R, M, N> CyclePipeline<R, M, N>
where
    R: FacilityRepository,
    M: MapSurface,
    N: Notifier,
{
    fn lock_view(&self) -> MutexGuard<'_, ViewState<M>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All view writes, notices included, go through the view lock and are
    /// dropped once the ticket has been retired.
    fn notify_if_current(&self, ticket: &CycleTicket, notice: Notice) {
        let _view = self.lock_view();
        if ticket.is_current() {
            self.notifier.notify(notice);
        }
    }

    async fn run_cycle(&self, ticket: &CycleTicket) -> Result<CycleOutcome> {
        let _gate = self.cycle_gate.lock().await;
        {
            let view = self.lock_view();
            if view.first_cycle_pending && ticket.is_current() {
                self.notifier.notify(Notice::LoadingStarted);
            }
        }

        let facilities = match self.repository.fetch_facilities().await {
            Ok(facilities) => facilities,
            Err(e) => {
                tracing::warn!("Failed to fetch parking lots: {}", e);
                let notice = if e.is_transport() {
                    Notice::NetworkError {
                        cause: e.user_friendly_message(),
                    }
                } else {
                    Notice::FacilitiesUnavailable
                };
                self.notify_if_current(ticket, notice);
                return Err(e);
            }
        };
        tracing::debug!("Fetched {} parking lots", facilities.len());

        let slots = match self.repository.fetch_slots().await {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!("Failed to fetch parking slots: {}", e);
                self.notify_if_current(ticket, Notice::SlotsUnavailable);
                return Err(e);
            }
        };
        let fetched_slots = slots.len();
        tracing::debug!("Fetched {} parking slots", fetched_slots);

        let snapshot = match merge(facilities, slots) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Rejected parking data: {}", e);
                let cause = match &e {
                    ParkingError::InvalidInput { message } => message.clone(),
                    other => other.to_string(),
                };
                self.notify_if_current(ticket, Notice::InvalidData { cause });
                return Err(e);
            }
        };

        let mut view = self.lock_view();
        if !ticket.is_current() {
            tracing::debug!(
                generation = ticket.generation(),
                "Discarding cycle result after stop"
            );
            return Ok(CycleOutcome::Discarded);
        }

        let first_cycle = std::mem::replace(&mut view.first_cycle_pending, false);
        view.reconciler.reconcile(&snapshot, first_cycle);

        let facilities = snapshot.facility_count();
        let slots = snapshot.slot_count();
        if first_cycle {
            self.notifier.notify(Notice::FirstLoadSummary {
                facilities,
                slots: fetched_slots,
            });
            tracing::info!(
                "✅ First load: {} parking lot(s) with {} slots",
                facilities,
                fetched_slots
            );
        } else {
            tracing::debug!("Refreshed {} parking lot(s) with {} slots", facilities, slots);
        }

        Ok(CycleOutcome::Applied {
            facilities,
            slots,
            first_cycle,
        })
    }
}

/// Owns the poll scheduler and routes each cycle's snapshot to the map.
pub struct ViewController<R, M: MapSurface, N> {
    scheduler: PollScheduler,
    pipeline: Arc<CyclePipeline<R, M, N>>,
}

impl<R, M, N> ViewController<R, M, N>
where
    R: FacilityRepository + 'static,
    M: MapSurface + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: R, surface: M, notifier: N, settings: ControllerSettings) -> Self {
        Self {
            scheduler: PollScheduler::new(settings.poll_interval),
            pipeline: Arc::new(CyclePipeline {
                repository,
                notifier,
                view: Mutex::new(ViewState {
                    reconciler: AnnotationReconciler::new(surface, settings.viewport),
                    first_cycle_pending: true,
                }),
                cycle_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Starts polling. Returns false if polling was already active.
    pub fn activate(&mut self) -> bool {
        let pipeline = Arc::clone(&self.pipeline);
        self.scheduler.start(move |ticket| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                if let Err(e) = pipeline.run_cycle(&ticket).await {
                    tracing::debug!(
                        "Cycle aborted ({:?}), retrying on next tick",
                        e.category()
                    );
                }
            }
        })
    }

    pub fn deactivate(&mut self) {
        self.scheduler.stop();
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent) {
        tracing::debug!("Lifecycle event: {:?}", event);
        match event {
            LifecycleEvent::Activated => {
                self.activate();
            }
            LifecycleEvent::Deactivated => self.deactivate(),
        }
    }

    /// Runs one cycle inline under the scheduler's current generation. Waits
    /// for a scheduled cycle already in flight to finish first.
    pub async fn refresh_now(&self) -> Result<CycleOutcome> {
        let ticket = self.scheduler.ticket();
        self.pipeline.run_cycle(&ticket).await
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_first_cycle_pending(&self) -> bool {
        self.pipeline.lock_view().first_cycle_pending
    }

    pub fn with_reconciler<T>(&self, f: impl FnOnce(&AnnotationReconciler<M>) -> T) -> T {
        f(&self.pipeline.lock_view().reconciler)
    }

    /// Stops polling and waits until no scheduler task remains.
    pub async fn teardown(mut self) {
        self.scheduler.shutdown().await;
        tracing::info!("View controller torn down");
    }
}
