use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::models::{Preferences, RouteGeometry, StopLists, TripParameters};
use crate::stops::StopPlanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Calculating,
}

/// What a trigger call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// This call ran one or more batches and published the result.
    Completed,
    /// A batch was already running; it will pick up the change when it ends.
    Deferred,
    /// Inputs match the last published batch and no refresh was requested.
    Unchanged,
    /// No route has been set yet.
    NoRoute,
}

/// Inputs a batch was computed from.
#[derive(Debug, Clone, PartialEq)]
struct InputSnapshot {
    route_generation: u64,
    trip: TripParameters,
}

struct Batch {
    route: Arc<RouteGeometry>,
    snapshot: InputSnapshot,
}

struct Inner {
    state: CoordinatorState,
    route: Option<Arc<RouteGeometry>>,
    route_generation: u64,
    trip: Option<TripParameters>,
    refresh_requested: bool,
    /// A trigger arrived while a batch was running.
    pending: bool,
    last_applied: Option<InputSnapshot>,
}

impl Inner {
    fn next_batch(&mut self) -> Option<Batch> {
        let route = self.route.clone()?;
        let trip = self.trip.clone()?;
        let snapshot = InputSnapshot {
            route_generation: self.route_generation,
            trip,
        };
        if !self.refresh_requested && self.last_applied.as_ref() == Some(&snapshot) {
            return None;
        }
        self.refresh_requested = false;
        Some(Batch { route, snapshot })
    }
}

/// Decides when stop lists are recomputed and publishes them.
///
/// At most one batch runs at a time. Triggers that arrive mid-batch are
/// folded into a single follow-up batch run by whoever owns the current
/// one, and subscribers only ever see whole `StopLists` values.
pub struct RefreshCoordinator {
    planner: Arc<StopPlanner>,
    inner: Mutex<Inner>,
    published: watch::Sender<Arc<StopLists>>,
}

impl RefreshCoordinator {
    pub fn new(planner: Arc<StopPlanner>) -> Self {
        let (published, _) = watch::channel(Arc::new(StopLists::default()));
        Self {
            planner,
            inner: Mutex::new(Inner {
                state: CoordinatorState::Idle,
                route: None,
                route_generation: 0,
                trip: None,
                refresh_requested: false,
                pending: false,
                last_applied: None,
            }),
            published,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.lock().state
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<StopLists>> {
        self.published.subscribe()
    }

    /// Latest published stop lists.
    pub fn current(&self) -> Arc<StopLists> {
        self.published.borrow().clone()
    }

    /// A new route was planned; always recomputes.
    pub async fn on_route_changed(
        &self,
        route: RouteGeometry,
        trip: TripParameters,
    ) -> TriggerOutcome {
        {
            let mut inner = self.lock();
            inner.route = Some(Arc::new(route));
            inner.route_generation += 1;
            inner.trip = Some(trip);
        }
        self.trigger().await
    }

    /// Trip parameters changed without replanning the route.
    pub async fn on_trip_changed(&self, trip: TripParameters) -> TriggerOutcome {
        self.lock().trip = Some(trip);
        self.trigger().await
    }

    pub async fn on_preferences_changed(&self, prefs: Preferences) -> TriggerOutcome {
        {
            let mut inner = self.lock();
            let trip = inner.trip.take().unwrap_or_default();
            inner.trip = Some(trip.with_preferences(prefs));
        }
        self.trigger().await
    }

    /// Recompute even if nothing changed.
    pub async fn refresh(&self) -> TriggerOutcome {
        self.lock().refresh_requested = true;
        self.trigger().await
    }

    async fn trigger(&self) -> TriggerOutcome {
        let mut batch = {
            let mut inner = self.lock();
            if inner.state == CoordinatorState::Calculating {
                inner.pending = true;
                tracing::debug!("stop calculation in progress, deferring trigger");
                return TriggerOutcome::Deferred;
            }
            if inner.route.is_none() || inner.trip.is_none() {
                return TriggerOutcome::NoRoute;
            }
            match inner.next_batch() {
                Some(batch) => {
                    inner.state = CoordinatorState::Calculating;
                    batch
                }
                None => return TriggerOutcome::Unchanged,
            }
        };

        // Resets to Idle only if this future is dropped mid-batch.
        let mut guard = CalculatingGuard {
            coordinator: self,
            armed: true,
        };

        loop {
            let lists = self
                .planner
                .plan_all(&batch.route, &batch.snapshot.trip)
                .await;

            let next = {
                let mut inner = self.lock();
                inner.last_applied = Some(batch.snapshot);
                self.published.send_replace(Arc::new(lists));

                let next = if std::mem::take(&mut inner.pending) {
                    inner.next_batch()
                } else {
                    None
                };
                // Idle under the same lock that saw no pending trigger.
                if next.is_none() {
                    inner.state = CoordinatorState::Idle;
                    guard.armed = false;
                }
                next
            };

            match next {
                Some(next) => {
                    tracing::debug!("inputs changed during calculation, running follow-up batch");
                    batch = next;
                }
                None => break,
            }
        }

        TriggerOutcome::Completed
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CalculatingGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for CalculatingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.coordinator.lock();
        inner.state = CoordinatorState::Idle;
        inner.pending = false;
    }
}
